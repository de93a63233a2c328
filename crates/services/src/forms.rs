//! Form builder: templates with ordered field descriptors, and submissions
//! validated against them.

use std::sync::Arc;

use chrono::Utc;
use domains::{
    validate_fields, Capability, DomainError, FormRepo, FormSubmission, FormTemplate, FormTemplatePatch,
    NewFormSubmission, NewFormTemplate, Result, SubmissionStatus,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::access::Actor;
use crate::degrade::degrade_read;
use crate::limit_or;

#[derive(Clone)]
pub struct FormService {
    forms: Arc<dyn FormRepo>,
}

impl FormService {
    pub fn new(forms: Arc<dyn FormRepo>) -> Self {
        Self { forms }
    }

    pub async fn list_templates(&self) -> Result<Vec<FormTemplate>> {
        degrade_read("forms.list_templates", self.forms.list_templates().await)
    }

    pub async fn get_template(&self, id: Uuid) -> Result<Option<FormTemplate>> {
        degrade_read("forms.get_template", self.forms.get_template(id).await)
    }

    #[instrument(skip(self, actor, input), fields(actor = %actor.id()))]
    pub async fn create_template(&self, actor: &Actor, input: NewFormTemplate) -> Result<FormTemplate> {
        actor.require(Capability::ManageForms)?;
        let template = input.into_template(Some(actor.id().to_string()), Utc::now());
        if template.name.is_empty() {
            return Err(DomainError::validation("template name must not be empty"));
        }
        validate_fields(&template.fields)?;
        self.forms.insert_template(&template).await?;
        info!(template_id = %template.id, fields = template.fields.len(), "form template created");
        Ok(template)
    }

    #[instrument(skip(self, actor, patch), fields(actor = %actor.id()))]
    pub async fn update_template(&self, actor: &Actor, id: Uuid, patch: FormTemplatePatch) -> Result<FormTemplate> {
        actor.require(Capability::ManageForms)?;
        if let Some(fields) = &patch.fields {
            validate_fields(fields)?;
        }
        let mut template = self
            .forms
            .get_template(id)
            .await?
            .ok_or_else(|| DomainError::not_found("form template", id))?;
        template.apply(patch);
        if template.name.trim().is_empty() {
            return Err(DomainError::validation("template name must not be empty"));
        }
        template.updated_at = Utc::now();
        self.forms.update_template(&template).await?;
        Ok(template)
    }

    pub async fn delete_template(&self, actor: &Actor, id: Uuid) -> Result<()> {
        actor.require(Capability::ManageForms)?;
        if !self.forms.delete_template(id).await? {
            return Err(DomainError::not_found("form template", id));
        }
        Ok(())
    }

    /// Checks the data against the template's declared fields before storing.
    #[instrument(skip(self, actor, input), fields(actor = %actor.id(), template_id = %input.template_id))]
    pub async fn submit(&self, actor: &Actor, input: NewFormSubmission) -> Result<FormSubmission> {
        actor.require(Capability::FillForms)?;
        let template = self
            .forms
            .get_template(input.template_id)
            .await?
            .ok_or_else(|| DomainError::not_found("form template", input.template_id))?;
        if !template.is_active {
            return Err(DomainError::validation(format!("form `{}` is not accepting submissions", template.name)));
        }
        template.validate_submission(&input.data)?;

        let submission = FormSubmission {
            id: Uuid::now_v7(),
            template_id: template.id,
            product_id: input.product_id,
            data: input.data,
            submitted_by: Some(actor.id().to_string()),
            submitted_at: Utc::now(),
            status: SubmissionStatus::Submitted,
            notes: None,
        };
        self.forms.insert_submission(&submission).await?;
        Ok(submission)
    }

    pub async fn list_submissions(
        &self,
        actor: &Actor,
        template_id: Option<Uuid>,
        limit: Option<i64>,
    ) -> Result<Vec<FormSubmission>> {
        actor.require(Capability::ManageForms)?;
        let found = self.forms.list_submissions(template_id, limit_or(limit, 100)).await;
        degrade_read("forms.list_submissions", found)
    }

    #[instrument(skip(self, actor, notes), fields(actor = %actor.id()))]
    pub async fn review_submission(
        &self,
        actor: &Actor,
        id: Uuid,
        status: SubmissionStatus,
        notes: Option<String>,
    ) -> Result<FormSubmission> {
        actor.require(Capability::ManageForms)?;
        let mut submission = self
            .forms
            .get_submission(id)
            .await?
            .ok_or_else(|| DomainError::not_found("form submission", id))?;
        submission.status = status;
        if notes.is_some() {
            submission.notes = notes;
        }
        self.forms.update_submission(&submission).await?;
        Ok(submission)
    }
}
