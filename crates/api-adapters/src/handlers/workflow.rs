//! `forms.*`: templates and submissions.

use axum::extract::State;
use axum::Json;
use domains::{FormSubmission, FormTemplate, FormTemplatePatch, NewFormSubmission, NewFormTemplate, SubmissionStatus};
use serde::Deserialize;
use uuid::Uuid;

use super::{success, ById, RpcResult, Success, Update};
use crate::extract::{CurrentUser, Input};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SubmissionFilter {
    pub template_id: Option<Uuid>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub status: SubmissionStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

pub async fn list_templates(
    State(state): State<AppState>,
    CurrentUser(_actor): CurrentUser,
) -> RpcResult<Vec<FormTemplate>> {
    Ok(Json(state.services.forms.list_templates().await?))
}

pub async fn get_template(
    State(state): State<AppState>,
    CurrentUser(_actor): CurrentUser,
    Input(p): Input<ById>,
) -> RpcResult<Option<FormTemplate>> {
    Ok(Json(state.services.forms.get_template(p.id).await?))
}

pub async fn create_template(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Input(input): Input<NewFormTemplate>,
) -> RpcResult<FormTemplate> {
    Ok(Json(state.services.forms.create_template(&actor, input).await?))
}

pub async fn update_template(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Input(p): Input<Update<FormTemplatePatch>>,
) -> RpcResult<FormTemplate> {
    Ok(Json(state.services.forms.update_template(&actor, p.id, p.data).await?))
}

pub async fn delete_template(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Input(p): Input<ById>,
) -> RpcResult<Success> {
    state.services.forms.delete_template(&actor, p.id).await?;
    success()
}

pub async fn submit(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Input(input): Input<NewFormSubmission>,
) -> RpcResult<FormSubmission> {
    Ok(Json(state.services.forms.submit(&actor, input).await?))
}

pub async fn list_submissions(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Input(p): Input<SubmissionFilter>,
) -> RpcResult<Vec<FormSubmission>> {
    Ok(Json(state.services.forms.list_submissions(&actor, p.template_id, p.limit).await?))
}

pub async fn review_submission(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Input(p): Input<Review>,
) -> RpcResult<FormSubmission> {
    Ok(Json(state.services.forms.review_submission(&actor, p.id, p.status, p.notes).await?))
}
