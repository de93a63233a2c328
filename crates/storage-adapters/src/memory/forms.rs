use async_trait::async_trait;
use domains::{DomainError, FormRepo, FormSubmission, FormTemplate, Result};
use uuid::Uuid;

use super::{take, values, MemoryStore};

#[async_trait]
impl FormRepo for MemoryStore {
    async fn list_templates(&self) -> Result<Vec<FormTemplate>> {
        self.check()?;
        let mut templates = values(&self.templates);
        templates.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(templates)
    }

    async fn get_template(&self, id: Uuid) -> Result<Option<FormTemplate>> {
        self.check()?;
        Ok(self.templates.get(&id).map(|t| t.clone()))
    }

    async fn insert_template(&self, template: &FormTemplate) -> Result<()> {
        self.check()?;
        self.templates.insert(template.id, template.clone());
        Ok(())
    }

    async fn update_template(&self, template: &FormTemplate) -> Result<()> {
        self.check()?;
        match self.templates.get_mut(&template.id) {
            Some(mut stored) => {
                *stored = template.clone();
                Ok(())
            }
            None => Err(DomainError::not_found("form template", template.id)),
        }
    }

    async fn delete_template(&self, id: Uuid) -> Result<bool> {
        self.check()?;
        Ok(self.templates.remove(&id).is_some())
    }

    async fn insert_submission(&self, submission: &FormSubmission) -> Result<()> {
        self.check()?;
        self.submissions.insert(submission.id, submission.clone());
        Ok(())
    }

    async fn list_submissions(&self, template_id: Option<Uuid>, limit: i64) -> Result<Vec<FormSubmission>> {
        self.check()?;
        let mut rows: Vec<FormSubmission> = values(&self.submissions)
            .into_iter()
            .filter(|s| template_id.is_none_or(|t| s.template_id == t))
            .collect();
        rows.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at).then_with(|| b.id.cmp(&a.id)));
        rows.truncate(take(limit));
        Ok(rows)
    }

    async fn get_submission(&self, id: Uuid) -> Result<Option<FormSubmission>> {
        self.check()?;
        Ok(self.submissions.get(&id).map(|s| s.clone()))
    }

    async fn update_submission(&self, submission: &FormSubmission) -> Result<()> {
        self.check()?;
        match self.submissions.get_mut(&submission.id) {
            Some(mut stored) => {
                *stored = submission.clone();
                Ok(())
            }
            None => Err(DomainError::not_found("form submission", submission.id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use domains::SubmissionStatus;
    use serde_json::Map;

    fn submission(template_id: Uuid, minutes_ago: i64) -> FormSubmission {
        FormSubmission {
            id: Uuid::now_v7(),
            template_id,
            product_id: None,
            data: Map::new(),
            submitted_by: Some("f".into()),
            submitted_at: Utc::now() - Duration::minutes(minutes_ago),
            status: SubmissionStatus::Submitted,
            notes: None,
        }
    }

    #[tokio::test]
    async fn submissions_filter_by_template_newest_first() {
        let store = MemoryStore::new();
        let (a, b) = (Uuid::now_v7(), Uuid::now_v7());
        let older = submission(a, 10);
        let newer = submission(a, 1);
        for s in [&older, &newer, &submission(b, 5)] {
            store.insert_submission(s).await.unwrap();
        }

        let rows = store.list_submissions(Some(a), 10).await.unwrap();
        assert_eq!(rows.iter().map(|s| s.id).collect::<Vec<_>>(), vec![newer.id, older.id]);
        assert_eq!(store.list_submissions(None, 2).await.unwrap().len(), 2);
    }
}
