use async_trait::async_trait;
use domains::{DomainError, FormField, FormRepo, FormSubmission, FormTemplate, Result, SubmissionStatus};
use serde_json::{Map, Value};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use uuid::Uuid;

use super::{col, db_err, enum_col, PgStore};

const TEMPLATE_COLUMNS: &str =
    "id, name, description, category, version, is_active, fields, created_by, created_at, updated_at";

const SUBMISSION_COLUMNS: &str = "id, template_id, product_id, data, submitted_by, submitted_at, status, notes";

fn template_from_row(row: &PgRow) -> Result<FormTemplate> {
    let fields: Json<Vec<FormField>> = col(row, "fields")?;
    Ok(FormTemplate {
        id: col(row, "id")?,
        name: col(row, "name")?,
        description: col(row, "description")?,
        category: col(row, "category")?,
        version: col(row, "version")?,
        is_active: col(row, "is_active")?,
        fields: fields.0,
        created_by: col(row, "created_by")?,
        created_at: col(row, "created_at")?,
        updated_at: col(row, "updated_at")?,
    })
}

fn submission_from_row(row: &PgRow) -> Result<FormSubmission> {
    let data: Json<Map<String, Value>> = col(row, "data")?;
    Ok(FormSubmission {
        id: col(row, "id")?,
        template_id: col(row, "template_id")?,
        product_id: col(row, "product_id")?,
        data: data.0,
        submitted_by: col(row, "submitted_by")?,
        submitted_at: col(row, "submitted_at")?,
        status: enum_col(row, "status", SubmissionStatus::parse)?,
        notes: col(row, "notes")?,
    })
}

#[async_trait]
impl FormRepo for PgStore {
    async fn list_templates(&self) -> Result<Vec<FormTemplate>> {
        let rows = sqlx::query(&format!("SELECT {TEMPLATE_COLUMNS} FROM form_templates ORDER BY name"))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.iter().map(template_from_row).collect()
    }

    async fn get_template(&self, id: Uuid) -> Result<Option<FormTemplate>> {
        let row = sqlx::query(&format!("SELECT {TEMPLATE_COLUMNS} FROM form_templates WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(template_from_row).transpose()
    }

    async fn insert_template(&self, t: &FormTemplate) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO form_templates ({TEMPLATE_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"
        ))
        .bind(t.id)
        .bind(&t.name)
        .bind(&t.description)
        .bind(&t.category)
        .bind(t.version)
        .bind(t.is_active)
        .bind(Json(&t.fields))
        .bind(&t.created_by)
        .bind(t.created_at)
        .bind(t.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn update_template(&self, t: &FormTemplate) -> Result<()> {
        let done = sqlx::query(
            "UPDATE form_templates SET name = $2, description = $3, category = $4, version = $5, is_active = $6, \
                 fields = $7, updated_at = $8 \
             WHERE id = $1",
        )
        .bind(t.id)
        .bind(&t.name)
        .bind(&t.description)
        .bind(&t.category)
        .bind(t.version)
        .bind(t.is_active)
        .bind(Json(&t.fields))
        .bind(t.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        if done.rows_affected() == 0 {
            return Err(DomainError::not_found("form template", t.id));
        }
        Ok(())
    }

    async fn delete_template(&self, id: Uuid) -> Result<bool> {
        let done = sqlx::query("DELETE FROM form_templates WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(done.rows_affected() > 0)
    }

    async fn insert_submission(&self, s: &FormSubmission) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO form_submissions ({SUBMISSION_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"
        ))
        .bind(s.id)
        .bind(s.template_id)
        .bind(s.product_id)
        .bind(Json(&s.data))
        .bind(&s.submitted_by)
        .bind(s.submitted_at)
        .bind(s.status.as_str())
        .bind(&s.notes)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn list_submissions(&self, template_id: Option<Uuid>, limit: i64) -> Result<Vec<FormSubmission>> {
        let rows = sqlx::query(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM form_submissions \
             WHERE ($1::uuid IS NULL OR template_id = $1) \
             ORDER BY submitted_at DESC, id DESC LIMIT $2"
        ))
        .bind(template_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(submission_from_row).collect()
    }

    async fn get_submission(&self, id: Uuid) -> Result<Option<FormSubmission>> {
        let row = sqlx::query(&format!("SELECT {SUBMISSION_COLUMNS} FROM form_submissions WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(submission_from_row).transpose()
    }

    async fn update_submission(&self, s: &FormSubmission) -> Result<()> {
        let done = sqlx::query("UPDATE form_submissions SET status = $2, notes = $3, data = $4 WHERE id = $1")
            .bind(s.id)
            .bind(s.status.as_str())
            .bind(&s.notes)
            .bind(Json(&s.data))
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        if done.rows_affected() == 0 {
            return Err(DomainError::not_found("form submission", s.id));
        }
        Ok(())
    }
}
