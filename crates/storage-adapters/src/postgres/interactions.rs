use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::{Comment, CommentRepo, Reaction, ReactionRepo, Result, TargetKind, TargetRef};
use sqlx::postgres::PgRow;
use uuid::Uuid;

use super::{col, count, db_err, enum_col, PgStore};

const COMMENT_COLUMNS: &str =
    "id, target_type, target_id, content, parent_comment_id, author_id, is_edited, is_deleted, created_at, updated_at";

const REACTION_COLUMNS: &str = "id, target_type, target_id, user_id, reaction_type, created_at";

fn target_from_row(row: &PgRow) -> Result<TargetRef> {
    Ok(TargetRef::new(enum_col(row, "target_type", TargetKind::parse)?, col(row, "target_id")?))
}

fn comment_from_row(row: &PgRow) -> Result<Comment> {
    Ok(Comment {
        id: col(row, "id")?,
        target: target_from_row(row)?,
        content: col(row, "content")?,
        parent_comment_id: col(row, "parent_comment_id")?,
        author_id: col(row, "author_id")?,
        is_edited: col(row, "is_edited")?,
        is_deleted: col(row, "is_deleted")?,
        created_at: col(row, "created_at")?,
        updated_at: col(row, "updated_at")?,
    })
}

fn reaction_from_row(row: &PgRow) -> Result<Reaction> {
    Ok(Reaction {
        id: col(row, "id")?,
        target: target_from_row(row)?,
        user_id: col(row, "user_id")?,
        reaction_type: col(row, "reaction_type")?,
        created_at: col(row, "created_at")?,
    })
}

#[async_trait]
impl CommentRepo for PgStore {
    async fn list_comments(&self, target: TargetRef) -> Result<Vec<Comment>> {
        let rows = sqlx::query(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments \
             WHERE target_type = $1 AND target_id = $2 AND NOT is_deleted \
             ORDER BY created_at, id"
        ))
        .bind(target.kind.as_str())
        .bind(target.id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(comment_from_row).collect()
    }

    async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>> {
        let row = sqlx::query(&format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(comment_from_row).transpose()
    }

    async fn insert_comment(&self, c: &Comment) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO comments ({COMMENT_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"
        ))
        .bind(c.id)
        .bind(c.target.kind.as_str())
        .bind(c.target.id)
        .bind(&c.content)
        .bind(c.parent_comment_id)
        .bind(&c.author_id)
        .bind(c.is_edited)
        .bind(c.is_deleted)
        .bind(c.created_at)
        .bind(c.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn update_comment_content(&self, id: Uuid, content: &str, at: DateTime<Utc>) -> Result<Option<Comment>> {
        let row = sqlx::query(&format!(
            "UPDATE comments SET content = $2, is_edited = TRUE, updated_at = $3 \
             WHERE id = $1 AND NOT is_deleted RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(id)
        .bind(content)
        .bind(at)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.as_ref().map(comment_from_row).transpose()
    }

    async fn soft_delete_comment(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool> {
        let done = sqlx::query("UPDATE comments SET is_deleted = TRUE, updated_at = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(done.rows_affected() > 0)
    }
}

#[async_trait]
impl ReactionRepo for PgStore {
    async fn find_reaction(&self, target: TargetRef, user_id: &str) -> Result<Option<Reaction>> {
        let row = sqlx::query(&format!(
            "SELECT {REACTION_COLUMNS} FROM reactions WHERE target_type = $1 AND target_id = $2 AND user_id = $3"
        ))
        .bind(target.kind.as_str())
        .bind(target.id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.as_ref().map(reaction_from_row).transpose()
    }

    /// The `(target_type, target_id, user_id)` unique key turns a racing
    /// second insert into `Conflict`.
    async fn insert_reaction(&self, r: &Reaction) -> Result<()> {
        sqlx::query(&format!("INSERT INTO reactions ({REACTION_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6)"))
            .bind(r.id)
            .bind(r.target.kind.as_str())
            .bind(r.target.id)
            .bind(&r.user_id)
            .bind(&r.reaction_type)
            .bind(r.created_at)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn delete_reaction(&self, id: Uuid) -> Result<bool> {
        let done = sqlx::query("DELETE FROM reactions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(done.rows_affected() > 0)
    }

    async fn count_reactions(&self, target: TargetRef) -> Result<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reactions WHERE target_type = $1 AND target_id = $2")
            .bind(target.kind.as_str())
            .bind(target.id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(count(total))
    }
}
