use async_trait::async_trait;
use domains::{Document, DocumentCategory, DocumentRepo, DomainError, Post, PostRepo, PostType, Result};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use uuid::Uuid;

use super::{col, db_err, enum_col, like_pattern, PgStore};

const POST_COLUMNS: &str = "id, title, content, kind, excerpt, featured_image, external_link, tags, author_id, \
     is_pinned, is_published, view_count, published_at, created_at, updated_at";

const DOCUMENT_COLUMNS: &str = "id, title, description, category, file_url, file_type, file_size, thumbnail_url, \
     duration, video_platform, video_id, uploaded_by, tags, is_public, view_count, download_count, order_index, \
     created_at, updated_at";

fn post_from_row(row: &PgRow) -> Result<Post> {
    let tags: Json<Vec<String>> = col(row, "tags")?;
    Ok(Post {
        id: col(row, "id")?,
        title: col(row, "title")?,
        content: col(row, "content")?,
        kind: enum_col(row, "kind", PostType::parse)?,
        excerpt: col(row, "excerpt")?,
        featured_image: col(row, "featured_image")?,
        external_link: col(row, "external_link")?,
        tags: tags.0,
        author_id: col(row, "author_id")?,
        is_pinned: col(row, "is_pinned")?,
        is_published: col(row, "is_published")?,
        view_count: col(row, "view_count")?,
        published_at: col(row, "published_at")?,
        created_at: col(row, "created_at")?,
        updated_at: col(row, "updated_at")?,
    })
}

fn document_from_row(row: &PgRow) -> Result<Document> {
    let tags: Json<Vec<String>> = col(row, "tags")?;
    Ok(Document {
        id: col(row, "id")?,
        title: col(row, "title")?,
        description: col(row, "description")?,
        category: enum_col(row, "category", DocumentCategory::parse)?,
        file_url: col(row, "file_url")?,
        file_type: col(row, "file_type")?,
        file_size: col(row, "file_size")?,
        thumbnail_url: col(row, "thumbnail_url")?,
        duration: col(row, "duration")?,
        video_platform: col(row, "video_platform")?,
        video_id: col(row, "video_id")?,
        uploaded_by: col(row, "uploaded_by")?,
        tags: tags.0,
        is_public: col(row, "is_public")?,
        view_count: col(row, "view_count")?,
        download_count: col(row, "download_count")?,
        order_index: col(row, "order_index")?,
        created_at: col(row, "created_at")?,
        updated_at: col(row, "updated_at")?,
    })
}

#[async_trait]
impl PostRepo for PgStore {
    async fn list_published(&self, limit: i64) -> Result<Vec<Post>> {
        let rows = sqlx::query(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE is_published \
             ORDER BY is_pinned DESC, published_at DESC, id DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(post_from_row).collect()
    }

    async fn get_post(&self, id: Uuid) -> Result<Option<Post>> {
        let row = sqlx::query(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(post_from_row).transpose()
    }

    async fn search_published(&self, query: &str, limit: i64) -> Result<Vec<Post>> {
        let rows = sqlx::query(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE is_published AND (title ILIKE $1 OR content ILIKE $1) \
             ORDER BY is_pinned DESC, published_at DESC, id DESC LIMIT $2"
        ))
        .bind(like_pattern(query))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(post_from_row).collect()
    }

    async fn insert_post(&self, p: &Post) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO posts ({POST_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)"
        ))
        .bind(p.id)
        .bind(&p.title)
        .bind(&p.content)
        .bind(p.kind.as_str())
        .bind(&p.excerpt)
        .bind(&p.featured_image)
        .bind(&p.external_link)
        .bind(Json(&p.tags))
        .bind(&p.author_id)
        .bind(p.is_pinned)
        .bind(p.is_published)
        .bind(p.view_count)
        .bind(p.published_at)
        .bind(p.created_at)
        .bind(p.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn update_post(&self, p: &Post) -> Result<()> {
        let done = sqlx::query(
            "UPDATE posts SET title = $2, content = $3, kind = $4, excerpt = $5, featured_image = $6, \
                 external_link = $7, tags = $8, is_pinned = $9, is_published = $10, published_at = $11, updated_at = $12 \
             WHERE id = $1",
        )
        .bind(p.id)
        .bind(&p.title)
        .bind(&p.content)
        .bind(p.kind.as_str())
        .bind(&p.excerpt)
        .bind(&p.featured_image)
        .bind(&p.external_link)
        .bind(Json(&p.tags))
        .bind(p.is_pinned)
        .bind(p.is_published)
        .bind(p.published_at)
        .bind(p.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        if done.rows_affected() == 0 {
            return Err(DomainError::not_found("post", p.id));
        }
        Ok(())
    }

    async fn increment_post_views(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE posts SET view_count = view_count + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}

#[async_trait]
impl DocumentRepo for PgStore {
    async fn list_public(&self, category: Option<DocumentCategory>, limit: i64) -> Result<Vec<Document>> {
        let rows = sqlx::query(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents \
             WHERE is_public AND ($1::text IS NULL OR category = $1) \
             ORDER BY category, order_index, created_at DESC LIMIT $2"
        ))
        .bind(category.map(|c| c.as_str()))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(document_from_row).collect()
    }

    async fn get_document(&self, id: Uuid) -> Result<Option<Document>> {
        let row = sqlx::query(&format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(document_from_row).transpose()
    }

    async fn search_public(&self, query: &str, limit: i64) -> Result<Vec<Document>> {
        let rows = sqlx::query(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents \
             WHERE is_public AND (title ILIKE $1 OR description ILIKE $1) \
             ORDER BY category, order_index, created_at DESC LIMIT $2"
        ))
        .bind(like_pattern(query))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(document_from_row).collect()
    }

    async fn insert_document(&self, d: &Document) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO documents ({DOCUMENT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)"
        ))
        .bind(d.id)
        .bind(&d.title)
        .bind(&d.description)
        .bind(d.category.as_str())
        .bind(&d.file_url)
        .bind(&d.file_type)
        .bind(d.file_size)
        .bind(&d.thumbnail_url)
        .bind(d.duration)
        .bind(&d.video_platform)
        .bind(&d.video_id)
        .bind(&d.uploaded_by)
        .bind(Json(&d.tags))
        .bind(d.is_public)
        .bind(d.view_count)
        .bind(d.download_count)
        .bind(d.order_index)
        .bind(d.created_at)
        .bind(d.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn update_document(&self, d: &Document) -> Result<()> {
        let done = sqlx::query(
            "UPDATE documents SET title = $2, description = $3, category = $4, file_url = $5, file_type = $6, \
                 file_size = $7, thumbnail_url = $8, duration = $9, video_platform = $10, video_id = $11, tags = $12, \
                 is_public = $13, order_index = $14, updated_at = $15 \
             WHERE id = $1",
        )
        .bind(d.id)
        .bind(&d.title)
        .bind(&d.description)
        .bind(d.category.as_str())
        .bind(&d.file_url)
        .bind(&d.file_type)
        .bind(d.file_size)
        .bind(&d.thumbnail_url)
        .bind(d.duration)
        .bind(&d.video_platform)
        .bind(&d.video_id)
        .bind(Json(&d.tags))
        .bind(d.is_public)
        .bind(d.order_index)
        .bind(d.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        if done.rows_affected() == 0 {
            return Err(DomainError::not_found("document", d.id));
        }
        Ok(())
    }

    async fn delete_document(&self, id: Uuid) -> Result<bool> {
        let done = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(done.rows_affected() > 0)
    }

    async fn increment_document_views(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE documents SET view_count = view_count + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn increment_document_downloads(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE documents SET download_count = download_count + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}
