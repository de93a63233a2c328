//! Knowledge hub: manuals, guides, FAQs and training videos.

use std::sync::Arc;

use chrono::Utc;
use domains::{Document, DocumentCategory, DocumentPatch, DocumentRepo, DomainError, NewDocument, Result};
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::access::Actor;
use crate::degrade::degrade_read;
use crate::limit_or;

#[derive(Clone)]
pub struct DocumentService {
    documents: Arc<dyn DocumentRepo>,
}

impl DocumentService {
    pub fn new(documents: Arc<dyn DocumentRepo>) -> Self {
        Self { documents }
    }

    /// Public documents, optionally narrowed to one category.
    pub async fn list(&self, category: Option<DocumentCategory>, limit: Option<i64>) -> Result<Vec<Document>> {
        let found = self.documents.list_public(category, limit_or(limit, 100)).await;
        degrade_read("documents.list", found)
    }

    /// Counts a view. Private documents are only visible to their uploader
    /// and administrators.
    pub async fn get(&self, actor: &Actor, id: Uuid) -> Result<Option<Document>> {
        let Some(mut document) = degrade_read("documents.get", self.documents.get_document(id).await)? else {
            return Ok(None);
        };
        if !actor.can_see(&document.uploaded_by, document.is_public) {
            return Ok(None);
        }

        match self.documents.increment_document_views(id).await {
            Ok(()) => document.view_count += 1,
            Err(e) => warn!(document_id = %id, error = %e, "view count not recorded"),
        }
        Ok(Some(document))
    }

    pub async fn search(&self, query: &str, limit: Option<i64>) -> Result<Vec<Document>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        degrade_read("documents.search", self.documents.search_public(query, limit_or(limit, 20)).await)
    }

    /// Private documents count as missing for anyone but their uploader and
    /// administrators.
    pub async fn record_download(&self, actor: &Actor, id: Uuid) -> Result<()> {
        let visible = self
            .documents
            .get_document(id)
            .await?
            .is_some_and(|d| actor.can_see(&d.uploaded_by, d.is_public));
        if !visible {
            return Err(DomainError::not_found("document", id));
        }
        self.documents.increment_document_downloads(id).await
    }

    #[instrument(skip(self, actor, input), fields(actor = %actor.id()))]
    pub async fn create(&self, actor: &Actor, input: NewDocument) -> Result<Document> {
        let document = input.into_document(actor.id().to_string(), Utc::now());
        validate(&document)?;
        self.documents.insert_document(&document).await?;
        Ok(document)
    }

    #[instrument(skip(self, actor, patch), fields(actor = %actor.id()))]
    pub async fn update(&self, actor: &Actor, id: Uuid, patch: DocumentPatch) -> Result<Document> {
        let mut document = self.owned(actor, id).await?;
        document.apply(patch);
        validate(&document)?;
        document.updated_at = Utc::now();
        self.documents.update_document(&document).await?;
        Ok(document)
    }

    #[instrument(skip(self, actor), fields(actor = %actor.id()))]
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<()> {
        self.owned(actor, id).await?;
        if !self.documents.delete_document(id).await? {
            return Err(DomainError::not_found("document", id));
        }
        Ok(())
    }

    async fn owned(&self, actor: &Actor, id: Uuid) -> Result<Document> {
        let document = self
            .documents
            .get_document(id)
            .await?
            .ok_or_else(|| DomainError::not_found("document", id))?;
        actor.require_owner_or_admin(&document.uploaded_by, "document")?;
        Ok(document)
    }
}

fn validate(document: &Document) -> Result<()> {
    if document.title.trim().is_empty() {
        return Err(DomainError::validation("document title must not be empty"));
    }
    if document.file_size.is_some_and(|s| s < 0) || document.duration.is_some_and(|d| d < 0) {
        return Err(DomainError::validation("file size and duration cannot be negative"));
    }
    Ok(())
}
