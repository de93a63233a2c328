//! Resolves a polymorphic `(target_type, target_id)` pair against the table
//! its kind names. Training material is stored as documents.
//!
//! Resolution is always on behalf of a viewer: an unpublished post or a
//! private document resolves only for its author and administrators, and a
//! comment resolves only when the entity it hangs off does.

use std::sync::Arc;

use domains::{CommentRepo, DocumentRepo, DomainError, PostRepo, Result, TargetKind, TargetRef};

use crate::access::Actor;

#[derive(Clone)]
pub struct TargetResolver {
    posts: Arc<dyn PostRepo>,
    documents: Arc<dyn DocumentRepo>,
    comments: Arc<dyn CommentRepo>,
}

impl TargetResolver {
    pub fn new(posts: Arc<dyn PostRepo>, documents: Arc<dyn DocumentRepo>, comments: Arc<dyn CommentRepo>) -> Self {
        Self { posts, documents, comments }
    }

    /// `NotFound` unless the target exists and `viewer` may see it.
    /// Soft-deleted comments do not resolve.
    pub async fn ensure_visible(&self, viewer: &Actor, target: TargetRef) -> Result<()> {
        if self.is_visible(viewer, target).await? {
            Ok(())
        } else {
            Err(DomainError::not_found(target.kind.as_str(), target.id))
        }
    }

    pub async fn is_visible(&self, viewer: &Actor, target: TargetRef) -> Result<bool> {
        match target.kind {
            TargetKind::Comment => match self.comments.get_comment(target.id).await? {
                Some(comment) if !comment.is_deleted => self.entity_visible(viewer, comment.target).await,
                _ => Ok(false),
            },
            _ => self.entity_visible(viewer, target).await,
        }
    }

    async fn entity_visible(&self, viewer: &Actor, target: TargetRef) -> Result<bool> {
        Ok(match target.kind {
            TargetKind::Post => self
                .posts
                .get_post(target.id)
                .await?
                .is_some_and(|p| viewer.can_see(&p.author_id, p.is_published)),
            TargetKind::Document | TargetKind::TrainingMaterial => self
                .documents
                .get_document(target.id)
                .await?
                .is_some_and(|d| viewer.can_see(&d.uploaded_by, d.is_public)),
            // Comments never hang off other comments.
            TargetKind::Comment => false,
        })
    }
}
