//! # Comment Engine
//!
//! Threaded comments attached to any commentable entity through a
//! `(target_type, target_id)` pair. [`CommentEngine`] is the storage-facing
//! core and carries no authorization beyond target visibility;
//! [`CommentService`] layers the authorship policy on top.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use domains::{build_thread, Comment, CommentNode, CommentRepo, DomainError, Result, TargetRef};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::access::{Actor, Policy};
use crate::degrade::degrade_read;
use crate::targets::TargetResolver;

#[derive(Clone)]
pub struct CommentEngine {
    comments: Arc<dyn CommentRepo>,
    targets: TargetResolver,
}

impl CommentEngine {
    pub fn new(comments: Arc<dyn CommentRepo>, targets: TargetResolver) -> Self {
        Self { comments, targets }
    }

    /// Non-deleted comments on the target, oldest first.
    pub async fn list(&self, target: TargetRef) -> Result<Vec<Comment>> {
        self.comments.list_comments(target).await
    }

    /// Includes soft-deleted rows.
    pub async fn get(&self, id: Uuid) -> Result<Option<Comment>> {
        self.comments.get_comment(id).await
    }

    pub async fn is_visible(&self, viewer: &Actor, target: TargetRef) -> Result<bool> {
        self.targets.is_visible(viewer, target).await
    }

    pub async fn create(
        &self,
        target: TargetRef,
        author: &Actor,
        content: &str,
        parent_id: Option<Uuid>,
    ) -> Result<Comment> {
        if !target.kind.accepts_comments() {
            return Err(DomainError::validation(format!("{} targets do not accept comments", target.kind)));
        }
        let content = non_empty(content)?;

        // 1. The target must exist in the table its kind names and be visible to the author
        self.targets.ensure_visible(author, target).await?;

        // 2. A reply must stay inside its parent's thread
        if let Some(parent_id) = parent_id {
            let parent = self.comments.get_comment(parent_id).await?;
            if !parent.is_some_and(|p| p.target == target) {
                return Err(DomainError::not_found("comment", parent_id));
            }
        }

        let comment = Comment::new(target, author.id().to_string(), content, parent_id, Utc::now());
        self.comments.insert_comment(&comment).await?;
        debug!(comment_id = %comment.id, %target, "comment created");
        Ok(comment)
    }

    pub async fn update(&self, id: Uuid, content: &str) -> Result<Comment> {
        let content = non_empty(content)?;
        self.comments
            .update_comment_content(id, &content, Utc::now())
            .await?
            .ok_or_else(|| DomainError::not_found("comment", id))
    }

    /// Soft delete. Replies keep pointing at the deleted parent.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if self.comments.soft_delete_comment(id, Utc::now()).await? {
            Ok(())
        } else {
            Err(DomainError::not_found("comment", id))
        }
    }
}

fn non_empty(content: &str) -> Result<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation("comment content must not be empty"));
    }
    Ok(trimmed.to_string())
}

/// Comment use cases as exposed to callers.
#[derive(Clone)]
pub struct CommentService {
    engine: CommentEngine,
    policy: Policy,
}

impl CommentService {
    pub fn new(engine: CommentEngine, policy: Policy) -> Self {
        Self { engine, policy }
    }

    /// Empty when the target is missing or hidden from `viewer`.
    pub async fn list(&self, viewer: &Actor, target: TargetRef) -> Result<Vec<Comment>> {
        degrade_read("comments.list", self.visible_listing(viewer, target).await)
    }

    async fn visible_listing(&self, viewer: &Actor, target: TargetRef) -> Result<Vec<Comment>> {
        if !self.engine.is_visible(viewer, target).await? {
            return Ok(Vec::new());
        }
        self.engine.list(target).await
    }

    /// The same listing grouped into reply trees. Soft-deleted ancestors of
    /// visible replies are fetched so their placeholders sit at their own depth.
    pub async fn thread(&self, viewer: &Actor, target: TargetRef) -> Result<Vec<CommentNode>> {
        let mut comments = self.list(viewer, target).await?;
        let mut known: HashSet<Uuid> = comments.iter().map(|c| c.id).collect();
        let mut pending: Vec<Uuid> = comments.iter().filter_map(|c| c.parent_comment_id).collect();

        while let Some(id) = pending.pop() {
            if !known.insert(id) {
                continue;
            }
            let ancestor = degrade_read("comments.thread", self.engine.get(id).await)?;
            if let Some(ancestor) = ancestor.filter(|a| a.target == target) {
                pending.extend(ancestor.parent_comment_id);
                comments.push(ancestor);
            }
        }

        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(build_thread(comments))
    }

    #[instrument(skip(self, actor, content), fields(actor = %actor.id(), %target))]
    pub async fn create(
        &self,
        actor: &Actor,
        target: TargetRef,
        content: &str,
        parent_id: Option<Uuid>,
    ) -> Result<Comment> {
        self.engine.create(target, actor, content, parent_id).await
    }

    #[instrument(skip(self, actor, content), fields(actor = %actor.id()))]
    pub async fn update(&self, actor: &Actor, id: Uuid, content: &str) -> Result<Comment> {
        self.authorize(actor, id).await?;
        self.engine.update(id, content).await
    }

    #[instrument(skip(self, actor), fields(actor = %actor.id()))]
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<()> {
        self.authorize(actor, id).await?;
        self.engine.delete(id).await
    }

    async fn authorize(&self, actor: &Actor, id: Uuid) -> Result<()> {
        if !self.policy.enforce_comment_authorship {
            return Ok(());
        }
        let comment = self
            .engine
            .get(id)
            .await?
            .filter(|c| !c.is_deleted)
            .ok_or_else(|| DomainError::not_found("comment", id))?;
        actor.require_owner_or_admin(&comment.author_id, "comment")
    }
}
