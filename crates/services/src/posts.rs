//! Bulletin / news feed.

use std::sync::Arc;

use chrono::Utc;
use domains::{DomainError, NewPost, Post, PostPatch, PostRepo, Result};
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::access::Actor;
use crate::degrade::degrade_read;
use crate::limit_or;

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepo>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepo>) -> Self {
        Self { posts }
    }

    /// Published posts: pinned first, then most recently published.
    pub async fn list(&self, limit: Option<i64>) -> Result<Vec<Post>> {
        degrade_read("posts.list", self.posts.list_published(limit_or(limit, 50)).await)
    }

    /// Counts a view. Unpublished posts are only visible to their author and
    /// administrators.
    pub async fn get(&self, actor: &Actor, id: Uuid) -> Result<Option<Post>> {
        let Some(mut post) = degrade_read("posts.get", self.posts.get_post(id).await)? else {
            return Ok(None);
        };
        if !actor.can_see(&post.author_id, post.is_published) {
            return Ok(None);
        }

        match self.posts.increment_post_views(id).await {
            Ok(()) => post.view_count += 1,
            Err(e) => warn!(post_id = %id, error = %e, "view count not recorded"),
        }
        Ok(Some(post))
    }

    pub async fn search(&self, query: &str, limit: Option<i64>) -> Result<Vec<Post>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        degrade_read("posts.search", self.posts.search_published(query, limit_or(limit, 20)).await)
    }

    #[instrument(skip(self, actor, input), fields(actor = %actor.id()))]
    pub async fn create(&self, actor: &Actor, input: NewPost) -> Result<Post> {
        let post = input.into_post(actor.id().to_string(), Utc::now());
        validate(&post)?;
        self.posts.insert_post(&post).await?;
        Ok(post)
    }

    #[instrument(skip(self, actor, patch), fields(actor = %actor.id()))]
    pub async fn update(&self, actor: &Actor, id: Uuid, patch: PostPatch) -> Result<Post> {
        let mut post = self.owned(actor, id).await?;
        let republished = patch.is_published == Some(true) && !post.is_published;
        post.apply(patch);
        validate(&post)?;

        let now = Utc::now();
        if republished {
            post.published_at = now;
        }
        post.updated_at = now;
        self.posts.update_post(&post).await?;
        Ok(post)
    }

    /// Unpublishes; the row and its comments stay.
    #[instrument(skip(self, actor), fields(actor = %actor.id()))]
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<()> {
        let mut post = self.owned(actor, id).await?;
        post.is_published = false;
        post.updated_at = Utc::now();
        self.posts.update_post(&post).await
    }

    async fn owned(&self, actor: &Actor, id: Uuid) -> Result<Post> {
        let post = self
            .posts
            .get_post(id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", id))?;
        actor.require_owner_or_admin(&post.author_id, "post")?;
        Ok(post)
    }
}

fn validate(post: &Post) -> Result<()> {
    if post.title.trim().is_empty() || post.content.trim().is_empty() {
        return Err(DomainError::validation("post title and content are required"));
    }
    Ok(())
}
