use async_trait::async_trait;
use domains::{Document, DocumentCategory, DocumentRepo, DomainError, Post, PostRepo, Result};
use uuid::Uuid;

use super::{take, values, MemoryStore};

/// Pinned first, then most recently published.
fn feed_order(posts: &mut [Post]) {
    posts.sort_by(|a, b| {
        b.is_pinned
            .cmp(&a.is_pinned)
            .then_with(|| b.published_at.cmp(&a.published_at))
            .then_with(|| b.id.cmp(&a.id))
    });
}

fn shelf_order(documents: &mut [Document]) {
    documents.sort_by(|a, b| {
        a.category
            .as_str()
            .cmp(b.category.as_str())
            .then_with(|| a.order_index.cmp(&b.order_index))
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}

#[async_trait]
impl PostRepo for MemoryStore {
    async fn list_published(&self, limit: i64) -> Result<Vec<Post>> {
        self.check()?;
        let mut posts: Vec<Post> = values(&self.posts).into_iter().filter(|p| p.is_published).collect();
        feed_order(&mut posts);
        posts.truncate(take(limit));
        Ok(posts)
    }

    async fn get_post(&self, id: Uuid) -> Result<Option<Post>> {
        self.check()?;
        Ok(self.posts.get(&id).map(|p| p.clone()))
    }

    async fn search_published(&self, query: &str, limit: i64) -> Result<Vec<Post>> {
        self.check()?;
        let mut posts: Vec<Post> = values(&self.posts)
            .into_iter()
            .filter(|p| p.is_published && p.matches_query(query))
            .collect();
        feed_order(&mut posts);
        posts.truncate(take(limit));
        Ok(posts)
    }

    async fn insert_post(&self, post: &Post) -> Result<()> {
        self.check()?;
        self.posts.insert(post.id, post.clone());
        Ok(())
    }

    async fn update_post(&self, post: &Post) -> Result<()> {
        self.check()?;
        match self.posts.get_mut(&post.id) {
            Some(mut stored) => {
                // Counters are owned by the store.
                let views = stored.view_count;
                *stored = post.clone();
                stored.view_count = views;
                Ok(())
            }
            None => Err(DomainError::not_found("post", post.id)),
        }
    }

    async fn increment_post_views(&self, id: Uuid) -> Result<()> {
        self.check()?;
        if let Some(mut post) = self.posts.get_mut(&id) {
            post.view_count = post.view_count.saturating_add(1);
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentRepo for MemoryStore {
    async fn list_public(&self, category: Option<DocumentCategory>, limit: i64) -> Result<Vec<Document>> {
        self.check()?;
        let mut documents: Vec<Document> = values(&self.documents)
            .into_iter()
            .filter(|d| d.is_public && category.is_none_or(|c| d.category == c))
            .collect();
        shelf_order(&mut documents);
        documents.truncate(take(limit));
        Ok(documents)
    }

    async fn get_document(&self, id: Uuid) -> Result<Option<Document>> {
        self.check()?;
        Ok(self.documents.get(&id).map(|d| d.clone()))
    }

    async fn search_public(&self, query: &str, limit: i64) -> Result<Vec<Document>> {
        self.check()?;
        let mut documents: Vec<Document> = values(&self.documents)
            .into_iter()
            .filter(|d| d.is_public && d.matches_query(query))
            .collect();
        shelf_order(&mut documents);
        documents.truncate(take(limit));
        Ok(documents)
    }

    async fn insert_document(&self, document: &Document) -> Result<()> {
        self.check()?;
        self.documents.insert(document.id, document.clone());
        Ok(())
    }

    async fn update_document(&self, document: &Document) -> Result<()> {
        self.check()?;
        match self.documents.get_mut(&document.id) {
            Some(mut stored) => {
                let (views, downloads) = (stored.view_count, stored.download_count);
                *stored = document.clone();
                stored.view_count = views;
                stored.download_count = downloads;
                Ok(())
            }
            None => Err(DomainError::not_found("document", document.id)),
        }
    }

    async fn delete_document(&self, id: Uuid) -> Result<bool> {
        self.check()?;
        Ok(self.documents.remove(&id).is_some())
    }

    async fn increment_document_views(&self, id: Uuid) -> Result<()> {
        self.check()?;
        if let Some(mut document) = self.documents.get_mut(&id) {
            document.view_count = document.view_count.saturating_add(1);
        }
        Ok(())
    }

    async fn increment_document_downloads(&self, id: Uuid) -> Result<()> {
        self.check()?;
        if let Some(mut document) = self.documents.get_mut(&id) {
            document.download_count = document.download_count.saturating_add(1);
        }
        Ok(())
    }
}
