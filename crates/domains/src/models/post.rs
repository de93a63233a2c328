use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::string_enum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PostType {
    #[default]
    Bulletin,
    News,
    DieselTech,
    Announcement,
}

string_enum!(PostType {
    Bulletin => "bulletin",
    News => "news",
    DieselTech => "diesel_tech",
    Announcement => "announcement",
});

/// A bulletin/news feed entry. Deleting a post unpublishes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: PostType,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub external_link: Option<String>,
    pub tags: Vec<String>,
    pub author_id: String,
    pub is_pinned: bool,
    pub is_published: bool,
    pub view_count: i32,
    pub published_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn matches_query(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.title.to_lowercase().contains(&needle) || self.content.to_lowercase().contains(&needle)
    }

    pub fn apply(&mut self, patch: PostPatch) {
        if let Some(v) = patch.title {
            self.title = v;
        }
        if let Some(v) = patch.content {
            self.content = v;
        }
        if let Some(v) = patch.kind {
            self.kind = v;
        }
        if let Some(v) = patch.excerpt {
            self.excerpt = Some(v);
        }
        if let Some(v) = patch.featured_image {
            self.featured_image = Some(v);
        }
        if let Some(v) = patch.external_link {
            self.external_link = Some(v);
        }
        if let Some(v) = patch.tags {
            self.tags = v;
        }
        if let Some(v) = patch.is_pinned {
            self.is_pinned = v;
        }
        if let Some(v) = patch.is_published {
            self.is_published = v;
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    #[serde(default, rename = "type")]
    pub kind: PostType,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub external_link: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_pinned: bool,
}

impl NewPost {
    pub fn into_post(self, author_id: String, now: DateTime<Utc>) -> Post {
        Post {
            id: Uuid::now_v7(),
            title: self.title.trim().to_string(),
            content: self.content,
            kind: self.kind,
            excerpt: self.excerpt,
            featured_image: self.featured_image,
            external_link: self.external_link,
            tags: self.tags,
            author_id,
            is_pinned: self.is_pinned,
            is_published: true,
            view_count: 0,
            published_at: now,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<PostType>,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub external_link: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_pinned: Option<bool>,
    pub is_published: Option<bool>,
}
