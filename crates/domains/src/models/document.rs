use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::string_enum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DocumentCategory {
    TrainingVideo,
    EquipmentManual,
    SafetyGuideline,
    InventoryGuide,
    Faq,
    #[default]
    General,
}

string_enum!(DocumentCategory {
    TrainingVideo => "training_video",
    EquipmentManual => "equipment_manual",
    SafetyGuideline => "safety_guideline",
    InventoryGuide => "inventory_guide",
    Faq => "faq",
    General => "general",
});

/// Knowledge hub asset: manuals, guides, FAQs and training videos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: DocumentCategory,
    pub file_url: Option<String>,
    pub file_type: Option<String>,
    /// Bytes.
    pub file_size: Option<i64>,
    pub thumbnail_url: Option<String>,
    /// Seconds.
    pub duration: Option<i32>,
    pub video_platform: Option<String>,
    pub video_id: Option<String>,
    pub uploaded_by: String,
    pub tags: Vec<String>,
    pub is_public: bool,
    pub view_count: i32,
    pub download_count: i32,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    pub fn matches_query(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
    }

    pub fn apply(&mut self, patch: DocumentPatch) {
        if let Some(v) = patch.title {
            self.title = v;
        }
        if let Some(v) = patch.description {
            self.description = Some(v);
        }
        if let Some(v) = patch.category {
            self.category = v;
        }
        if let Some(v) = patch.file_url {
            self.file_url = Some(v);
        }
        if let Some(v) = patch.file_type {
            self.file_type = Some(v);
        }
        if let Some(v) = patch.file_size {
            self.file_size = Some(v);
        }
        if let Some(v) = patch.thumbnail_url {
            self.thumbnail_url = Some(v);
        }
        if let Some(v) = patch.duration {
            self.duration = Some(v);
        }
        if let Some(v) = patch.video_platform {
            self.video_platform = Some(v);
        }
        if let Some(v) = patch.video_id {
            self.video_id = Some(v);
        }
        if let Some(v) = patch.tags {
            self.tags = v;
        }
        if let Some(v) = patch.is_public {
            self.is_public = v;
        }
        if let Some(v) = patch.order_index {
            self.order_index = v;
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewDocument {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: DocumentCategory,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub file_size: Option<i64>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub duration: Option<i32>,
    #[serde(default)]
    pub video_platform: Option<String>,
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_public: Option<bool>,
    #[serde(default)]
    pub order_index: i32,
}

impl NewDocument {
    pub fn into_document(self, uploaded_by: String, now: DateTime<Utc>) -> Document {
        Document {
            id: Uuid::now_v7(),
            title: self.title.trim().to_string(),
            description: self.description,
            category: self.category,
            file_url: self.file_url,
            file_type: self.file_type,
            file_size: self.file_size,
            thumbnail_url: self.thumbnail_url,
            duration: self.duration,
            video_platform: self.video_platform,
            video_id: self.video_id,
            uploaded_by,
            tags: self.tags,
            is_public: self.is_public.unwrap_or(true),
            view_count: 0,
            download_count: 0,
            order_index: self.order_index,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<DocumentCategory>,
    pub file_url: Option<String>,
    pub file_type: Option<String>,
    pub file_size: Option<i64>,
    pub thumbnail_url: Option<String>,
    pub duration: Option<i32>,
    pub video_platform: Option<String>,
    pub video_id: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_public: Option<bool>,
    pub order_index: Option<i32>,
}
