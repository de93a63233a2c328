//! Polymorphic comments and reactions.
//!
//! Neither table knows the concrete shape of what it is attached to; a
//! `TargetRef` (kind discriminator + id) names the target instead of a
//! foreign key per entity kind.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::string_enum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Post,
    Document,
    TrainingMaterial,
    Comment,
}

string_enum!(TargetKind {
    Post => "post",
    Document => "document",
    TrainingMaterial => "training_material",
    Comment => "comment",
});

impl TargetKind {
    /// Comments attach to content, never to other comments (replies use
    /// `parent_comment_id` instead).
    pub fn accepts_comments(&self) -> bool {
        !matches!(self, TargetKind::Comment)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetRef {
    #[serde(rename = "target_type")]
    pub kind: TargetKind,
    #[serde(rename = "target_id")]
    pub id: Uuid,
}

impl TargetRef {
    pub fn new(kind: TargetKind, id: Uuid) -> Self {
        Self { kind, id }
    }
}

impl std::fmt::Display for TargetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    #[serde(flatten)]
    pub target: TargetRef,
    pub content: String,
    pub parent_comment_id: Option<Uuid>,
    pub author_id: String,
    pub is_edited: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(target: TargetRef, author_id: String, content: String, parent: Option<Uuid>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            target,
            content,
            parent_comment_id: parent,
            author_id,
            is_edited: false,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A node of a reconstructed reply tree. `comment` is `None` for a
/// soft-deleted ancestor that still has visible replies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentNode {
    pub id: Uuid,
    pub comment: Option<Comment>,
    pub replies: Vec<CommentNode>,
}

impl CommentNode {
    pub fn is_placeholder(&self) -> bool {
        self.comment.is_none()
    }
}

/// Groups a flat, oldest-first listing on `parent_comment_id`.
///
/// Soft-deleted comments in the listing become placeholder nodes at their own
/// depth, and are dropped when nothing visible hangs below them. Replies whose
/// parent is absent from the listing altogether hang off a top-level
/// placeholder so the thread keeps its shape.
pub fn build_thread(comments: Vec<Comment>) -> Vec<CommentNode> {
    let present: std::collections::HashSet<Uuid> = comments.iter().map(|c| c.id).collect();
    let mut children: HashMap<Option<Uuid>, Vec<Comment>> = HashMap::new();
    let mut unknown_parents: Vec<Uuid> = Vec::new();

    for comment in comments {
        let parent = comment.parent_comment_id;
        if let Some(pid) = parent {
            if !present.contains(&pid) && !unknown_parents.contains(&pid) {
                unknown_parents.push(pid);
            }
        }
        children.entry(parent).or_default().push(comment);
    }

    fn replies_of(id: Uuid, children: &mut HashMap<Option<Uuid>, Vec<Comment>>) -> Vec<CommentNode> {
        children
            .remove(&Some(id))
            .unwrap_or_default()
            .into_iter()
            .filter_map(|c| attach(c, children))
            .collect()
    }

    fn attach(comment: Comment, children: &mut HashMap<Option<Uuid>, Vec<Comment>>) -> Option<CommentNode> {
        let id = comment.id;
        let replies = replies_of(id, children);
        if !comment.is_deleted {
            return Some(CommentNode { id, comment: Some(comment), replies });
        }
        (!replies.is_empty()).then_some(CommentNode { id, comment: None, replies })
    }

    let mut roots: Vec<CommentNode> = children
        .remove(&None)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|c| attach(c, &mut children))
        .collect();

    for pid in unknown_parents {
        let replies = replies_of(pid, &mut children);
        if !replies.is_empty() {
            roots.push(CommentNode { id: pid, comment: None, replies });
        }
    }
    roots
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    pub id: Uuid,
    #[serde(flatten)]
    pub target: TargetRef,
    pub user_id: String,
    pub reaction_type: String,
    pub created_at: DateTime<Utc>,
}

impl Reaction {
    pub const DEFAULT_TYPE: &'static str = "like";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionToggle {
    pub added: bool,
}
