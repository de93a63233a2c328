//! `comments.*` and `reactions.*`, addressed by `{target_type, target_id}`.

use axum::extract::State;
use axum::Json;
use domains::{Comment, CommentNode, ReactionToggle, TargetRef};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{success, ById, RpcResult, Success};
use crate::extract::{CurrentUser, Input};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NewComment {
    #[serde(flatten)]
    pub target: TargetRef,
    pub content: String,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct EditComment {
    pub id: Uuid,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ToggleReaction {
    #[serde(flatten)]
    pub target: TargetRef,
    #[serde(default)]
    pub reaction_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReactionCount {
    pub count: u64,
}

#[derive(Debug, Serialize)]
pub struct Reacted {
    pub reacted: bool,
}

pub async fn list_comments(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Input(target): Input<TargetRef>,
) -> RpcResult<Vec<Comment>> {
    Ok(Json(state.services.comments.list(&actor, target).await?))
}

pub async fn comment_thread(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Input(target): Input<TargetRef>,
) -> RpcResult<Vec<CommentNode>> {
    Ok(Json(state.services.comments.thread(&actor, target).await?))
}

pub async fn create_comment(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Input(p): Input<NewComment>,
) -> RpcResult<Comment> {
    let comment = state
        .services
        .comments
        .create(&actor, p.target, &p.content, p.parent_id)
        .await?;
    Ok(Json(comment))
}

pub async fn update_comment(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Input(p): Input<EditComment>,
) -> RpcResult<Comment> {
    Ok(Json(state.services.comments.update(&actor, p.id, &p.content).await?))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Input(p): Input<ById>,
) -> RpcResult<Success> {
    state.services.comments.delete(&actor, p.id).await?;
    success()
}

pub async fn toggle_reaction(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Input(p): Input<ToggleReaction>,
) -> RpcResult<ReactionToggle> {
    let toggled = state
        .services
        .reactions
        .toggle(&actor, p.target, p.reaction_type.as_deref())
        .await?;
    Ok(Json(toggled))
}

pub async fn count_reactions(
    State(state): State<AppState>,
    CurrentUser(_actor): CurrentUser,
    Input(target): Input<TargetRef>,
) -> RpcResult<ReactionCount> {
    let count = state.services.reactions.count(target).await?;
    Ok(Json(ReactionCount { count }))
}

pub async fn has_reacted(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Input(target): Input<TargetRef>,
) -> RpcResult<Reacted> {
    let reacted = state.services.reactions.has_reacted(&actor, target).await?;
    Ok(Json(Reacted { reacted }))
}
