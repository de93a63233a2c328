//! `posts.*` and `documents.*`. Single reads bump view counters.

use axum::extract::State;
use axum::Json;
use domains::{Document, DocumentCategory, DocumentPatch, NewDocument, NewPost, Post, PostPatch};
use serde::Deserialize;

use super::{success, ById, Paging, RpcResult, Search, Success, Update};
use crate::extract::{CurrentUser, Input};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DocumentFilter {
    pub category: Option<DocumentCategory>,
    pub limit: Option<i64>,
}

pub async fn list_posts(
    State(state): State<AppState>,
    CurrentUser(_actor): CurrentUser,
    Input(p): Input<Paging>,
) -> RpcResult<Vec<Post>> {
    Ok(Json(state.services.posts.list(p.limit).await?))
}

pub async fn get_post(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Input(p): Input<ById>,
) -> RpcResult<Option<Post>> {
    Ok(Json(state.services.posts.get(&actor, p.id).await?))
}

pub async fn search_posts(
    State(state): State<AppState>,
    CurrentUser(_actor): CurrentUser,
    Input(p): Input<Search>,
) -> RpcResult<Vec<Post>> {
    Ok(Json(state.services.posts.search(&p.query, p.limit).await?))
}

pub async fn create_post(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Input(input): Input<NewPost>,
) -> RpcResult<Post> {
    Ok(Json(state.services.posts.create(&actor, input).await?))
}

pub async fn update_post(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Input(p): Input<Update<PostPatch>>,
) -> RpcResult<Post> {
    Ok(Json(state.services.posts.update(&actor, p.id, p.data).await?))
}

pub async fn delete_post(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Input(p): Input<ById>,
) -> RpcResult<Success> {
    state.services.posts.delete(&actor, p.id).await?;
    success()
}

pub async fn list_documents(
    State(state): State<AppState>,
    CurrentUser(_actor): CurrentUser,
    Input(p): Input<DocumentFilter>,
) -> RpcResult<Vec<Document>> {
    Ok(Json(state.services.documents.list(p.category, p.limit).await?))
}

pub async fn get_document(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Input(p): Input<ById>,
) -> RpcResult<Option<Document>> {
    Ok(Json(state.services.documents.get(&actor, p.id).await?))
}

pub async fn search_documents(
    State(state): State<AppState>,
    CurrentUser(_actor): CurrentUser,
    Input(p): Input<Search>,
) -> RpcResult<Vec<Document>> {
    Ok(Json(state.services.documents.search(&p.query, p.limit).await?))
}

pub async fn record_download(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Input(p): Input<ById>,
) -> RpcResult<Success> {
    state.services.documents.record_download(&actor, p.id).await?;
    success()
}

pub async fn create_document(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Input(input): Input<NewDocument>,
) -> RpcResult<Document> {
    Ok(Json(state.services.documents.create(&actor, input).await?))
}

pub async fn update_document(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Input(p): Input<Update<DocumentPatch>>,
) -> RpcResult<Document> {
    Ok(Json(state.services.documents.update(&actor, p.id, p.data).await?))
}

pub async fn delete_document(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Input(p): Input<ById>,
) -> RpcResult<Success> {
    state.services.documents.delete(&actor, p.id).await?;
    success()
}
