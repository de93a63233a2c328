//! # Handlers
//!
//! One async fn per procedure. Each decodes its input, resolves the caller
//! and delegates to the matching service; nothing here decides access.

pub mod admin;
pub mod catalog;
pub mod content;
pub mod interactions;
pub mod purchasing;
pub mod workflow;

use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

pub type RpcResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Deserialize)]
pub struct ById {
    pub id: Uuid,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Paging {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct Search {
    pub query: String,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// `{id, data}` where `data` holds the fields to change.
#[derive(Debug, Deserialize)]
pub struct Update<P> {
    pub id: Uuid,
    pub data: P,
}

#[derive(Debug, Serialize)]
pub struct Success {
    pub success: bool,
}

pub(crate) fn success() -> RpcResult<Success> {
    Ok(Json(Success { success: true }))
}
