//! `auth.*`, `users.*`, `analytics.*` and `export.*`.

use axum::extract::State;
use axum::Json;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use domains::{DomainError, Role, User};
use serde::{Deserialize, Serialize};
use services::analytics::DashboardSummary;
use services::auth::{LogoutAck, Profile};
use services::export::{ExportFile, ExportFormat, ExportTable};

use super::RpcResult;
use crate::extract::{CurrentUser, Input, MaybeUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RoleChange {
    pub user_id: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub tables: Vec<ExportTable>,
    pub format: ExportFormat,
}

/// An export file as carried over JSON: content is base64.
#[derive(Debug, Serialize)]
pub struct ExportedFile {
    pub filename: String,
    pub content_type: String,
    pub data: String,
}

impl From<ExportFile> for ExportedFile {
    fn from(file: ExportFile) -> Self {
        Self {
            filename: file.filename,
            content_type: file.content_type.to_string(),
            data: STANDARD.encode(&file.data),
        }
    }
}

pub async fn me(State(state): State<AppState>, MaybeUser(actor): MaybeUser) -> RpcResult<Option<Profile>> {
    Ok(Json(state.services.auth.me(actor.as_ref())))
}

pub async fn logout(State(state): State<AppState>) -> RpcResult<LogoutAck> {
    Ok(Json(state.services.auth.logout()))
}

pub async fn list_users(State(state): State<AppState>, CurrentUser(actor): CurrentUser) -> RpcResult<Vec<User>> {
    Ok(Json(state.services.users.list(&actor).await?))
}

pub async fn update_role(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Input(p): Input<RoleChange>,
) -> RpcResult<User> {
    // Role deserialization is lossy; an explicit role change must name a real role.
    let role = Role::parse(p.role.trim()).ok_or_else(|| DomainError::validation(format!("unknown role '{}'", p.role)))?;
    Ok(Json(state.services.users.update_role(&actor, &p.user_id, role).await?))
}

pub async fn dashboard(State(state): State<AppState>, CurrentUser(actor): CurrentUser) -> RpcResult<DashboardSummary> {
    Ok(Json(state.services.analytics.dashboard(&actor).await?))
}

pub async fn export(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Input(p): Input<ExportRequest>,
) -> RpcResult<Vec<ExportedFile>> {
    let today = chrono::Utc::now().date_naive();
    let files = state.services.export.export(&actor, &p.tables, p.format, today).await?;
    Ok(Json(files.into_iter().map(ExportedFile::from).collect()))
}
