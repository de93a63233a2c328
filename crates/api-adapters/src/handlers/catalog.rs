//! `products.*`: catalog reads, product CRUD, stock and semantic search.

use axum::extract::State;
use axum::Json;
use domains::{NewProduct, Product, ProductPatch, ProductStats, StockAdjustment};
use serde::Deserialize;
use services::search::SemanticMatch;
use services::stock::AdjustedStock;
use uuid::Uuid;

use super::{success, ById, Paging, RpcResult, Search, Success, Update};
use crate::extract::{CurrentUser, Input};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BySku {
    pub sku: String,
}

#[derive(Debug, Deserialize)]
pub struct SetStock {
    pub id: Uuid,
    pub quantity: i32,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AdjustStock {
    pub id: Uuid,
    pub delta: i32,
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct StockHistory {
    pub id: Uuid,
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SemanticQuery {
    pub query: String,
    #[serde(default)]
    pub limit: Option<usize>,
}

pub async fn list(State(state): State<AppState>, Input(p): Input<Paging>) -> RpcResult<Vec<Product>> {
    Ok(Json(state.services.products.list(p.limit).await?))
}

pub async fn get_by_id(State(state): State<AppState>, Input(p): Input<ById>) -> RpcResult<Option<Product>> {
    Ok(Json(state.services.products.get(p.id).await?))
}

pub async fn get_by_sku(State(state): State<AppState>, Input(p): Input<BySku>) -> RpcResult<Option<Product>> {
    Ok(Json(state.services.products.get_by_sku(&p.sku).await?))
}

pub async fn search(State(state): State<AppState>, Input(p): Input<Search>) -> RpcResult<Vec<Product>> {
    Ok(Json(state.services.products.search(&p.query, p.limit).await?))
}

pub async fn stats(State(state): State<AppState>) -> RpcResult<ProductStats> {
    Ok(Json(state.services.products.stats().await?))
}

pub async fn low_stock(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Input(p): Input<Paging>,
) -> RpcResult<Vec<Product>> {
    Ok(Json(state.services.products.low_stock(&actor, p.limit).await?))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Input(input): Input<NewProduct>,
) -> RpcResult<Product> {
    Ok(Json(state.services.products.create(&actor, input).await?))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Input(p): Input<Update<ProductPatch>>,
) -> RpcResult<Product> {
    Ok(Json(state.services.products.update(&actor, p.id, p.data).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Input(p): Input<ById>,
) -> RpcResult<Success> {
    state.services.products.delete(&actor, p.id).await?;
    success()
}

pub async fn set_stock(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Input(p): Input<SetStock>,
) -> RpcResult<Product> {
    let product = state
        .services
        .stock
        .set_stock(&actor, p.id, p.quantity, p.note.as_deref())
        .await?;
    Ok(Json(product))
}

pub async fn adjust_stock(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Input(p): Input<AdjustStock>,
) -> RpcResult<AdjustedStock> {
    Ok(Json(state.services.stock.adjust_stock(&actor, p.id, p.delta, &p.reason).await?))
}

pub async fn stock_history(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Input(p): Input<StockHistory>,
) -> RpcResult<Vec<StockAdjustment>> {
    Ok(Json(state.services.stock.history(&actor, p.id, p.limit).await?))
}

pub async fn semantic_search(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Input(p): Input<SemanticQuery>,
) -> RpcResult<Vec<SemanticMatch>> {
    Ok(Json(state.services.search.semantic_search(&actor, &p.query, p.limit).await?))
}
