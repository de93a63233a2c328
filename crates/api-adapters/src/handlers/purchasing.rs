//! `vendors.*` and `purchaseOrders.*`.

use axum::extract::State;
use axum::Json;
use domains::{
    NewPurchaseOrder, NewVendor, PurchaseOrder, PurchaseOrderDetail, PurchaseOrderPatch, ReceiptOutcome, Vendor,
    VendorPatch,
};
use serde::Deserialize;
use uuid::Uuid;

use super::{success, ById, Paging, RpcResult, Success, Update};
use crate::extract::{CurrentUser, Input};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ReceiveLine {
    pub po_id: Uuid,
    pub line_id: Uuid,
    pub quantity: i32,
}

pub async fn list_vendors(State(state): State<AppState>, CurrentUser(actor): CurrentUser) -> RpcResult<Vec<Vendor>> {
    Ok(Json(state.services.vendors.list(&actor).await?))
}

pub async fn get_vendor(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Input(p): Input<ById>,
) -> RpcResult<Option<Vendor>> {
    Ok(Json(state.services.vendors.get(&actor, p.id).await?))
}

pub async fn create_vendor(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Input(input): Input<NewVendor>,
) -> RpcResult<Vendor> {
    Ok(Json(state.services.vendors.create(&actor, input).await?))
}

pub async fn update_vendor(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Input(p): Input<Update<VendorPatch>>,
) -> RpcResult<Vendor> {
    Ok(Json(state.services.vendors.update(&actor, p.id, p.data).await?))
}

pub async fn delete_vendor(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Input(p): Input<ById>,
) -> RpcResult<Success> {
    state.services.vendors.delete(&actor, p.id).await?;
    success()
}

pub async fn list_orders(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Input(p): Input<Paging>,
) -> RpcResult<Vec<PurchaseOrder>> {
    Ok(Json(state.services.purchase_orders.list(&actor, p.limit).await?))
}

pub async fn get_order(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Input(p): Input<ById>,
) -> RpcResult<Option<PurchaseOrderDetail>> {
    Ok(Json(state.services.purchase_orders.get(&actor, p.id).await?))
}

pub async fn create_order(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Input(input): Input<NewPurchaseOrder>,
) -> RpcResult<PurchaseOrderDetail> {
    Ok(Json(state.services.purchase_orders.create(&actor, input).await?))
}

pub async fn update_order(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Input(p): Input<Update<PurchaseOrderPatch>>,
) -> RpcResult<PurchaseOrder> {
    Ok(Json(state.services.purchase_orders.update(&actor, p.id, p.data).await?))
}

pub async fn delete_order(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Input(p): Input<ById>,
) -> RpcResult<Success> {
    state.services.purchase_orders.delete(&actor, p.id).await?;
    success()
}

pub async fn receive_line_item(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Input(p): Input<ReceiveLine>,
) -> RpcResult<ReceiptOutcome> {
    let outcome = state
        .services
        .purchase_orders
        .receive_line_item(&actor, p.po_id, p.line_id, p.quantity)
        .await?;
    Ok(Json(outcome))
}
