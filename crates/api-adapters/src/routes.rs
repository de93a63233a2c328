//! # Routes
//!
//! The full procedure table. Public procedures: `products.list`,
//! `products.getById`, `products.getBySku`, `products.search`,
//! `products.stats`, `auth.me`, `auth.logout`. Everything else requires a
//! bearer token.

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{middleware, Router};
use tracing::error;

use crate::error::ApiError;
use crate::handlers::{admin, catalog, content, interactions, purchasing, workflow};
use crate::middleware::{standard_middleware, track_rpc};
use crate::state::AppState;

const OPENMETRICS: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";

pub fn router(state: AppState) -> Router {
    let rpc = Router::new()
        // products
        .route("/rpc/products.list", post(catalog::list))
        .route("/rpc/products.getById", post(catalog::get_by_id))
        .route("/rpc/products.getBySku", post(catalog::get_by_sku))
        .route("/rpc/products.search", post(catalog::search))
        .route("/rpc/products.stats", post(catalog::stats))
        .route("/rpc/products.lowStock", post(catalog::low_stock))
        .route("/rpc/products.create", post(catalog::create))
        .route("/rpc/products.update", post(catalog::update))
        .route("/rpc/products.delete", post(catalog::delete))
        .route("/rpc/products.setStock", post(catalog::set_stock))
        .route("/rpc/products.adjustStock", post(catalog::adjust_stock))
        .route("/rpc/products.stockHistory", post(catalog::stock_history))
        .route("/rpc/products.semanticSearch", post(catalog::semantic_search))
        // vendors
        .route("/rpc/vendors.list", post(purchasing::list_vendors))
        .route("/rpc/vendors.getById", post(purchasing::get_vendor))
        .route("/rpc/vendors.create", post(purchasing::create_vendor))
        .route("/rpc/vendors.update", post(purchasing::update_vendor))
        .route("/rpc/vendors.delete", post(purchasing::delete_vendor))
        // purchase orders
        .route("/rpc/purchaseOrders.list", post(purchasing::list_orders))
        .route("/rpc/purchaseOrders.getById", post(purchasing::get_order))
        .route("/rpc/purchaseOrders.create", post(purchasing::create_order))
        .route("/rpc/purchaseOrders.update", post(purchasing::update_order))
        .route("/rpc/purchaseOrders.delete", post(purchasing::delete_order))
        .route("/rpc/purchaseOrders.receiveLineItem", post(purchasing::receive_line_item))
        // forms
        .route("/rpc/forms.listTemplates", post(workflow::list_templates))
        .route("/rpc/forms.getTemplate", post(workflow::get_template))
        .route("/rpc/forms.createTemplate", post(workflow::create_template))
        .route("/rpc/forms.updateTemplate", post(workflow::update_template))
        .route("/rpc/forms.deleteTemplate", post(workflow::delete_template))
        .route("/rpc/forms.submit", post(workflow::submit))
        .route("/rpc/forms.listSubmissions", post(workflow::list_submissions))
        .route("/rpc/forms.reviewSubmission", post(workflow::review_submission))
        // posts
        .route("/rpc/posts.list", post(content::list_posts))
        .route("/rpc/posts.getById", post(content::get_post))
        .route("/rpc/posts.search", post(content::search_posts))
        .route("/rpc/posts.create", post(content::create_post))
        .route("/rpc/posts.update", post(content::update_post))
        .route("/rpc/posts.delete", post(content::delete_post))
        // documents
        .route("/rpc/documents.list", post(content::list_documents))
        .route("/rpc/documents.getById", post(content::get_document))
        .route("/rpc/documents.search", post(content::search_documents))
        .route("/rpc/documents.recordDownload", post(content::record_download))
        .route("/rpc/documents.create", post(content::create_document))
        .route("/rpc/documents.update", post(content::update_document))
        .route("/rpc/documents.delete", post(content::delete_document))
        // comments & reactions
        .route("/rpc/comments.list", post(interactions::list_comments))
        .route("/rpc/comments.thread", post(interactions::comment_thread))
        .route("/rpc/comments.create", post(interactions::create_comment))
        .route("/rpc/comments.update", post(interactions::update_comment))
        .route("/rpc/comments.delete", post(interactions::delete_comment))
        .route("/rpc/reactions.toggle", post(interactions::toggle_reaction))
        .route("/rpc/reactions.count", post(interactions::count_reactions))
        .route("/rpc/reactions.hasReacted", post(interactions::has_reacted))
        // users, auth, analytics, export
        .route("/rpc/users.list", post(admin::list_users))
        .route("/rpc/users.updateRole", post(admin::update_role))
        .route("/rpc/auth.me", post(admin::me))
        .route("/rpc/auth.logout", post(admin::logout))
        .route("/rpc/analytics.dashboard", post(admin::dashboard))
        .route("/rpc/export.generate", post(admin::export))
        .route_layer(middleware::from_fn_with_state(state.clone(), track_rpc));

    let app = rpc
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .fallback(unknown_route)
        .with_state(state);

    standard_middleware(app)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn metrics(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(body) => ([(CONTENT_TYPE, OPENMETRICS)], body).into_response(),
        Err(err) => {
            error!(error = %err, "failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn unknown_route() -> ApiError {
    ApiError::not_found("no such procedure")
}
