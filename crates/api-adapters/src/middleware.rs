//! # Middleware
//!
//! Request tracing, request ids, CORS and per-procedure counters.

use std::time::Duration;

use axum::body::Body;
use axum::extract::{MatchedPath, Request, State};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method};
use axum::middleware::Next;
use axum::response::Response;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::info_span;

use crate::error::code_for;
use crate::state::AppState;

pub const REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Wraps the router in the layers every deployment runs with.
/// Outermost first: request id, trace span, id propagation, CORS.
pub fn standard_middleware(router: Router) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(REQUEST_ID, MakeRequestUuid))
            .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                let request_id = req
                    .headers()
                    .get(REQUEST_ID)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                info_span!("http", method = %req.method(), uri = %req.uri(), request_id)
            }))
            .layer(PropagateRequestIdLayer::new(REQUEST_ID))
            .layer(cors_policy()),
    )
}

/// The browser client may live on another origin; credentials travel in the
/// `Authorization` header, never cookies.
pub fn cors_policy() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .max_age(Duration::from_secs(3600))
}

/// Counts each RPC call by procedure and outcome code.
pub async fn track_rpc(State(state): State<AppState>, path: Option<MatchedPath>, req: Request, next: Next) -> Response {
    let procedure = path
        .as_ref()
        .map(|p| p.as_str().trim_start_matches("/rpc/").to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let response = next.run(req).await;
    state.metrics.observe(&procedure, code_for(response.status()));
    response
}
