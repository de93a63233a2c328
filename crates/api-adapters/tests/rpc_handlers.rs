//! Drives the full router in-process against the memory store.

use std::sync::Arc;

use ai_adapters::DisabledRanker;
use api_adapters::{router, AppState};
use auth_adapters::JwtIdentityProvider;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use domains::{ExternalIdentity, Role, UserRepo};
use serde_json::{json, Value};
use services::{Policy, Repositories, Services};
use storage_adapters::MemoryStore;
use tower::ServiceExt;

const SECRET: &str = "rpc-handler-test-secret";

struct Harness {
    app: Router,
    store: Arc<MemoryStore>,
    jwt: JwtIdentityProvider,
}

impl Harness {
    fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let repos = Repositories::from_store(store.clone());
        let identity = Arc::new(JwtIdentityProvider::new(SECRET, None).unwrap());
        let services = Services::new(repos, identity, Arc::new(DisabledRanker), Policy::default());
        Self {
            app: router(AppState::new(services)),
            store,
            jwt: JwtIdentityProvider::new(SECRET, None).unwrap(),
        }
    }

    /// Provisions `subject` with `role` and returns a bearer token for it.
    async fn token_for(&self, subject: &str, role: Role) -> String {
        let identity = ExternalIdentity {
            subject: subject.to_string(),
            email: Some(format!("{subject}@example.com")),
            name: None,
        };
        self.store.upsert_user(&identity, "jwt", Utc::now()).await.unwrap();
        self.store.update_role(subject, role).await.unwrap();
        self.jwt.issue(&identity, Duration::hours(1)).unwrap()
    }

    async fn call(&self, procedure: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut req = Request::post(format!("/rpc/{procedure}")).header("content-type", "application/json");
        if let Some(token) = token {
            req = req.header("authorization", format!("Bearer {token}"));
        }
        let response = self
            .app
            .clone()
            .oneshot(req.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, value)
    }
}

#[tokio::test]
async fn public_catalog_reads_need_no_token() {
    let h = Harness::new();
    let (status, body) = h.call("products.list", None, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = h.call("products.stats", None, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn protected_procedures_reject_missing_and_bad_tokens() {
    let h = Harness::new();
    let (status, body) = h.call("purchaseOrders.list", None, json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");

    let (status, _) = h.call("purchaseOrders.list", Some("not-a-jwt"), json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn role_gates_product_creation() {
    let h = Harness::new();
    let viewer = h.token_for("viewer", Role::Readonly).await;
    let manager = h.token_for("manager", Role::Manager).await;
    let input = json!({ "sku": "CV-100", "name": "Axle boot", "stock_quantity": 4 });

    let (status, _) = h.call("products.create", Some(&viewer), input.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, created) = h.call("products.create", Some(&manager), input.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["sku"], "CV-100");

    let (status, _) = h.call("products.create", Some(&manager), input).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, found) = h.call("products.getBySku", None, json!({ "sku": "CV-100" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["id"], created["id"]);
}

#[tokio::test]
async fn stock_adjustment_round_trips_over_rpc() {
    let h = Harness::new();
    let manager = h.token_for("manager", Role::Manager).await;
    let (_, created) = h
        .call("products.create", Some(&manager), json!({ "sku": "TR-1", "name": "Tie rod", "stock_quantity": 2 }))
        .await;

    let (status, adjusted) = h
        .call(
            "products.adjustStock",
            Some(&manager),
            json!({ "id": created["id"], "delta": -5, "reason": "cycle count" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(adjusted["product"]["stock_quantity"], 0);
    assert_eq!(adjusted["adjustment"]["previous_quantity"], 2);

    let (_, history) = h
        .call("products.stockHistory", Some(&manager), json!({ "id": created["id"] }))
        .await;
    assert_eq!(history.as_array().map(Vec::len), Some(1));
    assert_eq!(history[0]["reason"], "cycle count");
}

#[tokio::test]
async fn malformed_input_is_bad_request() {
    let h = Harness::new();
    let (status, body) = h.call("products.getById", None, json!({ "id": "nope" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn unknown_procedure_is_not_found() {
    let h = Harness::new();
    let (status, body) = h.call("products.teleport", None, json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn me_is_null_without_a_token() {
    let h = Harness::new();
    let (status, body) = h.call("auth.me", None, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);

    let token = h.token_for("sales-1", Role::Sales).await;
    let (_, body) = h.call("auth.me", Some(&token), json!({})).await;
    assert_eq!(body["id"], "sales-1");
    assert_eq!(body["role"], "sales");

    let (status, body) = h.call("auth.logout", None, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn role_change_rejects_unknown_roles() {
    let h = Harness::new();
    let admin = h.token_for("admin", Role::Admin).await;
    h.token_for("clerk", Role::Readonly).await;

    let (status, _) = h
        .call("users.updateRole", Some(&admin), json!({ "user_id": "clerk", "role": "overlord" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = h
        .call("users.updateRole", Some(&admin), json!({ "user_id": "clerk", "role": "shop_floor" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "shop_floor");
}

#[tokio::test]
async fn export_files_are_base64_encoded() {
    let h = Harness::new();
    let admin = h.token_for("admin", Role::Admin).await;
    let (status, files) = h
        .call("export.generate", Some(&admin), json!({ "tables": ["users"], "format": "json" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(files[0]["content_type"], "application/json");

    use base64::Engine;
    let raw = base64::engine::general_purpose::STANDARD
        .decode(files[0]["data"].as_str().unwrap())
        .unwrap();
    let doc: Value = serde_json::from_slice(&raw).unwrap();
    assert_eq!(doc["users"][0]["id"], "admin");
}

#[tokio::test]
async fn metrics_count_calls_per_procedure() {
    let h = Harness::new();
    h.call("products.list", None, json!({})).await;
    h.call("vendors.list", None, json!({})).await;

    let response = h
        .app
        .clone()
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let text = String::from_utf8(to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()).unwrap();
    assert!(text.contains(r#"rpc_requests_total{procedure="products.list",outcome="OK"} 1"#));
    assert!(text.contains(r#"rpc_requests_total{procedure="vendors.list",outcome="FORBIDDEN"} 1"#));
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let h = Harness::new();
    let response = h
        .app
        .clone()
        .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}
