//! # api-adapters
//!
//! The RPC transport for Stockroom: every procedure is a
//! `POST /rpc/<resource>.<procedure>` route taking and returning JSON.
//! Handlers only decode input, resolve the caller and delegate to
//! `services`; authorization lives behind them.

#[cfg(feature = "web-axum")]
pub mod error;
#[cfg(feature = "web-axum")]
pub mod extract;
#[cfg(feature = "web-axum")]
pub mod handlers;
#[cfg(feature = "web-axum")]
pub mod metrics;
#[cfg(feature = "web-axum")]
pub mod middleware;
#[cfg(feature = "web-axum")]
pub mod routes;
#[cfg(feature = "web-axum")]
pub mod state;

#[cfg(feature = "web-axum")]
pub use routes::router;
#[cfg(feature = "web-axum")]
pub use state::AppState;
