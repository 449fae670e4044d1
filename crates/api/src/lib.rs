//! HTTP interface for the API key handshake.
//!
//! Thin layer over [`keygate_authn`]: request/response types, error
//! mapping, and an [`axum`] router. All protocol decisions live in the
//! authn crate; this one only shapes them for the wire.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

pub mod routes;
pub mod types;

pub use routes::AppState;

/// Builds the handshake router over the given state.
///
/// ```text
/// POST   /auth/api-key/register    register a public key
/// POST   /auth/api-key/challenge   issue a challenge
/// POST   /auth/api-key/token       exchange signed challenge for token
/// GET    /auth/api-key/status      registration state of a key
/// DELETE /auth/api-key             revoke a key
/// ```
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/auth/api-key/register", post(routes::register))
        .route("/auth/api-key/challenge", post(routes::challenge))
        .route("/auth/api-key/token", post(routes::token))
        .route("/auth/api-key/status", get(routes::status))
        .route("/auth/api-key", axum::routing::delete(routes::revoke))
        .with_state(state)
}
