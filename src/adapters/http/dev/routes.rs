//! HTTP routes for the developer endpoints.
//!
//! These simulate the messaging channel locally; they are not a webhook.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{extract, get_session, health, post_message, reset_session, DevHandlers};

/// Creates the developer router.
pub fn dev_routes(handlers: DevHandlers) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/dev/message", post(post_message))
        .route("/dev/session", get(get_session))
        .route("/dev/reset", post(reset_session))
        .route("/dev/extract", get(extract))
        .with_state(handlers)
}
