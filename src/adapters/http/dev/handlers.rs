//! HTTP handlers for the developer endpoints.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::application::handlers::message::{HandleMessageCommand, HandleMessageHandler};
use crate::domain::catalog::{normalize, Catalog};
use crate::domain::conversation::replies;
use crate::domain::foundation::UserKey;
use crate::domain::matching::EntityExtractor;
use crate::ports::{SessionStore, SessionStoreError};

use super::dto::{
    ErrorResponse, ExtractQuery, ExtractResponse, HealthResponse, MessageRequest, ResetRequest,
    ResetResponse, SessionQuery, SessionResponse,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct DevHandlers {
    message_handler: Arc<HandleMessageHandler>,
    sessions: Arc<dyn SessionStore>,
    catalog: Arc<Catalog>,
    extractor: Arc<EntityExtractor>,
}

impl DevHandlers {
    pub fn new(
        message_handler: Arc<HandleMessageHandler>,
        sessions: Arc<dyn SessionStore>,
        catalog: Arc<Catalog>,
    ) -> Self {
        Self {
            message_handler,
            sessions,
            extractor: Arc::new(EntityExtractor::new(catalog.clone())),
            catalog,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /dev/message - Run one conversational turn
pub async fn post_message(
    State(handlers): State<DevHandlers>,
    Json(req): Json<MessageRequest>,
) -> Response {
    let user_key = match parse_user(&req.user) {
        Ok(key) => key,
        Err(response) => return response,
    };

    let outcome = handlers
        .message_handler
        .handle(HandleMessageCommand::new(user_key, req.text))
        .await;
    (StatusCode::OK, Json(outcome)).into_response()
}

/// GET /dev/session?user= - Inspect a session without creating it
pub async fn get_session(
    State(handlers): State<DevHandlers>,
    Query(query): Query<SessionQuery>,
) -> Response {
    let user_key = match parse_user(&query.user) {
        Ok(key) => key,
        Err(response) => return response,
    };

    match handlers.sessions.snapshot(&user_key).await {
        Ok(Some(session)) => {
            let response: SessionResponse = session.into();
            (StatusCode::OK, Json(response)).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::not_found("Session", user_key.as_str())),
        )
            .into_response(),
        Err(e) => handle_store_error(e),
    }
}

/// POST /dev/reset - Forget a user's session
pub async fn reset_session(
    State(handlers): State<DevHandlers>,
    Json(req): Json<ResetRequest>,
) -> Response {
    let user_key = match parse_user(&req.user) {
        Ok(key) => key,
        Err(response) => return response,
    };

    match handlers.sessions.clear(&user_key).await {
        Ok(()) => {
            let response = ResetResponse {
                user: user_key.to_string(),
                message: replies::RESET_CONFIRMATION.to_string(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_store_error(e),
    }
}

/// GET /dev/extract?text= - Deterministic extraction only
pub async fn extract(
    State(handlers): State<DevHandlers>,
    Query(query): Query<ExtractQuery>,
) -> Response {
    let slugs = handlers.extractor.extract_slugs(&query.text);
    let response = ExtractResponse {
        normalized: normalize(&query.text),
        match_slug: Catalog::match_slug(&slugs),
        text: query.text,
        slugs,
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// GET /health - Liveness and basic counters
pub async fn health(State(handlers): State<DevHandlers>) -> Response {
    let response = HealthResponse {
        status: "ok",
        sessions: handlers.sessions.len().await,
        teams: handlers.catalog.len(),
    };
    (StatusCode::OK, Json(response)).into_response()
}

// ════════════════════════════════════════════════════════════════════════════
// Helpers
// ════════════════════════════════════════════════════════════════════════════

#[allow(clippy::result_large_err)]
fn parse_user(raw: &str) -> Result<UserKey, Response> {
    UserKey::new(raw).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request(e.to_string())),
        )
            .into_response()
    })
}

fn handle_store_error(error: SessionStoreError) -> Response {
    match error {
        SessionStoreError::InvalidKey(message) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request(message)),
        )
            .into_response(),
        SessionStoreError::Unavailable(message) => {
            error!(error = %message, "session store unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse::internal("Session store unavailable")),
            )
                .into_response()
        }
    }
}
