//! HTTP DTOs for the developer endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::conversation::{ConversationState, Role, Session, Turn};
use crate::domain::foundation::Slug;

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Simulated inbound message.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageRequest {
    pub user: String,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResetRequest {
    pub user: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionQuery {
    pub user: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractQuery {
    #[serde(default)]
    pub text: String,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Session snapshot for inspection.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub user: String,
    pub state: ConversationState,
    pub identified_slugs: Vec<Slug>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_greeting_at: Option<String>,
    pub created_at: String,
    pub history: Vec<TurnResponse>,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            user: session.user_key().to_string(),
            state: session.state(),
            identified_slugs: session.identified_slugs().to_vec(),
            last_greeting_at: session
                .last_greeting_at()
                .map(|at| at.as_datetime().to_rfc3339()),
            created_at: session.created_at().as_datetime().to_rfc3339(),
            history: session.history().map(TurnResponse::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TurnResponse {
    pub role: Role,
    pub text: String,
    pub at: String,
}

impl From<&Turn> for TurnResponse {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role,
            text: turn.text.clone(),
            at: turn.at.as_datetime().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResetResponse {
    pub user: String,
    pub message: String,
}

/// Deterministic extraction result.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractResponse {
    pub text: String,
    pub normalized: String,
    pub slugs: Vec<Slug>,
    /// `"<home>-vs-<away>"` when two teams were found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_slug: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub sessions: usize,
    pub teams: usize,
}

/// Error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(resource_type: &str, id: &str) -> Self {
        Self {
            code: "NOT_FOUND".to_string(),
            message: format!("{} not found: {}", resource_type, id),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: "INTERNAL_ERROR".to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Timestamp, UserKey};

    #[test]
    fn session_response_lists_history_in_order() {
        let mut session = Session::new(UserKey::new("972500000001").unwrap());
        let now = Timestamp::now();
        session.append_message(Role::User, "ארסנל", now);
        session.append_message(Role::Bot, "מול מי?", now);
        session.update_slugs(&[Slug::new("arsenal").unwrap()]);

        let response = SessionResponse::from(session);

        assert_eq!(response.user, "972500000001");
        assert_eq!(response.history.len(), 2);
        assert_eq!(response.history[0].role, Role::User);
        assert_eq!(response.identified_slugs, vec![Slug::new("arsenal").unwrap()]);
        assert!(response.last_greeting_at.is_none());
    }

    #[test]
    fn error_response_not_found_names_the_resource() {
        let error = ErrorResponse::not_found("Session", "972500000001");
        assert_eq!(error.code, "NOT_FOUND");
        assert!(error.message.contains("972500000001"));
    }
}
