//! Conversation turns kept in session history.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// Who said it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Bot,
}

/// One entry of a session's message history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    pub at: Timestamp,
}

impl Turn {
    pub fn new(role: Role, text: impl Into<String>, at: Timestamp) -> Self {
        Self {
            role,
            text: text.into(),
            at,
        }
    }

    pub fn user(text: impl Into<String>, at: Timestamp) -> Self {
        Self::new(Role::User, text, at)
    }

    pub fn bot(text: impl Into<String>, at: Timestamp) -> Self {
        Self::new(Role::Bot, text, at)
    }
}
