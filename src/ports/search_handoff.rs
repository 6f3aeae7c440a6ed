//! Search Handoff Port - Where a completed team pair is sent.
//!
//! Searching for offers and delivering results are outside the core; once a
//! pair is resolved the turn handler hands it off and moves on.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::foundation::{Slug, UserKey};

/// A resolved pair ready for searching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    pub user_key: UserKey,
    pub home: Slug,
    pub away: Slug,
    /// User-facing confirmation that accompanies the search.
    pub confirmation: String,
}

impl SearchRequest {
    pub fn new(user_key: UserKey, home: Slug, away: Slug, confirmation: impl Into<String>) -> Self {
        Self {
            user_key,
            home,
            away,
            confirmation: confirmation.into(),
        }
    }

    /// Downstream search key, `"<home>-vs-<away>"`.
    pub fn match_slug(&self) -> String {
        format!("{}-vs-{}", self.home, self.away)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HandoffError {
    #[error("search collaborator rejected the request: {0}")]
    Rejected(String),

    #[error("search collaborator unavailable: {0}")]
    Unavailable(String),
}

/// Port for the downstream search/delivery collaborator.
#[async_trait]
pub trait SearchHandoff: Send + Sync {
    async fn hand_off(&self, request: SearchRequest) -> Result<(), HandoffError>;
}
