//! Handoff that only logs the resolved match. Used by the binary, where
//! offer search and delivery live in another service.

use async_trait::async_trait;
use tracing::info;

use crate::ports::{HandoffError, SearchHandoff, SearchRequest};

#[derive(Debug, Clone, Default)]
pub struct LoggingSearchHandoff;

impl LoggingSearchHandoff {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SearchHandoff for LoggingSearchHandoff {
    async fn hand_off(&self, request: SearchRequest) -> Result<(), HandoffError> {
        info!(
            user = %request.user_key,
            match_slug = %request.match_slug(),
            confirmation = %request.confirmation,
            "search handed off"
        );
        Ok(())
    }
}
