//! Handoff that records every request, optionally failing on demand.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::ports::{HandoffError, SearchHandoff, SearchRequest};

#[derive(Debug, Clone, Default)]
pub struct RecordingSearchHandoff {
    requests: Arc<Mutex<Vec<SearchRequest>>>,
    fail_with: Option<String>,
}

impl RecordingSearchHandoff {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records requests but reports every handoff as rejected.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            requests: Arc::default(),
            fail_with: Some(reason.into()),
        }
    }

    pub async fn requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn last(&self) -> Option<SearchRequest> {
        self.requests.lock().await.last().cloned()
    }

    pub async fn count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

#[async_trait]
impl SearchHandoff for RecordingSearchHandoff {
    async fn hand_off(&self, request: SearchRequest) -> Result<(), HandoffError> {
        self.requests.lock().await.push(request);
        match &self.fail_with {
            Some(reason) => Err(HandoffError::Rejected(reason.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Slug, UserKey};

    fn request() -> SearchRequest {
        SearchRequest::new(
            UserKey::new("u1").unwrap(),
            Slug::new("arsenal").unwrap(),
            Slug::new("liverpool").unwrap(),
            "ok",
        )
    }

    #[tokio::test]
    async fn records_requests_in_order() {
        let handoff = RecordingSearchHandoff::new();
        handoff.hand_off(request()).await.unwrap();

        assert_eq!(handoff.count().await, 1);
        assert_eq!(handoff.last().await.unwrap().match_slug(), "arsenal-vs-liverpool");
    }

    #[tokio::test]
    async fn failing_handoff_still_records() {
        let handoff = RecordingSearchHandoff::failing("down");
        let result = handoff.hand_off(request()).await;

        assert!(matches!(result, Err(HandoffError::Rejected(_))));
        assert_eq!(handoff.count().await, 1);
    }
}
