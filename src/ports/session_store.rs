//! Session Store Port - Interface for per-user conversation memory.
//!
//! Every operation is atomic per key. Operations on different keys never
//! block each other. A turn handler that needs several operations to act as
//! one read-modify-write first takes a [`TurnPermit`] for the key; permits
//! for the same key are granted one at a time.

use async_trait::async_trait;
use tokio::sync::OwnedMutexGuard;

use crate::domain::conversation::{ConversationState, Role, Session};
use crate::domain::foundation::{Slug, Timestamp, UserKey};

/// Errors that can occur during session store operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("invalid session key: {0}")]
    InvalidKey(String),

    #[error("session store unavailable: {0}")]
    Unavailable(String),
}

/// Exclusive right to run one turn for a key. Released on drop.
#[derive(Debug)]
pub struct TurnPermit {
    _guard: OwnedMutexGuard<()>,
}

impl TurnPermit {
    pub fn new(guard: OwnedMutexGuard<()>) -> Self {
        Self { _guard: guard }
    }
}

/// Port for bounded, expiring per-user memory.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Waits until no other turn is in flight for `key`, then reserves it.
    ///
    /// Sessions with an outstanding permit are never evicted.
    async fn begin_turn(&self, key: &UserKey) -> Result<TurnPermit, SessionStoreError>;

    /// Returns the live session, creating an empty one if absent or expired.
    async fn get_or_create(&self, key: &UserKey) -> Result<Session, SessionStoreError>;

    /// Returns the live session without creating one.
    async fn snapshot(&self, key: &UserKey) -> Result<Option<Session>, SessionStoreError>;

    /// Appends a turn to history (bounded, oldest evicted first).
    async fn append_message(
        &self,
        key: &UserKey,
        role: Role,
        text: &str,
    ) -> Result<(), SessionStoreError>;

    /// Merges slugs into memory and returns what is remembered afterwards.
    async fn update_slugs(
        &self,
        key: &UserKey,
        slugs: &[Slug],
    ) -> Result<Vec<Slug>, SessionStoreError>;

    /// Records when the user was last greeted with the branded opening.
    async fn set_greeting_time(
        &self,
        key: &UserKey,
        at: Timestamp,
    ) -> Result<(), SessionStoreError>;

    /// Records the state the conversation settled in.
    async fn set_state(
        &self,
        key: &UserKey,
        state: ConversationState,
    ) -> Result<(), SessionStoreError>;

    /// Forgets everything stored for `key`.
    async fn clear(&self, key: &UserKey) -> Result<(), SessionStoreError>;

    /// Number of sessions currently held.
    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[test]
    fn errors_display_their_cause() {
        let err = SessionStoreError::Unavailable("poisoned".to_string());
        assert!(err.to_string().contains("unavailable"));
        assert!(err.to_string().contains("poisoned"));
    }

    #[tokio::test]
    async fn permit_releases_lock_on_drop() {
        let lock = Arc::new(Mutex::new(()));
        let permit = TurnPermit::new(lock.clone().lock_owned().await);
        assert!(lock.try_lock().is_err());
        drop(permit);
        assert!(lock.try_lock().is_ok());
    }
}
