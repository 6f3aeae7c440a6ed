//! In-Memory Session Store Adapter
//!
//! Bounded (LRU over capacity) and expiring (TTL over inactivity) per-user
//! memory. The key index sits behind one `RwLock`; each session has its own
//! slot lock and turn lock, so different users never wait on each other.
//!
//! An entry is only evicted while idle: nobody holds a reference to it and
//! no turn permit is outstanding for it.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::domain::conversation::{ConversationState, Role, Session, DEFAULT_HISTORY_LIMIT};
use crate::domain::foundation::{Slug, Timestamp, UserKey};
use crate::ports::{SessionStore, SessionStoreError, TurnPermit};

/// Sizing and expiry of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    /// Maximum number of sessions held at once.
    pub capacity: usize,
    /// Inactivity after which a session is forgotten.
    pub ttl: Duration,
    /// Turns of history kept per session.
    pub history_limit: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            capacity: 500,
            ttl: Duration::from_secs(24 * 60 * 60),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

#[derive(Debug)]
struct SessionEntry {
    turn: Arc<Mutex<()>>,
    session: Mutex<Session>,
    last_access_ms: AtomicI64,
}

impl SessionEntry {
    fn new(session: Session) -> Self {
        Self {
            turn: Arc::new(Mutex::new(())),
            session: Mutex::new(session),
            last_access_ms: AtomicI64::new(now_ms()),
        }
    }

    fn touch(&self) {
        self.last_access_ms.store(now_ms(), Ordering::Relaxed);
    }

    fn last_access_ms(&self) -> i64 {
        self.last_access_ms.load(Ordering::Relaxed)
    }

    fn is_expired(&self, ttl: Duration, now_ms: i64) -> bool {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        now_ms.saturating_sub(self.last_access_ms()) > ttl_ms
    }
}

/// Only called with the index write lock held, so no new references can
/// appear while the counts are inspected.
fn is_idle(entry: &Arc<SessionEntry>) -> bool {
    Arc::strong_count(entry) == 1 && Arc::strong_count(&entry.turn) == 1
}

fn now_ms() -> i64 {
    Timestamp::now().as_unix_millis()
}

/// In-memory implementation of [`SessionStore`].
#[derive(Debug, Clone)]
pub struct InMemorySessionStore {
    entries: Arc<RwLock<HashMap<UserKey, Arc<SessionEntry>>>>,
    limits: SessionLimits,
}

impl InMemorySessionStore {
    pub fn new(limits: SessionLimits) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::with_capacity(limits.capacity))),
            limits,
        }
    }

    pub fn limits(&self) -> SessionLimits {
        self.limits
    }

    fn fresh_session(&self, key: &UserKey) -> Session {
        Session::with_history_limit(key.clone(), self.limits.history_limit)
    }

    async fn existing(&self, key: &UserKey) -> Option<Arc<SessionEntry>> {
        self.entries.read().await.get(key).cloned()
    }

    /// Returns the entry for `key`, inserting an empty one when absent.
    async fn entry(&self, key: &UserKey) -> Arc<SessionEntry> {
        if let Some(entry) = self.existing(key).await {
            return entry;
        }

        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get(key) {
            return entry.clone();
        }
        if entries.len() >= self.limits.capacity {
            Self::evict_least_recent(&mut entries);
        }
        let entry = Arc::new(SessionEntry::new(self.fresh_session(key)));
        entries.insert(key.clone(), entry.clone());
        debug!(user = %key, sessions = entries.len(), "session created");
        entry
    }

    fn evict_least_recent(entries: &mut HashMap<UserKey, Arc<SessionEntry>>) {
        let victim = entries
            .iter()
            .filter(|(_, entry)| is_idle(entry))
            .min_by_key(|(_, entry)| entry.last_access_ms())
            .map(|(key, _)| key.clone());

        match victim {
            Some(key) => {
                entries.remove(&key);
                debug!(user = %key, "evicted least recently used session");
            }
            None => warn!(
                sessions = entries.len(),
                "session capacity reached but every session is busy"
            ),
        }
    }

    /// Runs `f` on the live session for `key` under its slot lock.
    ///
    /// An expired session is replaced by an empty one first.
    async fn with_session<R>(&self, key: &UserKey, f: impl FnOnce(&mut Session) -> R) -> R {
        let entry = self.entry(key).await;
        let mut session = entry.session.lock().await;
        if entry.is_expired(self.limits.ttl, now_ms()) {
            debug!(user = %key, "session expired, starting fresh");
            *session = self.fresh_session(key);
        }
        entry.touch();
        f(&mut session)
    }

    /// Removes every idle session whose TTL has passed. Returns how many went.
    pub async fn sweep_expired(&self) -> usize {
        let now = now_ms();
        let ttl = self.limits.ttl;
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !(is_idle(entry) && entry.is_expired(ttl, now)));
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, remaining = entries.len(), "swept expired sessions");
        }
        removed
    }

    /// Spawns a background task calling [`sweep_expired`](Self::sweep_expired)
    /// every `every`.
    pub fn spawn_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                store.sweep_expired().await;
            }
        })
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(SessionLimits::default())
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn begin_turn(&self, key: &UserKey) -> Result<TurnPermit, SessionStoreError> {
        let turn = {
            let entry = self.entry(key).await;
            entry.turn.clone()
        };
        Ok(TurnPermit::new(turn.lock_owned().await))
    }

    async fn get_or_create(&self, key: &UserKey) -> Result<Session, SessionStoreError> {
        Ok(self.with_session(key, |session| session.clone()).await)
    }

    async fn snapshot(&self, key: &UserKey) -> Result<Option<Session>, SessionStoreError> {
        let Some(entry) = self.existing(key).await else {
            return Ok(None);
        };
        let session = entry.session.lock().await;
        if entry.is_expired(self.limits.ttl, now_ms()) {
            return Ok(None);
        }
        Ok(Some(session.clone()))
    }

    async fn append_message(
        &self,
        key: &UserKey,
        role: Role,
        text: &str,
    ) -> Result<(), SessionStoreError> {
        self.with_session(key, |session| {
            session.append_message(role, text, Timestamp::now())
        })
        .await;
        Ok(())
    }

    async fn update_slugs(
        &self,
        key: &UserKey,
        slugs: &[Slug],
    ) -> Result<Vec<Slug>, SessionStoreError> {
        Ok(self
            .with_session(key, |session| {
                session.update_slugs(slugs);
                session.identified_slugs().to_vec()
            })
            .await)
    }

    async fn set_greeting_time(
        &self,
        key: &UserKey,
        at: Timestamp,
    ) -> Result<(), SessionStoreError> {
        self.with_session(key, |session| session.set_greeting_time(at))
            .await;
        Ok(())
    }

    async fn set_state(
        &self,
        key: &UserKey,
        state: ConversationState,
    ) -> Result<(), SessionStoreError> {
        self.with_session(key, |session| session.set_state(state))
            .await;
        Ok(())
    }

    async fn clear(&self, key: &UserKey) -> Result<(), SessionStoreError> {
        if let Some(entry) = self.existing(key).await {
            entry.session.lock().await.clear();
            entry.touch();
            debug!(user = %key, "session cleared");
        }
        Ok(())
    }

    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn key(s: &str) -> UserKey {
        UserKey::new(s).unwrap()
    }

    fn slug(s: &str) -> Slug {
        Slug::new(s).unwrap()
    }

    fn store_with(capacity: usize, ttl: Duration) -> InMemorySessionStore {
        InMemorySessionStore::new(SessionLimits {
            capacity,
            ttl,
            history_limit: DEFAULT_HISTORY_LIMIT,
        })
    }

    #[tokio::test]
    async fn get_or_create_creates_lazily() {
        let store = InMemorySessionStore::default();
        assert!(store.is_empty().await);
        assert!(store.snapshot(&key("a")).await.unwrap().is_none());

        let session = store.get_or_create(&key("a")).await.unwrap();

        assert_eq!(session.user_key(), &key("a"));
        assert_eq!(store.len().await, 1);
        assert!(store.snapshot(&key("a")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn mutations_are_visible_in_later_reads() {
        let store = InMemorySessionStore::default();
        let k = key("a");
        let now = Timestamp::now();

        store.append_message(&k, Role::User, "ארסנל").await.unwrap();
        let remembered = store.update_slugs(&k, &[slug("arsenal")]).await.unwrap();
        store.set_greeting_time(&k, now).await.unwrap();
        store
            .set_state(&k, ConversationState::AwaitingSecondTeam)
            .await
            .unwrap();

        let session = store.get_or_create(&k).await.unwrap();
        assert_eq!(remembered, vec![slug("arsenal")]);
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.identified_slugs(), &[slug("arsenal")]);
        assert_eq!(session.last_greeting_at(), Some(now));
        assert_eq!(session.state(), ConversationState::AwaitingSecondTeam);
    }

    #[tokio::test]
    async fn clear_forgets_memory() {
        let store = InMemorySessionStore::default();
        let k = key("a");
        store.update_slugs(&k, &[slug("arsenal")]).await.unwrap();

        store.clear(&k).await.unwrap();

        let session = store.get_or_create(&k).await.unwrap();
        assert!(session.identified_slugs().is_empty());
        assert_eq!(session.state(), ConversationState::New);
    }

    #[tokio::test]
    async fn clear_of_unknown_key_is_a_no_op() {
        let store = InMemorySessionStore::default();
        store.clear(&key("ghost")).await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn evicts_least_recently_used_over_capacity() {
        let store = store_with(2, Duration::from_secs(60));
        store.get_or_create(&key("a")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        store.get_or_create(&key("b")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        // Touch "a" so "b" becomes the least recent.
        store.get_or_create(&key("a")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;

        store.get_or_create(&key("c")).await.unwrap();

        assert_eq!(store.len().await, 2);
        assert!(store.snapshot(&key("a")).await.unwrap().is_some());
        assert!(store.snapshot(&key("b")).await.unwrap().is_none());
        assert!(store.snapshot(&key("c")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn sessions_with_a_turn_in_flight_are_not_evicted() {
        let store = store_with(1, Duration::from_secs(60));
        let permit = store.begin_turn(&key("a")).await.unwrap();

        store.get_or_create(&key("b")).await.unwrap();

        assert!(store.snapshot(&key("a")).await.unwrap().is_some());
        drop(permit);
    }

    #[tokio::test]
    async fn expired_sessions_start_fresh() {
        let store = store_with(10, Duration::from_millis(20));
        let k = key("a");
        store.update_slugs(&k, &[slug("arsenal")]).await.unwrap();

        tokio::time::sleep(Duration::from_millis(40)).await;

        assert!(store.snapshot(&k).await.unwrap().is_none());
        let session = store.get_or_create(&k).await.unwrap();
        assert!(session.identified_slugs().is_empty());
    }

    #[tokio::test]
    async fn sweep_removes_expired_idle_sessions_only() {
        let store = store_with(10, Duration::from_millis(20));
        store.get_or_create(&key("idle")).await.unwrap();
        let permit = store.begin_turn(&key("busy")).await.unwrap();

        tokio::time::sleep(Duration::from_millis(40)).await;
        let removed = store.sweep_expired().await;

        assert_eq!(removed, 1);
        assert_eq!(store.len().await, 1);
        drop(permit);
        assert_eq!(store.sweep_expired().await, 1);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn sweeper_task_runs_in_background() {
        let store = store_with(10, Duration::from_millis(10));
        store.get_or_create(&key("a")).await.unwrap();
        let handle = store.spawn_sweeper(Duration::from_millis(15));

        tokio::time::sleep(Duration::from_millis(80)).await;

        assert!(store.is_empty().await);
        handle.abort();
    }

    #[tokio::test]
    async fn turns_for_the_same_key_are_serialized() {
        let store = InMemorySessionStore::default();
        let k = key("a");
        let first = store.begin_turn(&k).await.unwrap();

        let contender = {
            let store = store.clone();
            let k = k.clone();
            tokio::spawn(async move {
                let started = Instant::now();
                let _permit = store.begin_turn(&k).await.unwrap();
                started.elapsed()
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        drop(first);
        let waited = contender.await.unwrap();
        assert!(waited >= Duration::from_millis(40));
    }

    #[tokio::test]
    async fn different_keys_do_not_block_each_other() {
        let store = InMemorySessionStore::default();
        let _held = store.begin_turn(&key("a")).await.unwrap();

        let other = tokio::time::timeout(Duration::from_millis(100), store.begin_turn(&key("b")))
            .await;

        assert!(other.is_ok());
        // Plain operations on the held key still go through.
        store.append_message(&key("a"), Role::Bot, "hi").await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_updates_lose_nothing() {
        let store = InMemorySessionStore::default();
        let k = key("a");
        let mut tasks = Vec::new();
        for i in 0..20 {
            let store = store.clone();
            let k = k.clone();
            tasks.push(tokio::spawn(async move {
                let _permit = store.begin_turn(&k).await.unwrap();
                store
                    .append_message(&k, Role::User, &format!("m{i}"))
                    .await
                    .unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let session = store.get_or_create(&k).await.unwrap();
        assert_eq!(session.history().len(), DEFAULT_HISTORY_LIMIT);
        assert_eq!(store.len().await, 1);
    }
}
