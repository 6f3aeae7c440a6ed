//! Per-user short-term memory.
//!
//! A `Session` remembers the last few turns, up to two resolved team slugs
//! and when the user was last greeted. It is owned exclusively by the
//! session store; callers receive clones.

use std::collections::VecDeque;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::message::{Role, Turn};
use super::state::ConversationState;
use crate::domain::foundation::{Slug, Timestamp, UserKey};

/// Default number of turns retained per session.
pub const DEFAULT_HISTORY_LIMIT: usize = 6;

/// Maximum number of slugs remembered per session.
pub const MAX_REMEMBERED_SLUGS: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    user_key: UserKey,
    history: VecDeque<Turn>,
    history_limit: usize,
    identified_slugs: Vec<Slug>,
    last_greeting_at: Option<Timestamp>,
    state: ConversationState,
    created_at: Timestamp,
}

impl Session {
    /// Creates an empty session with the default history limit.
    pub fn new(user_key: UserKey) -> Self {
        Self::with_history_limit(user_key, DEFAULT_HISTORY_LIMIT)
    }

    /// Creates an empty session keeping at most `history_limit` turns.
    pub fn with_history_limit(user_key: UserKey, history_limit: usize) -> Self {
        let history_limit = history_limit.max(1);
        Self {
            user_key,
            history: VecDeque::with_capacity(history_limit),
            history_limit,
            identified_slugs: Vec::with_capacity(MAX_REMEMBERED_SLUGS),
            last_greeting_at: None,
            state: ConversationState::New,
            created_at: Timestamp::now(),
        }
    }

    pub fn user_key(&self) -> &UserKey {
        &self.user_key
    }

    /// Oldest first.
    pub fn history(&self) -> impl ExactSizeIterator<Item = &Turn> {
        self.history.iter()
    }

    pub fn identified_slugs(&self) -> &[Slug] {
        &self.identified_slugs
    }

    pub fn last_greeting_at(&self) -> Option<Timestamp> {
        self.last_greeting_at
    }

    pub fn state(&self) -> ConversationState {
        self.state
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Most recently remembered slug.
    pub fn latest_slug(&self) -> Option<&Slug> {
        self.identified_slugs.last()
    }

    /// Appends a turn, evicting the oldest once the limit is exceeded.
    pub fn append_message(&mut self, role: Role, text: impl Into<String>, at: Timestamp) {
        self.history.push_back(Turn::new(role, text, at));
        while self.history.len() > self.history_limit {
            self.history.pop_front();
        }
    }

    /// Merges `slugs` into memory. Slugs mentioned again move to the back,
    /// in the order given, and only the last two are kept.
    pub fn update_slugs(&mut self, slugs: &[Slug]) {
        let mut merged: Vec<Slug> = self
            .identified_slugs
            .iter()
            .filter(|slug| !slugs.contains(slug))
            .cloned()
            .collect();
        for slug in slugs {
            if !merged.contains(slug) {
                merged.push(slug.clone());
            }
        }
        let overflow = merged.len().saturating_sub(MAX_REMEMBERED_SLUGS);
        merged.drain(..overflow);
        self.identified_slugs = merged;
    }

    /// True when the user has never been greeted, or was greeted longer
    /// ago than `cooldown`.
    pub fn should_greet(&self, now: &Timestamp, cooldown: Duration) -> bool {
        match self.last_greeting_at {
            None => true,
            Some(at) => at.is_older_than(cooldown, now),
        }
    }

    pub fn set_greeting_time(&mut self, at: Timestamp) {
        self.last_greeting_at = Some(at);
    }

    /// Records the state a turn settled in.
    pub fn set_state(&mut self, state: ConversationState) {
        self.state = state;
    }

    /// Forgets everything except identity.
    pub fn clear(&mut self) {
        self.history.clear();
        self.identified_slugs.clear();
        self.last_greeting_at = None;
        self.state = ConversationState::New;
    }
}
