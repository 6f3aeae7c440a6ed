//! Conversation tuning

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct ConversationConfig {
    /// Minimum gap between two branded greetings, in seconds
    #[serde(default = "default_greeting_cooldown")]
    pub greeting_cooldown_secs: u64,

    /// Turns kept per session and sent to the classifier
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl ConversationConfig {
    pub fn greeting_cooldown(&self) -> Duration {
        Duration::from_secs(self.greeting_cooldown_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.history_limit == 0 {
            return Err(ValidationError::InvalidHistoryLimit);
        }
        Ok(())
    }
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            greeting_cooldown_secs: default_greeting_cooldown(),
            history_limit: default_history_limit(),
        }
    }
}

fn default_greeting_cooldown() -> u64 {
    15 * 60
}

fn default_history_limit() -> usize {
    6
}
