//! Conversation memory and per-turn vocabulary.
//!
//! - `session` - per-user short-term memory (history, slugs, greeting time)
//! - `state` - the NEW / AWAITING_SECOND_TEAM / READY / RESET state machine
//! - `intent` - classifier labels and analysis results
//! - `replies` - localized bot replies

mod intent;
mod message;
pub mod replies;
mod session;
mod state;

pub use intent::{AnalysisResult, Intent, MAX_ANALYSIS_SLUGS};
pub use message::{Role, Turn};
pub use session::{Session, DEFAULT_HISTORY_LIMIT, MAX_REMEMBERED_SLUGS};
pub use state::ConversationState;
