//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Text-generation backends (Gemini, OpenAI, mock)
//! - `storage` - In-memory session store and catalog file loading
//! - `search` - Where resolved team pairs are handed off
//! - `http` - Developer HTTP routes

pub mod ai;
pub mod http;
pub mod search;
pub mod storage;

pub use ai::{GeminiProvider, MockAIProvider, OpenAIProvider};
pub use search::{LoggingSearchHandoff, RecordingSearchHandoff};
pub use storage::{load_catalog, InMemorySessionStore, SessionLimits};
