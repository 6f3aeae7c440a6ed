//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the core and the outside world. Adapters implement these ports.
//!
//! - `AIProvider` - Text-generation backend used by the intent recognizer
//! - `SessionStore` - Bounded, expiring per-user memory with per-key turns
//! - `SearchHandoff` - Downstream collaborator receiving completed pairs

mod ai_provider;
mod search_handoff;
mod session_store;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, Message,
    MessageRole, ProviderInfo, RequestMetadata, ResponseFormat, TokenUsage,
};
pub use search_handoff::{HandoffError, SearchHandoff, SearchRequest};
pub use session_store::{SessionStore, SessionStoreError, TurnPermit};
