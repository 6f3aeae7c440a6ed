//! Application handlers.
//!
//! Command handlers that orchestrate domain operations across ports.

pub mod message;

pub use message::{
    HandleMessageCommand, HandleMessageError, HandleMessageHandler, IntentRecognizer,
    MessageHandlerConfig, TurnDecision, TurnOutcome,
};
