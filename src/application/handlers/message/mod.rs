//! Inbound message handling.

mod handle_message;
mod intent_recognizer;

pub use handle_message::{
    HandleMessageCommand, HandleMessageError, HandleMessageHandler, MessageHandlerConfig,
    TurnDecision, TurnOutcome, DEFAULT_GREETING_COOLDOWN,
};
pub use intent_recognizer::{IntentRecognizer, DEFAULT_CALL_TIMEOUT};
