//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `catalog` - Team catalog, normalization and alias lookup
//! - `matching` - Deterministic team extraction from free text
//! - `conversation` - Per-user session memory, intents and replies
//! - `intent` - Intent pre-checks and the two-stage classifier protocol

pub mod catalog;
pub mod conversation;
pub mod foundation;
pub mod intent;
pub mod matching;
