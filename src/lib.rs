//! Matchday - Conversational fixture resolver
//!
//! Turns informal Hebrew/English chat messages into a pair of team slugs
//! across several turns, combining deterministic fuzzy matching with a
//! two-stage AI classifier and short-lived per-user memory.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
