//! Deterministic entity extraction.

mod entity_extractor;

pub use entity_extractor::{
    threshold_for, EntityExtractor, MatchMethod, TokenMatch, HEBREW_PREFIXES,
    MIN_CANDIDATE_CHARS,
};
