//! Catalog construction errors.
//!
//! All of these are configuration defects: they abort startup instead of
//! being resolved silently.

use thiserror::Error;

use crate::domain::foundation::{Slug, ValidationError};

/// Errors raised while loading or indexing the team catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("alias '{alias}' maps to both '{first}' and '{second}'")]
    AliasCollision {
        alias: String,
        first: Slug,
        second: Slug,
    },

    #[error("slug '{0}' is declared by more than one catalog entry")]
    DuplicateSlug(Slug),

    #[error("entry '{slug}' has an alias that normalizes to nothing: {raw:?}")]
    EmptyAlias { slug: Slug, raw: String },

    #[error("catalog contains no entries")]
    EmptyCatalog,

    #[error("invalid catalog entry: {0}")]
    InvalidEntry(#[from] ValidationError),

    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog: {0}")]
    Parse(String),
}

impl CatalogError {
    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_collision_names_both_slugs() {
        let err = CatalogError::AliasCollision {
            alias: "united".to_string(),
            first: Slug::new("manchester-united").unwrap(),
            second: Slug::new("newcastle-united").unwrap(),
        };
        let text = err.to_string();
        assert!(text.contains("manchester-united"));
        assert!(text.contains("newcastle-united"));
    }
}
