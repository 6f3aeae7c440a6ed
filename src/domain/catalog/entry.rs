//! Catalog entries as loaded from the static team list.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Slug;

/// One catalog entity (a team).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Source identifier from the data file.
    pub id: String,
    /// Display name shown to users (Hebrew in the shipped catalog).
    #[serde(alias = "name_he")]
    pub canonical_name: String,
    /// Stable identifier.
    pub slug: Slug,
    /// Nicknames, transliterations and common misspellings.
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl CatalogEntry {
    /// Creates an entry with no explicit aliases.
    pub fn new(id: impl Into<String>, canonical_name: impl Into<String>, slug: Slug) -> Self {
        Self {
            id: id.into(),
            canonical_name: canonical_name.into(),
            slug,
            aliases: Vec::new(),
        }
    }

    /// Adds explicit aliases.
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    /// Every raw string that should resolve to this entry, in registration
    /// order: explicit aliases, then the canonical name, then the slug.
    pub fn alias_universe(&self) -> impl Iterator<Item = &str> {
        self.aliases
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.canonical_name.as_str()))
            .chain(std::iter::once(self.slug.as_str()))
    }
}
