//! Immutable alias lookup built once from the catalog.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::entry::CatalogEntry;
use super::errors::CatalogError;
use super::fuzzy_index::FuzzyIndex;
use super::normalizer::normalize;
use crate::domain::foundation::Slug;

/// A fuzzy lookup result resolved to its slug.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyHit<'a> {
    pub slug: &'a Slug,
    pub alias: &'a str,
    pub score: f64,
}

/// Normalized alias → slug mapping plus an approximate matcher over the same
/// alias universe. Read-only after [`AliasIndex::build`].
#[derive(Debug, Clone)]
pub struct AliasIndex {
    exact: HashMap<String, Slug>,
    fuzzy: FuzzyIndex,
}

impl AliasIndex {
    /// Registers every alias, canonical name and slug of every entry.
    ///
    /// # Errors
    ///
    /// - `DuplicateSlug` when two entries share a slug
    /// - `EmptyAlias` when an alias normalizes to the empty string
    /// - `AliasCollision` when one normalized alias would point at two slugs
    pub fn build(entries: &[CatalogEntry]) -> Result<Self, CatalogError> {
        let mut seen_slugs = HashSet::new();
        let mut exact: HashMap<String, Slug> = HashMap::new();
        let mut registered = Vec::new();

        for entry in entries {
            if !seen_slugs.insert(entry.slug.clone()) {
                return Err(CatalogError::DuplicateSlug(entry.slug.clone()));
            }

            for raw in entry.alias_universe() {
                let alias = normalize(raw);
                if alias.is_empty() {
                    return Err(CatalogError::EmptyAlias {
                        slug: entry.slug.clone(),
                        raw: raw.to_string(),
                    });
                }

                match exact.get(&alias) {
                    Some(existing) if existing != &entry.slug => {
                        return Err(CatalogError::AliasCollision {
                            alias,
                            first: existing.clone(),
                            second: entry.slug.clone(),
                        });
                    }
                    Some(_) => {}
                    None => {
                        exact.insert(alias.clone(), entry.slug.clone());
                        registered.push(alias);
                    }
                }
            }
        }

        debug!(aliases = registered.len(), entries = entries.len(), "alias index built");

        Ok(Self {
            exact,
            fuzzy: FuzzyIndex::new(registered),
        })
    }

    /// Exact lookup of an already-normalized alias.
    pub fn exact(&self, normalized: &str) -> Option<&Slug> {
        self.exact.get(normalized)
    }

    /// Best fuzzy candidate for an already-normalized string, regardless of score.
    pub fn fuzzy(&self, normalized: &str) -> Option<FuzzyHit<'_>> {
        let hit = self.fuzzy.best_match(normalized)?;
        let slug = self.exact.get(hit.alias)?;
        Some(FuzzyHit {
            slug,
            alias: hit.alias,
            score: hit.score,
        })
    }

    /// Number of distinct normalized aliases.
    pub fn len(&self) -> usize {
        self.exact.len()
    }

    /// Returns true if no alias is registered.
    pub fn is_empty(&self) -> bool {
        self.exact.is_empty()
    }
}
