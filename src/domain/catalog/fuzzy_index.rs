//! Approximate string lookup over the normalized alias universe.
//!
//! Candidates are pre-selected through a padded character-bigram index and
//! then scored with normalized Levenshtein similarity (`1 - distance / max_len`),
//! giving a score in `[0, 1]`.

use std::collections::{BTreeSet, HashMap};

const GRAM_PAD: char = '-';
const GRAM_SIZE: usize = 2;

/// Best fuzzy candidate for a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyMatch<'a> {
    /// The matched normalized alias.
    pub alias: &'a str,
    /// Registration position of the alias (lower registered first).
    pub position: usize,
    /// Similarity in `[0, 1]`.
    pub score: f64,
}

/// Read-only approximate matching structure, built once.
#[derive(Debug, Clone, Default)]
pub struct FuzzyIndex {
    aliases: Vec<String>,
    grams: HashMap<String, Vec<usize>>,
}

impl FuzzyIndex {
    /// Builds the index. Alias order is the registration order used for tie-breaks.
    pub fn new<I, S>(aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut index = Self::default();
        for alias in aliases {
            let alias = alias.into();
            let position = index.aliases.len();
            for gram in grams_of(&alias) {
                let postings = index.grams.entry(gram).or_default();
                if postings.last() != Some(&position) {
                    postings.push(position);
                }
            }
            index.aliases.push(alias);
        }
        index
    }

    /// Number of indexed aliases.
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    /// Returns true if nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Returns the highest-scoring alias for `query`.
    ///
    /// Equal scores resolve to the alias registered first.
    pub fn best_match(&self, query: &str) -> Option<FuzzyMatch<'_>> {
        if query.is_empty() {
            return None;
        }

        let candidates: BTreeSet<usize> = grams_of(query)
            .iter()
            .filter_map(|gram| self.grams.get(gram))
            .flatten()
            .copied()
            .collect();

        let mut best: Option<FuzzyMatch<'_>> = None;
        for position in candidates {
            let alias = self.aliases[position].as_str();
            let score = strsim::normalized_levenshtein(query, alias);
            let better = match best {
                Some(current) => score > current.score,
                None => true,
            };
            if better {
                best = Some(FuzzyMatch {
                    alias,
                    position,
                    score,
                });
            }
        }
        best
    }
}

/// Padded character n-grams, e.g. `"ab"` -> `["-a", "ab", "b-"]`.
fn grams_of(value: &str) -> Vec<String> {
    let padded: Vec<char> = std::iter::once(GRAM_PAD)
        .chain(value.chars())
        .chain(std::iter::once(GRAM_PAD))
        .collect();

    padded
        .windows(GRAM_SIZE)
        .map(|window| window.iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grams_are_padded() {
        assert_eq!(grams_of("ab"), vec!["-a", "ab", "b-"]);
    }

    #[test]
    fn exact_alias_scores_one() {
        let index = FuzzyIndex::new(["ארסנל", "ליברפול"]);
        let hit = index.best_match("ליברפול").unwrap();
        assert_eq!(hit.alias, "ליברפול");
        assert!((hit.score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn one_typo_in_long_word_scores_high() {
        let index = FuzzyIndex::new(["מנשנגלדבאך", "ארסנל"]);
        let hit = index.best_match("מנשנגלדבך").unwrap();
        assert_eq!(hit.alias, "מנשנגלדבאך");
        assert!(hit.score >= 0.75);
    }

    #[test]
    fn ties_resolve_to_first_registered_alias() {
        // "abx" is one substitution away from both aliases.
        let index = FuzzyIndex::new(["aby", "abz"]);
        let hit = index.best_match("abx").unwrap();
        assert_eq!(hit.alias, "aby");
        assert_eq!(hit.position, 0);
    }

    #[test]
    fn empty_query_or_index_yields_nothing() {
        let index = FuzzyIndex::new(["arsenal"]);
        assert!(index.best_match("").is_none());
        assert!(FuzzyIndex::new(Vec::<String>::new()).best_match("arsenal").is_none());
    }

    #[test]
    fn unrelated_query_without_shared_grams_yields_nothing() {
        let index = FuzzyIndex::new(["arsenal"]);
        assert!(index.best_match("ליברפול").is_none());
    }
}
