//! Deterministic, multi-word-aware team extraction from free text.
//!
//! Two-token phrases are tried before single tokens so that names like
//! "אסטון וילה" resolve as one team instead of leaking a partial unigram
//! match. Each candidate goes through exact lookup, Hebrew-prefix stripping
//! and length-aware fuzzy matching, in that order. Catalog names longer than
//! two words ("paris saint germain") are looked up exactly before the
//! two-token pass.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::domain::catalog::{normalize, AliasIndex, Catalog};
use crate::domain::foundation::Slug;

/// Single-letter Hebrew prefixes (to/in/the/and) that may be glued to a name.
pub const HEBREW_PREFIXES: [char; 4] = ['ל', 'ב', 'ה', 'ו'];

/// Candidates shorter than this (in characters, after normalization) are ignored.
pub const MIN_CANDIDATE_CHARS: usize = 2;

/// Prefix stripping only applies to candidates longer than this.
const PREFIX_STRIP_MIN_CHARS: usize = 3;

/// Similarity required for a fuzzy hit, by candidate length.
///
/// Shorter strings need stricter similarity to suppress false positives.
pub fn threshold_for(char_len: usize) -> f64 {
    match char_len {
        0..=3 => 0.90,
        4..=5 => 0.85,
        _ => 0.75,
    }
}

/// How a candidate was resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchMethod {
    Exact,
    PrefixExact,
    Fuzzy { score: f64 },
    PrefixFuzzy { score: f64 },
}

impl fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMethod::Exact => write!(f, "exact"),
            MatchMethod::PrefixExact => write!(f, "prefix+exact"),
            MatchMethod::Fuzzy { score } => write!(f, "fuzzy({:.2})", score),
            MatchMethod::PrefixFuzzy { score } => write!(f, "prefix+fuzzy({:.2})", score),
        }
    }
}

/// A resolved candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenMatch {
    pub slug: Slug,
    pub method: MatchMethod,
}

/// A hit with the token span it covers (inclusive).
#[derive(Debug, Clone)]
struct SpanHit {
    slug: Slug,
    start: usize,
    end: usize,
}

impl SpanHit {
    fn covers(&self, position: usize) -> bool {
        position >= self.start && position <= self.end
    }

    fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start <= end && start <= self.end
    }
}

/// Resolves team mentions in a message to catalog slugs.
#[derive(Debug, Clone)]
pub struct EntityExtractor {
    catalog: Arc<Catalog>,
    /// Token count of the longest normalized alias.
    longest_alias: usize,
}

impl EntityExtractor {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let longest_alias = catalog
            .entries()
            .iter()
            .flat_map(|entry| entry.alias_universe())
            .map(|alias| normalize(alias).split_whitespace().count())
            .max()
            .unwrap_or(1);
        Self {
            catalog,
            longest_alias,
        }
    }

    fn index(&self) -> &AliasIndex {
        self.catalog.index()
    }

    /// Unique slugs in order of first mention. Never fails; empty input
    /// yields an empty list.
    pub fn extract_slugs(&self, text: &str) -> Vec<Slug> {
        let normalized = normalize(text);
        let tokens: Vec<&str> = normalized.split_whitespace().collect();
        if tokens.is_empty() {
            return Vec::new();
        }

        let mut hits: Vec<SpanHit> = Vec::new();

        for width in (3..=self.longest_alias).rev() {
            for (i, window) in tokens.windows(width).enumerate() {
                let end = i + width - 1;
                if hits.iter().any(|hit| hit.overlaps(i, end)) {
                    continue;
                }
                if let Some(found) = self.match_long_phrase(&window.join(" ")) {
                    hits.push(SpanHit {
                        slug: found.slug,
                        start: i,
                        end,
                    });
                }
            }
        }

        let long_hits = hits.len();
        for (i, pair) in tokens.windows(2).enumerate() {
            if hits[..long_hits].iter().any(|hit| hit.overlaps(i, i + 1)) {
                continue;
            }
            let phrase = format!("{} {}", pair[0], pair[1]);
            if let Some(found) = self.match_token(&phrase) {
                hits.push(SpanHit {
                    slug: found.slug,
                    start: i,
                    end: i + 1,
                });
            }
        }

        for (i, token) in tokens.iter().enumerate() {
            if hits.iter().any(|hit| hit.covers(i)) {
                continue;
            }
            if let Some(found) = self.match_token(token) {
                hits.push(SpanHit {
                    slug: found.slug,
                    start: i,
                    end: i,
                });
            }
        }

        // Stable sort keeps longer phrases first for equal starts.
        hits.sort_by_key(|hit| hit.start);

        let mut slugs: Vec<Slug> = Vec::with_capacity(hits.len());
        for hit in hits {
            if !slugs.contains(&hit.slug) {
                slugs.push(hit.slug);
            }
        }

        debug!(text, found = slugs.len(), "extraction finished");
        slugs
    }

    /// Resolves one candidate (a token or a two-token phrase).
    ///
    /// Tries exact, prefix+exact, fuzzy and prefix+fuzzy, stopping at the
    /// first success.
    pub fn match_token(&self, candidate: &str) -> Option<TokenMatch> {
        let normalized = normalize(candidate);
        let char_len = normalized.chars().count();
        if char_len < MIN_CANDIDATE_CHARS {
            return None;
        }

        let threshold = threshold_for(char_len);
        let stripped = strip_hebrew_prefix(&normalized, char_len);

        let found = self
            .exact(&normalized, MatchMethod::Exact)
            .or_else(|| {
                stripped.and_then(|rest| self.exact(rest, MatchMethod::PrefixExact))
            })
            .or_else(|| self.fuzzy(&normalized, threshold, false))
            .or_else(|| stripped.and_then(|rest| self.fuzzy(rest, threshold, true)));

        if let Some(ref hit) = found {
            debug!(candidate, slug = %hit.slug, method = %hit.method, "candidate matched");
        }
        found
    }

    /// Phrases of three or more tokens only match exactly.
    fn match_long_phrase(&self, phrase: &str) -> Option<TokenMatch> {
        let stripped = strip_hebrew_prefix(phrase, phrase.chars().count());
        self.exact(phrase, MatchMethod::Exact)
            .or_else(|| stripped.and_then(|rest| self.exact(rest, MatchMethod::PrefixExact)))
    }

    fn exact(&self, normalized: &str, method: MatchMethod) -> Option<TokenMatch> {
        self.index().exact(normalized).map(|slug| TokenMatch {
            slug: slug.clone(),
            method,
        })
    }

    fn fuzzy(&self, normalized: &str, threshold: f64, stripped: bool) -> Option<TokenMatch> {
        let hit = self.index().fuzzy(normalized)?;
        if hit.score < threshold {
            return None;
        }
        let method = if stripped {
            MatchMethod::PrefixFuzzy { score: hit.score }
        } else {
            MatchMethod::Fuzzy { score: hit.score }
        };
        Some(TokenMatch {
            slug: hit.slug.clone(),
            method,
        })
    }
}

/// Drops one leading Hebrew prefix letter when the candidate is long enough.
fn strip_hebrew_prefix(normalized: &str, char_len: usize) -> Option<&str> {
    if char_len <= PREFIX_STRIP_MIN_CHARS {
        return None;
    }
    let first = normalized.chars().next()?;
    if HEBREW_PREFIXES.contains(&first) {
        Some(&normalized[first.len_utf8()..])
    } else {
        None
    }
}
