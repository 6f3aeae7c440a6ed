//! Deterministic checks that run before any AI call.

use crate::domain::catalog::normalize;

/// Clears the user's session.
pub const RESET_KEYWORD: &str = "מחק";

/// Phrases that mark an explicit search request.
pub const SEARCH_MARKERS: [&str; 2] = ["חפש לי הצעות", "תמצא לי הצעות"];

/// Messages that are nothing but a greeting.
pub const GREETING_KEYWORDS: [&str; 7] = ["היי", "הי", "שלום", "מה קורה", "אהלן", "hi", "hello"];

/// Result of the fast path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreCheck {
    /// Nothing to do: the message is empty after normalization.
    Empty,
    Reset,
    /// Skip classification and go straight to slug extraction.
    ForcedSearch,
    Greeting,
    /// Needs full AI classification.
    Classify,
}

impl PreCheck {
    /// Runs the checks in priority order: reset, explicit search, greeting.
    pub fn run(text: &str) -> Self {
        let normalized = normalize(text);
        if normalized.is_empty() {
            return Self::Empty;
        }
        if normalized == RESET_KEYWORD {
            return Self::Reset;
        }
        if SEARCH_MARKERS
            .iter()
            .any(|marker| normalized.starts_with(marker))
        {
            return Self::ForcedSearch;
        }
        if GREETING_KEYWORDS.contains(&normalized.as_str()) {
            return Self::Greeting;
        }
        Self::Classify
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_keyword_tolerates_whitespace_and_punctuation() {
        assert_eq!(PreCheck::run("מחק"), PreCheck::Reset);
        assert_eq!(PreCheck::run("  מחק! "), PreCheck::Reset);
    }

    #[test]
    fn reset_keyword_must_be_the_whole_message() {
        assert_eq!(PreCheck::run("מחק את השיחה"), PreCheck::Classify);
    }

    #[test]
    fn explicit_search_markers_force_search() {
        assert_eq!(
            PreCheck::run("חפש לי הצעות לארסנל נגד ליברפול"),
            PreCheck::ForcedSearch
        );
        assert_eq!(PreCheck::run("תמצא לי הצעות לריאל"), PreCheck::ForcedSearch);
    }

    #[test]
    fn greeting_keywords_match_exactly() {
        assert_eq!(PreCheck::run("היי"), PreCheck::Greeting);
        assert_eq!(PreCheck::run("Hello!"), PreCheck::Greeting);
        assert_eq!(PreCheck::run("מה קורה?"), PreCheck::Greeting);
        assert_eq!(PreCheck::run("היי ארסנל"), PreCheck::Classify);
    }

    #[test]
    fn empty_messages_need_no_action() {
        assert_eq!(PreCheck::run(""), PreCheck::Empty);
        assert_eq!(PreCheck::run(" ?! "), PreCheck::Empty);
    }
}
