//! Intent classification results.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Slug;

/// What the user is trying to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    Greeting,
    Search,
    Support,
    Unclear,
}

impl Intent {
    /// Parses a classifier label. Unknown or empty labels default to `Search`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "GREETING" => Self::Greeting,
            "SUPPORT" => Self::Support,
            "UNCLEAR" => Self::Unclear,
            _ => Self::Search,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Greeting => "GREETING",
            Self::Search => "SEARCH",
            Self::Support => "SUPPORT",
            Self::Unclear => "UNCLEAR",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maximum slugs carried by an analysis.
pub const MAX_ANALYSIS_SLUGS: usize = 2;

/// Output of the intent recognizer for one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub intent: Intent,
    /// User-facing text suggested by the classifier; may be empty.
    pub message: String,
    /// At most two distinct slugs in mention order.
    pub slugs: Vec<Slug>,
}

impl AnalysisResult {
    /// Builds a result, dropping duplicate slugs and anything past the second.
    pub fn new(intent: Intent, message: impl Into<String>, slugs: Vec<Slug>) -> Self {
        let mut distinct: Vec<Slug> = Vec::with_capacity(MAX_ANALYSIS_SLUGS);
        for slug in slugs {
            if distinct.len() == MAX_ANALYSIS_SLUGS {
                break;
            }
            if !distinct.contains(&slug) {
                distinct.push(slug);
            }
        }
        Self {
            intent,
            message: message.into(),
            slugs: distinct,
        }
    }

    /// The uninformative result used whenever the AI backend fails.
    pub fn degraded() -> Self {
        Self::new(Intent::Search, "", Vec::new())
    }

    /// The reset command result, echoing the keyword as its message.
    pub fn reset(keyword: &str) -> Self {
        Self::new(Intent::Support, keyword, Vec::new())
    }

    pub fn greeting() -> Self {
        Self::new(Intent::Greeting, "", Vec::new())
    }

    pub fn is_degraded(&self) -> bool {
        *self == Self::degraded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slug(s: &str) -> Slug {
        Slug::new(s).unwrap()
    }

    #[test]
    fn labels_parse_case_insensitively() {
        assert_eq!(Intent::from_label("greeting"), Intent::Greeting);
        assert_eq!(Intent::from_label(" UNCLEAR "), Intent::Unclear);
        assert_eq!(Intent::from_label("Support"), Intent::Support);
        assert_eq!(Intent::from_label("SEARCH"), Intent::Search);
    }

    #[test]
    fn unknown_labels_default_to_search() {
        assert_eq!(Intent::from_label(""), Intent::Search);
        assert_eq!(Intent::from_label("BOOKING"), Intent::Search);
    }

    #[test]
    fn intent_serializes_in_upper_case() {
        assert_eq!(serde_json::to_string(&Intent::Greeting).unwrap(), "\"GREETING\"");
    }

    #[test]
    fn new_deduplicates_and_caps_slugs() {
        let result = AnalysisResult::new(
            Intent::Search,
            "",
            vec![slug("arsenal"), slug("arsenal"), slug("liverpool"), slug("chelsea")],
        );
        assert_eq!(result.slugs, vec![slug("arsenal"), slug("liverpool")]);
    }

    #[test]
    fn degraded_is_empty_search() {
        let result = AnalysisResult::degraded();
        assert_eq!(result.intent, Intent::Search);
        assert!(result.message.is_empty());
        assert!(result.slugs.is_empty());
        assert!(result.is_degraded());
    }

    #[test]
    fn reset_result_echoes_the_keyword() {
        let result = AnalysisResult::reset("מחק");
        assert_eq!(result.intent, Intent::Support);
        assert_eq!(result.message, "מחק");
        assert!(result.slugs.is_empty());
    }
}
