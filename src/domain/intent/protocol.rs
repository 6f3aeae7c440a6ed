//! Parsing and evaluation of the two-stage classifier protocol.
//!
//! Stage one classifies the message and may name teams. Stage two runs only
//! for searches that still lack a pair, and asks for exactly two slugs plus
//! a confirmation message.

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::domain::catalog::Catalog;
use crate::domain::conversation::{AnalysisResult, Intent};
use crate::domain::foundation::Slug;

/// Protocol-level failures. Always degrade, never reach the user.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("malformed classifier response: {0}")]
    MalformedJson(String),
}

/// What stage one decided.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome {
    /// Final answer; no second call needed.
    Classified(AnalysisResult),
    /// A search without a complete pair. Carries the stage-one result so its
    /// message can survive an empty stage-two message.
    NeedsSecondPass(AnalysisResult),
    /// Transport or parse failure.
    Failed(String),
}

/// Stage-one reply. Every field is optional; wrong types are still an error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassifierReply {
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub slugs: Option<Vec<String>>,
}

/// Stage-two reply.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractionReply {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub slugs: Option<Vec<String>>,
}

/// Removes surrounding code-fence markup (```` ```json ```` / ```` ``` ````).
pub fn strip_code_fences(raw: &str) -> &str {
    let mut body = raw.trim();
    if let Some(rest) = body.strip_prefix("```") {
        body = rest.strip_prefix("json").unwrap_or(rest);
    }
    if let Some(rest) = body.trim_end().strip_suffix("```") {
        body = rest;
    }
    body.trim()
}

fn parse<T>(raw: &str) -> Result<T, ProtocolError>
where
    T: for<'de> Deserialize<'de>,
{
    let body = strip_code_fences(raw);
    let body = if body.is_empty() { "{}" } else { body };
    serde_json::from_str(body).map_err(|e| ProtocolError::MalformedJson(e.to_string()))
}

pub fn parse_classifier_reply(raw: &str) -> Result<ClassifierReply, ProtocolError> {
    parse(raw)
}

pub fn parse_extraction_reply(raw: &str) -> Result<ExtractionReply, ProtocolError> {
    parse(raw)
}

/// Keeps only well-formed slugs that exist in the catalog.
pub fn catalog_slugs(raw: Option<Vec<String>>, catalog: &Catalog) -> Vec<Slug> {
    raw.unwrap_or_default()
        .into_iter()
        .filter_map(|value| match Slug::new(&value) {
            Ok(slug) if catalog.contains(&slug) => Some(slug),
            _ => {
                debug!(slug = %value, "discarding slug outside the catalog");
                None
            }
        })
        .collect()
}

/// True for a search whose known slugs (AI plus deterministic) are fewer than two.
pub fn needs_second_pass(analysis: &AnalysisResult, deterministic: &[Slug]) -> bool {
    if analysis.intent != Intent::Search {
        return false;
    }
    let mut known: Vec<&Slug> = deterministic.iter().collect();
    for slug in &analysis.slugs {
        if !known.contains(&slug) {
            known.push(slug);
        }
    }
    known.len() < 2
}

/// Turns a stage-one reply into its outcome.
pub fn evaluate_stage_one(
    reply: ClassifierReply,
    catalog: &Catalog,
    deterministic: &[Slug],
) -> StageOutcome {
    let intent = reply
        .intent
        .as_deref()
        .map(Intent::from_label)
        .unwrap_or(Intent::Search);
    let analysis = AnalysisResult::new(
        intent,
        reply.message.unwrap_or_default(),
        catalog_slugs(reply.slugs, catalog),
    );

    if needs_second_pass(&analysis, deterministic) {
        StageOutcome::NeedsSecondPass(analysis)
    } else {
        StageOutcome::Classified(analysis)
    }
}

/// Combines a stage-two reply with the stage-one result it refines.
///
/// Stage-two slugs replace stage-one slugs unless stage two returned none.
pub fn merge_stage_two(
    first: AnalysisResult,
    reply: ExtractionReply,
    catalog: &Catalog,
) -> AnalysisResult {
    let slugs = catalog_slugs(reply.slugs, catalog);
    let slugs = if slugs.is_empty() { first.slugs } else { slugs };
    let message = reply
        .message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or(first.message);
    AnalysisResult::new(Intent::Search, message, slugs)
}
