//! Intent recognition: deterministic pre-checks, then the two-stage AI
//! protocol.
//!
//! The recognizer never fails. Transport errors, timeouts and malformed
//! replies at either stage collapse into the degraded `{SEARCH, "", []}`
//! result.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::domain::catalog::Catalog;
use crate::domain::conversation::{AnalysisResult, Intent, Role, Session};
use crate::domain::foundation::Slug;
use crate::domain::intent::{
    classification_instruction, evaluate_stage_one, extraction_prompt, merge_stage_two,
    needs_second_pass, parse_classifier_reply, parse_extraction_reply, PreCheck, StageOutcome,
    RESET_KEYWORD,
};
use crate::ports::{AIError, AIProvider, CompletionRequest, Message, MessageRole, RequestMetadata};

/// Default upper bound for a single backend call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

const CLASSIFIER_TEMPERATURE: f32 = 0.3;
const CLASSIFIER_MAX_TOKENS: u32 = 512;

pub struct IntentRecognizer {
    provider: Option<Arc<dyn AIProvider>>,
    catalog: Arc<Catalog>,
    call_timeout: Duration,
}

impl IntentRecognizer {
    pub fn new(provider: Option<Arc<dyn AIProvider>>, catalog: Arc<Catalog>) -> Self {
        Self {
            provider,
            catalog,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Bounds every backend call; an elapsed call counts as a timeout.
    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Classifies `text` in the context of `session`.
    ///
    /// `deterministic` are the slugs the extractor already found; they count
    /// toward the pair when deciding whether a second AI pass is needed.
    /// Returns `None` when there is nothing to act on.
    pub async fn recognize(
        &self,
        text: &str,
        session: &Session,
        deterministic: &[Slug],
    ) -> Option<AnalysisResult> {
        let analysis = match PreCheck::run(text) {
            PreCheck::Empty => return None,
            PreCheck::Reset => AnalysisResult::reset(RESET_KEYWORD),
            PreCheck::Greeting => AnalysisResult::greeting(),
            PreCheck::ForcedSearch => self.run_protocol(text, session, deterministic, true).await,
            PreCheck::Classify => self.run_protocol(text, session, deterministic, false).await,
        };
        debug!(
            user = %session.user_key(),
            intent = %analysis.intent,
            slugs = analysis.slugs.len(),
            "intent recognized"
        );
        Some(analysis)
    }

    async fn run_protocol(
        &self,
        text: &str,
        session: &Session,
        deterministic: &[Slug],
        forced_search: bool,
    ) -> AnalysisResult {
        let Some(provider) = self.provider.as_deref() else {
            debug!("no AI provider configured, degrading");
            return AnalysisResult::degraded();
        };

        let metadata = RequestMetadata::new(session.user_key().clone());
        let mut conversation: Vec<Message> = session
            .history()
            .map(|turn| match turn.role {
                Role::User => Message::user(turn.text.clone()),
                Role::Bot => Message::assistant(turn.text.clone()),
            })
            .collect();
        conversation.push(Message::user(text));

        let outcome = if forced_search {
            let forced = AnalysisResult::new(Intent::Search, "", Vec::new());
            if needs_second_pass(&forced, deterministic) {
                StageOutcome::NeedsSecondPass(forced)
            } else {
                StageOutcome::Classified(forced)
            }
        } else {
            info!(trace_id = %metadata.trace_id, "classifier stage 1");
            self.stage_one(provider, &metadata, &conversation, deterministic)
                .await
        };

        match outcome {
            StageOutcome::Classified(analysis) => analysis,
            StageOutcome::NeedsSecondPass(first) => {
                info!(trace_id = %metadata.trace_id, "classifier stage 2");
                match self
                    .stage_two(provider, &metadata, &conversation, text, first)
                    .await
                {
                    Ok(analysis) => analysis,
                    Err(err) => {
                        warn!(trace_id = %metadata.trace_id, error = %err, "classifier stage 2 failed");
                        AnalysisResult::degraded()
                    }
                }
            }
            StageOutcome::Failed(reason) => {
                warn!(trace_id = %metadata.trace_id, error = %reason, "classifier stage 1 failed");
                AnalysisResult::degraded()
            }
        }
    }

    async fn stage_one(
        &self,
        provider: &dyn AIProvider,
        metadata: &RequestMetadata,
        conversation: &[Message],
        deterministic: &[Slug],
    ) -> StageOutcome {
        let request = CompletionRequest::new(metadata.clone())
            .with_system_prompt(classification_instruction(&self.catalog))
            .with_messages(conversation.iter().cloned())
            .with_temperature(CLASSIFIER_TEMPERATURE)
            .with_max_tokens(CLASSIFIER_MAX_TOKENS)
            .expecting_json();

        let reply = match self.call(provider, request).await {
            Ok(content) => content,
            Err(err) => return StageOutcome::Failed(err.to_string()),
        };
        match parse_classifier_reply(&reply) {
            Ok(parsed) => evaluate_stage_one(parsed, &self.catalog, deterministic),
            Err(err) => StageOutcome::Failed(err.to_string()),
        }
    }

    async fn stage_two(
        &self,
        provider: &dyn AIProvider,
        metadata: &RequestMetadata,
        conversation: &[Message],
        text: &str,
        first: AnalysisResult,
    ) -> Result<AnalysisResult, AIError> {
        let request = CompletionRequest::new(metadata.clone())
            .with_system_prompt(classification_instruction(&self.catalog))
            .with_messages(conversation.iter().cloned())
            .with_message(MessageRole::User, extraction_prompt(text, &self.catalog))
            .with_temperature(CLASSIFIER_TEMPERATURE)
            .with_max_tokens(CLASSIFIER_MAX_TOKENS)
            .expecting_json();

        let reply = self.call(provider, request).await?;
        let parsed = parse_extraction_reply(&reply)?;
        Ok(merge_stage_two(first, parsed, &self.catalog))
    }

    async fn call(
        &self,
        provider: &dyn AIProvider,
        request: CompletionRequest,
    ) -> Result<String, AIError> {
        match tokio::time::timeout(self.call_timeout, provider.complete(request)).await {
            Ok(result) => result.map(|response| response.content),
            Err(_) => Err(AIError::timed_out_after(self.call_timeout)),
        }
    }
}
