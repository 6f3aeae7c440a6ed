//! HandleMessage command handler.
//!
//! Runs one conversational turn: extract teams, recognize intent, complete the
//! pair from memory, then either hand off a search or pick a reply.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::domain::catalog::Catalog;
use crate::domain::conversation::{
    replies, AnalysisResult, ConversationState, Intent, Role, Session,
};
use crate::domain::foundation::{Slug, StateMachine, Timestamp, UserKey};
use crate::domain::intent::PreCheck;
use crate::domain::matching::EntityExtractor;
use crate::ports::{SearchHandoff, SearchRequest, SessionStore, SessionStoreError};

use super::IntentRecognizer;

/// Minimum gap between two branded greetings to the same user.
pub const DEFAULT_GREETING_COOLDOWN: Duration = Duration::from_secs(15 * 60);

/// Command to process one inbound message.
#[derive(Debug, Clone)]
pub struct HandleMessageCommand {
    pub user_key: UserKey,
    pub text: String,
    /// When the message arrived; drives the greeting cooldown.
    pub received_at: Timestamp,
}

impl HandleMessageCommand {
    pub fn new(user_key: UserKey, text: impl Into<String>) -> Self {
        Self {
            user_key,
            text: text.into(),
            received_at: Timestamp::now(),
        }
    }

    pub fn received_at(mut self, at: Timestamp) -> Self {
        self.received_at = at;
        self
    }
}

/// What the turn decided to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TurnDecision {
    /// Empty input; nothing is sent.
    NoAction,
    /// Memory was cleared.
    Reset { reply: String },
    /// A complete pair was handed off for searching.
    Search {
        home: Slug,
        away: Slug,
        match_slug: String,
        confirmation: String,
    },
    Reply { intent: Intent, text: String },
    /// The turn could not be processed.
    Failed { apology: String },
}

/// Result of a processed turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnOutcome {
    /// State reached by this turn.
    pub state: ConversationState,
    pub decision: TurnDecision,
    /// Slugs the turn resolved, after completion from memory.
    pub slugs: Vec<Slug>,
}

impl TurnOutcome {
    fn failed() -> Self {
        Self {
            state: ConversationState::New,
            decision: TurnDecision::Failed {
                apology: replies::APOLOGY.to_string(),
            },
            slugs: Vec::new(),
        }
    }

    /// Text to send back to the user, if any.
    pub fn reply_text(&self) -> Option<&str> {
        match &self.decision {
            TurnDecision::NoAction => None,
            TurnDecision::Reset { reply } => Some(reply),
            TurnDecision::Search { confirmation, .. } => Some(confirmation),
            TurnDecision::Reply { text, .. } => Some(text),
            TurnDecision::Failed { apology } => Some(apology),
        }
    }
}

#[derive(Debug, Error)]
pub enum HandleMessageError {
    #[error("session store error: {0}")]
    Store(#[from] SessionStoreError),
}

/// Tunables for the turn handler.
#[derive(Debug, Clone)]
pub struct MessageHandlerConfig {
    pub greeting_cooldown: Duration,
}

impl Default for MessageHandlerConfig {
    fn default() -> Self {
        Self {
            greeting_cooldown: DEFAULT_GREETING_COOLDOWN,
        }
    }
}

/// Handler for inbound messages.
pub struct HandleMessageHandler {
    sessions: Arc<dyn SessionStore>,
    handoff: Arc<dyn SearchHandoff>,
    catalog: Arc<Catalog>,
    extractor: EntityExtractor,
    recognizer: IntentRecognizer,
    config: MessageHandlerConfig,
}

impl HandleMessageHandler {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        handoff: Arc<dyn SearchHandoff>,
        catalog: Arc<Catalog>,
        recognizer: IntentRecognizer,
    ) -> Self {
        Self {
            sessions,
            handoff,
            extractor: EntityExtractor::new(catalog.clone()),
            catalog,
            recognizer,
            config: MessageHandlerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: MessageHandlerConfig) -> Self {
        self.config = config;
        self
    }

    /// Processes a turn. Failures are logged and answered with an apology.
    pub async fn handle(&self, cmd: HandleMessageCommand) -> TurnOutcome {
        match self.try_handle(&cmd).await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(user = %cmd.user_key, error = %err, "turn failed");
                TurnOutcome::failed()
            }
        }
    }

    /// Processes a turn, surfacing store failures to the caller.
    pub async fn try_handle(
        &self,
        cmd: &HandleMessageCommand,
    ) -> Result<TurnOutcome, HandleMessageError> {
        let key = &cmd.user_key;
        let _permit = self.sessions.begin_turn(key).await?;
        let session = self.sessions.get_or_create(key).await?;

        // Only the user's own keyword resets; an AI reply echoing it does not.
        if PreCheck::run(&cmd.text) == PreCheck::Reset {
            return self.reset(key, &session).await;
        }

        let deterministic = self.extractor.extract_slugs(&cmd.text);
        let Some(analysis) = self
            .recognizer
            .recognize(&cmd.text, &session, &deterministic)
            .await
        else {
            debug!(user = %key, "empty message, no action");
            return Ok(TurnOutcome {
                state: session.state(),
                decision: TurnDecision::NoAction,
                slugs: Vec::new(),
            });
        };

        self.sessions
            .append_message(key, Role::User, &cmd.text)
            .await?;

        let merged = merge_slugs(&deterministic, &analysis.slugs);
        let slugs = complete_from_memory(merged, session.identified_slugs());
        let remembered = if slugs.is_empty() {
            session.identified_slugs().to_vec()
        } else {
            self.sessions.update_slugs(key, &slugs).await?
        };

        if let [home, away, ..] = slugs.as_slice() {
            return self
                .search(key, &session, &analysis, home.clone(), away.clone(), slugs.clone())
                .await;
        }

        let (reply, greeted) = {
            let mut rng = rand::thread_rng();
            self.select_reply(&analysis, &slugs, &session, &cmd.received_at, &mut rng)
        };
        if greeted {
            self.sessions
                .set_greeting_time(key, cmd.received_at)
                .await?;
        }
        self.sessions.append_message(key, Role::Bot, &reply).await?;

        let state = advance(
            session.state(),
            ConversationState::for_remembered(remembered.len()),
        );
        self.sessions.set_state(key, state).await?;

        Ok(TurnOutcome {
            state,
            decision: TurnDecision::Reply {
                intent: analysis.intent,
                text: reply,
            },
            slugs,
        })
    }

    async fn reset(
        &self,
        key: &UserKey,
        session: &Session,
    ) -> Result<TurnOutcome, HandleMessageError> {
        let state = advance(session.state(), ConversationState::Reset);
        self.sessions.clear(key).await?;
        info!(user = %key, "conversation reset");

        Ok(TurnOutcome {
            state,
            decision: TurnDecision::Reset {
                reply: replies::RESET_CONFIRMATION.to_string(),
            },
            slugs: Vec::new(),
        })
    }

    async fn search(
        &self,
        key: &UserKey,
        session: &Session,
        analysis: &AnalysisResult,
        home: Slug,
        away: Slug,
        slugs: Vec<Slug>,
    ) -> Result<TurnOutcome, HandleMessageError> {
        let confirmation = if analysis.message.trim().is_empty() {
            replies::search_confirmation(
                &self.catalog.display_name(&home),
                &self.catalog.display_name(&away),
            )
        } else {
            analysis.message.clone()
        };

        let request = SearchRequest::new(key.clone(), home, away, confirmation.clone());
        let match_slug = request.match_slug();
        info!(user = %key, match_slug = %match_slug, "pair resolved, handing off search");
        if let Err(err) = self.handoff.hand_off(request.clone()).await {
            warn!(user = %key, match_slug = %match_slug, error = %err, "search handoff failed");
        }

        self.sessions
            .append_message(key, Role::Bot, &confirmation)
            .await?;
        let state = advance(session.state(), ConversationState::Ready);
        self.sessions.set_state(key, state.settled()).await?;

        Ok(TurnOutcome {
            state,
            decision: TurnDecision::Search {
                home: request.home,
                away: request.away,
                match_slug,
                confirmation,
            },
            slugs,
        })
    }

    /// Picks the reply for a turn that did not complete a pair. The flag is
    /// true when the branded greeting was used.
    fn select_reply<R: Rng + ?Sized>(
        &self,
        analysis: &AnalysisResult,
        slugs: &[Slug],
        session: &Session,
        now: &Timestamp,
        rng: &mut R,
    ) -> (String, bool) {
        let ai_message = analysis.message.trim();
        match analysis.intent {
            Intent::Unclear => (replies::CLARIFICATION.to_string(), false),
            Intent::Greeting => {
                if session.should_greet(now, self.config.greeting_cooldown) {
                    (replies::primary_greeting(rng).to_string(), true)
                } else if !ai_message.is_empty() {
                    (ai_message.to_string(), false)
                } else {
                    (replies::SECONDARY_GREETING.to_string(), false)
                }
            }
            Intent::Search | Intent::Support => {
                if !ai_message.is_empty() {
                    (ai_message.to_string(), false)
                } else if let [only] = slugs {
                    (replies::single_team(&self.catalog.display_name(only)), false)
                } else {
                    (replies::example_prompt(rng).to_string(), false)
                }
            }
        }
    }
}

/// Extractor slugs first, then AI slugs not already present.
fn merge_slugs(deterministic: &[Slug], from_ai: &[Slug]) -> Vec<Slug> {
    let mut merged = deterministic.to_vec();
    for slug in from_ai {
        if !merged.contains(slug) {
            merged.push(slug.clone());
        }
    }
    merged
}

/// A lone new team is paired with the most recent different remembered one.
fn complete_from_memory(merged: Vec<Slug>, remembered: &[Slug]) -> Vec<Slug> {
    if merged.len() != 1 {
        return merged;
    }
    let previous = remembered
        .iter()
        .rev()
        .find(|slug| **slug != merged[0])
        .cloned();
    match previous {
        Some(previous) => {
            let mut completed = vec![previous];
            completed.extend(merged);
            completed
        }
        None => merged,
    }
}

fn advance(current: ConversationState, target: ConversationState) -> ConversationState {
    if current == target {
        return target;
    }
    match current.transition_to(target) {
        Ok(next) => next,
        Err(err) => {
            warn!(from = ?current, to = ?target, error = %err, "unexpected state transition");
            target
        }
    }
}
