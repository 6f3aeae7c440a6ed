//! Conversation state machine.
//!
//! Tracks how close a user's conversation is to a complete team pair.
//! There is no terminal state: a conversation lives until its session is
//! evicted.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Where a user's conversation stands.
///
/// - `New`: nothing remembered yet
/// - `AwaitingSecondTeam`: at least one team remembered, no pending pair
/// - `Ready`: a complete pair was just resolved and handed off
/// - `Reset`: the user asked to forget everything
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversationState {
    #[default]
    New,
    AwaitingSecondTeam,
    Ready,
    Reset,
}

impl ConversationState {
    /// The state a conversation rests in once a turn has finished.
    ///
    /// `Ready` is transient: after the handoff the remembered slugs stay, so the
    /// conversation waits for the next team. `Reset` settles back to `New`.
    pub fn settled(self) -> Self {
        match self {
            Self::Ready => Self::AwaitingSecondTeam,
            Self::Reset => Self::New,
            other => other,
        }
    }

    /// State implied by the number of remembered slugs when no pair completed.
    pub fn for_remembered(count: usize) -> Self {
        if count == 0 {
            Self::New
        } else {
            Self::AwaitingSecondTeam
        }
    }
}

impl StateMachine for ConversationState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ConversationState::*;
        matches!(
            (self, target),
            (New, AwaitingSecondTeam)
                | (New, Ready)
                | (AwaitingSecondTeam, Ready)
                | (Ready, AwaitingSecondTeam)
                // The reset keyword is honoured from anywhere
                | (New, Reset)
                | (AwaitingSecondTeam, Reset)
                | (Ready, Reset)
                | (Reset, New)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ConversationState::*;
        match self {
            New => vec![AwaitingSecondTeam, Ready, Reset],
            AwaitingSecondTeam => vec![Ready, Reset],
            Ready => vec![AwaitingSecondTeam, Reset],
            Reset => vec![New],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_new() {
        assert_eq!(ConversationState::default(), ConversationState::New);
    }

    #[test]
    fn serializes_to_screaming_snake_case() {
        let json = serde_json::to_string(&ConversationState::AwaitingSecondTeam).unwrap();
        assert_eq!(json, "\"AWAITING_SECOND_TEAM\"");
    }

    #[test]
    fn pair_completion_flow_is_valid() {
        let state = ConversationState::New
            .transition_to(ConversationState::AwaitingSecondTeam)
            .unwrap()
            .transition_to(ConversationState::Ready)
            .unwrap()
            .transition_to(ConversationState::AwaitingSecondTeam)
            .unwrap();
        assert_eq!(state, ConversationState::AwaitingSecondTeam);
    }

    #[test]
    fn reset_is_reachable_from_every_live_state() {
        for state in [
            ConversationState::New,
            ConversationState::AwaitingSecondTeam,
            ConversationState::Ready,
        ] {
            assert!(state.can_transition_to(&ConversationState::Reset));
        }
    }

    #[test]
    fn reset_only_leads_back_to_new() {
        assert_eq!(
            ConversationState::Reset.valid_transitions(),
            vec![ConversationState::New]
        );
        assert!(ConversationState::Reset
            .transition_to(ConversationState::Ready)
            .is_err());
    }

    #[test]
    fn no_state_is_terminal() {
        for state in [
            ConversationState::New,
            ConversationState::AwaitingSecondTeam,
            ConversationState::Ready,
            ConversationState::Reset,
        ] {
            assert!(!state.is_terminal());
        }
    }

    #[test]
    fn transient_states_settle() {
        assert_eq!(
            ConversationState::Ready.settled(),
            ConversationState::AwaitingSecondTeam
        );
        assert_eq!(ConversationState::Reset.settled(), ConversationState::New);
        assert_eq!(ConversationState::New.settled(), ConversationState::New);
    }

    #[test]
    fn remembered_count_picks_resting_state() {
        assert_eq!(ConversationState::for_remembered(0), ConversationState::New);
        assert_eq!(
            ConversationState::for_remembered(1),
            ConversationState::AwaitingSecondTeam
        );
        assert_eq!(
            ConversationState::for_remembered(2),
            ConversationState::AwaitingSecondTeam
        );
    }
}
