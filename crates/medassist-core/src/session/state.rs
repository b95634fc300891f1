//! Conversation state as seen by presentation.

use super::message::{ConversationTurn, TurnRole};
use crate::error::SessionError;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConversationStatus {
    /// Ready to accept a submission.
    #[default]
    Idle,
    /// Exactly one request is outstanding.
    Sending,
    /// The last request failed; the next submission is still accepted.
    Error,
}

/// Snapshot of one conversation: its turns, status and last failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    pub turns: Vec<ConversationTurn>,
    pub status: ConversationStatus,
    pub last_error: Option<SessionError>,
}

impl ConversationState {
    /// Creates an idle state, optionally seeded with an assistant greeting.
    pub fn new(greeting: Option<&str>) -> Self {
        Self {
            turns: greeting
                .map(|text| vec![ConversationTurn::assistant(text)])
                .unwrap_or_default(),
            status: ConversationStatus::Idle,
            last_error: None,
        }
    }

    pub fn is_sending(&self) -> bool {
        self.status == ConversationStatus::Sending
    }

    /// Returns the most recent assistant turn, if any.
    pub fn last_assistant_turn(&self) -> Option<&ConversationTurn> {
        self.turns
            .iter()
            .rev()
            .find(|turn| turn.role == TurnRole::Assistant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_without_greeting() {
        let state = ConversationState::new(None);
        assert!(state.turns.is_empty());
        assert_eq!(state.status, ConversationStatus::Idle);
        assert!(state.last_error.is_none());
    }

    #[test]
    fn test_new_with_greeting() {
        let state = ConversationState::new(Some("Hi!"));
        assert_eq!(state.turns.len(), 1);
        assert!(state.turns[0].is_assistant());
        assert_eq!(state.last_assistant_turn().map(|t| t.content.as_str()), Some("Hi!"));
    }
}
