use super::GREETING;
use crate::conversation::{ConversationOptions, ConversationViewModel, TurnOutcome};
use medassist_core::session::{ConversationState, GenerativeSession};
use medassist_core::{SessionCredentials, SessionError};
use std::sync::Arc;

/// General assistant chat widget.
pub struct AssistantChat {
    conversation: ConversationViewModel,
}

impl AssistantChat {
    pub const LABEL: &'static str = "assistant-chat";

    /// Mounts the widget with its own session, greeting the user.
    pub fn mount(client: Arc<dyn GenerativeSession>, credentials: SessionCredentials) -> Self {
        Self::with_label(client, credentials, Self::LABEL)
    }

    pub(super) fn with_label(
        client: Arc<dyn GenerativeSession>,
        credentials: SessionCredentials,
        label: &str,
    ) -> Self {
        let options = ConversationOptions::new(label).with_greeting(GREETING);
        Self {
            conversation: ConversationViewModel::new(client, credentials, options),
        }
    }

    pub async fn send(&self, text: &str) -> Result<TurnOutcome, SessionError> {
        self.conversation.submit_turn(text).await
    }

    pub async fn transcript(&self) -> ConversationState {
        self.conversation.snapshot().await
    }

    pub fn conversation(&self) -> &ConversationViewModel {
        &self.conversation
    }
}
