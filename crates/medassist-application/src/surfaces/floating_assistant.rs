use super::assistant_chat::AssistantChat;
use crate::conversation::TurnOutcome;
use medassist_core::session::{ConversationState, GenerativeSession};
use medassist_core::{SessionCredentials, SessionError};
use std::sync::Arc;

/// Shown instead of the panel when no API key is configured.
pub const CREDENTIALS_BANNER: &str =
    "Gemini API key is missing. Set GEMINI_API_KEY to enable the assistant.";

/// Visibility of the floating panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelState {
    /// Only the launcher button is visible.
    #[default]
    Closed,
    Open,
    /// Collapsed to a button; the conversation is kept.
    Minimized,
}

/// Floating assistant panel wrapping its own chat.
pub struct FloatingAssistant {
    panel: PanelState,
    chat: AssistantChat,
}

impl FloatingAssistant {
    pub const LABEL: &'static str = "floating-assistant";

    pub fn mount(client: Arc<dyn GenerativeSession>, credentials: SessionCredentials) -> Self {
        Self {
            panel: PanelState::Closed,
            chat: AssistantChat::with_label(client, credentials, Self::LABEL),
        }
    }

    pub fn panel_state(&self) -> PanelState {
        self.panel
    }

    /// Opens the panel from any state.
    pub fn open(&mut self) {
        self.panel = PanelState::Open;
    }

    /// Switches between open and minimized. No effect while closed.
    pub fn toggle_minimize(&mut self) {
        self.panel = match self.panel {
            PanelState::Open => PanelState::Minimized,
            PanelState::Minimized => PanelState::Open,
            PanelState::Closed => PanelState::Closed,
        };
    }

    pub fn close(&mut self) {
        self.panel = PanelState::Closed;
    }

    pub fn credentials_banner(&self) -> Option<&'static str> {
        (!self.chat.conversation().credentials().is_present()).then_some(CREDENTIALS_BANNER)
    }

    pub async fn send(&self, text: &str) -> Result<TurnOutcome, SessionError> {
        self.chat.send(text).await
    }

    pub async fn transcript(&self) -> ConversationState {
        self.chat.transcript().await
    }
}
