//! Conversation view-model and the surfaces built on it.
//!
//! Every surface owns exactly one [`ConversationViewModel`] and one
//! [`GenerativeSession`](medassist_core::session::GenerativeSession); nothing
//! is shared between surfaces, so a turn sent in one never shows up in another.

pub mod conversation;
pub mod surfaces;

#[cfg(test)]
mod test_support;

pub use conversation::{ConversationOptions, ConversationViewModel, TurnOutcome};
pub use surfaces::{
    AnalysisView, AssistantChat, COMMON_SYMPTOMS, FloatingAssistant, PanelState, SymptomChecker,
};
