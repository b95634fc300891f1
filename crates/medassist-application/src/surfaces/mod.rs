//! Surface adapters.
//!
//! - `assistant_chat`: general assistant widget
//! - `symptom_checker`: symptom-analysis form with structured results
//! - `floating_assistant`: collapsible assistant panel

mod assistant_chat;
mod floating_assistant;
mod symptom_checker;

pub use assistant_chat::AssistantChat;
pub use floating_assistant::{CREDENTIALS_BANNER, FloatingAssistant, PanelState};
pub use symptom_checker::{AnalysisView, COMMON_SYMPTOMS, DISCLAIMER, SymptomChecker};

/// Opening turn of the chat surfaces.
pub const GREETING: &str = "Hi! I can help you understand your symptoms and provide general \
health information. What would you like to know?";
