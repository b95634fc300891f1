use crate::conversation::{ConversationOptions, ConversationViewModel, TurnOutcome};
use medassist_core::session::{ConversationState, GenerativeSession};
use medassist_core::{SessionCredentials, SessionError, StructuredAnalysis, structure};
use std::sync::Arc;

/// Symptoms offered as toggle chips.
pub const COMMON_SYMPTOMS: &[&str] = &[
    "Headache",
    "Fever",
    "Cough",
    "Fatigue",
    "Sore throat",
    "Runny nose",
    "Nausea",
    "Dizziness",
    "Shortness of breath",
    "Chest pain",
    "Muscle aches",
    "Abdominal pain",
];

pub const DISCLAIMER: &str = "This is an AI-powered preliminary analysis tool. Always consult \
with a healthcare professional for accurate diagnosis.";

const PROMPT_PREFIX: &str = "Analyze these symptoms and provide insights: ";

/// How the latest reply should be displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisView {
    /// The reply had titled sections.
    Sections(StructuredAnalysis),
    /// No sections found; show the text as-is.
    Raw(String),
}

/// Symptom-analysis form.
pub struct SymptomChecker {
    conversation: ConversationViewModel,
    selected: Vec<String>,
    description: String,
}

impl SymptomChecker {
    pub const LABEL: &'static str = "symptom-checker";

    pub fn mount(client: Arc<dyn GenerativeSession>, credentials: SessionCredentials) -> Self {
        Self {
            conversation: ConversationViewModel::new(
                client,
                credentials,
                ConversationOptions::new(Self::LABEL),
            ),
            selected: Vec::new(),
            description: String::new(),
        }
    }

    /// Selects or deselects a symptom. Returns whether it is now selected.
    pub fn toggle_symptom(&mut self, symptom: &str) -> bool {
        let symptom = symptom.trim();
        if symptom.is_empty() {
            return false;
        }
        if let Some(index) = self.selected.iter().position(|s| s == symptom) {
            self.selected.remove(index);
            false
        } else {
            self.selected.push(symptom.to_string());
            true
        }
    }

    pub fn selected_symptoms(&self) -> &[String] {
        &self.selected
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Builds the analysis prompt, or `None` when there is nothing to analyze.
    pub fn compose_prompt(&self) -> Option<String> {
        let mut parts: Vec<&str> = self.selected.iter().map(String::as_str).collect();
        let description = self.description.trim();
        if !description.is_empty() {
            parts.push(description);
        }
        if parts.is_empty() {
            return None;
        }
        Some(format!("{PROMPT_PREFIX}{}", parts.join(", ")))
    }

    /// Sends the selected symptoms and description for analysis.
    ///
    /// # Errors
    ///
    /// `EmptyInput` when nothing is selected or described, `Busy` while a
    /// previous analysis is pending.
    pub async fn analyze(&self) -> Result<TurnOutcome, SessionError> {
        let prompt = self.compose_prompt().ok_or(SessionError::EmptyInput)?;
        self.conversation.submit_turn(&prompt).await
    }

    /// Structures the most recent assistant turn for display.
    pub async fn latest_analysis(&self) -> Option<AnalysisView> {
        let state = self.conversation.snapshot().await;
        let reply = state.last_assistant_turn()?;
        let sections = structure(&reply.content);
        Some(if sections.is_empty() {
            AnalysisView::Raw(reply.content.clone())
        } else {
            AnalysisView::Sections(sections)
        })
    }

    pub async fn is_analyzing(&self) -> bool {
        self.conversation.snapshot().await.is_sending()
    }

    pub async fn transcript(&self) -> ConversationState {
        self.conversation.snapshot().await
    }

    /// Clears the selection, the description and the conversation.
    pub async fn clear(&mut self) {
        self.selected.clear();
        self.description.clear();
        self.conversation.reset().await;
    }
}
