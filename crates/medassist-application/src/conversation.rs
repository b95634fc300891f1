//! Conversation view-model.
//!
//! `ConversationViewModel` is the authoritative state machine for one
//! surface. It records every turn the user sees, including locally generated
//! notices, and guards the single outstanding request per conversation.
//!
//! ```text
//! Idle ──submit──▶ Sending ──ok──▶ Idle
//!   ▲                 │
//!   │                 └──err──▶ Error ──submit/reset──▶ ...
//!   └──────────── reset (from any state) ◀───────────────┘
//! ```

use medassist_core::notices::{MISSING_CREDENTIALS_NOTICE, failure_notice};
use medassist_core::session::{
    ConversationState, ConversationStatus, ConversationTurn, GenerativeSession,
};
use medassist_core::{SessionCredentials, SessionError};
use parking_lot::Mutex;
use std::sync::Arc;

/// Per-surface options.
#[derive(Debug, Clone, Default)]
pub struct ConversationOptions {
    /// Assistant turn placed at the start of a fresh conversation
    pub greeting: Option<String>,
    /// Label used in log output
    pub label: String,
}

impl ConversationOptions {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            greeting: None,
            label: label.into(),
        }
    }

    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = Some(greeting.into());
        self
    }
}

/// What happened to an accepted submission.
///
/// Rejected submissions (`Busy`, `EmptyInput`) are returned as `Err` instead
/// and leave the conversation untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The backend answered; the reply is the last turn.
    Replied(ConversationTurn),
    /// No credentials: the instructional notice was appended without contacting the backend.
    CredentialsMissing(ConversationTurn),
    /// The request failed; the notice was appended and the conversation is in `Error`.
    Failed {
        notice: ConversationTurn,
        error: SessionError,
    },
    /// The conversation was reset while the request was in flight; the reply was dropped.
    Discarded,
}

impl TurnOutcome {
    /// The assistant turn appended by this submission, if any.
    pub fn assistant_turn(&self) -> Option<&ConversationTurn> {
        match self {
            Self::Replied(turn) | Self::CredentialsMissing(turn) => Some(turn),
            Self::Failed { notice, .. } => Some(notice),
            Self::Discarded => None,
        }
    }
}

struct Inner {
    state: ConversationState,
    /// Bumped by `reset`; replies issued under an older epoch are dropped.
    epoch: u64,
    /// Set while a request is outstanding, even across a reset.
    in_flight: bool,
}

/// State machine driving one [`GenerativeSession`].
pub struct ConversationViewModel {
    inner: Mutex<Inner>,
    client: Arc<dyn GenerativeSession>,
    credentials: SessionCredentials,
    options: ConversationOptions,
}

impl ConversationViewModel {
    /// Creates an idle conversation, seeded with the greeting if one is configured.
    ///
    /// # Arguments
    ///
    /// * `client` - The session this conversation talks through; never shared
    /// * `credentials` - Resolved once at start-up; absence selects degraded mode
    /// * `options` - Greeting and log label
    pub fn new(
        client: Arc<dyn GenerativeSession>,
        credentials: SessionCredentials,
        options: ConversationOptions,
    ) -> Self {
        let state = ConversationState::new(options.greeting.as_deref());
        Self {
            inner: Mutex::new(Inner {
                state,
                epoch: 0,
                in_flight: false,
            }),
            client,
            credentials,
            options,
        }
    }

    /// Returns a read-only copy of the turns, status and last error.
    pub async fn snapshot(&self) -> ConversationState {
        self.inner.lock().state.clone()
    }

    pub async fn status(&self) -> ConversationStatus {
        self.inner.lock().state.status
    }

    pub fn credentials(&self) -> &SessionCredentials {
        &self.credentials
    }

    /// Submits one user turn.
    ///
    /// The user turn is recorded exactly as given and is visible in
    /// [`snapshot`](Self::snapshot) before the backend answers. No lock is
    /// held while waiting for the reply. Dropping the returned future before
    /// it completes puts the conversation back to `Idle`.
    ///
    /// # Errors
    ///
    /// - `SessionError::EmptyInput` if `text` is blank
    /// - `SessionError::Busy` if a request is still outstanding, including one
    ///   issued before the last [`reset`](Self::reset)
    ///
    /// Backend failures are not errors here: they are recorded in the
    /// transcript and reported as [`TurnOutcome::Failed`].
    pub async fn submit_turn(&self, text: &str) -> Result<TurnOutcome, SessionError> {
        if text.trim().is_empty() {
            return Err(SessionError::EmptyInput);
        }

        let pending = {
            let mut inner = self.inner.lock();

            if inner.in_flight {
                tracing::warn!(surface = %self.options.label, "Rejected turn: reply still pending");
                return Err(SessionError::Busy);
            }

            if !self.credentials.is_present() {
                tracing::debug!(surface = %self.options.label, "No credentials, answering locally");
                let notice = ConversationTurn::assistant(MISSING_CREDENTIALS_NOTICE);
                inner.state.turns.push(notice.clone());
                return Ok(TurnOutcome::CredentialsMissing(notice));
            }

            inner.state.turns.push(ConversationTurn::user(text));
            inner.state.status = ConversationStatus::Sending;
            inner.in_flight = true;
            tracing::debug!(surface = %self.options.label, "Idle -> Sending");
            PendingTurn {
                inner: &self.inner,
                epoch: inner.epoch,
                label: &self.options.label,
                settled: false,
            }
        };

        let result = self.client.submit(text).await;
        Ok(pending.settle(result))
    }

    /// Clears every turn and returns to `Idle`, whatever the current state.
    ///
    /// The greeting is not re-seeded and the client forgets its dialogue
    /// context. A reply still in flight is dropped when it arrives; until then
    /// new submissions are refused with `Busy`.
    pub async fn reset(&self) {
        {
            let mut inner = self.inner.lock();
            inner.state = ConversationState::new(None);
            inner.epoch += 1;
        }
        self.client.reset().await;
        tracing::debug!(surface = %self.options.label, "Conversation reset");
    }
}

/// The one outstanding request of a conversation.
///
/// Dropping it unsettled frees the slot and returns `Sending -> Idle`.
struct PendingTurn<'a> {
    inner: &'a Mutex<Inner>,
    epoch: u64,
    label: &'a str,
    settled: bool,
}

impl PendingTurn<'_> {
    fn settle(mut self, result: Result<String, SessionError>) -> TurnOutcome {
        self.settled = true;
        let mut inner = self.inner.lock();
        inner.in_flight = false;

        if inner.epoch != self.epoch {
            tracing::debug!(surface = %self.label, "Dropping reply for a reset conversation");
            return TurnOutcome::Discarded;
        }

        match result {
            Ok(reply) => {
                let turn = ConversationTurn::assistant(reply);
                inner.state.turns.push(turn.clone());
                inner.state.status = ConversationStatus::Idle;
                inner.state.last_error = None;
                tracing::debug!(surface = %self.label, "Sending -> Idle");
                TurnOutcome::Replied(turn)
            }
            Err(error) => {
                let notice = ConversationTurn::assistant(failure_notice(&error));
                inner.state.turns.push(notice.clone());
                inner.state.status = ConversationStatus::Error;
                inner.state.last_error = Some(error.clone());
                tracing::warn!(
                    surface = %self.label,
                    kind = ?error.kind(),
                    "Sending -> Error: {}",
                    error
                );
                TurnOutcome::Failed { notice, error }
            }
        }
    }
}

impl Drop for PendingTurn<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut inner = self.inner.lock();
        inner.in_flight = false;
        if inner.epoch == self.epoch && inner.state.is_sending() {
            inner.state.status = ConversationStatus::Idle;
            tracing::debug!(surface = %self.label, "Request abandoned, Sending -> Idle");
        }
    }
}
