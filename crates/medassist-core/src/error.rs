//! Error types for conversational sessions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse classification of a [`SessionError`].
///
/// The state machine treats all failures uniformly; presentation code uses the
/// kind to pick a notice and to decide whether the user can simply re-submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// No API key was configured when the process started.
    NoCredentials,
    /// The request never produced an HTTP response.
    NetworkFailure,
    /// The backend answered with an error, a malformed payload, or a blank reply.
    BackendError,
    /// A request is already in flight for this conversation.
    Busy,
    /// The submitted text was empty after trimming.
    EmptyInput,
}

/// Error returned by session clients and conversation view-models.
///
/// This provides typed, structured error variants that can be serialized
/// across an IPC boundary without losing their classification.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionError {
    /// Credentials are absent for the lifetime of the process
    #[error("Generative backend credentials are not configured")]
    NoCredentials,

    /// Transport-level failure (connect, timeout, TLS, body read)
    #[error("Network failure: {message}")]
    NetworkFailure { message: String, is_timeout: bool },

    /// The remote service reported an error or returned an unusable payload
    #[error("Backend error: {message}")]
    BackendError {
        status_code: Option<u16>,
        message: String,
        is_retryable: bool,
    },

    /// Local concurrency guard rejection
    #[error("A reply is still pending for this conversation")]
    Busy,

    /// Nothing to send
    #[error("Message is empty")]
    EmptyInput,
}

impl SessionError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NetworkFailure error
    pub fn network(message: impl Into<String>, is_timeout: bool) -> Self {
        Self::NetworkFailure {
            message: message.into(),
            is_timeout,
        }
    }

    /// Creates a BackendError for a payload problem (no HTTP status involved)
    pub fn backend(message: impl Into<String>) -> Self {
        Self::BackendError {
            status_code: None,
            message: message.into(),
            is_retryable: false,
        }
    }

    /// Creates a BackendError for a non-success HTTP status
    pub fn backend_status(status_code: u16, message: impl Into<String>, is_retryable: bool) -> Self {
        Self::BackendError {
            status_code: Some(status_code),
            message: message.into(),
            is_retryable,
        }
    }

    // ============================================================================
    // Classification
    // ============================================================================

    /// Returns the coarse kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoCredentials => ErrorKind::NoCredentials,
            Self::NetworkFailure { .. } => ErrorKind::NetworkFailure,
            Self::BackendError { .. } => ErrorKind::BackendError,
            Self::Busy => ErrorKind::Busy,
            Self::EmptyInput => ErrorKind::EmptyInput,
        }
    }

    /// Check if this error was raised locally, before any network I/O.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Busy | Self::EmptyInput | Self::NoCredentials)
    }

    /// Check if re-submitting the same text later might succeed.
    ///
    /// Nothing in the core retries automatically; this is a hint for presentation.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::NetworkFailure { .. } => true,
            Self::BackendError { is_retryable, .. } => *is_retryable,
            _ => false,
        }
    }
}

/// A type alias for `Result<T, SessionError>`.
pub type Result<T> = std::result::Result<T, SessionError>;
