//! Fixed user-facing texts appended to transcripts.

use crate::error::{ErrorKind, SessionError};

/// Assistant turn appended instead of contacting the backend when no API key is set.
pub const MISSING_CREDENTIALS_NOTICE: &str = "The Gemini API key is missing or invalid. \
Set GEMINI_API_KEY (or add it to ~/.config/medassist/secret.json) to use this feature.";

pub const NETWORK_FAILURE_NOTICE: &str =
    "I couldn't reach the assistant service. Please check your connection and try again.";

pub const BACKEND_FAILURE_NOTICE: &str =
    "An error occurred while preparing a response. Please try again later.";

/// Returns the notice recorded in the transcript for a failed turn.
pub fn failure_notice(error: &SessionError) -> &'static str {
    match error.kind() {
        ErrorKind::NetworkFailure => NETWORK_FAILURE_NOTICE,
        ErrorKind::NoCredentials => MISSING_CREDENTIALS_NOTICE,
        ErrorKind::BackendError | ErrorKind::Busy | ErrorKind::EmptyInput => BACKEND_FAILURE_NOTICE,
    }
}
