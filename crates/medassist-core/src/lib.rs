//! Domain types for the medassist conversational core.
//!
//! This crate holds everything that does not talk to the network: turn and
//! state types, the error taxonomy, credentials, client settings, the
//! [`GenerativeSession`](session::GenerativeSession) seam, and the pure
//! response [`structure`](structurer::structure) function.

pub mod credentials;
pub mod error;
pub mod notices;
pub mod session;
pub mod settings;
pub mod structurer;

// Re-export common types
pub use credentials::{ApiKey, SessionCredentials};
pub use error::{ErrorKind, Result, SessionError};
pub use structurer::{StructuredAnalysis, structure};
