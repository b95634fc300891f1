//! Gemini-backed implementation of the generative session seam.
//!
//! # Usage
//!
//! ```ignore
//! use medassist_interaction::{GeminiBackend, resolve_credentials};
//! use medassist_core::settings::ClientSettings;
//!
//! let resolved = resolve_credentials();
//! let backend = GeminiBackend::new(resolved.credentials, ClientSettings::default());
//! let session = backend.start_session();
//! ```

pub mod config;
pub mod gemini_session;

pub use config::{CredentialSource, ResolvedCredentials, resolve_credentials};
pub use gemini_session::{GeminiBackend, GeminiSession};
