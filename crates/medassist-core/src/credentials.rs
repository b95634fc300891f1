//! Backend credentials.
//!
//! Presence is decided once at process start and never changes afterwards.
//! Every component that needs backend access receives a [`SessionCredentials`]
//! through its constructor.

use std::fmt;
use std::sync::Arc;

/// An API key for the generative backend.
///
/// # Security Note
///
/// The key is never printed: `Debug` and `Display` are redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(Arc<str>);

impl ApiKey {
    /// Wraps a raw key. Returns `None` for blank input.
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(Arc::from(trimmed)))
        }
    }

    /// Returns the raw key for building a request.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Optionally-absent capability token for the generative backend.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionCredentials {
    api_key: Option<ApiKey>,
}

impl SessionCredentials {
    pub fn present(api_key: ApiKey) -> Self {
        Self {
            api_key: Some(api_key),
        }
    }

    pub fn absent() -> Self {
        Self::default()
    }

    /// Builds credentials from an optional raw key; blank keys count as absent.
    pub fn from_raw(raw: Option<&str>) -> Self {
        Self {
            api_key: raw.and_then(ApiKey::new),
        }
    }

    pub fn is_present(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn api_key(&self) -> Option<&ApiKey> {
        self.api_key.as_ref()
    }
}
