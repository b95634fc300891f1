//! Credential resolution for the Gemini backend.
//!
//! The API key is looked up once at start-up: first in the `GEMINI_API_KEY`
//! environment variable, then in `~/.config/medassist/secret.json`.

use medassist_core::SessionCredentials;
use medassist_core::settings::config_dir;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV_VAR: &str = "GEMINI_API_KEY";

/// Root configuration structure for secret.json
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<GeminiConfig>,
}

/// Gemini API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    #[serde(default)]
    pub model_name: Option<String>,
}

/// Where the resolved key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Environment,
    SecretFile,
    /// No key anywhere; the assistant runs in degraded mode.
    Missing,
}

/// Outcome of the one-time credential lookup.
#[derive(Debug, Clone)]
pub struct ResolvedCredentials {
    pub credentials: SessionCredentials,
    pub source: CredentialSource,
    /// Model named next to the key in secret.json, if any
    pub model_override: Option<String>,
}

/// Loads the secret configuration file from ~/.config/medassist/secret.json
pub fn load_secret_config() -> Result<SecretConfig, String> {
    load_secret_config_from(&secret_path()?)
}

/// Loads a secret configuration file from an explicit path.
pub fn load_secret_config_from(config_path: &Path) -> Result<SecretConfig, String> {
    if !config_path.exists() {
        return Err(format!(
            "Configuration file not found at: {}",
            config_path.display()
        ));
    }

    let content = fs::read_to_string(config_path).map_err(|e| {
        format!(
            "Failed to read configuration file at {}: {}",
            config_path.display(),
            e
        )
    })?;

    serde_json::from_str(&content).map_err(|e| {
        format!(
            "Failed to parse configuration file at {}: {}",
            config_path.display(),
            e
        )
    })
}

/// Resolves credentials from the process environment and the default secret file.
pub fn resolve_credentials() -> ResolvedCredentials {
    let env_value = std::env::var(API_KEY_ENV_VAR).ok();
    let secret_file = secret_path()
        .map_err(|e| tracing::debug!("Secret file location unavailable: {}", e))
        .ok();
    resolve_credentials_from(env_value.as_deref(), secret_file.as_deref())
}

/// Resolves credentials from an explicit environment value and secret file.
///
/// A non-blank environment value wins. Otherwise the secret file is consulted;
/// a missing or unreadable file means the key is absent, never an error.
pub fn resolve_credentials_from(
    env_value: Option<&str>,
    secret_file: Option<&Path>,
) -> ResolvedCredentials {
    let from_env = SessionCredentials::from_raw(env_value);
    if from_env.is_present() {
        tracing::info!("Gemini credentials loaded from {}", API_KEY_ENV_VAR);
        return ResolvedCredentials {
            credentials: from_env,
            source: CredentialSource::Environment,
            model_override: None,
        };
    }

    let gemini = secret_file.and_then(|path| match load_secret_config_from(path) {
        Ok(config) => config.gemini,
        Err(e) => {
            tracing::debug!("{}", e);
            None
        }
    });

    if let Some(config) = gemini {
        let credentials = SessionCredentials::from_raw(Some(&config.api_key));
        if credentials.is_present() {
            tracing::info!("Gemini credentials loaded from secret.json");
            return ResolvedCredentials {
                credentials,
                source: CredentialSource::SecretFile,
                model_override: config.model_name,
            };
        }
    }

    tracing::warn!(
        "No Gemini API key found; set {} to enable the assistant",
        API_KEY_ENV_VAR
    );
    ResolvedCredentials {
        credentials: SessionCredentials::absent(),
        source: CredentialSource::Missing,
        model_override: None,
    }
}

/// Returns the path to the secret file: ~/.config/medassist/secret.json
fn secret_path() -> Result<PathBuf, String> {
    config_dir()
        .map(|dir| dir.join("secret.json"))
        .map_err(|e| e.to_string())
}
