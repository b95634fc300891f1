//! Client settings loaded from `config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Name of the per-user configuration directory under the platform config dir.
pub const APP_DIR_NAME: &str = "medassist";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Cannot find config directory")]
    ConfigDirNotFound,

    #[error("Failed to read {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Settings for the generative session client.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ClientSettings {
    /// Model name, e.g. `gemini-2.5-flash`
    pub model: String,
    /// Base URL of the models collection
    pub base_url: String,
    pub request_timeout_secs: u64,
    /// Sent with every request when set
    pub system_instruction: Option<String>,
    pub temperature: Option<f32>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            system_instruction: None,
            temperature: None,
        }
    }
}

impl ClientSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Overrides the model after loading.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Loads settings from a TOML file.
    ///
    /// A missing file yields the defaults; a present but invalid file is an error.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            tracing::debug!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| SettingsError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| SettingsError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Loads settings from `~/.config/medassist/config.toml`.
    pub fn load_default() -> Result<Self, SettingsError> {
        Self::load(&config_dir()?.join("config.toml"))
    }
}

/// Returns the medassist configuration directory (e.g. `~/.config/medassist/`).
pub fn config_dir() -> Result<PathBuf, SettingsError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .ok_or(SettingsError::ConfigDirNotFound)
}
