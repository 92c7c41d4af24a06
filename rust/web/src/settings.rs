use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::RwLock;
use std::time::Duration;
use thiserror::Error;

/// Longest turn-back delay accepted for a mismatched pair.
pub const MAX_MISMATCH_DELAY_MS: u64 = 10_000;
/// One day.
pub const MAX_SESSION_TIMEOUT_MINUTES: u64 = 24 * 60;

/// Server settings, editable through `/api/settings` and loadable from TOML.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct AppSettings {
    /// How long a mismatched pair stays face up. Applies to new games.
    pub mismatch_delay_ms: u64,
    /// Inactivity before a session is dropped.
    pub session_timeout_minutes: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            mismatch_delay_ms: 1000,
            session_timeout_minutes: 30,
        }
    }
}

impl AppSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.mismatch_delay_ms > MAX_MISMATCH_DELAY_MS {
            return Err(SettingsError::InvalidValue(format!(
                "mismatch_delay_ms must be at most {MAX_MISMATCH_DELAY_MS}"
            )));
        }

        if self.session_timeout_minutes == 0
            || self.session_timeout_minutes > MAX_SESSION_TIMEOUT_MINUTES
        {
            return Err(SettingsError::InvalidValue(format!(
                "session_timeout_minutes must be between 1 and {MAX_SESSION_TIMEOUT_MINUTES}"
            )));
        }

        Ok(())
    }

    pub fn session_timeout(&self) -> Duration {
        Duration::from_secs(self.session_timeout_minutes * 60)
    }

    /// Read and validate a TOML settings file. Missing keys take defaults.
    pub fn from_toml_file(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|err| SettingsError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        let settings: AppSettings =
            toml::from_str(&text).map_err(|err| SettingsError::Parse(err.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }
}

/// In-memory settings store with validation
#[derive(Debug, Default)]
pub struct SettingsStore {
    settings: RwLock<AppSettings>,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: AppSettings) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self {
            settings: RwLock::new(settings),
        })
    }

    pub fn get(&self) -> Result<AppSettings, SettingsError> {
        self.settings
            .read()
            .map(|guard| guard.clone())
            .map_err(|_| SettingsError::StoragePoisoned)
    }

    pub fn update(&self, new_settings: AppSettings) -> Result<AppSettings, SettingsError> {
        new_settings.validate()?;

        let mut guard = self
            .settings
            .write()
            .map_err(|_| SettingsError::StoragePoisoned)?;
        *guard = new_settings.clone();
        Ok(new_settings)
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
    #[error("Cannot read settings file {path}: {message}")]
    Io { path: String, message: String },
    #[error("Malformed settings file: {0}")]
    Parse(String),
    #[error("Settings storage poisoned")]
    StoragePoisoned,
}

impl crate::errors::IntoErrorResponse for SettingsError {
    fn status_code(&self) -> warp::http::StatusCode {
        use warp::http::StatusCode;
        match self {
            SettingsError::InvalidValue(_) => StatusCode::BAD_REQUEST,
            SettingsError::Io { .. } | SettingsError::Parse(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            SettingsError::StoragePoisoned => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            SettingsError::InvalidValue(_) => "invalid_settings",
            SettingsError::Io { .. } | SettingsError::Parse(_) => "settings_file_error",
            SettingsError::StoragePoisoned => "settings_storage_error",
        }
    }

    fn error_message(&self) -> String {
        self.to_string()
    }

    fn severity(&self) -> crate::errors::ErrorSeverity {
        use crate::errors::ErrorSeverity;
        match self {
            SettingsError::StoragePoisoned => ErrorSeverity::Critical,
            SettingsError::InvalidValue(_) => ErrorSeverity::Client,
            _ => ErrorSeverity::Server,
        }
    }
}
