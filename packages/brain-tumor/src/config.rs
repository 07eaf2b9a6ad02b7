//! Configuration values read from the process environment.
//!
//! Values are read once at startup into [`AppConfig`] and handed to whatever
//! needs them; nothing else in the workspace calls `std::env::var` directly
//! for required settings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const BACKEND_URL: &str = "BACKEND_URL";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Missing environment variable {key}")]
    MissingConfiguration { key: String },

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Reads `key` from the environment. Unset and empty values are both missing.
pub fn load_environment_value(key: &str) -> ConfigResult<String> {
    load_value_with(key, |key| std::env::var(key).ok())
}

/// Same rule as [`load_environment_value`] against an arbitrary source.
pub fn load_value_with<F>(key: &str, lookup: F) -> ConfigResult<String>
where
    F: FnOnce(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::MissingConfiguration {
            key: key.to_string(),
        }),
    }
}

/// Joins a base URL and an absolute path without doubling the slash.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the prediction backend.
    pub backend_url: String,
}

impl AppConfig {
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend_url = load_value_with(BACKEND_URL, &lookup)?;
        tracing::debug!(backend_url = %backend_url, "Loaded application configuration");
        Ok(Self { backend_url })
    }

    pub fn endpoint(&self, path: &str) -> String {
        join_url(&self.backend_url, path)
    }
}
