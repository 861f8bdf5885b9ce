//! Configuration for the palette engine, its stores and its collaborators.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::session::errors::{ConfigError, ConfigResult};

/// Env override for the generation backend URL.
pub const ENV_SERVICE_URL: &str = "PALETTEFLOW_SERVICE_URL";
/// Env override for the `SQLite` path.
pub const ENV_DB: &str = "PALETTEFLOW_DB";
/// Env override for the HTTP port.
pub const ENV_PORT: &str = "PALETTEFLOW_PORT";

/// Top-level configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    /// Store capacities.
    pub limits: LimitsConfig,
    /// Persistence settings.
    pub storage: StorageConfig,
    /// Generation backend settings.
    pub service: ServiceConfig,
    /// HTTP surface settings.
    pub server: ServerConfig,
}

impl PaletteConfig {
    /// Defaults with environment overrides applied.
    ///
    /// # Errors
    /// Returns an error if an override cannot be parsed or the result is invalid.
    pub fn from_env() -> ConfigResult<Self> {
        let mut config = Self::default();
        if let Ok(url) = std::env::var(ENV_SERVICE_URL) {
            config.service.base_url = url;
        }
        if let Ok(path) = std::env::var(ENV_DB) {
            config.storage.sqlite_path = PathBuf::from(path);
        }
        if let Ok(port) = std::env::var(ENV_PORT) {
            config.server.port = port.parse().map_err(|_| ConfigError::Env {
                key: ENV_PORT,
                value: port.clone(),
            })?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.limits.max_history == 0 {
            return Err(ConfigError::Invalid(
                "limits.max_history must be > 0".to_string(),
            ));
        }

        if self.limits.max_transcript == 0 {
            return Err(ConfigError::Invalid(
                "limits.max_transcript must be > 0".to_string(),
            ));
        }

        if self.limits.max_sessions == 0 {
            return Err(ConfigError::Invalid(
                "limits.max_sessions must be > 0".to_string(),
            ));
        }

        if self.storage.table.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "storage.table must not be empty".to_string(),
            ));
        }

        if self.service.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "service.timeout_secs must be > 0".to_string(),
            ));
        }

        Url::parse(&self.service.base_url)?;

        Ok(())
    }
}

/// Store capacities.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// History records kept.
    pub max_history: usize,
    /// Transcript entries kept.
    pub max_transcript: usize,
    /// Saved sessions kept.
    pub max_sessions: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_history: 20,
            max_transcript: 200,
            max_sessions: 50,
        }
    }
}

/// Persistence settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// `SQLite` database path.
    pub sqlite_path: PathBuf,
    /// Key/value table name.
    pub table: String,
    /// Key of the history list record.
    pub history_key: String,
    /// Key of the transcript record.
    pub transcript_key: String,
    /// Key of the saved-sessions record.
    pub sessions_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            sqlite_path: PathBuf::from("paletteflow.sqlite"),
            table: "palette_records".to_string(),
            history_key: "ai_color_palette_ng_history".to_string(),
            transcript_key: "ai_color_palette_chat_history".to_string(),
            sessions_key: "ai_color_palette_sessions".to_string(),
        }
    }
}

/// Generation backend settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the backend.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            timeout_secs: 60,
            connect_timeout_secs: 10,
        }
    }
}

/// HTTP surface settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 3000 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PaletteConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.limits.max_history, 20);
        assert_eq!(config.limits.max_transcript, 200);
        assert_eq!(config.limits.max_sessions, 50);
        assert_eq!(config.storage.sessions_key, "ai_color_palette_sessions");
    }

    #[test]
    fn test_zero_caps_rejected() {
        let mut config = PaletteConfig::default();
        config.limits.max_history = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_bad_url_rejected() {
        let mut config = PaletteConfig::default();
        config.service.base_url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Url(_))));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: PaletteConfig =
            serde_json::from_str(r#"{"limits":{"max_history":5,"max_transcript":10,"max_sessions":3}}"#)
                .unwrap();
        assert_eq!(config.limits.max_history, 5);
        assert_eq!(config.server.port, 3000);
    }
}
