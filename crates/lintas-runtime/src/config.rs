//! # Runtime Configuration
//!
//! Aggregates the core and gateway settings with storage, identity and
//! logging options. Starts from defaults; `LINTAS_*` environment variables
//! override individual fields.

use std::net::IpAddr;
use std::path::PathBuf;

use lintas_api::GatewayConfig;
use lintas_core::LintasConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Complete runtime configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub core: LintasConfig,
    pub gateway: GatewayConfig,
    pub storage: StorageConfig,
    pub identity: IdentityConfig,
    pub logging: LoggingConfig,
}

/// Snapshot persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Restored on start, written on shutdown. `None` keeps state in memory only.
    pub snapshot_path: Option<PathBuf>,
    /// Broadcast capacity of the event bus.
    pub event_capacity: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            snapshot_path: Some(PathBuf::from("./data/lintas.json")),
            event_capacity: 1024,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// JSON array of staff actors.
    pub users_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} has invalid value {value:?}: {reason}")]
    InvalidEnv {
        var: &'static str,
        value: String,
        reason: String,
    },
    #[error("core settings: {0}")]
    Core(String),
    #[error("gateway settings: {0}")]
    Gateway(#[from] lintas_api::ConfigError),
    #[error("event capacity cannot be 0")]
    EventCapacity,
}

fn invalid(var: &'static str, value: &str, reason: impl ToString) -> ConfigError {
    ConfigError::InvalidEnv {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Treat an empty value as "unset" for optional paths.
fn optional_path(value: String) -> Option<PathBuf> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
}

impl RuntimeConfig {
    /// Defaults with overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `LINTAS_*` overrides read through `lookup`.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(value) = lookup("LINTAS_HTTP_HOST") {
            self.gateway.host = value
                .parse::<IpAddr>()
                .map_err(|e| invalid("LINTAS_HTTP_HOST", &value, e))?;
        }
        if let Some(value) = lookup("LINTAS_HTTP_PORT") {
            self.gateway.port = value
                .parse()
                .map_err(|e| invalid("LINTAS_HTTP_PORT", &value, e))?;
        }
        if let Some(value) = lookup("LINTAS_SNAPSHOT_PATH") {
            self.storage.snapshot_path = optional_path(value);
        }
        if let Some(value) = lookup("LINTAS_USERS_FILE") {
            self.identity.users_file = optional_path(value);
        }
        if let Some(value) = lookup("LINTAS_LOG") {
            self.logging.level = value;
        }
        if let Some(value) = lookup("LINTAS_LOG_FORMAT") {
            self.logging.format = match value.trim().to_ascii_lowercase().as_str() {
                "json" => LogFormat::Json,
                "text" | "" => LogFormat::Text,
                _ => return Err(invalid("LINTAS_LOG_FORMAT", &value, "expected json or text")),
            };
        }
        if let Some(value) = lookup("LINTAS_TRACKING_PREFIX") {
            self.core.tracking_prefix = value;
        }
        if let Some(value) = lookup("LINTAS_DOCUMENT_URL") {
            self.core.document_base_url = value;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.core
            .validate()
            .map_err(|e| ConfigError::Core(e.to_string()))?;
        self.gateway.validate()?;
        if self.storage.event_capacity == 0 {
            return Err(ConfigError::EventCapacity);
        }
        Ok(())
    }
}
