//! # Core Configuration

use serde::{Deserialize, Serialize};

use crate::domain::{LogisticsError, LogisticsResult};

/// Default tracking number prefix (`STT-JKT-000001`).
pub const DEFAULT_TRACKING_PREFIX: &str = "STT";

/// Settings consumed by [`LintasService`](crate::LintasService).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LintasConfig {
    /// First segment of every tracking number.
    pub tracking_prefix: String,

    /// Base URL of the document service printouts are served from.
    pub document_base_url: String,
}

impl Default for LintasConfig {
    fn default() -> Self {
        Self {
            tracking_prefix: DEFAULT_TRACKING_PREFIX.to_string(),
            document_base_url: "http://localhost:8090/documents".to_string(),
        }
    }
}

impl LintasConfig {
    /// Create a config for testing.
    pub fn for_testing() -> Self {
        Self {
            tracking_prefix: "TST".to_string(),
            document_base_url: "https://docs.lintas.test".to_string(),
        }
    }

    pub fn validate(&self) -> LogisticsResult<()> {
        let prefix = self.tracking_prefix.trim();
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(LogisticsError::validation(format!(
                "tracking prefix must be non-empty and alphanumeric, got {:?}",
                self.tracking_prefix
            )));
        }
        if !self.document_base_url.starts_with("http://")
            && !self.document_base_url.starts_with("https://")
        {
            return Err(LogisticsError::validation(format!(
                "document base URL must be http(s), got {:?}",
                self.document_base_url
            )));
        }
        Ok(())
    }
}
