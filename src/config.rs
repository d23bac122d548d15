use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{catalog::DocumentTypeCatalog, error::ConfigError, limits::Limits};

/// Default number of days generated archives are kept.
pub const DEFAULT_ARCHIVE_RETENTION_DAYS: u32 = 30;

/// Top-level document subsystem configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Upload policy.
    pub limits: Limits,
    /// Allowed document types per owner kind.
    pub catalog: DocumentTypeCatalog,
    /// Archives older than this many days are reclaimed.
    pub archive_retention_days: u32,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            catalog: DocumentTypeCatalog::default(),
            archive_retention_days: DEFAULT_ARCHIVE_RETENTION_DAYS,
        }
    }
}

impl DocumentConfig {
    /// Creates a default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes and validates a JSON configuration; absent fields keep their defaults.
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(input).map_err(|err| ConfigError::Load {
            message: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, decodes and validates a JSON configuration file.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let input = std::fs::read_to_string(path).map_err(|err| ConfigError::Load {
            message: format!("cannot read {}: {err}", path.display()),
        })?;
        Self::from_json_str(&input)
    }

    /// Returns the archive retention window.
    pub fn archive_retention(&self) -> Duration {
        Duration::from_secs(u64::from(self.archive_retention_days) * 24 * 60 * 60)
    }

    /// Validates limits, catalog and retention.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.limits.validate()?;
        self.catalog.validate()?;
        if self.archive_retention_days == 0 {
            return Err(ConfigError::InvalidLimitValue {
                limit: "archive_retention_days",
            });
        }
        Ok(())
    }
}
