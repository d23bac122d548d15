use std::path::PathBuf;

use crate::{
    catalog::DocumentTypeCatalog,
    config::DocumentConfig,
    error::ConfigError,
    limits::Limits,
    path::SuffixStrategy,
    storage::DiskStorage,
    DocumentManager,
};

/// Builder for configuring a [`DocumentManager`].
#[derive(Debug, Clone, Default)]
pub struct DocumentManagerBuilder {
    root: Option<PathBuf>,
    config: DocumentConfig,
    suffix: SuffixStrategy,
}

impl DocumentManagerBuilder {
    /// Creates a builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current builder configuration snapshot.
    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }

    /// Sets the storage root holding `documents/` and `archives/`.
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Replaces the full configuration.
    pub fn with_config(mut self, config: DocumentConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the upload policy.
    pub fn limits(mut self, limits: Limits) -> Self {
        self.config.limits = limits;
        self
    }

    /// Sets the document type catalog.
    pub fn catalog(mut self, catalog: DocumentTypeCatalog) -> Self {
        self.config.catalog = catalog;
        self
    }

    /// Sets how many days archives are kept.
    pub fn archive_retention_days(mut self, days: u32) -> Self {
        self.config.archive_retention_days = days;
        self
    }

    /// Sets the source of the random filename suffix.
    pub fn suffix_strategy(mut self, suffix: SuffixStrategy) -> Self {
        self.suffix = suffix;
        self
    }

    /// Validates builder configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.config.validate()
    }

    /// Finalizes and returns a manager over validated configuration.
    pub fn build(self) -> Result<DocumentManager, ConfigError> {
        let root = self.root.ok_or(ConfigError::EmptyRootPath)?;
        let storage = DiskStorage::builder()
            .destination(root)
            .build()
            .map_err(|_| ConfigError::EmptyRootPath)?;

        let mut manager = DocumentManager::with_config(storage, self.config)?;
        manager.set_suffix_strategy(self.suffix);
        Ok(manager)
    }
}
