#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Document lifecycle management for student (`eleve`) and teacher
//! (`enseignant`) records: upload validation, SHA-256 integrity checks,
//! per-owner zip archives and reclamation of orphaned storage.

/// Owner-facing attach/detach helpers.
pub mod attach;
/// Per-owner zip archives.
pub mod archive;
/// Fluent builder API.
pub mod builder;
/// Allowed document types per owner kind.
pub mod catalog;
/// Content hashing and integrity verification.
pub mod checksum;
/// Subsystem configuration.
pub mod config;
/// Stored document value type.
pub mod document;
/// Error types exposed by this crate.
pub mod error;
/// Incoming upload model.
pub mod file;
/// Upload policy limits.
pub mod limits;
/// Owner kinds and scopes.
pub mod owner;
/// Storage path and filename generation.
pub mod path;
/// Orphan and stale data reclamation.
pub mod reclaim;
/// Per-owner document map and its codec.
pub mod registry;
/// Storage usage statistics.
pub mod stats;
/// Storage backends.
pub mod storage;
/// Upload pipeline.
pub mod upload;
/// Upload policy validation.
pub mod validator;

use std::{
    collections::{BTreeMap, BTreeSet},
    path::PathBuf,
};

pub use archive::ArchiveBuilder;
pub use builder::DocumentManagerBuilder;
pub use catalog::DocumentTypeCatalog;
pub use checksum::ChecksumVerifier;
pub use config::DocumentConfig;
pub use document::Document;
pub use error::{
    ConfigError, DocumentError, ErrorDetail, NotFoundError, StorageError, ValidationError,
    ValidationField,
};
pub use file::UploadedFile;
pub use limits::Limits;
pub use owner::{OwnerId, OwnerKind, OwnerScope};
pub use path::{ResolvedPath, StoragePathResolver, SuffixStrategy};
pub use reclaim::{Finding, OrphanReclaimer, ReclaimOptions, ReclaimReport};
pub use registry::{DocumentRegistry, RegistryViolation};
pub use stats::{DocumentStatistics, ExtensionStatistics};
pub use storage::{
    DiskStorage, JsonOwnerStore, MemoryOwnerStore, OwnerRecords, OwnerStore, RejectedRecord,
};
pub use upload::UploadBatch;
pub use validator::DocumentValidator;

/// Main `doclife` entry point, bound to one storage root.
#[derive(Debug, Clone)]
pub struct DocumentManager {
    config: DocumentConfig,
    storage: DiskStorage,
    validator: DocumentValidator,
    resolver: StoragePathResolver,
}

impl DocumentManager {
    /// Creates a manager with the default school policy.
    pub fn new(storage: DiskStorage) -> Self {
        let config = DocumentConfig::default();
        Self {
            validator: DocumentValidator::new(config.limits.clone()),
            resolver: StoragePathResolver::default(),
            config,
            storage,
        }
    }

    /// Creates a manager with explicit validated configuration.
    pub fn with_config(storage: DiskStorage, config: DocumentConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            validator: DocumentValidator::new(config.limits.clone()),
            resolver: StoragePathResolver::default(),
            config,
            storage,
        })
    }

    /// Creates a fluent builder with the default policy.
    pub fn builder() -> DocumentManagerBuilder {
        DocumentManagerBuilder::default()
    }

    /// Returns an immutable reference to the active configuration.
    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }

    /// Returns an immutable reference to the storage backend.
    pub fn storage(&self) -> &DiskStorage {
        &self.storage
    }

    pub(crate) fn set_suffix_strategy(&mut self, suffix: SuffixStrategy) {
        self.resolver = StoragePathResolver::new(suffix);
    }

    /// Returns `{code → label}` of the document types allowed for `kind`.
    pub fn document_types(&self, kind: OwnerKind) -> &BTreeMap<String, String> {
        self.config.catalog.types_for(kind)
    }

    /// Removes the file at a root-relative `path`; returns whether a file was removed.
    ///
    /// The owner's document map is left untouched.
    pub async fn delete(&self, path: &str) -> Result<bool, StorageError> {
        let deleted = self.storage.remove_file(path).await?;
        tracing::debug!(path, deleted, "document: delete");
        Ok(deleted)
    }

    /// Re-hashes the file behind `document`; `false` when absent, unreadable or altered.
    pub async fn validate_integrity(&self, document: &Document) -> bool {
        match self.storage.read(&document.path).await {
            Ok(current) => ChecksumVerifier::verify(document, current.as_deref()),
            Err(err) => {
                tracing::warn!(path = document.path.as_str(), error = %err, "document: integrity read failed");
                false
            }
        }
    }

    /// Zips the owner's current files into `archives/`; `None` when there are none.
    pub async fn create_archive(
        &self,
        kind: OwnerKind,
        id: OwnerId,
    ) -> Result<Option<PathBuf>, StorageError> {
        ArchiveBuilder::new(&self.storage).build(kind, id).await
    }

    /// Counts files and bytes in the owner's directory.
    pub async fn document_statistics(
        &self,
        kind: OwnerKind,
        id: OwnerId,
    ) -> Result<DocumentStatistics, StorageError> {
        let entries = self.storage.list_files(&path::owner_directory(kind, id)).await?;
        Ok(DocumentStatistics::from_entries(&entries))
    }

    /// Removes owner directories of `kind` whose id is not in `valid_ids`; returns how many.
    pub async fn cleanup_orphaned_documents(
        &self,
        kind: OwnerKind,
        valid_ids: &BTreeSet<OwnerId>,
    ) -> usize {
        self.reclaimer()
            .reclaim_owner_directories(kind, valid_ids, false)
            .await
            .cleaned
    }

    /// Runs the full reclamation job against `owners`.
    pub async fn reclaim(&self, owners: &dyn OwnerStore, options: ReclaimOptions) -> ReclaimReport {
        self.reclaimer().run(owners, options).await
    }

    /// Returns a reclaimer using this manager's storage and retention.
    pub fn reclaimer(&self) -> OrphanReclaimer<'_> {
        OrphanReclaimer::new(&self.storage, self.config.archive_retention())
    }
}
