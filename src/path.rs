//! Storage path and filename generation for uploaded documents.

use std::{fmt, sync::Arc};

use chrono::Utc;
use uuid::Uuid;

use crate::owner::{OwnerId, OwnerKind};

/// Top-level directory holding owner documents.
pub const DOCUMENTS_DIR: &str = "documents";
/// Top-level directory holding generated archives.
pub const ARCHIVES_DIR: &str = "archives";

const SUFFIX_LEN: usize = 8;

type CustomSuffixFn = dyn Fn() -> String + Send + Sync;

/// Source of the random filename suffix.
#[derive(Clone, Default)]
pub enum SuffixStrategy {
    /// Eight random hexadecimal characters per call.
    #[default]
    Random,
    /// A user-provided generator, for deterministic tests.
    Custom(Arc<CustomSuffixFn>),
}

impl SuffixStrategy {
    /// Wraps a suffix generator.
    pub fn custom<F>(generator: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(generator))
    }

    fn next(&self) -> String {
        let raw = match self {
            Self::Random => Uuid::new_v4().simple().to_string(),
            Self::Custom(generator) => generator(),
        };
        let mut suffix: String = raw.chars().filter(char::is_ascii_alphanumeric).collect();
        suffix.truncate(SUFFIX_LEN);
        suffix
    }
}

impl fmt::Debug for SuffixStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Random => f.write_str("Random"),
            Self::Custom(_) => f.write_str("Custom(<fn>)"),
        }
    }
}

/// Storage location computed for a new document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Directory relative to the storage root: `documents/{kind}/{id}`.
    pub directory: String,
    /// Generated filename.
    pub file_name: String,
}

impl ResolvedPath {
    /// Returns `directory/file_name`.
    pub fn relative_path(&self) -> String {
        format!("{}/{}", self.directory, self.file_name)
    }
}

/// Computes collision-resistant storage names. Never inspects existing files.
#[derive(Debug, Clone, Default)]
pub struct StoragePathResolver {
    suffix: SuffixStrategy,
}

impl StoragePathResolver {
    /// Creates a resolver using `suffix` for the random part of filenames.
    pub fn new(suffix: SuffixStrategy) -> Self {
        Self { suffix }
    }

    /// Resolves a fresh location stamped with the current time.
    pub fn resolve(
        &self,
        kind: OwnerKind,
        id: OwnerId,
        type_code: &str,
        extension: &str,
    ) -> ResolvedPath {
        self.resolve_at(kind, id, type_code, extension, Utc::now().timestamp())
    }

    /// Resolves a location stamped with `timestamp` (unix seconds).
    pub fn resolve_at(
        &self,
        kind: OwnerKind,
        id: OwnerId,
        type_code: &str,
        extension: &str,
        timestamp: i64,
    ) -> ResolvedPath {
        let extension: String = extension
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect::<String>()
            .to_ascii_lowercase();
        let file_name = format!(
            "{kind}_{id}_{type_code}_{timestamp}_{suffix}.{extension}",
            suffix = self.suffix.next()
        );

        ResolvedPath {
            directory: owner_directory(kind, id),
            file_name,
        }
    }
}

/// Returns the storage directory of one owner: `documents/{kind}/{id}`.
pub fn owner_directory(kind: OwnerKind, id: OwnerId) -> String {
    format!("{DOCUMENTS_DIR}/{kind}/{id}")
}

/// Returns the storage directory of one owner kind: `documents/{kind}`.
pub fn kind_directory(kind: OwnerKind) -> String {
    format!("{DOCUMENTS_DIR}/{kind}")
}
