use std::{collections::BTreeMap, path::Path};

use serde::Serialize;

use crate::storage::disk::StoredEntry;

/// File count and size for one extension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExtensionStatistics {
    /// Number of files.
    pub count: usize,
    /// Total size in bytes.
    pub size: u64,
}

/// Storage usage of one owner, computed from the files on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentStatistics {
    /// Number of files in the owner directory.
    pub file_count: usize,
    /// Total size in bytes.
    pub total_size: u64,
    /// Breakdown keyed by lowercase extension (empty key for files without one).
    pub by_extension: BTreeMap<String, ExtensionStatistics>,
}

impl DocumentStatistics {
    pub(crate) fn from_entries(entries: &[StoredEntry]) -> Self {
        let mut stats = Self::default();
        for entry in entries {
            let extension = Path::new(&entry.name)
                .extension()
                .and_then(|ext| ext.to_str())
                .map(str::to_ascii_lowercase)
                .unwrap_or_default();

            stats.file_count += 1;
            stats.total_size += entry.size;
            let bucket = stats.by_extension.entry(extension).or_default();
            bucket.count += 1;
            bucket.size += entry.size;
        }
        stats
    }
}
