use std::{
    io::ErrorKind,
    path::{Component, Path, PathBuf},
    time::SystemTime,
};

use bytes::Bytes;
use tokio::io::AsyncWriteExt;

use crate::error::StorageError;

/// Builder for [`DiskStorage`].
#[derive(Debug, Clone)]
pub struct DiskStorageBuilder {
    root: PathBuf,
}

impl DiskStorageBuilder {
    /// Sets the directory holding `documents/` and `archives/`.
    pub fn destination(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Builds a validated disk storage backend.
    pub fn build(self) -> Result<DiskStorage, StorageError> {
        if self.root.as_os_str().is_empty() {
            return Err(StorageError::new("disk storage root path cannot be empty"));
        }

        Ok(DiskStorage { root: self.root })
    }
}

impl Default for DiskStorageBuilder {
    fn default() -> Self {
        Self {
            root: PathBuf::from("storage"),
        }
    }
}

/// An entry found while listing a storage directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntry {
    /// Base name of the entry.
    pub name: String,
    /// Absolute path of the entry.
    pub path: PathBuf,
    /// Size in bytes (files only).
    pub size: u64,
    /// Last modification time, when the platform reports one.
    pub modified: Option<SystemTime>,
}

/// Local filesystem storage rooted at one directory.
///
/// Every path taken by this type is relative to the root and must not escape it.
#[derive(Debug, Clone)]
pub struct DiskStorage {
    root: PathBuf,
}

impl DiskStorage {
    /// Creates a disk storage builder.
    pub fn builder() -> DiskStorageBuilder {
        DiskStorageBuilder::default()
    }

    /// Returns the storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a root-relative path to an absolute one, refusing paths that escape the root.
    pub fn absolute(&self, relative: &str) -> Result<PathBuf, StorageError> {
        let candidate = Path::new(relative);
        let is_safe = !relative.is_empty()
            && candidate
                .components()
                .all(|component| matches!(component, Component::Normal(_) | Component::CurDir));
        if !is_safe {
            return Err(StorageError::new(format!(
                "path `{relative}` escapes the storage root"
            )));
        }

        Ok(self.root.join(candidate))
    }

    /// Writes `bytes` at `relative`, creating parent directories.
    pub async fn write(&self, relative: &str, bytes: &[u8]) -> Result<PathBuf, StorageError> {
        let output_path = self.absolute(relative)?;
        if let Some(parent) = output_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| StorageError::new(format!("failed to create storage directory: {err}")))?;
        }

        let mut file = tokio::fs::File::create(&output_path)
            .await
            .map_err(|err| StorageError::new(format!("failed to create output file: {err}")))?;
        file.write_all(bytes)
            .await
            .map_err(|err| StorageError::new(format!("failed to write output file: {err}")))?;
        file.flush()
            .await
            .map_err(|err| StorageError::new(format!("failed to flush output file: {err}")))?;

        tracing::debug!(
            path = %output_path.display(),
            size = bytes.len(),
            "disk storage: wrote file"
        );
        Ok(output_path)
    }

    /// Reads the file at `relative`; `None` when it does not exist.
    pub async fn read(&self, relative: &str) -> Result<Option<Bytes>, StorageError> {
        let path = self.absolute(relative)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(Bytes::from(bytes))),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StorageError::new(format!(
                "failed to read {}: {err}",
                path.display()
            ))),
        }
    }

    /// Returns `true` when a file exists at `relative`.
    pub async fn exists(&self, relative: &str) -> Result<bool, StorageError> {
        let path = self.absolute(relative)?;
        match tokio::fs::metadata(&path).await {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(StorageError::new(format!(
                "failed to inspect {}: {err}",
                path.display()
            ))),
        }
    }

    /// Removes the file at `relative`; returns whether a file was removed.
    pub async fn remove_file(&self, relative: &str) -> Result<bool, StorageError> {
        let path = self.absolute(relative)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(StorageError::new(format!(
                "failed to delete {}: {err}",
                path.display()
            ))),
        }
    }

    /// Recursively removes the directory at `relative`.
    pub async fn remove_dir(&self, relative: &str) -> Result<(), StorageError> {
        let path = self.absolute(relative)?;
        tokio::fs::remove_dir_all(&path)
            .await
            .map_err(|err| StorageError::new(format!("failed to delete {}: {err}", path.display())))
    }

    /// Lists regular files directly under `relative`, sorted by name.
    ///
    /// A missing directory lists as empty.
    pub async fn list_files(&self, relative: &str) -> Result<Vec<StoredEntry>, StorageError> {
        self.list(relative, EntryKind::File).await
    }

    /// Lists subdirectories directly under `relative`, sorted by name.
    ///
    /// A missing directory lists as empty.
    pub async fn list_dirs(&self, relative: &str) -> Result<Vec<StoredEntry>, StorageError> {
        self.list(relative, EntryKind::Dir).await
    }

    async fn list(&self, relative: &str, wanted: EntryKind) -> Result<Vec<StoredEntry>, StorageError> {
        let dir = self.absolute(relative)?;
        let mut reader = match tokio::fs::read_dir(&dir).await {
            Ok(reader) => reader,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(StorageError::new(format!(
                    "failed to list {}: {err}",
                    dir.display()
                )))
            }
        };

        let mut entries = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|err| StorageError::new(format!("failed to list {}: {err}", dir.display())))?
        {
            let metadata = entry.metadata().await.map_err(|err| {
                StorageError::new(format!(
                    "failed to inspect {}: {err}",
                    entry.path().display()
                ))
            })?;
            let matches = match wanted {
                EntryKind::File => metadata.is_file(),
                EntryKind::Dir => metadata.is_dir(),
            };
            if !matches {
                continue;
            }

            entries.push(StoredEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: entry.path(),
                size: if metadata.is_file() { metadata.len() } else { 0 },
                modified: metadata.modified().ok(),
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}

#[derive(Debug, Clone, Copy)]
enum EntryKind {
    File,
    Dir,
}
