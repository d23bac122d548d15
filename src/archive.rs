use std::io::{Cursor, Write};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use zip::{write::FileOptions, CompressionMethod, ZipWriter};

use crate::{
    error::StorageError,
    owner::{OwnerId, OwnerKind},
    path::{owner_directory, ARCHIVES_DIR},
    storage::disk::DiskStorage,
};

/// Bundles an owner's current files into a zip under `archives/`.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveBuilder<'a> {
    storage: &'a DiskStorage,
}

impl<'a> ArchiveBuilder<'a> {
    /// Creates a builder reading from and writing to `storage`.
    pub fn new(storage: &'a DiskStorage) -> Self {
        Self { storage }
    }

    /// Builds an archive stamped with the current time.
    pub async fn build(&self, kind: OwnerKind, id: OwnerId) -> Result<Option<PathBuf>, StorageError> {
        self.build_at(kind, id, Utc::now()).await
    }

    /// Builds `archives/{kind}_{id}_{timestamp}.zip` from the files under the owner directory.
    ///
    /// Returns `None`, writing nothing, when the owner has no files.
    pub async fn build_at(
        &self,
        kind: OwnerKind,
        id: OwnerId,
        now: DateTime<Utc>,
    ) -> Result<Option<PathBuf>, StorageError> {
        let files = self.storage.list_files(&owner_directory(kind, id)).await?;
        if files.is_empty() {
            tracing::debug!(owner_kind = %kind, owner_id = id, "archive: owner has no files");
            return Ok(None);
        }

        let mut buffer = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
            let options = FileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .unix_permissions(0o644);

            for file in &files {
                let bytes = tokio::fs::read(&file.path).await.map_err(|err| {
                    StorageError::new(format!("failed to read {}: {err}", file.path.display()))
                })?;
                let entry_name = file.name.as_str();
                zip.start_file(entry_name, options)
                    .map_err(|err| StorageError::new(format!("failed to add `{entry_name}` to archive: {err}")))?;
                zip.write_all(&bytes)
                    .map_err(|err| StorageError::new(format!("failed to write `{entry_name}` to archive: {err}")))?;
            }

            zip.finish()
                .map_err(|err| StorageError::new(format!("failed to finalize archive: {err}")))?;
        }

        let name = format!("{kind}_{id}_{}.zip", now.format("%Y%m%d_%H%M%S"));
        let path = self
            .storage
            .write(&format!("{ARCHIVES_DIR}/{name}"), &buffer)
            .await?;

        tracing::info!(
            owner_kind = %kind,
            owner_id = id,
            entries = files.len(),
            path = %path.display(),
            "archive: created"
        );
        Ok(Some(path))
    }
}
