//! Storage backends: document files on disk and the owner-record collaborator.

use std::collections::{BTreeMap, BTreeSet};

use crate::{
    error::{DocumentError, NotFoundError, StorageError},
    owner::{OwnerId, OwnerKind},
    registry::DocumentRegistry,
};

/// Disk-backed document file storage.
pub mod disk;
/// JSON-file owner record store.
pub mod json;
/// In-memory owner record store.
pub mod memory;
pub use disk::{DiskStorage, DiskStorageBuilder, StoredEntry};
pub use json::JsonOwnerStore;
pub use memory::MemoryOwnerStore;

/// Owner records of one kind, as loaded from the owner store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnerRecords {
    /// Decoded document map of every readable owner.
    pub owners: BTreeMap<OwnerId, DocumentRegistry>,
    /// Records skipped because they could not be decoded.
    pub rejected: Vec<RejectedRecord>,
}

/// An owner record that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecord {
    /// Owner id, when the record carries a readable one.
    pub id: Option<OwnerId>,
    /// Decoding failure.
    pub error: StorageError,
}

/// Access to the owner records holding each owner's document map.
///
/// Owner persistence lives outside this crate; implementations adapt it.
#[async_trait::async_trait]
pub trait OwnerStore: Send + Sync {
    /// Loads every owner of `kind`, setting aside records that do not decode.
    ///
    /// Fails as a whole only when the records of `kind` cannot be read at all.
    async fn load(&self, kind: OwnerKind) -> Result<OwnerRecords, StorageError>;

    /// Persists the document map of one owner.
    async fn save_documents(
        &self,
        kind: OwnerKind,
        id: OwnerId,
        registry: &DocumentRegistry,
    ) -> Result<(), StorageError>;

    /// Returns every readable owner of `kind` with its decoded document map.
    async fn owners(&self, kind: OwnerKind) -> Result<BTreeMap<OwnerId, DocumentRegistry>, StorageError> {
        Ok(self.load(kind).await?.owners)
    }

    /// Returns the ids of every existing owner of `kind`, readable or not.
    ///
    /// Fails when a record has no readable id, since its directory could not be told apart
    /// from an orphan.
    async fn valid_ids(&self, kind: OwnerKind) -> Result<BTreeSet<OwnerId>, StorageError> {
        let records = self.load(kind).await?;
        let mut ids: BTreeSet<OwnerId> = records.owners.into_keys().collect();
        for rejected in records.rejected {
            let id = rejected.id.ok_or(rejected.error)?;
            ids.insert(id);
        }
        Ok(ids)
    }

    /// Returns `true` when an owner record exists.
    async fn exists(&self, kind: OwnerKind, id: OwnerId) -> Result<bool, StorageError> {
        Ok(self.valid_ids(kind).await?.contains(&id))
    }

    /// Returns the document map of one owner.
    async fn documents(&self, kind: OwnerKind, id: OwnerId) -> Result<DocumentRegistry, DocumentError> {
        let mut records = self.load(kind).await?;
        if let Some(registry) = records.owners.remove(&id) {
            return Ok(registry);
        }
        match records.rejected.into_iter().find(|rejected| rejected.id == Some(id)) {
            Some(rejected) => Err(rejected.error.into()),
            None => Err(NotFoundError::Owner { kind, id }.into()),
        }
    }
}
