use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use tokio::sync::RwLock;

use super::{OwnerRecords, OwnerStore};
use crate::{
    error::StorageError,
    owner::{OwnerId, OwnerKind},
    registry::DocumentRegistry,
};

type OwnerTable = HashMap<OwnerKind, BTreeMap<OwnerId, DocumentRegistry>>;

/// In-memory owner records, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryOwnerStore {
    owners: Arc<RwLock<OwnerTable>>,
}

impl MemoryOwnerStore {
    /// Creates a store with no owners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an owner record.
    pub async fn insert_owner(&self, kind: OwnerKind, id: OwnerId, registry: DocumentRegistry) {
        self.owners
            .write()
            .await
            .entry(kind)
            .or_default()
            .insert(id, registry);
    }

    /// Removes an owner record, returning its document map.
    pub async fn remove_owner(&self, kind: OwnerKind, id: OwnerId) -> Option<DocumentRegistry> {
        self.owners
            .write()
            .await
            .get_mut(&kind)
            .and_then(|owners| owners.remove(&id))
    }

    /// Returns the current document map of an owner.
    pub async fn get(&self, kind: OwnerKind, id: OwnerId) -> Option<DocumentRegistry> {
        self.owners
            .read()
            .await
            .get(&kind)
            .and_then(|owners| owners.get(&id))
            .cloned()
    }
}

#[async_trait::async_trait]
impl OwnerStore for MemoryOwnerStore {
    async fn load(&self, kind: OwnerKind) -> Result<OwnerRecords, StorageError> {
        let owners = self
            .owners
            .read()
            .await
            .get(&kind)
            .cloned()
            .unwrap_or_default();
        Ok(OwnerRecords {
            owners,
            rejected: Vec::new(),
        })
    }

    async fn save_documents(
        &self,
        kind: OwnerKind,
        id: OwnerId,
        registry: &DocumentRegistry,
    ) -> Result<(), StorageError> {
        let mut owners = self.owners.write().await;
        let slot = owners
            .get_mut(&kind)
            .and_then(|owners| owners.get_mut(&id))
            .ok_or_else(|| StorageError::new(format!("{kind} `{id}` does not exist")))?;
        *slot = registry.clone();

        tracing::debug!(
            owner_kind = %kind,
            owner_id = id,
            documents = registry.len(),
            "memory owner store: saved document map"
        );
        Ok(())
    }
}
