use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use serde_json::Value;

use super::{OwnerRecords, OwnerStore, RejectedRecord};
use crate::{
    error::StorageError,
    owner::{OwnerId, OwnerKind},
    registry::DocumentRegistry,
};

/// Owner records exported as JSON, one file per owner kind.
///
/// `{dir}/{kind}.json` holds an array of record objects. Each record carries an
/// `id` and the kind's document-map field; other fields are preserved untouched.
#[derive(Debug, Clone)]
pub struct JsonOwnerStore {
    dir: PathBuf,
}

impl JsonOwnerStore {
    /// Creates a store reading records from `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the records file of one owner kind.
    pub fn records_path(&self, kind: OwnerKind) -> PathBuf {
        self.dir.join(format!("{kind}.json"))
    }

    async fn load_records(&self, kind: OwnerKind) -> Result<Vec<Value>, StorageError> {
        let path = self.records_path(kind);
        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|err| StorageError::new(format!("failed to read {}: {err}", path.display())))?;
        match serde_json::from_str(&raw) {
            Ok(Value::Array(records)) => Ok(records),
            Ok(_) => Err(StorageError::new(format!(
                "{} must contain an array of owner records",
                path.display()
            ))),
            Err(err) => Err(StorageError::new(format!(
                "failed to decode {}: {err}",
                path.display()
            ))),
        }
    }

    async fn store_records(&self, kind: OwnerKind, records: Vec<Value>) -> Result<(), StorageError> {
        let path = self.records_path(kind);
        let encoded = serde_json::to_vec_pretty(&Value::Array(records))
            .map_err(|err| StorageError::new(format!("failed to encode owner records: {err}")))?;

        let staging = staging_path(&path);
        tokio::fs::write(&staging, encoded)
            .await
            .map_err(|err| StorageError::new(format!("failed to write {}: {err}", staging.display())))?;
        tokio::fs::rename(&staging, &path)
            .await
            .map_err(|err| StorageError::new(format!("failed to replace {}: {err}", path.display())))
    }
}

#[async_trait::async_trait]
impl OwnerStore for JsonOwnerStore {
    async fn load(&self, kind: OwnerKind) -> Result<OwnerRecords, StorageError> {
        let mut records = OwnerRecords::default();
        for record in self.load_records(kind).await? {
            let Some(id) = record_id(&record) else {
                let error = StorageError::new(format!("{kind} record without a numeric `id`: {record}"));
                tracing::warn!(owner_kind = %kind, error = %error, "json owner store: skipping record");
                records.rejected.push(RejectedRecord { id: None, error });
                continue;
            };

            let field = record
                .get(kind.documents_field())
                .cloned()
                .unwrap_or(Value::Null);
            match DocumentRegistry::from_json_value(field) {
                Ok(registry) => {
                    records.owners.insert(id, registry);
                }
                Err(err) => {
                    let error = StorageError::new(format!("{kind} `{id}`: {err}"));
                    tracing::warn!(
                        owner_kind = %kind,
                        owner_id = id,
                        error = %error,
                        "json owner store: skipping record"
                    );
                    records.rejected.push(RejectedRecord { id: Some(id), error });
                }
            }
        }
        Ok(records)
    }

    async fn valid_ids(&self, kind: OwnerKind) -> Result<BTreeSet<OwnerId>, StorageError> {
        self.load_records(kind)
            .await?
            .iter()
            .map(|record| {
                record_id(record).ok_or_else(|| {
                    StorageError::new(format!("{kind} record without a numeric `id`: {record}"))
                })
            })
            .collect()
    }

    async fn save_documents(
        &self,
        kind: OwnerKind,
        id: OwnerId,
        registry: &DocumentRegistry,
    ) -> Result<(), StorageError> {
        let mut records = self.load_records(kind).await?;
        let record = records
            .iter_mut()
            .find(|record| record_id(record) == Some(id))
            .and_then(Value::as_object_mut)
            .ok_or_else(|| StorageError::new(format!("{kind} `{id}` does not exist")))?;
        record.insert(kind.documents_field().to_owned(), registry.to_json_value());

        self.store_records(kind, records).await?;
        tracing::debug!(
            owner_kind = %kind,
            owner_id = id,
            documents = registry.len(),
            "json owner store: saved document map"
        );
        Ok(())
    }
}

fn record_id(record: &Value) -> Option<OwnerId> {
    match record.get("id")? {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
