//! Per-owner `type_code → Document` map and its persisted JSON codec.
//!
//! The map is stored inside the owner record, not in a table of its own.
//! Decoding accepts the shapes legacy records hold for that field: `null`,
//! an empty array, an object, or a string containing an encoded object.

use std::collections::{btree_map, BTreeMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    catalog::DocumentTypeCatalog,
    document::Document,
    error::StorageError,
    owner::{OwnerId, OwnerKind},
};

/// One document per type for a single owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentRegistry {
    entries: BTreeMap<String, Document>,
}

/// A registry entry breaking the registry invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryViolation {
    /// The key is not a catalog type for the owner kind.
    UnknownType {
        /// Offending key.
        type_code: String,
    },
    /// The key and the document's own type code disagree.
    TypeMismatch {
        /// Map key.
        key: String,
        /// `type_document` recorded in the entry.
        recorded: String,
    },
    /// The document path is not under the owner directory.
    ForeignPath {
        /// Map key.
        type_code: String,
        /// Recorded path.
        path: String,
    },
}

impl DocumentRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes the persisted document-map field.
    pub fn from_json_value(value: Value) -> Result<Self, StorageError> {
        match value {
            Value::Null => Ok(Self::new()),
            Value::Array(items) if items.is_empty() => Ok(Self::new()),
            Value::String(encoded) if encoded.trim().is_empty() => Ok(Self::new()),
            Value::String(encoded) => {
                let inner: Value = serde_json::from_str(&encoded)
                    .map_err(|err| StorageError::new(format!("invalid encoded document map: {err}")))?;
                Self::from_json_value(inner)
            }
            Value::Object(_) => serde_json::from_value(value)
                .map_err(|err| StorageError::new(format!("invalid document map: {err}"))),
            other => Err(StorageError::new(format!(
                "document map must be an object, found `{other}`"
            ))),
        }
    }

    /// Decodes a persisted document map from its JSON text.
    pub fn from_json_str(input: &str) -> Result<Self, StorageError> {
        let value: Value = serde_json::from_str(input)
            .map_err(|err| StorageError::new(format!("invalid document map: {err}")))?;
        Self::from_json_value(value)
    }

    /// Encodes the registry in the persisted object shape.
    pub fn to_json_value(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .filter_map(|(code, document)| {
                    serde_json::to_value(document)
                        .ok()
                        .map(|value| (code.clone(), value))
                })
                .collect(),
        )
    }

    /// Encodes the registry as JSON text.
    pub fn to_json_string(&self) -> String {
        self.to_json_value().to_string()
    }

    /// Returns the number of documents.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the owner has no documents.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the document recorded for `type_code`.
    pub fn get(&self, type_code: &str) -> Option<&Document> {
        self.entries.get(type_code)
    }

    /// Returns `true` when a document is recorded for `type_code`.
    pub fn contains(&self, type_code: &str) -> bool {
        self.entries.contains_key(type_code)
    }

    /// Records `document` under its type code, returning the entry it replaced.
    ///
    /// The replaced document's file is left on disk.
    pub fn insert(&mut self, document: Document) -> Option<Document> {
        self.entries.insert(document.type_code.clone(), document)
    }

    /// Records every document, returning the replaced entries.
    pub fn merge(&mut self, documents: impl IntoIterator<Item = Document>) -> Vec<Document> {
        documents
            .into_iter()
            .filter_map(|document| self.insert(document))
            .collect()
    }

    /// Removes and returns the entry for `type_code`.
    pub fn remove(&mut self, type_code: &str) -> Option<Document> {
        self.entries.remove(type_code)
    }

    /// Iterates entries in type-code order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Document> {
        self.entries.iter()
    }

    /// Returns every entry violating the catalog or path invariants.
    pub fn check_invariants(
        &self,
        catalog: &DocumentTypeCatalog,
        kind: OwnerKind,
        id: OwnerId,
    ) -> Vec<RegistryViolation> {
        let mut violations = Vec::new();
        for (key, document) in &self.entries {
            if !catalog.is_valid(kind, key) {
                violations.push(RegistryViolation::UnknownType {
                    type_code: key.clone(),
                });
            }
            if &document.type_code != key {
                violations.push(RegistryViolation::TypeMismatch {
                    key: key.clone(),
                    recorded: document.type_code.clone(),
                });
            }
            if !document.belongs_to(kind, id) {
                violations.push(RegistryViolation::ForeignPath {
                    type_code: key.clone(),
                    path: document.path.clone(),
                });
            }
        }
        violations
    }
}

impl<'a> IntoIterator for &'a DocumentRegistry {
    type Item = (&'a String, &'a Document);
    type IntoIter = btree_map::Iter<'a, String, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<Document> for DocumentRegistry {
    fn from_iter<T: IntoIterator<Item = Document>>(iter: T) -> Self {
        let mut registry = Self::new();
        registry.merge(iter);
        registry
    }
}
