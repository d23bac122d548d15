use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    checksum::ChecksumVerifier,
    document::Document,
    error::{DocumentError, ErrorDetail},
    file::UploadedFile,
    owner::{OwnerId, OwnerKind},
    DocumentManager,
};

/// Outcome of a bulk upload: each type code either stored or failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadBatch {
    /// Stored documents, by type code.
    pub documents: BTreeMap<String, Document>,
    /// Failures, by type code.
    pub errors: BTreeMap<String, ErrorDetail>,
}

impl UploadBatch {
    /// Returns `true` when every file was stored.
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

impl DocumentManager {
    /// Validates, stores and fingerprints one file for an owner.
    pub async fn upload(
        &self,
        file: UploadedFile,
        kind: OwnerKind,
        id: OwnerId,
        type_code: &str,
    ) -> Result<Document, DocumentError> {
        tracing::debug!(
            owner_kind = %kind,
            owner_id = id,
            type_code,
            file_name = file.file_name.as_str(),
            size = file.size(),
            "upload: begin"
        );

        self.validator.validate(&file)?;
        self.config.catalog.ensure_valid(kind, type_code)?;

        let extension = file.extension();
        // Persisted dates carry whole seconds.
        let now = Utc::now().timestamp();
        let uploaded_at = DateTime::from_timestamp(now, 0).unwrap_or_else(Utc::now);
        let resolved = self
            .resolver
            .resolve_at(kind, id, type_code, &extension, now);
        let relative_path = resolved.relative_path();
        self.storage.write(&relative_path, &file.body).await?;

        let document = Document {
            type_code: type_code.to_owned(),
            original_name: file.file_name,
            stored_name: resolved.file_name,
            path: relative_path,
            size_bytes: file.body.len() as u64,
            mime_type: file.content_type,
            extension,
            uploaded_at,
            checksum: ChecksumVerifier::hash(&file.body),
        };

        tracing::info!(
            owner_kind = %kind,
            owner_id = id,
            type_code,
            path = document.path.as_str(),
            "upload: stored document"
        );
        Ok(document)
    }

    /// Uploads each `{type_code → file}` independently, collecting successes and failures.
    pub async fn upload_multiple(
        &self,
        files: BTreeMap<String, UploadedFile>,
        kind: OwnerKind,
        id: OwnerId,
    ) -> UploadBatch {
        let mut batch = UploadBatch::default();
        for (type_code, file) in files {
            match self.upload(file, kind, id, &type_code).await {
                Ok(document) => {
                    batch.documents.insert(type_code, document);
                }
                Err(err) => {
                    tracing::warn!(
                        owner_kind = %kind,
                        owner_id = id,
                        type_code = type_code.as_str(),
                        error = %err,
                        "upload: file rejected"
                    );
                    batch.errors.insert(type_code, ErrorDetail::from(&err));
                }
            }
        }
        batch
    }
}
