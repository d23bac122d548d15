use std::collections::BTreeMap;

use crate::{
    document::Document,
    error::{DocumentError, NotFoundError},
    file::UploadedFile,
    owner::{OwnerId, OwnerKind},
    storage::OwnerStore,
    upload::UploadBatch,
    DocumentManager,
};

impl DocumentManager {
    /// Uploads files for an existing owner and records the stored ones in its document map.
    ///
    /// Replaced entries keep their files on disk.
    pub async fn attach(
        &self,
        owners: &dyn OwnerStore,
        files: BTreeMap<String, UploadedFile>,
        kind: OwnerKind,
        id: OwnerId,
    ) -> Result<UploadBatch, DocumentError> {
        let mut registry = owners.documents(kind, id).await?;

        let batch = self.upload_multiple(files, kind, id).await;
        if batch.documents.is_empty() {
            return Ok(batch);
        }

        let replaced = registry.merge(batch.documents.values().cloned());
        for document in &replaced {
            tracing::debug!(
                owner_kind = %kind,
                owner_id = id,
                path = document.path.as_str(),
                "attach: replaced entry left on disk"
            );
        }
        owners.save_documents(kind, id, &registry).await?;
        Ok(batch)
    }

    /// Deletes an owner's document of `type_code` and drops it from the document map.
    pub async fn detach(
        &self,
        owners: &dyn OwnerStore,
        kind: OwnerKind,
        id: OwnerId,
        type_code: &str,
    ) -> Result<Document, DocumentError> {
        let mut registry = owners.documents(kind, id).await?;
        let document = registry.remove(type_code).ok_or_else(|| NotFoundError::Document {
            kind,
            id,
            type_code: type_code.to_owned(),
        })?;

        self.delete(&document.path).await?;
        owners.save_documents(kind, id, &registry).await?;
        Ok(document)
    }
}
