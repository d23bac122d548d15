use crate::{error::ValidationError, file::UploadedFile, limits::Limits};

/// Pure upload policy check, run before any storage access.
#[derive(Debug, Clone, Default)]
pub struct DocumentValidator {
    limits: Limits,
}

impl DocumentValidator {
    /// Creates a validator enforcing `limits`.
    pub fn new(limits: Limits) -> Self {
        Self { limits }
    }

    /// Returns the enforced limits.
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Checks integrity, size, extension and MIME type, stopping at the first failure.
    pub fn validate(&self, file: &UploadedFile) -> Result<(), ValidationError> {
        check_integrity(file)?;

        let size = file.size();
        if size > self.limits.max_file_size {
            return Err(ValidationError::FileTooLarge {
                file_name: file.file_name.clone(),
                size,
                max_file_size: self.limits.max_file_size,
            });
        }

        let extension = file.extension();
        if !self.limits.is_extension_allowed(&extension) {
            return Err(ValidationError::ExtensionNotAllowed {
                file_name: file.file_name.clone(),
                extension,
            });
        }

        let mime_allowed = file
            .content_type
            .parse::<mime::Mime>()
            .map(|mime| self.limits.is_mime_allowed(&mime))
            .unwrap_or(false);
        if !mime_allowed {
            return Err(ValidationError::MimeTypeNotAllowed {
                file_name: file.file_name.clone(),
                mime: file.content_type.clone(),
            });
        }

        Ok(())
    }
}

fn check_integrity(file: &UploadedFile) -> Result<(), ValidationError> {
    let corrupted = |reason: String| ValidationError::CorruptedFile {
        file_name: file.file_name.clone(),
        reason,
    };

    if file.file_name.trim().is_empty() {
        return Err(corrupted("missing filename".to_owned()));
    }
    if file.body.is_empty() {
        return Err(corrupted("file is empty".to_owned()));
    }
    if let Some(declared) = file.declared_size {
        if declared != file.size() {
            return Err(corrupted(format!(
                "received {} of {declared} announced bytes",
                file.size()
            )));
        }
    }
    Ok(())
}
