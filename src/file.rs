use std::path::Path;

use bytes::Bytes;

/// Incoming file as handed over by the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Client-supplied filename.
    pub file_name: String,
    /// Client-declared content type.
    pub content_type: String,
    /// Size announced by the transport, when known.
    pub declared_size: Option<u64>,
    /// Received body bytes.
    pub body: Bytes,
}

impl UploadedFile {
    /// Creates an uploaded file without an announced size.
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        body: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            declared_size: None,
            body: body.into(),
        }
    }

    /// Sets the size announced by the transport.
    pub fn with_declared_size(mut self, declared_size: u64) -> Self {
        self.declared_size = Some(declared_size);
        self
    }

    /// Returns the received size in bytes.
    pub fn size(&self) -> u64 {
        self.body.len() as u64
    }

    /// Returns the lowercase extension of the client filename, empty when absent.
    pub fn extension(&self) -> String {
        Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default()
    }
}
