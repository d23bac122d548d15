use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::owner::{OwnerId, OwnerKind};

/// Configuration-time validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// An owner kind has no document types registered.
    #[error("document type catalog for `{kind}` is empty")]
    EmptyCatalog {
        /// Owner kind with an empty catalog.
        kind: OwnerKind,
    },
    /// A catalog type code cannot be embedded in a stored filename.
    #[error("document type code `{code}` for `{kind}` must be non-empty lowercase ASCII, digits or `_`")]
    InvalidTypeCode {
        /// Owner kind declaring the code.
        kind: OwnerKind,
        /// The rejected type code.
        code: String,
    },
    /// A configured numeric limit must be strictly greater than zero.
    #[error("limit `{limit}` must be greater than 0")]
    InvalidLimitValue {
        /// Name of the limit.
        limit: &'static str,
    },
    /// The extension allow-list is empty.
    #[error("allowed extension list cannot be empty")]
    EmptyExtensionList,
    /// The MIME allow-list is empty.
    #[error("allowed MIME type list cannot be empty")]
    EmptyMimeList,
    /// An allowed MIME pattern is malformed.
    #[error("invalid MIME pattern `{pattern}`")]
    InvalidMimePattern {
        /// The invalid pattern value.
        pattern: String,
    },
    /// The storage root path is empty.
    #[error("storage root path cannot be empty")]
    EmptyRootPath,
    /// A configuration file could not be read or decoded.
    #[error("failed to load configuration: {message}")]
    Load {
        /// Loader failure message.
        message: String,
    },
}

/// Input field a [`ValidationError`] is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationField {
    /// The uploaded file itself.
    File,
    /// The owner kind (`eleve` / `enseignant`).
    EntityType,
    /// The document type code.
    DocumentType,
}

impl ValidationField {
    /// Returns the wire name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::EntityType => "entity_type",
            Self::DocumentType => "document_type",
        }
    }
}

impl fmt::Display for ValidationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upload policy violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ValidationError {
    /// The uploaded file is empty, truncated or otherwise unusable.
    #[error("file `{file_name}` is invalid or corrupted: {reason}")]
    CorruptedFile {
        /// Client-supplied filename.
        file_name: String,
        /// What made the upload unusable.
        reason: String,
    },
    /// The file exceeds the configured size limit.
    #[error("file `{file_name}` is {size} bytes, exceeding the maximum of {max_file_size} bytes")]
    FileTooLarge {
        /// Client-supplied filename.
        file_name: String,
        /// Observed size in bytes.
        size: u64,
        /// Maximum allowed size in bytes.
        max_file_size: u64,
    },
    /// The file extension is not in the allow-list.
    #[error("file `{file_name}` has disallowed extension `{extension}`")]
    ExtensionNotAllowed {
        /// Client-supplied filename.
        file_name: String,
        /// Normalized (lowercase) extension, empty when the name has none.
        extension: String,
    },
    /// The declared MIME type is not in the allow-list.
    #[error("file `{file_name}` has disallowed MIME type `{mime}`")]
    MimeTypeNotAllowed {
        /// Client-supplied filename.
        file_name: String,
        /// Declared MIME type.
        mime: String,
    },
    /// The owner kind is not one of the known kinds.
    #[error("unknown entity type `{value}`")]
    UnknownOwnerKind {
        /// Rejected input.
        value: String,
    },
    /// The document type is not in the owner kind's catalog.
    #[error("document type `{type_code}` is not allowed for `{kind}`")]
    UnknownDocumentType {
        /// Owner kind being uploaded for.
        kind: OwnerKind,
        /// Rejected type code.
        type_code: String,
    },
}

impl ValidationError {
    /// Returns the input field this failure is attributed to.
    pub fn field(&self) -> ValidationField {
        match self {
            Self::CorruptedFile { .. }
            | Self::FileTooLarge { .. }
            | Self::ExtensionNotAllowed { .. }
            | Self::MimeTypeNotAllowed { .. } => ValidationField::File,
            Self::UnknownOwnerKind { .. } => ValidationField::EntityType,
            Self::UnknownDocumentType { .. } => ValidationField::DocumentType,
        }
    }
}

/// A referenced owner or document entry does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotFoundError {
    /// No owner record with this id.
    #[error("{kind} `{id}` not found")]
    Owner {
        /// Owner kind searched.
        kind: OwnerKind,
        /// Missing owner id.
        id: OwnerId,
    },
    /// The owner has no document of this type.
    #[error("{kind} `{id}` has no document of type `{type_code}`")]
    Document {
        /// Owner kind searched.
        kind: OwnerKind,
        /// Owner id searched.
        id: OwnerId,
        /// Missing document type.
        type_code: String,
    },
}

/// Storage backend failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Generic storage failure with message context.
    #[error("{message}")]
    Message {
        /// Storage failure message.
        message: String,
    },
}

impl StorageError {
    /// Creates a storage error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}

/// Runtime error type used by `doclife`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DocumentError {
    /// Configuration error surfaced at runtime.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Upload policy violation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Missing owner or document entry.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
    /// Storage backend failure.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Per-file failure reported by bulk operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDetail {
    /// Attributed input field (`file`, `entity_type`, `document_type`).
    pub field: ValidationField,
    /// Human-readable cause.
    pub message: String,
}

impl From<&DocumentError> for ErrorDetail {
    fn from(err: &DocumentError) -> Self {
        let field = match err {
            DocumentError::Validation(validation) => validation.field(),
            DocumentError::NotFound(NotFoundError::Owner { .. }) => ValidationField::EntityType,
            DocumentError::NotFound(NotFoundError::Document { .. }) => ValidationField::DocumentType,
            _ => ValidationField::File,
        };
        Self {
            field,
            message: err.to_string(),
        }
    }
}
