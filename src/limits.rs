use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default maximum upload size: 5 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

const DEFAULT_EXTENSIONS: &[&str] = &["pdf", "jpg", "jpeg", "png", "doc", "docx"];

const DEFAULT_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "image/jpeg",
    "image/png",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Upload policy enforced before anything is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum accepted file size in bytes.
    pub max_file_size: u64,
    /// Allowed file extensions, compared case-insensitively.
    pub allowed_extensions: Vec<String>,
    /// Allowed MIME patterns (for example: `application/pdf`, `image/*`).
    pub allowed_mime_types: Vec<String>,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_extensions: DEFAULT_EXTENSIONS.iter().map(|ext| (*ext).to_owned()).collect(),
            allowed_mime_types: DEFAULT_MIME_TYPES.iter().map(|mime| (*mime).to_owned()).collect(),
        }
    }
}

impl Limits {
    /// Creates the default document upload policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when `extension` is in the allow-list.
    pub fn is_extension_allowed(&self, extension: &str) -> bool {
        !extension.is_empty()
            && self
                .allowed_extensions
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(extension))
    }

    /// Returns `true` when `mime` is allowed by the configured allow-list.
    pub fn is_mime_allowed(&self, mime: &mime::Mime) -> bool {
        let allowed = self
            .allowed_mime_types
            .iter()
            .any(|pattern| mime_matches_pattern(mime, pattern));

        if !allowed {
            tracing::debug!(
                mime = mime.essence_str(),
                allowed_patterns = ?self.allowed_mime_types,
                "limits: MIME rejected by allow-list"
            );
        }

        allowed
    }

    /// Validates the policy values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_file_size == 0 {
            return Err(ConfigError::InvalidLimitValue {
                limit: "max_file_size",
            });
        }
        if self.allowed_extensions.is_empty() {
            return Err(ConfigError::EmptyExtensionList);
        }
        if self.allowed_mime_types.is_empty() {
            return Err(ConfigError::EmptyMimeList);
        }
        for pattern in &self.allowed_mime_types {
            if !is_valid_mime_pattern(pattern) {
                return Err(ConfigError::InvalidMimePattern {
                    pattern: pattern.clone(),
                });
            }
        }
        Ok(())
    }
}

fn mime_matches_pattern(mime: &mime::Mime, pattern: &str) -> bool {
    if let Some((kind, subtype)) = pattern.split_once('/') {
        if subtype == "*" {
            return mime.type_().as_str().eq_ignore_ascii_case(kind);
        }
    }

    mime.essence_str().eq_ignore_ascii_case(pattern)
}

fn is_valid_mime_pattern(pattern: &str) -> bool {
    match pattern.split_once('/') {
        Some((kind, "*")) => !kind.is_empty() && kind != "*",
        Some(_) => pattern.parse::<mime::Mime>().is_ok(),
        None => false,
    }
}
