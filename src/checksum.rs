use sha2::{Digest, Sha256};

use crate::document::Document;

/// SHA-256 content hashing and re-verification.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChecksumVerifier;

impl ChecksumVerifier {
    /// Returns the lowercase hexadecimal SHA-256 digest of `bytes`.
    pub fn hash(bytes: &[u8]) -> String {
        hex::encode(Sha256::digest(bytes))
    }

    /// Returns `true` only when the file is present and hashes to the recorded checksum.
    pub fn verify(document: &Document, current: Option<&[u8]>) -> bool {
        let Some(bytes) = current else {
            return false;
        };
        if document.checksum.is_empty() {
            return false;
        }

        Self::hash(bytes).eq_ignore_ascii_case(&document.checksum)
    }
}
