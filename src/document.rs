use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    owner::{OwnerId, OwnerKind},
    path::owner_directory,
};

/// A stored document, as recorded in its owner's document map.
///
/// Field names on the wire follow the persisted owner-record layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Catalog type code.
    #[serde(rename = "type_document")]
    pub type_code: String,
    /// Client-supplied filename.
    #[serde(rename = "nom_original")]
    pub original_name: String,
    /// Generated filename, unique within the owner directory.
    #[serde(rename = "nom_fichier")]
    pub stored_name: String,
    /// Path relative to the storage root: `documents/{kind}/{id}/{stored_name}`.
    #[serde(rename = "chemin")]
    pub path: String,
    /// Size in bytes at upload time.
    #[serde(rename = "taille")]
    pub size_bytes: u64,
    /// Declared MIME type at upload time.
    #[serde(rename = "type_mime")]
    pub mime_type: String,
    /// Lowercase extension of the client filename.
    pub extension: String,
    /// Upload time.
    #[serde(rename = "date_upload", with = "legacy_timestamp")]
    pub uploaded_at: DateTime<Utc>,
    /// Hex SHA-256 of the content at upload time; empty for records predating checksums.
    #[serde(default)]
    pub checksum: String,
}

impl Document {
    /// Returns `true` when the document path lies directly under the owner's directory.
    pub fn belongs_to(&self, kind: OwnerKind, id: OwnerId) -> bool {
        let path = Path::new(&self.path);
        let parent_matches = path
            .parent()
            .map_or(false, |parent| parent == Path::new(&owner_directory(kind, id)));
        let name_is_plain = path
            .file_name()
            .and_then(|name| name.to_str())
            .map_or(false, |name| name != "." && name != "..");

        parent_matches && name_is_plain
    }
}

mod legacy_timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    const LEGACY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub(super) fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(parsed.with_timezone(&Utc));
        }

        NaiveDateTime::parse_from_str(&raw, LEGACY_FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(|_| de::Error::custom(format!("invalid upload timestamp `{raw}`")))
    }
}
