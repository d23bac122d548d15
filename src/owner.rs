use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Numeric identifier of an owner record.
pub type OwnerId = u64;

/// Category of entity a document belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerKind {
    /// Student.
    Eleve,
    /// Teacher.
    Enseignant,
}

impl OwnerKind {
    /// Every known owner kind, in storage order.
    pub const ALL: [OwnerKind; 2] = [OwnerKind::Eleve, OwnerKind::Enseignant];

    /// Returns the storage/wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eleve => "eleve",
            Self::Enseignant => "enseignant",
        }
    }

    /// Returns the owner record field holding this kind's document map.
    pub fn documents_field(&self) -> &'static str {
        match self {
            Self::Eleve => "documents_justificatifs",
            Self::Enseignant => "documents_administratifs",
        }
    }

    /// Returns `true` when `name` is the storage name of a known kind.
    pub fn is_known_dir(name: &str) -> bool {
        Self::ALL.iter().any(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OwnerKind {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "eleve" => Ok(Self::Eleve),
            "enseignant" => Ok(Self::Enseignant),
            _ => Err(ValidationError::UnknownOwnerKind {
                value: value.to_owned(),
            }),
        }
    }
}

/// Owner kinds selected for a reclamation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OwnerScope {
    /// A single owner kind.
    Kind(OwnerKind),
    /// Every owner kind.
    #[default]
    All,
}

impl OwnerScope {
    /// Returns the owner kinds covered by this scope.
    pub fn kinds(&self) -> Vec<OwnerKind> {
        match self {
            Self::Kind(kind) => vec![*kind],
            Self::All => OwnerKind::ALL.to_vec(),
        }
    }
}

impl fmt::Display for OwnerScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kind(kind) => kind.fmt(f),
            Self::All => f.write_str("all"),
        }
    }
}

impl FromStr for OwnerScope {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        value.parse().map(Self::Kind)
    }
}

impl From<OwnerKind> for OwnerScope {
    fn from(kind: OwnerKind) -> Self {
        Self::Kind(kind)
    }
}
