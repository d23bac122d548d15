//! Per-owner-kind registry of allowed document types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    error::{ConfigError, ValidationError},
    owner::OwnerKind,
};

const ELEVE_TYPES: &[(&str, &str)] = &[
    ("acte_naissance", "Acte de naissance"),
    ("certificat_medical", "Certificat médical"),
    ("certificat_scolarite", "Certificat de scolarité"),
    ("bulletin_precedent", "Bulletin de l'année précédente"),
    ("photo_identite", "Photo d'identité"),
    ("justificatif_domicile", "Justificatif de domicile"),
    ("autorisation_parentale", "Autorisation parentale"),
];

const ENSEIGNANT_TYPES: &[(&str, &str)] = &[
    ("cv", "Curriculum vitae"),
    ("diplomes", "Diplômes"),
    ("piece_identite", "Pièce d'identité"),
    ("contrat_travail", "Contrat de travail"),
    ("attestation_travail", "Attestation de travail"),
    ("casier_judiciaire", "Extrait de casier judiciaire"),
    ("rib", "Relevé d'identité bancaire"),
];

/// Allowed document type codes and their labels, per owner kind.
///
/// Loaded once and injected; the default value holds the built-in school catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentTypeCatalog {
    eleve: BTreeMap<String, String>,
    enseignant: BTreeMap<String, String>,
}

impl Default for DocumentTypeCatalog {
    fn default() -> Self {
        Self {
            eleve: to_map(ELEVE_TYPES),
            enseignant: to_map(ENSEIGNANT_TYPES),
        }
    }
}

impl DocumentTypeCatalog {
    /// Creates a catalog with no types for any kind.
    pub fn empty() -> Self {
        Self {
            eleve: BTreeMap::new(),
            enseignant: BTreeMap::new(),
        }
    }

    /// Replaces the types of one owner kind.
    pub fn with_types<I, C, L>(mut self, kind: OwnerKind, types: I) -> Self
    where
        I: IntoIterator<Item = (C, L)>,
        C: Into<String>,
        L: Into<String>,
    {
        *self.types_mut(kind) = types
            .into_iter()
            .map(|(code, label)| (code.into(), label.into()))
            .collect();
        self
    }

    /// Returns `{code → label}` for an owner kind.
    pub fn types_for(&self, kind: OwnerKind) -> &BTreeMap<String, String> {
        match kind {
            OwnerKind::Eleve => &self.eleve,
            OwnerKind::Enseignant => &self.enseignant,
        }
    }

    /// Returns the label of a type code, when registered.
    pub fn label(&self, kind: OwnerKind, type_code: &str) -> Option<&str> {
        self.types_for(kind).get(type_code).map(String::as_str)
    }

    /// Returns `true` when `type_code` is registered for `kind`.
    pub fn is_valid(&self, kind: OwnerKind, type_code: &str) -> bool {
        self.types_for(kind).contains_key(type_code)
    }

    /// Fails with a `document_type` error when `type_code` is not registered for `kind`.
    pub fn ensure_valid(&self, kind: OwnerKind, type_code: &str) -> Result<(), ValidationError> {
        if self.is_valid(kind, type_code) {
            return Ok(());
        }

        Err(ValidationError::UnknownDocumentType {
            kind,
            type_code: type_code.to_owned(),
        })
    }

    /// Validates that every kind has types and every code is filename-safe.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for kind in OwnerKind::ALL {
            let types = self.types_for(kind);
            if types.is_empty() {
                return Err(ConfigError::EmptyCatalog { kind });
            }
            if let Some(code) = types.keys().find(|code| !is_filename_safe(code)) {
                return Err(ConfigError::InvalidTypeCode {
                    kind,
                    code: code.clone(),
                });
            }
        }
        Ok(())
    }

    fn types_mut(&mut self, kind: OwnerKind) -> &mut BTreeMap<String, String> {
        match kind {
            OwnerKind::Eleve => &mut self.eleve,
            OwnerKind::Enseignant => &mut self.enseignant,
        }
    }
}

fn to_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(code, label)| ((*code).to_owned(), (*label).to_owned()))
        .collect()
}

fn is_filename_safe(code: &str) -> bool {
    !code.is_empty()
        && code
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_')
}
