use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::aggregate::BatchOptions;
use crate::csv::CsvReadOptions;
use crate::derive::DeriveOptions;
use crate::mapping::{DocumentKind, MappingChoices, TargetField};
use crate::preview::{BANK_STATEMENT_PREVIEW, MAPPED_PREVIEW};

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Unknown field '{label}' for {kind} profile")]
    UnknownField { label: String, kind: DocumentKind },
}

/// Reader, mapping and derivation settings for one document layout.
///
/// Every key is optional in TOML; `[columns]` maps a target label (or one of
/// its aliases) to a source header and only needs the entries header
/// inference gets wrong.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportProfile {
    pub name: String,
    pub kind: DocumentKind,
    pub delimiter: String,
    /// Zero-based header line; `None` uses the kind's default.
    pub header_row: Option<usize>,
    pub simplify_narration: bool,
    pub skip_empty_movements: bool,
    pub retain_taxable_only: bool,
    pub preview_rows: Option<usize>,
    pub columns: BTreeMap<String, String>,
}

impl Default for ImportProfile {
    fn default() -> Self {
        Self {
            name: "Unnamed Profile".to_string(),
            kind: DocumentKind::BankStatement,
            delimiter: ",".to_string(),
            header_row: None,
            simplify_narration: false,
            skip_empty_movements: false,
            retain_taxable_only: true,
            preview_rows: None,
            columns: BTreeMap::new(),
        }
    }
}

impl ImportProfile {
    pub fn for_kind(kind: DocumentKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Parses and checks every `[columns]` key against the profile's kind.
    pub fn from_toml(toml_content: &str) -> Result<Self, ProfileError> {
        let profile: ImportProfile = toml::from_str(toml_content)?;
        profile.choices()?;
        Ok(profile)
    }

    pub fn load(path: &Path) -> Result<Self, ProfileError> {
        let content = std::fs::read_to_string(path)?;
        let profile = Self::from_toml(&content)?;
        tracing::debug!(name = %profile.name, kind = %profile.kind, path = %path.display(), "loaded import profile");
        Ok(profile)
    }

    /// The `[columns]` table keyed by target field.
    pub fn choices(&self) -> Result<MappingChoices, ProfileError> {
        let mut choices = MappingChoices::new();
        for (label, column) in &self.columns {
            let field = TargetField::from_label(label)
                .filter(|f| self.kind.fields().contains(f))
                .ok_or_else(|| ProfileError::UnknownField {
                    label: label.clone(),
                    kind: self.kind,
                })?;
            choices.insert(field, column.clone());
        }
        Ok(choices)
    }

    pub fn read_options(&self) -> CsvReadOptions {
        let base = match self.kind {
            DocumentKind::BankStatement => CsvReadOptions::default(),
            DocumentKind::Gstr2a => CsvReadOptions::gstr2a(),
        };
        CsvReadOptions {
            delimiter: self.delimiter.as_bytes().first().copied().unwrap_or(b','),
            header_row: self.header_row.unwrap_or(base.header_row),
        }
    }

    pub fn derive_options(&self) -> DeriveOptions {
        DeriveOptions {
            simplify_narration: self.simplify_narration,
            skip_empty_movements: self.skip_empty_movements,
        }
    }

    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            retain_taxable_only: self.retain_taxable_only,
        }
    }

    pub fn preview_limit(&self) -> usize {
        self.preview_rows.unwrap_or(match self.kind {
            DocumentKind::BankStatement => BANK_STATEMENT_PREVIEW,
            DocumentKind::Gstr2a => MAPPED_PREVIEW,
        })
    }
}
