use std::collections::HashMap;
use std::fmt;

use ledgerbridge_core::{RawCell, RawRow};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every column name the engine knows how to fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TargetField {
    // Bank statement
    Date,
    Narration,
    Withdrawal,
    Deposit,
    Closing,
    // GSTR-2A
    SupplierGstin,
    InvoiceNumber,
    InvoiceDate,
    TaxableValue,
    Rate,
    IntegratedTax,
    CentralTax,
    StateTax,
    Cess,
}

impl TargetField {
    /// The canonical column label, as shown to users and written to exports.
    pub fn label(self) -> &'static str {
        match self {
            TargetField::Date => "DATE",
            TargetField::Narration => "NARRATION",
            TargetField::Withdrawal => "WITHDRAWAL",
            TargetField::Deposit => "DEPOSIT",
            TargetField::Closing => "CLOSING",
            TargetField::SupplierGstin => "GSTIN of supplier",
            TargetField::InvoiceNumber => "Invoice Number",
            TargetField::InvoiceDate => "Invoice date",
            TargetField::TaxableValue => "Taxable Value",
            TargetField::Rate => "Rate (%)",
            TargetField::IntegratedTax => "Integrated Tax Amount",
            TargetField::CentralTax => "Central Tax Amount",
            TargetField::StateTax => "State/UT Tax Amount",
            TargetField::Cess => "Cess Amount",
        }
    }

    /// Other header spellings seen in the wild for this field.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            TargetField::Date => &["Date", "Txn Date", "Transaction Date", "Value Date"],
            TargetField::Narration => &["Narration", "Description", "Remarks", "Transaction Remarks", "Particulars"],
            TargetField::Withdrawal => &["Withdrawal", "Withdrawal Amount", "Withdrawal Amt.", "Debit", "Dr"],
            TargetField::Deposit => &["Deposit", "Deposit Amount", "Deposit Amt.", "Credit", "Cr"],
            TargetField::Closing => &["CLOSING BALANCE", "Closing Balance", "Balance"],
            TargetField::SupplierGstin => &[],
            TargetField::InvoiceNumber => &["Invoice No.", "Inv No"],
            TargetField::InvoiceDate => &["Inv Date", "Invoice Dt."],
            TargetField::TaxableValue => &[],
            TargetField::Rate => &["Rate"],
            TargetField::IntegratedTax => &["Integrated Tax", "IGST Amount"],
            TargetField::CentralTax => &["Central Tax", "CGST Amount"],
            TargetField::StateTax => &["State/UT Tax", "SGST Amount"],
            TargetField::Cess => &["Cess"],
        }
    }

    /// Resolves a label or alias, ignoring case and surrounding whitespace.
    pub fn from_label(label: &str) -> Option<TargetField> {
        let wanted = label.trim().to_lowercase();
        ALL_FIELDS.iter().copied().find(|f| {
            f.label().to_lowercase() == wanted
                || f.aliases().iter().any(|a| a.to_lowercase() == wanted)
        })
    }

    fn matches_header(self, header: &str) -> bool {
        let header = header.trim().to_lowercase();
        self.label().to_lowercase() == header
            || self.aliases().iter().any(|a| a.to_lowercase() == header)
    }
}

impl fmt::Display for TargetField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

const ALL_FIELDS: &[TargetField] = &[
    TargetField::Date,
    TargetField::Narration,
    TargetField::Withdrawal,
    TargetField::Deposit,
    TargetField::Closing,
    TargetField::SupplierGstin,
    TargetField::InvoiceNumber,
    TargetField::InvoiceDate,
    TargetField::TaxableValue,
    TargetField::Rate,
    TargetField::IntegratedTax,
    TargetField::CentralTax,
    TargetField::StateTax,
    TargetField::Cess,
];

const BANK_STATEMENT_FIELDS: &[TargetField] = &[
    TargetField::Date,
    TargetField::Narration,
    TargetField::Withdrawal,
    TargetField::Deposit,
    TargetField::Closing,
];

const GSTR2A_FIELDS: &[TargetField] = &[
    TargetField::SupplierGstin,
    TargetField::InvoiceNumber,
    TargetField::InvoiceDate,
    TargetField::TaxableValue,
    TargetField::Rate,
    TargetField::IntegratedTax,
    TargetField::CentralTax,
    TargetField::StateTax,
    TargetField::Cess,
];

const GSTR2A_MONEY_FIELDS: &[TargetField] = &[
    TargetField::TaxableValue,
    TargetField::IntegratedTax,
    TargetField::CentralTax,
    TargetField::StateTax,
    TargetField::Cess,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    BankStatement,
    Gstr2a,
}

impl DocumentKind {
    /// Required target fields, in output column order.
    pub fn fields(self) -> &'static [TargetField] {
        match self {
            DocumentKind::BankStatement => BANK_STATEMENT_FIELDS,
            DocumentKind::Gstr2a => GSTR2A_FIELDS,
        }
    }

    /// Fields whose cells are amounts, for spreadsheet number formatting.
    pub fn numeric_fields(self) -> &'static [TargetField] {
        match self {
            DocumentKind::BankStatement => &BANK_STATEMENT_FIELDS[2..],
            DocumentKind::Gstr2a => GSTR2A_MONEY_FIELDS,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::BankStatement => write!(f, "bank_statement"),
            DocumentKind::Gstr2a => write!(f, "gstr2a"),
        }
    }
}

impl std::str::FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bank_statement" | "bank" | "statement" => Ok(DocumentKind::BankStatement),
            "gstr2a" | "gstr-2a" => Ok(DocumentKind::Gstr2a),
            other => Err(format!("Unknown document kind: '{other}'")),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("Incomplete mapping: no column selected for {}", join_labels(.missing))]
    IncompleteMapping { missing: Vec<TargetField> },
    #[error("Duplicate mapping: column '{column}' selected for both {first} and {second}")]
    DuplicateMapping {
        column: String,
        first: TargetField,
        second: TargetField,
    },
    #[error("Mapping was built for {found}, expected {expected}")]
    DocumentKindMismatch {
        expected: DocumentKind,
        found: DocumentKind,
    },
}

fn join_labels(fields: &[TargetField]) -> String {
    fields
        .iter()
        .map(|f| f.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// User selections: target field to source column. Partial by nature.
pub type MappingChoices = HashMap<TargetField, String>;

/// A validated, complete and injective target-to-source mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldMapping {
    kind: DocumentKind,
    columns: Vec<(TargetField, String)>,
}

impl FieldMapping {
    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn source_column(&self, field: TargetField) -> Option<&str> {
        self.columns
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, c)| c.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (TargetField, &str)> {
        self.columns.iter().map(|(f, c)| (*f, c.as_str()))
    }

    /// Pure lookup of each target field's cell. A column the row lacks reads
    /// as `Empty`. No coercion happens here.
    pub fn project(&self, row: &RawRow) -> MappedRow {
        let cells = self
            .columns
            .iter()
            .map(|(field, column)| (*field, row.get(column).cloned().unwrap_or_default()))
            .collect();
        MappedRow { cells }
    }

    pub fn project_all(&self, rows: &[RawRow]) -> Vec<MappedRow> {
        rows.iter().map(|r| self.project(r)).collect()
    }

    /// Fails unless this mapping was built for `expected`.
    pub fn expect_kind(&self, expected: DocumentKind) -> Result<(), MappingError> {
        if self.kind == expected {
            Ok(())
        } else {
            Err(MappingError::DocumentKindMismatch {
                expected,
                found: self.kind,
            })
        }
    }
}

/// A source row seen through a mapping, keyed by target field in schema order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MappedRow {
    cells: Vec<(TargetField, RawCell)>,
}

impl MappedRow {
    pub fn get(&self, field: TargetField) -> &RawCell {
        const EMPTY: &RawCell = &RawCell::Empty;
        self.cells
            .iter()
            .find(|(f, _)| *f == field)
            .map_or(EMPTY, |(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TargetField, &RawCell)> {
        self.cells.iter().map(|(f, v)| (*f, v))
    }
}

impl FromIterator<(TargetField, RawCell)> for MappedRow {
    fn from_iter<T: IntoIterator<Item = (TargetField, RawCell)>>(iter: T) -> Self {
        MappedRow {
            cells: iter.into_iter().collect(),
        }
    }
}

/// Validates `choices` against the document's target fields.
///
/// A choice counts as assigned only when it is non-blank and names one of
/// `source_headers`. Completeness is checked before injectivity, so every
/// input yields exactly one of: a mapping, `IncompleteMapping`,
/// `DuplicateMapping`.
pub fn build_mapping(
    kind: DocumentKind,
    source_headers: &[String],
    choices: &MappingChoices,
) -> Result<FieldMapping, MappingError> {
    let mut columns = Vec::with_capacity(kind.fields().len());
    let mut missing = Vec::new();

    for &field in kind.fields() {
        match choices.get(&field).map(|c| c.trim()) {
            Some(column) if !column.is_empty() && source_headers.iter().any(|h| h == column) => {
                columns.push((field, column.to_string()));
            }
            _ => missing.push(field),
        }
    }

    if !missing.is_empty() {
        return Err(MappingError::IncompleteMapping { missing });
    }

    let mut seen: HashMap<&str, TargetField> = HashMap::new();
    for (field, column) in &columns {
        if let Some(first) = seen.insert(column.as_str(), *field) {
            return Err(MappingError::DuplicateMapping {
                column: column.clone(),
                first,
                second: *field,
            });
        }
    }

    Ok(FieldMapping { kind, columns })
}

/// Proposes a column for each target field whose label or alias matches a
/// header exactly (case-insensitive). The first matching header wins; a
/// header already taken by an earlier field is not offered again.
pub fn infer_choices(kind: DocumentKind, source_headers: &[String]) -> MappingChoices {
    let mut choices = MappingChoices::new();
    for &field in kind.fields() {
        let candidate = source_headers.iter().find(|h| {
            field.matches_header(h) && !choices.values().any(|taken| taken == *h)
        });
        if let Some(header) = candidate {
            choices.insert(field, header.clone());
        }
    }
    choices
}

/// Inferred choices overlaid with the user's explicit ones, then validated.
pub fn resolve_mapping(
    kind: DocumentKind,
    source_headers: &[String],
    explicit: &MappingChoices,
) -> Result<FieldMapping, MappingError> {
    let mut choices = infer_choices(kind, source_headers);
    for (field, column) in explicit {
        choices.insert(*field, column.clone());
    }
    build_mapping(kind, source_headers, &choices)
}
