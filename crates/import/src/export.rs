use std::fmt;
use std::path::Path;

use ledgerbridge_core::{coerce, Transaction};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::aggregate::DocumentBatch;
use crate::mapping::{DocumentKind, MappedRow, TargetField};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Ledger name must not be empty")]
    EmptyLedgerName,
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The bank ledger vouchers are posted against. Never empty, always trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct LedgerName(String);

impl LedgerName {
    pub fn new(name: &str) -> Result<Self, ExportError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ExportError::EmptyLedgerName);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LedgerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Turns an ordered transaction stream into a ledger import document.
pub trait VoucherExporter {
    fn export_vouchers(
        &self,
        transactions: &[Transaction],
        ledger: &LedgerName,
    ) -> Result<Vec<u8>, ExportError>;
}

/// Turns a typed sheet into a spreadsheet document.
pub trait WorkbookExporter {
    fn export_workbook(&self, sheet: &WorkbookSheet) -> Result<Vec<u8>, ExportError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum WorkbookCell {
    Text(String),
    Number(Decimal),
}

/// Column labels in target-field order, with amount columns already coerced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkbookSheet {
    pub columns: Vec<String>,
    pub numeric_columns: Vec<String>,
    pub rows: Vec<Vec<WorkbookCell>>,
}

impl WorkbookSheet {
    pub fn from_rows<'a, I>(kind: DocumentKind, rows: I) -> Self
    where
        I: IntoIterator<Item = &'a MappedRow>,
    {
        let fields = kind.fields();
        let numeric = kind.numeric_fields();
        let rows = rows
            .into_iter()
            .map(|row| fields.iter().map(|&f| cell_for(row, f, numeric)).collect())
            .collect();

        Self {
            columns: fields.iter().map(|f| f.label().to_string()).collect(),
            numeric_columns: numeric.iter().map(|f| f.label().to_string()).collect(),
            rows,
        }
    }

    pub fn from_batch(batch: &DocumentBatch) -> Self {
        Self::from_rows(DocumentKind::Gstr2a, batch.rows().iter().map(|r| &r.cells))
    }
}

fn cell_for(row: &MappedRow, field: TargetField, numeric: &[TargetField]) -> WorkbookCell {
    let raw = row.get(field);
    if numeric.contains(&field) {
        WorkbookCell::Number(coerce(raw))
    } else {
        WorkbookCell::Text(raw.as_text().trim().to_string())
    }
}

#[derive(Serialize)]
struct VoucherDocument<'a> {
    ledger: &'a LedgerName,
    vouchers: &'a [Transaction],
}

/// Writes the canonical values as pretty-printed JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExporter;

impl VoucherExporter for JsonExporter {
    fn export_vouchers(
        &self,
        transactions: &[Transaction],
        ledger: &LedgerName,
    ) -> Result<Vec<u8>, ExportError> {
        let doc = VoucherDocument {
            ledger,
            vouchers: transactions,
        };
        Ok(serde_json::to_vec_pretty(&doc)?)
    }
}

impl WorkbookExporter for JsonExporter {
    fn export_workbook(&self, sheet: &WorkbookSheet) -> Result<Vec<u8>, ExportError> {
        Ok(serde_json::to_vec_pretty(sheet)?)
    }
}

pub fn write_export(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    std::fs::write(path, bytes)?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "wrote export");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{BatchOptions, DocumentBatch};
    use crate::csv::SourceTable;
    use crate::mapping::{build_mapping, MappingChoices};
    use ledgerbridge_core::{CanonicalDate, Direction, Money, RawCell, RawRow};
    use std::cell::RefCell;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn tx(narration: &str, amount: &str) -> Transaction {
        Transaction {
            date: CanonicalDate::from_str("01/04/2024").unwrap(),
            narration: narration.to_string(),
            amount: Money::new(dec(amount)),
            direction: Direction::Payment,
            balance: Money::zero(),
        }
    }

    /// Records what it was handed instead of rendering anything.
    struct RecordingExporter {
        seen: RefCell<Vec<(String, usize)>>,
    }

    impl VoucherExporter for RecordingExporter {
        fn export_vouchers(
            &self,
            transactions: &[Transaction],
            ledger: &LedgerName,
        ) -> Result<Vec<u8>, ExportError> {
            self.seen
                .borrow_mut()
                .push((ledger.to_string(), transactions.len()));
            Ok(Vec::new())
        }
    }

    // ── LedgerName ──

    #[test]
    fn ledger_name_is_trimmed() {
        assert_eq!(LedgerName::new("  HDFC Bank  ").unwrap().as_str(), "HDFC Bank");
    }

    #[test]
    fn blank_ledger_name_is_rejected() {
        assert!(matches!(LedgerName::new("   "), Err(ExportError::EmptyLedgerName)));
        assert!(matches!(LedgerName::new(""), Err(ExportError::EmptyLedgerName)));
    }

    // ── exporters ──

    #[test]
    fn trait_objects_receive_the_stream() {
        let exporter = RecordingExporter {
            seen: RefCell::new(Vec::new()),
        };
        let ledger = LedgerName::new("SBI").unwrap();
        let dyn_exporter: &dyn VoucherExporter = &exporter;
        dyn_exporter
            .export_vouchers(&[tx("a", "1"), tx("b", "2")], &ledger)
            .unwrap();
        assert_eq!(exporter.seen.borrow().as_slice(), &[("SBI".to_string(), 2)]);
    }

    #[test]
    fn json_vouchers_keep_canonical_fields() {
        let ledger = LedgerName::new("HDFC Bank").unwrap();
        let bytes = JsonExporter
            .export_vouchers(&[tx("ATM", "500.00")], &ledger)
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["ledger"], "HDFC Bank");
        let voucher = &value["vouchers"][0];
        assert_eq!(voucher["date"], "01/04/2024");
        assert_eq!(voucher["type"], "Payment");
        assert_eq!(voucher["narration"], "ATM");
    }

    #[test]
    fn workbook_numbers_are_coerced() {
        let headers: Vec<String> = DocumentKind::Gstr2a
            .fields()
            .iter()
            .map(|f| f.label().to_string())
            .collect();
        let choices: MappingChoices = DocumentKind::Gstr2a
            .fields()
            .iter()
            .map(|f| (*f, f.label().to_string()))
            .collect();
        let mapping = build_mapping(DocumentKind::Gstr2a, &headers, &choices).unwrap();

        let mut row = RawRow::from_record(&headers, std::iter::empty::<&str>());
        row.insert(TargetField::InvoiceNumber.label(), "INV-9");
        row.insert(TargetField::TaxableValue.label(), "1,000.00");
        row.insert(TargetField::Rate.label(), "18");
        row.insert(TargetField::IntegratedTax.label(), "180");

        let mut batch = DocumentBatch::new(BatchOptions::default());
        batch
            .push_table(
                &SourceTable {
                    headers: headers.clone(),
                    rows: vec![row],
                },
                &mapping,
            )
            .unwrap();

        let sheet = WorkbookSheet::from_batch(&batch);
        assert_eq!(sheet.columns, headers);
        assert_eq!(sheet.numeric_columns.len(), 5);

        let taxable_idx = sheet
            .columns
            .iter()
            .position(|c| c == "Taxable Value")
            .unwrap();
        let invoice_idx = sheet
            .columns
            .iter()
            .position(|c| c == "Invoice Number")
            .unwrap();
        assert_eq!(sheet.rows[0][taxable_idx], WorkbookCell::Number(dec("1000.00")));
        assert_eq!(sheet.rows[0][invoice_idx], WorkbookCell::Text("INV-9".into()));

        let bytes = JsonExporter.export_workbook(&sheet).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["rows"][0][taxable_idx]["type"], "number");
    }

    #[test]
    fn bank_sheet_marks_amount_columns() {
        let row: MappedRow = vec![
            (TargetField::Date, RawCell::from("01/04/2024")),
            (TargetField::Withdrawal, RawCell::from("abc")),
        ]
        .into_iter()
        .collect();
        let sheet = WorkbookSheet::from_rows(DocumentKind::BankStatement, [&row]);
        assert_eq!(sheet.numeric_columns, vec!["WITHDRAWAL", "DEPOSIT", "CLOSING"]);
        assert_eq!(sheet.rows[0][2], WorkbookCell::Number(Decimal::ZERO));
    }

    #[test]
    fn write_export_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_export(&path, b"{}").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"{}");
    }
}
