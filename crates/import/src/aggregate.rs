use std::collections::HashSet;

use ledgerbridge_core::{coerce, Money};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::csv::SourceTable;
use crate::mapping::{DocumentKind, FieldMapping, MappedRow, MappingError, TargetField};

/// The five money columns of a GST row, coerced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaxAmounts {
    pub taxable: Money,
    pub igst: Money,
    pub cgst: Money,
    pub sgst: Money,
    pub cess: Money,
}

impl TaxAmounts {
    pub fn from_row(row: &MappedRow) -> Self {
        let money = |field| Money::new(coerce(row.get(field)));
        Self {
            taxable: money(TargetField::TaxableValue),
            igst: money(TargetField::IntegratedTax),
            cgst: money(TargetField::CentralTax),
            sgst: money(TargetField::StateTax),
            cess: money(TargetField::Cess),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxRow {
    pub cells: MappedRow,
    pub amounts: TaxAmounts,
}

impl TaxRow {
    pub fn new(cells: MappedRow) -> Self {
        let amounts = TaxAmounts::from_row(&cells);
        Self { cells, amounts }
    }

    /// Trimmed invoice number, `None` when blank.
    pub fn invoice(&self) -> Option<String> {
        let text = self.cells.get(TargetField::InvoiceNumber).as_text();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

/// Totals across a batch. Amounts are exact; round only when displaying.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregateSummary {
    pub unique_invoice_count: usize,
    pub total_taxable: Money,
    pub total_igst: Money,
    pub total_cgst: Money,
    pub total_sgst: Money,
    pub total_cess: Money,
    /// A total left the representable range and was held at the limit.
    pub overflowed: bool,
}

/// Folds `rows` into a summary. Row order does not affect the result.
pub fn summarize(rows: &[TaxRow]) -> AggregateSummary {
    let mut invoices: HashSet<String> = HashSet::new();
    let mut summary = AggregateSummary::default();

    for row in rows {
        if let Some(invoice) = row.invoice() {
            invoices.insert(invoice);
        }
        let mut overflowed = false;
        for (total, amount) in [
            (&mut summary.total_taxable, row.amounts.taxable),
            (&mut summary.total_igst, row.amounts.igst),
            (&mut summary.total_cgst, row.amounts.cgst),
            (&mut summary.total_sgst, row.amounts.sgst),
            (&mut summary.total_cess, row.amounts.cess),
        ] {
            match total.checked_add(amount) {
                Some(sum) => *total = sum,
                None => {
                    overflowed = true;
                    *total = *total + amount;
                }
            }
        }
        summary.overflowed |= overflowed;
    }

    summary.unique_invoice_count = invoices.len();
    summary
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOptions {
    /// Keep only rows with a positive rate and a taxable value present.
    pub retain_taxable_only: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            retain_taxable_only: true,
        }
    }
}

/// Rows from one or more GSTR-2A files, concatenated in the order the
/// files were added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentBatch {
    #[serde(skip)]
    options: BatchOptions,
    rows: Vec<TaxRow>,
    files: usize,
    filtered: usize,
}

impl DocumentBatch {
    pub fn new(options: BatchOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Appends one file's rows through `mapping`. Returns how many were kept.
    pub fn push_table(
        &mut self,
        table: &SourceTable,
        mapping: &FieldMapping,
    ) -> Result<usize, MappingError> {
        mapping.expect_kind(DocumentKind::Gstr2a)?;

        let before = self.rows.len();
        for mapped in mapping.project_all(&table.rows) {
            if self.options.retain_taxable_only && !is_taxable(&mapped) {
                self.filtered += 1;
                continue;
            }
            self.rows.push(TaxRow::new(mapped));
        }
        self.files += 1;

        let kept = self.rows.len() - before;
        tracing::debug!(file = self.files, rows = table.rows.len(), kept, "added GSTR-2A file");
        Ok(kept)
    }

    pub fn rows(&self) -> &[TaxRow] {
        &self.rows
    }

    pub fn file_count(&self) -> usize {
        self.files
    }

    /// Rows dropped by `retain_taxable_only`.
    pub fn filtered_count(&self) -> usize {
        self.filtered
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Recomputed from the current rows on every call.
    pub fn summary(&self) -> AggregateSummary {
        let summary = summarize(&self.rows);
        if summary.overflowed {
            tracing::warn!(rows = self.rows.len(), "GSTR-2A totals overflowed and were capped");
        }
        tracing::info!(
            files = self.files,
            rows = self.rows.len(),
            invoices = summary.unique_invoice_count,
            taxable = %summary.total_taxable,
            "summarized GSTR-2A batch"
        );
        summary
    }
}

/// Positive rate (coercion already drops a trailing `%`) and a taxable value that is
/// neither blank nor `-`.
fn is_taxable(row: &MappedRow) -> bool {
    let rate = coerce(row.get(TargetField::Rate));
    let taxable = row.get(TargetField::TaxableValue).as_text();
    let taxable = taxable.trim();
    rate > Decimal::ZERO && !taxable.is_empty() && taxable != "-"
}
