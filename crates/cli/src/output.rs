//! Terminal formatting

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, CellAlignment, ContentArrangement, Table};
use ledgerbridge_core::{Money, Transaction};
use ledgerbridge_import::{AggregateSummary, TaxRow, TargetField};

pub fn error(msg: &str) {
    eprintln!("error: {msg}");
}

pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn amount_cell(m: Money) -> Cell {
    Cell::new(m.grouped()).set_alignment(CellAlignment::Right)
}

pub fn transactions_table(rows: &[Transaction]) -> Table {
    let mut table = create_table();
    table.set_header(vec!["Date", "Narration", "Amount", "Type", "Balance"]);
    for tx in rows {
        table.add_row(vec![
            Cell::new(&tx.date),
            Cell::new(&tx.narration),
            amount_cell(tx.amount),
            Cell::new(tx.direction),
            amount_cell(tx.balance),
        ]);
    }
    table
}

pub fn tax_rows_table(rows: &[TaxRow]) -> Table {
    let mut table = create_table();
    table.set_header(vec!["Supplier", "Invoice", "Date", "Taxable", "IGST", "CGST", "SGST", "Cess"]);
    for row in rows {
        let text = |f: TargetField| row.cells.get(f).as_text();
        table.add_row(vec![
            Cell::new(text(TargetField::SupplierGstin)),
            Cell::new(text(TargetField::InvoiceNumber)),
            Cell::new(text(TargetField::InvoiceDate)),
            amount_cell(row.amounts.taxable),
            amount_cell(row.amounts.igst),
            amount_cell(row.amounts.cgst),
            amount_cell(row.amounts.sgst),
            amount_cell(row.amounts.cess),
        ]);
    }
    table
}

pub fn summary_table(summary: &AggregateSummary) -> Table {
    let mut table = create_table();
    table.add_row(vec![
        Cell::new("Unique invoices"),
        Cell::new(summary.unique_invoice_count).set_alignment(CellAlignment::Right),
    ]);
    for (label, amount) in [
        ("Taxable value", summary.total_taxable),
        ("IGST", summary.total_igst),
        ("CGST", summary.total_cgst),
        ("SGST", summary.total_sgst),
        ("Cess", summary.total_cess),
    ] {
        table.add_row(vec![Cell::new(label), amount_cell(amount)]);
    }
    table
}
