//! Statement command - map, derive and preview a bank statement

use std::path::PathBuf;

use anyhow::{Context, Result};
use ledgerbridge_import::pipeline::import_statement;
use ledgerbridge_import::{
    export::write_export, preview, DocumentKind, JsonExporter, LedgerName, TargetField,
    VoucherExporter,
};

use super::{choices_from, load_profile};
use crate::output;

pub struct Args {
    pub file: PathBuf,
    pub profile: Option<PathBuf>,
    pub map: Vec<(TargetField, String)>,
    pub ledger: Option<String>,
    pub out: Option<PathBuf>,
    pub json: bool,
}

pub fn run(args: Args) -> Result<()> {
    let profile = load_profile(args.profile.as_deref(), DocumentKind::BankStatement)?;
    let explicit = choices_from(args.map);

    let import = import_statement(&args.file, &profile, &explicit)
        .with_context(|| format!("Failed to import {}", args.file.display()))?;
    let txs = &import.derivation.transactions;

    if let Some(out) = &args.out {
        let ledger = LedgerName::new(args.ledger.as_deref().unwrap_or_default())
            .context("--ledger is required with --out")?;
        let bytes = JsonExporter.export_vouchers(txs, &ledger)?;
        write_export(out, &bytes).with_context(|| format!("Failed to write {}", out.display()))?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(txs)?);
        return Ok(());
    }

    let shown = preview(txs, profile.preview_limit());
    println!("{}", output::transactions_table(shown));
    println!("Showing {} of {} transactions", shown.len(), txs.len());

    if let Some(balances) = import.balances {
        println!("Opening balance: {}", balances.opening.grouped());
        println!("Closing balance: {}", balances.closing.grouped());
    }
    if import.derivation.skipped > 0 {
        println!("Skipped {} rows with no movement", import.derivation.skipped);
    }
    if !import.derivation.warnings.is_empty() {
        println!(
            "{} cells could not be read and were left blank (see log)",
            import.derivation.warnings.len()
        );
    }
    Ok(())
}
