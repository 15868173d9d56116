//! GSTR-2A command - combine portal exports and total them

use std::path::PathBuf;

use anyhow::{Context, Result};
use ledgerbridge_import::pipeline::import_gstr2a;
use ledgerbridge_import::{
    export::write_export, preview, DocumentKind, JsonExporter, TargetField, WorkbookExporter,
    WorkbookSheet,
};

use super::{choices_from, load_profile};
use crate::output;

pub struct Args {
    pub files: Vec<PathBuf>,
    pub profile: Option<PathBuf>,
    pub map: Vec<(TargetField, String)>,
    pub out: Option<PathBuf>,
    pub json: bool,
}

pub fn run(args: Args) -> Result<()> {
    let profile = load_profile(args.profile.as_deref(), DocumentKind::Gstr2a)?;
    let explicit = choices_from(args.map);

    let batch = import_gstr2a(&args.files, &profile, &explicit)
        .context("Failed to read GSTR-2A files")?;
    let summary = batch.summary();

    if let Some(out) = &args.out {
        let bytes = JsonExporter.export_workbook(&WorkbookSheet::from_batch(&batch))?;
        write_export(out, &bytes).with_context(|| format!("Failed to write {}", out.display()))?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let shown = preview(batch.rows(), profile.preview_limit());
    println!("{}", output::tax_rows_table(shown));
    println!(
        "Showing {} of {} rows from {} files ({} filtered out)",
        shown.len(),
        batch.rows().len(),
        batch.file_count(),
        batch.filtered_count()
    );
    println!("{}", output::summary_table(&summary));
    if summary.overflowed {
        println!("Some totals exceeded the largest representable amount and were capped");
    }
    Ok(())
}
