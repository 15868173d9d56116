//! Headers command - show selectable source columns

use std::path::Path;

use anyhow::{Context, Result};
use ledgerbridge_import::{infer_choices, CsvSource, DocumentKind, ImportProfile};

use crate::output;

pub fn run(file: &Path, header_row: Option<usize>, kind: DocumentKind) -> Result<()> {
    let mut options = ImportProfile::for_kind(kind).read_options();
    if let Some(row) = header_row {
        options.header_row = row;
    }

    let table = CsvSource::read_path(file, &options)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let suggested = infer_choices(kind, &table.headers);

    let mut out = output::create_table();
    out.set_header(vec!["#", "Column", "Suggested field"]);
    for (i, header) in table.headers.iter().enumerate() {
        let field = suggested
            .iter()
            .find(|(_, column)| column.as_str() == header.as_str())
            .map(|(field, _)| field.label())
            .unwrap_or("");
        out.add_row(vec![(i + 1).to_string(), header.clone(), field.to_string()]);
    }
    println!("{out}");
    println!("{} data rows", table.rows.len());
    Ok(())
}
