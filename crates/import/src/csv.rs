use std::fs::File;
use std::io::Read;
use std::path::Path;

use ledgerbridge_core::RawRow;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A source must expose at least this many columns to be mappable.
pub const MIN_COLUMNS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvReadOptions {
    pub delimiter: u8,
    /// Zero-based record index of the header line.
    pub header_row: usize,
}

impl Default for CsvReadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            header_row: 0,
        }
    }
}

impl CsvReadOptions {
    /// Layout of the GSTR-2A portal export: two banner lines, then headers.
    pub fn gstr2a() -> Self {
        Self {
            header_row: 2,
            ..Self::default()
        }
    }
}

/// Headers in file order plus every non-blank data row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourceTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Malformed source: expected at least {MIN_COLUMNS} columns, found {columns}")]
    MalformedSource { columns: usize },
    #[error("Header row {row} not found")]
    MissingHeaderRow { row: usize },
}

/// Reads an export into headers and rows without interpreting any cell.
/// Lines above `header_row` (bank letterheads, portal banners) are skipped.
pub struct CsvSource;

impl CsvSource {
    pub fn read<R: Read>(data: R, options: &CsvReadOptions) -> Result<SourceTable, SourceError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(options.delimiter)
            .from_reader(data);

        let mut records = reader.byte_records();

        for _ in 0..options.header_row {
            if records.next().transpose()?.is_none() {
                return Err(SourceError::MissingHeaderRow {
                    row: options.header_row,
                });
            }
        }

        let header_record = records.next().transpose()?.ok_or(SourceError::MissingHeaderRow {
            row: options.header_row,
        })?;

        let headers: Vec<String> = header_record
            .iter()
            .map(|h| decode_field(h).trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        if headers.len() < MIN_COLUMNS {
            return Err(SourceError::MalformedSource {
                columns: headers.len(),
            });
        }

        let mut rows = Vec::new();
        for result in records {
            let record = result?;
            let values: Vec<String> = record.iter().map(decode_field).collect();
            let row = RawRow::from_record(&headers, values.iter().map(String::as_str));
            if row.is_blank() {
                continue;
            }
            rows.push(row);
        }

        tracing::debug!(
            columns = headers.len(),
            rows = rows.len(),
            "read CSV source"
        );

        Ok(SourceTable { headers, rows })
    }

    pub fn read_path(path: &Path, options: &CsvReadOptions) -> Result<SourceTable, SourceError> {
        let file = File::open(path)?;
        Self::read(file, options)
    }
}

/// UTF-8 when valid, otherwise Latin-1, so legacy bank exports still load.
fn decode_field(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
