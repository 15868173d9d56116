//! ledgerbridge - normalize bank statements and GSTR-2A exports

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ledgerbridge_import::{DocumentKind, TargetField};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{gstr2a, headers, statement};

/// ledgerbridge - turn bank and GST portal CSVs into canonical rows
#[derive(Parser)]
#[command(name = "ledgerbridge", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the columns a file offers, with the field each would map to
    Headers {
        /// Path to CSV file
        file: PathBuf,
        /// Zero-based line holding the headers
        #[arg(long)]
        header_row: Option<usize>,
        /// Document kind used for suggestions (bank_statement, gstr2a)
        #[arg(long, default_value = "bank_statement")]
        kind: DocumentKind,
    },

    /// Map and derive a bank statement
    Statement {
        /// Path to CSV file
        file: PathBuf,
        /// TOML import profile
        #[arg(long)]
        profile: Option<PathBuf>,
        /// Column choice, repeatable (e.g. --map "DATE=Txn Date")
        #[arg(long = "map", value_name = "FIELD=COLUMN", value_parser = parse_column_choice)]
        map: Vec<(TargetField, String)>,
        /// Bank ledger name for the voucher handover
        #[arg(long)]
        ledger: Option<String>,
        /// Write the voucher handover JSON here
        #[arg(long)]
        out: Option<PathBuf>,
        /// Print every transaction as JSON instead of a preview
        #[arg(long)]
        json: bool,
    },

    /// Combine GSTR-2A exports and total them
    Gstr2a {
        /// One or more portal CSV files, in upload order
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// TOML import profile
        #[arg(long)]
        profile: Option<PathBuf>,
        /// Column choice, repeatable (e.g. --map "Invoice Number=Inv #")
        #[arg(long = "map", value_name = "FIELD=COLUMN", value_parser = parse_column_choice)]
        map: Vec<(TargetField, String)>,
        /// Write the workbook handover JSON here
        #[arg(long)]
        out: Option<PathBuf>,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_column_choice(s: &str) -> Result<(TargetField, String), String> {
    let (label, column) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=COLUMN, got '{s}'"))?;
    let field =
        TargetField::from_label(label).ok_or_else(|| format!("unknown field '{}'", label.trim()))?;
    Ok((field, column.trim().to_string()))
}

fn main() -> ExitCode {
    // Logs go to stderr so --json output on stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Headers { file, header_row, kind } => headers::run(&file, header_row, kind),
        Commands::Statement { file, profile, map, ledger, out, json } => statement::run(statement::Args {
            file,
            profile,
            map,
            ledger,
            out,
            json,
        }),
        Commands::Gstr2a { files, profile, map, out, json } => gstr2a::run(gstr2a::Args {
            files,
            profile,
            map,
            out,
            json,
        }),
    }
}
