pub mod aggregate;
pub mod csv;
pub mod derive;
pub mod export;
pub mod mapping;
pub mod preview;
pub mod profile;

pub use aggregate::{summarize, AggregateSummary, BatchOptions, DocumentBatch, TaxAmounts, TaxRow};
pub use csv::{CsvReadOptions, CsvSource, SourceError, SourceTable};
pub use derive::{derive, Derivation, DerivationWarning, DeriveOptions, TransactionDeriver, WarningKind};
pub use export::{
    ExportError, JsonExporter, LedgerName, VoucherExporter, WorkbookCell, WorkbookExporter,
    WorkbookSheet,
};
pub use mapping::{
    build_mapping, infer_choices, resolve_mapping, DocumentKind, FieldMapping, MappedRow,
    MappingChoices, MappingError, TargetField,
};
pub use preview::preview;
pub use profile::{ImportProfile, ProfileError};

/// End-to-end helpers: read, map, then derive or aggregate.
pub mod pipeline {
    use std::path::Path;

    use ledgerbridge_core::StatementBalances;
    use thiserror::Error;

    use crate::*;

    #[derive(Error, Debug)]
    pub enum ImportError {
        #[error(transparent)]
        Source(#[from] SourceError),
        #[error(transparent)]
        Mapping(#[from] MappingError),
    }

    #[derive(Debug)]
    pub struct StatementImport {
        pub headers: Vec<String>,
        pub mapping: FieldMapping,
        pub derivation: Derivation,
        pub balances: Option<StatementBalances>,
    }

    /// `explicit` overrides both the profile's columns and header inference.
    pub fn import_statement(
        path: &Path,
        profile: &ImportProfile,
        explicit: &MappingChoices,
    ) -> Result<StatementImport, ImportError> {
        let table = CsvSource::read_path(path, &profile.read_options())?;
        statement_from_table(table, profile, explicit)
    }

    pub fn statement_from_table(
        table: SourceTable,
        profile: &ImportProfile,
        explicit: &MappingChoices,
    ) -> Result<StatementImport, ImportError> {
        let choices = overlay(profile, explicit);
        let mapping = resolve_mapping(DocumentKind::BankStatement, &table.headers, &choices)?;
        let deriver = TransactionDeriver::new(mapping, profile.derive_options())?;
        let derivation = deriver.derive_all(&table.rows);
        let balances = StatementBalances::from_transactions(&derivation.transactions);

        Ok(StatementImport {
            headers: table.headers,
            mapping: deriver.mapping().clone(),
            derivation,
            balances,
        })
    }

    /// Reads every file as one batch. Each file gets its own mapping so
    /// exports with shifted columns still line up.
    pub fn import_gstr2a<P: AsRef<Path>>(
        paths: &[P],
        profile: &ImportProfile,
        explicit: &MappingChoices,
    ) -> Result<DocumentBatch, ImportError> {
        let choices = overlay(profile, explicit);
        let options = profile.read_options();
        let mut batch = DocumentBatch::new(profile.batch_options());

        for path in paths {
            let table = CsvSource::read_path(path.as_ref(), &options)?;
            let mapping = resolve_mapping(DocumentKind::Gstr2a, &table.headers, &choices)?;
            batch.push_table(&table, &mapping)?;
        }
        Ok(batch)
    }

    fn overlay(profile: &ImportProfile, explicit: &MappingChoices) -> MappingChoices {
        // Profile keys were checked when it was loaded; a hand-built profile
        // with bad keys just falls back to inference.
        let mut choices = profile.choices().unwrap_or_default();
        choices.extend(explicit.iter().map(|(f, c)| (*f, c.clone())));
        choices
    }

}
