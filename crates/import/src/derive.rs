use ledgerbridge_core::{
    coerce_checked, normalize, CanonicalDate, Direction, Money, RawRow, Transaction,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::mapping::{DocumentKind, FieldMapping, MappedRow, MappingError, TargetField};

/// Longest narration kept when simplifying.
pub const NARRATION_MAX_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeriveOptions {
    /// Shorten UPI / NEFT / interest remarks to something readable.
    #[serde(default)]
    pub simplify_narration: bool,
    /// Drop lines where both withdrawal and deposit are zero.
    #[serde(default)]
    pub skip_empty_movements: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    UnreadableDate,
    UnreadableAmount,
}

/// A cell that could not be read and was replaced by its empty/zero value.
/// The row itself is still emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivationWarning {
    /// Zero-based index into the source rows.
    pub row: usize,
    pub field: TargetField,
    pub value: String,
    pub kind: WarningKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Derivation {
    pub transactions: Vec<Transaction>,
    pub warnings: Vec<DerivationWarning>,
    /// Rows left out by `skip_empty_movements`.
    pub skipped: usize,
}

pub struct TransactionDeriver {
    mapping: FieldMapping,
    options: DeriveOptions,
}

impl TransactionDeriver {
    /// Only accepts a mapping built for bank statements.
    pub fn new(mapping: FieldMapping, options: DeriveOptions) -> Result<Self, MappingError> {
        mapping.expect_kind(DocumentKind::BankStatement)?;
        Ok(Self { mapping, options })
    }

    pub fn mapping(&self) -> &FieldMapping {
        &self.mapping
    }

    pub fn derive_row(&self, row: &RawRow) -> Transaction {
        self.derive_mapped(&self.mapping.project(row), 0).0
    }

    pub fn derive_all(&self, rows: &[RawRow]) -> Derivation {
        let mut out = Derivation::default();

        for (idx, row) in rows.iter().enumerate() {
            let mapped = self.mapping.project(row);
            let (tx, warnings, empty_movement) = self.derive_mapped(&mapped, idx);

            for w in &warnings {
                tracing::warn!(row = w.row, field = %w.field, value = %w.value, "unreadable cell, using blank");
            }
            out.warnings.extend(warnings);

            if empty_movement && self.options.skip_empty_movements {
                out.skipped += 1;
                continue;
            }
            out.transactions.push(tx);
        }

        tracing::info!(
            rows = rows.len(),
            transactions = out.transactions.len(),
            warnings = out.warnings.len(),
            skipped = out.skipped,
            "derived bank statement"
        );
        out
    }

    fn derive_mapped(&self, row: &MappedRow, idx: usize) -> (Transaction, Vec<DerivationWarning>, bool) {
        let mut warnings = Vec::new();
        let mut amount_of = |field: TargetField| {
            let cell = row.get(field);
            let c = coerce_checked(cell);
            if c.failed {
                warnings.push(DerivationWarning {
                    row: idx,
                    field,
                    value: cell.as_text(),
                    kind: WarningKind::UnreadableAmount,
                });
            }
            c.value
        };

        let withdrawal = amount_of(TargetField::Withdrawal);
        let deposit = amount_of(TargetField::Deposit);
        let balance = amount_of(TargetField::Closing);

        let date_cell = row.get(TargetField::Date);
        let date = normalize(date_cell);
        if date.is_empty() && !date_cell.is_empty() {
            warnings.push(DerivationWarning {
                row: idx,
                field: TargetField::Date,
                value: date_cell.as_text(),
                kind: WarningKind::UnreadableDate,
            });
        }

        let mut narration = row.get(TargetField::Narration).as_text().trim().to_string();
        if self.options.simplify_narration {
            narration = simplify_narration(&narration);
        }

        let empty_movement = withdrawal.is_zero() && deposit.is_zero();
        let tx = build(date, narration, withdrawal, deposit, balance);
        (tx, warnings, empty_movement)
    }
}

/// Derives one transaction from a mapped bank-statement row.
///
/// Withdrawal wins when both amount columns are non-zero; direction is
/// `Receipt` only when the deposit is positive.
pub fn derive(row: &MappedRow) -> Transaction {
    let withdrawal = coerce_checked(row.get(TargetField::Withdrawal)).value;
    let deposit = coerce_checked(row.get(TargetField::Deposit)).value;
    let balance = coerce_checked(row.get(TargetField::Closing)).value;
    let narration = row.get(TargetField::Narration).as_text().trim().to_string();
    build(normalize(row.get(TargetField::Date)), narration, withdrawal, deposit, balance)
}

fn build(
    date: CanonicalDate,
    narration: String,
    withdrawal: Decimal,
    deposit: Decimal,
    balance: Decimal,
) -> Transaction {
    let amount = if withdrawal.is_zero() { deposit } else { withdrawal };
    let direction = if deposit > Decimal::ZERO {
        Direction::Receipt
    } else {
        Direction::Payment
    };
    Transaction {
        date,
        narration,
        amount: Money::new(amount).abs(),
        direction,
        balance: Money::new(balance),
    }
}

/// Shortens the remark formats banks use for UPI, NEFT and interest lines.
pub fn simplify_narration(remarks: &str) -> String {
    let remarks = remarks.trim();
    let simplified = if remarks.contains("/UPI/") {
        let parts: Vec<&str> = remarks
            .split('/')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        match (parts.first(), parts.last()) {
            (Some(first), Some(last)) if parts.len() >= 4 => format!("{first} - {last}"),
            _ => remarks.to_string(),
        }
    } else if remarks.contains(':') && remarks.contains("Int.Pd") {
        "Interest Credited".to_string()
    } else if remarks.contains("NEFT") {
        let last = remarks.split_whitespace().last().unwrap_or_default();
        format!("NEFT - {last}")
    } else {
        remarks.to_string()
    };
    simplified.chars().take(NARRATION_MAX_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{build_mapping, MappingChoices};
    use ledgerbridge_core::RawCell;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn mapped(date: &str, narration: &str, withdrawal: &str, deposit: &str, closing: &str) -> MappedRow {
        vec![
            (TargetField::Date, RawCell::from(date)),
            (TargetField::Narration, RawCell::from(narration)),
            (TargetField::Withdrawal, RawCell::from(withdrawal)),
            (TargetField::Deposit, RawCell::from(deposit)),
            (TargetField::Closing, RawCell::from(closing)),
        ]
        .into_iter()
        .collect()
    }

    fn headers() -> Vec<String> {
        ["Date", "Remarks", "Debit", "Credit", "Balance"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn deriver(options: DeriveOptions) -> TransactionDeriver {
        let choices = MappingChoices::from([
            (TargetField::Date, "Date".to_string()),
            (TargetField::Narration, "Remarks".to_string()),
            (TargetField::Withdrawal, "Debit".to_string()),
            (TargetField::Deposit, "Credit".to_string()),
            (TargetField::Closing, "Balance".to_string()),
        ]);
        let mapping = build_mapping(DocumentKind::BankStatement, &headers(), &choices).unwrap();
        TransactionDeriver::new(mapping, options).unwrap()
    }

    fn raw(values: [&str; 5]) -> RawRow {
        RawRow::from_record(&headers(), values)
    }

    #[test]
    fn withdrawal_is_a_payment() {
        let tx = derive(&mapped("01/04/2024", "ATM", "500.00", "0", "9,500.00"));
        assert_eq!(tx.amount.amount(), dec("500.00"));
        assert_eq!(tx.direction, Direction::Payment);
        assert_eq!(tx.balance.amount(), dec("9500.00"));
    }

    #[test]
    fn deposit_is_a_receipt() {
        let tx = derive(&mapped("01/04/2024", "SALARY", "0", "1200", "10700"));
        assert_eq!(tx.amount.amount(), dec("1200"));
        assert_eq!(tx.direction, Direction::Receipt);
    }

    #[test]
    fn withdrawal_wins_when_both_present() {
        // Direction still follows the deposit column.
        let tx = derive(&mapped("01/04/2024", "ODD", "300", "50", "0"));
        assert_eq!(tx.amount.amount(), dec("300"));
        assert_eq!(tx.direction, Direction::Receipt);
    }

    #[test]
    fn no_movement_is_zero_payment() {
        let tx = derive(&mapped("01/04/2024", "NOTE", "", "", "100"));
        assert!(tx.amount.is_zero());
        assert_eq!(tx.direction, Direction::Payment);
    }

    #[test]
    fn negative_withdrawal_is_made_positive() {
        let tx = derive(&mapped("01/04/2024", "", "-250", "", ""));
        assert_eq!(tx.amount.amount(), dec("250"));
        assert_eq!(tx.direction, Direction::Payment);
    }

    #[test]
    fn date_and_narration_are_normalized() {
        let tx = derive(&mapped("45292", "  UPI transfer  ", "10", "", ""));
        assert_eq!(tx.date.to_string(), "01/01/2024");
        assert_eq!(tx.narration, "UPI transfer");
    }

    #[test]
    fn bad_cells_degrade_instead_of_failing() {
        let tx = derive(&mapped("31/02/2024", "", "abc", "", "n/a"));
        assert!(tx.date.is_empty());
        assert!(tx.amount.is_zero());
        assert!(tx.balance.is_zero());
    }

    #[test]
    fn derive_all_keeps_every_row_and_reports_warnings() {
        let rows = vec![
            raw(["01/04/2024", "ATM", "500", "", "9500"]),
            raw(["garbage", "???", "oops", "", "9500"]),
            raw(["03/04/2024", "NOTE", "", "", "9500"]),
        ];
        let out = deriver(DeriveOptions::default()).derive_all(&rows);
        assert_eq!(out.transactions.len(), 3);
        assert_eq!(out.skipped, 0);
        assert_eq!(out.warnings.len(), 2);
        assert!(out.warnings.iter().all(|w| w.row == 1));
        assert!(out
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::UnreadableDate && w.value == "garbage"));
        assert!(out
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::UnreadableAmount && w.field == TargetField::Withdrawal));
    }

    #[test]
    fn skip_empty_movements_when_asked() {
        let rows = vec![
            raw(["01/04/2024", "ATM", "500", "", "9500"]),
            raw(["02/04/2024", "B/F", "", "", "9500"]),
        ];
        let opts = DeriveOptions {
            skip_empty_movements: true,
            ..DeriveOptions::default()
        };
        let out = deriver(opts).derive_all(&rows);
        assert_eq!(out.transactions.len(), 1);
        assert_eq!(out.skipped, 1);
    }

    #[test]
    fn derive_row_projects_first() {
        let tx = deriver(DeriveOptions::default()).derive_row(&raw(["45292", "X", "", "1,200", "1,200"]));
        assert_eq!(tx.direction, Direction::Receipt);
        assert_eq!(tx.date.to_string(), "01/01/2024");
    }

    #[test]
    fn rejects_gst_mapping() {
        let h: Vec<String> = DocumentKind::Gstr2a.fields().iter().map(|f| f.label().to_string()).collect();
        let choices: MappingChoices = DocumentKind::Gstr2a
            .fields()
            .iter()
            .map(|f| (*f, f.label().to_string()))
            .collect();
        let mapping = build_mapping(DocumentKind::Gstr2a, &h, &choices).unwrap();
        assert!(matches!(
            TransactionDeriver::new(mapping, DeriveOptions::default()),
            Err(MappingError::DocumentKindMismatch { .. })
        ));
    }

    #[test]
    fn simplify_upi() {
        assert_eq!(
            simplify_narration("BIL/UPI/412345678901/RAHUL KUMAR/YESB/Payment"),
            "BIL - Payment"
        );
        assert_eq!(simplify_narration("MB/UPI/412345/AMAZON"), "MB - AMAZON");
        // Too few segments to shorten.
        assert_eq!(simplify_narration("X/UPI/Y"), "X/UPI/Y");
    }

    #[test]
    fn simplify_interest_and_neft() {
        assert_eq!(simplify_narration("1234:Int.Pd:01-01-2024 to 31-03-2024"), "Interest Credited");
        assert_eq!(simplify_narration("NEFT CR HDFC0001234 ACME LTD N123456"), "NEFT - N123456");
    }

    #[test]
    fn simplify_caps_length() {
        let long = "X".repeat(150);
        assert_eq!(simplify_narration(&long).chars().count(), NARRATION_MAX_CHARS);
    }

    #[test]
    fn simplify_option_applies_in_deriver() {
        let opts = DeriveOptions {
            simplify_narration: true,
            ..DeriveOptions::default()
        };
        let tx = deriver(opts).derive_row(&raw(["01/04/2024", "NEFT CR ACME N999", "", "10", "10"]));
        assert_eq!(tx.narration, "NEFT - N999");
    }
}
