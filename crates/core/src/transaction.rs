use serde::{Deserialize, Serialize};
use std::fmt;

use super::date::CanonicalDate;
use super::money::Money;

/// Which way money moved, from the account holder's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Money in (a deposit).
    Receipt,
    /// Money out (a withdrawal).
    Payment,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Receipt => write!(f, "Receipt"),
            Direction::Payment => write!(f, "Payment"),
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "receipt" => Ok(Direction::Receipt),
            "payment" => Ok(Direction::Payment),
            other => Err(format!("Unknown direction: '{other}'")),
        }
    }
}

/// One bank-statement line in canonical form, ready for voucher export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: CanonicalDate,
    pub narration: String,
    /// Never negative; the sign lives in `direction`.
    pub amount: Money,
    #[serde(rename = "type")]
    pub direction: Direction,
    /// Closing balance reported by the bank after this line.
    pub balance: Money,
}

impl Transaction {
    /// The change this line applies to the account balance.
    pub fn signed_amount(&self) -> Money {
        match self.direction {
            Direction::Receipt => self.amount,
            Direction::Payment => -self.amount,
        }
    }
}

/// Opening and closing balance implied by a statement's transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementBalances {
    pub opening: Money,
    pub closing: Money,
}

impl StatementBalances {
    /// Backs the opening balance out of the first line and takes the closing
    /// balance from the last. `None` for an empty statement. An opening
    /// balance outside the decimal range is held at the limit.
    pub fn from_transactions(transactions: &[Transaction]) -> Option<Self> {
        let first = transactions.first()?;
        let last = transactions.last()?;
        Some(StatementBalances {
            opening: first.balance - first.signed_amount(),
            closing: last.balance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn money(n: i64) -> Money {
        Money::new(Decimal::from(n))
    }

    fn tx(amount: i64, direction: Direction, balance: i64) -> Transaction {
        Transaction {
            date: "01/04/2024".parse().unwrap(),
            narration: "Test".to_string(),
            amount: money(amount),
            direction,
            balance: money(balance),
        }
    }

    #[test]
    fn signed_amount_follows_direction() {
        assert_eq!(tx(500, Direction::Payment, 0).signed_amount(), money(-500));
        assert_eq!(tx(500, Direction::Receipt, 0).signed_amount(), money(500));
    }

    #[test]
    fn balances_from_payment_first() {
        let txs = vec![
            tx(500, Direction::Payment, 9_500),
            tx(1_200, Direction::Receipt, 10_700),
        ];
        let b = StatementBalances::from_transactions(&txs).unwrap();
        assert_eq!(b.opening, money(10_000));
        assert_eq!(b.closing, money(10_700));
    }

    #[test]
    fn balances_from_receipt_first() {
        let txs = vec![tx(1_200, Direction::Receipt, 3_200)];
        let b = StatementBalances::from_transactions(&txs).unwrap();
        assert_eq!(b.opening, money(2_000));
        assert_eq!(b.closing, money(3_200));
    }

    #[test]
    fn opening_balance_at_decimal_limit_does_not_panic() {
        let mut first = tx(500, Direction::Payment, 0);
        first.balance = Money::new(Decimal::MAX);
        let b = StatementBalances::from_transactions(&[first]).unwrap();
        assert_eq!(b.opening, Money::new(Decimal::MAX));
    }

    #[test]
    fn balances_of_empty_statement() {
        assert!(StatementBalances::from_transactions(&[]).is_none());
    }

    #[test]
    fn direction_roundtrip() {
        use std::str::FromStr;
        assert_eq!(Direction::from_str("receipt").unwrap(), Direction::Receipt);
        assert_eq!(Direction::from_str(" Payment ").unwrap(), Direction::Payment);
        assert!(Direction::from_str("journal").is_err());
        assert_eq!(Direction::Payment.to_string(), "Payment");
    }

    #[test]
    fn serializes_with_type_key() {
        let json = serde_json::to_value(tx(500, Direction::Payment, 9_500)).unwrap();
        assert_eq!(json["type"], "Payment");
        assert_eq!(json["date"], "01/04/2024");
        assert_eq!(json["amount"], "500");
    }
}
