use rust_decimal::Decimal;
use std::str::FromStr;

use crate::cell::RawCell;

/// Result of a coercion that also reports whether the input was unreadable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coerced {
    pub value: Decimal,
    /// Set when a non-blank cell could not be parsed and was replaced by zero.
    pub failed: bool,
}

/// Parses a currency-formatted cell into an exact decimal, returning zero for
/// anything unparseable.
pub fn coerce(raw: &RawCell) -> Decimal {
    coerce_checked(raw).value
}

pub fn coerce_checked(raw: &RawCell) -> Coerced {
    match raw {
        RawCell::Empty => Coerced {
            value: Decimal::ZERO,
            failed: false,
        },
        RawCell::Number(n) => Coerced {
            value: *n,
            failed: false,
        },
        RawCell::Text(s) => coerce_str(s),
    }
}

/// Keeps digits, `-` and `.`; drops separators, currency symbols and spaces.
pub fn coerce_str(s: &str) -> Coerced {
    let trimmed = s.trim();
    // A lone dash is how the GST portal writes "nothing here".
    if trimmed.is_empty() || trimmed == "-" {
        return Coerced {
            value: Decimal::ZERO,
            failed: false,
        };
    }

    let cleaned: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-' || *c == '.')
        .collect();

    match Decimal::from_str(&cleaned) {
        Ok(value) => Coerced {
            value,
            failed: false,
        },
        Err(_) => Coerced {
            value: Decimal::ZERO,
            failed: true,
        },
    }
}
