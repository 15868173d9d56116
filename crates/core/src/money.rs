use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub};

/// An exact currency amount.
///
/// Arithmetic keeps full precision; rounding to two places only happens in
/// `Display` and [`Money::grouped`], so long sums never drift. The operators
/// saturate at `Decimal::MAX` / `Decimal::MIN`; use the `checked_*` methods
/// to detect that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    pub fn amount(self) -> Decimal {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// `None` when the sum leaves the representable range.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Money)
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Money)
    }

    pub fn abs(self) -> Self {
        Money(self.0.abs())
    }

    /// Two-place value, half away from zero (what a ledger prints).
    pub fn rounded(self) -> Decimal {
        self.0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Two decimals with comma thousands grouping: `1234567.5` → `1,234,567.50`.
    pub fn grouped(self) -> String {
        let plain = format!("{:.2}", self.rounded());
        let (sign, digits) = match plain.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", plain.as_str()),
        };
        let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, "00"));

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (i, ch) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        format!("{sign}{grouped}.{frac_part}")
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.rounded())
    }
}

impl From<Decimal> for Money {
    fn from(d: Decimal) -> Self {
        Money(d)
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl Neg for Money {
    type Output = Self;
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |a, b| a + b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn m(s: &str) -> Money {
        Money::new(Decimal::from_str(s).unwrap())
    }

    #[test]
    fn display_two_places() {
        assert_eq!(m("175").to_string(), "175.00");
        assert_eq!(m("0.1").to_string(), "0.10");
        assert_eq!(m("-3.456").to_string(), "-3.46");
    }

    #[test]
    fn display_rounds_half_away_from_zero() {
        assert_eq!(m("2.345").to_string(), "2.35");
        assert_eq!(m("-2.345").to_string(), "-2.35");
    }

    #[test]
    fn grouped_formatting() {
        assert_eq!(m("123456.5").grouped(), "123,456.50");
        assert_eq!(m("1234567.891").grouped(), "1,234,567.89");
        assert_eq!(m("999").grouped(), "999.00");
        assert_eq!(m("-1000").grouped(), "-1,000.00");
        assert_eq!(m("0").grouped(), "0.00");
    }

    #[test]
    fn sum_keeps_precision_until_display() {
        // Three thirds of a paisa would round to 0.00 each if rounded early.
        let total: Money = std::iter::repeat(m("0.003")).take(3).sum();
        assert_eq!(total.amount(), Decimal::from_str("0.009").unwrap());
        assert_eq!(total.to_string(), "0.01");
    }

    #[test]
    fn arithmetic() {
        let mut a = m("10.50");
        a += m("0.25");
        assert_eq!(a, m("10.75"));
        assert_eq!(a - m("0.75"), m("10"));
        assert_eq!(-a, m("-10.75"));
        assert_eq!((-a).abs(), a);
        assert!(Money::zero().is_zero());
    }

    #[test]
    fn overflow_saturates_instead_of_panicking() {
        let max = Money::new(Decimal::MAX);
        assert_eq!(max.checked_add(m("1")), None);
        assert_eq!(max + max, max);

        let mut acc = max;
        acc += m("0.5");
        assert_eq!(acc, max);

        let min = Money::new(Decimal::MIN);
        assert_eq!(min.checked_sub(m("1")), None);
        assert_eq!(min - max, min);
        assert_eq!(m("1").checked_sub(m("0.25")), Some(m("0.75")));
    }

    #[test]
    fn serde_is_transparent() {
        let json = serde_json::to_string(&m("12.50")).unwrap();
        assert_eq!(json, "\"12.50\"");
    }
}
