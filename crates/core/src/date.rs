use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime};
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::cell::RawCell;

/// Inclusive window of plausible spreadsheet serials (roughly 1927 to 2064).
pub const SERIAL_MIN: i64 = 10_000;
pub const SERIAL_MAX: i64 = 60_000;

const CANONICAL_FORMAT: &str = "%d/%m/%Y";

fn canonical_pattern() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"^([0-9]{2})/([0-9]{2})/([0-9]{4})$").expect("invalid regex"))
}

/// Day zero of the spreadsheet calendar. Two days before 1900-01-01 absorbs
/// both the 1-based count and the phantom 29/02/1900.
fn serial_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).expect("valid epoch")
}

/// Fallback spellings tried after the serial and `DD/MM/YYYY` checks.
/// Day-first is intentional: Indian bank exports write `5/3/2024` for
/// 5 March, so day-first variants precede every other ordering.
const DATE_FORMATS: &[&str] = &[
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d-%b-%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d/%m/%y",
    "%d-%b-%y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
];

/// A date in canonical `DD/MM/YYYY` form, or the explicit "no date" value.
///
/// Serializes as the formatted string (`""` when empty), so whatever is handed
/// to an exporter is always either a valid date or blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct CanonicalDate(Option<NaiveDate>);

impl CanonicalDate {
    pub const EMPTY: CanonicalDate = CanonicalDate(None);

    pub fn from_date(date: NaiveDate) -> Self {
        CanonicalDate(Some(date))
    }

    pub fn date(self) -> Option<NaiveDate> {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0.is_none()
    }
}

impl fmt::Display for CanonicalDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(d) => write!(f, "{}", d.format(CANONICAL_FORMAT)),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a DD/MM/YYYY date: '{0}'")]
pub struct CanonicalDateError(pub String);

impl FromStr for CanonicalDate {
    type Err = CanonicalDateError;

    /// Strict parse: only `DD/MM/YYYY` or blank is accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(CanonicalDate::EMPTY);
        }
        parse_canonical(s)
            .map(CanonicalDate::from_date)
            .ok_or_else(|| CanonicalDateError(s.to_string()))
    }
}

impl Serialize for CanonicalDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CanonicalDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Normalizes any raw cell to a canonical date.
///
/// Priority: blank, spreadsheet serial in `[SERIAL_MIN, SERIAL_MAX]`, exact
/// `DD/MM/YYYY`, then the general formats. Failure at every step is
/// `CanonicalDate::EMPTY`, never a substitute date.
pub fn normalize(raw: &RawCell) -> CanonicalDate {
    match raw {
        RawCell::Empty => CanonicalDate::EMPTY,
        RawCell::Number(n) => from_serial(*n).map_or(CanonicalDate::EMPTY, CanonicalDate::from_date),
        RawCell::Text(s) => normalize_str(s),
    }
}

pub fn normalize_str(s: &str) -> CanonicalDate {
    let s = s.trim();
    if s.is_empty() {
        return CanonicalDate::EMPTY;
    }

    if let Ok(n) = Decimal::from_str(s) {
        // A bare number outside the serial window is an ID or an amount,
        // not a date.
        return from_serial(n).map_or(CanonicalDate::EMPTY, CanonicalDate::from_date);
    }

    if canonical_pattern().is_match(s) {
        return parse_canonical(s).map_or(CanonicalDate::EMPTY, CanonicalDate::from_date);
    }

    parse_general(s).map_or(CanonicalDate::EMPTY, CanonicalDate::from_date)
}

/// Whether [`normalize`] would produce a date for this cell.
pub fn is_valid_date(raw: &RawCell) -> bool {
    !normalize(raw).is_empty()
}

/// Converts a spreadsheet day count. Any fractional part is a time of day and
/// is dropped.
pub fn from_serial(n: Decimal) -> Option<NaiveDate> {
    if n < Decimal::from(SERIAL_MIN) || n > Decimal::from(SERIAL_MAX) {
        return None;
    }
    let days = n.trunc().to_u64()?;
    serial_epoch().checked_add_days(Days::new(days))
}

fn parse_canonical(s: &str) -> Option<NaiveDate> {
    let caps = canonical_pattern().captures(s)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    // from_ymd_opt rejects 31/02 and friends, so the parts round-trip.
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_general(s: &str) -> Option<NaiveDate> {
    let parsed = DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_rfc2822(s))
        .map(|dt| dt.naive_local().date())
        .ok()
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        })?;

    // The canonical form has a four-digit year; anything else came from a
    // short or mangled year field.
    (1000..=9999).contains(&parsed.year()).then_some(parsed)
}
