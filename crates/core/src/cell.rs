use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell as it came out of the source file, before any coercion.
///
/// CSV readers only ever produce `Text` and `Empty`; `Number` exists for row
/// sources that already carry typed values (spreadsheet readers, JSON bodies).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum RawCell {
    #[default]
    Empty,
    Text(String),
    Number(Decimal),
}

impl RawCell {
    /// Builds a cell from text, mapping an all-whitespace value to `Empty`.
    pub fn from_text(s: &str) -> Self {
        if s.trim().is_empty() {
            RawCell::Empty
        } else {
            RawCell::Text(s.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Text(s) => s.trim().is_empty(),
            RawCell::Number(_) => false,
        }
    }

    /// The cell's original text, or the decimal's canonical rendering.
    pub fn as_text(&self) -> String {
        match self {
            RawCell::Empty => String::new(),
            RawCell::Text(s) => s.clone(),
            RawCell::Number(n) => n.to_string(),
        }
    }
}

impl fmt::Display for RawCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawCell::Empty => Ok(()),
            RawCell::Text(s) => write!(f, "{s}"),
            RawCell::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for RawCell {
    fn from(s: &str) -> Self {
        RawCell::from_text(s)
    }
}

impl From<String> for RawCell {
    fn from(s: String) -> Self {
        if s.trim().is_empty() {
            RawCell::Empty
        } else {
            RawCell::Text(s)
        }
    }
}

impl From<Decimal> for RawCell {
    fn from(n: Decimal) -> Self {
        RawCell::Number(n)
    }
}

impl From<i64> for RawCell {
    fn from(n: i64) -> Self {
        RawCell::Number(Decimal::from(n))
    }
}

/// One source row: column name to cell, kept in the file's header order.
///
/// Header order only matters for display; lookups are by name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawRow {
    cells: Vec<(String, RawCell)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pairs `headers` with `values` positionally. Missing trailing values
    /// become `Empty`; surplus values are ignored.
    pub fn from_record<'a, I>(headers: &[String], values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut values = values.into_iter();
        let cells = headers
            .iter()
            .map(|h| {
                let cell = values.next().map(RawCell::from_text).unwrap_or_default();
                (h.clone(), cell)
            })
            .collect();
        RawRow { cells }
    }

    /// Sets `column`, replacing an existing value in place.
    pub fn insert(&mut self, column: impl Into<String>, cell: impl Into<RawCell>) {
        let column = column.into();
        let cell = cell.into();
        match self.cells.iter_mut().find(|(c, _)| *c == column) {
            Some(slot) => slot.1 = cell,
            None => self.cells.push((column, cell)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&RawCell> {
        self.cells.iter().find(|(c, _)| c == column).map(|(_, v)| v)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(c, _)| c.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawCell)> {
        self.cells.iter().map(|(c, v)| (c.as_str(), v))
    }

    /// True when every cell is blank.
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, v)| v.is_empty())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for RawRow
where
    K: Into<String>,
    V: Into<RawCell>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut row = RawRow::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}
