//! Core data model types for bulk import.
//!
//! Ingestion produces [`RawRow`]s (column name -> [`CellValue`], in header order). The validator
//! promotes them to [`ValidatedRow`]s by attaching the current list of error messages.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// A single raw cell value as produced by a file parser.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// Missing/blank cell.
    #[default]
    Empty,
    /// Text cell (trimmed).
    Text(String),
    /// Numeric cell (Excel only; CSV cells are always text).
    Number(f64),
}

impl CellValue {
    /// Build a cell from user-entered text. Blank input becomes [`CellValue::Empty`].
    pub fn text(s: impl AsRef<str>) -> Self {
        let trimmed = s.as_ref().trim();
        if trimmed.is_empty() {
            Self::Empty
        } else {
            Self::Text(trimmed.to_owned())
        }
    }

    /// Returns `true` for `Empty` and for whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(_) => false,
        }
    }

    /// Text content, if this is a text cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{n}")
                }
            }
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::text(s)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Empty => serializer.serialize_none(),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Number(n) => serializer.serialize_f64(*n),
        }
    }
}

/// An unvalidated record: column name -> raw cell value, in header order.
///
/// Column names are matched case-sensitively.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRow {
    cells: Vec<(String, CellValue)>,
}

impl RawRow {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from `(column, value)` pairs. Later duplicates overwrite earlier ones.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<CellValue>,
    {
        let mut row = Self::new();
        for (k, v) in pairs {
            row.set(k, v);
        }
        row
    }

    /// Returns the cell for `column`, if the column exists.
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(c, _)| c == column).map(|(_, v)| v)
    }

    /// Set `column` to `value`, appending the column if it does not exist yet.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<CellValue>) {
        let column = column.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(c, _)| *c == column) {
            Some((_, slot)) => *slot = value,
            None => self.cells.push((column, value)),
        }
    }

    /// Returns `true` if the column is absent or blank.
    pub fn is_missing(&self, column: &str) -> bool {
        self.get(column).is_none_or(CellValue::is_blank)
    }

    /// Iterate column names in order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(c, _)| c.as_str())
    }

    /// Iterate `(column, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(c, v)| (c.as_str(), v))
    }

    /// Number of columns in the row.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns `true` if every cell is blank (such rows are skipped at ingestion).
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, v)| v.is_blank())
    }
}

impl Serialize for RawRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (column, value) in &self.cells {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// A [`RawRow`] annotated with its current validation errors.
///
/// `errors` is always consistent with `row`: the import session re-validates after every edit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidatedRow {
    /// Raw cell values.
    pub row: RawRow,
    /// Ordered, human-readable error messages (empty when the row is submit-eligible).
    pub errors: Vec<String>,
}

impl ValidatedRow {
    /// Returns `true` if this row blocks submission.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
