//! Row validation.
//!
//! [`validate_row`] is a pure function of `(row, project context)` returning an ordered list of
//! error messages. Every rule runs, so a row can carry several errors:
//!
//! 1. required-field presence (`Missing <column>`)
//! 2. delivery date validity
//! 3. numeric cost
//! 4. status membership
//! 5. category membership (device procurement only)
//!
//! [`aggregate`] flattens per-row errors into the batch-level list shown above the preview, and
//! [`ErrorPreview`] bounds how much of that list is displayed.
//!
//! ```rust
//! use procurement_bulk_import::project::ProjectContext;
//! use procurement_bulk_import::types::RawRow;
//! use procurement_bulk_import::validation::validate_row;
//!
//! let row = RawRow::from_pairs([
//!     ("ID", "1"),
//!     ("Delivery_Date", "2025-01-22"),
//!     ("State", "MH"),
//!     ("District", "Pune"),
//!     ("School", "School A"),
//!     ("PSU", "BPCL"),
//!     ("Status", "Shipped"),
//!     ("Cost", "abc"),
//! ]);
//! let errors = validate_row(&row, &ProjectContext::sanitary_pads());
//! assert_eq!(errors, vec!["Cost must be a number".to_string()]);
//! ```

pub mod rules;

use std::fmt;

use rayon::prelude::*;

use crate::project::{
    ProjectContext, ALLOWED_STATUSES, FIELD_CATEGORY, FIELD_COST, FIELD_DELIVERY_DATE, FIELD_STATUS,
};
use crate::types::{CellValue, RawRow, ValidatedRow};

use rules::{parse_cost, parse_delivery_date};

/// Number of aggregate messages shown before collapsing the rest into a count.
pub const PREVIEW_LIMIT: usize = 5;

/// Options controlling batch validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Batches with at least this many rows are validated on the rayon pool.
    ///
    /// Output order always matches input order.
    pub parallel_threshold: usize,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            parallel_threshold: 2_048,
        }
    }
}

/// Validate a single row against the project context.
pub fn validate_row(row: &RawRow, ctx: &ProjectContext) -> Vec<String> {
    let kind = ctx.kind();
    let mut errors = Vec::new();

    for field in kind.required_fields() {
        if row.is_missing(field) {
            errors.push(format!("Missing {field}"));
        }
    }

    if let Some(cell) = present(row, FIELD_DELIVERY_DATE) {
        if parse_delivery_date(cell).is_none() {
            errors.push("Invalid delivery date format".to_string());
        }
    }

    if let Some(cell) = present(row, FIELD_COST) {
        if parse_cost(cell).is_none() {
            errors.push("Cost must be a number".to_string());
        }
    }

    if let Some(cell) = present(row, FIELD_STATUS) {
        let value = cell.to_string();
        if !ALLOWED_STATUSES.contains(&value.as_str()) {
            errors.push(format!(
                "Invalid status. Must be one of: {}",
                ALLOWED_STATUSES.join(", ")
            ));
        }
    }

    if kind.uses_category() {
        if let Some(cell) = present(row, FIELD_CATEGORY) {
            let value = cell.to_string();
            if !ctx.allows_category(&value) {
                errors.push(format!(
                    "Invalid item category: {value}. Must be one of: {}",
                    ctx.categories.join(", ")
                ));
            }
        }
    }

    errors
}

fn present<'a>(row: &'a RawRow, column: &str) -> Option<&'a CellValue> {
    row.get(column).filter(|cell| !cell.is_blank())
}

/// Promote a raw row to a validated row.
pub fn validate(row: RawRow, ctx: &ProjectContext) -> ValidatedRow {
    let errors = validate_row(&row, ctx);
    ValidatedRow { row, errors }
}

/// Validate every row of a freshly parsed batch.
pub fn validate_all(rows: Vec<RawRow>, ctx: &ProjectContext, options: &ValidationOptions) -> Vec<ValidatedRow> {
    if rows.len() >= options.parallel_threshold {
        rows.into_par_iter().map(|row| validate(row, ctx)).collect()
    } else {
        rows.into_iter().map(|row| validate(row, ctx)).collect()
    }
}

/// Collect every row's errors in row order, each prefixed with its 1-based row number.
pub fn aggregate(rows: &[ValidatedRow]) -> Vec<String> {
    rows.iter()
        .enumerate()
        .flat_map(|(idx0, r)| {
            r.errors
                .iter()
                .map(move |e| format!("Row {}: {e}", idx0 + 1))
        })
        .collect()
}

/// Bounded view of the aggregate error list: the first [`PREVIEW_LIMIT`] messages plus a count.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorPreview {
    /// Messages to display.
    pub shown: Vec<String>,
    /// Number of messages not displayed.
    pub remaining: usize,
}

impl ErrorPreview {
    /// Build a preview from the full aggregate list.
    pub fn from_messages(messages: &[String]) -> Self {
        let shown: Vec<String> = messages.iter().take(PREVIEW_LIMIT).cloned().collect();
        Self {
            remaining: messages.len() - shown.len(),
            shown,
        }
    }

    /// Total number of messages (shown + remaining).
    pub fn total(&self) -> usize {
        self.shown.len() + self.remaining
    }

    /// Returns `true` if there is nothing to show.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl fmt::Display for ErrorPreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, msg) in self.shown.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            f.write_str(msg)?;
        }
        if self.remaining > 0 {
            write!(f, "\n...and {} more errors", self.remaining)?;
        }
        Ok(())
    }
}
