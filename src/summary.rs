//! Batch summary shown next to the import preview.

use crate::project::{FIELD_COST, FIELD_STATUS};
use crate::types::ValidatedRow;
use crate::validation::rules::parse_cost;

/// Aggregate figures for a previewed batch.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchSummary {
    /// Number of rows in the batch.
    pub rows: usize,
    /// Number of rows carrying at least one error.
    pub rows_with_errors: usize,
    /// Sum of every cost that parses; rows with a missing or invalid cost are ignored.
    pub total_cost: f64,
    /// Row count per status value, in first-seen order. Blank statuses are not counted.
    pub status_counts: Vec<(String, usize)>,
}

impl BatchSummary {
    /// Summarize `rows`.
    pub fn from_rows(rows: &[ValidatedRow]) -> Self {
        rows.iter().fold(Self::default(), |mut acc, r| {
            acc.rows += 1;
            if r.has_errors() {
                acc.rows_with_errors += 1;
            }
            if let Some(cost) = r.row.get(FIELD_COST).and_then(parse_cost) {
                acc.total_cost += cost;
            }
            if let Some(status) = r.row.get(FIELD_STATUS).filter(|c| !c.is_blank()) {
                let status = status.to_string();
                match acc.status_counts.iter_mut().find(|(s, _)| *s == status) {
                    Some((_, n)) => *n += 1,
                    None => acc.status_counts.push((status, 1)),
                }
            }
            acc
        })
    }

    /// Number of rows without errors.
    pub fn valid_rows(&self) -> usize {
        self.rows - self.rows_with_errors
    }
}
