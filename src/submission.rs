//! Bulk-insert collaborator seam.
//!
//! The import session hands an error-free batch to a [`BulkInsert`] implementation by value. The
//! collaborator owns persistence; its failures are reported but never retried here.

use std::io::Write;
use std::sync::Mutex;

use crate::error::BoxError;
use crate::types::RawRow;

/// External persistence for a validated batch.
pub trait BulkInsert {
    /// Persist `rows`. The rows carry no validation annotations.
    fn insert_batch(&self, rows: Vec<RawRow>) -> Result<(), BoxError>;
}

impl<F> BulkInsert for F
where
    F: Fn(Vec<RawRow>) -> Result<(), BoxError>,
{
    fn insert_batch(&self, rows: Vec<RawRow>) -> Result<(), BoxError> {
        self(rows)
    }
}

/// Writes each submitted batch as a JSON array of objects (column order preserved).
///
/// Useful as a hand-off to an HTTP client or for dumping a batch to disk.
#[derive(Debug)]
pub struct JsonArraySink<W: Write> {
    writer: Mutex<W>,
}

impl<W: Write> JsonArraySink<W> {
    /// Wrap a writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write> BulkInsert for JsonArraySink<W> {
    fn insert_batch(&self, rows: Vec<RawRow>) -> Result<(), BoxError> {
        let mut w = self.writer.lock().map_err(|_| "json sink writer lock poisoned")?;
        serde_json::to_writer(&mut *w, &rows)?;
        w.write_all(b"\n")?;
        w.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{BulkInsert, JsonArraySink};
    use crate::types::RawRow;

    #[test]
    fn json_sink_writes_one_array_per_batch() {
        let sink = JsonArraySink::new(Vec::new());
        sink.insert_batch(vec![RawRow::from_pairs([("ID", "1"), ("Cost", "10")])])
            .unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out, "[{\"ID\":\"1\",\"Cost\":\"10\"}]\n");
    }

    #[test]
    fn closures_are_collaborators() {
        let insert = |rows: Vec<RawRow>| -> Result<(), crate::error::BoxError> {
            if rows.is_empty() { Err("empty".into()) } else { Ok(()) }
        };
        assert!(insert.insert_batch(vec![RawRow::new()]).is_ok());
        assert!(insert.insert_batch(Vec::new()).is_err());
    }
}
