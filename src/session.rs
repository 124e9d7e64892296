//! Import session: the preview/edit store and the submission gate.
//!
//! An [`ImportSession`] walks the state machine `Empty -> Processing -> Ready`:
//!
//! - `Empty -> Processing` when a file is dropped/selected ([`ImportSession::begin_processing`])
//! - `Processing -> Ready` when parsing succeeds; every row is validated before entering `Ready`
//! - `Processing -> Empty` when parsing fails; the message is kept in
//!   [`ImportSession::ingestion_error`]
//!
//! [`ImportSession::begin_processing`] hands out a [`ProcessingTicket`]; a result completed with a
//! ticket from a closed run is refused, so nothing carries over into the next session.
//!
//! Within `Ready`, [`ImportSession::edit_cell`] changes one cell of one row, re-validates that row
//! and rebuilds the aggregate error list from every row. Closing/reopening always resets to
//! `Empty`.
//!
//! ```rust
//! use procurement_bulk_import::ingestion::DroppedFile;
//! use procurement_bulk_import::project::ProjectContext;
//! use procurement_bulk_import::session::{ImportSession, SessionState};
//!
//! let mut session = ImportSession::new(ProjectContext::sanitary_pads());
//! let csv = "ID,Delivery_Date,State,District,School,PSU,Status,Cost\n\
//!            1,2025-01-22,MH,Pune,School A,BPCL,Shipped,abc\n";
//! session.ingest_dropped(&[DroppedFile::new("batch.csv", csv)]).unwrap();
//! assert_eq!(session.state(), SessionState::Ready);
//! assert!(!session.can_submit());
//!
//! session.edit_cell(0, "Cost", "1000").unwrap();
//! assert!(session.can_submit());
//! ```

use std::fmt;
use std::path::Path;

use crate::error::{ImportError, IngestionResult, SessionError, SubmitError};
use crate::ingestion::{self, DroppedFile, IngestionOptions, SubmissionContext, SubmissionStats};
use crate::project::ProjectContext;
use crate::submission::BulkInsert;
use crate::summary::BatchSummary;
use crate::types::{CellValue, RawRow, ValidatedRow};
use crate::validation::{self, ErrorPreview, ValidationOptions};

/// Lifecycle state of an [`ImportSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No file processed (initial state, and after close/reset/failure/submit).
    Empty,
    /// A file is being parsed; drag/drop re-entry is disabled.
    Processing,
    /// Rows are available for preview and editing.
    Ready,
}

impl SessionState {
    /// Lower-case name used in error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Processing => "processing",
            Self::Ready => "ready",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle for one processing run, returned by [`ImportSession::begin_processing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingTicket(u64);

/// Options for an [`ImportSession`].
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Options passed to ingestion; the observer also receives submission events.
    pub ingestion: IngestionOptions,
    /// Options for batch validation.
    pub validation: ValidationOptions,
}

/// In-memory preview/edit store for one bulk import.
#[derive(Debug)]
pub struct ImportSession {
    context: ProjectContext,
    options: SessionOptions,
    state: SessionState,
    source: Option<String>,
    rows: Vec<ValidatedRow>,
    errors: Vec<String>,
    ingestion_error: Option<String>,
    generation: u64,
}

impl ImportSession {
    /// Create an empty session for a project with default options.
    pub fn new(context: ProjectContext) -> Self {
        Self::with_options(context, SessionOptions::default())
    }

    /// Create an empty session with explicit options.
    pub fn with_options(context: ProjectContext, options: SessionOptions) -> Self {
        Self {
            context,
            options,
            state: SessionState::Empty,
            source: None,
            rows: Vec::new(),
            errors: Vec::new(),
            ingestion_error: None,
            generation: 0,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns `true` while a file is being parsed (busy indicator).
    pub fn is_processing(&self) -> bool {
        self.state == SessionState::Processing
    }

    /// Rows in preview order.
    pub fn rows(&self) -> &[ValidatedRow] {
        &self.rows
    }

    /// Aggregate error list (`"Row <n>: <message>"`), rebuilt after every change.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Bounded view of [`Self::errors`] for display.
    pub fn error_preview(&self) -> ErrorPreview {
        ErrorPreview::from_messages(&self.errors)
    }

    /// Message of the last ingestion failure, cleared when a new file is dropped.
    pub fn ingestion_error(&self) -> Option<&str> {
        self.ingestion_error.as_deref()
    }

    /// Name of the file being (or last successfully) processed.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Active project context.
    pub fn context(&self) -> &ProjectContext {
        &self.context
    }

    /// Summary figures for the current rows.
    pub fn summary(&self) -> BatchSummary {
        BatchSummary::from_rows(&self.rows)
    }

    /// Switch project; loaded rows are re-validated against the new context.
    pub fn set_context(&mut self, context: ProjectContext) {
        self.context = context;
        for r in &mut self.rows {
            r.errors = validation::validate_row(&r.row, &self.context);
        }
        self.rebuild_errors();
    }

    /// Enter `Processing` for `source`. Fails with [`SessionError::Busy`] if already processing.
    ///
    /// Starting from `Ready` discards the previous preview. The returned ticket must be handed
    /// back to [`Self::complete_processing`]; closing the session invalidates it.
    pub fn begin_processing(&mut self, source: impl Into<String>) -> Result<ProcessingTicket, SessionError> {
        if self.state == SessionState::Processing {
            return Err(SessionError::Busy);
        }
        self.clear_rows();
        self.ingestion_error = None;
        self.source = Some(source.into());
        self.state = SessionState::Processing;
        self.generation += 1;
        Ok(ProcessingTicket(self.generation))
    }

    /// Leave `Processing` with the parse outcome for `ticket`.
    ///
    /// On success every row is validated and the session becomes `Ready`; the row count is
    /// returned. On failure the session returns to `Empty` with no rows, the message is kept in
    /// [`Self::ingestion_error`], and the error is returned.
    ///
    /// A ticket from a run that was closed (or closed and restarted) is rejected with
    /// [`SessionError::StaleTicket`] and the session is left untouched.
    pub fn complete_processing(
        &mut self,
        ticket: ProcessingTicket,
        result: IngestionResult<Vec<RawRow>>,
    ) -> Result<usize, ImportError> {
        if ticket.0 != self.generation {
            return Err(SessionError::StaleTicket.into());
        }
        if self.state != SessionState::Processing {
            return Err(SessionError::NotProcessing.into());
        }
        match result {
            Ok(raw) => {
                self.rows = validation::validate_all(raw, &self.context, &self.options.validation);
                self.rebuild_errors();
                self.state = SessionState::Ready;
                Ok(self.rows.len())
            }
            Err(e) => {
                self.clear_rows();
                self.source = None;
                self.ingestion_error = Some(e.to_string());
                self.state = SessionState::Empty;
                Err(e.into())
            }
        }
    }

    /// Parse a file on disk into the preview.
    pub fn ingest_from_path(&mut self, path: impl AsRef<Path>) -> Result<usize, ImportError> {
        let path = path.as_ref();
        let ticket = self.begin_processing(path.display().to_string())?;
        let result = ingestion::ingest_from_path(path, &self.options.ingestion);
        self.complete_processing(ticket, result)
    }

    /// Parse a drag/drop payload (exactly one file) into the preview.
    pub fn ingest_dropped(&mut self, files: &[DroppedFile]) -> Result<usize, ImportError> {
        let source = files.iter().map(|f| f.name.as_str()).collect::<Vec<_>>().join(",");
        let ticket = self.begin_processing(source)?;
        let result = ingestion::ingest_dropped(files, &self.options.ingestion);
        self.complete_processing(ticket, result)
    }

    /// Set one cell of one row, re-validate that row, and rebuild the aggregate error list.
    ///
    /// Blank input clears the cell. Unknown columns are added to the row.
    pub fn edit_cell(
        &mut self,
        row_index: usize,
        column: &str,
        value: impl Into<CellValue>,
    ) -> Result<(), SessionError> {
        self.ensure_ready()?;
        let len = self.rows.len();
        let target = self
            .rows
            .get_mut(row_index)
            .ok_or(SessionError::RowOutOfRange { index: row_index, len })?;

        target.row.set(column, value);
        target.errors = validation::validate_row(&target.row, &self.context);
        self.rebuild_errors();
        Ok(())
    }

    /// Drop one row from the preview and rebuild the aggregate error list.
    pub fn remove_row(&mut self, row_index: usize) -> Result<ValidatedRow, SessionError> {
        self.ensure_ready()?;
        if row_index >= self.rows.len() {
            return Err(SessionError::RowOutOfRange {
                index: row_index,
                len: self.rows.len(),
            });
        }
        let removed = self.rows.remove(row_index);
        self.rebuild_errors();
        Ok(removed)
    }

    /// Close the dialog: discard everything and return to `Empty`.
    ///
    /// Any outstanding [`ProcessingTicket`] is invalidated.
    pub fn close(&mut self) {
        self.generation += 1;
        self.clear_rows();
        self.source = None;
        self.ingestion_error = None;
        self.state = SessionState::Empty;
    }

    /// Reopen the dialog. Nothing carries over from a previous session.
    pub fn reopen(&mut self) {
        self.close();
    }

    /// Why submission is currently blocked, or `None` if the gate is open.
    pub fn submit_blocker(&self) -> Option<String> {
        if self.state != SessionState::Ready {
            return Some(format!("no rows are loaded (session is {})", self.state));
        }
        if self.rows.is_empty() {
            return Some("the file contains no rows".to_string());
        }
        if !self.errors.is_empty() {
            return Some(format!("{} validation errors must be fixed first", self.errors.len()));
        }
        None
    }

    /// `true` when `Ready`, non-empty, and free of validation errors.
    pub fn can_submit(&self) -> bool {
        self.submit_blocker().is_none()
    }

    /// Hand the batch to `sink` and close the session.
    ///
    /// When the gate is closed nothing is forwarded and state is unchanged. Otherwise the rows are
    /// copied (without error annotations), the session resets to `Empty`, and the collaborator is
    /// called once. A collaborator failure is reported to the observer and returned; the batch is
    /// not re-queued.
    pub fn submit(&mut self, sink: &dyn BulkInsert) -> Result<usize, SubmitError> {
        if let Some(reason) = self.submit_blocker() {
            return Err(SubmitError::Blocked { reason });
        }

        let batch: Vec<RawRow> = self.rows.iter().map(|r| r.row.clone()).collect();
        let stats = SubmissionStats { rows: batch.len() };
        let ctx = SubmissionContext {
            project: self.context.name.clone(),
            source: self.source.clone(),
        };
        self.close();

        let observer = self.options.ingestion.observer.as_ref();
        match sink.insert_batch(batch) {
            Ok(()) => {
                if let Some(obs) = observer {
                    obs.on_submitted(&ctx, stats);
                }
                Ok(stats.rows)
            }
            Err(source) => {
                if let Some(obs) = observer {
                    obs.on_submit_failed(&ctx, stats, source.as_ref());
                }
                Err(SubmitError::Collaborator {
                    rows: stats.rows,
                    source,
                })
            }
        }
    }

    fn ensure_ready(&self) -> Result<(), SessionError> {
        if self.state == SessionState::Ready {
            Ok(())
        } else {
            Err(SessionError::NotReady {
                state: self.state.as_str(),
            })
        }
    }

    fn clear_rows(&mut self) {
        self.rows.clear();
        self.errors.clear();
    }

    // Per-row errors are already computed; this only re-labels them.
    fn rebuild_errors(&mut self) {
        self.errors = validation::aggregate(&self.rows);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IngestionError;

    const HEADER: &str = "ID,Delivery_Date,State,District,School,PSU,Status,Cost";

    fn ready_session(body: &str) -> ImportSession {
        let mut session = ImportSession::new(ProjectContext::sanitary_pads());
        let csv = format!("{HEADER}\n{body}");
        session
            .ingest_dropped(&[DroppedFile::new("batch.csv", csv)])
            .unwrap();
        session
    }

    #[test]
    fn begin_twice_is_busy() {
        let mut session = ImportSession::new(ProjectContext::sanitary_pads());
        let _ticket = session.begin_processing("a.csv").unwrap();
        assert!(session.is_processing());
        assert_eq!(session.begin_processing("b.csv"), Err(SessionError::Busy));
        assert_eq!(session.source(), Some("a.csv"));
    }

    #[test]
    fn complete_without_begin_is_rejected() {
        let mut session = ImportSession::new(ProjectContext::sanitary_pads());
        let err = session.complete_processing(ProcessingTicket(0), Ok(vec![])).unwrap_err();
        assert!(matches!(err, ImportError::Session(SessionError::NotProcessing)));
        assert_eq!(session.state(), SessionState::Empty);
    }

    #[test]
    fn result_from_closed_run_is_not_adopted() {
        let mut session = ImportSession::new(ProjectContext::sanitary_pads());
        let old = session.begin_processing("old.csv").unwrap();
        session.close();
        let current = session.begin_processing("new.csv").unwrap();

        let stale_rows = vec![RawRow::from_pairs([("ID", "1")])];
        let err = session.complete_processing(old, Ok(stale_rows)).unwrap_err();
        assert!(matches!(err, ImportError::Session(SessionError::StaleTicket)));
        assert_eq!(session.state(), SessionState::Processing);
        assert_eq!(session.source(), Some("new.csv"));
        assert!(session.rows().is_empty());

        assert_eq!(session.complete_processing(current, Ok(vec![])).unwrap(), 0);
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[test]
    fn ticket_is_spent_after_close() {
        let mut session = ImportSession::new(ProjectContext::sanitary_pads());
        let ticket = session.begin_processing("a.csv").unwrap();
        session.close();
        let err = session.complete_processing(ticket, Ok(vec![])).unwrap_err();
        assert!(matches!(err, ImportError::Session(SessionError::StaleTicket)));
        assert_eq!(session.state(), SessionState::Empty);
    }

    #[test]
    fn failed_parse_returns_to_empty() {
        let mut session = ImportSession::new(ProjectContext::sanitary_pads());
        let ticket = session.begin_processing("bad.csv").unwrap();
        let err = session
            .complete_processing(ticket, Err(IngestionError::Malformed {
                message: "boom".to_string(),
            }))
            .unwrap_err();
        assert!(matches!(err, ImportError::Ingestion(_)));
        assert_eq!(session.state(), SessionState::Empty);
        assert!(session.rows().is_empty());
        assert_eq!(session.ingestion_error(), Some("malformed input: boom"));
    }

    #[test]
    fn edit_only_touches_one_row() {
        let mut session = ready_session(
            "1,2025-01-22,MH,Pune,School A,BPCL,Shipped,abc\n\
             2,2025-01-23,MH,Pune,School B,BPCL,Lost,1000\n\
             3,2025-01-24,MH,Pune,School C,BPCL,Pending,900\n",
        );
        let before: Vec<usize> = session.rows().iter().map(|r| r.errors.len()).collect();
        assert_eq!(before, vec![1, 1, 0]);

        session.edit_cell(0, "Cost", "1,000").unwrap();
        let after: Vec<usize> = session.rows().iter().map(|r| r.errors.len()).collect();
        assert_eq!(after, vec![0, 1, 0]);
        assert_eq!(session.errors().len(), 1);
        assert!(session.errors()[0].starts_with("Row 2: Invalid status."));
    }

    #[test]
    fn edit_out_of_range_and_not_ready() {
        let mut session = ready_session("1,2025-01-22,MH,Pune,School A,BPCL,Shipped,1000\n");
        assert_eq!(
            session.edit_cell(5, "Cost", "1"),
            Err(SessionError::RowOutOfRange { index: 5, len: 1 })
        );
        session.close();
        assert_eq!(
            session.edit_cell(0, "Cost", "1"),
            Err(SessionError::NotReady { state: "empty" })
        );
    }

    #[test]
    fn remove_row_reaggregates() {
        let mut session = ready_session(
            "1,2025-01-22,MH,Pune,School A,BPCL,Shipped,abc\n\
             2,2025-01-23,MH,Pune,School B,BPCL,Shipped,1000\n",
        );
        assert!(!session.can_submit());
        session.remove_row(0).unwrap();
        assert!(session.errors().is_empty());
        assert!(session.can_submit());
    }

    #[test]
    fn switching_project_revalidates_rows() {
        let mut session = ready_session("1,2025-01-22,MH,Pune,School A,BPCL,Shipped,1000\n");
        assert!(session.can_submit());
        session.set_context(ProjectContext::devices(["Laptop"]));
        assert_eq!(session.errors().to_vec(), vec!["Row 1: Missing Category".to_string()]);
    }

    #[test]
    fn blocked_submit_keeps_state() {
        let mut session = ready_session("1,2025-01-22,MH,Pune,School A,BPCL,Shipped,abc\n");
        let sink = |_rows: Vec<RawRow>| -> Result<(), crate::error::BoxError> { Ok(()) };
        let err = session.submit(&sink).unwrap_err();
        assert!(matches!(err, SubmitError::Blocked { .. }));
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.rows().len(), 1);
    }
}
