use std::error::Error as StdError;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::error::IngestionError;

use super::unified::IngestionFormat;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ImportSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (operation failed).
    Error,
    /// Critical error (typically I/O or other infrastructure failures).
    Critical,
}

impl ImportSeverity {
    /// Classify an ingestion failure.
    ///
    /// I/O failures (including I/O wrapped by the CSV reader) are `Critical`; wrong file types,
    /// wrong file counts and malformed content are `Error`.
    pub fn for_ingestion_error(e: &IngestionError) -> Self {
        match e {
            IngestionError::Io(_) => Self::Critical,
            IngestionError::Csv(err) => match err.kind() {
                ::csv::ErrorKind::Io(_) => Self::Critical,
                _ => Self::Error,
            },
            #[cfg(feature = "excel")]
            IngestionError::Excel(err) => {
                if error_chain_contains_io(err) {
                    Self::Critical
                } else {
                    Self::Error
                }
            }
            IngestionError::UnsupportedFormat { .. } => Self::Error,
            IngestionError::FileCount { .. } => Self::Error,
            IngestionError::Malformed { .. } => Self::Error,
        }
    }
}

#[cfg(feature = "excel")]
fn error_chain_contains_io(e: &(dyn StdError + 'static)) -> bool {
    let mut cur: Option<&(dyn StdError + 'static)> = Some(e);
    while let Some(err) = cur {
        if err.is::<std::io::Error>() {
            return true;
        }
        cur = err.source();
    }
    false
}
/// Context about an ingestion attempt.
#[derive(Debug, Clone)]
pub struct IngestionContext {
    /// File name (or path) of the upload.
    pub source: String,
    /// Detected format; `None` when the extension is not supported.
    pub format: Option<IngestionFormat>,
}

impl fmt::Display for IngestionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let format = match self.format {
            Some(IngestionFormat::Csv) => "csv",
            Some(IngestionFormat::Excel) => "excel",
            None => "unsupported",
        };
        write!(f, "file={} format={format}", self.source)
    }
}

/// Context about a batch handed to the bulk-insert collaborator.
#[derive(Debug, Clone)]
pub struct SubmissionContext {
    /// Project the batch belongs to.
    pub project: String,
    /// File the rows were parsed from, when known.
    pub source: Option<String>,
}

impl fmt::Display for SubmissionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "project={:?}", self.project)?;
        if let Some(source) = &self.source {
            write!(f, " file={source}")?;
        }
        Ok(())
    }
}

/// Stats reported on successful ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionStats {
    /// Number of parsed (non-blank) rows.
    pub rows: usize,
}

/// Stats reported when a batch is handed to the bulk-insert collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionStats {
    /// Number of rows forwarded.
    pub rows: usize,
}

/// Observer interface for import outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait ImportObserver: Send + Sync {
    /// Called when ingestion succeeds.
    fn on_success(&self, _ctx: &IngestionContext, _stats: IngestionStats) {}

    /// Called when ingestion fails.
    fn on_failure(&self, _ctx: &IngestionContext, _severity: ImportSeverity, _error: &IngestionError) {}

    /// Called when an ingestion failure meets an alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &IngestionContext, severity: ImportSeverity, error: &IngestionError) {
        self.on_failure(ctx, severity, error)
    }

    /// Called after a batch was accepted by the bulk-insert collaborator.
    fn on_submitted(&self, _ctx: &SubmissionContext, _stats: SubmissionStats) {}

    /// Called when the bulk-insert collaborator rejects a batch.
    fn on_submit_failed(
        &self,
        _ctx: &SubmissionContext,
        _stats: SubmissionStats,
        _error: &(dyn StdError + Send + Sync + 'static),
    ) {
    }
}

/// Forwards every callback to each wrapped observer, in order.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn ImportObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn ImportObserver>>) -> Self {
        Self { observers }
    }

    fn each(&self, f: impl Fn(&dyn ImportObserver)) {
        self.observers.iter().for_each(|o| f(o.as_ref()));
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl ImportObserver for CompositeObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.each(|o| o.on_success(ctx, stats));
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: ImportSeverity, error: &IngestionError) {
        self.each(|o| o.on_failure(ctx, severity, error));
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: ImportSeverity, error: &IngestionError) {
        self.each(|o| o.on_alert(ctx, severity, error));
    }

    fn on_submitted(&self, ctx: &SubmissionContext, stats: SubmissionStats) {
        self.each(|o| o.on_submitted(ctx, stats));
    }

    fn on_submit_failed(
        &self,
        ctx: &SubmissionContext,
        stats: SubmissionStats,
        error: &(dyn StdError + Send + Sync + 'static),
    ) {
        self.each(|o| o.on_submit_failed(ctx, stats, error));
    }
}

/// One log line per import event; shared by [`StdErrObserver`] and [`FileObserver`].
enum ImportEvent<'a> {
    Parsed(&'a IngestionContext, IngestionStats),
    ParseFailed {
        ctx: &'a IngestionContext,
        severity: ImportSeverity,
        alert: bool,
        error: &'a IngestionError,
    },
    Submitted(&'a SubmissionContext, SubmissionStats),
    SubmitFailed(&'a SubmissionContext, SubmissionStats, &'a (dyn StdError + Send + Sync + 'static)),
}

impl fmt::Display for ImportEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parsed(ctx, stats) => write!(f, "parsed {ctx} rows={}", stats.rows),
            Self::ParseFailed {
                ctx,
                severity,
                alert,
                error,
            } => {
                let tag = if *alert { "ALERT " } else { "" };
                write!(f, "{tag}parse failed severity={severity:?} {ctx} err={error}")
            }
            Self::Submitted(ctx, stats) => write!(f, "submitted {ctx} rows={}", stats.rows),
            Self::SubmitFailed(ctx, stats, error) => {
                write!(f, "submit failed {ctx} rows={} err={error}", stats.rows)
            }
        }
    }
}

/// Logs import events to stderr, prefixed with `[import]`.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl StdErrObserver {
    fn emit(&self, event: ImportEvent<'_>) {
        eprintln!("[import] {event}");
    }
}

impl ImportObserver for StdErrObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.emit(ImportEvent::Parsed(ctx, stats));
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: ImportSeverity, error: &IngestionError) {
        self.emit(ImportEvent::ParseFailed {
            ctx,
            severity,
            alert: false,
            error,
        });
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: ImportSeverity, error: &IngestionError) {
        self.emit(ImportEvent::ParseFailed {
            ctx,
            severity,
            alert: true,
            error,
        });
    }

    fn on_submitted(&self, ctx: &SubmissionContext, stats: SubmissionStats) {
        self.emit(ImportEvent::Submitted(ctx, stats));
    }

    fn on_submit_failed(
        &self,
        ctx: &SubmissionContext,
        stats: SubmissionStats,
        error: &(dyn StdError + Send + Sync + 'static),
    ) {
        self.emit(ImportEvent::SubmitFailed(ctx, stats, error));
    }
}

/// Appends timestamped import events to a log file.
///
/// Writes are best-effort; a log file that cannot be opened is skipped silently.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn emit(&self, event: ImportEvent<'_>) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{} {event}", Utc::now().to_rfc3339());
        }
    }
}

impl ImportObserver for FileObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.emit(ImportEvent::Parsed(ctx, stats));
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: ImportSeverity, error: &IngestionError) {
        self.emit(ImportEvent::ParseFailed {
            ctx,
            severity,
            alert: false,
            error,
        });
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: ImportSeverity, error: &IngestionError) {
        self.emit(ImportEvent::ParseFailed {
            ctx,
            severity,
            alert: true,
            error,
        });
    }

    fn on_submitted(&self, ctx: &SubmissionContext, stats: SubmissionStats) {
        self.emit(ImportEvent::Submitted(ctx, stats));
    }

    fn on_submit_failed(
        &self,
        ctx: &SubmissionContext,
        stats: SubmissionStats,
        error: &(dyn StdError + Send + Sync + 'static),
    ) {
        self.emit(ImportEvent::SubmitFailed(ctx, stats, error));
    }
}
