use thiserror::Error;

/// Convenience result type for ingestion operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Boxed error returned by external collaborators (e.g. a bulk-insert backend).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type returned by ingestion functions.
///
/// This is a single error enum shared across CSV and (optional) Excel ingestion. Every variant is
/// terminal for the current upload attempt; the caller has to retry with a new file.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "excel")]
    /// Excel ingestion error (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// CSV ingestion error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The file extension is neither CSV nor a supported Excel workbook.
    #[error("Only CSV and Excel files are supported")]
    UnsupportedFormat { file_name: String },

    /// A drop/selection carried zero or several files.
    #[error("Please upload exactly one file")]
    FileCount { count: usize },

    /// The input could be read but does not have a usable shape (no header row, no sheets, ...).
    #[error("malformed input: {message}")]
    Malformed { message: String },
}

/// Errors raised by [`crate::session::ImportSession`] state transitions and edits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// A file is already being processed; drag/drop re-entry is disabled.
    #[error("a file is already being processed")]
    Busy,

    /// The operation needs parsed rows but the session is not in the `Ready` state.
    #[error("no rows are loaded (session is {state})")]
    NotReady { state: &'static str },

    /// `complete_processing` was called without a matching `begin_processing`.
    #[error("no file is being processed")]
    NotProcessing,

    /// The parse result belongs to a processing run that was closed or replaced.
    #[error("the file being completed is no longer the one in progress")]
    StaleTicket,

    /// The row index does not exist in the preview.
    #[error("row {index} is out of range ({len} rows loaded)")]
    RowOutOfRange { index: usize, len: usize },
}

/// Errors returned by [`crate::session::ImportSession::submit`].
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The submission gate is closed; nothing was forwarded and session state is unchanged.
    #[error("submission blocked: {reason}")]
    Blocked { reason: String },

    /// The bulk-insert collaborator reported a failure after the batch was handed off.
    #[error("bulk insert failed for {rows} rows: {source}")]
    Collaborator {
        rows: usize,
        #[source]
        source: BoxError,
    },
}

/// Errors raised while loading a [`crate::project::ProjectContext`] from configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration is not valid JSON for a project context.
    #[error("invalid project config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors returned by the import session's ingestion wrappers.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The session refused the transition (e.g. a file is already being processed).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The file could not be ingested; the session is back to `Empty`.
    #[error(transparent)]
    Ingestion(#[from] IngestionError),
}
