//! `procurement-bulk-import` implements the bulk-import pipeline behind a procurement-tracking
//! dashboard: a user drops a CSV or Excel file of delivery records, every row is validated, the
//! rows are previewed and edited in place, and the batch is forwarded to a bulk-insert backend
//! only once it is free of errors.
//!
//! ```text
//! file -> parse -> validate-all -> editable preview -> (edit) re-validate row -> re-aggregate
//!      -> (submit, if error-free) hand the rows to a BulkInsert collaborator
//! ```
//!
//! ## What you can ingest
//!
//! - **CSV**: `.csv` with a header row; empty lines are skipped
//! - **Excel** (Cargo feature `excel`, on by default): `.xlsx`, `.xls`; first worksheet only
//!
//! Any other extension fails with `"Only CSV and Excel files are supported"`.
//!
//! ## Validation rules
//!
//! Rows need `ID, Delivery_Date, State, District, School, PSU, Status, Cost` (plus `Category` for
//! device procurement). Dates must be real calendar dates, costs numeric, statuses one of
//! `Shipped, Pending, Just Deployed, Arrived`, and categories members of the project's list. See
//! [`validation`].
//!
//! ## Quick example
//!
//! ```rust
//! use procurement_bulk_import::ingestion::DroppedFile;
//! use procurement_bulk_import::project::ProjectContext;
//! use procurement_bulk_import::session::ImportSession;
//! use procurement_bulk_import::submission::JsonArraySink;
//!
//! let ctx = ProjectContext::devices(["Laptop", "Tablet"]);
//! let mut session = ImportSession::new(ctx);
//!
//! let csv = "ID,Delivery_Date,State,District,School,PSU,Status,Cost,Category\n\
//!            1,2025-01-22,MH,Pune,School A,BPCL,Shipped,1000,Printer\n";
//! session.ingest_dropped(&[DroppedFile::new("deliveries.csv", csv)]).unwrap();
//! assert_eq!(
//!     session.errors(),
//!     ["Row 1: Invalid item category: Printer. Must be one of: Laptop, Tablet".to_string()].as_slice()
//! );
//!
//! session.edit_cell(0, "Category", "Laptop").unwrap();
//! let sink = JsonArraySink::new(Vec::new());
//! assert_eq!(session.submit(&sink).unwrap(), 1);
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: file-type dispatch, CSV/Excel parsing, observer hooks
//! - [`validation`]: per-row rules, aggregate error list, bounded error preview
//! - [`session`]: the preview/edit store and submission gate
//! - [`submission`]: the bulk-insert collaborator seam
//! - [`template`]: downloadable sample CSV
//! - [`summary`]: batch figures for the preview
//! - [`project`]: project context and field constants
//! - [`types`]: raw/validated row types
//! - [`error`]: error types

pub mod error;
pub mod ingestion;
pub mod project;
pub mod session;
pub mod submission;
pub mod summary;
pub mod template;
pub mod types;
pub mod validation;

pub use error::{ConfigError, ImportError, IngestionError, IngestionResult, SessionError, SubmitError};
