//! Unified ingestion entrypoint.
//!
//! Most callers should use [`ingest_from_path`] (files on disk) or [`ingest_from_bytes`] (dropped
//! uploads), which parse a file into [`crate::types::RawRow`]s.
//!
//! - If [`IngestionOptions::format`] is `None`, the format is inferred from the file extension.
//!   Only `.csv`, `.xlsx` and `.xls` are accepted.
//! - If an [`super::observability::ImportObserver`] is provided, success/failure/alerts are
//!   reported to it. Every failure is reported, including a rejected extension.

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::error::{IngestionError, IngestionResult};
use crate::types::RawRow;

use super::csv;
use super::observability::{ImportObserver, ImportSeverity, IngestionContext, IngestionStats};

/// Supported ingestion formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionFormat {
    /// Comma-separated values with a header row.
    Csv,
    /// Excel workbook; the first worksheet is read (feature-gated behind `excel`).
    Excel,
}

impl IngestionFormat {
    /// Parse an ingestion format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" | "xls" => Some(Self::Excel),
            _ => None,
        }
    }

    /// Infer the format from a file name or path.
    pub fn from_file_name(name: impl AsRef<Path>) -> Option<Self> {
        name.as_ref()
            .extension()
            .and_then(|s| s.to_str())
            .and_then(Self::from_extension)
    }
}

/// Options controlling unified ingestion behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct IngestionOptions {
    /// If `None`, auto-detect format from file extension.
    pub format: Option<IngestionFormat>,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn ImportObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: ImportSeverity,
}

impl fmt::Debug for IngestionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionOptions")
            .field("format", &self.format)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            format: None,
            observer: None,
            alert_at_or_above: ImportSeverity::Critical,
        }
    }
}

/// A file handed over by a drag/drop or file-picker interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedFile {
    /// Original file name (used for format detection).
    pub name: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl DroppedFile {
    /// Create a dropped file from a name and its contents.
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Parse a file on disk into raw rows.
///
/// # Examples
///
/// ```no_run
/// use procurement_bulk_import::ingestion::{ingest_from_path, IngestionOptions};
///
/// # fn main() -> Result<(), procurement_bulk_import::IngestionError> {
/// let rows = ingest_from_path("deliveries.csv", &IngestionOptions::default())?;
/// println!("rows={}", rows.len());
/// # Ok(())
/// # }
/// ```
///
/// ## Observability (stderr logging + alert threshold)
///
/// ```no_run
/// use std::sync::Arc;
///
/// use procurement_bulk_import::ingestion::{
///     ingest_from_path, ImportSeverity, IngestionOptions, StdErrObserver,
/// };
///
/// let opts = IngestionOptions {
///     observer: Some(Arc::new(StdErrObserver)),
///     alert_at_or_above: ImportSeverity::Critical,
///     ..Default::default()
/// };
///
/// // Missing files are treated as Critical and will trigger `on_alert` at this threshold.
/// let _err = ingest_from_path("does_not_exist.csv", &opts).unwrap_err();
/// ```
pub fn ingest_from_path(path: impl AsRef<Path>, options: &IngestionOptions) -> IngestionResult<Vec<RawRow>> {
    let path = path.as_ref();
    let fmt = options.format.or_else(|| IngestionFormat::from_file_name(path));
    let ctx = IngestionContext {
        source: path.display().to_string(),
        format: fmt,
    };

    let result = match fmt {
        Some(IngestionFormat::Csv) => csv::ingest_csv_from_path(path),
        Some(IngestionFormat::Excel) => fs::read(path)
            .map_err(IngestionError::from)
            .and_then(|bytes| ingest_excel_dispatch(&bytes)),
        None => Err(unsupported(&ctx.source)),
    };

    report(options, &ctx, &result);
    result
}

/// Parse an uploaded file's contents into raw rows; the format comes from `file_name`.
pub fn ingest_from_bytes(file_name: &str, bytes: &[u8], options: &IngestionOptions) -> IngestionResult<Vec<RawRow>> {
    let fmt = options.format.or_else(|| IngestionFormat::from_file_name(file_name));
    let ctx = IngestionContext {
        source: file_name.to_owned(),
        format: fmt,
    };

    let result = match fmt {
        Some(IngestionFormat::Csv) => csv::ingest_csv_from_bytes(bytes),
        Some(IngestionFormat::Excel) => ingest_excel_dispatch(bytes),
        None => Err(unsupported(file_name)),
    };

    report(options, &ctx, &result);
    result
}

/// Parse a drag/drop payload, which must carry exactly one file.
pub fn ingest_dropped(files: &[DroppedFile], options: &IngestionOptions) -> IngestionResult<Vec<RawRow>> {
    match files {
        [file] => ingest_from_bytes(&file.name, &file.bytes, options),
        _ => {
            let ctx = IngestionContext {
                source: files.iter().map(|f| f.name.as_str()).collect::<Vec<_>>().join(","),
                format: None,
            };
            let result = Err(IngestionError::FileCount { count: files.len() });
            report(options, &ctx, &result);
            result
        }
    }
}

fn unsupported(file_name: &str) -> IngestionError {
    IngestionError::UnsupportedFormat {
        file_name: file_name.to_owned(),
    }
}

fn report(options: &IngestionOptions, ctx: &IngestionContext, result: &IngestionResult<Vec<RawRow>>) {
    if let Some(obs) = options.observer.as_ref() {
        match result {
            Ok(rows) => obs.on_success(ctx, IngestionStats { rows: rows.len() }),
            Err(e) => {
                let sev = ImportSeverity::for_ingestion_error(e);
                obs.on_failure(ctx, sev, e);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(ctx, sev, e);
                }
            }
        }
    }
}

fn ingest_excel_dispatch(bytes: &[u8]) -> IngestionResult<Vec<RawRow>> {
    // Avoid unused warnings when the feature is off.
    let _ = bytes;

    #[cfg(feature = "excel")]
    {
        super::excel::ingest_excel_from_bytes(bytes)
    }

    #[cfg(not(feature = "excel"))]
    {
        Err(IngestionError::Malformed {
            message: "excel ingestion not enabled (enable cargo feature 'excel')".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_detection_is_case_insensitive() {
        assert_eq!(IngestionFormat::from_file_name("a.CSV"), Some(IngestionFormat::Csv));
        assert_eq!(IngestionFormat::from_file_name("b.Xlsx"), Some(IngestionFormat::Excel));
        assert_eq!(IngestionFormat::from_file_name("c.xls"), Some(IngestionFormat::Excel));
        assert_eq!(IngestionFormat::from_file_name("d.txt"), None);
        assert_eq!(IngestionFormat::from_file_name("no_extension"), None);
    }

    #[test]
    fn text_file_is_rejected_with_user_message() {
        let err = ingest_from_bytes("notes.txt", b"ID\n1\n", &IngestionOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "Only CSV and Excel files are supported");
    }

    #[test]
    fn dropping_two_files_is_rejected() {
        let files = vec![DroppedFile::new("a.csv", "ID\n1\n"), DroppedFile::new("b.csv", "ID\n2\n")];
        let err = ingest_dropped(&files, &IngestionOptions::default()).unwrap_err();
        assert!(matches!(err, IngestionError::FileCount { count: 2 }));
    }

    #[test]
    fn forced_format_overrides_extension() {
        let opts = IngestionOptions {
            format: Some(IngestionFormat::Csv),
            ..Default::default()
        };
        let rows = ingest_from_bytes("upload.bin", b"ID\n1\n", &opts).unwrap();
        assert_eq!(rows.len(), 1);
    }
}
