//! Ingestion entrypoints and implementations.
//!
//! Most callers should use [`ingest_from_path`] or [`ingest_from_bytes`] (from [`unified`]) which:
//!
//! - auto-detect format by file extension (`.csv`, `.xlsx`, `.xls`); anything else is rejected
//! - parse the first worksheet / the CSV body into [`crate::types::RawRow`]s keyed by header
//! - optionally report success/failure/alerts to an [`ImportObserver`]
//!
//! Format-specific functions are also available under:
//! - [`csv`]
//! - `excel` (feature `excel`)

pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;
pub mod observability;
pub mod unified;

pub use observability::{
    CompositeObserver, FileObserver, ImportObserver, ImportSeverity, IngestionContext, IngestionStats,
    StdErrObserver, SubmissionContext, SubmissionStats,
};
pub use unified::{ingest_dropped, ingest_from_bytes, ingest_from_path, DroppedFile, IngestionFormat, IngestionOptions};

/// Turn a raw header row into column names.
///
/// Names are trimmed (and a leading UTF-8 BOM removed). Blank headers stay empty and their column
/// is skipped by the callers. Repeated names get `_1`, `_2`, ... appended in order of appearance.
pub(crate) fn normalize_headers<I>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut out: Vec<String> = Vec::new();
    for header in raw {
        let base = header.trim().trim_start_matches('\u{feff}').trim().to_owned();
        if base.is_empty() {
            out.push(base);
            continue;
        }
        let mut name = base.clone();
        let mut n = 0usize;
        while out.contains(&name) {
            n += 1;
            name = format!("{base}_{n}");
        }
        out.push(name);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::normalize_headers;

    #[test]
    fn normalize_headers_dedupes_and_keeps_blanks() {
        let raw = ["ID", " Cost ", "", "Cost", "Cost"].map(String::from);
        assert_eq!(normalize_headers(raw), vec!["ID", "Cost", "", "Cost_1", "Cost_2"]);
    }
}
