//! CSV ingestion implementation.

use std::path::Path;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{CellValue, RawRow};

use super::normalize_headers;

/// Ingest a CSV file into [`RawRow`]s.
///
/// Rules:
///
/// - CSV must have headers; header names become column names (trimmed, case preserved). Input
///   without any non-blank header fails with [`IngestionError::Malformed`].
/// - Empty lines, and lines whose cells are all blank, are skipped.
/// - Short records leave the trailing columns [`CellValue::Empty`]; extra cells are ignored.
/// - Every non-blank cell is kept as trimmed [`CellValue::Text`].
pub fn ingest_csv_from_path(path: impl AsRef<Path>) -> IngestionResult<Vec<RawRow>> {
    let mut rdr = reader_builder().from_path(path)?;
    ingest_csv_from_reader(&mut rdr)
}

/// Ingest CSV from an in-memory byte buffer (e.g. a dropped file).
pub fn ingest_csv_from_bytes(bytes: &[u8]) -> IngestionResult<Vec<RawRow>> {
    let mut rdr = reader_builder().from_reader(bytes);
    ingest_csv_from_reader(&mut rdr)
}

/// Ingest CSV data from an existing CSV reader.
pub fn ingest_csv_from_reader<R: std::io::Read>(rdr: &mut csv::Reader<R>) -> IngestionResult<Vec<RawRow>> {
    let headers = normalize_headers(rdr.headers()?.iter().map(str::to_owned));
    if headers.iter().all(String::is_empty) {
        return Err(IngestionError::Malformed {
            message: "csv has no header row".to_string(),
        });
    }

    let mut rows: Vec<RawRow> = Vec::new();
    for result in rdr.records() {
        let record = result?;

        let mut row = RawRow::new();
        for (idx, name) in headers.iter().enumerate() {
            if name.is_empty() {
                continue;
            }
            let raw = record.get(idx).unwrap_or("");
            row.set(name.as_str(), CellValue::text(raw));
        }
        if row.is_blank() {
            continue;
        }
        rows.push(row);
    }

    Ok(rows)
}

fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(true).flexible(true);
    builder
}

#[cfg(test)]
mod tests {
    use super::ingest_csv_from_bytes;
    use crate::error::IngestionError;
    use crate::types::CellValue;

    #[test]
    fn skips_blank_lines_and_blank_records() {
        let input = "ID,State\n1,MH\n\n,\n2,KA\n";
        let rows = ingest_csv_from_bytes(input.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get("State"), Some(&CellValue::Text("KA".to_string())));
    }

    #[test]
    fn short_records_fill_missing_cells_with_empty() {
        let input = "ID,State,District\n1,MH\n";
        let rows = ingest_csv_from_bytes(input.as_bytes()).unwrap();
        assert_eq!(rows[0].get("District"), Some(&CellValue::Empty));
    }

    #[test]
    fn duplicate_headers_get_numeric_suffix() {
        let input = "ID,Cost,Cost\n1,10,20\n";
        let rows = ingest_csv_from_bytes(input.as_bytes()).unwrap();
        assert_eq!(rows[0].get("Cost"), Some(&CellValue::Text("10".to_string())));
        assert_eq!(rows[0].get("Cost_1"), Some(&CellValue::Text("20".to_string())));
    }

    #[test]
    fn empty_input_has_no_header_row() {
        for input in ["", "\n\n", " , \n"] {
            let err = ingest_csv_from_bytes(input.as_bytes()).unwrap_err();
            assert!(matches!(err, IngestionError::Malformed { .. }), "{input:?}");
        }
    }

    #[test]
    fn strips_utf8_bom_from_first_header() {
        let input = "\u{feff}ID,State\n1,MH\n";
        let rows = ingest_csv_from_bytes(input.as_bytes()).unwrap();
        assert_eq!(rows[0].get("ID"), Some(&CellValue::Text("1".to_string())));
    }
}
