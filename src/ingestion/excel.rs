#![cfg(feature = "excel")]

use std::fs;
use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader, Sheets};

use crate::error::{IngestionError, IngestionResult};
use crate::types::{CellValue, RawRow};
use crate::validation::rules::format_excel_serial;

use super::normalize_headers;

/// Ingest the first worksheet of an Excel document (`.xlsx`, `.xls`) into [`RawRow`]s.
///
/// Behavior:
/// - Uses the first sheet in the workbook; other sheets are ignored
/// - Detects the first non-empty row as the header row
/// - Reads remaining rows keyed by header, skipping rows whose cells are all blank
pub fn ingest_excel_from_path(path: impl AsRef<Path>) -> IngestionResult<Vec<RawRow>> {
    let bytes = fs::read(path)?;
    ingest_excel_from_bytes(&bytes)
}

/// Same as [`ingest_excel_from_path`], for an in-memory workbook (e.g. a dropped file).
///
/// The workbook flavor (xlsx/xls/xlsb/ods) is sniffed from the content, not the file name.
pub fn ingest_excel_from_bytes(bytes: &[u8]) -> IngestionResult<Vec<RawRow>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let range = first_sheet_range(&mut workbook)?;
    ingest_sheet_range(&range)
}

fn first_sheet_range(workbook: &mut Sheets<Cursor<Vec<u8>>>) -> IngestionResult<calamine::Range<Data>> {
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| IngestionError::Malformed {
            message: "workbook has no sheets".to_string(),
        })?;
    Ok(workbook.worksheet_range(&sheet)?)
}

fn ingest_sheet_range(range: &calamine::Range<Data>) -> IngestionResult<Vec<RawRow>> {
    let (header_row_idx, headers) = find_header_row(range)?;

    let mut rows: Vec<RawRow> = Vec::new();
    for (idx0, cells) in range.rows().enumerate() {
        if idx0 <= header_row_idx {
            continue;
        }

        let mut row = RawRow::new();
        for (col_idx, name) in headers.iter().enumerate() {
            if name.is_empty() {
                continue;
            }
            let cell = cells.get(col_idx).unwrap_or(&Data::Empty);
            row.set(name.as_str(), convert_cell(cell));
        }
        if row.is_blank() {
            continue;
        }
        rows.push(row);
    }

    Ok(rows)
}

fn find_header_row(range: &calamine::Range<Data>) -> IngestionResult<(usize, Vec<String>)> {
    for (idx0, row) in range.rows().enumerate() {
        let non_empty = row.iter().any(|c| !matches!(c, Data::Empty));
        if non_empty {
            let headers = normalize_headers(row.iter().map(cell_to_header_string));
            return Ok((idx0, headers));
        }
    }

    Err(IngestionError::Malformed {
        message: "sheet has no non-empty rows (no header row found)".to_string(),
    })
}

fn cell_to_header_string(c: &Data) -> String {
    match convert_cell(c) {
        CellValue::Empty => String::new(),
        other => other.to_string(),
    }
}

fn convert_cell(c: &Data) -> CellValue {
    match c {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::text(s),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) => {
            if dt.is_datetime() {
                match format_excel_serial(dt.as_f64()) {
                    Some(s) => CellValue::Text(s),
                    None => CellValue::Number(dt.as_f64()),
                }
            } else {
                CellValue::Number(dt.as_f64())
            }
        }
        Data::DateTimeIso(s) => CellValue::text(s),
        Data::DurationIso(s) => CellValue::text(s),
        Data::Error(e) => CellValue::Text(format!("{e:?}")),
    }
}
