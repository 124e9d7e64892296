//! Cell-level parsing rules shared by the validator, the batch summary and Excel ingestion.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Timelike};

use crate::types::CellValue;

const DATE_FORMATS: [&str; 8] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d-%m-%Y",
    "%d/%m/%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
];

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Largest serial Excel can represent (9999-12-31).
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

/// Parse a delivery date cell into a calendar date.
///
/// Text is tried against the accepted formats (ISO, slash/dash day-first, month names,
/// date-times, RFC 3339). Numbers are read as Excel serial dates.
pub fn parse_delivery_date(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::Empty => None,
        CellValue::Number(n) => excel_serial_to_datetime(*n).map(|dt| dt.date()),
        CellValue::Text(s) => parse_date_text(s.trim()),
    }
}

fn parse_date_text(s: &str) -> Option<NaiveDate> {
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

/// Convert an Excel serial date (1900 date system) into a date-time.
///
/// Returns `None` for non-finite, negative, or out-of-range serials.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(0.0..=MAX_EXCEL_SERIAL + 1.0).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let days = serial.trunc() as i64;
    let secs = ((serial - serial.trunc()) * 86_400.0).round() as i64;
    epoch
        .checked_add_signed(Duration::days(days))?
        .checked_add_signed(Duration::seconds(secs))
}

/// Render an Excel serial date as `YYYY-MM-DD`, or `YYYY-MM-DDTHH:MM:SS` when it has a time part.
pub fn format_excel_serial(serial: f64) -> Option<String> {
    let dt = excel_serial_to_datetime(serial)?;
    if dt.time().num_seconds_from_midnight() == 0 {
        Some(dt.format("%Y-%m-%d").to_string())
    } else {
        Some(dt.format("%Y-%m-%dT%H:%M:%S").to_string())
    }
}

/// Parse a cost cell.
///
/// Numbers are taken as-is. Text keeps only digits, `.` and `-`, then the longest leading
/// floating-point prefix is parsed (`"$1,200.50"` -> `1200.5`, `"12-5"` -> `12`).
pub fn parse_cost(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Empty => None,
        CellValue::Number(n) => n.is_finite().then_some(*n),
        CellValue::Text(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            parse_float_prefix(&cleaned)
        }
    }
}

/// Parse the longest prefix of `s` shaped like `-?digits(.digits)?` (or `-?.digits`).
///
/// At least one digit is required.
pub fn parse_float_prefix(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut end = 0usize;
    if bytes.first() == Some(&b'-') {
        end = 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        let frac_digits = frac_end - frac_start;
        if frac_digits > 0 || digits > 0 {
            end = frac_end;
            digits += frac_digits;
        }
    }
    if digits == 0 {
        return None;
    }
    s[..end].trim_end_matches('.').parse::<f64>().ok()
}
