//! Sample CSV template offered for download so uploads match the expected columns.

use std::io::Write;

use crate::error::{IngestionError, IngestionResult};
use crate::project::{ProjectContext, ProjectKind};

const SAMPLE_ROW: [&str; 8] = ["1", "2025-01-22", "MH", "Pune", "School A", "BPCL", "Shipped", "1000"];
const FALLBACK_CATEGORY: &str = "Laptop";

/// Template header row for a project kind.
pub fn template_headers(kind: ProjectKind) -> Vec<&'static str> {
    kind.required_fields()
}

/// Write the template (header row + one example row) as CSV.
pub fn write_sample_template<W: Write>(writer: W, ctx: &ProjectContext) -> IngestionResult<()> {
    let kind = ctx.kind();
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(template_headers(kind))?;

    let mut sample: Vec<&str> = SAMPLE_ROW.to_vec();
    if kind.uses_category() {
        let category = ctx.categories.first().map_or(FALLBACK_CATEGORY, String::as_str);
        sample.push(category);
    }
    wtr.write_record(&sample)?;
    wtr.flush()?;
    Ok(())
}

/// The template as an in-memory CSV string.
pub fn sample_template_csv(ctx: &ProjectContext) -> IngestionResult<String> {
    let mut buf: Vec<u8> = Vec::new();
    write_sample_template(&mut buf, ctx)?;
    String::from_utf8(buf).map_err(|e| IngestionError::Malformed {
        message: format!("template is not utf-8: {e}"),
    })
}

/// Suggested download file name for the template.
pub fn template_file_name(ctx: &ProjectContext) -> String {
    match ctx.kind() {
        ProjectKind::Devices => "device_procurement_template.csv".to_string(),
        ProjectKind::SanitaryPads => "sanitary_pad_procurement_template.csv".to_string(),
        ProjectKind::Other => "procurement_template.csv".to_string(),
    }
}
