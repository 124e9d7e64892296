use procurement_bulk_import::project::{ProjectContext, ProjectKind};
use procurement_bulk_import::template::{sample_template_csv, template_file_name};
use procurement_bulk_import::ingestion::csv::ingest_csv_from_bytes;
use procurement_bulk_import::validation::validate_row;
use procurement_bulk_import::ConfigError;

#[test]
fn project_context_loads_from_json_file() {
    let ctx = ProjectContext::from_json_path("tests/fixtures/project_devices.json").unwrap();
    assert_eq!(ctx.kind(), ProjectKind::Devices);
    assert_eq!(ctx.categories, vec!["Laptop".to_string(), "Tablet".to_string()]);
}

#[test]
fn missing_config_file_is_io_error() {
    let err = ProjectContext::from_json_path("tests/fixtures/nope.json").unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn sample_template_round_trips_through_validation() {
    for ctx in [
        ProjectContext::devices(["Laptop", "Tablet"]),
        ProjectContext::sanitary_pads(),
        ProjectContext::new("School Furniture", Vec::<String>::new()),
    ] {
        let csv = sample_template_csv(&ctx).unwrap();
        let rows = ingest_csv_from_bytes(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1, "{}", template_file_name(&ctx));
        assert!(validate_row(&rows[0], &ctx).is_empty(), "{csv}");
    }
}

#[test]
fn device_fixture_reports_date_and_category_errors() {
    let ctx = ProjectContext::from_json_path("tests/fixtures/project_devices.json").unwrap();
    let bytes = std::fs::read("tests/fixtures/devices.csv").unwrap();
    let rows = ingest_csv_from_bytes(&bytes).unwrap();

    assert!(validate_row(&rows[0], &ctx).is_empty());
    assert_eq!(
        validate_row(&rows[1], &ctx),
        vec![
            "Invalid delivery date format".to_string(),
            "Invalid item category: Printer. Must be one of: Laptop, Tablet".to_string(),
        ]
    );
}
