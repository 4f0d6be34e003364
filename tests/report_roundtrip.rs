//! End-to-end pipeline tests: run against a real CSV on disk, then re-open
//! the written workbook and check what actually landed in it.

use calamine::{open_workbook, Data, Reader, Xlsx};
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::Path;

use weekly_report::config::Config;
use weekly_report::pipeline;
use weekly_report::runlog::RunLog;

const SCENARIO_CSV: &str = "\
Date,Product,Sales,Units,Revenue,Region
2024-12-06,Product A,15,50,2500.00,North
2024-12-07,Product B,12,30,1800.00,South
2024-12-08,Product C,20,75,3750.00,East
";

fn fixture_config(dir: &Path) -> Config {
    Config {
        input_file: dir.join("raw_data.csv"),
        output_file: dir.join("report_{date}.xlsx").to_string_lossy().into_owned(),
        ..Config::default()
    }
}

fn run_clock(year: i32, month: u32, day: u32) -> (NaiveDate, NaiveDateTime) {
    let today = NaiveDate::from_ymd_opt(year, month, day).unwrap();
    (today, today.and_hms_opt(7, 0, 0).unwrap())
}

fn summary_metric(range: &calamine::Range<Data>, label: &str) -> Option<f64> {
    for row in range.rows() {
        if let (Some(Data::String(name)), Some(Data::Float(value))) = (row.first(), row.get(1)) {
            if name == label {
                return Some(*value);
            }
        }
    }
    None
}

#[test]
fn scenario_report_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("raw_data.csv"), SCENARIO_CSV).unwrap();
    let config = fixture_config(dir.path());
    let mut log = RunLog::sink();

    // run date far past the data: the 7-day window would be empty, so the
    // cleaner keeps the full set instead of producing an empty report
    let (today, now) = run_clock(2025, 6, 1);
    let outcome = pipeline::run_at(&config, today, now, &mut log).unwrap();
    assert_eq!(outcome.rows_reported, 3);
    assert!(outcome.clean_report.window_skipped);

    let mut workbook: Xlsx<_> = open_workbook(&outcome.output_path).unwrap();
    assert_eq!(
        workbook.sheet_names(),
        vec![
            "Summary".to_string(),
            "Raw Data".to_string(),
            "Charts".to_string()
        ]
    );

    // raw data sheet: one header row plus one row per cleaned row
    let data_range = workbook.worksheet_range("Raw Data").unwrap();
    assert_eq!(data_range.height(), outcome.rows_reported + 1);

    let summary_range = workbook.worksheet_range("Summary").unwrap();
    let total_revenue = summary_metric(&summary_range, "Total Revenue").unwrap();
    assert!((total_revenue - 8050.0).abs() < 1e-6);
    let total_records = summary_metric(&summary_range, "Total Records").unwrap();
    assert!((total_records - 3.0).abs() < 1e-9);

    // charts sheet carries the ranking data; Product C leads on revenue
    let charts_range = workbook.worksheet_range("Charts").unwrap();
    assert_eq!(
        charts_range.get_value((3, 0)),
        Some(&Data::String("Product C".to_string()))
    );
    assert_eq!(charts_range.get_value((3, 1)), Some(&Data::Float(3750.0)));
}

#[test]
fn dirty_rows_are_dropped_before_rendering() {
    let dir = tempfile::tempdir().unwrap();
    let csv = "\
Date,Product,Sales,Units,Revenue,Region
2024-12-06,Product A,15,50,\"$2,500.00\",North
2024-12-07,Product B,12,30,N/A,South
invalid-date,Product C,20,75,3750.00,East
";
    fs::write(dir.path().join("raw_data.csv"), csv).unwrap();
    let config = fixture_config(dir.path());
    let mut log = RunLog::sink();

    let (today, now) = run_clock(2024, 12, 8);
    let outcome = pipeline::run_at(&config, today, now, &mut log).unwrap();
    assert_eq!(outcome.rows_loaded, 3);
    assert_eq!(outcome.rows_reported, 1);
    assert_eq!(outcome.clean_report.date_dropped, 1);
    assert_eq!(outcome.clean_report.numeric_dropped, 1);

    let mut workbook: Xlsx<_> = open_workbook(&outcome.output_path).unwrap();
    let data_range = workbook.worksheet_range("Raw Data").unwrap();
    assert_eq!(data_range.height(), 2);
    // the currency-formatted cell survived as a plain number
    let summary_range = workbook.worksheet_range("Summary").unwrap();
    let total_revenue = summary_metric(&summary_range, "Total Revenue").unwrap();
    assert!((total_revenue - 2500.0).abs() < 1e-6);
}

#[test]
fn missing_input_synthesizes_sample_exactly_once() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture_config(dir.path());
    let mut log = RunLog::sink();
    let (today, now) = run_clock(2024, 12, 8);

    let first = pipeline::run_at(&config, today, now, &mut log).unwrap();
    assert!(config.input_file.exists());
    let sample_content = fs::read(&config.input_file).unwrap();

    // second run reads the existing file instead of regenerating it
    let second = pipeline::run_at(&config, today, now, &mut log).unwrap();
    assert_eq!(fs::read(&config.input_file).unwrap(), sample_content);
    assert_eq!(first.rows_loaded, second.rows_loaded);
    assert_eq!(first.rows_reported, second.rows_reported);

    let mut workbook: Xlsx<_> = open_workbook(&second.output_path).unwrap();
    let data_range = workbook.worksheet_range("Raw Data").unwrap();
    assert_eq!(data_range.height(), second.rows_reported + 1);
}
