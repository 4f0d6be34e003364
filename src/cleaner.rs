// Data cleaning.
//
// Turns a raw string table into a typed, validated one. Stages run in a
// fixed order, each on the previous stage's output:
//
//   1. parse the date column,
//   2. parse the numeric columns (currency noise stripped),
//   3. drop rows missing a required value,
//   4. optionally keep only the most recent 7 days.
//
// Unparseable non-empty cells drop their row at stages 1 and 2; empty cells
// become Missing and are dealt with at stage 3. Cleaning only converts and
// filters; it never fabricates rows.
use chrono::NaiveDate;

use crate::config::Config;
use crate::error::{ReportError, Result};
use crate::runlog::RunLog;
use crate::types::{CellValue, CleanReport, CleanTable, RawTable};
use crate::util::{format_int, parse_date, parse_number};

/// Length of the recency window in days, today inclusive.
const WINDOW_DAYS: i64 = 7;

pub fn clean(
    raw: &RawTable,
    config: &Config,
    today: NaiveDate,
    log: &mut RunLog,
) -> Result<(CleanTable, CleanReport)> {
    log.info("starting data cleaning");
    let mut report = CleanReport {
        input_rows: raw.len(),
        ..CleanReport::default()
    };

    let columns = raw.columns.clone();
    let mut rows = typify(raw);

    let date_idx = raw.column_index(&config.date_column);
    if date_idx.is_none() {
        log.warn(format!(
            "date column '{}' not present in input, skipping date handling",
            config.date_column
        ));
    }
    let numeric_idx: Vec<usize> = config
        .numeric_columns
        .iter()
        .filter_map(|name| raw.column_index(name))
        .collect();

    // stage 1: calendar dates
    if let Some(idx) = date_idx {
        let before = rows.len();
        rows.retain_mut(|row| convert_date(&mut row[idx]));
        report.date_dropped = before - rows.len();
        if report.date_dropped > 0 {
            log.info(format!(
                "dropped {} rows with unparseable dates",
                format_int(report.date_dropped)
            ));
        }
    }

    // stage 2: numbers
    let before = rows.len();
    rows.retain_mut(|row| numeric_idx.iter().all(|&idx| convert_number(&mut row[idx])));
    report.numeric_dropped = before - rows.len();
    if report.numeric_dropped > 0 {
        log.info(format!(
            "dropped {} rows with unparseable numeric values",
            format_int(report.numeric_dropped)
        ));
    }

    // stage 3: required values
    let required_idx: Vec<usize> = config
        .required_columns()
        .iter()
        .filter_map(|name| raw.column_index(name))
        .collect();
    let before = rows.len();
    rows.retain(|row| required_idx.iter().all(|&idx| !row[idx].is_missing()));
    report.missing_dropped = before - rows.len();
    if report.missing_dropped > 0 {
        log.info(format!(
            "dropped {} rows with missing required values",
            format_int(report.missing_dropped)
        ));
    }

    if rows.is_empty() {
        return Err(ReportError::data_cleaning(format!(
            "no rows survived parsing and validation ({} input rows)",
            raw.len()
        )));
    }

    // stage 4: recency window
    if config.filter_last_week {
        if let Some(idx) = date_idx {
            let kept: Vec<Vec<CellValue>> = rows
                .iter()
                .filter(|row| {
                    row[idx]
                        .as_date()
                        .is_some_and(|d| in_window(d, today))
                })
                .cloned()
                .collect();
            if kept.is_empty() {
                // A sparse data set must still produce a report; keep the
                // pre-filter rows rather than emitting an empty one.
                report.window_skipped = true;
                log.warn(format!(
                    "no rows within the last {} days, keeping all {} cleaned rows",
                    WINDOW_DAYS,
                    format_int(rows.len())
                ));
            } else {
                report.window_dropped = rows.len() - kept.len();
                rows = kept;
                if report.window_dropped > 0 {
                    log.info(format!(
                        "dropped {} rows outside the last {} days",
                        format_int(report.window_dropped),
                        WINDOW_DAYS
                    ));
                }
            }
        }
    }

    report.output_rows = rows.len();
    log.info(format!(
        "data cleaning completed, final dataset: {} rows",
        format_int(rows.len())
    ));
    Ok((CleanTable { columns, rows }, report))
}

/// Raw strings become Text cells; empty cells (and cells absent from ragged
/// rows) become Missing. Rows are padded to the header width.
fn typify(raw: &RawTable) -> Vec<Vec<CellValue>> {
    let width = raw.columns.len();
    raw.rows
        .iter()
        .map(|row| {
            (0..width)
                .map(|i| match row.get(i) {
                    Some(cell) if !cell.trim().is_empty() => CellValue::Text(cell.clone()),
                    _ => CellValue::Missing,
                })
                .collect()
        })
        .collect()
}

/// Convert a date cell in place. Returns false when the row must go.
fn convert_date(cell: &mut CellValue) -> bool {
    match cell {
        CellValue::Text(s) => match parse_date(s) {
            Some(date) => {
                *cell = CellValue::Date(date);
                true
            }
            None => false,
        },
        CellValue::Missing => true,
        _ => true,
    }
}

/// Convert a numeric cell in place. Returns false when the row must go.
fn convert_number(cell: &mut CellValue) -> bool {
    match cell {
        CellValue::Text(s) => match parse_number(s) {
            Some(n) => {
                *cell = CellValue::Number(n);
                true
            }
            None => false,
        },
        CellValue::Missing => true,
        _ => true,
    }
}

fn in_window(date: NaiveDate, today: NaiveDate) -> bool {
    let age = (today - date).num_days();
    (0..WINDOW_DAYS).contains(&age)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table(rows: Vec<Vec<&str>>) -> RawTable {
        RawTable {
            columns: ["Date", "Product", "Sales", "Units", "Revenue", "Region"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    fn scenario_rows() -> Vec<Vec<&'static str>> {
        vec![
            vec!["2024-12-06", "Product A", "15", "50", "2500.00", "North"],
            vec!["2024-12-07", "Product B", "12", "30", "1800.00", "South"],
            vec!["2024-12-08", "Product C", "20", "75", "3750.00", "East"],
        ]
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 12, 8).unwrap()
    }

    #[test]
    fn clean_scenario_keeps_all_rows() {
        let raw = table(scenario_rows());
        let config = Config::default();
        let mut log = RunLog::sink();

        let (clean_table, report) = clean(&raw, &config, today(), &mut log).unwrap();
        assert_eq!(clean_table.len(), 3);
        assert_eq!(report.total_dropped(), 0);
        assert!(!report.window_skipped);

        let revenue: f64 = clean_table.column_numbers("Revenue").iter().sum();
        assert!((revenue - 8050.0).abs() < 1e-9);

        // untouched text cells carry the raw values through unchanged
        let product_idx = clean_table.column_index("Product").unwrap();
        assert_eq!(
            clean_table.rows[0][product_idx],
            CellValue::Text("Product A".to_string())
        );
    }

    #[test]
    fn unparseable_date_drops_the_row() {
        let mut rows = scenario_rows();
        rows.push(vec!["invalid-date", "Product D", "1", "1", "10.00", "West"]);
        let raw = table(rows);
        let mut log = RunLog::sink();

        let (clean_table, report) = clean(&raw, &Config::default(), today(), &mut log).unwrap();
        assert_eq!(clean_table.len(), 3);
        assert_eq!(report.date_dropped, 1);
    }

    #[test]
    fn not_available_revenue_drops_exactly_one_row() {
        let mut rows = scenario_rows();
        rows.push(vec!["2024-12-08", "Product D", "5", "10", "N/A", "West"]);
        let raw = table(rows);
        let mut log = RunLog::sink();

        let (clean_table, report) = clean(&raw, &Config::default(), today(), &mut log).unwrap();
        assert_eq!(clean_table.len(), 3);
        assert_eq!(report.numeric_dropped, 1);
        assert_eq!(report.missing_dropped, 0);
    }

    #[test]
    fn currency_formatting_is_stripped_not_dropped() {
        let raw = table(vec![vec![
            "2024-12-08",
            "Product A",
            "15",
            "1,250",
            "$2,500.00",
            "North",
        ]]);
        let mut log = RunLog::sink();

        let (clean_table, report) = clean(&raw, &Config::default(), today(), &mut log).unwrap();
        assert_eq!(report.numeric_dropped, 0);
        assert_eq!(clean_table.column_numbers("Revenue"), vec![2500.0]);
        assert_eq!(clean_table.column_numbers("Units"), vec![1250.0]);
    }

    #[test]
    fn empty_required_value_drops_in_missing_stage() {
        let mut rows = scenario_rows();
        rows.push(vec!["2024-12-08", "Product D", "", "10", "99.00", "West"]);
        let raw = table(rows);
        let mut log = RunLog::sink();

        let (clean_table, report) = clean(&raw, &Config::default(), today(), &mut log).unwrap();
        assert_eq!(clean_table.len(), 3);
        assert_eq!(report.date_dropped, 0);
        assert_eq!(report.numeric_dropped, 0);
        assert_eq!(report.missing_dropped, 1);
    }

    #[test]
    fn ragged_row_is_padded_then_dropped_for_missing_values() {
        let mut rows = scenario_rows();
        rows.push(vec!["2024-12-08", "Product D", "5"]);
        let raw = table(rows);
        let mut log = RunLog::sink();

        let (clean_table, report) = clean(&raw, &Config::default(), today(), &mut log).unwrap();
        assert_eq!(clean_table.len(), 3);
        assert_eq!(report.missing_dropped, 1);
    }

    #[test]
    fn window_filter_keeps_only_recent_rows() {
        let mut rows = scenario_rows();
        rows.push(vec!["2024-11-01", "Product E", "3", "5", "120.00", "West"]);
        let raw = table(rows);
        let mut log = RunLog::sink();

        let (clean_table, report) = clean(&raw, &Config::default(), today(), &mut log).unwrap();
        assert_eq!(clean_table.len(), 3);
        assert_eq!(report.window_dropped, 1);
        assert!(!report.window_skipped);
    }

    #[test]
    fn empty_window_is_skipped_not_fatal() {
        let raw = table(scenario_rows());
        let mut log = RunLog::sink();

        // run date far in the future: nothing falls inside the window
        let later = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let (clean_table, report) = clean(&raw, &Config::default(), later, &mut log).unwrap();
        assert_eq!(clean_table.len(), 3);
        assert!(report.window_skipped);
        assert_eq!(report.window_dropped, 0);
    }

    #[test]
    fn window_filter_can_be_disabled() {
        let mut rows = scenario_rows();
        rows.push(vec!["2024-11-01", "Product E", "3", "5", "120.00", "West"]);
        let raw = table(rows);
        let config = Config {
            filter_last_week: false,
            ..Config::default()
        };
        let mut log = RunLog::sink();

        let (clean_table, report) = clean(&raw, &config, today(), &mut log).unwrap();
        assert_eq!(clean_table.len(), 4);
        assert_eq!(report.window_dropped, 0);
    }

    #[test]
    fn empty_table_after_parsing_is_fatal() {
        let raw = table(vec![vec![
            "invalid-date",
            "Product A",
            "1",
            "1",
            "10.00",
            "North",
        ]]);
        let mut log = RunLog::sink();

        let err = clean(&raw, &Config::default(), today(), &mut log).unwrap_err();
        assert_eq!(err.stage(), "data cleaning");
    }

    #[test]
    fn missing_text_column_is_kept_as_missing() {
        let raw = table(vec![vec!["2024-12-08", "", "15", "50", "2500.00", "North"]]);
        let mut log = RunLog::sink();

        let (clean_table, report) = clean(&raw, &Config::default(), today(), &mut log).unwrap();
        assert_eq!(clean_table.len(), 1);
        assert_eq!(report.missing_dropped, 0);
        let product_idx = clean_table.column_index("Product").unwrap();
        assert!(clean_table.rows[0][product_idx].is_missing());
    }

    #[test]
    fn window_boundaries_are_inclusive_of_today() {
        let today = NaiveDate::from_ymd_opt(2024, 12, 8).unwrap();
        assert!(in_window(today, today));
        assert!(in_window(today - chrono::Duration::days(6), today));
        assert!(!in_window(today - chrono::Duration::days(7), today));
        // future-dated rows are not "recent"
        assert!(!in_window(today + chrono::Duration::days(1), today));
    }
}
