// Report rendering.
//
// Builds the three-sheet workbook (Summary, Raw Data, Charts) and writes it
// to disk. The workbook is saved to a temp file in the destination
// directory and only moved onto the final path once fully written, so a
// failed run never leaves a half-written report behind.
use std::path::Path;

use chrono::NaiveDateTime;
use rust_xlsxwriter::{Chart, ChartType, Color, Format, Workbook, Worksheet, XlsxError};
use tabled::{settings::Style, Table};
use tempfile::NamedTempFile;

use crate::config::Config;
use crate::error::{ReportError, Result};
use crate::runlog::RunLog;
use crate::types::{
    is_currency_column, CellValue, CleanTable, MetricPreviewRow, RankingPreviewRow, Summary,
};
use crate::util::{format_int, format_number};

pub const SUMMARY_SHEET: &str = "Summary";
pub const DATA_SHEET: &str = "Raw Data";
pub const CHARTS_SHEET: &str = "Charts";

const CURRENCY_FORMAT: &str = "$#,##0.00";
const INTEGER_FORMAT: &str = "#,##0";
const DATE_FORMAT: &str = "yyyy-mm-dd";

// Header fill colors, matching the house report style.
const LABEL_FILL: Color = Color::RGB(0xE6E6FA);
const HEADER_FILL: Color = Color::RGB(0x4472C4);

pub fn render(
    table: &CleanTable,
    summary: &Summary,
    dest: &Path,
    generated_at: NaiveDateTime,
    config: &Config,
    log: &mut RunLog,
) -> Result<()> {
    log.info(format!("creating report workbook: {}", dest.display()));

    let mut workbook = Workbook::new();
    build_workbook(&mut workbook, table, summary, generated_at, config)
        .map_err(|err| ReportError::report_write(dest, err.to_string()))?;
    save_atomic(workbook, dest)?;

    log.info(format!("report saved: {}", dest.display()));
    Ok(())
}

fn build_workbook(
    workbook: &mut Workbook,
    table: &CleanTable,
    summary: &Summary,
    generated_at: NaiveDateTime,
    config: &Config,
) -> std::result::Result<(), XlsxError> {
    write_summary_sheet(workbook.add_worksheet(), summary, generated_at)?;
    write_data_sheet(workbook.add_worksheet(), table, config)?;
    write_charts_sheet(workbook.add_worksheet(), summary)?;
    Ok(())
}

fn write_summary_sheet(
    sheet: &mut Worksheet,
    summary: &Summary,
    generated_at: NaiveDateTime,
) -> std::result::Result<(), XlsxError> {
    sheet.set_name(SUMMARY_SHEET)?;

    let title = Format::new().set_bold().set_font_size(16);
    let label = Format::new().set_bold().set_background_color(LABEL_FILL);
    let bold = Format::new().set_bold();
    let currency = Format::new().set_num_format(CURRENCY_FORMAT);

    sheet.merge_range(0, 0, 0, 3, "Weekly Report Summary", &title)?;
    sheet.write_string(2, 0, "Report Generated:")?;
    sheet.write_string(2, 1, generated_at.format("%Y-%m-%d %H:%M").to_string())?;

    let mut row: u32 = 4;
    for entry in summary.metric_entries() {
        sheet.write_string_with_format(row, 0, &entry.label, &label)?;
        if entry.currency {
            sheet.write_number_with_format(row, 1, entry.value, &currency)?;
        } else {
            sheet.write_number(row, 1, entry.value)?;
        }
        row += 1;
    }

    for ranking in &summary.rankings {
        row += 1;
        sheet.write_string_with_format(row, 0, ranking.title(), &bold)?;
        row += 1;
        for entry in &ranking.entries {
            sheet.write_string(row, 0, &entry.label)?;
            if is_currency_column(&ranking.measure) {
                sheet.write_number_with_format(row, 1, entry.value, &currency)?;
            } else {
                sheet.write_number(row, 1, entry.value)?;
            }
            row += 1;
        }
    }

    sheet.autofit();
    Ok(())
}

fn write_data_sheet(
    sheet: &mut Worksheet,
    table: &CleanTable,
    config: &Config,
) -> std::result::Result<(), XlsxError> {
    sheet.set_name(DATA_SHEET)?;

    let header = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(HEADER_FILL);
    let currency = Format::new().set_num_format(CURRENCY_FORMAT);
    let integer = Format::new().set_num_format(INTEGER_FORMAT);
    let date = Format::new().set_num_format(DATE_FORMAT);

    for (col, name) in table.columns.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, name, &header)?;
    }

    let numeric_formats: Vec<Option<&Format>> = table
        .columns
        .iter()
        .map(|name| {
            if !config.numeric_columns.contains(name) {
                None
            } else if is_currency_column(name) {
                Some(&currency)
            } else {
                Some(&integer)
            }
        })
        .collect();

    for (r, row) in table.rows.iter().enumerate() {
        let r = (r + 1) as u32;
        for (c, cell) in row.iter().enumerate() {
            let col = c as u16;
            match cell {
                CellValue::Text(s) => {
                    sheet.write_string(r, col, s)?;
                }
                CellValue::Number(n) => match numeric_formats[c] {
                    Some(format) => {
                        sheet.write_number_with_format(r, col, *n, format)?;
                    }
                    None => {
                        sheet.write_number(r, col, *n)?;
                    }
                },
                CellValue::Date(d) => {
                    sheet.write_datetime_with_format(r, col, d, &date)?;
                }
                CellValue::Missing => {}
            }
        }
    }

    sheet.autofit();
    Ok(())
}

fn write_charts_sheet(
    sheet: &mut Worksheet,
    summary: &Summary,
) -> std::result::Result<(), XlsxError> {
    sheet.set_name(CHARTS_SHEET)?;

    let title = Format::new().set_bold().set_font_size(14);
    let bold = Format::new().set_bold();
    sheet.write_string_with_format(0, 0, "Data Visualizations", &title)?;

    let mut row: u32 = 2;
    for ranking in &summary.rankings {
        if ranking.entries.is_empty() {
            continue;
        }

        sheet.write_string_with_format(row, 0, &ranking.dimension, &bold)?;
        sheet.write_string_with_format(row, 1, &ranking.measure, &bold)?;
        let first = row + 1;
        let last = row + ranking.entries.len() as u32;
        for (i, entry) in ranking.entries.iter().enumerate() {
            sheet.write_string(first + i as u32, 0, &entry.label)?;
            sheet.write_number(first + i as u32, 1, entry.value)?;
        }

        let mut chart = Chart::new(ChartType::Column);
        chart
            .add_series()
            .set_categories((CHARTS_SHEET, first, 0, last, 0))
            .set_values((CHARTS_SHEET, first, 1, last, 1))
            .set_name(ranking.measure.as_str());
        chart.title().set_name(ranking.title().as_str());
        chart.x_axis().set_name(ranking.dimension.as_str());
        chart.y_axis().set_name(ranking.measure.as_str());
        sheet.insert_chart(row, 3, &chart)?;

        // leave room for the inserted chart before the next block
        row = (last + 2).max(row + 16);
    }

    Ok(())
}

/// Write the workbook next to the destination and rename it into place, so
/// the final path either holds a complete report or nothing new at all.
fn save_atomic(mut workbook: Workbook, dest: &Path) -> Result<()> {
    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let temp = NamedTempFile::new_in(dir)
        .map_err(|err| ReportError::report_write(dest, err.to_string()))?;
    workbook
        .save(temp.path())
        .map_err(|err| ReportError::report_write(dest, err.to_string()))?;
    temp.persist(dest)
        .map_err(|err| ReportError::report_write(dest, err.to_string()))?;
    Ok(())
}

/// Markdown-style console preview of the summary metrics and rankings,
/// printed after a successful run.
pub fn preview_summary(summary: &Summary) {
    let metric_rows: Vec<MetricPreviewRow> = summary
        .metric_entries()
        .iter()
        .map(|entry| MetricPreviewRow {
            metric: entry.label.clone(),
            value: preview_value(entry.value, entry.currency),
        })
        .collect();
    if metric_rows.is_empty() {
        println!("(no metrics)\n");
    } else {
        let table_str = Table::new(metric_rows).with(Style::markdown()).to_string();
        println!("{}\n", table_str);
    }

    for ranking in &summary.rankings {
        let rows: Vec<RankingPreviewRow> = ranking
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| RankingPreviewRow {
                rank: i + 1,
                name: entry.label.clone(),
                value: preview_value(entry.value, is_currency_column(&ranking.measure)),
            })
            .collect();
        println!("{}", ranking.title());
        let table_str = Table::new(rows).with(Style::markdown()).to_string();
        println!("{}\n", table_str);
    }
}

fn preview_value(value: f64, currency: bool) -> String {
    if currency {
        format!("${}", format_number(value, 2))
    } else if value.fract() == 0.0 {
        format_int(value as i64)
    } else {
        format_number(value, 2)
    }
}
