// Data loading.
//
// Reads the input CSV into a RawTable of untyped string cells. The file is
// decoded by trying a fixed list of encodings in order; a missing input
// file is replaced with a small deterministic sample so a first run on a
// fresh machine still produces a report.
use std::fs;
use std::path::Path;

use chrono::{Duration, NaiveDate};
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};

use crate::error::{ReportError, Result};
use crate::runlog::RunLog;
use crate::types::RawTable;
use crate::util::format_int;

const SAMPLE_PRODUCTS: &[&str] = &[
    "Product A",
    "Product B",
    "Product C",
    "Product D",
    "Product E",
];
const SAMPLE_REGIONS: &[&str] = &["North", "South", "East", "West", "Central"];
const SAMPLE_ROWS: usize = 60;

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub rows_loaded: usize,
    pub encoding: &'static str,
    pub synthesized: bool,
}

/// Load the input file into a raw table, synthesizing sample data first if
/// the file does not exist.
pub fn load_raw(path: &Path, today: NaiveDate, log: &mut RunLog) -> Result<(RawTable, LoadReport)> {
    let synthesized = if path.exists() {
        false
    } else {
        log.warn(format!(
            "input file {} not found, writing sample data",
            path.display()
        ));
        write_sample_data(path, today)?;
        true
    };

    let bytes = fs::read(path).map_err(|err| ReportError::data_load(path, err.to_string()))?;
    let (text, encoding) = decode_bytes(&bytes).ok_or_else(|| {
        ReportError::data_load(path, "no candidate encoding decoded the file cleanly")
    })?;
    log.info(format!("decoded {} as {}", path.display(), encoding));

    let table = parse_csv(&text, path)?;
    log.info(format!(
        "loaded {} rows from {}",
        format_int(table.len()),
        path.display()
    ));

    let report = LoadReport {
        rows_loaded: table.len(),
        encoding,
        synthesized,
    };
    Ok((table, report))
}

/// Try each candidate encoding in order and take the first that decodes
/// without replacement errors. Windows-1252 maps every byte, so in practice
/// it catches the latin-1 style exports that are not valid UTF-8.
fn decode_bytes(bytes: &[u8]) -> Option<(String, &'static str)> {
    let candidates: [&'static Encoding; 2] = [UTF_8, WINDOWS_1252];
    for encoding in candidates {
        let (text, _, had_errors) = encoding.decode(bytes);
        if !had_errors {
            return Some((text.into_owned(), encoding.name()));
        }
    }
    None
}

fn parse_csv(text: &str, path: &Path) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let columns: Vec<String> = reader
        .headers()
        .map_err(|err| ReportError::data_load(path, err.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();
    if columns.iter().all(|c| c.is_empty()) {
        return Err(ReportError::data_load(path, "header row is empty"));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| ReportError::data_load(path, err.to_string()))?;
        rows.push(record.iter().map(|cell| cell.to_string()).collect());
    }

    Ok(RawTable { columns, rows })
}

/// Write a deterministic sample data set covering the four weeks up to
/// `today`, cycling through the sample products and regions. No randomness:
/// two runs on the same date produce the same file.
fn write_sample_data(path: &Path, today: NaiveDate) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).map_err(|err| ReportError::data_load(path, err.to_string()))?;
    writer
        .write_record(["Date", "Product", "Sales", "Units", "Revenue", "Region"])
        .map_err(|err| ReportError::data_load(path, err.to_string()))?;

    for i in 0..SAMPLE_ROWS {
        let date = today - Duration::days((i % 28) as i64);
        let product = SAMPLE_PRODUCTS[i % SAMPLE_PRODUCTS.len()];
        let region = SAMPLE_REGIONS[(i / SAMPLE_PRODUCTS.len()) % SAMPLE_REGIONS.len()];
        let sales = 1 + (i * 3) % 15;
        let units = 10 + (i * 7) % 90;
        let unit_price = 20.0 + ((i * 13) % 180) as f64;
        let revenue = units as f64 * unit_price;

        let date = date.format("%Y-%m-%d").to_string();
        let sales = sales.to_string();
        let units = units.to_string();
        let revenue = format!("{:.2}", revenue);
        writer
            .write_record([
                date.as_str(),
                product,
                sales.as_str(),
                units.as_str(),
                revenue.as_str(),
                region,
            ])
            .map_err(|err| ReportError::data_load(path, err.to_string()))?;
    }

    writer
        .flush()
        .map_err(|err| ReportError::data_load(path, err.to_string()))?;
    Ok(())
}
