// Run configuration.
//
// Options come from an optional JSON file; anything missing or malformed
// falls back to the built-in defaults so a bad config never stops the
// scheduled run. The struct is read-only once built.
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;

use crate::runlog::RunLog;

/// Placeholder in the output file template, replaced with the run date as
/// `YYYYMMDD`.
pub const DATE_TOKEN: &str = "{date}";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path of the delimited input file.
    pub input_file: PathBuf,
    /// Output file template; may contain [`DATE_TOKEN`].
    pub output_file: String,
    /// Column names the input is expected to carry.
    pub data_columns: Vec<String>,
    /// Name of the calendar-date column.
    pub date_column: String,
    /// Columns cleaned and parsed as numbers.
    pub numeric_columns: Vec<String>,
    /// Restrict the report to the most recent 7 days when true.
    pub filter_last_week: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            input_file: PathBuf::from("raw_data.csv"),
            output_file: format!("weekly_report_{}.xlsx", DATE_TOKEN),
            data_columns: ["Date", "Product", "Sales", "Units", "Revenue", "Region"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            date_column: "Date".to_string(),
            numeric_columns: ["Sales", "Units", "Revenue"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            filter_last_week: true,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file. An absent file is normal (first
    /// run, or default-only setups); a malformed one is logged and ignored.
    pub fn load(path: &Path, log: &mut RunLog) -> Config {
        match fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str::<Config>(&text) {
                Ok(config) => {
                    log.info(format!("loaded configuration from {}", path.display()));
                    config
                }
                Err(err) => {
                    log.warn(format!(
                        "could not parse config file {}: {}; using defaults",
                        path.display(),
                        err
                    ));
                    Config::default()
                }
            },
            Err(_) => {
                log.info(format!(
                    "config file {} not found, using defaults",
                    path.display()
                ));
                Config::default()
            }
        }
    }

    /// Output path for a given run date, with the date token substituted.
    pub fn resolved_output_path(&self, today: NaiveDate) -> PathBuf {
        let stamp = today.format("%Y%m%d").to_string();
        PathBuf::from(self.output_file.replace(DATE_TOKEN, &stamp))
    }

    /// Columns a row must have a value in to survive cleaning: the date
    /// column plus every numeric column.
    pub fn required_columns(&self) -> Vec<&str> {
        let mut required = vec![self.date_column.as_str()];
        for col in &self.numeric_columns {
            if col != &self.date_column {
                required.push(col.as_str());
            }
        }
        required
    }
}
