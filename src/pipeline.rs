// Pipeline orchestration.
//
// Runs the stages in order (load, clean, summarize, render) against a
// single configuration, and turns any stage failure into a logged error.
// One call equals one report.
use std::path::PathBuf;

use chrono::{Local, NaiveDate, NaiveDateTime};

use crate::cleaner;
use crate::config::Config;
use crate::error::Result;
use crate::loader;
use crate::output;
use crate::reports;
use crate::runlog::RunLog;
use crate::types::{CleanReport, Summary};
use crate::util::format_int;

/// What a successful run produced, for the caller's console output.
#[derive(Debug)]
pub struct RunOutcome {
    pub output_path: PathBuf,
    pub rows_loaded: usize,
    pub rows_reported: usize,
    pub clean_report: CleanReport,
    pub summary: Summary,
}

/// Run the full pipeline with the current wall-clock date. Errors are
/// already written to the run log, stage included, when this returns.
pub fn run(config: &Config, log: &mut RunLog) -> Result<RunOutcome> {
    let now = Local::now().naive_local();
    let result = run_at(config, now.date(), now, log);
    if let Err(err) = &result {
        log.error(format!("{} stage failed: {}", err.stage(), err));
    }
    result
}

/// Pipeline body with an injectable clock, so tests can pin the run date.
pub fn run_at(
    config: &Config,
    today: NaiveDate,
    now: NaiveDateTime,
    log: &mut RunLog,
) -> Result<RunOutcome> {
    log.info("starting weekly report generation");

    let (raw, load_report) = loader::load_raw(&config.input_file, today, log)?;
    for expected in &config.data_columns {
        if raw.column_index(expected).is_none() {
            log.warn(format!("expected column '{}' not found in input", expected));
        }
    }

    let (clean, clean_report) = cleaner::clean(&raw, config, today, log)?;
    let summary = reports::summarize(&clean, config);

    let dest = config.resolved_output_path(today);
    output::render(&clean, &summary, &dest, now, config, log)?;

    log.info(format!(
        "weekly report generation completed: {} ({} rows reported, {} dropped)",
        dest.display(),
        format_int(clean.len()),
        format_int(clean_report.total_dropped())
    ));

    Ok(RunOutcome {
        output_path: dest,
        rows_loaded: load_report.rows_loaded,
        rows_reported: clean.len(),
        clean_report,
        summary,
    })
}
