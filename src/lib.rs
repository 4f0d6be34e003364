//! Weekly sales report generator.
//!
//! Loads a delimited sales extract, cleans and validates it, computes
//! summary statistics and writes a formatted three-sheet Excel report
//! (Summary, Raw Data, Charts). Built to run unattended from cron or a
//! task scheduler: a missing input produces sample data, a bad config
//! falls back to defaults, and every stage reports progress to an
//! append-only run log.

pub mod cleaner;
pub mod config;
pub mod error;
pub mod loader;
pub mod output;
pub mod pipeline;
pub mod reports;
pub mod runlog;
pub mod types;
pub mod util;

pub use config::Config;
pub use error::{ReportError, Result};
pub use runlog::RunLog;
pub use types::{CellValue, CleanReport, CleanTable, RawTable, Summary};
