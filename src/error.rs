// Error kinds for the report pipeline.
//
// Config problems are recovered in place (fall back to defaults) and never
// reach this enum; everything here is fatal and ends the run.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed to load data from {path}: {reason}")]
    DataLoad { path: PathBuf, reason: String },

    #[error("data cleaning failed: {reason}")]
    DataCleaning { reason: String },

    #[error("failed to write report to {path}: {reason}")]
    ReportWrite { path: PathBuf, reason: String },
}

impl ReportError {
    pub fn data_load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::DataLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn data_cleaning(reason: impl Into<String>) -> Self {
        Self::DataCleaning {
            reason: reason.into(),
        }
    }

    pub fn report_write(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ReportWrite {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Which pipeline stage produced this error, for the run log.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::DataLoad { .. } => "data load",
            Self::DataCleaning { .. } => "data cleaning",
            Self::ReportWrite { .. } => "report write",
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
