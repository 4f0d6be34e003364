// Run logging.
//
// One `RunLog` instance per run, created by the caller and passed down to
// the stages that report progress. Lines are appended to a human-readable
// log file and echoed to the console; there is no global logger state.
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use chrono::Local;

/// Default log file name, next to wherever the tool is invoked.
pub const DEFAULT_LOG_FILE: &str = "weekly_report.log";

pub struct RunLog {
    file: Option<File>,
    echo: bool,
}

impl RunLog {
    /// Open (or create) the append-only log file. A log file that cannot be
    /// opened downgrades to console-only logging; it never fails the run.
    pub fn open(path: &Path) -> RunLog {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => RunLog {
                file: Some(file),
                echo: true,
            },
            Err(err) => {
                eprintln!(
                    "warning: could not open log file {}: {}; logging to console only",
                    path.display(),
                    err
                );
                RunLog {
                    file: None,
                    echo: true,
                }
            }
        }
    }

    /// Console-only log, used by tests and callers that manage their own
    /// output capture.
    pub fn console_only() -> RunLog {
        RunLog {
            file: None,
            echo: true,
        }
    }

    /// A log that goes nowhere. Keeps test output quiet.
    pub fn sink() -> RunLog {
        RunLog {
            file: None,
            echo: false,
        }
    }

    pub fn info(&mut self, message: impl AsRef<str>) {
        self.write("INFO", message.as_ref());
    }

    pub fn warn(&mut self, message: impl AsRef<str>) {
        self.write("WARNING", message.as_ref());
    }

    pub fn error(&mut self, message: impl AsRef<str>) {
        self.write("ERROR", message.as_ref());
    }

    fn write(&mut self, level: &str, message: &str) {
        let line = format!(
            "{} - {} - {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            level,
            message
        );
        if self.echo {
            if level == "INFO" {
                println!("{}", line);
            } else {
                eprintln!("{}", line);
            }
        }
        if let Some(file) = self.file.as_mut() {
            // A failed log write must not take the run down with it.
            let _ = writeln!(file, "{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_timestamped_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");

        let mut log = RunLog::open(&path);
        log.info("first");
        log.warn("second");
        drop(log);

        let mut log = RunLog::open(&path);
        log.error("third");
        drop(log);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains(" - INFO - first"));
        assert!(lines[1].contains(" - WARNING - second"));
        assert!(lines[2].contains(" - ERROR - third"));
    }

    #[test]
    fn unopenable_log_path_degrades_to_console() {
        let mut log = RunLog::open(Path::new("/definitely/not/a/dir/run.log"));
        log.info("still fine");
    }
}
