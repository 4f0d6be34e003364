// Entry point.
//
// Batch flow: read the optional config file, run the pipeline once, print
// a success/failure banner and exit accordingly. All diagnostics go to the
// run log; the console gets the banner plus a short summary preview.
use std::env;
use std::path::Path;
use std::process;

use weekly_report::config::Config;
use weekly_report::output;
use weekly_report::pipeline;
use weekly_report::runlog::{RunLog, DEFAULT_LOG_FILE};
use weekly_report::util::format_int;

const DEFAULT_CONFIG_FILE: &str = "config.json";

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() > 2 {
        eprintln!("Usage: {} [config.json]", args[0]);
        process::exit(2);
    }
    let config_path = args
        .get(1)
        .map(String::as_str)
        .unwrap_or(DEFAULT_CONFIG_FILE);

    let mut log = RunLog::open(Path::new(DEFAULT_LOG_FILE));
    let config = Config::load(Path::new(config_path), &mut log);

    match pipeline::run(&config, &mut log) {
        Ok(outcome) => {
            println!("✅ Weekly report generated successfully!");
            println!("📊 Report saved as: {}", outcome.output_path.display());
            println!(
                "({} rows loaded, {} reported, {} dropped during cleaning)\n",
                format_int(outcome.rows_loaded),
                format_int(outcome.rows_reported),
                format_int(outcome.clean_report.total_dropped())
            );
            output::preview_summary(&outcome.summary);
        }
        Err(_) => {
            // already logged with stage context by the pipeline
            println!(
                "❌ Report generation failed. Check {} for details.",
                DEFAULT_LOG_FILE
            );
            process::exit(1);
        }
    }
}
