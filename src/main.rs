//! rails5-spec-converter CLI binary
//!
//! This is the main entry point for the command-line interface.
//! The CLI is a thin adapter over existing APIs - NO logic is implemented here.

use spec_converter::cli::{self, RunPayload};
use spec_converter::runner;
use std::process::ExitCode;

fn main() -> ExitCode {
    // Parse CLI arguments
    let cli = cli::parse_args();

    // Initialize logger if verbose
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    }

    let options = cli.options();
    let patterns = runner::expand_paths(&cli.files);
    let report = runner::run(&patterns, &options);

    if cli.json {
        match serde_json::to_string_pretty(&RunPayload::new(&report)) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(1);
            }
        }
    } else {
        for error in &report.pattern_errors {
            eprintln!("Error: {}", error);
        }
        if !options.quiet {
            println!("{}", cli::summary(&report));
        }
    }

    if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
