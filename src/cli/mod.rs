//! Command-line interface for the converter.
//!
//! This module handles argument parsing and output payloads only.
//! NO conversion logic is performed here.

use crate::options::{HashSpacing, Options, StyleOptions, DEFAULT_SHIM_LABEL, DEFAULT_VERSION_GUARD};
use crate::runner::RunReport;
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;

/// Rewrite Rails controller and request specs to keyword-argument HTTP calls.
#[derive(Parser, Debug)]
#[command(name = "rails5-spec-converter")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Spec files or directories (default: spec/**/*_spec.rb and test/**/*_test.rb).
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Run quietly.
    #[arg(short, long)]
    pub quiet: bool,

    /// Use specified string for indentation (default is two spaces; `\t` means a tab).
    #[arg(short, long, value_name = "INDENT")]
    pub indent: Option<String>,

    /// Always add space inside hash braces ({ foo: 'bar' }).
    #[arg(long, overrides_with = "no_hash_spacing")]
    pub hash_spacing: bool,

    /// Never add space inside hash braces ({foo: 'bar'}).
    #[arg(long, overrides_with = "hash_spacing")]
    pub no_hash_spacing: bool,

    /// Ruby expression selecting the new call form at runtime.
    #[arg(long, value_name = "EXPR", default_value = DEFAULT_VERSION_GUARD)]
    pub guard: String,

    /// Label written into the `# TODO: <LABEL> autofix` marker.
    #[arg(long, value_name = "TEXT", default_value = DEFAULT_SHIM_LABEL)]
    pub label: String,

    /// Print a JSON report instead of progress lines.
    #[arg(long)]
    pub json: bool,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Tri-state value of the `--[no-]hash-spacing` pair.
    pub fn hash_spacing_flag(&self) -> Option<bool> {
        if self.hash_spacing {
            Some(true)
        } else if self.no_hash_spacing {
            Some(false)
        } else {
            None
        }
    }

    /// Build conversion options from the parsed arguments.
    pub fn options(&self) -> Options {
        let mut style = StyleOptions {
            hash_spacing: HashSpacing::from_flag(self.hash_spacing_flag()),
            ..StyleOptions::default()
        };
        if let Some(indent) = &self.indent {
            style.indent_unit = Options::indent_from_arg(indent);
        }

        Options {
            quiet: self.quiet || self.json,
            style,
            file_path: None,
            shim_label: self.label.clone(),
            version_guard: self.guard.clone(),
        }
    }
}

/// Parse command-line arguments.
///
/// Returns the parsed Cli struct or exits on error.
pub fn parse_args() -> Cli {
    Cli::parse()
}

/// JSON payload printed under `--json`.
#[derive(Serialize)]
pub struct RunPayload<'r> {
    /// Status indicator ("ok" or "error").
    pub status: &'static str,
    /// Human-readable summary.
    pub message: String,
    /// Full per-file report.
    pub report: &'r RunReport,
}

impl<'r> RunPayload<'r> {
    /// Build the payload for a finished run.
    pub fn new(report: &'r RunReport) -> Self {
        Self {
            status: if report.is_success() { "ok" } else { "error" },
            message: summary(report),
            report,
        }
    }
}

/// One-line summary of a run.
pub fn summary(report: &RunReport) -> String {
    format!(
        "Rewrote {} call sites in {} of {} files",
        report.rewritten(),
        report.converted(),
        report.files.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_spacing_last_flag_wins() {
        let cli = Cli::parse_from(["rails5-spec-converter", "--hash-spacing", "--no-hash-spacing"]);
        assert_eq!(cli.hash_spacing_flag(), Some(false));
        let cli = Cli::parse_from(["rails5-spec-converter", "--no-hash-spacing", "--hash-spacing"]);
        assert_eq!(cli.hash_spacing_flag(), Some(true));
        let cli = Cli::parse_from(["rails5-spec-converter"]);
        assert_eq!(cli.hash_spacing_flag(), None);
    }

    #[test]
    fn test_options_from_args() {
        let cli = Cli::parse_from([
            "rails5-spec-converter",
            "-q",
            "--indent",
            "\\t",
            "spec/controllers",
        ]);
        let options = cli.options();
        assert!(options.quiet);
        assert_eq!(options.style.indent_unit, "\t");
        assert_eq!(options.style.hash_spacing, HashSpacing::Preserve);
        assert_eq!(options.version_guard, "Fave.next_version?");
        assert_eq!(cli.files, vec![PathBuf::from("spec/controllers")]);
    }

    #[test]
    fn test_json_implies_quiet() {
        let cli = Cli::parse_from(["rails5-spec-converter", "--json"]);
        assert!(cli.options().quiet);
    }

    #[test]
    fn test_payload_status() {
        let mut report = RunReport::default();
        assert_eq!(RunPayload::new(&report).status, "ok");
        report.pattern_errors.push("bad".to_string());
        let payload = RunPayload::new(&report);
        assert_eq!(payload.status, "error");
        assert_eq!(payload.message, "Rewrote 0 call sites in 0 of 0 files");
    }
}
