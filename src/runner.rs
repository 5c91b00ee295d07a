//! File discovery and per-file conversion.
//!
//! Each file is read, transformed and written back on its own; a failure on
//! one file is recorded and the run moves on to the next.

use crate::error::{ConverterError, Result};
use crate::options::Options;
use crate::patch::{compute_hash, write_atomic};
use crate::rewrite::TextTransformer;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Patterns used when no paths are given.
pub const DEFAULT_PATTERNS: [&str; 2] = ["spec/**/*_spec.rb", "test/**/*_test.rb"];

/// What happened to one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// At least one call site was rewritten and the file was written.
    Converted,
    /// Nothing needed rewriting.
    Unchanged,
    /// The parser rejected the file; it was left as is.
    Unparsable,
    /// Reading or writing the file failed.
    Failed,
}

/// Per-file outcome.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    /// Path as matched by the glob.
    pub path: PathBuf,
    /// Outcome.
    pub status: FileStatus,
    /// Call sites rewritten.
    pub rewritten: usize,
    /// Candidate call sites skipped.
    pub skipped: usize,
    /// SHA-256 of the file before conversion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_hash: Option<String>,
    /// SHA-256 after conversion, when the file was written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_hash: Option<String>,
    /// Parser or I/O diagnostic.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Error kind for failed files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
}

impl FileReport {
    fn failed(path: &Path, err: &ConverterError) -> Self {
        Self {
            path: path.to_path_buf(),
            status: FileStatus::Failed,
            rewritten: 0,
            skipped: 0,
            before_hash: None,
            after_hash: None,
            message: Some(err.to_string()),
            error_kind: Some(err.kind()),
        }
    }
}

/// Summary of a whole run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// One entry per processed file, in processing order.
    pub files: Vec<FileReport>,
    /// Patterns that could not be expanded.
    pub pattern_errors: Vec<String>,
}

impl RunReport {
    /// Call sites rewritten across all files.
    pub fn rewritten(&self) -> usize {
        self.files.iter().map(|file| file.rewritten).sum()
    }

    /// Files that were written.
    pub fn converted(&self) -> usize {
        self.count(FileStatus::Converted)
    }

    /// Files with the given status.
    pub fn count(&self, status: FileStatus) -> usize {
        self.files.iter().filter(|file| file.status == status).count()
    }

    /// True when no pattern was invalid and no file failed.
    pub fn is_success(&self) -> bool {
        self.pattern_errors.is_empty() && self.count(FileStatus::Failed) == 0
    }
}

/// Turn command-line paths into glob patterns.
///
/// Directories expand to every `*_spec.rb` below them, files are used as is,
/// and an empty list falls back to [`DEFAULT_PATTERNS`].
pub fn expand_paths(paths: &[PathBuf]) -> Vec<String> {
    if paths.is_empty() {
        return DEFAULT_PATTERNS.iter().map(|p| p.to_string()).collect();
    }
    paths
        .iter()
        .map(|path| {
            let path_str = path.to_string_lossy();
            if path.is_dir() {
                format!("{}/**/*_spec.rb", path_str.trim_end_matches('/'))
            } else {
                path_str.into_owned()
            }
        })
        .collect()
}

/// Convert a single file in place.
pub fn convert_file(path: &Path, options: &Options) -> Result<FileReport> {
    let original = std::fs::read_to_string(path).map_err(|e| ConverterError::io(path, e))?;
    let before_hash = compute_hash(original.as_bytes());

    let file_options = options.for_file(path);
    let transformed = TextTransformer::new(original, &file_options).transform();

    if let Some(message) = transformed.parse_error {
        return Ok(FileReport {
            path: path.to_path_buf(),
            status: FileStatus::Unparsable,
            rewritten: 0,
            skipped: 0,
            before_hash: Some(before_hash),
            after_hash: None,
            message: Some(message),
            error_kind: None,
        });
    }

    if !transformed.changed() {
        return Ok(FileReport {
            path: path.to_path_buf(),
            status: FileStatus::Unchanged,
            rewritten: 0,
            skipped: transformed.skipped,
            before_hash: Some(before_hash),
            after_hash: None,
            message: None,
            error_kind: None,
        });
    }

    write_atomic(path, transformed.content.as_bytes())?;
    let after_hash = compute_hash(transformed.content.as_bytes());

    Ok(FileReport {
        path: path.to_path_buf(),
        status: FileStatus::Converted,
        rewritten: transformed.rewritten,
        skipped: transformed.skipped,
        before_hash: Some(before_hash),
        after_hash: Some(after_hash),
        message: None,
        error_kind: None,
    })
}

/// Convert every file matched by `patterns`.
pub fn run(patterns: &[String], options: &Options) -> RunReport {
    let mut report = RunReport::default();

    for pattern in patterns {
        let entries = match glob::glob(pattern) {
            Ok(entries) => entries,
            Err(e) => {
                let err = ConverterError::Pattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                };
                log::error!("{}", err);
                report.pattern_errors.push(err.to_string());
                continue;
            }
        };

        for entry in entries {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    let path = e.path().to_path_buf();
                    let err = ConverterError::io(path.clone(), e.into());
                    log::warn!("{}", err);
                    report.files.push(FileReport::failed(&path, &err));
                    continue;
                }
            };
            if path.is_dir() {
                continue;
            }
            report.files.push(process(&path, options));
        }
    }

    report
}

fn process(path: &Path, options: &Options) -> FileReport {
    progress(options, &format!("Processing: {}", path.display()));

    let file_report = match convert_file(path, options) {
        Ok(file_report) => file_report,
        Err(err) => {
            log::warn!("{}", err);
            progress(options, &format!("Failed: {}\n", err));
            return FileReport::failed(path, &err);
        }
    };

    if file_report.status == FileStatus::Unparsable {
        progress(options, "Parser saw some unparsable content, skipping...\n");
    }
    file_report
}

fn progress(options: &Options, message: &str) {
    if options.quiet {
        return;
    }
    println!("{}", message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_expand_defaults() {
        assert_eq!(
            expand_paths(&[]),
            vec!["spec/**/*_spec.rb".to_string(), "test/**/*_test.rb".to_string()]
        );
    }

    #[test]
    fn test_expand_directory_and_file() {
        let dir = TempDir::new().expect("temp dir");
        let file = dir.path().join("one_spec.rb");
        std::fs::write(&file, "").expect("write");
        let patterns = expand_paths(&[dir.path().to_path_buf(), file.clone()]);
        assert_eq!(patterns[0], format!("{}/**/*_spec.rb", dir.path().display()));
        assert_eq!(patterns[1], file.display().to_string());
    }

    #[test]
    fn test_convert_file_writes_only_on_change() {
        let dir = TempDir::new().expect("temp dir");
        let changed = dir.path().join("changed_spec.rb");
        let same = dir.path().join("same_spec.rb");
        std::fs::write(&changed, "get :index, {id: 1}\n").expect("write");
        std::fs::write(&same, "get :index\n").expect("write");

        let options = Options {
            quiet: true,
            ..Options::default()
        };
        let report = convert_file(&changed, &options).expect("convert");
        assert_eq!(report.status, FileStatus::Converted);
        assert_eq!(report.rewritten, 1);
        assert_ne!(report.before_hash, report.after_hash);
        assert!(std::fs::read_to_string(&changed)
            .expect("read")
            .contains("params: {id: 1}"));

        let report = convert_file(&same, &options).expect("convert");
        assert_eq!(report.status, FileStatus::Unchanged);
        assert!(report.after_hash.is_none());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = TempDir::new().expect("temp dir");
        let missing = dir.path().join("nope_spec.rb");
        let err = convert_file(&missing, &Options::default()).unwrap_err();
        assert!(matches!(err, ConverterError::Io { .. }));

        let report = process(&missing, &Options { quiet: true, ..Options::default() });
        assert_eq!(report.status, FileStatus::Failed);
        assert_eq!(report.error_kind, Some("Io"));
    }

    #[test]
    fn test_run_isolates_unparsable_files() {
        let dir = TempDir::new().expect("temp dir");
        let good = dir.path().join("good_spec.rb");
        let bad = dir.path().join("bad_spec.rb");
        std::fs::write(&good, "post :create, {}\n").expect("write");
        std::fs::write(&bad, "post :create, {\n").expect("write");

        let options = Options {
            quiet: true,
            ..Options::default()
        };
        let report = run(&expand_paths(&[dir.path().to_path_buf()]), &options);
        assert_eq!(report.files.len(), 2);
        assert_eq!(report.count(FileStatus::Unparsable), 1);
        assert_eq!(report.converted(), 1);
        assert_eq!(report.rewritten(), 1);
        assert!(report.is_success());
        assert_eq!(std::fs::read_to_string(&bad).expect("read"), "post :create, {\n");
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let options = Options {
            quiet: true,
            ..Options::default()
        };
        let report = run(&["spec/[".to_string()], &options);
        assert_eq!(report.pattern_errors.len(), 1);
        assert!(!report.is_success());
    }
}
