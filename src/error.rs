//! Converter error types.
//!
//! All errors are typed and provide root cause information. Call sites that
//! are merely skipped are not errors; see `rewrite::SkipReason`.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for converter operations.
#[derive(Error, Debug)]
pub enum ConverterError {
    /// I/O error during file operations.
    #[error("I/O error for path {path}: {source}")]
    Io {
        /// The file path that caused the I/O error.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The parser could not build a clean tree for the input.
    #[error("Parse error in {file}: {message}")]
    Parse {
        /// The file that failed to parse.
        file: PathBuf,
        /// The parse error message.
        message: String,
    },

    /// The Ruby grammar could not be loaded into the parser.
    #[error("Failed to load Ruby grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    /// A glob pattern supplied on the command line was malformed.
    #[error("Invalid glob pattern '{pattern}': {message}")]
    Pattern {
        /// The offending pattern.
        pattern: String,
        /// Why the pattern was rejected.
        message: String,
    },

    /// Edit span does not fit the document.
    #[error("Invalid span ({start}, {end}) for document of {len} bytes")]
    InvalidSpan {
        /// Start byte offset.
        start: usize,
        /// End byte offset.
        end: usize,
        /// Length of the document.
        len: usize,
    },

    /// Two edits claim the same bytes.
    #[error("Overlapping edits at byte {0}")]
    OverlappingEdits(usize),

    /// Generic error with context.
    #[error("{0}")]
    Other(String),
}

impl ConverterError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConverterError::Io {
            path: path.into(),
            source,
        }
    }

    /// Short identifier for the error kind, used in JSON reports.
    pub fn kind(&self) -> &'static str {
        match self {
            ConverterError::Io { .. } => "Io",
            ConverterError::Parse { .. } => "Parse",
            ConverterError::Language(_) => "Language",
            ConverterError::Pattern { .. } => "Pattern",
            ConverterError::InvalidSpan { .. } => "InvalidSpan",
            ConverterError::OverlappingEdits(_) => "OverlappingEdits",
            ConverterError::Other(_) => "Other",
        }
    }
}

/// Result type alias for converter operations.
pub type Result<T> = std::result::Result<T, ConverterError>;
