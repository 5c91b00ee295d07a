//! Conversion options.
//!
//! Built once by the CLI layer and read-only for the engine.

use std::path::PathBuf;

/// Default indentation unit.
pub const DEFAULT_INDENT: &str = "  ";

/// Default label written into the shim's TODO marker.
pub const DEFAULT_SHIM_LABEL: &str = "Rails 5";

/// Default runtime check selecting the new call form.
pub const DEFAULT_VERSION_GUARD: &str = "Fave.next_version?";

/// Spacing inside braces the converter adds around a hash.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HashSpacing {
    /// Always `{ foo: 1 }`.
    Always,
    /// Always `{foo: 1}`.
    Never,
    /// Keep braces as written; braces the converter introduces get spaces.
    #[default]
    Preserve,
}

impl HashSpacing {
    /// Map the `--[no-]hash-spacing` flag pair onto a spacing mode.
    pub fn from_flag(flag: Option<bool>) -> Self {
        match flag {
            Some(true) => HashSpacing::Always,
            Some(false) => HashSpacing::Never,
            None => HashSpacing::Preserve,
        }
    }
}

/// Formatting knobs the rewrite engine reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleOptions {
    /// One level of indentation.
    pub indent_unit: String,
    /// Brace spacing for hashes.
    pub hash_spacing: HashSpacing,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            indent_unit: DEFAULT_INDENT.to_string(),
            hash_spacing: HashSpacing::Preserve,
        }
    }
}

/// Options for converting one or more files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Suppress progress output.
    pub quiet: bool,
    /// Formatting of generated code.
    pub style: StyleOptions,
    /// Path of the file being converted, used for test type detection.
    pub file_path: Option<PathBuf>,
    /// Label in the `# TODO: <label> autofix` marker.
    pub shim_label: String,
    /// Ruby expression guarding the new call form.
    pub version_guard: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            quiet: false,
            style: StyleOptions::default(),
            file_path: None,
            shim_label: DEFAULT_SHIM_LABEL.to_string(),
            version_guard: DEFAULT_VERSION_GUARD.to_string(),
        }
    }
}

impl Options {
    /// Expand a command-line indent argument; the two characters `\t` mean a tab.
    pub fn indent_from_arg(arg: &str) -> String {
        arg.replace("\\t", "\t")
    }

    /// Copy of these options pointing at `path`.
    pub fn for_file(&self, path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: Some(path.into()),
            ..self.clone()
        }
    }
}
