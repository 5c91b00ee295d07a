//! Span-safe replacement engine.
//!
//! This module provides byte-exact patching with:
//! - Edit sets keyed on source ranges, checked for bounds and overlap
//! - Single-pass application that copies every untouched byte verbatim
//! - Atomic file replacement (write temp + fsync + rename)
//! - File hashes for before/after reporting

use crate::document::SourceRange;
use crate::error::{ConverterError, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Replacement of one source range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// Span of original text being replaced.
    pub range: SourceRange,
    /// Replacement contents.
    pub replacement: String,
}

impl Edit {
    /// Create a new edit.
    pub fn new(range: SourceRange, replacement: impl Into<String>) -> Self {
        Self {
            range,
            replacement: replacement.into(),
        }
    }
}

/// Edits collected during one traversal of one file.
#[derive(Debug, Clone, Default)]
pub struct EditSet {
    edits: Vec<Edit>,
}

impl EditSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an edit to the set.
    pub fn push(&mut self, edit: Edit) {
        self.edits.push(edit);
    }

    /// Number of edits.
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Returns true when the set contains no work.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Apply every edit to `original`, consuming the set.
    pub fn apply(self, original: &str) -> Result<String> {
        apply_edits(original, self.edits)
    }
}

/// Apply non-overlapping edits to `original` in one pass.
///
/// Edits are sorted by start offset, then the text between them is copied
/// verbatim:
///
/// ```text
/// cursor = 0
/// for each edit e (sorted by start):
///     copy original[cursor..e.start]
///     copy e.replacement
///     cursor = e.end
/// copy original[cursor..]
/// ```
///
/// Out-of-bounds spans, spans that split a UTF-8 character, and overlapping
/// spans are rejected before any output is produced.
pub fn apply_edits(original: &str, mut edits: Vec<Edit>) -> Result<String> {
    if edits.is_empty() {
        return Ok(original.to_string());
    }

    edits.sort_by_key(|edit| (edit.range.start, edit.range.end));
    validate_edits(original, &edits)?;

    let grown: usize = edits.iter().map(|edit| edit.replacement.len()).sum();
    let mut result = String::with_capacity(original.len() + grown);
    let mut cursor = 0;

    for edit in &edits {
        result.push_str(&original[cursor..edit.range.start]);
        result.push_str(&edit.replacement);
        cursor = edit.range.end;
    }
    result.push_str(&original[cursor..]);

    Ok(result)
}

/// Check sorted edits against the document they will be applied to.
fn validate_edits(original: &str, sorted: &[Edit]) -> Result<()> {
    let len = original.len();
    let mut previous_end: Option<usize> = None;

    for edit in sorted {
        let SourceRange { start, end, .. } = edit.range;
        if start > end
            || end > len
            || !original.is_char_boundary(start)
            || !original.is_char_boundary(end)
        {
            return Err(ConverterError::InvalidSpan { start, end, len });
        }

        if let Some(prev_end) = previous_end {
            if start < prev_end {
                return Err(ConverterError::OverlappingEdits(start));
            }
        }
        previous_end = Some(end);
    }

    Ok(())
}

/// Compute SHA-256 hash of file contents.
pub fn compute_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let result = hasher.finalize();
    format!("{:x}", result)
}

/// Replace `file_path` with `content` via a synced temp file and a rename.
pub fn write_atomic(file_path: &Path, content: &[u8]) -> Result<()> {
    let temp_path = temp_path_for(file_path)?;
    let mut temp_file =
        File::create(&temp_path).map_err(|e| ConverterError::io(&temp_path, e))?;
    temp_file
        .write_all(content)
        .and_then(|_| temp_file.sync_all())
        .map_err(|e| ConverterError::io(&temp_path, e))?;
    std::fs::rename(&temp_path, file_path).map_err(|e| ConverterError::io(file_path, e))?;
    Ok(())
}

fn temp_path_for(file_path: &Path) -> Result<PathBuf> {
    let file_dir = match file_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        Some(_) => Path::new("."),
        None => {
            return Err(ConverterError::Other(format!(
                "File has no parent directory: {}",
                file_path.display()
            )))
        }
    };
    let file_name = file_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("tmp");
    Ok(file_dir.join(format!(".{}.convert.tmp", file_name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(start: usize, end: usize, replacement: &str) -> Edit {
        Edit::new(SourceRange::new(start, end, 1), replacement)
    }

    #[test]
    fn test_simple_replacement() {
        let source = "get :index, {id: 1}\n";
        let result = apply_edits(source, vec![edit(0, 19, "get :index, params: {id: 1}")])
            .expect("apply");
        assert_eq!(result, "get :index, params: {id: 1}\n");
    }

    #[test]
    fn test_unsorted_edits_are_applied_in_order() {
        let source = "a = 1; b = 2; c = 3";
        let edits = vec![edit(14, 19, "C"), edit(0, 5, "A")];
        let result = apply_edits(source, edits).expect("apply");
        assert_eq!(result, "A; b = 2; C");
    }

    #[test]
    fn test_adjacent_edits_do_not_overlap() {
        let result = apply_edits("abcd", vec![edit(0, 2, "X"), edit(2, 4, "Y")]).expect("apply");
        assert_eq!(result, "XY");
    }

    #[test]
    fn test_empty_edits() {
        assert_eq!(apply_edits("unchanged", Vec::new()).expect("apply"), "unchanged");
    }

    #[test]
    fn test_overlap_is_rejected() {
        let result = apply_edits("abcdef", vec![edit(0, 4, "X"), edit(3, 5, "Y")]);
        assert!(matches!(result, Err(ConverterError::OverlappingEdits(3))));
    }

    #[test]
    fn test_out_of_bounds() {
        let result = apply_edits("short", vec![edit(0, 100, "replacement")]);
        assert!(matches!(result, Err(ConverterError::InvalidSpan { .. })));
    }

    #[test]
    fn test_split_character_is_rejected() {
        let result = apply_edits("é", vec![edit(1, 2, "e")]);
        assert!(matches!(result, Err(ConverterError::InvalidSpan { .. })));
    }

    #[test]
    fn test_edit_set_apply() {
        let mut set = EditSet::new();
        assert!(set.is_empty());
        set.push(edit(4, 5, "2"));
        assert_eq!(set.len(), 1);
        assert_eq!(set.apply("x = 1 # keep").expect("apply"), "x = 2 # keep");
    }

    #[test]
    fn test_write_atomic_replaces_contents() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("users_spec.rb");
        std::fs::write(&path, "old").expect("seed");
        write_atomic(&path, b"new").expect("write");
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "new");
        assert!(!dir.path().join(".users_spec.rb.convert.tmp").exists());
    }

    #[test]
    fn test_hash_is_hex_sha256() {
        let hash = compute_hash(b"");
        assert_eq!(
            hash,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
