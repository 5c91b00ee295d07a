//! Immutable source text with a line index.
//!
//! The document is built once per file and never mutated. Byte ranges read
//! from it are the same ranges edits are keyed on.
//!
//! Only `\n` ends a line, as in the parser's row count. The rope is built
//! without ropey's Unicode and CR line-break features, so U+2028, form feed
//! and a lone `\r` stay inside their line.

use ropey::Rope;

/// Half-open byte span into a [`Document`], plus the 1-based line it starts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceRange {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
    /// Line the span starts on (1-based).
    pub line: usize,
}

impl SourceRange {
    /// Create a new range.
    pub fn new(start: usize, end: usize, line: usize) -> Self {
        Self { start, end, line }
    }
}

/// Original file text with rope-backed line lookups.
#[derive(Debug, Clone)]
pub struct Document {
    text: String,
    rope: Rope,
}

impl Document {
    /// Build a document over `text`.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let rope = Rope::from_str(&text);
        Self { text, rope }
    }

    /// The full original text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Text covered by `range`. Out-of-bounds ranges yield an empty string.
    pub fn slice(&self, range: SourceRange) -> &str {
        self.text.get(range.start..range.end).unwrap_or("")
    }

    /// Line `line` (1-based) without its terminator.
    pub fn line(&self, line: usize) -> Option<&str> {
        if line == 0 || line > self.rope.len_lines() {
            return None;
        }
        let index = line - 1;
        let start = self.rope.line_to_byte(index);
        let end = if index + 1 < self.rope.len_lines() {
            self.rope.line_to_byte(index + 1)
        } else {
            self.text.len()
        };
        let raw = self.text.get(start..end)?;
        Some(raw.trim_end_matches(['\n', '\r']))
    }

    /// 1-based line containing `offset`.
    pub fn line_of(&self, offset: usize) -> usize {
        self.rope.byte_to_line(offset.min(self.text.len())) + 1
    }

    /// Text from `offset` to the end of its line, without the terminator.
    pub fn rest_of_line(&self, offset: usize) -> &str {
        let tail = self.text.get(offset..).unwrap_or("");
        let end = tail.find('\n').unwrap_or(tail.len());
        tail[..end].trim_end_matches('\r')
    }

    /// Leading spaces and tabs of line `line`.
    pub fn line_indent(&self, line: usize) -> &str {
        let text = self.line(line).unwrap_or("");
        let width = text
            .bytes()
            .take_while(|b| *b == b' ' || *b == b'\t')
            .count();
        &text[..width]
    }
}
