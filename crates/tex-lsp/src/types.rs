//! Wire-adjacent value types for the six external operations (spec.md §6).
//!
//! Everything here is a plain value: no JSON-RPC framing, no serialization.
//! Positions at this boundary are 0-based `(line, character)` pairs, matching
//! common editor conventions; `Core` converts them to the core's internal
//! 1-based line / byte-offset representation at the edges.

/// A 0-based `(line, character)` position, character counted in UTF-8
/// codepoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// 0-based line number.
    pub line: usize,
    /// 0-based codepoint column.
    pub character: usize,
}

/// A half-open `[start, end)` span expressed in [`Position`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditRange {
    pub start: Position,
    pub end: Position,
}

/// One entry of a `did_change` batch (spec.md §6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// Replaces the entire document.
    Full { text: String },
    /// Replaces the byte span covered by `range`. `range_length` is the
    /// editor's own byte-length count for that span, checked against the
    /// core's index before the edit is applied.
    Incremental { range: EditRange, range_length: usize, text: String },
}

/// Reply shape for `hover` (spec.md §6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverResult {
    pub contents: String,
}

/// Whether a completion's insertion text is literal or a snippet template
/// (spec.md §4.6 `snippet` field, §6 `insertTextFormat`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertTextFormat {
    Plain,
    Snippet,
}

/// A text replacement anchored to a range, applied atomically by the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: EditRange,
    pub new_text: String,
}

/// One completion item (spec.md §6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionItem {
    pub label: String,
    pub filter_text: String,
    pub documentation: String,
    pub detail: String,
    pub insert_text_format: InsertTextFormat,
    pub text_edit: TextEdit,
}
