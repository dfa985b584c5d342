//! Line/column ↔ byte-offset conversion.
//!
//! Internally every position is a 0-based byte offset, the idiomatic Rust
//! convention. [`LineIndex`] is the only place that crosses into line +
//! UTF-8 codepoint column, which is the unit FileCache exposes at
//! `get_position`/`get_line_col` (spec.md §4.1): both are 1-based there, as
//! spec.md §4.1 requires; `tex-lsp` performs the further 1-based → 0-based
//! conversion the editor boundary (spec.md §6) needs.

/// An index of line-start byte offsets for O(log n) position conversion.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset of the first byte of each line; `line_starts[0] == 0`.
    line_starts: Vec<usize>,
    text_len: usize,
}

impl LineIndex {
    /// Builds a new index by scanning `text` for line breaks. Treats `\n`
    /// and `\r\n` as a single line break; a lone `\r` is not.
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        let bytes = text.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'\n' {
                line_starts.push(i + 1);
            }
            i += 1;
        }
        Self { line_starts, text_len: text.len() }
    }

    /// Number of lines in the indexed text (always >= 1).
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Converts a 0-based byte offset to a (1-based line, 1-based UTF-8
    /// codepoint column) pair. Offsets past end-of-text clamp to the last
    /// position.
    pub fn get_line_col(&self, text: &str, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.text_len);
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        let line_start = self.line_starts[line_idx];
        let col = text[line_start..offset].chars().count() + 1;
        (line_idx + 1, col)
    }

    /// Converts a (1-based line, 1-based UTF-8 codepoint column) pair to a
    /// 0-based byte offset. Columns past end-of-line clamp to the line's
    /// final byte offset (before its trailing newline, if any); lines past
    /// end-of-text clamp to `text.len()`.
    pub fn get_position(&self, text: &str, line: usize, col: usize) -> usize {
        if line == 0 {
            return 0;
        }
        let line_idx = line - 1;
        if line_idx >= self.line_starts.len() {
            return self.text_len;
        }
        let line_start = self.line_starts[line_idx];
        let line_end = self.line_end_excluding_newline(text, line_idx);
        let line_text = &text[line_start..line_end];
        let mut byte_off = line_text.len();
        let mut count = 0usize;
        for (idx, _ch) in line_text.char_indices() {
            count += 1;
            if count == col {
                byte_off = idx;
                return line_start + byte_off;
            }
        }
        // col <= 1 with an empty line, or col beyond the line's codepoint
        // count: clamp to the line's final byte offset.
        if col <= 1 {
            line_start
        } else {
            line_start + byte_off
        }
    }

    fn line_end_excluding_newline(&self, text: &str, line_idx: usize) -> usize {
        let raw_end = if line_idx + 1 < self.line_starts.len() {
            self.line_starts[line_idx + 1]
        } else {
            self.text_len
        };
        let bytes = text.as_bytes();
        if raw_end > self.line_starts[line_idx] && bytes.get(raw_end - 1) == Some(&b'\n') {
            let mut end = raw_end - 1;
            if end > self.line_starts[line_idx] && bytes.get(end - 1) == Some(&b'\r') {
                end -= 1;
            }
            end
        } else {
            raw_end
        }
    }
}
