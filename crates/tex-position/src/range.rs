//! `{pos, len}` byte ranges — the ubiquitous unit of spec.md §3.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A byte offset and byte length. `pos` is inclusive, `pos + len` exclusive.
///
/// Byte offsets are 0-based, the idiomatic Rust convention (the original
/// Digestif-style implementation this system is modeled on used 1-based
/// string indices, a property of its host language rather than the
/// semantics this spec requires — see `DESIGN.md`). Line numbers and
/// columns, which spec.md §4.1 pins to 1-based explicitly, are unaffected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Range {
    /// Starting byte offset, 0-based.
    pub pos: usize,
    /// Length in bytes.
    pub len: usize,
}

impl Range {
    /// Creates a new range.
    #[inline]
    pub const fn new(pos: usize, len: usize) -> Self {
        Self { pos, len }
    }

    /// An empty (absent) range at `pos`, used for optional arguments that
    /// were not present in the source (spec.md §4.2).
    #[inline]
    pub const fn absent(pos: usize) -> Self {
        Self { pos, len: 0 }
    }

    /// Byte offset one past the last byte of the range.
    #[inline]
    pub const fn end(&self) -> usize {
        self.pos + self.len
    }

    /// True if `len == 0` — used to mark absent optional arguments.
    #[inline]
    pub const fn is_absent(&self) -> bool {
        self.len == 0
    }

    /// True if `pos` lies within `[self.pos, self.pos + self.len]` inclusive
    /// of both endpoints, matching the context-stack invariant of spec.md §8
    /// property 5 (`frame.pos <= pos <= frame.pos + frame.len`).
    #[inline]
    pub const fn contains_inclusive(&self, pos: usize) -> bool {
        pos >= self.pos && pos <= self.end()
    }

    /// True if `other` is strictly contained within this range (used to
    /// check the context-stack parent/child nesting invariant).
    #[inline]
    pub const fn strictly_contains(&self, other: &Range) -> bool {
        self.pos <= other.pos && other.end() <= self.end() && self.len > other.len
    }

    /// Extracts the slice of `text` covered by this range.
    ///
    /// # Panics
    ///
    /// Panics if the range falls outside `text`'s bounds.
    #[inline]
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.pos..self.end()]
    }

    /// Returns a range spanning from the start of `self` to the end of
    /// `other`, used to build the combined `{pos, len}` an argument list
    /// carries over its whole signature (spec.md §4.2).
    pub fn join(&self, other: &Range) -> Range {
        let pos = self.pos.min(other.pos);
        let end = self.end().max(other.end());
        Range::new(pos, end - pos)
    }
}
