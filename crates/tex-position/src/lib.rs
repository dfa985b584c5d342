//! Byte-offset ranges and a line/column position index.
//!
//! Positions inside the core are always 0-based byte offsets ([`Range`]).
//! [`LineIndex`] is the only place offsets are translated to and from
//! 1-based line + UTF-8 codepoint column, which is the unit used at the
//! editor boundary (see `tex-lsp` for the further 0-based conversion LSP
//! wire positions need).

mod line_index;
mod range;

pub use line_index::LineIndex;
pub use range::Range;
