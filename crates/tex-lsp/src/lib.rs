//! Synchronous core API for a TeX/LaTeX language server (spec.md §6).
//!
//! This crate is the outermost layer: a protocol shell (JSON-RPC framing,
//! method dispatch, URI decoding) is an external collaborator and out of
//! scope here. `Core` exposes plain values; nothing in this crate touches
//! the network or blocks.

mod core;
mod types;

pub use crate::core::Core;
pub use tex_manuscript::CoreError;
pub use types::{Change, CompletionItem, EditRange, HoverResult, InsertTextFormat, Position, TextEdit};
