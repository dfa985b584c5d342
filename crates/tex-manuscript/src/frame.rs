//! The context stack produced by `local_scan` (spec.md §4.4, §8 property 5).

use std::sync::Arc;
use tex_dictionary::{ArgumentSpec, CommandDescriptor, EnvironmentDescriptor, KeyDescriptor};

/// What the caret is inside, innermost first.
#[derive(Debug, Clone)]
pub enum FrameKind {
    /// Bottom sentinel; the caret is not inside any recognized construct.
    Root,
    /// Inside the name of a control sequence.
    Command {
        /// The command name (without leading backslash).
        name: String,
        /// The command's descriptor, if it is known to the active scope.
        descriptor: Option<Arc<CommandDescriptor>>,
    },
    /// Inside the name of an environment (its `\begin{name}` argument).
    Environment {
        /// The environment name.
        name: String,
        /// The environment's descriptor, if known.
        descriptor: Option<Arc<EnvironmentDescriptor>>,
    },
    /// Inside a specific, indexed argument slot of a command/environment.
    Argument {
        /// 0-based index of this argument within its signature.
        index: usize,
        /// The argument's declared shape and metadata, if the signature is
        /// known.
        spec: Option<ArgumentSpec>,
    },
    /// Inside a key within a key=value argument.
    KeyInList {
        /// The key text as written (may be partial if still being typed).
        key: String,
    },
    /// Inside the value part of a key=value pair.
    ValueInKey {
        /// The owning key's name.
        key: String,
        /// The key's declared schema, if known.
        spec: Option<KeyDescriptor>,
    },
}

/// One frame of the context stack: `{pos, len, data, parent}` per spec.md
/// §4.4. Chained from innermost to the `Root` sentinel.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Byte offset where this frame's range begins.
    pub pos: usize,
    /// Byte length of this frame's range.
    pub len: usize,
    /// What this frame represents.
    pub kind: FrameKind,
    /// The next frame out, or `None` only for the `Root` sentinel.
    pub parent: Option<Arc<Frame>>,
}

impl Frame {
    /// The bottom sentinel frame spanning the whole scanned region.
    pub fn root(pos: usize, len: usize) -> Arc<Frame> {
        Arc::new(Frame { pos, len, kind: FrameKind::Root, parent: None })
    }

    /// `pos + len`, the range's exclusive end.
    pub fn end(&self) -> usize {
        self.pos + self.len
    }

    /// Whether `at` falls within `[pos, pos + len]` inclusive of both
    /// endpoints, matching spec.md §8 property 5's invariant exactly.
    pub fn contains(&self, at: usize) -> bool {
        self.pos <= at && at <= self.end()
    }
}
