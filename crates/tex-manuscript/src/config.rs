use std::path::PathBuf;

/// Manuscript construction/scan parameters (spec.md §4.9), supplied by the
/// caller rather than read from disk by this crate.
#[derive(Debug, Clone)]
pub struct ManuscriptConfig {
    /// Include-graph recursion cap (spec.md §3 invariant); depth beyond this
    /// is treated as a cycle and skipped.
    pub max_include_depth: usize,
    /// Directories searched for `input`-class completion candidates
    /// (spec.md §4.6).
    pub search_paths: Vec<PathBuf>,
}

impl Default for ManuscriptConfig {
    fn default() -> Self {
        Self { max_include_depth: 15, search_paths: Vec::new() }
    }
}
