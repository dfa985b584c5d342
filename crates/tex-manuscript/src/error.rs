use thiserror::Error;

/// Failures surfaced by the manuscript core.
///
/// Only [`CoreError::UnknownFile`] and [`CoreError::RangeMismatch`] cross the
/// external-interface boundary (spec.md §6, §7); [`CoreError::DictionaryLoad`]
/// is surfaced directly to whoever asked a `Manuscript` to adopt a module, so
/// a caller can log it and proceed without that module's commands rather
/// than fail the whole document.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A position query or read named a file never opened and not present
    /// on disk.
    #[error("unknown file: {filename}")]
    UnknownFile {
        /// The filename that was not found.
        filename: String,
    },

    /// An incremental edit's declared `rangeLength` disagreed with the
    /// indexed byte length of the range it claims to replace. The edit is
    /// rejected and `src` is left unchanged.
    #[error("range length mismatch in {filename}: expected {expected}, found {found}")]
    RangeMismatch {
        /// File the edit targeted.
        filename: String,
        /// Byte length the editor declared.
        expected: usize,
        /// Byte length the index actually measured for that range.
        found: usize,
    },

    /// A module description failed to load while building a Manuscript's
    /// command/environment scopes.
    #[error("failed to load module `{module}`: {reason}")]
    DictionaryLoad {
        /// Name of the module that failed to load.
        module: String,
        /// Underlying failure reason.
        reason: String,
    },
}
