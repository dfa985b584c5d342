use thiserror::Error;

/// Failures that can occur while loading module description data.
///
/// Per spec.md §7, this has no analogue at the §6 protocol boundary — it
/// surfaces directly to whoever calls [`crate::ModuleDictionary::load_module`]
/// (typically `tex-manuscript` while establishing a Manuscript's scopes),
/// who may choose to log it and proceed with an empty module rather than
/// fail the whole query.
#[derive(Debug, Error)]
pub enum DictionaryError {
    /// No description file exists for the named module.
    #[error("module `{0}` not found")]
    NotFound(String),

    /// The module's description file exists but could not be parsed.
    #[error("module `{module}` is malformed: {reason}")]
    Malformed {
        /// Name of the module that failed to parse.
        module: String,
        /// Underlying parse failure.
        reason: String,
    },
}
