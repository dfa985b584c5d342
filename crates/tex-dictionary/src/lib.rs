//! Command/environment/module descriptors and a data-dictionary loader
//! (spec.md §4.3). The data the loader reads — the actual LaTeX command and
//! symbol definitions — is an external collaborator per spec.md §1; this
//! crate owns the schema, the lookup, and the load/cache/error behavior
//! around it.

mod descriptor;
mod error;
mod loader;

pub use descriptor::{
    ActionKind, ArgumentSpec, CommandDescriptor, EnvironmentDescriptor, KeyDescriptor, Module,
    Signature,
};
pub use error::DictionaryError;
pub use loader::ModuleDictionary;
