//! Completion, hover, and signature-help query layer (spec.md §4.6): three
//! entry points consuming a Manuscript's local context stack and data
//! dictionary to produce structured replies.

mod completion;
mod hover;
mod label;
mod signature_help;

pub use completion::{complete, Candidate, Completion};
pub use hover::hover;
pub use signature_help::{signature_help, ParameterInfo, SignatureHelp, SignatureInfo};
