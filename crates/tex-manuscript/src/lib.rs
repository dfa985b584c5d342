//! The file cache, the Manuscript include-graph, and the global/local scan
//! engine (spec.md §4.1, §4.4, §4.5).

mod config;
mod error;
mod file_cache;
mod frame;
mod index;
mod manuscript;

pub use config::ManuscriptConfig;
pub use error::CoreError;
pub use file_cache::FileCache;
pub use frame::{Frame, FrameKind};
pub use index::{IndexEntry, OutlineNode};
pub use manuscript::Manuscript;
