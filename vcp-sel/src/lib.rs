//! vcp-sel library - catalog indexing and cascading voice selection
//!
//! Builds token-indexed lookups and a validated category forest from the
//! catalog sources, consumes the precomputed category closure, and drives
//! the cascading "choose a voice" selector on top of them.

pub mod catalog;
pub mod error;
pub mod loader;
pub mod scope;
pub mod selector;

pub use catalog::{CatalogOptions, CatalogSnapshot, CatalogSources, CatalogStore, SourceUpdate};
pub use error::{Error, Result};
pub use scope::ScopeFilter;
pub use selector::{Action, CascadingSelector, LevelChoice, SelectionState, SelectionView};
