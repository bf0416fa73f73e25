//! Runtime toggle engine for search-index callbacks
//!
//! This crate decides whether indexing hooks (data-change callbacks that
//! mirror model state into a search index) should fire right now. State has
//! three tiers: a per-context global default, per-repository switches, and
//! per-model-per-repository overrides. Scoped operations temporarily flip
//! state for the duration of a closure and restore the prior state on every
//! exit path, panics included.
//!
//! The engine performs no indexing itself; it only answers "should an
//! indexing side-effect run for repository R (and optionally model M)?" and
//! provides the save/restore protocol around that answer.
//!
//! ```
//! use index_hooks::{HookGroup, Index, ModelHandle};
//!
//! let users = Index::new("users_index", ["user"]);
//! let model = ModelHandle::with_repositories("User", users.repositories().to_vec());
//!
//! let hooks = HookGroup::new("users_sync");
//! hooks.register_model(&model)?;
//!
//! assert!(hooks.enabled(&[])?);
//! hooks.without_indexing(&[], || {
//!     // bulk import without index writes
//! })?;
//! assert!(hooks.enabled(&[])?);
//! # Ok::<(), index_hooks::HookError>(())
//! ```

/// Error taxonomy and result alias
pub mod error;
/// Repository, index, and model handles
pub mod handles;
/// Hook groups and the broadcast registry
pub mod hooks;
/// String-identifier resolution
pub mod resolve;
/// Context-local state storage and target filtering
pub mod state;

pub use error::*;
pub use handles::*;
pub use hooks::*;
pub use resolve::*;
pub use state::*;
