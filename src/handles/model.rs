//! Model handles
//!
//! A model handle stands in for a source-of-truth class whose data changes
//! trigger indexing callbacks. The engine only ever needs two things from it:
//! a display name and the set of repositories its callbacks write to.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::handles::Repository;

/// Identity-keyed handle for a model class
///
/// Like [`Repository`], equality and hashing follow the allocation, not the
/// name, so two independently-built handles never collide in state maps.
#[derive(Debug, Clone)]
pub struct ModelHandle(Arc<ModelInner>);

#[derive(Debug)]
struct ModelInner {
    name: String,
    /// `None` means the model has no indexing callbacks wired, which makes it
    /// invalid to register with a hook group.
    repositories: Option<Vec<Repository>>,
}

impl ModelHandle {
    /// Create a model handle without indexing callbacks
    ///
    /// Registering such a handle fails with
    /// [`HookError::InvalidModel`](crate::error::HookError::InvalidModel).
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(Arc::new(ModelInner {
            name: name.into(),
            repositories: None,
        }))
    }

    /// Create a model handle whose callbacks write to `repositories`
    ///
    /// Declaration order is preserved; only the repository set matters to the
    /// state engine.
    #[must_use]
    pub fn with_repositories<I>(name: impl Into<String>, repositories: I) -> Self
    where
        I: IntoIterator<Item = Repository>,
    {
        Self(Arc::new(ModelInner {
            name: name.into(),
            repositories: Some(repositories.into_iter().collect()),
        }))
    }

    /// Model name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Repositories this model mirrors into, or `None` when no callbacks are wired
    #[must_use]
    pub fn repositories(&self) -> Option<&[Repository]> {
        self.0.repositories.as_deref()
    }
}

impl PartialEq for ModelHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for ModelHandle {}

impl Hash for ModelHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.0), state);
    }
}

impl fmt::Display for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}
