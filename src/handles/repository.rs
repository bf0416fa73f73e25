//! Repository and index handles
//!
//! Handles are cheap to clone and compare by identity: two `Repository`
//! values are equal only when they originate from the same allocation. The
//! hook-state engine uses them purely as map keys, so identity semantics keep
//! "same repository" unambiguous even when two indices reuse a name.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// One indexable destination tied to a subset of a model's data
#[derive(Debug, Clone)]
pub struct Repository(Arc<RepositoryInner>);

#[derive(Debug)]
struct RepositoryInner {
    index_name: String,
    name: String,
}

impl Repository {
    /// Create a standalone repository handle
    #[must_use]
    pub fn new(index_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self(Arc::new(RepositoryInner {
            index_name: index_name.into(),
            name: name.into(),
        }))
    }

    /// Name of the index this repository belongs to
    #[must_use]
    pub fn index_name(&self) -> &str {
        &self.0.index_name
    }

    /// Repository name within its index
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// `index:repo` form used in logs and error messages
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}:{}", self.0.index_name, self.0.name)
    }
}

impl PartialEq for Repository {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Repository {}

impl Hash for Repository {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.0), state);
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.0.index_name, self.0.name)
    }
}

/// A named container grouping one or more repositories
///
/// Repositories keep their declaration order; the first one is the default
/// returned when a caller names the index without a repository qualifier.
#[derive(Debug, Clone)]
pub struct Index(Arc<IndexInner>);

#[derive(Debug)]
struct IndexInner {
    name: String,
    repositories: Vec<Repository>,
}

impl Index {
    /// Create an index with repositories named after `repository_names`
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, repository_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let repositories = repository_names
            .into_iter()
            .map(|repo| Repository::new(name.clone(), repo))
            .collect();
        Self(Arc::new(IndexInner { name, repositories }))
    }

    /// Index name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Constituent repositories in declaration order
    #[must_use]
    pub fn repositories(&self) -> &[Repository] {
        &self.0.repositories
    }

    /// Look up a repository by name
    #[must_use]
    pub fn repository(&self, name: &str) -> Option<Repository> {
        self.0
            .repositories
            .iter()
            .find(|repo| repo.name() == name)
            .cloned()
    }

    /// The first declared repository, if any
    #[must_use]
    pub fn default_repository(&self) -> Option<Repository> {
        self.0.repositories.first().cloned()
    }
}

impl PartialEq for Index {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Index {}

impl Hash for Index {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.0), state);
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}
