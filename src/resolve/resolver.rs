//! Name resolution from free-form identifiers to repository handles
//!
//! Callers refer to repositories by human-readable identifiers in several
//! equivalent spellings: `users`, `users_index`, `users_index:user`,
//! `UsersIndex`, `UsersIndex::User`, or nested `foo/v1/users` forms. The
//! resolver normalizes every spelling to one fully-qualified type name and
//! asks a caller-supplied lookup for the handle, so the engine never depends
//! on runtime reflection.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{HookError, Result};
use crate::handles::{Index, Repository};
use crate::resolve::casing;

/// What a qualified type name denotes
#[derive(Debug, Clone)]
pub enum ResolvedName {
    /// The name is a repository itself
    Repository(Repository),
    /// The name is an index container with named sub-repositories
    Index(Index),
}

/// Lookup from a fully-qualified type name to a handle
///
/// Implemented by [`Catalog`] and by any
/// `Fn(&str) -> Option<ResolvedName>` closure.
pub trait NameLookup: Send + Sync {
    /// Find the handle registered under `qualified_name`, if any
    fn find(&self, qualified_name: &str) -> Option<ResolvedName>;
}

impl<F> NameLookup for F
where
    F: Fn(&str) -> Option<ResolvedName> + Send + Sync,
{
    fn find(&self, qualified_name: &str) -> Option<ResolvedName> {
        self(qualified_name)
    }
}

/// Map-backed [`NameLookup`]
///
/// Registering an index also registers each of its repositories under
/// `<IndexName>::<RepoName>`, matching the path form
/// `users_index/user` a caller may pass.
#[derive(Default)]
pub struct Catalog {
    entries: HashMap<String, ResolvedName>,
}

impl Catalog {
    /// Create an empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an index under its qualified type name
    ///
    /// `qualified_name` is the type-form name, e.g. `UsersIndex` or
    /// `Foo::V1::UsersIndex`.
    pub fn register_index(&mut self, qualified_name: impl Into<String>, index: &Index) {
        let qualified_name = qualified_name.into();
        for repo in index.repositories() {
            let repo_constant = format!(
                "{qualified_name}::{}",
                casing::classify(&casing::underscore(repo.name()))
            );
            self.entries
                .insert(repo_constant, ResolvedName::Repository(repo.clone()));
        }
        self.entries
            .insert(qualified_name, ResolvedName::Index(index.clone()));
    }

    /// Register a standalone repository under a qualified type name
    pub fn register_repository(
        &mut self,
        qualified_name: impl Into<String>,
        repository: &Repository,
    ) {
        self.entries.insert(
            qualified_name.into(),
            ResolvedName::Repository(repository.clone()),
        );
    }
}

impl NameLookup for Catalog {
    fn find(&self, qualified_name: &str) -> Option<ResolvedName> {
        self.entries.get(qualified_name).cloned()
    }
}

/// Parses free-form identifiers and resolves them through a [`NameLookup`]
#[derive(Clone)]
pub struct NameResolver {
    lookup: Arc<dyn NameLookup>,
}

impl NameResolver {
    /// Create a resolver backed by `lookup`
    pub fn new(lookup: impl NameLookup + 'static) -> Self {
        Self {
            lookup: Arc::new(lookup),
        }
    }

    /// Resolve `identifier` to a repository handle
    ///
    /// Every delimiter style (`:`, `/`, fully-qualified `::`) resolves to the
    /// identical handle for the same repository.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::NameResolution`] when the identifier does not map
    /// to a registered index or repository, or names a repository the index
    /// does not contain.
    pub fn resolve(&self, identifier: &str) -> Result<Repository> {
        let normalized = casing::underscore(identifier);
        let (index_part, repo_part) = match normalized.split_once(':') {
            Some((index, repo)) => (index, Some(repo)),
            None => (normalized.as_str(), None),
        };

        let index_path = if has_index_suffix(index_part) {
            index_part.to_string()
        } else {
            format!("{index_part}_index")
        };

        let not_found = || HookError::NameResolution {
            identifier: identifier.to_string(),
        };

        match self.lookup.find(&casing::classify(&index_path)) {
            Some(ResolvedName::Repository(repo)) => Ok(repo),
            Some(ResolvedName::Index(index)) => match repo_part {
                Some(repo_name) => index.repository(repo_name).ok_or_else(not_found),
                None => index.default_repository().ok_or_else(not_found),
            },
            None => Err(not_found()),
        }
    }
}

impl std::fmt::Debug for NameResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NameResolver").finish_non_exhaustive()
    }
}

/// True when the path already names an index, either directly
/// (`users_index`) or in `..._index/<repo>` path form
fn has_index_suffix(path: &str) -> bool {
    if path.ends_with("_index") {
        return true;
    }
    path.rsplit_once('/').is_some_and(|(head, tail)| {
        head.ends_with("_index")
            && !tail.is_empty()
            && tail.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_index_suffix() {
        assert!(has_index_suffix("users_index"));
        assert!(has_index_suffix("foo/v1/users_index"));
        assert!(has_index_suffix("users_index/user"));
        assert!(!has_index_suffix("users"));
        assert!(!has_index_suffix("foo/v1/users"));
    }

    #[test]
    fn test_closure_lookup() {
        let index = Index::new("users", ["user"]);
        let expected = index.default_repository().unwrap();
        let resolver = NameResolver::new(move |name: &str| {
            (name == "UsersIndex").then(|| ResolvedName::Index(index.clone()))
        });
        assert_eq!(resolver.resolve("users").unwrap(), expected);
    }

    #[test]
    fn test_unknown_identifier() {
        let resolver = NameResolver::new(|_: &str| None);
        let err = resolver.resolve("ghosts").unwrap_err();
        assert!(matches!(err, HookError::NameResolution { identifier } if identifier == "ghosts"));
    }
}
