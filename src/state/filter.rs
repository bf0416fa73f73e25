//! Expansion and intersection of caller-supplied targets
//!
//! Every mutation and predicate funnels its arguments through here: targets
//! are expanded to concrete repositories, deduplicated, and intersected with
//! the repositories the hook group actually knows about.

use crate::error::{HookError, Result};
use crate::handles::{Index, Repository};
use crate::resolve::NameResolver;

/// A repository selector accepted by every enable/disable/query operation
#[derive(Debug, Clone)]
pub enum Target {
    /// One repository
    Repository(Repository),
    /// An index, expanded to all of its repositories
    Index(Index),
    /// A free-form identifier, passed through the name resolver
    Name(String),
}

impl From<Repository> for Target {
    fn from(repo: Repository) -> Self {
        Self::Repository(repo)
    }
}

impl From<&Repository> for Target {
    fn from(repo: &Repository) -> Self {
        Self::Repository(repo.clone())
    }
}

impl From<Index> for Target {
    fn from(index: Index) -> Self {
        Self::Index(index)
    }
}

impl From<&Index> for Target {
    fn from(index: &Index) -> Self {
        Self::Index(index.clone())
    }
}

impl From<&str> for Target {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for Target {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

/// Expand targets to repositories, preserving order and dropping duplicates
///
/// # Errors
///
/// Returns [`HookError::InvalidTarget`] for a name target when no resolver is
/// configured, or a resolver error for an unresolvable name.
pub(crate) fn expand_targets(
    targets: &[Target],
    resolver: Option<&NameResolver>,
) -> Result<Vec<Repository>> {
    let mut expanded = Vec::new();
    for target in targets {
        match target {
            Target::Repository(repo) => push_unique(&mut expanded, repo.clone()),
            Target::Index(index) => {
                for repo in index.repositories() {
                    push_unique(&mut expanded, repo.clone());
                }
            }
            Target::Name(name) => {
                let resolver = resolver.ok_or_else(|| HookError::InvalidTarget {
                    target: name.clone(),
                })?;
                push_unique(&mut expanded, resolver.resolve(name)?);
            }
        }
    }
    Ok(expanded)
}

/// Filtered set used by mutations
///
/// No targets means every known repository. Explicit targets are intersected
/// with `known`; an empty intersection applies to nothing, so a bogus target
/// is dropped rather than widened into "everything".
pub(crate) fn filter_for_update(
    targets: &[Target],
    known: &[Repository],
    resolver: Option<&NameResolver>,
) -> Result<Vec<Repository>> {
    if targets.is_empty() {
        return Ok(known.to_vec());
    }
    let mut expanded = expand_targets(targets, resolver)?;
    expanded.retain(|repo| known.contains(repo));
    Ok(expanded)
}

/// Filtered set used by predicates
///
/// Same expansion and intersection as [`filter_for_update`], but an empty
/// intersection falls back to the full known set so predicates never answer
/// vacuously over an empty selection.
pub(crate) fn filter_for_query(
    targets: &[Target],
    known: &[Repository],
    resolver: Option<&NameResolver>,
) -> Result<Vec<Repository>> {
    let filtered = filter_for_update(targets, known, resolver)?;
    if filtered.is_empty() {
        return Ok(known.to_vec());
    }
    Ok(filtered)
}

fn push_unique(repos: &mut Vec<Repository>, repo: Repository) {
    if !repos.contains(&repo) {
        repos.push(repo);
    }
}
