//! Context-keyed storage for one hook group's enable/disable state
//!
//! One [`StateStore`] belongs to one hook group. Inside it, every execution
//! context (see [`ContextKey`](crate::state::ContextKey)) owns an independent
//! snapshot with two tiers: a repository map and per-model override maps.
//! Two contexts never observe each other's mutations; a snapshot lives until
//! its owning context is gone and is never persisted.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::handles::{ModelHandle, Repository};
use crate::state::ContextKey;

/// One execution context's snapshot
///
/// `repos` holds the repository tier, lazily seeded with every known
/// repository enabled. `models` holds per-model overrides; a missing model
/// key means "no model-level override, defer to `repos`", and so does a
/// missing repository key inside a model's sub-map.
#[derive(Debug, Clone, Default)]
struct GroupState {
    repos: HashMap<Repository, bool>,
    models: HashMap<ModelHandle, HashMap<Repository, bool>>,
}

/// Context-keyed hook state for one hook group
#[derive(Debug, Default)]
pub struct StateStore {
    states: Mutex<HashMap<ContextKey, GroupState>>,
}

impl StateStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` against the context's snapshot, seeding it first
    ///
    /// Seeding keeps the invariant that `repos` has an entry for every
    /// currently-known repository: a fresh snapshot starts all-enabled, and
    /// repositories of models registered after snapshot creation are
    /// materialized as enabled on the next access.
    fn with_state<T>(
        &self,
        ctx: &ContextKey,
        known: &[Repository],
        f: impl FnOnce(&mut GroupState) -> T,
    ) -> T {
        let mut states = self.states.lock();
        let state = states.entry(ctx.clone()).or_default();
        for repo in known {
            state.repos.entry(repo.clone()).or_insert(true);
        }
        f(state)
    }

    /// Set the repository-tier state for each repository in `filtered`
    pub fn set_repositories(
        &self,
        ctx: &ContextKey,
        known: &[Repository],
        filtered: &[Repository],
        enabled: bool,
    ) {
        self.with_state(ctx, known, |state| {
            for repo in filtered {
                state.repos.insert(repo.clone(), enabled);
            }
        });
    }

    /// True when every repository in `filtered` has state `enabled`
    pub fn repositories_match(
        &self,
        ctx: &ContextKey,
        known: &[Repository],
        filtered: &[Repository],
        enabled: bool,
    ) -> bool {
        self.with_state(ctx, known, |state| {
            filtered
                .iter()
                .all(|repo| state.repos.get(repo).copied().unwrap_or(true) == enabled)
        })
    }

    /// Set a model-tier override for each repository in `filtered`
    pub fn set_model_repositories(
        &self,
        ctx: &ContextKey,
        known: &[Repository],
        model: &ModelHandle,
        filtered: &[Repository],
        enabled: bool,
    ) {
        self.with_state(ctx, known, |state| {
            let overrides = state.models.entry(model.clone()).or_default();
            for repo in filtered {
                overrides.insert(repo.clone(), enabled);
            }
        });
    }

    /// True when every repository in `filtered` is enabled for `model`
    ///
    /// A repository with an explicit model-tier override uses it; otherwise
    /// the repository tier decides.
    pub fn model_repositories_enabled(
        &self,
        ctx: &ContextKey,
        known: &[Repository],
        model: &ModelHandle,
        filtered: &[Repository],
    ) -> bool {
        self.with_state(ctx, known, |state| {
            let overrides = state.models.get(model);
            filtered.iter().all(|repo| {
                overrides
                    .and_then(|map| map.get(repo))
                    .or_else(|| state.repos.get(repo))
                    .copied()
                    .unwrap_or(true)
            })
        })
    }

    /// Capture the repository tier for restoration when the guard drops
    pub fn save_repositories(
        &self,
        ctx: &ContextKey,
        known: &[Repository],
    ) -> RestoreGuard<'_> {
        let saved = self.with_state(ctx, known, |state| state.repos.clone());
        RestoreGuard {
            store: self,
            ctx: ctx.clone(),
            saved: SavedState::Repositories(saved),
        }
    }

    /// Capture one model's override sub-map for restoration on drop
    ///
    /// When the model has no sub-map yet, the guard removes whatever the
    /// scoped mutation created instead of leaving an empty map behind.
    pub fn save_model(
        &self,
        ctx: &ContextKey,
        known: &[Repository],
        model: &ModelHandle,
    ) -> RestoreGuard<'_> {
        let saved = self.with_state(ctx, known, |state| state.models.get(model).cloned());
        RestoreGuard {
            store: self,
            ctx: ctx.clone(),
            saved: SavedState::Model(model.clone(), saved),
        }
    }
}

#[derive(Debug)]
enum SavedState {
    Repositories(HashMap<Repository, bool>),
    Model(ModelHandle, Option<HashMap<Repository, bool>>),
}

/// Restores captured state when dropped
///
/// This is the guaranteed-cleanup half of the scoped-override protocol: the
/// capture is restored verbatim on every exit path, including panics, as a
/// hard overwrite of whatever the scoped block left behind. Nested scopes of
/// the same kind therefore unwind last-in first-out; concurrent unwinding
/// across contexts is not a supported shape.
#[derive(Debug)]
#[must_use = "dropping the guard immediately restores the saved state"]
pub struct RestoreGuard<'a> {
    store: &'a StateStore,
    ctx: ContextKey,
    saved: SavedState,
}

impl Drop for RestoreGuard<'_> {
    fn drop(&mut self) {
        let mut states = self.store.states.lock();
        let state = states.entry(self.ctx.clone()).or_default();
        match std::mem::replace(&mut self.saved, SavedState::Repositories(HashMap::new())) {
            SavedState::Repositories(repos) => {
                tracing::trace!(count = repos.len(), "restoring repository state");
                state.repos = repos;
            }
            SavedState::Model(model, Some(overrides)) => {
                tracing::trace!(model = %model, "restoring model overrides");
                state.models.insert(model, overrides);
            }
            SavedState::Model(model, None) => {
                tracing::trace!(model = %model, "removing scoped model overrides");
                state.models.remove(&model);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handles::Index;

    fn fixtures() -> (ContextKey, Vec<Repository>, ModelHandle) {
        let index = Index::new("animals_index", ["cat", "dog"]);
        let known = index.repositories().to_vec();
        let model = ModelHandle::with_repositories("Animal", known.clone());
        (ContextKey::named("test"), known, model)
    }

    #[test]
    fn test_snapshot_seeds_enabled() {
        let (ctx, known, _) = fixtures();
        let store = StateStore::new();
        assert!(store.repositories_match(&ctx, &known, &known, true));
        assert!(!store.repositories_match(&ctx, &known, &known, false));
    }

    #[test]
    fn test_set_and_query_repositories() {
        let (ctx, known, _) = fixtures();
        let store = StateStore::new();
        store.set_repositories(&ctx, &known, &known[..1], false);
        assert!(store.repositories_match(&ctx, &known, &known[..1], false));
        assert!(store.repositories_match(&ctx, &known, &known[1..], true));
        assert!(!store.repositories_match(&ctx, &known, &known, true));
    }

    #[test]
    fn test_late_known_repository_defaults_enabled() {
        let (ctx, known, _) = fixtures();
        let store = StateStore::new();
        store.set_repositories(&ctx, &known[..1], &known[..1], false);

        // A repository that becomes known later is seeded enabled even
        // though the snapshot already existed.
        assert!(store.repositories_match(&ctx, &known, &known[1..], true));
    }

    #[test]
    fn test_model_override_beats_repository_tier() {
        let (ctx, known, model) = fixtures();
        let store = StateStore::new();
        store.set_repositories(&ctx, &known, &known, false);
        store.set_model_repositories(&ctx, &known, &model, &known[..1], true);

        assert!(store.model_repositories_enabled(&ctx, &known, &model, &known[..1]));
        assert!(!store.model_repositories_enabled(&ctx, &known, &model, &known[1..]));
    }

    #[test]
    fn test_model_without_override_defers_to_repositories() {
        let (ctx, known, model) = fixtures();
        let store = StateStore::new();
        assert!(store.model_repositories_enabled(&ctx, &known, &model, &known));

        store.set_repositories(&ctx, &known, &known, false);
        assert!(!store.model_repositories_enabled(&ctx, &known, &model, &known));
    }

    #[test]
    fn test_repository_guard_restores_on_drop() {
        let (ctx, known, _) = fixtures();
        let store = StateStore::new();
        {
            let _guard = store.save_repositories(&ctx, &known);
            store.set_repositories(&ctx, &known, &known, false);
            assert!(store.repositories_match(&ctx, &known, &known, false));
        }
        assert!(store.repositories_match(&ctx, &known, &known, true));
    }

    #[test]
    fn test_model_guard_removes_absent_sub_map() {
        let (ctx, known, model) = fixtures();
        let store = StateStore::new();
        {
            let _guard = store.save_model(&ctx, &known, &model);
            store.set_model_repositories(&ctx, &known, &model, &known, false);
        }
        // The sub-map did not exist before the scope, so restoration removes
        // it entirely rather than leaving an empty one.
        let states = store.states.lock();
        let state = states.get(&ctx).unwrap();
        assert!(!state.models.contains_key(&model));
    }

    #[test]
    fn test_model_guard_restores_prior_overrides() {
        let (ctx, known, model) = fixtures();
        let store = StateStore::new();
        store.set_model_repositories(&ctx, &known, &model, &known[1..], false);
        {
            let _guard = store.save_model(&ctx, &known, &model);
            store.set_model_repositories(&ctx, &known, &model, &known[..1], false);
            assert!(!store.model_repositories_enabled(&ctx, &known, &model, &known[..1]));
        }
        assert!(store.model_repositories_enabled(&ctx, &known, &model, &known[..1]));
        assert!(!store.model_repositories_enabled(&ctx, &known, &model, &known[1..]));
    }

    #[test]
    fn test_contexts_are_isolated() {
        let (_, known, _) = fixtures();
        let a = ContextKey::named("a");
        let b = ContextKey::named("b");
        let store = StateStore::new();
        store.set_repositories(&a, &known, &known, false);
        assert!(store.repositories_match(&a, &known, &known, false));
        assert!(store.repositories_match(&b, &known, &known, true));
    }
}
