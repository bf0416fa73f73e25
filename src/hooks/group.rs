//! One independent enable/disable state engine
//!
//! A [`HookGroup`] owns the registered-models set for one consumer of the
//! engine (one ORM integration, one sync pipeline) and exposes the full
//! query/mutation surface over its context-local state. There is no master
//! switch: an argument-less predicate checks every repository known to the
//! group's registered models.

use parking_lot::Mutex;

use crate::error::{HookError, Result};
use crate::handles::{ModelHandle, Repository};
use crate::resolve::NameResolver;
use crate::state::{ContextKey, RestoreGuard, StateStore, Target, filter};

/// Hook-state engine for one group of model classes
#[derive(Debug)]
pub struct HookGroup {
    store_key: String,
    models: Mutex<Vec<ModelHandle>>,
    store: StateStore,
    resolver: Option<NameResolver>,
}

impl HookGroup {
    /// Create a group identified by `store_key`
    ///
    /// Without a resolver, string targets fail with
    /// [`HookError::InvalidTarget`]; repository and index handles work as
    /// usual.
    #[must_use]
    pub fn new(store_key: impl Into<String>) -> Self {
        Self {
            store_key: store_key.into(),
            models: Mutex::new(Vec::new()),
            store: StateStore::new(),
            resolver: None,
        }
    }

    /// Create a group that resolves string targets through `resolver`
    #[must_use]
    pub fn with_resolver(store_key: impl Into<String>, resolver: NameResolver) -> Self {
        Self {
            resolver: Some(resolver),
            ..Self::new(store_key)
        }
    }

    /// Identifying token for this group, unique within a registry
    #[must_use]
    pub fn store_key(&self) -> &str {
        &self.store_key
    }

    /// Register a model class with this group
    ///
    /// Re-registering an already-known handle is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::InvalidModel`] when the handle exposes no
    /// indexing callbacks.
    pub fn register_model(&self, model: &ModelHandle) -> Result<()> {
        if model.repositories().is_none() {
            return Err(HookError::InvalidModel {
                model: model.name().to_string(),
            });
        }
        let mut models = self.models.lock();
        if !models.contains(model) {
            tracing::debug!(store_key = %self.store_key, model = %model, "registered model");
            models.push(model.clone());
        }
        Ok(())
    }

    /// Registered model handles, in registration order
    #[must_use]
    pub fn models(&self) -> Vec<ModelHandle> {
        self.models.lock().clone()
    }

    /// Names of the registered models
    #[must_use]
    pub fn model_names(&self) -> Vec<String> {
        self.models
            .lock()
            .iter()
            .map(|model| model.name().to_string())
            .collect()
    }

    /// Every repository reachable from a registered model, deduplicated
    #[must_use]
    pub fn all_repositories(&self) -> Vec<Repository> {
        let mut repos = Vec::new();
        for model in self.models.lock().iter() {
            for repo in model.repositories().unwrap_or_default() {
                if !repos.contains(repo) {
                    repos.push(repo.clone());
                }
            }
        }
        repos
    }

    /// Enable indexing hooks in the calling context
    ///
    /// No targets means every known repository.
    ///
    /// # Errors
    ///
    /// Returns a resolution error when a string target cannot be mapped;
    /// state is left untouched in that case.
    pub fn enable(&self, targets: &[Target]) -> Result<()> {
        self.enable_in(&ContextKey::current(), targets)
    }

    /// [`enable`](Self::enable) against an explicit context key
    ///
    /// # Errors
    ///
    /// Same as [`enable`](Self::enable).
    pub fn enable_in(&self, ctx: &ContextKey, targets: &[Target]) -> Result<()> {
        self.set_repositories(ctx, targets, true)
    }

    /// Disable indexing hooks in the calling context
    ///
    /// No targets means every known repository.
    ///
    /// # Errors
    ///
    /// Returns a resolution error when a string target cannot be mapped;
    /// state is left untouched in that case.
    pub fn disable(&self, targets: &[Target]) -> Result<()> {
        self.disable_in(&ContextKey::current(), targets)
    }

    /// [`disable`](Self::disable) against an explicit context key
    ///
    /// # Errors
    ///
    /// Same as [`disable`](Self::disable).
    pub fn disable_in(&self, ctx: &ContextKey, targets: &[Target]) -> Result<()> {
        self.set_repositories(ctx, targets, false)
    }

    /// True when every targeted repository is enabled
    ///
    /// # Errors
    ///
    /// Returns a resolution error when a string target cannot be mapped.
    pub fn enabled(&self, targets: &[Target]) -> Result<bool> {
        self.enabled_in(&ContextKey::current(), targets)
    }

    /// [`enabled`](Self::enabled) against an explicit context key
    ///
    /// # Errors
    ///
    /// Same as [`enabled`](Self::enabled).
    pub fn enabled_in(&self, ctx: &ContextKey, targets: &[Target]) -> Result<bool> {
        self.repositories_match(ctx, targets, true)
    }

    /// True when every targeted repository is disabled
    ///
    /// # Errors
    ///
    /// Returns a resolution error when a string target cannot be mapped.
    pub fn disabled(&self, targets: &[Target]) -> Result<bool> {
        self.disabled_in(&ContextKey::current(), targets)
    }

    /// [`disabled`](Self::disabled) against an explicit context key
    ///
    /// # Errors
    ///
    /// Same as [`disabled`](Self::disabled).
    pub fn disabled_in(&self, ctx: &ContextKey, targets: &[Target]) -> Result<bool> {
        self.repositories_match(ctx, targets, false)
    }

    /// Enable model-level hooks for `model`
    ///
    /// # Errors
    ///
    /// Returns [`HookError::UnregisteredModel`] when the model is unknown to
    /// this group, or a resolution error for a bad string target. Neither
    /// mutates any state.
    pub fn enable_for_model(&self, model: &ModelHandle, targets: &[Target]) -> Result<()> {
        self.enable_for_model_in(&ContextKey::current(), model, targets)
    }

    /// [`enable_for_model`](Self::enable_for_model) against an explicit context key
    ///
    /// # Errors
    ///
    /// Same as [`enable_for_model`](Self::enable_for_model).
    pub fn enable_for_model_in(
        &self,
        ctx: &ContextKey,
        model: &ModelHandle,
        targets: &[Target],
    ) -> Result<()> {
        self.set_model_repositories(ctx, model, targets, true)
    }

    /// Disable model-level hooks for `model`
    ///
    /// # Errors
    ///
    /// Returns [`HookError::UnregisteredModel`] when the model is unknown to
    /// this group, or a resolution error for a bad string target. Neither
    /// mutates any state.
    pub fn disable_for_model(&self, model: &ModelHandle, targets: &[Target]) -> Result<()> {
        self.disable_for_model_in(&ContextKey::current(), model, targets)
    }

    /// [`disable_for_model`](Self::disable_for_model) against an explicit context key
    ///
    /// # Errors
    ///
    /// Same as [`disable_for_model`](Self::disable_for_model).
    pub fn disable_for_model_in(
        &self,
        ctx: &ContextKey,
        model: &ModelHandle,
        targets: &[Target],
    ) -> Result<()> {
        self.set_model_repositories(ctx, model, targets, false)
    }

    /// True when every targeted repository is enabled for `model`
    ///
    /// A repository with an explicit model-level override uses it; otherwise
    /// the repository tier decides.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::UnregisteredModel`] when the model is unknown to
    /// this group, or a resolution error for a bad string target.
    pub fn enabled_for_model(&self, model: &ModelHandle, targets: &[Target]) -> Result<bool> {
        self.enabled_for_model_in(&ContextKey::current(), model, targets)
    }

    /// [`enabled_for_model`](Self::enabled_for_model) against an explicit context key
    ///
    /// # Errors
    ///
    /// Same as [`enabled_for_model`](Self::enabled_for_model).
    pub fn enabled_for_model_in(
        &self,
        ctx: &ContextKey,
        model: &ModelHandle,
        targets: &[Target],
    ) -> Result<bool> {
        let known = self.all_repositories();
        let model_known = self.model_repositories(model, &known)?;
        let filtered = filter::filter_for_query(targets, &model_known, self.resolver.as_ref())?;
        Ok(self
            .store
            .model_repositories_enabled(ctx, &known, model, &filtered))
    }

    /// Run `f` with the targeted repositories enabled, then restore
    ///
    /// The prior repository state is restored on every exit path, including
    /// panics. Restoration is a hard overwrite of the whole repository tier:
    /// nested scopes unwind last-in first-out, and mutations made inside the
    /// block do not survive it.
    ///
    /// # Errors
    ///
    /// Returns a resolution error when a string target cannot be mapped; `f`
    /// does not run and state is left untouched.
    pub fn with_indexing<T>(&self, targets: &[Target], f: impl FnOnce() -> T) -> Result<T> {
        let _guard = self.begin_set(targets, true)?;
        Ok(f())
    }

    /// Run `f` with the targeted repositories disabled, then restore
    ///
    /// # Errors
    ///
    /// Same contract as [`with_indexing`](Self::with_indexing).
    pub fn without_indexing<T>(&self, targets: &[Target], f: impl FnOnce() -> T) -> Result<T> {
        let _guard = self.begin_set(targets, false)?;
        Ok(f())
    }

    /// Run `f` with model-level hooks enabled for `model`, then restore
    ///
    /// When the model had no prior overrides, restoration removes its
    /// override map entirely instead of leaving an empty one.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::UnregisteredModel`] for an unknown model or a
    /// resolution error for a bad string target; `f` does not run.
    pub fn with_indexing_for_model<T>(
        &self,
        model: &ModelHandle,
        targets: &[Target],
        f: impl FnOnce() -> T,
    ) -> Result<T> {
        let _guard = self.begin_set_for_model(model, targets, true)?;
        Ok(f())
    }

    /// Run `f` with model-level hooks disabled for `model`, then restore
    ///
    /// # Errors
    ///
    /// Same contract as [`with_indexing_for_model`](Self::with_indexing_for_model).
    pub fn without_indexing_for_model<T>(
        &self,
        model: &ModelHandle,
        targets: &[Target],
        f: impl FnOnce() -> T,
    ) -> Result<T> {
        let _guard = self.begin_set_for_model(model, targets, false)?;
        Ok(f())
    }

    /// Save the repository tier, apply the mutation, and hand back the guard
    pub(crate) fn begin_set(
        &self,
        targets: &[Target],
        enabled: bool,
    ) -> Result<RestoreGuard<'_>> {
        let ctx = ContextKey::current();
        let known = self.all_repositories();
        let guard = self.store.save_repositories(&ctx, &known);
        let filtered = filter::filter_for_update(targets, &known, self.resolver.as_ref())?;
        self.store.set_repositories(&ctx, &known, &filtered, enabled);
        Ok(guard)
    }

    /// Save one model's overrides, apply the mutation, and hand back the guard
    pub(crate) fn begin_set_for_model(
        &self,
        model: &ModelHandle,
        targets: &[Target],
        enabled: bool,
    ) -> Result<RestoreGuard<'_>> {
        let ctx = ContextKey::current();
        let known = self.all_repositories();
        let model_known = self.model_repositories(model, &known)?;
        let guard = self.store.save_model(&ctx, &known, model);
        let filtered = filter::filter_for_update(targets, &model_known, self.resolver.as_ref())?;
        self.store
            .set_model_repositories(&ctx, &known, model, &filtered, enabled);
        Ok(guard)
    }

    fn set_repositories(&self, ctx: &ContextKey, targets: &[Target], enabled: bool) -> Result<()> {
        let known = self.all_repositories();
        let filtered = filter::filter_for_update(targets, &known, self.resolver.as_ref())?;
        tracing::debug!(
            store_key = %self.store_key,
            enabled,
            repositories = filtered.len(),
            "updated repository hook state"
        );
        self.store.set_repositories(ctx, &known, &filtered, enabled);
        Ok(())
    }

    fn repositories_match(
        &self,
        ctx: &ContextKey,
        targets: &[Target],
        enabled: bool,
    ) -> Result<bool> {
        let known = self.all_repositories();
        let filtered = filter::filter_for_query(targets, &known, self.resolver.as_ref())?;
        Ok(self
            .store
            .repositories_match(ctx, &known, &filtered, enabled))
    }

    fn set_model_repositories(
        &self,
        ctx: &ContextKey,
        model: &ModelHandle,
        targets: &[Target],
        enabled: bool,
    ) -> Result<()> {
        let known = self.all_repositories();
        let model_known = self.model_repositories(model, &known)?;
        let filtered = filter::filter_for_update(targets, &model_known, self.resolver.as_ref())?;
        tracing::debug!(
            store_key = %self.store_key,
            model = %model,
            enabled,
            repositories = filtered.len(),
            "updated model hook state"
        );
        self.store
            .set_model_repositories(ctx, &known, model, &filtered, enabled);
        Ok(())
    }

    /// The model's repositories intersected with the group's known set
    fn model_repositories(
        &self,
        model: &ModelHandle,
        known: &[Repository],
    ) -> Result<Vec<Repository>> {
        if !self.models.lock().contains(model) {
            return Err(HookError::UnregisteredModel {
                model: model.name().to_string(),
                store_key: self.store_key.clone(),
            });
        }
        Ok(model
            .repositories()
            .unwrap_or_default()
            .iter()
            .filter(|repo| known.contains(repo))
            .cloned()
            .collect())
    }
}
