//! Registry broadcasting operations to every hook group
//!
//! Multiple independent consumers each own a [`HookGroup`]; the registry is
//! the append-only catalog that lets a caller flip or scope all of them in
//! one call. It is an explicit object with a reset lifecycle, so tests can
//! start from a clean slate; a process-wide default instance is available
//! through [`global_registry`].

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::error::Result;
use crate::handles::ModelHandle;
use crate::hooks::HookGroup;
use crate::state::{RestoreGuard, Target};

/// Ordered catalog of hook groups keyed by store key
#[derive(Debug, Default)]
pub struct HookRegistry {
    groups: Mutex<Vec<Arc<HookGroup>>>,
}

impl HookRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new group under `store_key` and register it
    ///
    /// A duplicate store key replaces the prior group in its original
    /// registration position; callers that need collision detection should
    /// check [`get`](Self::get) first.
    pub fn create(&self, store_key: impl Into<String>) -> Arc<HookGroup> {
        self.register(HookGroup::new(store_key))
    }

    /// Register an already-built group, e.g. one carrying a name resolver
    ///
    /// Duplicate store keys follow the same overwrite semantics as
    /// [`create`](Self::create).
    pub fn register(&self, group: HookGroup) -> Arc<HookGroup> {
        let group = Arc::new(group);
        let mut groups = self.groups.lock();
        if let Some(slot) = groups
            .iter_mut()
            .find(|existing| existing.store_key() == group.store_key())
        {
            tracing::debug!(
                store_key = group.store_key(),
                "replacing hook group registered under a duplicate store key"
            );
            *slot = Arc::clone(&group);
        } else {
            tracing::debug!(store_key = group.store_key(), "registered hook group");
            groups.push(Arc::clone(&group));
        }
        group
    }

    /// Look up a group by store key
    #[must_use]
    pub fn get(&self, store_key: &str) -> Option<Arc<HookGroup>> {
        self.groups
            .lock()
            .iter()
            .find(|group| group.store_key() == store_key)
            .cloned()
    }

    /// Registered groups in registration order
    #[must_use]
    pub fn groups(&self) -> Vec<Arc<HookGroup>> {
        self.groups.lock().clone()
    }

    /// Store keys in registration order
    #[must_use]
    pub fn store_keys(&self) -> Vec<String> {
        self.groups
            .lock()
            .iter()
            .map(|group| group.store_key().to_string())
            .collect()
    }

    /// Number of registered groups
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.lock().len()
    }

    /// True when no groups are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.lock().is_empty()
    }

    /// Drop every registered group
    pub fn reset(&self) {
        tracing::debug!("resetting hook registry");
        self.groups.lock().clear();
    }

    /// Enable the targeted repositories on every registered group
    ///
    /// # Errors
    ///
    /// Propagates the first group's resolution error; earlier groups in
    /// registration order keep their applied mutation.
    pub fn enable_all(&self, targets: &[Target]) -> Result<()> {
        for group in self.groups() {
            group.enable(targets)?;
        }
        Ok(())
    }

    /// Disable the targeted repositories on every registered group
    ///
    /// # Errors
    ///
    /// Same contract as [`enable_all`](Self::enable_all).
    pub fn disable_all(&self, targets: &[Target]) -> Result<()> {
        for group in self.groups() {
            group.disable(targets)?;
        }
        Ok(())
    }

    /// True when every registered group reports all hooks enabled
    ///
    /// An empty registry reports `true`.
    ///
    /// # Errors
    ///
    /// Propagates a group's resolution error.
    pub fn all_enabled(&self) -> Result<bool> {
        for group in self.groups() {
            if !group.enabled(&[])? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// True when every registered group reports all hooks disabled
    ///
    /// An empty registry reports `true`.
    ///
    /// # Errors
    ///
    /// Propagates a group's resolution error.
    pub fn all_disabled(&self) -> Result<bool> {
        for group in self.groups() {
            if !group.disabled(&[])? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Run `f` with the targets enabled on every group, then restore
    ///
    /// Scopes nest sequentially: each group's override opens inside the
    /// previous one, so `f` runs with all of them active and unwinding
    /// restores innermost-first.
    ///
    /// # Errors
    ///
    /// A group's resolution error aborts the broadcast before `f` runs;
    /// groups already scoped are restored.
    pub fn with_indexing_all<T>(&self, targets: &[Target], f: impl FnOnce() -> T) -> Result<T> {
        self.scoped_all(targets, true, f)
    }

    /// Run `f` with the targets disabled on every group, then restore
    ///
    /// # Errors
    ///
    /// Same contract as [`with_indexing_all`](Self::with_indexing_all).
    pub fn without_indexing_all<T>(&self, targets: &[Target], f: impl FnOnce() -> T) -> Result<T> {
        self.scoped_all(targets, false, f)
    }

    /// Run `f` with model-level hooks enabled on every group, then restore
    ///
    /// # Errors
    ///
    /// Fails with
    /// [`HookError::UnregisteredModel`](crate::error::HookError::UnregisteredModel)
    /// when any group does not know `model`; groups already scoped are
    /// restored and `f` does not run.
    pub fn with_indexing_for_model_all<T>(
        &self,
        model: &ModelHandle,
        targets: &[Target],
        f: impl FnOnce() -> T,
    ) -> Result<T> {
        self.scoped_all_for_model(model, targets, true, f)
    }

    /// Run `f` with model-level hooks disabled on every group, then restore
    ///
    /// # Errors
    ///
    /// Same contract as
    /// [`with_indexing_for_model_all`](Self::with_indexing_for_model_all).
    pub fn without_indexing_for_model_all<T>(
        &self,
        model: &ModelHandle,
        targets: &[Target],
        f: impl FnOnce() -> T,
    ) -> Result<T> {
        self.scoped_all_for_model(model, targets, false, f)
    }

    fn scoped_all<T>(&self, targets: &[Target], enabled: bool, f: impl FnOnce() -> T) -> Result<T> {
        let groups = self.groups();
        let mut guards = GuardStack::default();
        for group in &groups {
            guards.push(group.begin_set(targets, enabled)?);
        }
        Ok(f())
    }

    fn scoped_all_for_model<T>(
        &self,
        model: &ModelHandle,
        targets: &[Target],
        enabled: bool,
        f: impl FnOnce() -> T,
    ) -> Result<T> {
        let groups = self.groups();
        let mut guards = GuardStack::default();
        for group in &groups {
            guards.push(group.begin_set_for_model(model, targets, enabled)?);
        }
        Ok(f())
    }
}

/// Restores held guards innermost-first when dropped
#[derive(Default)]
struct GuardStack<'a>(Vec<RestoreGuard<'a>>);

impl<'a> GuardStack<'a> {
    fn push(&mut self, guard: RestoreGuard<'a>) {
        self.0.push(guard);
    }
}

impl Drop for GuardStack<'_> {
    fn drop(&mut self) {
        while let Some(guard) = self.0.pop() {
            drop(guard);
        }
    }
}

static GLOBAL: Lazy<HookRegistry> = Lazy::new(HookRegistry::new);

/// Process-wide default registry
///
/// Shared mutable process state: tests touching it should serialize
/// themselves and call [`HookRegistry::reset`] when done.
#[must_use]
pub fn global_registry() -> &'static HookRegistry {
    &GLOBAL
}
