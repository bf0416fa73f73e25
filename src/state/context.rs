//! Context keys for execution-context-local state
//!
//! Hook state is never shared across concurrent contexts: every thread of
//! control (or caller-defined unit of work) owns an independent snapshot.
//! A [`ContextKey`] selects that snapshot inside the state store.

use std::sync::Arc;
use std::thread::ThreadId;

/// Key selecting one execution context's state snapshot
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContextKey(KeyInner);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum KeyInner {
    Thread(ThreadId),
    Named(Arc<str>),
}

impl ContextKey {
    /// Key for the calling thread
    #[must_use]
    pub fn current() -> Self {
        Self(KeyInner::Thread(std::thread::current().id()))
    }

    /// Key for a caller-defined unit of work
    ///
    /// Lets hosts with their own concurrency model (task pools, fibers) keep
    /// per-unit state without relying on thread identity.
    #[must_use]
    pub fn named(name: impl Into<Arc<str>>) -> Self {
        Self(KeyInner::Named(name.into()))
    }
}
