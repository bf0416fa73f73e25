//! Error taxonomy for hook-state operations

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, HookError>;

/// Errors raised by hook groups, the state store, and the name resolver
///
/// All variants are raised synchronously to the immediate caller; nothing is
/// caught or retried internally. Scoped overrides restore their saved state
/// before the error reaches the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum HookError {
    /// A model handle without indexing callbacks was registered or referenced
    #[error("model `{model}` exposes no indexing callbacks; wire at least one repository before registering it")]
    InvalidModel {
        /// Name of the offending model
        model: String,
    },

    /// A model-scoped operation targeted a model never registered with the group
    #[error("model `{model}` is not registered with hook group `{store_key}`")]
    UnregisteredModel {
        /// Name of the offending model
        model: String,
        /// Store key of the group that rejected the call
        store_key: String,
    },

    /// A string identifier did not resolve to a known repository or index
    #[error("cannot resolve `{identifier}` to a known index repository")]
    NameResolution {
        /// The identifier as passed by the caller
        identifier: String,
    },

    /// A filtering argument was a name string but no resolver is configured
    #[error("`{target}` is not a repository, an index, or a resolvable name")]
    InvalidTarget {
        /// Display form of the offending argument
        target: String,
    },
}
