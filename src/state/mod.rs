//! Execution-context-local hook state and target filtering

pub mod context;
pub mod filter;
pub mod store;

pub use context::*;
pub use filter::*;
pub use store::*;
