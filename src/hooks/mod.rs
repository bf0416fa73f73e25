//! Hook groups and the broadcast registry

pub mod group;
pub mod registry;

pub use group::*;
pub use registry::*;
