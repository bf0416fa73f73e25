//! String-identifier resolution into repository handles

pub mod casing;
pub mod resolver;

pub use resolver::*;
