//! Identity-keyed handles for indices, repositories, and model classes

pub mod model;
pub mod repository;

pub use model::*;
pub use repository::*;
