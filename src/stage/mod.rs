//! The orchestrator context: one path, one entity registry, every control operation.

pub mod orchestrator;
pub mod target;

pub use orchestrator::{EntitySpec, Stage};
pub use target::Target;
