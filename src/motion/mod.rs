//! Per-entity motion: the guarded state record and the background updater that integrates it.

pub mod entity;
pub mod state;
pub mod trail;

pub use entity::Entity;
pub use state::{Appearance, Bounds, EntityInfo, EntityState, Motion};
pub use trail::TrailBuffer;
