//! Short-lived "bomb" effects: timing, placement, and the live pool.

pub mod bomb;
pub mod emitter;
pub mod pool;

pub use bomb::{Bomb, BombFrame, BombStyle};
pub use emitter::EffectEmitter;
pub use pool::EffectPool;
