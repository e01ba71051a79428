//! Shared value types, time source, and the error taxonomy.

pub mod core;
pub mod error;
pub(crate) mod math;
pub mod time;
