//! Checkpoints to curve segments to a dense arc-length table.
//!
//! A [`PathMap`] is built once per path change and shared immutably; regeneration builds a new
//! one and swaps the `Arc`.

pub mod checkpoints;
pub mod curve;
pub mod map;
pub mod table;

pub use checkpoints::{checkpoints_from_pairs, extend_checkpoints, random_checkpoints};
pub use curve::{CurveBuilder, CurveSegment};
pub use map::{PathMap, SegmentEntry};
pub use table::{PathRow, PathTable, RowSpan};
