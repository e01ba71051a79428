//! Frame sinks: the boundary between the compositor and whatever displays or stores frames.

pub mod png;
pub mod sink;

pub use png::PngSequenceSink;
pub use sink::{FrameSink, InMemorySink, LatestFrameSink, SinkConfig};
