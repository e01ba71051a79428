use std::sync::{Arc, Mutex};

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{FlightError, FlightResult};
use crate::render::frame::FrameRGBA;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Target frames-per-second.
    pub fps: Fps,
}

/// Sink contract for consuming rendered frames.
///
/// Ordering contract: `push_frame` is called with strictly increasing `FrameIndex` values.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> FlightResult<()>;
    /// Push one frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> FlightResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> FlightResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    ended: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg.clone()
    }

    /// Captured frames in push order.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    /// `true` once `end` was called.
    pub fn ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> FlightResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> FlightResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> FlightResult<()> {
        self.ended = true;
        Ok(())
    }
}

/// Keeps only the newest frame, shared with readers on other threads.
///
/// Stands in for a live display surface: the render loop overwrites, a viewer polls.
#[derive(Debug, Clone, Default)]
pub struct LatestFrameSink {
    slot: Arc<Mutex<Option<(FrameIndex, FrameRGBA)>>>,
}

impl LatestFrameSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the newest frame, if any.
    pub fn latest(&self) -> Option<(FrameIndex, FrameRGBA)> {
        self.slot.lock().ok()?.clone()
    }
}

impl FrameSink for LatestFrameSink {
    fn begin(&mut self, _cfg: SinkConfig) -> FlightResult<()> {
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> FlightResult<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| FlightError::Other(anyhow::anyhow!("latest frame lock poisoned")))?;
        *slot = Some((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> FlightResult<()> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
