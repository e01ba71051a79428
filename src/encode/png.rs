use std::path::{Path, PathBuf};

use crate::foundation::core::FrameIndex;
use crate::foundation::error::{FlightError, FlightResult};
use crate::render::frame::FrameRGBA;

use super::sink::{FrameSink, SinkConfig};

/// Writes each pushed frame as `frame_<index>.png` in a directory.
///
/// Frames are converted to straight alpha before encoding.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    cfg: Option<SinkConfig>,
    written: u64,
}

impl PngSequenceSink {
    /// Sink writing into `dir`; the directory is created in `begin`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cfg: None,
            written: 0,
        }
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path used for frame `idx`.
    pub fn frame_path(&self, idx: FrameIndex) -> PathBuf {
        self.dir.join(format!("frame_{:06}.png", idx.0))
    }

    /// Frames written so far.
    pub fn written(&self) -> u64 {
        self.written
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> FlightResult<()> {
        std::fs::create_dir_all(&self.dir)?;
        tracing::info!(dir = %self.dir.display(), width = cfg.width, height = cfg.height, "png sequence started");
        self.cfg = Some(cfg);
        self.written = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> FlightResult<()> {
        let Some(cfg) = &self.cfg else {
            return Err(FlightError::validation("push_frame called before begin"));
        };
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(FlightError::validation(format!(
                "frame is {}x{}, sink expects {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        let path = self.frame_path(idx);
        image::save_buffer_with_format(
            &path,
            &frame.to_straight_rgba8(),
            frame.width,
            frame.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .map_err(|e| {
            FlightError::Other(anyhow::Error::new(e).context(format!("write png '{}'", path.display())))
        })?;
        self.written += 1;
        Ok(())
    }

    fn end(&mut self) -> FlightResult<()> {
        tracing::info!(frames = self.written, "png sequence finished");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
