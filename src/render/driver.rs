//! The render-tick driver.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::FlightResult;
use crate::foundation::time::Clock;
use crate::render::compositor::Compositor;
use crate::stage::Stage;

/// Seconds between frame-rate reports.
pub const REPORT_INTERVAL_SECS: f64 = 10.0;

/// Pacing and output selection for [`run_render_loop`].
#[derive(Clone, Copy, Debug)]
pub struct RenderLoopOpts {
    /// Target tick rate.
    pub fps: Fps,
    /// Stop after this many ticks; `None` runs until the stop flag is set.
    pub max_frames: Option<u64>,
    /// Hand every `every`-th frame to the sink (1 = all).
    pub every: u64,
}

/// Totals returned when the loop exits.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderStats {
    /// Ticks rendered.
    pub frames: u64,
    /// Frames handed to the sink.
    pub pushed: u64,
    /// Wall-clock duration of the loop.
    pub elapsed_secs: f64,
}

impl RenderStats {
    /// Achieved ticks per second.
    pub fn fps(&self) -> f64 {
        if self.elapsed_secs > 0.0 {
            self.frames as f64 / self.elapsed_secs
        } else {
            0.0
        }
    }
}

/// Drive `compositor` at `opts.fps` until `stop` is set or `max_frames` is reached.
///
/// Ticks are best-effort: a slow tick is not made up for, the next one starts immediately.
pub fn run_render_loop(
    stage: &Stage,
    compositor: &mut Compositor,
    sink: &mut dyn FrameSink,
    opts: &RenderLoopOpts,
    stop: &AtomicBool,
) -> FlightResult<RenderStats> {
    let canvas = stage.config().canvas;
    sink.begin(SinkConfig {
        width: canvas.raster_width(),
        height: canvas.raster_height(),
        fps: opts.fps,
    })?;

    let period = Duration::from_secs_f64(opts.fps.frame_duration_secs());
    let every = opts.every.max(1);
    let clock = Clock::new();
    let mut frames = 0u64;
    let mut pushed = 0u64;
    let mut report_at = REPORT_INTERVAL_SECS;
    let mut report_frames = 0u64;

    while !stop.load(Ordering::Acquire) && opts.max_frames.is_none_or(|max| frames < max) {
        let tick_start = Instant::now();
        let now = clock.now();
        let frame = compositor.frame(stage, now)?;
        if frames % every == 0 {
            sink.push_frame(FrameIndex(frames), &frame)?;
            pushed += 1;
        }
        frames += 1;

        if now >= report_at {
            let window = now - (report_at - REPORT_INTERVAL_SECS);
            tracing::info!(
                fps = (frames - report_frames) as f64 / window,
                effects = compositor.effects().len(),
                "render rate"
            );
            report_frames = frames;
            report_at = now + REPORT_INTERVAL_SECS;
        }

        if let Some(rest) = period.checked_sub(tick_start.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    sink.end()?;
    let stats = RenderStats {
        frames,
        pushed,
        elapsed_secs: clock.now(),
    };
    tracing::info!(frames, pushed, fps = stats.fps(), "render loop finished");
    Ok(stats)
}
