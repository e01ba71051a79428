//! Frame assembly on the CPU rasterizer.

pub mod compositor;
pub mod driver;
pub mod frame;
pub(crate) mod raster;
pub mod roadmap;

pub use compositor::{Compositor, IDLE_RGBA};
pub use driver::{RenderLoopOpts, RenderStats, run_render_loop};
pub use frame::FrameRGBA;
pub use roadmap::render_road_map;
