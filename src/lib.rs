//! Flightline animates named entities along a smooth path through checkpoints.
//!
//! - A [`PathMap`] turns checkpoints into cubic segments and a dense arc-length table
//! - Each [`Entity`] advances its distance on its own updater thread
//! - A [`Compositor`] snapshots every entity per tick, draws trails, markers, and stochastic
//!   "bomb" effects, and hands frames to a [`FrameSink`]
//! - A [`Stage`] owns all of it and answers the control channel ([`ControlServer`])
#![forbid(unsafe_code)]

pub mod config;
pub mod control;
pub mod effects;
pub mod encode;
pub mod foundation;
pub mod motion;
pub mod path;
pub mod render;
pub mod stage;

pub use crate::config::StageConfig;
pub use crate::control::{ControlClient, ControlServer, Request, Response};
pub use crate::effects::{Bomb, EffectEmitter, EffectPool};
pub use crate::encode::{FrameSink, InMemorySink, LatestFrameSink, PngSequenceSink, SinkConfig};
pub use crate::foundation::core::{Canvas, Fps, FrameIndex, Point, Rgba8, Vec2};
pub use crate::foundation::error::{FlightError, FlightResult};
pub use crate::foundation::time::Clock;
pub use crate::motion::{Entity, EntityInfo};
pub use crate::path::{PathMap, PathTable};
pub use crate::render::{
    Compositor, FrameRGBA, RenderLoopOpts, RenderStats, render_road_map, run_render_loop,
};
pub use crate::stage::{EntitySpec, Stage, Target};
