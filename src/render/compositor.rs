//! Per-tick frame assembly.

use std::sync::Arc;
use std::time::Duration;

use kurbo::BezPath;
use rand_pcg::Pcg64;

use crate::config::{RenderConfig, StageConfig};
use crate::effects::bomb::Bomb;
use crate::effects::pool::EffectPool;
use crate::foundation::core::{Canvas, Point, Rgba8, Vec2};
use crate::foundation::error::FlightResult;
use crate::foundation::math::premul_over_in_place;
use crate::path::map::PathMap;
use crate::path::table::RowSpan;
use crate::render::frame::FrameRGBA;
use crate::render::raster::{Layer, Painter};
use crate::render::roadmap::draw_road_map;
use crate::stage::Stage;

/// Color of the frame emitted while no entity is registered.
pub const IDLE_RGBA: [u8; 4] = [0, 0, 0, 100];

/// What the compositor read from one entity under its lock.
#[derive(Clone, Debug)]
struct Snapshot {
    color: Rgba8,
    radius: f64,
    range_px: f64,
    range_visible: bool,
    position: Point,
    trail: RowSpan,
}

/// Builds frames from a [`Stage`].
///
/// Owns the effect pool and the persistent background. Trails are painted into the background
/// once, so they accumulate across frames until the path changes.
pub struct Compositor {
    canvas: Canvas,
    render: RenderConfig,
    width: u16,
    height: u16,
    layer: Layer,
    background: Vec<u8>,
    generation: Option<u64>,
    pool: EffectPool,
    rng: Pcg64,
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("canvas", &self.canvas)
            .field("generation", &self.generation)
            .field("effects", &self.pool.len())
            .finish_non_exhaustive()
    }
}

impl Compositor {
    /// A compositor for `config`'s canvas, drawing randomness from `rng`.
    pub fn new(config: &StageConfig, rng: Pcg64) -> FlightResult<Self> {
        let (width, height) = config.canvas.raster_size_u16()?;
        Ok(Self {
            canvas: config.canvas,
            render: config.render.clone(),
            width,
            height,
            layer: Layer::new(width, height),
            background: Vec::new(),
            generation: None,
            pool: EffectPool::new(),
            rng,
        })
    }

    /// Live effects.
    pub fn effects(&self) -> &EffectPool {
        &self.pool
    }

    /// Assemble the frame for time `now` (seconds on the render clock).
    pub fn frame(&mut self, stage: &Stage, now: f64) -> FlightResult<FrameRGBA> {
        self.pool.prune(now);

        let path = stage.path()?;
        let generation = stage.path_generation();
        if self.generation != Some(generation) {
            self.rebuild_background(&path);
            self.generation = Some(generation);
        }

        let entities = stage.entities()?;
        if entities.is_empty() {
            return Ok(FrameRGBA::filled(
                u32::from(self.width),
                u32::from(self.height),
                IDLE_RGBA,
            ));
        }

        let timeout = Duration::from_millis(self.render.lock_timeout_ms);
        let mut snapshots = Vec::with_capacity(entities.len());
        for entity in &entities {
            let Some(mut state) = entity.lock_within(timeout) else {
                tracing::trace!(entity = %entity.name(), "entity busy; skipped this tick");
                continue;
            };
            let table = path.table();
            let distance = state.motion.distance;
            let samples = state.trail.drain_keep_last();
            let oldest = samples.first().copied().unwrap_or(distance);
            let position = self.canvas.to_pixels(table.position_at(distance).pos);
            let range_px = state.effect_range * self.canvas.min_side();
            let color = state.appearance.color;

            if state.running && state.emitter.next_due().is_none() {
                state.emitter.schedule_next(now, &mut self.rng);
            }
            let bomb = state.emitter.try_emit(
                now,
                position,
                range_px,
                color,
                entity.name(),
                &mut self.rng,
            );

            snapshots.push(Snapshot {
                color,
                radius: state.appearance.radius,
                range_px,
                range_visible: state.effect_range_visible,
                position,
                trail: table.span_between(oldest, distance),
            });
            drop(state);

            if let Some(bomb) = bomb {
                tracing::trace!(entity = %entity.name(), "effect emitted");
                self.pool.add(bomb);
            }
        }

        self.accumulate_trails(&path, &snapshots)?;

        let mut data = self.background.clone();
        let canvas = self.canvas;
        let render = &self.render;
        let pool = &self.pool;
        let overlay = self.layer.render(|p| {
            for snap in &snapshots {
                draw_entity(p, &path, canvas, render, snap);
            }
            for bomb in pool.iter() {
                draw_bomb(p, bomb, now);
            }
        });
        premul_over_in_place(&mut data, overlay)?;

        Ok(FrameRGBA {
            width: u32::from(self.width),
            height: u32::from(self.height),
            data,
            premultiplied: true,
        })
    }

    fn rebuild_background(&mut self, path: &Arc<PathMap>) {
        let canvas = self.canvas;
        self.background = self
            .layer
            .render(|p| draw_road_map(p, path, canvas))
            .to_vec();
        tracing::debug!("compositor background rebuilt");
    }

    fn accumulate_trails(&mut self, path: &PathMap, snapshots: &[Snapshot]) -> FlightResult<()> {
        let canvas = self.canvas;
        let width = self.render.trail_width;
        let alpha = self.render.trail_alpha;
        let trails = self.layer.render(|p| {
            for snap in snapshots {
                let line = span_path(path, canvas, snap.trail);
                p.stroke(&line, width, snap.color.with_alpha(alpha));
            }
        });
        premul_over_in_place(&mut self.background, trails)
    }
}

fn row_pixel(path: &PathMap, canvas: Canvas, idx: usize) -> Option<Point> {
    path.table().rows().get(idx).map(|r| canvas.to_pixels(r.pos))
}

/// Polyline through a row span in pixel space, broken at the wrap point.
fn span_path(path: &PathMap, canvas: Canvas, span: RowSpan) -> BezPath {
    let mut out = BezPath::new();
    let mut last = None;
    for (a, b) in span.line_pairs() {
        let (Some(pa), Some(pb)) = (row_pixel(path, canvas, a), row_pixel(path, canvas, b)) else {
            continue;
        };
        if last != Some(a) {
            out.move_to(pa);
        }
        out.line_to(pb);
        last = Some(b);
    }
    out
}

/// Unit heading of the newest trail segment, if it has non-zero length.
fn heading(path: &PathMap, canvas: Canvas, span: RowSpan) -> Option<Vec2> {
    let (a, b) = span.last_pair()?;
    let d = row_pixel(path, canvas, b)? - row_pixel(path, canvas, a)?;
    let angle = d.y.atan2(d.x);
    (d.hypot() > 0.0).then(|| Vec2::from_angle(angle))
}

fn draw_entity(
    p: &mut Painter<'_>,
    path: &PathMap,
    canvas: Canvas,
    render: &RenderConfig,
    snap: &Snapshot,
) {
    if snap.range_visible {
        p.stroke_circle(snap.position, snap.range_px, 1.0, snap.color);
    }
    if let Some(u) = heading(path, canvas, snap.trail) {
        let n = Vec2::new(-u.y, u.x);
        let s = render.marker_size;
        let c = snap.position;
        let mut marker = BezPath::new();
        marker.move_to(c + u * s);
        marker.line_to(c - u * (0.5 * s) + n * (0.5 * s));
        marker.line_to(c - u * (0.5 * s) - n * (0.5 * s));
        marker.close_path();
        p.fill(&marker, snap.color);
    }
    p.fill_circle(snap.position, snap.radius, snap.color);
}

fn draw_bomb(p: &mut Painter<'_>, bomb: &Bomb, now: f64) {
    if bomb.is_expired(now) {
        return;
    }
    let state = bomb.state_at(now);
    p.fill_circle(bomb.position, state.radius, state.color);
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
