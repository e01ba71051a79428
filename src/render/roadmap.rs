//! The static road-map background: sampled curves over gray checkpoint chords.

use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::error::FlightResult;
use crate::path::map::PathMap;
use crate::render::frame::FrameRGBA;
use crate::render::raster::{Layer, Painter, polyline};

/// Samples per curve segment.
pub const CURVE_SAMPLES: usize = 1000;
/// Curve stroke width in pixels.
pub const CURVE_WIDTH: f64 = 2.0;
/// Checkpoint chord stroke width in pixels.
pub const CHORD_WIDTH: f64 = 1.0;
/// Checkpoint chord color.
pub const CHORD_COLOR: Rgba8 = Rgba8::opaque(128, 128, 128);

const VIRIDIS: [[u8; 3]; 5] = [
    [68, 1, 84],
    [59, 82, 139],
    [33, 145, 140],
    [94, 201, 98],
    [253, 231, 37],
];

/// Viridis-style ramp for `t` in `[0, 1]`.
pub fn ramp_color(t: f64) -> Rgba8 {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let x = t * (VIRIDIS.len() - 1) as f64;
    let i = (x.floor() as usize).min(VIRIDIS.len() - 2);
    let f = x - i as f64;
    let lerp = |a: u8, b: u8| -> u8 { (f64::from(a) + (f64::from(b) - f64::from(a)) * f).round() as u8 };
    let (a, b) = (VIRIDIS[i], VIRIDIS[i + 1]);
    Rgba8::opaque(lerp(a[0], b[0]), lerp(a[1], b[1]), lerp(a[2], b[2]))
}

/// Color for segment `index` of `count`.
pub fn segment_color(index: usize, count: usize) -> Rgba8 {
    if count <= 1 {
        return ramp_color(0.0);
    }
    ramp_color(index as f64 / (count - 1) as f64)
}

pub(crate) fn draw_road_map(p: &mut Painter<'_>, map: &PathMap, canvas: Canvas) {
    let chords = polyline(map.checkpoints().iter().map(|&pt| canvas.to_pixels(pt)));
    p.stroke(&chords, CHORD_WIDTH, CHORD_COLOR);

    let count = map.segments().len();
    for entry in map.segments() {
        let seg = &entry.segment;
        let line = polyline((0..CURVE_SAMPLES).map(|k| {
            let t = k as f64 / (CURVE_SAMPLES - 1) as f64;
            canvas.to_pixels(seg.eval(t))
        }));
        p.stroke(&line, CURVE_WIDTH, segment_color(seg.index, count));
    }
}

/// Render the road map alone onto a transparent frame.
pub fn render_road_map(map: &PathMap, canvas: Canvas) -> FlightResult<FrameRGBA> {
    let (w, h) = canvas.raster_size_u16()?;
    let mut layer = Layer::new(w, h);
    let data = layer.render(|p| draw_road_map(p, map, canvas)).to_vec();
    Ok(FrameRGBA {
        width: u32::from(w),
        height: u32::from(h),
        data,
        premultiplied: true,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/roadmap.rs"]
mod tests;
