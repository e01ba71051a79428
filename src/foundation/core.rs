use crate::foundation::error::{FlightError, FlightResult};

pub use kurbo::{Point, Vec2};

/// Absolute 0-based index of a rendered frame.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> FlightResult<Self> {
        if den == 0 {
            return Err(FlightError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(FlightError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }
}

/// Output canvas: pixel size plus the padding around the normalized drawing area.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Drawing-area width in pixels.
    pub width: u32,
    /// Drawing-area height in pixels.
    pub height: u32,
    /// Transparent border added on every side.
    #[serde(default)]
    pub padding: u32,
}

impl Canvas {
    /// Full raster width including padding.
    pub fn raster_width(self) -> u32 {
        self.width + 2 * self.padding
    }

    /// Full raster height including padding.
    pub fn raster_height(self) -> u32 {
        self.height + 2 * self.padding
    }

    /// Shorter side of the full raster, the scale for effect ranges.
    pub fn min_side(self) -> f64 {
        f64::from(self.raster_width().min(self.raster_height()))
    }

    /// Map a normalized `[0,1]²` point into pixel space.
    pub fn to_pixels(self, p: Point) -> Point {
        let pad = f64::from(self.padding);
        Point::new(
            p.x * f64::from(self.width) + pad,
            p.y * f64::from(self.height) + pad,
        )
    }

    /// Raster size as `u16` pairs, as required by the CPU rasterizer.
    pub fn raster_size_u16(self) -> FlightResult<(u16, u16)> {
        let w: u16 = self
            .raster_width()
            .try_into()
            .map_err(|_| FlightError::validation("canvas width exceeds u16"))?;
        let h: u16 = self
            .raster_height()
            .try_into()
            .map_err(|_| FlightError::validation("canvas height exceeds u16"))?;
        if w == 0 || h == 0 {
            return Err(FlightError::validation("canvas must be non-empty"));
        }
        Ok((w, h))
    }
}

/// Straight-alpha RGBA8 color; serialized as `[r, g, b, a]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "[u8; 4]", into = "[u8; 4]")]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Build a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Same color with a replaced alpha.
    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Same color with alpha scaled by `factor` in `[0, 1]`.
    pub fn scale_alpha(self, factor: f64) -> Self {
        let a = (f64::from(self.a) * factor.clamp(0.0, 1.0)).round() as u8;
        self.with_alpha(a)
    }
}

impl From<[u8; 4]> for Rgba8 {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

impl From<Rgba8> for [u8; 4] {
    fn from(c: Rgba8) -> Self {
        [c.r, c.g, c.b, c.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
