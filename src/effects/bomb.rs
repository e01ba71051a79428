use crate::foundation::core::{Point, Rgba8};

/// Size and lifetime shared by every bomb an emitter spawns.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BombStyle {
    /// Lifetime in seconds.
    pub duration: f64,
    /// Radius at spawn, in pixels.
    pub start_radius: f64,
    /// Radius at expiry, in pixels.
    pub end_radius: f64,
}

impl Default for BombStyle {
    fn default() -> Self {
        Self {
            duration: 1.0,
            start_radius: 10.0,
            end_radius: 20.0,
        }
    }
}

/// A single timed marker that blooms: it grows and fades in until it expires.
#[derive(Clone, Debug, PartialEq)]
pub struct Bomb {
    /// Center in pixels.
    pub position: Point,
    /// Spawn time in clock seconds.
    pub t0: f64,
    /// Size and lifetime.
    pub style: BombStyle,
    /// Base color; its alpha is the peak opacity.
    pub color: Rgba8,
    /// Name of the entity that dropped it.
    pub owner: String,
}

/// Derived appearance of a bomb at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BombFrame {
    /// Rendered radius in pixels.
    pub radius: f64,
    /// Rendered color, alpha already scaled.
    pub color: Rgba8,
    /// Elapsed fraction of the lifetime in `[0, 1]`.
    pub elapsed: f64,
}

impl Bomb {
    /// Time after which the bomb is expired.
    pub fn t1(&self) -> f64 {
        self.t0 + self.style.duration
    }

    /// Elapsed fraction of the lifetime, clamped to `[0, 1]`.
    pub fn elapsed_fraction(&self, t: f64) -> f64 {
        ((t - self.t0) / self.style.duration).clamp(0.0, 1.0)
    }

    /// Radius and opacity at time `t`: both rise linearly from spawn to expiry.
    pub fn state_at(&self, t: f64) -> BombFrame {
        let f = self.elapsed_fraction(t);
        let s = self.style;
        BombFrame {
            radius: s.start_radius + (s.end_radius - s.start_radius) * f,
            color: self.color.scale_alpha(f),
            elapsed: f,
        }
    }

    /// `true` strictly after `t0 + duration`.
    pub fn is_expired(&self, t: f64) -> bool {
        t > self.t1()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/bomb.rs"]
mod tests;
