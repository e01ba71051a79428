use crate::effects::emitter::EffectEmitter;
use crate::foundation::core::Rgba8;
use crate::foundation::error::{FlightError, FlightResult};
use crate::motion::trail::TrailBuffer;

/// Inclusive `[min, max]` bounds used for speed and emission rate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

impl Bounds {
    /// Bounds from a config pair.
    pub fn from_pair([min, max]: [f64; 2]) -> Self {
        Self { min, max }
    }

    /// Clamp any input, including NaN and infinities, into the bounds. NaN maps to `min`.
    pub fn clamp(self, v: f64) -> f64 {
        if v.is_nan() {
            self.min
        } else {
            v.clamp(self.min, self.max)
        }
    }
}

/// How an entity looks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Appearance {
    /// Body radius in pixels.
    pub radius: f64,
    /// Body, trail, and bomb color.
    pub color: Rgba8,
}

/// Where an entity is and how fast it goes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Motion {
    /// Distance travelled; unbounded, wrapped onto the path only when read for drawing.
    pub distance: f64,
    /// Speed multiplier, always inside `limits`.
    pub speed: f64,
    /// Path distance per second at speed 1.
    pub speed_unit: f64,
    /// Allowed speed range.
    pub limits: Bounds,
}

impl Motion {
    /// Motion at distance 0 with `speed` clamped into `limits`.
    pub fn new(speed: f64, speed_unit: f64, limits: Bounds) -> Self {
        Self {
            distance: 0.0,
            speed: limits.clamp(speed),
            speed_unit,
            limits,
        }
    }

    /// Integrate `dt` seconds of travel and return the new distance.
    pub fn advance(&mut self, dt: f64) -> FlightResult<f64> {
        let next = self.distance + self.speed * self.speed_unit * dt;
        if !next.is_finite() {
            return Err(FlightError::out_of_range(format!(
                "distance became non-finite (speed {}, unit {}, dt {dt})",
                self.speed, self.speed_unit
            )));
        }
        self.distance = next;
        Ok(next)
    }
}

/// Everything guarded by one entity's lock.
///
/// The updater thread, control commands, and the compositor all go through the same mutex, so
/// a reader never sees distance, speed, and color from different moments.
#[derive(Clone, Debug)]
pub struct EntityState {
    /// Body look.
    pub appearance: Appearance,
    /// Travel state.
    pub motion: Motion,
    /// Bomb schedule.
    pub emitter: EffectEmitter,
    /// Distances recorded by the updater since the last drain.
    pub trail: TrailBuffer,
    /// Set while an updater owns this entity.
    pub running: bool,
    /// Effect range as a fraction of the raster's shorter side.
    pub effect_range: f64,
    /// Whether the effect-range outline is drawn.
    pub effect_range_visible: bool,
}

impl EntityState {
    /// Store `speed` clamped into the motion limits; returns the stored value.
    pub fn set_speed(&mut self, speed: f64) -> f64 {
        self.motion.speed = self.motion.limits.clamp(speed);
        self.motion.speed
    }

    /// Set the body radius; negative and non-finite values are ignored.
    pub fn set_radius(&mut self, radius: f64) {
        if radius.is_finite() && radius >= 0.0 {
            self.appearance.radius = radius;
        }
    }

    /// Jump back to the path start and forget the trail.
    pub fn reset_distance(&mut self) {
        self.motion.distance = 0.0;
        self.trail.clear();
    }

    /// Replace the path-dependent distance unit.
    pub fn set_speed_unit(&mut self, speed_unit: f64) {
        self.motion.speed_unit = speed_unit;
    }

    /// Public view of the record.
    pub fn info(&self, name: &str) -> EntityInfo {
        EntityInfo {
            name: name.to_string(),
            color: self.appearance.color,
            radius: self.appearance.radius,
            speed: self.motion.speed,
            running: self.running,
            distance: self.motion.distance,
            effect_range_visible: self.effect_range_visible,
            emission_rate: self.emitter.rate(),
        }
    }
}

/// Entity summary returned by `list_entities`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EntityInfo {
    /// Unique name.
    pub name: String,
    /// RGBA color.
    pub color: Rgba8,
    /// Body radius in pixels.
    pub radius: f64,
    /// Current speed multiplier.
    pub speed: f64,
    /// Whether an updater is live.
    pub running: bool,
    /// Unwrapped distance travelled.
    pub distance: f64,
    /// Whether the effect-range outline is drawn.
    pub effect_range_visible: bool,
    /// Bombs per second.
    pub emission_rate: f64,
}

#[cfg(test)]
#[path = "../../tests/unit/motion/state.rs"]
mod tests;
