use rand::Rng;

use crate::effects::bomb::{Bomb, BombStyle};
use crate::foundation::core::{Point, Rgba8};

/// Poisson emission schedule for one entity.
///
/// Inter-arrival times are exponential with mean `1 / rate`. The schedule is armed by
/// [`EffectEmitter::schedule_next`] when the entity starts and re-armed every time a bomb fires.
#[derive(Clone, Debug, PartialEq)]
pub struct EffectEmitter {
    rate: f64,
    next_due: Option<f64>,
    style: BombStyle,
}

impl EffectEmitter {
    /// Unarmed emitter with `rate` effects per second. `rate` must be positive.
    pub fn new(rate: f64, style: BombStyle) -> Self {
        Self {
            rate,
            next_due: None,
            style,
        }
    }

    /// Effects per second.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Replace the rate; callers clamp it into configured bounds first.
    pub fn set_rate(&mut self, rate: f64) {
        self.rate = rate;
    }

    /// Next firing time, if armed.
    pub fn next_due(&self) -> Option<f64> {
        self.next_due
    }

    /// Draw an exponential inter-arrival time.
    pub fn sample_interval<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        // `random` is in [0, 1); flip it so `ln` never sees zero.
        let u = 1.0 - rng.random::<f64>();
        -u.ln() / self.rate
    }

    /// Arm the schedule relative to `now`.
    pub fn schedule_next<R: Rng + ?Sized>(&mut self, now: f64, rng: &mut R) {
        self.next_due = Some(now + self.sample_interval(rng));
    }

    /// Disarm; nothing fires until the next [`EffectEmitter::schedule_next`].
    pub fn disarm(&mut self) {
        self.next_due = None;
    }

    /// Fire a bomb if one is due.
    ///
    /// The bomb lands uniformly inside the disk of radius `range` around `center`; taking the
    /// square root of the radial draw keeps the density uniform over the area.
    pub fn try_emit<R: Rng + ?Sized>(
        &mut self,
        now: f64,
        center: Point,
        range: f64,
        color: Rgba8,
        owner: &str,
        rng: &mut R,
    ) -> Option<Bomb> {
        let due = self.next_due?;
        if now < due {
            return None;
        }
        self.schedule_next(now, rng);

        let theta = rng.random::<f64>() * std::f64::consts::TAU;
        let r = range * rng.random::<f64>().sqrt();
        Some(Bomb {
            position: Point::new(center.x + r * theta.cos(), center.y + r * theta.sin()),
            t0: now,
            style: self.style,
            color,
            owner: owner.to_string(),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/emitter.rs"]
mod tests;
