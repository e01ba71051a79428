//! Stage configuration loaded from JSON.
//!
//! Every field has a default, so `{}` is a complete configuration.

use std::path::Path;

use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{FlightError, FlightResult};

/// Top-level configuration for a [`crate::Stage`] and its render loop.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Output canvas.
    pub canvas: Canvas,
    /// Path sampling and checkpoint handling.
    pub path: PathConfig,
    /// Entity defaults and bounds.
    pub entity: EntityConfig,
    /// Effect (bomb) defaults.
    pub effect: EffectConfig,
    /// Compositing knobs.
    pub render: RenderConfig,
    /// Control channel listener.
    pub control: ControlConfig,
    /// Seed for every random draw; `None` seeds from the OS.
    pub seed: Option<u64>,
}

/// How checkpoints become a path table.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Nominal time for an entity at speed 1 to cover the whole path.
    pub schedule_secs: f64,
    /// Table rows per nominal second; `schedule_secs * rows_per_sec` rows in total.
    pub rows_per_sec: f64,
    /// Consecutive checkpoints farther apart than this get tail points inserted.
    pub extend_threshold: f64,
    /// Distance of inserted tail points from each end of a long gap.
    pub tail_length: f64,
    /// Offset of interior control points along the chord direction.
    pub tangent_offset: f64,
    /// Number of checkpoints for a randomized path.
    pub random_checkpoints: usize,
}

/// Defaults and bounds applied to every entity.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EntityConfig {
    /// Inclusive `[min, max]` speed bounds.
    pub speed_limits: [f64; 2],
    /// Inclusive `[min, max]` emission-rate bounds (effects per second).
    pub emission_rate_limits: [f64; 2],
    /// Emission rate for new entities.
    pub emission_rate: f64,
    /// Effect range as a fraction of the raster's shorter side.
    pub effect_range: f64,
    /// Body radius in pixels.
    pub radius: f64,
    /// Updater iteration period in milliseconds.
    pub tick_ms: u64,
    /// Capacity of the per-entity distance trail buffer.
    pub trail_capacity: usize,
}

/// Defaults for spawned effects.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EffectConfig {
    /// Lifetime in seconds.
    pub duration_secs: f64,
    /// Radius at spawn, in pixels.
    pub start_radius: f64,
    /// Radius at expiry, in pixels.
    pub end_radius: f64,
}

/// Compositor knobs.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Target render ticks per second.
    pub fps: u32,
    /// Trail stroke width in pixels.
    pub trail_width: f64,
    /// Trail alpha (0-255) painted onto the persistent background.
    pub trail_alpha: u8,
    /// Size of the heading marker in pixels.
    pub marker_size: f64,
    /// How long the compositor waits for an entity lock before skipping it.
    pub lock_timeout_ms: u64,
}

/// Control channel listener address.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Bind host.
    pub host: String,
    /// Bind port; 0 picks an ephemeral port.
    pub port: u16,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas {
                width: 1280,
                height: 720,
                padding: 0,
            },
            path: PathConfig::default(),
            entity: EntityConfig::default(),
            effect: EffectConfig::default(),
            render: RenderConfig::default(),
            control: ControlConfig::default(),
            seed: None,
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            schedule_secs: 10.0,
            rows_per_sec: 100.0,
            extend_threshold: 0.3,
            tail_length: 0.1,
            tangent_offset: 0.05,
            random_checkpoints: 5,
        }
    }
}

impl Default for EntityConfig {
    fn default() -> Self {
        Self {
            speed_limits: [0.1, 10.0],
            emission_rate_limits: [0.01, 50.0],
            emission_rate: 0.5,
            effect_range: 0.05,
            radius: 5.0,
            tick_ms: 10,
            trail_capacity: 256,
        }
    }
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            duration_secs: 1.0,
            start_radius: 10.0,
            end_radius: 20.0,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            fps: 100,
            trail_width: 5.0,
            trail_alpha: 160,
            marker_size: 12.0,
            lock_timeout_ms: 2,
        }
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 37_123,
        }
    }
}

/// Upper bound on path table rows.
pub const MAX_PATH_ROWS: usize = 10_000_000;

impl PathConfig {
    /// Row count of the path table, `schedule_secs * rows_per_sec` truncated.
    ///
    /// Fails unless the count lies in `[2, MAX_PATH_ROWS]`.
    pub fn total_rows(&self) -> FlightResult<usize> {
        let rows = self.schedule_secs * self.rows_per_sec;
        if rows.is_nan() || rows < 2.0 {
            return Err(FlightError::validation(
                "path must have at least 2 table rows",
            ));
        }
        if rows > MAX_PATH_ROWS as f64 {
            return Err(FlightError::validation(format!(
                "path table would have {rows:.0} rows, more than {MAX_PATH_ROWS}"
            )));
        }
        Ok(rows as usize)
    }
}

impl StageConfig {
    /// Load and validate a configuration from a JSON file.
    pub fn from_path(path: &Path) -> FlightResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            FlightError::validation(format!("read config '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    /// Parse and validate a configuration from JSON text.
    pub fn from_json_str(text: &str) -> FlightResult<Self> {
        let cfg: Self = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Target frame rate as an [`Fps`].
    pub fn fps(&self) -> FlightResult<Fps> {
        Fps::new(self.render.fps, 1)
    }

    /// Check cross-field invariants.
    pub fn validate(&self) -> FlightResult<()> {
        self.canvas.raster_size_u16()?;
        self.fps()?;

        let p = &self.path;
        if !(p.schedule_secs.is_finite() && p.schedule_secs > 0.0) {
            return Err(FlightError::validation("path.schedule_secs must be > 0"));
        }
        if !(p.rows_per_sec.is_finite() && p.rows_per_sec > 0.0) {
            return Err(FlightError::validation("path.rows_per_sec must be > 0"));
        }
        p.total_rows()?;
        if !(p.tail_length > 0.0 && p.extend_threshold > 2.0 * p.tail_length) {
            return Err(FlightError::validation(
                "path.extend_threshold must exceed twice path.tail_length (> 0)",
            ));
        }
        if !(p.tangent_offset.is_finite() && p.tangent_offset >= 0.0) {
            return Err(FlightError::validation("path.tangent_offset must be >= 0"));
        }
        if p.random_checkpoints < 2 {
            return Err(FlightError::validation(
                "path.random_checkpoints must be >= 2",
            ));
        }

        let e = &self.entity;
        validate_limits("entity.speed_limits", e.speed_limits, false)?;
        validate_limits("entity.emission_rate_limits", e.emission_rate_limits, true)?;
        if !(e.emission_rate >= e.emission_rate_limits[0]
            && e.emission_rate <= e.emission_rate_limits[1])
        {
            return Err(FlightError::validation(
                "entity.emission_rate must lie within entity.emission_rate_limits",
            ));
        }
        if !(e.effect_range.is_finite() && e.effect_range >= 0.0) {
            return Err(FlightError::validation("entity.effect_range must be >= 0"));
        }
        if e.tick_ms == 0 {
            return Err(FlightError::validation("entity.tick_ms must be > 0"));
        }
        if e.trail_capacity < 2 {
            return Err(FlightError::validation("entity.trail_capacity must be >= 2"));
        }

        let fx = &self.effect;
        if !(fx.duration_secs.is_finite() && fx.duration_secs > 0.0) {
            return Err(FlightError::validation("effect.duration_secs must be > 0"));
        }
        if !(fx.start_radius >= 0.0 && fx.start_radius < fx.end_radius) {
            return Err(FlightError::validation(
                "effect radii must satisfy 0 <= start_radius < end_radius",
            ));
        }
        Ok(())
    }
}

fn validate_limits(name: &str, [lo, hi]: [f64; 2], strictly_positive: bool) -> FlightResult<()> {
    if !(lo.is_finite() && hi.is_finite() && lo <= hi) {
        return Err(FlightError::validation(format!(
            "{name} must be finite with min <= max"
        )));
    }
    if strictly_positive && lo <= 0.0 {
        return Err(FlightError::validation(format!("{name} min must be > 0")));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
