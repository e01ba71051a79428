use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::Duration;

use anyhow::anyhow;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

use crate::config::StageConfig;
use crate::effects::bomb::BombStyle;
use crate::effects::emitter::EffectEmitter;
use crate::foundation::core::{Point, Rgba8};
use crate::foundation::error::{FlightError, FlightResult};
use crate::motion::entity::Entity;
use crate::motion::state::{Appearance, Bounds, EntityInfo, EntityState, Motion};
use crate::motion::trail::TrailBuffer;
use crate::path::checkpoints::checkpoints_from_pairs;
use crate::path::map::PathMap;
use crate::stage::target::Target;

/// Explicit parameters for a new entity.
#[derive(Clone, Debug, PartialEq)]
pub struct EntitySpec {
    /// Name to register; `None` picks the first free `entity-N`.
    pub name: Option<String>,
    /// Body color.
    pub color: Rgba8,
    /// Initial speed, clamped into the configured limits.
    pub speed: f64,
    /// Start the updater right away.
    pub start: bool,
}

/// Owns the active path and every entity.
///
/// All control operations are methods here and take `&self`, so a `Stage` behind an `Arc` can
/// serve concurrent control clients while the render loop reads from it.
pub struct Stage {
    config: StageConfig,
    path: RwLock<Arc<PathMap>>,
    path_generation: AtomicU64,
    entities: RwLock<BTreeMap<String, Arc<Entity>>>,
    rng: Mutex<Pcg64>,
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage")
            .field("path_generation", &self.path_generation())
            .finish_non_exhaustive()
    }
}

fn poisoned(what: &str) -> FlightError {
    FlightError::Other(anyhow!("{what} lock poisoned"))
}

impl Stage {
    /// Validate `config` and build a stage on a random path.
    pub fn new(config: StageConfig) -> FlightResult<Self> {
        config.validate()?;
        let mut rng = seeded_rng(config.seed);
        let path = PathMap::random(&config.path, &mut rng)?;
        Ok(Self::assemble(config, path, rng))
    }

    /// Validate `config` and build a stage on the path through `checkpoints`.
    pub fn with_checkpoints(config: StageConfig, checkpoints: &[Point]) -> FlightResult<Self> {
        config.validate()?;
        let rng = seeded_rng(config.seed);
        let path = PathMap::build(checkpoints, &config.path)?;
        Ok(Self::assemble(config, path, rng))
    }

    fn assemble(config: StageConfig, path: PathMap, rng: Pcg64) -> Self {
        Self {
            config,
            path: RwLock::new(Arc::new(path)),
            path_generation: AtomicU64::new(0),
            entities: RwLock::new(BTreeMap::new()),
            rng: Mutex::new(rng),
        }
    }

    /// Configuration the stage was built with.
    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    /// The current path. Callers keep the returned `Arc` for a whole tick.
    pub fn path(&self) -> FlightResult<Arc<PathMap>> {
        let guard = self.path.read().map_err(|_| poisoned("stage path"))?;
        Ok(Arc::clone(&guard))
    }

    /// Bumped on every successful path swap.
    pub fn path_generation(&self) -> u64 {
        self.path_generation.load(Ordering::Acquire)
    }

    /// A fresh generator seeded from the stage generator.
    pub fn fork_rng(&self) -> FlightResult<Pcg64> {
        let seed = self.rng()?.random::<u64>();
        Ok(Pcg64::seed_from_u64(seed))
    }

    fn rng(&self) -> FlightResult<MutexGuard<'_, Pcg64>> {
        self.rng.lock().map_err(|_| poisoned("stage rng"))
    }

    /// Registered entities in name order.
    pub fn entities(&self) -> FlightResult<Vec<Arc<Entity>>> {
        let map = self.entities.read().map_err(|_| poisoned("entity registry"))?;
        Ok(map.values().cloned().collect())
    }

    /// Look up one entity.
    pub fn entity(&self, name: &str) -> FlightResult<Arc<Entity>> {
        let map = self.entities.read().map_err(|_| poisoned("entity registry"))?;
        map.get(name)
            .cloned()
            .ok_or_else(|| FlightError::invalid_entity(format!("no entity named '{name}'")))
    }

    fn targets(&self, target: Target<'_>) -> FlightResult<Vec<Arc<Entity>>> {
        match target {
            Target::All => self.entities(),
            Target::Named(name) => Ok(vec![self.entity(name)?]),
        }
    }

    /// Summaries of every entity.
    pub fn list_entities(&self) -> FlightResult<Vec<EntityInfo>> {
        self.entities()?.iter().map(|e| e.info()).collect()
    }

    /// Register a started entity with a random color and speed; returns its name.
    pub fn add_entity(&self) -> FlightResult<String> {
        let spec = {
            let mut rng = self.rng()?;
            let color = Rgba8::opaque(rng.random(), rng.random(), rng.random());
            let speed = (rng.random_range(0.5..=2.5) * 10.0_f64).round() / 10.0;
            EntitySpec {
                name: None,
                color,
                speed,
                start: true,
            }
        };
        self.add_entity_with(spec)
    }

    /// Register an entity from explicit parameters; returns its name.
    pub fn add_entity_with(&self, spec: EntitySpec) -> FlightResult<String> {
        let entity = {
            let mut map = self
                .entities
                .write()
                .map_err(|_| poisoned("entity registry"))?;
            // Read under the registry lock so a concurrent path install cannot slip in between.
            let speed_unit = self.path()?.speed_unit();
            let name = match spec.name {
                Some(name) if map.contains_key(&name) => {
                    return Err(FlightError::invalid_entity(format!(
                        "entity '{name}' already exists"
                    )));
                }
                Some(name) => name,
                None => first_free_name(&map),
            };
            let entity = Arc::new(Entity::new(
                name.clone(),
                self.initial_state(spec.color, spec.speed, speed_unit),
                Duration::from_millis(self.config.entity.tick_ms),
            ));
            map.insert(name, Arc::clone(&entity));
            entity
        };
        tracing::info!(entity = %entity.name(), "entity added");
        if spec.start {
            entity.go()?;
        }
        Ok(entity.name().to_string())
    }

    fn initial_state(&self, color: Rgba8, speed: f64, speed_unit: f64) -> EntityState {
        let e = &self.config.entity;
        let fx = &self.config.effect;
        EntityState {
            appearance: Appearance {
                radius: e.radius,
                color,
            },
            motion: Motion::new(speed, speed_unit, Bounds::from_pair(e.speed_limits)),
            emitter: EffectEmitter::new(
                e.emission_rate,
                BombStyle {
                    duration: fx.duration_secs,
                    start_radius: fx.start_radius,
                    end_radius: fx.end_radius,
                },
            ),
            trail: TrailBuffer::new(e.trail_capacity),
            running: false,
            effect_range: e.effect_range,
            effect_range_visible: false,
        }
    }

    /// Stop an entity, wait for its updater to exit, and drop it.
    pub fn remove_entity(&self, name: &str) -> FlightResult<()> {
        let removed = self
            .entities
            .write()
            .map_err(|_| poisoned("entity registry"))?
            .remove(name)
            .ok_or_else(|| FlightError::invalid_entity(format!("no entity named '{name}'")))?;
        removed.stop_and_join()?;
        tracing::info!(entity = %name, "entity removed");
        Ok(())
    }

    /// Start or stop entities.
    ///
    /// Starting a single entity that is already running answers `AlreadyRunning`; with
    /// [`Target::All`] running entities are left alone.
    pub fn set_running(&self, target: Target<'_>, running: bool) -> FlightResult<()> {
        for entity in self.targets(target)? {
            if running {
                match entity.go() {
                    Err(FlightError::AlreadyRunning(msg)) => {
                        tracing::debug!(entity = %entity.name(), "{msg}");
                        if let Target::Named(_) = target {
                            return Err(FlightError::AlreadyRunning(msg));
                        }
                    }
                    other => other?,
                }
            } else {
                entity.stop()?;
            }
        }
        Ok(())
    }

    /// Show or hide the effect-range outline.
    pub fn set_effect_range_visible(&self, target: Target<'_>, visible: bool) -> FlightResult<()> {
        for entity in self.targets(target)? {
            entity.with_state(|s| s.effect_range_visible = visible)?;
        }
        Ok(())
    }

    /// Set speed, clamped into the configured limits; returns the stored value.
    pub fn set_speed(&self, name: &str, speed: f64) -> FlightResult<f64> {
        self.entity(name)?.with_state(|s| s.set_speed(speed))
    }

    /// Set the emission rate, clamped into the configured limits; returns the stored value.
    pub fn set_emission_rate(&self, target: Target<'_>, rate: f64) -> FlightResult<f64> {
        if !rate.is_finite() {
            return Err(FlightError::out_of_range(format!(
                "emission rate must be finite, got {rate}"
            )));
        }
        let rate = Bounds::from_pair(self.config.entity.emission_rate_limits).clamp(rate);
        for entity in self.targets(target)? {
            entity.with_state(|s| s.emitter.set_rate(rate))?;
        }
        Ok(rate)
    }

    /// Move an entity back to the path start.
    pub fn reset_distance(&self, name: &str) -> FlightResult<()> {
        self.entity(name)?.with_state(EntityState::reset_distance)
    }

    /// Set speed and color together.
    pub fn update_entity(&self, name: &str, speed: f64, color: Rgba8) -> FlightResult<f64> {
        self.entity(name)?.with_state(|s| {
            s.appearance.color = color;
            s.set_speed(speed)
        })
    }

    /// Rebuild the path from raw checkpoints and swap it in.
    ///
    /// On failure the previous path stays active. On success every entity gets the new
    /// `speed_unit` and is reset to distance 0.
    pub fn regenerate_path(&self, checkpoints: &[[f64; 2]]) -> FlightResult<()> {
        let points = checkpoints_from_pairs(checkpoints)?;
        let map = PathMap::build(&points, &self.config.path).map_err(|err| {
            tracing::warn!(error = %err, "path regeneration rejected; keeping current path");
            err
        })?;
        self.install_path(map)
    }

    /// Replace the path with a fresh random one.
    pub fn randomize_path(&self) -> FlightResult<()> {
        let map = {
            let mut rng = self.rng()?;
            PathMap::random(&self.config.path, &mut *rng)?
        };
        self.install_path(map)
    }

    /// Swap in `map` and retune every entity.
    ///
    /// The registry write lock is taken first and held throughout, the same order
    /// `add_entity_with` uses, so concurrent installs apply whole and in sequence.
    fn install_path(&self, map: PathMap) -> FlightResult<()> {
        let speed_unit = map.speed_unit();
        let registry = self
            .entities
            .write()
            .map_err(|_| poisoned("entity registry"))?;
        {
            let mut slot = self.path.write().map_err(|_| poisoned("stage path"))?;
            *slot = Arc::new(map);
            self.path_generation.fetch_add(1, Ordering::AcqRel);
        }
        for entity in registry.values() {
            entity.with_state(|s| {
                s.set_speed_unit(speed_unit);
                s.reset_distance();
            })?;
        }
        tracing::info!(
            entities = registry.len(),
            speed_unit,
            generation = self.path_generation(),
            "path regenerated"
        );
        Ok(())
    }

    /// Stop every entity and wait for all updaters to exit.
    pub fn shutdown(&self) -> FlightResult<()> {
        for entity in self.entities()? {
            entity.stop_and_join()?;
        }
        Ok(())
    }
}

fn seeded_rng(seed: Option<u64>) -> Pcg64 {
    let seed = seed.unwrap_or_else(rand::random);
    tracing::debug!(seed, "seeding stage rng");
    Pcg64::seed_from_u64(seed)
}

fn first_free_name(map: &BTreeMap<String, Arc<Entity>>) -> String {
    (1..)
        .map(|n: u64| format!("entity-{n}"))
        .find(|name| !map.contains_key(name))
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "../../tests/unit/stage/orchestrator.rs"]
mod tests;
