//! A named entity and its background updater thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::anyhow;

use crate::foundation::error::{FlightError, FlightResult};
use crate::motion::state::{EntityInfo, EntityState};

struct Mover {
    cancel: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl Mover {
    fn is_live(&self) -> bool {
        !self.cancel.load(Ordering::Acquire) && !self.handle.is_finished()
    }
}

/// One moving entity: its guarded state plus at most one live updater.
pub struct Entity {
    name: String,
    state: Arc<Mutex<EntityState>>,
    mover: Mutex<Option<Mover>>,
    tick: Duration,
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("name", &self.name)
            .field("tick", &self.tick)
            .finish_non_exhaustive()
    }
}

fn poisoned(what: &str) -> FlightError {
    FlightError::Other(anyhow!("{what} lock poisoned"))
}

impl Entity {
    /// Wrap `state` under `name`; the updater sleeps `tick` between steps.
    pub fn new(name: impl Into<String>, state: EntityState, tick: Duration) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(state)),
            mover: Mutex::new(None),
            tick,
        }
    }

    /// Unique entity name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lock the state, blocking.
    pub fn lock(&self) -> FlightResult<MutexGuard<'_, EntityState>> {
        self.state.lock().map_err(|_| poisoned("entity state"))
    }

    /// Lock the state, giving up after `timeout`. Poisoned state counts as unavailable.
    pub fn lock_within(&self, timeout: Duration) -> Option<MutexGuard<'_, EntityState>> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.state.try_lock() {
                Ok(guard) => return Some(guard),
                Err(TryLockError::Poisoned(_)) => return None,
                Err(TryLockError::WouldBlock) => {
                    if Instant::now() >= deadline {
                        return None;
                    }
                    thread::yield_now();
                }
            }
        }
    }

    /// Run `f` with the state locked.
    pub fn with_state<T>(&self, f: impl FnOnce(&mut EntityState) -> T) -> FlightResult<T> {
        let mut guard = self.lock()?;
        Ok(f(&mut guard))
    }

    /// Snapshot for listings.
    pub fn info(&self) -> FlightResult<EntityInfo> {
        self.with_state(|s| s.info(&self.name))
    }

    /// `true` while an updater owns the entity.
    pub fn is_running(&self) -> FlightResult<bool> {
        self.with_state(|s| s.running)
    }

    /// Start the updater.
    ///
    /// Fails with `AlreadyRunning` if a live updater exists. An updater that was stopped but has
    /// not exited yet is joined first, so two updaters never advance the same entity. Distance
    /// is kept, so stop followed by go resumes in place.
    pub fn go(&self) -> FlightResult<()> {
        let mut slot = self.mover.lock().map_err(|_| poisoned("entity mover"))?;
        if slot.as_ref().is_some_and(Mover::is_live) {
            return Err(FlightError::already_running(format!(
                "entity '{}' already has a live updater",
                self.name
            )));
        }
        if let Some(old) = slot.take() {
            old.cancel.store(true, Ordering::Release);
            if old.handle.join().is_err() {
                tracing::warn!(entity = %self.name, "previous updater panicked");
            }
        }

        self.with_state(|s| {
            s.running = true;
            s.emitter.disarm();
        })?;

        let cancel = Arc::new(AtomicBool::new(false));
        let spawned = thread::Builder::new()
            .name(format!("mover-{}", self.name))
            .spawn({
                let name = self.name.clone();
                let state = Arc::clone(&self.state);
                let cancel = Arc::clone(&cancel);
                let tick = self.tick;
                move || run_updater(&name, &state, &cancel, tick)
            });
        let handle = match spawned {
            Ok(handle) => handle,
            Err(err) => {
                self.with_state(|s| s.running = false)?;
                return Err(FlightError::Other(
                    anyhow::Error::new(err).context(format!("spawn updater for '{}'", self.name)),
                ));
            }
        };
        tracing::debug!(entity = %self.name, "updater started");
        *slot = Some(Mover { cancel, handle });
        Ok(())
    }

    /// Signal the updater to stop and mark the entity not running. Does not wait.
    pub fn stop(&self) -> FlightResult<()> {
        if let Some(mover) = self
            .mover
            .lock()
            .map_err(|_| poisoned("entity mover"))?
            .as_ref()
        {
            mover.cancel.store(true, Ordering::Release);
        }
        self.with_state(|s| {
            s.running = false;
            s.emitter.disarm();
        })
    }

    /// Stop and wait until the updater thread has exited.
    pub fn stop_and_join(&self) -> FlightResult<()> {
        self.stop()?;
        let taken = self
            .mover
            .lock()
            .map_err(|_| poisoned("entity mover"))?
            .take();
        if let Some(mover) = taken
            && mover.handle.join().is_err()
        {
            tracing::warn!(entity = %self.name, "updater panicked");
        }
        Ok(())
    }
}

impl Drop for Entity {
    fn drop(&mut self) {
        let slot = match self.mover.get_mut() {
            Ok(slot) => slot,
            Err(poison) => poison.into_inner(),
        };
        if let Some(mover) = slot.as_ref() {
            mover.cancel.store(true, Ordering::Release);
        }
    }
}

fn run_updater(name: &str, state: &Mutex<EntityState>, cancel: &AtomicBool, tick: Duration) {
    let mut last = Instant::now();
    let outcome = loop {
        thread::sleep(tick);
        match step(state, cancel, &mut last) {
            Ok(true) => {}
            Ok(false) => break Ok(()),
            Err(err) => break Err(err),
        }
    };

    if let Err(err) = outcome {
        tracing::error!(entity = %name, error = %err, "updater halted");
    } else {
        tracing::debug!(entity = %name, "updater stopped");
    }
    match state.lock() {
        Ok(mut s) => s.running = false,
        Err(poison) => poison.into_inner().running = false,
    }
}

/// One integration step; `Ok(false)` once cancelled. The flag is read under the state lock so
/// no step lands after `stop` has returned.
fn step(state: &Mutex<EntityState>, cancel: &AtomicBool, last: &mut Instant) -> FlightResult<bool> {
    let mut s = state.lock().map_err(|_| poisoned("entity state"))?;
    if cancel.load(Ordering::Acquire) {
        return Ok(false);
    }
    let now = Instant::now();
    let dt = now.duration_since(*last).as_secs_f64();
    *last = now;
    let distance = s.motion.advance(dt)?;
    s.trail.push(distance);
    Ok(true)
}

#[cfg(test)]
#[path = "../../tests/unit/motion/entity.rs"]
mod tests;
