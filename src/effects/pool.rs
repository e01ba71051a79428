use crate::effects::bomb::Bomb;

/// Live bombs from every entity.
///
/// Owned by the render thread: bombs are added and pruned only during a render tick.
#[derive(Clone, Debug, Default)]
pub struct EffectPool {
    bombs: Vec<Bomb>,
}

impl EffectPool {
    /// Empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a freshly spawned bomb.
    pub fn add(&mut self, bomb: Bomb) {
        self.bombs.push(bomb);
    }

    /// Drop every bomb expired at `now`; returns how many remain.
    pub fn prune(&mut self, now: f64) -> usize {
        self.bombs.retain(|b| !b.is_expired(now));
        self.bombs.len()
    }

    /// Live bombs in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &Bomb> {
        self.bombs.iter()
    }

    /// Number of live bombs.
    pub fn len(&self) -> usize {
        self.bombs.len()
    }

    /// `true` when no bomb is live.
    pub fn is_empty(&self) -> bool {
        self.bombs.is_empty()
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.bombs.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/pool.rs"]
mod tests;
