use std::collections::VecDeque;

/// Bounded ring of recent distance samples.
///
/// The updater pushes one sample per iteration; the compositor drains it once per tick. The
/// newest sample is kept back on drain so the next tick's trail starts where this one ended.
#[derive(Clone, Debug)]
pub struct TrailBuffer {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl TrailBuffer {
    /// Ring holding at most `capacity` samples (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, dropping the oldest when full.
    pub fn push(&mut self, distance: f64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(distance);
    }

    /// Take every sample except the newest, oldest first.
    pub fn drain_keep_last(&mut self) -> Vec<f64> {
        let keep = self.samples.len().saturating_sub(1);
        self.samples.drain(..keep).collect()
    }

    /// Forget all samples.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Number of buffered samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// `true` when no sample is buffered.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/motion/trail.rs"]
mod tests;
