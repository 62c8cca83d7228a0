//! Collision-triggered bursts.
//!
//! Several simulations watch two moving entities and, the first time they
//! come within a threshold, hide both and release a burst of short-lived
//! secondary particles.
//!
//! - [`CollisionLatch`] fires at most once per pair, however many frames the
//!   pair stays in contact.
//! - [`BurstSpawner`] produces the secondary particles.
//! - [`PendingRemoval`] defers removing dead entities to a fixed point at the
//!   end of the frame, so the live collection is never mutated while it is
//!   being iterated.
//!
//! ```ignore
//! if pair.latch.check(a.distance(b), 0.18) {
//!     self.beams.extend(self.burst.spawn(a, &mut self.rng));
//!     self.removals.schedule(pair_index);
//! }
//! // ... after the loop
//! for index in self.removals.drain_sorted_desc() {
//!     self.pairs.swap_remove(index);
//! }
//! ```

use crate::lifecycle::Lifecycle;
use crate::particle::Mover;
use crate::spawn::SpawnRng;
use glam::Vec3;

/// One-shot proximity trigger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionLatch {
    fired: bool,
}

impl CollisionLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` only on the first call where `distance < threshold`.
    pub fn check(&mut self, distance: f32, threshold: f32) -> bool {
        if self.fired || distance >= threshold {
            return false;
        }
        self.fired = true;
        true
    }

    #[inline]
    pub fn has_fired(&self) -> bool {
        self.fired
    }
}

/// Spawns a fixed-size burst of movers from a point.
#[derive(Debug, Clone)]
pub struct BurstSpawner {
    /// Movers per burst.
    pub count: usize,
    /// Each velocity component is uniform in `[-spread/2, spread/2)`.
    pub spread: f32,
    /// Multiplier applied to the drawn velocity.
    pub speed: f32,
    pub lifecycle: Lifecycle,
}

impl BurstSpawner {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            spread: 1.5,
            speed: 1.0,
            lifecycle: Lifecycle::beam(),
        }
    }

    pub fn spread(mut self, spread: f32) -> Self {
        self.spread = spread;
        self
    }

    pub fn speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn lifecycle(mut self, lifecycle: Lifecycle) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    /// Build `count` movers at `origin` with random outward velocity and life.
    pub fn spawn(&self, origin: Vec3, rng: &mut SpawnRng) -> Vec<Mover> {
        (0..self.count)
            .map(|_| {
                let velocity = rng.in_cube(self.spread * 0.5) * self.speed;
                let life = self.lifecycle.spawn_life(rng);
                Mover::new(origin, velocity).with_life(life)
            })
            .collect()
    }

    /// Opacity of a burst particle with `life` seconds left.
    #[inline]
    pub fn opacity(&self, life: f32) -> f32 {
        self.lifecycle.opacity(life)
    }
}

/// Keys queued for removal at the end of the frame.
#[derive(Debug, Clone)]
pub struct PendingRemoval<K> {
    queue: Vec<K>,
}

impl<K> Default for PendingRemoval<K> {
    fn default() -> Self {
        Self { queue: Vec::new() }
    }
}

impl<K> PendingRemoval<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, key: K) {
        self.queue.push(key);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Take every queued key in scheduling order.
    pub fn drain(&mut self) -> std::vec::Drain<'_, K> {
        self.queue.drain(..)
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

impl<K: Ord> PendingRemoval<K> {
    /// Take every queued key, largest first and deduplicated.
    ///
    /// Removing indices in descending order keeps the remaining indices valid
    /// for `Vec::remove` and `Vec::swap_remove`.
    pub fn drain_sorted_desc(&mut self) -> Vec<K> {
        let mut keys: Vec<K> = self.queue.drain(..).collect();
        keys.sort_unstable_by(|a, b| b.cmp(a));
        keys.dedup();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latch_fires_once() {
        let mut latch = CollisionLatch::new();
        let fired = [0.1, 0.05, 0.02, 0.1]
            .iter()
            .filter(|&&d| latch.check(d, 0.18))
            .count();
        assert_eq!(fired, 1);
        assert!(latch.has_fired());
    }

    #[test]
    fn test_latch_ignores_far_pairs() {
        let mut latch = CollisionLatch::new();
        assert!(!latch.check(0.5, 0.18));
        assert!(!latch.has_fired());
    }

    #[test]
    fn test_burst_spawn() {
        let burst = BurstSpawner::new(12).speed(10.0);
        let mut rng = SpawnRng::seeded(9);
        let movers = burst.spawn(Vec3::ONE, &mut rng);
        assert_eq!(movers.len(), 12);
        for m in &movers {
            assert_eq!(m.position, Vec3::ONE);
            assert!(m.velocity.abs().max_element() <= 7.5 + 1e-4);
            let life = m.life.unwrap();
            assert!((0.45..0.70).contains(&life));
        }
    }

    #[test]
    fn test_pending_removal_desc() {
        let mut pending = PendingRemoval::new();
        pending.schedule(2);
        pending.schedule(7);
        pending.schedule(2);
        pending.schedule(4);
        assert_eq!(pending.drain_sorted_desc(), vec![7, 4, 2]);
        assert!(pending.is_empty());
    }
}
