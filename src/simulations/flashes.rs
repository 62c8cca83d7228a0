//! Fixed pool of brief white flashes.
//!
//! Used by the shell eras: any sprite may light a flash at its position with
//! a small per-frame chance. A full pool drops the request.

use crate::host::Sprite;
use crate::lifecycle::Lifecycle;
use crate::pool::{ClaimMode, Pool};
use glam::Vec3;

#[derive(Debug, Clone)]
pub struct FlashPool {
    pool: Pool<Vec3>,
    lifecycle: Lifecycle,
    scale: f32,
}

impl FlashPool {
    pub fn new(capacity: usize, lifecycle: Lifecycle, scale: f32) -> Self {
        Self {
            pool: Pool::new(capacity, ClaimMode::FirstFree, |_| Vec3::ZERO),
            lifecycle,
            scale,
        }
    }

    /// Light a flash at `position`. Returns `false` when the pool is full.
    pub fn spawn(&mut self, position: Vec3) -> bool {
        let life = self.lifecycle.max_lifetime();
        match self.pool.claim(life) {
            Some((_, slot)) => {
                slot.item = position;
                true
            }
            None => false,
        }
    }

    pub fn tick(&mut self, dt: f32) {
        self.pool.tick(dt);
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    pub fn live_count(&self) -> usize {
        self.pool.live_count()
    }

    pub fn live(&self) -> impl Iterator<Item = Sprite> + '_ {
        self.pool.iter_live().map(move |s| {
            Sprite::new(s.item, Vec3::ONE, self.scale).with_opacity(self.lifecycle.opacity(s.life))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_pool_drops() {
        let mut flashes = FlashPool::new(2, Lifecycle::flash(0.15, 6.0), 0.08);
        assert!(flashes.spawn(Vec3::X));
        assert!(flashes.spawn(Vec3::Y));
        assert!(!flashes.spawn(Vec3::Z));
        assert_eq!(flashes.live_count(), 2);
    }

    #[test]
    fn test_flash_fades_then_frees() {
        let mut flashes = FlashPool::new(1, Lifecycle::flash(0.15, 6.0), 0.08);
        flashes.spawn(Vec3::ONE);
        let first = flashes.live().next().unwrap().opacity;
        assert!((first - 0.9).abs() < 1e-5);
        flashes.tick(0.1);
        let later = flashes.live().next().unwrap().opacity;
        assert!(later < first);
        flashes.tick(0.1);
        assert_eq!(flashes.live_count(), 0);
        assert!(flashes.spawn(Vec3::ZERO));
    }
}
