//! Bipolar jet pool shared by the compact-object eras.
//!
//! Every slot is pre-allocated. A dead slot relights with a fixed chance per
//! frame, firing up or down the Y axis from a small disc at the origin. Live
//! slots travel at `velocity * speed_scale` and die when their life runs out
//! or they leave the `|y| <= height` column.

use crate::host::Sprite;
use crate::lifecycle::Lifecycle;
use crate::particle::Mover;
use crate::pool::{ClaimMode, Pool};
use crate::spawn::SpawnRng;
use crate::visuals::hex;
use glam::Vec3;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JetOptions {
    pub capacity: usize,
    /// Per-frame chance that a dead slot relights.
    pub respawn_chance: f32,
    pub speed_scale: f32,
    pub life_min: f32,
    pub life_max: f32,
    pub height: f32,
    pub scale: f32,
}

impl Default for JetOptions {
    fn default() -> Self {
        Self {
            capacity: 600,
            respawn_chance: 0.1,
            speed_scale: 8.0,
            life_min: 1.0,
            life_max: 2.3,
            height: 6.0,
            scale: 0.05,
        }
    }
}

#[derive(Debug, Clone)]
pub struct JetParticle {
    pub mover: Mover,
    pub color: Vec3,
}

#[derive(Debug, Clone)]
pub struct BipolarJets {
    options: JetOptions,
    lifecycle: Lifecycle,
    pool: Pool<JetParticle>,
}

impl BipolarJets {
    /// Allocate every slot dead, colored between white and deep blue.
    pub fn new(options: JetOptions, rng: &mut SpawnRng) -> Self {
        let (white, blue) = (hex(0xffffff), hex(0x1800ad));
        let pool = Pool::new(options.capacity, ClaimMode::FirstFree, |_| JetParticle {
            mover: Mover::new(Vec3::ZERO, Vec3::ZERO),
            color: white.lerp(blue, rng.unit()),
        });
        Self {
            lifecycle: Lifecycle::jet().lifetime_range(options.life_min..options.life_max),
            options,
            pool,
        }
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    pub fn live_count(&self) -> usize {
        self.pool.live_count()
    }

    pub fn advance(&mut self, dt: f32, rng: &mut SpawnRng) {
        let o = &self.options;
        for slot in self.pool.iter_mut() {
            if !slot.live {
                if rng.chance(o.respawn_chance) {
                    let up = if rng.chance(0.5) { 1.0 } else { -1.0 };
                    slot.item.mover = Mover::new(
                        Vec3::new(rng.signed(0.05), 0.0, rng.signed(0.05)),
                        Vec3::new(rng.signed(0.01), up * rng.range(0.5, 1.7), rng.signed(0.01)),
                    );
                    slot.life = self.lifecycle.spawn_life(rng);
                    slot.live = true;
                }
                continue;
            }
            slot.item.mover.position += slot.item.mover.velocity * (dt * o.speed_scale);
            slot.life -= dt;
            if slot.life <= 0.0 || slot.item.mover.position.y.abs() > o.height {
                slot.live = false;
            }
        }
    }

    /// Sprites for the live jets, fading over their lifetime.
    pub fn live(&self) -> impl Iterator<Item = Sprite> + '_ {
        self.pool.iter_live().map(move |s| {
            Sprite::new(s.item.mover.position, s.item.color, self.options.scale)
                .with_opacity(self.lifecycle.opacity(s.life))
        })
    }

    pub fn clear(&mut self) {
        self.pool.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jets_stay_in_column() {
        let mut rng = SpawnRng::seeded(11);
        let mut jets = BipolarJets::new(JetOptions::default(), &mut rng);
        assert_eq!(jets.live_count(), 0);
        for _ in 0..600 {
            jets.advance(1.0 / 60.0, &mut rng);
            assert!(jets.live_count() <= 600);
            for s in jets.live() {
                assert!(s.position.y.abs() <= 6.0);
                assert!((0.0..=1.0).contains(&s.opacity));
            }
        }
        assert!(jets.live_count() > 0);
    }

    #[test]
    fn test_zero_chance_never_lights() {
        let mut rng = SpawnRng::seeded(11);
        let mut jets = BipolarJets::new(
            JetOptions {
                respawn_chance: 0.0,
                ..Default::default()
            },
            &mut rng,
        );
        for _ in 0..100 {
            jets.advance(0.016, &mut rng);
        }
        assert_eq!(jets.live_count(), 0);
    }
}
