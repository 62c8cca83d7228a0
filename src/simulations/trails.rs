//! Inbound photon streams that leave fading trails.
//!
//! Photons are launched from a sphere toward the center with a random
//! lateral lean, drop a trail sprite at their position every frame, and are
//! removed once they cross the die radius. Trails live in a cyclic pool, so
//! a busy stream recycles its oldest trail instead of dropping new ones.

use crate::emitter::Emitter;
use crate::host::Sprite;
use crate::lifecycle::Lifecycle;
use crate::particle::Mover;
use crate::pool::{ClaimMode, Pool};
use crate::spawn::SpawnRng;
use glam::Vec3;
use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct TrailPool {
    pool: Pool<Vec3>,
    lifecycle: Lifecycle,
    scale: f32,
}

impl TrailPool {
    pub fn new(capacity: usize, fade: f32, scale: f32) -> Self {
        Self {
            pool: Pool::new(capacity, ClaimMode::Cyclic, |_| Vec3::ZERO),
            lifecycle: Lifecycle::trail(fade),
            scale,
        }
    }

    pub fn drop_at(&mut self, position: Vec3) {
        let life = self.lifecycle.max_lifetime();
        if let Some((_, slot)) = self.pool.claim(life) {
            slot.item = position;
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

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StreamOptions {
    /// Seconds between launches.
    pub interval: f32,
    pub speed: f32,
    pub spawn_radius: f32,
    pub die_radius: f32,
    /// Weight of the random lean added to the inbound heading.
    pub lateral_min: f32,
    pub lateral_max: f32,
    pub scale: f32,
    pub trail_capacity: usize,
    pub trail_fade: f32,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            interval: 0.004,
            speed: 12.0,
            spawn_radius: 6.5,
            die_radius: 10.5,
            lateral_min: 0.45,
            lateral_max: 0.95,
            scale: 0.04,
            trail_capacity: 600,
            trail_fade: 0.1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PhotonStream {
    options: StreamOptions,
    emitter: Emitter,
    photons: Vec<Mover>,
    trails: TrailPool,
}

impl PhotonStream {
    pub fn new(options: StreamOptions) -> Self {
        Self {
            emitter: Emitter::interval(options.interval),
            trails: TrailPool::new(options.trail_capacity, options.trail_fade, options.scale),
            photons: Vec::new(),
            options,
        }
    }

    /// Launch one photon from the spawn sphere.
    pub fn launch(&mut self, rng: &mut SpawnRng) {
        let o = &self.options;
        let start = rng.direction() * o.spawn_radius;
        let lean = rng.direction() * rng.range(o.lateral_min, o.lateral_max);
        let heading = (-start.normalize_or_zero() + lean).normalize_or_zero();
        self.photons.push(Mover::new(start, heading * o.speed));
    }

    /// Emit due photons, move them, then fade trails.
    ///
    /// `deflect` sees every photon after it moves.
    pub fn advance(
        &mut self,
        dt: f32,
        rng: &mut SpawnRng,
        mut deflect: impl FnMut(&mut Mover, &mut SpawnRng),
    ) {
        for _ in 0..self.emitter.due(dt, rng) {
            self.launch(rng);
        }
        for photon in &mut self.photons {
            self.trails.drop_at(photon.position);
            photon.advance(dt);
            deflect(photon, rng);
        }
        let die = self.options.die_radius;
        self.photons.retain(|p| !p.outside_radius(die));
        self.trails.tick(dt);
    }

    pub fn photons(&self) -> &[Mover] {
        &self.photons
    }

    pub fn trails(&self) -> &TrailPool {
        &self.trails
    }

    pub fn speed(&self) -> f32 {
        self.options.speed
    }

    pub fn clear(&mut self) {
        self.photons.clear();
        self.emitter.reset();
        self.trails = TrailPool::new(
            self.options.trail_capacity,
            self.options.trail_fade,
            self.options.scale,
        );
    }

    pub fn sprites(&self, f: &mut dyn FnMut(&Sprite)) {
        for photon in &self.photons {
            f(&Sprite::new(photon.position, Vec3::ONE, self.options.scale));
        }
        self.trails.live().for_each(|s| f(&s));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trails_recycle_when_full() {
        let mut trails = TrailPool::new(3, 0.1, 0.04);
        for i in 0..5 {
            trails.drop_at(Vec3::splat(i as f32));
        }
        assert_eq!(trails.live_count(), 3);
        trails.tick(0.05);
        let opacity = trails.live().next().unwrap().opacity;
        assert!((opacity - 0.5).abs() < 1e-5);
        trails.tick(0.06);
        assert_eq!(trails.live_count(), 0);
    }

    #[test]
    fn test_stream_launch_rate() {
        let mut rng = SpawnRng::seeded(3);
        let mut stream = PhotonStream::new(StreamOptions {
            interval: 0.01,
            ..Default::default()
        });
        stream.advance(0.055, &mut rng, |_, _| {});
        assert_eq!(stream.photons().len(), 5);
        assert_eq!(stream.trails().live_count(), 5);
    }

    #[test]
    fn test_photons_head_inward_and_leave() {
        let mut rng = SpawnRng::seeded(11);
        let mut stream = PhotonStream::new(StreamOptions::default());
        for _ in 0..20 {
            stream.launch(&mut rng);
        }
        for p in stream.photons() {
            assert!(p.velocity.dot(p.position) < 0.0);
            assert!((p.velocity.length() - 12.0).abs() < 1e-3);
        }
        let mut idle = PhotonStream::new(StreamOptions {
            interval: 0.0,
            ..Default::default()
        });
        idle.launch(&mut rng);
        for _ in 0..200 {
            idle.advance(1.0 / 60.0, &mut rng, |_, _| {});
        }
        assert!(idle.photons().is_empty());
        assert!(idle.trails().live_count() <= idle.trails().capacity());
    }
}
