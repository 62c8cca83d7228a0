//! Electroweak epoch: counter-rotating pairs that annihilate on contact.
//!
//! Pairs are spawned on a random orbit axis, with one member in each palette
//! color starting half a turn apart. Member angles move in opposite
//! directions, and each member's planar position is rotated about the axis
//! by its own angle. The first time the two come within
//! `collision_distance` the pair fires a white beam burst at member A and is
//! queued for removal at the end of the frame.

use crate::burst::{BurstSpawner, CollisionLatch, PendingRemoval};
use crate::emitter::Emitter;
use crate::error::SimulationError;
use crate::host::{FrameContext, Host, Sprite};
use crate::lifecycle::Lifecycle;
use crate::particle::Mover;
use crate::simulation::{Census, Configurable, Layers, Simulation};
use crate::spawn::SpawnRng;
use glam::{Quat, Vec3};
use serde::Deserialize;
use std::f32::consts::PI;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ElectroweakOptions {
    pub max_pairs: usize,
    /// Chance per frame of spawning one pair.
    pub spawn_rate: f32,
    pub radius_min: f32,
    pub radius_max: f32,
    pub speed_min: f32,
    pub speed_max: f32,
    pub collision_distance: f32,
    pub beam_count: usize,
    pub sprite_scale: f32,
    pub beam_scale: f32,
}

impl Default for ElectroweakOptions {
    fn default() -> Self {
        Self {
            max_pairs: 10_000,
            spawn_rate: 0.5,
            radius_min: 0.6,
            radius_max: 5.8,
            speed_min: 0.4,
            speed_max: 1.2,
            collision_distance: 0.18,
            beam_count: 12,
            sprite_scale: 0.07,
            beam_scale: 0.05,
        }
    }
}

/// Two members sharing one orbit.
#[derive(Debug, Clone)]
pub struct Pair {
    pub axis: Vec3,
    pub radius: f32,
    pub speed: f32,
    pub angle_a: f32,
    pub angle_b: f32,
    pub latch: CollisionLatch,
}

impl Pair {
    fn member(&self, angle: f32) -> Vec3 {
        let planar = Vec3::new(angle.cos() * self.radius, 0.0, angle.sin() * self.radius);
        Quat::from_axis_angle(self.axis, angle) * planar
    }

    pub fn position_a(&self) -> Vec3 {
        self.member(self.angle_a)
    }

    pub fn position_b(&self) -> Vec3 {
        self.member(self.angle_b)
    }

    pub fn separation(&self) -> f32 {
        self.position_a().distance(self.position_b())
    }
}

pub struct Electroweak {
    options: ElectroweakOptions,
    rng: SpawnRng,
    layers: Layers,
    colors: (Vec3, Vec3),
    spawner: Emitter,
    burst: BurstSpawner,
    pairs: Vec<Pair>,
    beams: Vec<Mover>,
    removals: PendingRemoval<usize>,
}

impl Configurable for Electroweak {
    type Options = ElectroweakOptions;

    fn with_options(options: ElectroweakOptions) -> Self {
        let burst = BurstSpawner::new(options.beam_count)
            .spread(1.5)
            .speed(10.0)
            .lifecycle(Lifecycle::beam());
        Self {
            spawner: Emitter::chance(options.spawn_rate),
            burst,
            options,
            rng: SpawnRng::from_entropy(),
            layers: Layers::default(),
            colors: (Vec3::ZERO, Vec3::ONE),
            pairs: Vec::new(),
            beams: Vec::new(),
            removals: PendingRemoval::new(),
        }
    }
}

impl Electroweak {
    fn spawn_pair(&mut self) {
        let o = &self.options;
        let rng = &mut self.rng;
        let radius = rng.range(o.radius_min, o.radius_max);
        let speed = rng.range(o.speed_min, o.speed_max);
        let angle = rng.angle();
        let axis = rng.direction();
        self.pairs.push(Pair {
            axis,
            radius,
            speed,
            angle_a: angle,
            angle_b: angle + PI,
            latch: CollisionLatch::new(),
        });
    }

    /// Add a pair directly, bypassing the spawn schedule.
    pub fn push_pair(&mut self, pair: Pair) {
        self.pairs.push(pair);
    }

    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    pub fn beam_count(&self) -> usize {
        self.beams.len()
    }
}

impl Simulation for Electroweak {
    fn name(&self) -> &'static str {
        "electroweak"
    }

    fn initialize(&mut self, host: &mut Host) -> Result<(), SimulationError> {
        self.teardown(host);
        let palette = host.palette();
        self.colors = (palette.primary, palette.secondary);
        self.spawner = Emitter::chance(self.options.spawn_rate);
        // Both layers grow on demand.
        self.layers.attach(host, "pairs", 0);
        self.layers.attach(host, "beams", 0);
        Ok(())
    }

    fn advance(&mut self, ctx: &FrameContext) {
        if !self.layers.is_active() {
            return;
        }
        let dt = ctx.dt;
        if self.pairs.len() < self.options.max_pairs && self.spawner.due(dt, &mut self.rng) > 0 {
            self.spawn_pair();
        }

        let threshold = self.options.collision_distance;
        for (index, pair) in self.pairs.iter_mut().enumerate() {
            pair.angle_a += pair.speed * dt;
            pair.angle_b -= pair.speed * dt;
            let separation = pair.separation();
            if pair.latch.check(separation, threshold) {
                self.beams
                    .extend(self.burst.spawn(pair.position_a(), &mut self.rng));
                self.removals.schedule(index);
            }
        }
        for index in self.removals.drain_sorted_desc() {
            self.pairs.swap_remove(index);
        }

        for beam in &mut self.beams {
            beam.advance(dt);
        }
        self.beams.retain(|b| b.alive);
    }

    fn teardown(&mut self, host: &mut Host) {
        self.layers.detach_all(host);
        self.pairs.clear();
        self.beams.clear();
        self.removals.clear();
    }

    fn visit_sprites(&self, f: &mut dyn FnMut(&Sprite)) {
        let o = &self.options;
        let (a, b) = self.colors;
        for pair in &self.pairs {
            f(&Sprite::new(pair.position_a(), a, o.sprite_scale));
            f(&Sprite::new(pair.position_b(), b, o.sprite_scale));
        }
        for beam in &self.beams {
            f(&Sprite::new(beam.position, Vec3::ONE, o.beam_scale)
                .with_opacity(self.burst.opacity(beam.life_or_one())));
        }
    }

    fn census(&self) -> Census {
        Census::new()
            .with("pairs", self.pairs.len())
            .with("beams", self.beams.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet() -> Electroweak {
        Electroweak::with_options(ElectroweakOptions {
            spawn_rate: 0.0,
            ..Default::default()
        })
    }

    fn touching_pair() -> Pair {
        Pair {
            axis: Vec3::Y,
            radius: 2.0,
            speed: 0.0,
            angle_a: 1.0,
            angle_b: 1.0 + 0.01,
            latch: CollisionLatch::new(),
        }
    }

    #[test]
    fn test_collision_fires_once() {
        let mut host = Host::new();
        let mut sim = quiet();
        sim.initialize(&mut host).unwrap();
        sim.push_pair(touching_pair());
        for i in 0..5 {
            sim.advance(&FrameContext::new(1.0 / 60.0, i as f32 / 60.0));
        }
        assert_eq!(sim.pairs().len(), 0);
        assert_eq!(sim.beam_count(), 12);
    }

    #[test]
    fn test_beams_expire() {
        let mut host = Host::new();
        let mut sim = quiet();
        sim.initialize(&mut host).unwrap();
        sim.push_pair(touching_pair());
        sim.advance(&FrameContext::new(0.01, 0.0));
        assert_eq!(sim.beam_count(), 12);
        for _ in 0..10 {
            sim.advance(&FrameContext::new(0.1, 0.0));
        }
        assert_eq!(sim.beam_count(), 0);
    }

    #[test]
    fn test_members_counter_rotate() {
        let mut host = Host::new();
        let mut sim = quiet();
        sim.initialize(&mut host).unwrap();
        sim.push_pair(Pair {
            axis: Vec3::X,
            speed: 1.0,
            angle_a: 0.0,
            angle_b: PI,
            ..touching_pair()
        });
        sim.advance(&FrameContext::new(0.1, 0.0));
        let pair = &sim.pairs()[0];
        assert!((pair.angle_a - 0.1).abs() < 1e-6);
        assert!((pair.angle_b - (PI - 0.1)).abs() < 1e-6);
        assert!((pair.position_a().length() - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_spawn_respects_cap() {
        let mut host = Host::new();
        let mut sim = Electroweak::with_options(ElectroweakOptions {
            spawn_rate: 1.0,
            max_pairs: 3,
            collision_distance: 0.0,
            ..Default::default()
        });
        sim.initialize(&mut host).unwrap();
        for _ in 0..10 {
            sim.advance(&FrameContext::new(0.001, 0.0));
        }
        assert_eq!(sim.pairs().len(), 3);
        assert_eq!(sim.sprite_count(), 6);
    }
}
