//! Lepton epoch: leptons and photons streaming past forming trios.
//!
//! Leptons and photons fly straight and are re-seeded inside the bounding
//! cube once they leave the sphere of `radius`. Trios appear at random with
//! a per-frame chance until `trio_max` exist, each a small planar ring
//! spinning in place. A lepton passing within `trio_influence` of a trio is
//! bent sideways by `cross(to_trio, heading) * 2.5 * dt`.

use crate::composite::Composite;
use crate::emitter::Emitter;
use crate::error::SimulationError;
use crate::host::{FrameContext, Host, Sprite};
use crate::particle::Mover;
use crate::simulation::{Census, Configurable, Layers, Simulation};
use crate::spawn::SpawnRng;
use glam::Vec3;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LeptonOptions {
    pub lepton_count: usize,
    pub photon_count: usize,
    pub trio_max: usize,
    pub radius: f32,
    pub lepton_speed: f32,
    pub photon_speed: f32,
    pub trio_spin: f32,
    pub trio_radius: f32,
    pub trio_spawn_chance: f32,
    pub trio_influence: f32,
    pub deflection: f32,
}

impl Default for LeptonOptions {
    fn default() -> Self {
        Self {
            lepton_count: 1000,
            photon_count: 200,
            trio_max: 60,
            radius: 8.0,
            lepton_speed: 4.5,
            photon_speed: 12.0,
            trio_spin: 3.5,
            trio_radius: 0.1,
            trio_spawn_chance: 0.08,
            trio_influence: 1.8,
            deflection: 2.5,
        }
    }
}

/// Lateral velocity change for a mover heading along `velocity` near `center`.
///
/// Zero outside `influence`, or when the mover heads straight at the center.
pub fn lateral_deflection(
    position: Vec3,
    velocity: Vec3,
    center: Vec3,
    influence: f32,
    strength: f32,
    dt: f32,
) -> Vec3 {
    let to_center = center - position;
    if to_center.length_squared() >= influence * influence {
        return Vec3::ZERO;
    }
    let heading = velocity.normalize_or_zero();
    to_center.cross(heading).normalize_or_zero() * (strength * dt)
}

pub struct Lepton {
    options: LeptonOptions,
    rng: SpawnRng,
    layers: Layers,
    colors: (Vec3, Vec3),
    trio_spawner: Emitter,
    leptons: Vec<Mover>,
    photons: Vec<Mover>,
    trios: Vec<Composite<3>>,
}

impl Configurable for Lepton {
    type Options = LeptonOptions;

    fn with_options(options: LeptonOptions) -> Self {
        Self {
            trio_spawner: Emitter::chance(options.trio_spawn_chance),
            options,
            rng: SpawnRng::from_entropy(),
            layers: Layers::default(),
            colors: (Vec3::ZERO, Vec3::ONE),
            leptons: Vec::new(),
            photons: Vec::new(),
            trios: Vec::new(),
        }
    }
}

impl Lepton {
    pub fn trio_count(&self) -> usize {
        self.trios.len()
    }

    /// Add a trio ring centered at `center`.
    pub fn spawn_trio_at(&mut self, center: Vec3) -> bool {
        if self.trios.len() >= self.options.trio_max {
            return false;
        }
        self.trios.push(Composite::new(
            center,
            Vec3::Z,
            self.options.trio_radius,
            self.options.trio_spin,
            0.0,
        ));
        true
    }
}

impl Simulation for Lepton {
    fn name(&self) -> &'static str {
        "lepton"
    }

    fn initialize(&mut self, host: &mut Host) -> Result<(), SimulationError> {
        self.teardown(host);
        let o = &self.options;
        let palette = host.palette();
        self.colors = (palette.primary, palette.secondary);
        let rng = &mut self.rng;
        self.leptons = (0..o.lepton_count)
            .map(|_| Mover::new(rng.in_cube(o.radius), rng.direction() * o.lepton_speed))
            .collect();
        self.photons = (0..o.photon_count)
            .map(|_| Mover::new(rng.in_cube(o.radius), rng.direction() * o.photon_speed))
            .collect();
        self.trio_spawner = Emitter::chance(o.trio_spawn_chance);
        self.layers.attach(host, "leptons", o.lepton_count);
        self.layers.attach(host, "photons", o.photon_count);
        // Trios are created on the fly.
        self.layers.attach(host, "trios", 0);
        Ok(())
    }

    fn advance(&mut self, ctx: &FrameContext) {
        if !self.layers.is_active() {
            return;
        }
        let dt = ctx.dt;
        let o = &self.options;

        for trio in &mut self.trios {
            trio.advance_phase(dt, 1.0);
        }

        let rng = &mut self.rng;
        for lepton in &mut self.leptons {
            lepton.advance(dt);
            if lepton.outside_radius(o.radius) {
                lepton.position = rng.in_cube(o.radius);
            }
            for trio in &self.trios {
                lepton.velocity += lateral_deflection(
                    lepton.position,
                    lepton.velocity,
                    trio.center,
                    o.trio_influence,
                    o.deflection,
                    dt,
                );
            }
        }
        for photon in &mut self.photons {
            photon.advance(dt);
            if photon.outside_radius(o.radius) {
                photon.position = rng.in_cube(o.radius);
            }
        }

        if self.trio_spawner.due(dt, &mut self.rng) > 0 {
            let center = self.rng.in_cube(o.radius * 0.8);
            self.spawn_trio_at(center);
        }
    }

    fn teardown(&mut self, host: &mut Host) {
        self.layers.detach_all(host);
        self.leptons.clear();
        self.photons.clear();
        self.trios.clear();
    }

    fn visit_sprites(&self, f: &mut dyn FnMut(&Sprite)) {
        let (trio_color, lepton_color) = self.colors;
        for lepton in &self.leptons {
            f(&Sprite::new(lepton.position, lepton_color, 0.06).with_opacity(0.8));
        }
        for photon in &self.photons {
            f(&Sprite::new(photon.position, Vec3::ONE, 0.05));
        }
        for trio in &self.trios {
            for p in trio.member_positions(trio.inner_radius) {
                f(&Sprite::new(p, trio_color, 0.08).with_opacity(0.95));
            }
        }
    }

    fn census(&self) -> Census {
        Census::new()
            .with("leptons", self.leptons.len())
            .with("photons", self.photons.len())
            .with("trios", self.trios.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trio_cap() {
        let mut host = Host::new();
        let mut sim = Lepton::with_options(LeptonOptions {
            lepton_count: 10,
            photon_count: 10,
            trio_max: 4,
            trio_spawn_chance: 1.0,
            ..Default::default()
        });
        sim.initialize(&mut host).unwrap();
        for _ in 0..20 {
            sim.advance(&FrameContext::new(0.016, 0.0));
        }
        assert_eq!(sim.trio_count(), 4);
        assert_eq!(sim.sprite_count(), 10 + 10 + 12);
    }

    #[test]
    fn test_movers_respawn_inside_cube() {
        let mut host = Host::new();
        let mut sim = Lepton::with_options(LeptonOptions {
            lepton_count: 100,
            photon_count: 100,
            trio_spawn_chance: 0.0,
            ..Default::default()
        });
        sim.initialize(&mut host).unwrap();
        for _ in 0..200 {
            sim.advance(&FrameContext::new(1.0 / 30.0, 0.0));
            for m in sim.leptons.iter().chain(&sim.photons) {
                assert!(m.position.abs().max_element() <= 8.0 + 1e-4);
            }
        }
    }

    #[test]
    fn test_deflection_is_lateral() {
        let push = lateral_deflection(Vec3::ZERO, Vec3::X, Vec3::new(0.0, 1.0, 0.0), 1.8, 2.5, 0.1);
        assert!(push.dot(Vec3::X).abs() < 1e-6);
        assert!((push.length() - 0.25).abs() < 1e-5);
        let none = lateral_deflection(Vec3::ZERO, Vec3::X, Vec3::new(0.0, 5.0, 0.0), 1.8, 2.5, 0.1);
        assert_eq!(none, Vec3::ZERO);
    }

    #[test]
    fn test_trio_members_keep_spacing() {
        let mut host = Host::new();
        let mut sim = Lepton::with_options(LeptonOptions {
            lepton_count: 0,
            photon_count: 0,
            trio_spawn_chance: 0.0,
            ..Default::default()
        });
        sim.initialize(&mut host).unwrap();
        sim.spawn_trio_at(Vec3::ONE);
        for _ in 0..37 {
            sim.advance(&FrameContext::new(0.013, 0.0));
        }
        let [a, b, c] = sim.trios[0].member_positions(0.1);
        let side = 0.1 * 3f32.sqrt();
        for d in [a.distance(b), b.distance(c), c.distance(a)] {
            assert!((d - side).abs() < 1e-4);
        }
    }
}
