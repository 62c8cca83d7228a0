//! Galaxy formation: a flat disk of planar orbiters.

use crate::error::SimulationError;
use crate::host::{FrameContext, Host, Sprite};
use crate::particle::PolarOrbit;
use crate::simulation::{Census, Configurable, Layers, Simulation};
use crate::spawn::SpawnRng;
use glam::Vec3;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GalaxyOptions {
    pub count: usize,
    pub radius_min: f32,
    pub radius_max: f32,
    pub speed_min: f32,
    pub speed_max: f32,
    /// Full height of the per-frame vertical jitter.
    pub jitter: f32,
    /// Sprite scale at a full color mix.
    pub max_scale: f32,
}

impl Default for GalaxyOptions {
    fn default() -> Self {
        Self {
            count: 7000,
            radius_min: 0.5,
            radius_max: 20.5,
            speed_min: 0.3,
            speed_max: 0.7,
            jitter: 0.1,
            max_scale: 0.5,
        }
    }
}

#[derive(Debug, Clone)]
struct Star {
    orbit: PolarOrbit,
    color: Vec3,
    scale: f32,
}

pub struct GalaxyDisk {
    options: GalaxyOptions,
    rng: SpawnRng,
    layers: Layers,
    stars: Vec<Star>,
}

impl Configurable for GalaxyDisk {
    type Options = GalaxyOptions;

    fn with_options(options: GalaxyOptions) -> Self {
        Self {
            options,
            rng: SpawnRng::from_entropy(),
            layers: Layers::default(),
            stars: Vec::new(),
        }
    }
}

impl Simulation for GalaxyDisk {
    fn name(&self) -> &'static str {
        "galaxy"
    }

    fn initialize(&mut self, host: &mut Host) -> Result<(), SimulationError> {
        self.teardown(host);
        let o = &self.options;
        if o.radius_max < o.radius_min {
            return Err(SimulationError::init("galaxy", "radius_max below radius_min"));
        }
        let palette = host.palette();
        let rng = &mut self.rng;
        self.stars = (0..o.count)
            .map(|_| {
                // Color mix and size share one draw, so bright stars are big.
                let mix = rng.unit();
                let orbit = PolarOrbit::new(
                    rng.range(o.radius_min, o.radius_max),
                    rng.angle(),
                    rng.range(o.speed_min, o.speed_max),
                );
                Star {
                    orbit,
                    color: palette.primary.lerp(palette.secondary, mix),
                    scale: o.max_scale * mix,
                }
            })
            .collect();
        self.layers.attach(host, "galaxy-disk", o.count);
        Ok(())
    }

    fn advance(&mut self, ctx: &FrameContext) {
        if !self.layers.is_active() {
            return;
        }
        let half = self.options.jitter * 0.5;
        for star in &mut self.stars {
            star.orbit.advance(ctx.dt);
            star.orbit.y = self.rng.signed(half);
        }
    }

    fn teardown(&mut self, host: &mut Host) {
        self.layers.detach_all(host);
        self.stars.clear();
    }

    fn visit_sprites(&self, f: &mut dyn FnMut(&Sprite)) {
        for star in &self.stars {
            f(&Sprite::new(star.orbit.position(), star.color, star.scale));
        }
    }

    fn census(&self) -> Census {
        Census::new().with("stars", self.stars.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> GalaxyDisk {
        GalaxyDisk::with_options(GalaxyOptions {
            count: 200,
            ..Default::default()
        })
    }

    #[test]
    fn test_disk_stays_flat() {
        let mut host = Host::new();
        let mut sim = small();
        sim.initialize(&mut host).unwrap();
        for i in 0..10 {
            sim.advance(&FrameContext::new(1.0 / 60.0, i as f32 / 60.0));
        }
        sim.visit_sprites(&mut |s| {
            assert!(s.position.y.abs() <= 0.05 + 1e-6);
            let r = Vec3::new(s.position.x, 0.0, s.position.z).length();
            assert!((0.5 - 1e-4..=20.5 + 1e-4).contains(&r));
        });
        assert_eq!(sim.sprite_count(), 200);
    }

    #[test]
    fn test_orbit_angle_advances() {
        let mut host = Host::new();
        let mut sim = small();
        sim.initialize(&mut host).unwrap();
        let before: Vec<f32> = sim.stars.iter().map(|s| s.orbit.angle).collect();
        sim.advance(&FrameContext::new(1.0, 0.0));
        for (star, a0) in sim.stars.iter().zip(before) {
            let da = star.orbit.angle - a0;
            assert!((0.3 - 1e-5..=0.7 + 1e-5).contains(&da));
        }
    }

    #[test]
    fn test_inverted_radius_fails_clean() {
        let mut host = Host::new();
        let mut sim = GalaxyDisk::with_options(GalaxyOptions {
            radius_min: 5.0,
            radius_max: 1.0,
            ..Default::default()
        });
        assert!(sim.initialize(&mut host).is_err());
        assert_eq!(host.layer_count(), 0);
    }
}
