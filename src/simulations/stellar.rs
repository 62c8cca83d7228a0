//! Stellar era: a planetary system around the host star.
//!
//! Three layers: a faint nebula halo on a wide shell, eight cube planets on
//! fixed retrograde orbits, and a thin asteroid belt.

use crate::error::SimulationError;
use crate::host::{FrameContext, Host, Sprite};
use crate::particle::{AxisOrbit, PolarOrbit};
use crate::simulation::{Census, Configurable, Layers, Simulation};
use crate::spawn::SpawnRng;
use crate::visuals::{hex, ParticleShape};
use glam::Vec3;
use serde::Deserialize;

/// One entry of the planet table.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PlanetSpec {
    pub size: f32,
    #[serde(deserialize_with = "crate::visuals::deserialize_hex")]
    pub color: Vec3,
    pub dist: f32,
    /// Angular speed in rad/s; negative orbits clockwise.
    pub speed: f32,
}

fn default_planets() -> Vec<PlanetSpec> {
    [
        (0.04, 0xffffff, 0.7, -1.4),
        (0.08, 0xffde59, 1.0, -1.1),
        (0.09, 0x1800ad, 1.2, -1.0),
        (0.06, 0xff3131, 1.55, -0.85),
        (0.30, 0xff751f, 2.5, -0.6),
        (0.24, 0xffde59, 3.1, -0.45),
        (0.19, 0x1800ad, 3.8, -0.32),
        (0.20, 0x1800ad, 4.6, -0.25),
    ]
    .into_iter()
    .map(|(size, color, dist, speed)| PlanetSpec {
        size,
        color: hex(color),
        dist,
        speed,
    })
    .collect()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StellarOptions {
    pub nebula_count: usize,
    pub nebula_radius_min: f32,
    pub nebula_radius_max: f32,
    pub planets: Vec<PlanetSpec>,
    pub asteroid_count: usize,
    pub belt_radius_min: f32,
    pub belt_radius_max: f32,
}

impl Default for StellarOptions {
    fn default() -> Self {
        Self {
            nebula_count: 100,
            nebula_radius_min: 10.5,
            nebula_radius_max: 14.5,
            planets: default_planets(),
            asteroid_count: 100,
            belt_radius_min: 1.7,
            belt_radius_max: 2.1,
        }
    }
}

#[derive(Debug, Clone)]
struct Wisp {
    orbit: AxisOrbit,
    color: Vec3,
    pulse_offset: f32,
    opacity: f32,
}

#[derive(Debug, Clone)]
struct Planet {
    orbit: PolarOrbit,
    size: f32,
    color: Vec3,
}

pub struct Stellar {
    options: StellarOptions,
    rng: SpawnRng,
    layers: Layers,
    nebula: Vec<Wisp>,
    planets: Vec<Planet>,
    belt: Vec<(PolarOrbit, Vec3)>,
}

impl Configurable for Stellar {
    type Options = StellarOptions;

    fn with_options(options: StellarOptions) -> Self {
        Self {
            options,
            rng: SpawnRng::from_entropy(),
            layers: Layers::default(),
            nebula: Vec::new(),
            planets: Vec::new(),
            belt: Vec::new(),
        }
    }
}

impl Simulation for Stellar {
    fn name(&self) -> &'static str {
        "stellar"
    }

    fn initialize(&mut self, host: &mut Host) -> Result<(), SimulationError> {
        self.teardown(host);
        let o = &self.options;
        let palette = host.palette();
        let white = Vec3::ONE;
        let rng = &mut self.rng;

        self.nebula = (0..o.nebula_count)
            .map(|_| {
                let roll = rng.unit();
                let color = if roll < 0.45 {
                    white.lerp(palette.primary, rng.unit() * 0.4)
                } else if roll < 0.9 {
                    white.lerp(palette.secondary, rng.unit() * 0.3)
                } else {
                    white
                };
                let base = rng.point_on_radius(o.nebula_radius_min, o.nebula_radius_max);
                let axis = rng.direction();
                Wisp {
                    orbit: AxisOrbit::new(base, axis, rng.range(0.04, 0.12)),
                    color,
                    pulse_offset: rng.angle(),
                    opacity: 0.65,
                }
            })
            .collect();

        self.planets = o
            .planets
            .iter()
            .map(|spec| Planet {
                orbit: PolarOrbit::new(spec.dist, rng.angle(), spec.speed),
                size: spec.size,
                color: spec.color,
            })
            .collect();

        let belt_tint = palette.primary.lerp(palette.secondary, 0.35);
        self.belt = (0..o.asteroid_count)
            .map(|_| {
                let color = white.lerp(belt_tint, rng.unit());
                let orbit = PolarOrbit::new(
                    rng.range(o.belt_radius_min, o.belt_radius_max),
                    rng.angle(),
                    rng.range(0.15, 0.3),
                );
                (orbit, color)
            })
            .collect();

        self.layers.attach(host, "nebula", self.nebula.len());
        self.layers.attach(host, "planets", self.planets.len());
        self.layers.attach(host, "asteroid-belt", self.belt.len());
        Ok(())
    }

    fn advance(&mut self, ctx: &FrameContext) {
        if !self.layers.is_active() {
            return;
        }
        for wisp in &mut self.nebula {
            wisp.orbit.advance(ctx.dt);
            wisp.opacity = (0.7 + (ctx.t * 2.5 + wisp.pulse_offset).sin() * 0.3) * 0.6;
        }
        for planet in &mut self.planets {
            planet.orbit.advance(ctx.dt);
        }
        for (orbit, _) in &mut self.belt {
            orbit.advance(ctx.dt);
            orbit.y = self.rng.signed(0.005);
        }
    }

    fn teardown(&mut self, host: &mut Host) {
        self.layers.detach_all(host);
        self.nebula.clear();
        self.planets.clear();
        self.belt.clear();
    }

    fn visit_sprites(&self, f: &mut dyn FnMut(&Sprite)) {
        for wisp in &self.nebula {
            f(&Sprite::new(wisp.orbit.position(), wisp.color, 0.06).with_opacity(wisp.opacity));
        }
        for planet in &self.planets {
            f(&Sprite::new(planet.orbit.position(), planet.color, planet.size)
                .with_shape(ParticleShape::Cube));
        }
        for (orbit, color) in &self.belt {
            f(&Sprite::new(orbit.position(), *color, 0.04).with_opacity(0.85));
        }
    }

    fn census(&self) -> Census {
        Census::new()
            .with("nebula", self.nebula.len())
            .with("planets", self.planets.len())
            .with("asteroids", self.belt.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layers() {
        let mut host = Host::new();
        let mut sim = Stellar::with_defaults();
        sim.initialize(&mut host).unwrap();
        let census = sim.census();
        assert_eq!(census.get("nebula"), Some(100));
        assert_eq!(census.get("planets"), Some(8));
        assert_eq!(census.get("asteroids"), Some(100));
        assert_eq!(host.layer_count(), 3);
    }

    #[test]
    fn test_planets_keep_distance() {
        let mut host = Host::new();
        let mut sim = Stellar::with_defaults();
        sim.initialize(&mut host).unwrap();
        for i in 0..50 {
            sim.advance(&FrameContext::new(0.02, i as f32 * 0.02));
        }
        for (planet, spec) in sim.planets.iter().zip(default_planets()) {
            assert!((planet.orbit.position().length() - spec.dist).abs() < 1e-4);
        }
        let mut cubes = 0;
        sim.visit_sprites(&mut |s| {
            if s.shape == ParticleShape::Cube {
                cubes += 1;
            }
        });
        assert_eq!(cubes, 8);
    }

    #[test]
    fn test_custom_planet_table() {
        let options: StellarOptions = serde_json::from_value(serde_json::json!({
            "planets": [{ "size": 0.1, "color": "#ffffff", "dist": 2.0, "speed": 1.0 }]
        }))
        .unwrap();
        assert_eq!(options.planets.len(), 1);
        assert_eq!(options.planets[0].color, Vec3::ONE);
        assert_eq!(options.nebula_count, 100);
    }
}
