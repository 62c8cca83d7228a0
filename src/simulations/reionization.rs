//! Reionization: the first stars light up a glowing nebula.
//!
//! Four independent layers:
//!
//! - nebula: sprites on a shell, each orbiting its own axis with a pulsing opacity
//! - mini cubes: small host-shaded cubes orbiting far out
//! - bubbles: ionized regions near the center that grow, fade and restart
//! - stars: point flashes with `opacity = max(0, sin(4 * flash_time))`

use crate::error::SimulationError;
use crate::host::{FrameContext, Host, Sprite};
use crate::particle::AxisOrbit;
use crate::simulation::{Census, Configurable, Layers, Simulation};
use crate::spawn::SpawnRng;
use crate::visuals::ParticleShape;
use glam::Vec3;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReionizationOptions {
    pub nebula_count: usize,
    pub nebula_radius_min: f32,
    pub nebula_radius_max: f32,
    pub cube_count: usize,
    pub cube_radius_min: f32,
    pub cube_radius_max: f32,
    pub cube_size: f32,
    pub bubble_count: usize,
    pub bubble_life_min: f32,
    pub bubble_life_max: f32,
    pub star_count: usize,
}

impl Default for ReionizationOptions {
    fn default() -> Self {
        Self {
            nebula_count: 2200,
            nebula_radius_min: 2.8,
            nebula_radius_max: 6.8,
            cube_count: 22,
            cube_radius_min: 3.0,
            cube_radius_max: 33.5,
            cube_size: 0.6,
            bubble_count: 25,
            bubble_life_min: 3.0,
            bubble_life_max: 5.8,
            star_count: 150,
        }
    }
}

#[derive(Debug, Clone)]
struct NebulaSprite {
    orbit: AxisOrbit,
    color: Vec3,
    pulse_offset: f32,
    opacity: f32,
}

#[derive(Debug, Clone)]
struct Bubble {
    position: Vec3,
    growth: f32,
    life: f32,
    scale: f32,
}

impl Bubble {
    const START_SCALE: f32 = 0.15;

    fn opacity(&self) -> f32 {
        (self.life * 0.12).max(0.0)
    }
}

#[derive(Debug, Clone)]
struct Star {
    position: Vec3,
    color: Vec3,
    flash_time: f32,
    flash_speed: f32,
}

impl Star {
    fn opacity(&self) -> f32 {
        (self.flash_time * 4.0).sin().max(0.0)
    }
}

pub struct Reionization {
    options: ReionizationOptions,
    rng: SpawnRng,
    layers: Layers,
    nebula: Vec<NebulaSprite>,
    cubes: Vec<AxisOrbit>,
    cube_color: Vec3,
    bubble_color: Vec3,
    bubbles: Vec<Bubble>,
    stars: Vec<Star>,
}

impl Configurable for Reionization {
    type Options = ReionizationOptions;

    fn with_options(options: ReionizationOptions) -> Self {
        Self {
            options,
            rng: SpawnRng::from_entropy(),
            layers: Layers::default(),
            nebula: Vec::new(),
            cubes: Vec::new(),
            cube_color: Vec3::ONE,
            bubble_color: Vec3::ONE,
            bubbles: Vec::new(),
            stars: Vec::new(),
        }
    }
}

impl Reionization {
    fn bubble_life(&mut self) -> f32 {
        self.rng
            .range(self.options.bubble_life_min, self.options.bubble_life_max)
    }

    pub fn bubble_lives(&self) -> impl Iterator<Item = f32> + '_ {
        self.bubbles.iter().map(|b| b.life)
    }
}

impl Simulation for Reionization {
    fn name(&self) -> &'static str {
        "reionization"
    }

    fn initialize(&mut self, host: &mut Host) -> Result<(), SimulationError> {
        self.teardown(host);
        let o = self.options.clone();
        if o.bubble_life_max < o.bubble_life_min {
            return Err(SimulationError::init("reionization", "bubble_life_max below bubble_life_min"));
        }
        let palette = host.palette();
        let (a, b) = (palette.primary, palette.secondary);
        let rng = &mut self.rng;

        self.nebula = (0..o.nebula_count)
            .map(|_| {
                let roll = rng.unit();
                let color = if roll < 0.45 {
                    Vec3::ONE.lerp(a, rng.range(0.0, 0.45))
                } else if roll < 0.9 {
                    Vec3::ONE.lerp(b, rng.range(0.0, 0.35))
                } else {
                    Vec3::ONE
                };
                let base = rng.point_in_shell(o.nebula_radius_min, o.nebula_radius_max);
                NebulaSprite {
                    orbit: AxisOrbit::new(base, rng.direction(), rng.range(0.1, 0.45)),
                    color,
                    pulse_offset: rng.angle(),
                    opacity: 0.75,
                }
            })
            .collect();

        self.cubes = (0..o.cube_count)
            .map(|_| {
                let base = rng.point_on_radius(o.cube_radius_min, o.cube_radius_max);
                AxisOrbit::new(base, rng.direction(), rng.range(0.07, 0.27))
            })
            .collect();
        self.cube_color = a.lerp(b, 0.5);

        self.bubble_color = b.lerp(Vec3::ONE, 0.35);
        let mut bubbles = Vec::with_capacity(o.bubble_count);
        for _ in 0..o.bubble_count {
            let position = self.rng.in_cube(1.25);
            let growth = self.rng.range(0.25, 0.6);
            let life = self.bubble_life();
            bubbles.push(Bubble {
                position,
                growth,
                life,
                scale: 0.18,
            });
        }
        self.bubbles = bubbles;

        let rng = &mut self.rng;
        self.stars = (0..o.star_count)
            .map(|_| Star {
                position: rng.in_cube(3.4),
                color: Vec3::ONE.lerp(a, rng.range(0.0, 0.4)),
                flash_time: 0.0,
                flash_speed: rng.range(1.6, 2.4),
            })
            .collect();

        self.layers.attach(host, "nebula", o.nebula_count);
        self.layers.attach(host, "mini-cubes", o.cube_count);
        self.layers.attach(host, "bubbles", o.bubble_count);
        self.layers.attach(host, "stars", o.star_count);
        Ok(())
    }

    fn advance(&mut self, ctx: &FrameContext) {
        if !self.layers.is_active() {
            return;
        }
        let (dt, t) = (ctx.dt, ctx.t);
        for p in &mut self.nebula {
            p.orbit.advance(dt);
            let pulse = 0.75 + (t * 3.0 + p.pulse_offset).sin() * 0.25;
            p.opacity = 0.55 + pulse * 0.3;
        }
        for cube in &mut self.cubes {
            cube.advance(dt);
        }
        for i in 0..self.bubbles.len() {
            let bubble = &mut self.bubbles[i];
            bubble.life -= dt;
            bubble.scale *= 1.0 + dt * bubble.growth;
            if bubble.life <= 0.0 {
                let life = self.bubble_life();
                let bubble = &mut self.bubbles[i];
                bubble.scale = Bubble::START_SCALE;
                bubble.life = life;
            }
        }
        for star in &mut self.stars {
            star.flash_time += dt * star.flash_speed;
        }
    }

    fn teardown(&mut self, host: &mut Host) {
        self.layers.detach_all(host);
        self.nebula.clear();
        self.cubes.clear();
        self.bubbles.clear();
        self.stars.clear();
    }

    fn visit_sprites(&self, f: &mut dyn FnMut(&Sprite)) {
        for p in &self.nebula {
            f(&Sprite::new(p.orbit.position(), p.color, 0.055).with_opacity(p.opacity));
        }
        for cube in &self.cubes {
            f(&Sprite::new(cube.position(), self.cube_color, self.options.cube_size)
                .with_shape(ParticleShape::Cube));
        }
        for b in &self.bubbles {
            f(&Sprite::new(b.position, self.bubble_color, b.scale).with_opacity(b.opacity()));
        }
        for s in &self.stars {
            f(&Sprite::new(s.position, s.color, 0.04).with_opacity(s.opacity()));
        }
    }

    fn census(&self) -> Census {
        Census::new()
            .with("nebula", self.nebula.len())
            .with("mini_cubes", self.cubes.len())
            .with("bubbles", self.bubbles.len())
            .with("stars", self.stars.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_counts() {
        let mut host = Host::new();
        let mut sim = Reionization::with_defaults();
        sim.initialize(&mut host).unwrap();
        let census = sim.census();
        assert_eq!(census.get("nebula"), Some(2200));
        assert_eq!(census.get("mini_cubes"), Some(22));
        assert_eq!(census.get("bubbles"), Some(25));
        assert_eq!(census.get("stars"), Some(150));
        assert_eq!(host.layer_count(), 4);
    }

    #[test]
    fn test_bubbles_restart_on_expiry() {
        let mut host = Host::new();
        let mut sim = Reionization::with_options(ReionizationOptions {
            nebula_count: 10,
            star_count: 5,
            ..Default::default()
        });
        sim.initialize(&mut host).unwrap();
        for i in 0..900 {
            sim.advance(&FrameContext::new(1.0 / 60.0, i as f32 / 60.0));
            for life in sim.bubble_lives() {
                assert!(life > 0.0 && life <= 5.8);
            }
        }
        for b in &sim.bubbles {
            assert!(b.scale < 0.18 * (1.0f32 + 0.6 / 60.0).powi(360));
        }
    }

    #[test]
    fn test_nebula_stays_on_shell_and_stars_flash() {
        let mut host = Host::new();
        let mut sim = Reionization::with_options(ReionizationOptions {
            nebula_count: 200,
            ..Default::default()
        });
        sim.initialize(&mut host).unwrap();
        for i in 0..100 {
            sim.advance(&FrameContext::new(1.0 / 60.0, i as f32 / 60.0));
        }
        for p in &sim.nebula {
            let r = p.orbit.position().length();
            assert!((2.8 - 1e-3..=6.8 + 1e-3).contains(&r));
            assert!((0.55..=0.85 + 1e-5).contains(&p.opacity));
        }
        assert!(sim.stars.iter().all(|s| (0.0..=1.0).contains(&s.opacity())));
    }
}
