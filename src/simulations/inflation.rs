//! Inflation: shells creeping outward while fast bodies punch through.
//!
//! Every sprite's radius grows at `radial_speed` and wraps back to
//! `radius_min` once it passes `radius_max`. The whole field is scaled by a
//! strong `1 + sin(t * pulse_speed) * pulse_amp` pulse. Every
//! `fast_interval` seconds a bright body is launched inward from beyond the
//! field; sprites it passes within `push_radius` of are shoved away, and
//! their offsets relax back to zero at `return_speed`.

use super::flashes::FlashPool;
use super::great_unification::layer_fraction;
use crate::emitter::Emitter;
use crate::error::SimulationError;
use crate::host::{FrameContext, Host, Sprite};
use crate::lifecycle::Lifecycle;
use crate::particle::Mover;
use crate::simulation::{Census, Configurable, Layers, Simulation};
use crate::spawn::{fibonacci_sphere, SpawnRng};
use glam::Vec3;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InflationOptions {
    pub layers: usize,
    pub per_layer: usize,
    pub radius_min: f32,
    pub radius_max: f32,
    pub radial_speed: f32,
    pub pulse_speed: f32,
    pub pulse_amp: f32,
    pub band_count: usize,
    pub fast_interval: f32,
    pub fast_speed: f32,
    pub fast_size: f32,
    pub push_radius: f32,
    pub push_strength: f32,
    pub flash_chance: f32,
    pub flash_capacity: usize,
    pub return_speed: f32,
}

impl Default for InflationOptions {
    fn default() -> Self {
        Self {
            layers: 28,
            per_layer: 200,
            radius_min: 1.2,
            radius_max: 6.0,
            radial_speed: 0.35,
            pulse_speed: 1.8,
            pulse_amp: 6.03,
            band_count: 6,
            fast_interval: 2.2,
            fast_speed: 18.0,
            fast_size: 0.28,
            push_radius: 2.2,
            push_strength: 0.7,
            flash_chance: 0.0008,
            flash_capacity: 40,
            return_speed: 5.0,
        }
    }
}

#[derive(Debug, Clone)]
struct CreepPoint {
    dir: Vec3,
    radius: f32,
    offset: Vec3,
    position: Vec3,
    color: Vec3,
}

pub struct Inflation {
    options: InflationOptions,
    rng: SpawnRng,
    layers: Layers,
    colors: (Vec3, Vec3),
    points: Vec<CreepPoint>,
    fast: Vec<Mover>,
    launcher: Emitter,
    flashes: Option<FlashPool>,
}

impl Configurable for Inflation {
    type Options = InflationOptions;

    fn with_options(options: InflationOptions) -> Self {
        Self {
            launcher: Emitter::interval(options.fast_interval),
            options,
            rng: SpawnRng::from_entropy(),
            layers: Layers::default(),
            colors: (Vec3::ZERO, Vec3::ONE),
            points: Vec::new(),
            fast: Vec::new(),
            flashes: None,
        }
    }
}

/// Where `radius` sits between `radius_min` and `radius_max`, in `0..=1`.
fn radial_fraction(o: &InflationOptions, radius: f32) -> f32 {
    ((radius - o.radius_min) / (o.radius_max - o.radius_min)).clamp(0.0, 1.0)
}

impl Inflation {

    /// Quantize a radial fraction into one of `band_count` color steps.
    fn band(&self, frac: f32) -> f32 {
        let bands = self.options.band_count.max(2) as f32;
        ((frac * bands).floor() / (bands - 1.0)).min(1.0)
    }

    fn launch_fast(&mut self) {
        let o = &self.options;
        let dir = self.rng.direction();
        let life = (o.radius_max * 2.0 + 30.0) / o.fast_speed;
        self.fast.push(
            Mover::new(dir * (o.radius_max + 12.0), -dir * o.fast_speed).with_life(life),
        );
        tracing::trace!(live = self.fast.len(), "fast body launched");
    }

    pub fn fast_bodies(&self) -> usize {
        self.fast.len()
    }
}

impl Simulation for Inflation {
    fn name(&self) -> &'static str {
        "inflation"
    }

    fn initialize(&mut self, host: &mut Host) -> Result<(), SimulationError> {
        self.teardown(host);
        let o = &self.options;
        if o.radius_max <= o.radius_min || o.fast_speed <= 0.0 {
            return Err(SimulationError::init(
                "inflation",
                "needs radius_max > radius_min and a positive fast_speed",
            ));
        }
        let palette = host.palette();
        self.colors = (palette.primary, palette.secondary);
        let dirs = fibonacci_sphere(o.per_layer);
        let (a, b) = self.colors;
        self.points = (0..o.layers)
            .flat_map(|layer| {
                let frac = layer_fraction(layer, o.layers);
                let radius = o.radius_min + (o.radius_max - o.radius_min) * frac;
                let color = a.lerp(b, self.band(frac));
                dirs.iter().map(move |&dir| CreepPoint {
                    dir,
                    radius,
                    offset: Vec3::ZERO,
                    position: dir * radius,
                    color,
                })
            })
            .collect();
        let flashes = FlashPool::new(o.flash_capacity, Lifecycle::flash(0.15, 7.0), 0.08);
        self.launcher = Emitter::interval(o.fast_interval);
        self.layers.attach(host, "shells", self.points.len());
        self.layers.attach(host, "flashes", flashes.capacity());
        self.flashes = Some(flashes);
        Ok(())
    }

    fn advance(&mut self, ctx: &FrameContext) {
        if !self.layers.is_active() {
            return;
        }
        let dt = ctx.dt;
        let o = &self.options;
        let pulse = 1.0 + (ctx.t * o.pulse_speed).sin() * o.pulse_amp;
        let relax = (dt * o.return_speed).min(1.0);
        let (a, b) = self.colors;

        if let Some(flashes) = self.flashes.as_mut() {
            for point in &mut self.points {
                point.radius += dt * o.radial_speed;
                if point.radius > o.radius_max {
                    point.radius = o.radius_min;
                    point.offset = Vec3::ZERO;
                }
                point.offset = point.offset.lerp(Vec3::ZERO, relax);
                point.position = point.dir * (point.radius * pulse) + point.offset;
                // Shells are banded when seeded, then shade continuously as they creep.
                point.color = a.lerp(b, radial_fraction(o, point.radius));
                if self.rng.chance(o.flash_chance) {
                    flashes.spawn(point.position);
                }
            }
            flashes.tick(dt);
        }
        let push_sq = o.push_radius * o.push_radius;
        let push_strength = o.push_strength;

        for _ in 0..self.launcher.due(dt, &mut self.rng) {
            self.launch_fast();
        }

        for body in &mut self.fast {
            body.advance(dt);
            for point in &mut self.points {
                let away = point.position - body.position;
                if away.length_squared() < push_sq {
                    point.offset += away.normalize_or_zero() * push_strength;
                }
            }
        }
        self.fast.retain(|body| body.alive);
    }

    fn teardown(&mut self, host: &mut Host) {
        self.layers.detach_all(host);
        self.points.clear();
        self.fast.clear();
        self.flashes = None;
        self.launcher.reset();
    }

    fn visit_sprites(&self, f: &mut dyn FnMut(&Sprite)) {
        for point in &self.points {
            let frac = radial_fraction(&self.options, point.radius);
            f(&Sprite::new(point.position, point.color, 0.06)
                .with_opacity(0.5 + (1.0 - frac) * 0.5));
        }
        for body in &self.fast {
            f(&Sprite::new(body.position, Vec3::ONE, self.options.fast_size));
        }
        if let Some(flashes) = &self.flashes {
            flashes.live().for_each(|s| f(&s));
        }
    }

    fn census(&self) -> Census {
        Census::new()
            .with("points", self.points.len())
            .with("fast", self.fast.len())
            .with("flash_slots", self.flashes.as_ref().map_or(0, FlashPool::capacity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> Inflation {
        Inflation::with_options(InflationOptions {
            layers: 6,
            per_layer: 40,
            pulse_amp: 0.0,
            flash_chance: 0.0,
            ..Default::default()
        })
    }

    #[test]
    fn test_radius_wraps_at_max() {
        let mut host = Host::new();
        let mut sim = small();
        sim.initialize(&mut host).unwrap();
        assert_eq!(sim.census().get("points"), Some(240));
        for i in 0..100 {
            sim.advance(&FrameContext::new(0.05, i as f32 * 0.05));
            for p in &sim.points {
                assert!(p.radius >= 1.2 - 1e-5 && p.radius <= 6.0 + 1e-5);
            }
        }
    }

    #[test]
    fn test_fast_body_launch_and_expiry() {
        let mut host = Host::new();
        let mut sim = small();
        sim.initialize(&mut host).unwrap();
        for _ in 0..23 {
            sim.advance(&FrameContext::new(0.1, 0.0));
        }
        assert_eq!(sim.fast_bodies(), 1);
        // Life is (6 * 2 + 30) / 18 seconds.
        for _ in 0..24 {
            sim.advance(&FrameContext::new(0.1, 0.0));
        }
        assert!(sim.fast.iter().all(|b| b.life.unwrap_or(0.0) > 0.0));
        assert!(sim.fast_bodies() <= 2);
    }

    #[test]
    fn test_fast_body_pushes_nearby_points() {
        let mut host = Host::new();
        let mut sim = small();
        sim.initialize(&mut host).unwrap();
        let target = sim.points[0].position;
        sim.fast
            .push(Mover::new(target * 0.9, Vec3::ZERO).with_life(10.0));
        sim.advance(&FrameContext::new(0.001, 0.0));
        assert!(sim.points[0].offset.length() > 0.5);
    }

    #[test]
    fn test_banded_seed_then_continuous_shading() {
        let mut host = Host::new();
        let mut sim = small();
        sim.initialize(&mut host).unwrap();
        let (a, b) = sim.colors;
        for (i, p) in sim.points.iter().enumerate() {
            let frac = layer_fraction(i / 40, 6);
            assert!(p.color.abs_diff_eq(a.lerp(b, sim.band(frac)), 1e-5));
        }

        sim.advance(&FrameContext::new(0.05, 0.05));
        let mut shaded = 0;
        for p in &sim.points {
            let frac = radial_fraction(&sim.options, p.radius);
            assert!(p.color.abs_diff_eq(a.lerp(b, frac), 1e-5));
            if !p.color.abs_diff_eq(a.lerp(b, sim.band(frac)), 1e-4) {
                shaded += 1;
            }
        }
        assert!(shaded > 0, "colors still follow the bands");

        let mut seen = Vec::new();
        sim.visit_sprites(&mut |s| seen.push(s.color));
        assert_eq!(seen[0], sim.points[0].color);
    }

    #[test]
    fn test_bands_quantize() {
        let sim = small();
        assert_eq!(sim.band(0.0), 0.0);
        assert_eq!(sim.band(1.0), 1.0);
        assert!((sim.band(0.5) - 0.6).abs() < 1e-6);
    }
}
