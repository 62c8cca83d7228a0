//! Photon epoch: a layered shell of trios under a constant photon rain.
//!
//! Trios sit on Fibonacci directions across `layers` radii and spin about
//! their own axes. Photons stream in from just outside the shell. When a
//! photon comes within reach of a trio it is turned away at constant speed
//! and the trio is kicked outward, briefly brightening. Kicks and glow
//! relax back every frame.

use super::trails::{PhotonStream, StreamOptions};
use crate::composite::SpinCluster;
use crate::error::SimulationError;
use crate::host::{FrameContext, Host, Sprite};
use crate::simulation::{Census, Configurable, Layers, Simulation};
use crate::spawn::{fibonacci_sphere, SpawnRng};
use crate::visuals::offset_hsl;
use glam::Vec3;
use serde::Deserialize;
use std::f32::consts::TAU;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PhotonOptions {
    pub layers: usize,
    /// Sprites per layer; trios per layer are a third of this.
    pub per_layer: usize,
    pub radius_min: f32,
    pub radius_max: f32,
    pub trio_inner_min: f32,
    pub trio_inner_max: f32,
    pub trio_spin_min: f32,
    pub trio_spin_max: f32,
    pub collision_radius: f32,
    pub stream: StreamOptions,
}

impl Default for PhotonOptions {
    fn default() -> Self {
        Self {
            layers: 20,
            per_layer: 220,
            radius_min: 0.4,
            radius_max: 6.0,
            trio_inner_min: 0.02,
            trio_inner_max: 0.05,
            trio_spin_min: 1.0,
            trio_spin_max: 3.5,
            collision_radius: 0.28,
            stream: StreamOptions::default(),
        }
    }
}

impl PhotonOptions {
    /// Trios per layer, so the whole shell carries about `layers * per_layer` sprites.
    pub fn trios_per_layer(&self) -> usize {
        let layers = self.layers.max(1);
        let total = ((layers * self.per_layer) as f32 / 3.0).round().max(1.0);
        (total / layers as f32).round().max(1.0) as usize
    }

    fn rest_scale(&self) -> f32 {
        self.trio_inner_max * 0.9
    }
}

const REST_OPACITY: f32 = 0.9;

#[derive(Debug, Clone)]
struct ShellTrio {
    dir: Vec3,
    base_radius: f32,
    radius: f32,
    inner: f32,
    phase: f32,
    cluster: SpinCluster<3>,
    colors: [Vec3; 3],
    /// Displacement from the last photon hit, relaxing to zero.
    offset: Vec3,
    opacity: f32,
    scale: f32,
}

impl ShellTrio {
    fn center(&self) -> Vec3 {
        self.dir * self.radius + self.offset
    }
}

pub struct Photon {
    options: PhotonOptions,
    rng: SpawnRng,
    layers: Layers,
    trios: Vec<ShellTrio>,
    stream: PhotonStream,
    hits: usize,
}

impl Configurable for Photon {
    type Options = PhotonOptions;

    fn with_options(options: PhotonOptions) -> Self {
        Self {
            stream: PhotonStream::new(options.stream.clone()),
            options,
            rng: SpawnRng::from_entropy(),
            layers: Layers::default(),
            trios: Vec::new(),
            hits: 0,
        }
    }
}

impl Photon {
    pub fn stream(&self) -> &PhotonStream {
        &self.stream
    }

    /// Photon-trio collisions since initialize.
    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn trio_centers(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.trios.iter().map(ShellTrio::center)
    }

    fn build_trio(&mut self, dir: Vec3, radius: f32, base: Vec3) -> ShellTrio {
        let o = &self.options;
        let rng = &mut self.rng;
        let inner = rng.range(o.trio_inner_min, o.trio_inner_max);
        let phase = rng.angle();
        let offsets = std::array::from_fn(|k| {
            let a = phase + k as f32 / 3.0 * TAU;
            Vec3::new(a.cos() * inner, a.sin() * inner * 0.8, (a + 0.4).sin() * inner * 0.3)
        });
        let axis = rng.direction();
        let spin = rng.range(o.trio_spin_min, o.trio_spin_max);
        let radius = radius * (0.95 + rng.signed(0.04));
        ShellTrio {
            dir,
            base_radius: radius,
            radius,
            inner,
            phase,
            cluster: SpinCluster::from_offsets(offsets, axis, spin),
            colors: [
                offset_hsl(base, 0.03, 0.08, 0.02),
                offset_hsl(base, -0.06, -0.02, 0.06),
                offset_hsl(base, -0.12, 0.02, -0.03),
            ],
            offset: Vec3::ZERO,
            opacity: 0.95,
            scale: o.rest_scale(),
        }
    }
}

impl Simulation for Photon {
    fn name(&self) -> &'static str {
        "photon"
    }

    fn initialize(&mut self, host: &mut Host) -> Result<(), SimulationError> {
        self.teardown(host);
        if self.options.layers == 0 {
            return Err(SimulationError::init("photon", "layers must be at least 1"));
        }
        let palette = host.palette();
        let layers = self.options.layers;
        let dirs = fibonacci_sphere(self.options.trios_per_layer());
        let mut trios = Vec::with_capacity(layers * dirs.len());
        for l in 0..layers {
            let frac = l as f32 / (layers - 1).max(1) as f32;
            let o = &self.options;
            let radius = o.radius_min + (o.radius_max - o.radius_min) * frac;
            let base = palette.primary.lerp(palette.secondary, frac);
            for &dir in &dirs {
                trios.push(self.build_trio(dir, radius, base));
            }
        }
        self.trios = trios;
        self.stream = PhotonStream::new(self.options.stream.clone());
        self.hits = 0;

        self.layers.attach(host, "trios", self.trios.len() * 3);
        self.layers.attach(host, "trails", self.stream.trails().capacity());
        // Photons come and go.
        self.layers.attach(host, "photons", 0);
        Ok(())
    }

    fn advance(&mut self, ctx: &FrameContext) {
        if !self.layers.is_active() {
            return;
        }
        let (dt, t) = (ctx.dt, ctx.t);
        for trio in &mut self.trios {
            trio.cluster.spin(dt);
            trio.offset = trio.offset.lerp(Vec3::ZERO, (dt * 2.5).min(1.0));
            let pulse = 1.0 + (t * 0.6 + trio.phase % 7.0).sin() * 0.002;
            let target = trio.base_radius * pulse;
            trio.radius += (target - trio.radius) * (dt * 0.6).min(1.0);
        }

        let reach = self.options.collision_radius + 0.06;
        let speed = self.stream.speed();
        let trios = &mut self.trios;
        let hits = &mut self.hits;
        self.stream.advance(dt, &mut self.rng, |photon, rng| {
            let Some(trio) = trios
                .iter_mut()
                .find(|tr| photon.position.distance(tr.center()) < reach + tr.inner)
            else {
                return;
            };
            let push = (photon.position - trio.center()).normalize_or_zero();
            photon.velocity += push * rng.range(2.5, 4.0);
            photon.velocity = photon.velocity.normalize_or_zero() * speed;
            trio.offset += push * rng.range(0.35, 1.05);
            trio.opacity = (trio.opacity + 0.12).min(1.0);
            trio.scale *= 1.05;
            *hits += 1;
        });

        let rest = self.options.rest_scale();
        for trio in &mut self.trios {
            trio.scale += (rest - trio.scale) * (dt * 6.0).min(1.0);
            trio.opacity += (REST_OPACITY - trio.opacity) * (dt * 2.5).min(1.0);
        }
    }

    fn teardown(&mut self, host: &mut Host) {
        self.layers.detach_all(host);
        self.trios.clear();
        self.stream.clear();
    }

    fn visit_sprites(&self, f: &mut dyn FnMut(&Sprite)) {
        for trio in &self.trios {
            let center = trio.center();
            for (offset, color) in trio.cluster.offsets.iter().zip(trio.colors) {
                f(&Sprite::new(center + *offset, color, trio.scale).with_opacity(trio.opacity));
            }
        }
        self.stream.sprites(f);
    }

    fn census(&self) -> Census {
        Census::new()
            .with("trios", self.trios.len())
            .with("photons", self.stream.photons().len())
            .with("trail_slots", self.stream.trails().capacity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_layout() {
        let options = PhotonOptions::default();
        assert_eq!(options.trios_per_layer(), 73);
        let mut host = Host::new();
        let mut sim = Photon::with_defaults();
        sim.initialize(&mut host).unwrap();
        assert_eq!(sim.census().get("trios"), Some(1460));
        assert_eq!(sim.census().get("trail_slots"), Some(600));
    }

    #[test]
    fn test_photons_removed_past_die_radius() {
        let mut host = Host::new();
        let mut sim = Photon::with_options(PhotonOptions {
            layers: 2,
            per_layer: 30,
            ..Default::default()
        });
        sim.initialize(&mut host).unwrap();
        for i in 0..300 {
            sim.advance(&FrameContext::new(1.0 / 60.0, i as f32 / 60.0));
            for p in sim.stream().photons() {
                assert!(p.position.length() <= 10.5 + 1e-3);
                assert!((p.velocity.length() - 12.0).abs() < 1e-2);
            }
        }
        assert!(sim.stream().trails().live_count() <= 600);
    }

    #[test]
    fn test_kicks_relax() {
        let mut host = Host::new();
        let mut sim = Photon::with_options(PhotonOptions {
            layers: 3,
            per_layer: 30,
            stream: StreamOptions {
                interval: 0.0,
                ..Default::default()
            },
            ..Default::default()
        });
        sim.initialize(&mut host).unwrap();
        for trio in &mut sim.trios {
            trio.offset = Vec3::splat(0.5);
        }
        for i in 0..600 {
            sim.advance(&FrameContext::new(1.0 / 60.0, i as f32 / 60.0));
        }
        assert!(sim.trios.iter().all(|t| t.offset.length() < 1e-3));
        assert_eq!(sim.hits(), 0);
    }
}
