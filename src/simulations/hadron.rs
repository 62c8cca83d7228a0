//! Hadron epoch: thousands of three-quark bodies drifting through a shell.
//!
//! Each trio is a [`Composite<3>`] seeded with shell sampling. Per frame:
//!
//! | Step | Rule |
//! |------|------|
//! | drift | `center += drift * dt` plus an axial wobble `sin(0.7t + w) * amp * dt * 0.6` |
//! | reseed | past `radius_max + 0.5`, jump back into the inner shell with fresh drift |
//! | spin | phase += `dt * speed * (1 + sin(0.5t + w) * 0.12)` |
//! | breathe | radius = `inner * (1 + sin(t * (2 + w mod 3)) * 0.08)` |
//!
//! All three members share one phase, so their 120° spacing never drifts.

use crate::composite::Composite;
use crate::error::SimulationError;
use crate::host::{FrameContext, Host, Sprite};
use crate::simulation::{Census, Configurable, Layers, Simulation};
use crate::spawn::SpawnRng;
use crate::visuals::{offset_hsl, Triad};
use glam::Vec3;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HadronOptions {
    pub trio_count: usize,
    pub radius_min: f32,
    pub radius_max: f32,
    pub drift_speed: f32,
    pub orbital_min: f32,
    pub orbital_max: f32,
    pub orbital_speed: f32,
    pub noise_amp: f32,
    pub opacity: f32,
    pub scale: f32,
    /// Derive member colors from the host palette instead of fixed RYB.
    pub use_host_colors: bool,
}

impl Default for HadronOptions {
    fn default() -> Self {
        Self {
            trio_count: 4000,
            radius_min: 0.8,
            radius_max: 6.0,
            drift_speed: 0.02,
            orbital_min: 0.01,
            orbital_max: 0.06,
            orbital_speed: 1.2,
            noise_amp: 0.03,
            opacity: 0.92,
            scale: 0.045,
            use_host_colors: true,
        }
    }
}

#[derive(Debug, Clone)]
struct HadronTrio {
    body: Composite<3>,
    colors: [Vec3; 3],
    /// Breathing radius for the current frame.
    radius: f32,
}

pub struct Hadron {
    options: HadronOptions,
    rng: SpawnRng,
    layers: Layers,
    trios: Vec<HadronTrio>,
    t: f32,
}

impl Configurable for Hadron {
    type Options = HadronOptions;

    fn with_options(options: HadronOptions) -> Self {
        Self {
            options,
            rng: SpawnRng::from_entropy(),
            layers: Layers::default(),
            trios: Vec::new(),
            t: 0.0,
        }
    }
}

impl Hadron {
    fn drift(&mut self) -> Vec3 {
        self.rng.in_cube(self.options.drift_speed * 0.5)
    }

    /// Phases of every trio, for checking member spacing.
    pub fn phases(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.trios.iter().map(|t| t.body.phases())
    }

    pub fn centers(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.trios.iter().map(|t| t.body.center)
    }
}

impl Simulation for Hadron {
    fn name(&self) -> &'static str {
        "hadron"
    }

    fn initialize(&mut self, host: &mut Host) -> Result<(), SimulationError> {
        self.teardown(host);
        if self.options.radius_max < self.options.radius_min {
            return Err(SimulationError::init("hadron", "radius_max below radius_min"));
        }
        let palette = host.palette();
        let triad = if self.options.use_host_colors {
            Triad::hadron(palette.primary, palette.secondary)
        } else {
            Triad::classic()
        };
        let base_colors = triad.as_array();

        let mut trios = Vec::with_capacity(self.options.trio_count);
        for _ in 0..self.options.trio_count {
            let o = &self.options;
            let center = self.rng.point_in_shell(o.radius_min, o.radius_max);
            let axis = self.rng.direction();
            let base_inner = self.rng.range(o.orbital_min, o.orbital_max);
            let speed = o.orbital_speed * self.rng.range(0.6, 1.5);
            let phase = self.rng.angle();
            let wobble = self.rng.range(0.0, 6.0);
            let drift = self.drift();
            let mut body = Composite::new(center, axis, base_inner, speed, phase)
                .with_drift(drift)
                .with_wobble(wobble);
            body.inner_radius = base_inner * self.rng.range(0.85, 1.15);
            let colors = base_colors.map(|c| offset_hsl(c, 0.0, 0.0, self.rng.signed(0.015)));
            trios.push(HadronTrio {
                radius: body.inner_radius,
                body,
                colors,
            });
        }
        self.trios = trios;
        self.layers.attach(host, "hadron-trios", self.trios.len() * 3);
        Ok(())
    }

    fn advance(&mut self, ctx: &FrameContext) {
        if !self.layers.is_active() {
            return;
        }
        let (dt, t) = (ctx.dt, ctx.t);
        self.t = t;
        let o = &self.options;
        let reseed_max = (o.radius_min + o.radius_max) * 0.2;

        for i in 0..self.trios.len() {
            let body = &mut self.trios[i].body;
            body.advance_center(dt);
            let n = (t * 0.7 + body.wobble).sin() * o.noise_amp;
            body.center += body.axis * (n * dt * 0.6);

            if body.center.length() > o.radius_max + 0.5 {
                let center = self.rng.point_in_shell(o.radius_min, reseed_max);
                let drift = self.rng.in_cube(o.drift_speed * 0.5);
                let factor = self.rng.range(0.8, 1.3);
                let body = &mut self.trios[i].body;
                body.center = center;
                body.drift = drift;
                body.inner_radius = body.base_inner * factor;
            }

            let trio = &mut self.trios[i];
            let w = trio.body.wobble;
            trio.body.advance_phase(dt, 1.0 + (t * 0.5 + w).sin() * 0.12);
            trio.radius = trio.body.inner_radius * (1.0 + (t * (2.0 + w % 3.0)).sin() * 0.08);
        }
    }

    fn teardown(&mut self, host: &mut Host) {
        self.layers.detach_all(host);
        self.trios.clear();
    }

    fn visit_sprites(&self, f: &mut dyn FnMut(&Sprite)) {
        let o = &self.options;
        let t = self.t;
        for (i, trio) in self.trios.iter().enumerate() {
            let positions = trio.body.member_positions(trio.radius);
            for k in 0..3 {
                let kf = k as f32;
                let pulse = 1.0 + (t * 6.0 + i as f32 * 0.001 + kf).sin() * 0.03;
                let flicker = 0.9 + (t * 8.0 + i as f32 * 0.01 + kf).sin() * 0.08;
                f(&Sprite::new(positions[k], trio.colors[k], o.scale * pulse)
                    .with_opacity((o.opacity * flicker).min(1.0)));
            }
        }
    }

    fn census(&self) -> Census {
        Census::new().with("trios", self.trios.len())
    }
}
