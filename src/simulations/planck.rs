//! Planck epoch: small polyhedra clinging to the host.
//!
//! Appendages sit on a thin jittered shell, each slowly orbiting its own
//! axis. Their scale pulses with the shared displacement:
//!
//! ```text
//! scale = base * (1 + sin((t + r0) * 3) * 0.08 * (1 + 3 * disp))
//! ```
//!
//! The host's Planck gradient flag is raised for the lifetime of the
//! simulation.

use crate::error::SimulationError;
use crate::host::{FrameContext, Host, Sprite};
use crate::particle::AxisOrbit;
use crate::simulation::{Census, Configurable, Layers, Simulation};
use crate::spawn::SpawnRng;
use crate::uniforms::U_PLANCK_GRADIENT;
use crate::visuals::{ColorRamp, ParticleShape};
use glam::Vec3;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlanckOptions {
    pub count: usize,
    pub dist_min: f32,
    pub dist_max: f32,
    /// Full width of the radial jitter added to each distance.
    pub jitter: f32,
    pub scale_min: f32,
    pub scale_max: f32,
    pub orbit_speed_min: f32,
    pub orbit_speed_max: f32,
    pub pulse_amp: f32,
}

impl Default for PlanckOptions {
    fn default() -> Self {
        Self {
            count: 350,
            dist_min: 0.5,
            dist_max: 1.1,
            jitter: 0.25,
            scale_min: 0.6,
            scale_max: 2.0,
            orbit_speed_min: 0.05,
            orbit_speed_max: 0.3,
            pulse_amp: 0.08,
        }
    }
}

/// Mesh extent of each polyhedron at unit scale.
fn shape_size(shape: ParticleShape) -> f32 {
    match shape {
        ParticleShape::Tetrahedron => 0.08,
        ParticleShape::Cube => 0.09,
        ParticleShape::Octahedron => 0.075,
        ParticleShape::Icosahedron => 0.06,
        ParticleShape::Sprite => 0.05,
    }
}

#[derive(Debug, Clone)]
struct Appendage {
    orbit: AxisOrbit,
    shape: ParticleShape,
    base_scale: f32,
    base_radius: f32,
    scale: f32,
}

pub struct Planck {
    options: PlanckOptions,
    rng: SpawnRng,
    layers: Layers,
    ramp: ColorRamp,
    appendages: Vec<Appendage>,
}

impl Configurable for Planck {
    type Options = PlanckOptions;

    fn with_options(options: PlanckOptions) -> Self {
        Self {
            options,
            rng: SpawnRng::from_entropy(),
            layers: Layers::default(),
            ramp: ColorRamp::planck(),
            appendages: Vec::new(),
        }
    }
}

impl Planck {
    /// Scale multiplier at time `t` for an appendage first placed at `r0`.
    pub fn pulse(&self, t: f32, r0: f32, displacement: f32) -> f32 {
        1.0 + ((t + r0) * 3.0).sin() * self.options.pulse_amp * (1.0 + displacement * 3.0)
    }
}

impl Simulation for Planck {
    fn name(&self) -> &'static str {
        "planck"
    }

    fn initialize(&mut self, host: &mut Host) -> Result<(), SimulationError> {
        self.teardown(host);
        let o = &self.options;
        let rng = &mut self.rng;
        self.appendages = (0..o.count)
            .map(|_| {
                let shape = *rng.pick(&ParticleShape::POLYHEDRA);
                let dist = rng.range(o.dist_min, o.dist_max) + rng.signed(o.jitter * 0.5);
                let base = rng.direction() * dist;
                let base_scale = shape_size(shape) * rng.range(o.scale_min, o.scale_max);
                // Positive components only, so every axis leans the same way.
                let axis = Vec3::new(rng.unit(), rng.unit(), rng.unit());
                let speed = rng.range(o.orbit_speed_min, o.orbit_speed_max);
                Appendage {
                    orbit: AxisOrbit::new(base, axis, speed),
                    shape,
                    base_scale,
                    base_radius: base.length(),
                    scale: base_scale,
                }
            })
            .collect();
        host.set_flag(U_PLANCK_GRADIENT, 1.0);
        self.layers.attach(host, "appendages", o.count);
        Ok(())
    }

    fn advance(&mut self, ctx: &FrameContext) {
        if !self.layers.is_active() {
            return;
        }
        for i in 0..self.appendages.len() {
            let r0 = self.appendages[i].base_radius;
            let pulse = self.pulse(ctx.t, r0, ctx.displacement);
            let a = &mut self.appendages[i];
            a.orbit.advance(ctx.dt);
            a.scale = a.base_scale * pulse;
        }
    }

    fn teardown(&mut self, host: &mut Host) {
        if self.layers.detach_all(host) {
            host.set_flag(U_PLANCK_GRADIENT, 0.0);
        }
        self.appendages.clear();
    }

    fn visit_sprites(&self, f: &mut dyn FnMut(&Sprite)) {
        for a in &self.appendages {
            let position = a.orbit.position();
            let color = self.ramp.sample(position.length() / 3.0);
            f(&Sprite::new(position, color, a.scale).with_shape(a.shape));
        }
    }

    fn census(&self) -> Census {
        Census::new().with("appendages", self.appendages.len())
    }
}
