//! Dark ages: a cold cloud that clumps under sampled gravity.
//!
//! Each frame every particle looks at `neighbor_count` *other* particles
//! chosen at random rather than all `N - 1`, giving an O(N·k) stand-in for
//! the O(N²) pairwise force. Per sampled neighbor:
//!
//! - closer than `min_dist`: a fixed repulsive kick of `repel`
//! - otherwise: an attraction of `g * dt / d²` toward the neighbor
//!
//! Speed is clamped, position integrates, and the whole cloud is damped
//! toward the origin by `1 - dt * decay`. The fraction of sampled neighbors
//! within `density_radius` drives each sprite's opacity through exponential
//! smoothing.

use crate::error::SimulationError;
use crate::host::{FrameContext, Host, Sprite};
use crate::simulation::{Census, Configurable, Layers, Simulation};
use crate::spawn::SpawnRng;
use glam::Vec3;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DarkOptions {
    pub count: usize,
    pub radius_max: f32,
    pub min_dist: f32,
    pub repel: f32,
    #[serde(rename = "G", alias = "g")]
    pub g: f32,
    pub max_speed: f32,
    pub decay: f32,
    pub density_radius: f32,
    pub neighbor_count: usize,
    pub base_opacity: f32,
    pub max_opacity: f32,
    pub opacity_rate: f32,
    pub scale: f32,
}

impl Default for DarkOptions {
    fn default() -> Self {
        Self {
            count: 1800,
            radius_max: 8.0,
            min_dist: 0.08,
            repel: 0.02,
            g: 0.015,
            max_speed: 0.6,
            decay: 0.02,
            density_radius: 0.35,
            neighbor_count: 5,
            base_opacity: 0.15,
            max_opacity: 0.45,
            opacity_rate: 4.0,
            scale: 0.045,
        }
    }
}

/// One dark-matter particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DarkParticle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub opacity: f32,
}

/// Force constants for [`neighbor_force_step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborForce {
    pub neighbor_count: usize,
    pub min_dist: f32,
    pub repel: f32,
    pub g: f32,
    pub max_speed: f32,
    pub decay: f32,
    pub density_radius: f32,
    pub base_opacity: f32,
    pub max_opacity: f32,
    pub opacity_rate: f32,
}

impl From<&DarkOptions> for NeighborForce {
    fn from(o: &DarkOptions) -> Self {
        Self {
            neighbor_count: o.neighbor_count,
            min_dist: o.min_dist,
            repel: o.repel,
            g: o.g,
            max_speed: o.max_speed,
            decay: o.decay,
            density_radius: o.density_radius,
            base_opacity: o.base_opacity,
            max_opacity: o.max_opacity,
            opacity_rate: o.opacity_rate,
        }
    }
}

/// Advance every particle by one sampled-neighbor step.
///
/// Particles are updated in place and in order, so later particles see the
/// already-moved positions of earlier ones.
pub fn neighbor_force_step(
    particles: &mut [DarkParticle],
    force: &NeighborForce,
    dt: f32,
    rng: &mut SpawnRng,
) {
    let n = particles.len();
    if n < 2 || force.neighbor_count == 0 {
        return;
    }
    let k = force.neighbor_count;
    let min_dist_sq = force.min_dist * force.min_dist;
    let density_sq = force.density_radius * force.density_radius;

    for i in 0..n {
        let pos = particles[i].position;
        let mut vel = particles[i].velocity;
        let mut density = 0usize;

        for _ in 0..k {
            // Uniform over the other n - 1 particles.
            let mut j = rng.index(n - 1);
            if j >= i {
                j += 1;
            }
            let delta = particles[j].position - pos;
            let dist_sq = delta.length_squared();
            if dist_sq < 1e-8 {
                continue;
            }
            if dist_sq < density_sq {
                density += 1;
            }
            let dir = delta / dist_sq.sqrt();
            if dist_sq < min_dist_sq {
                vel -= dir * force.repel;
            } else {
                vel += dir * (force.g * dt / dist_sq);
            }
        }

        let vel = vel.clamp_length_max(force.max_speed);
        let p = &mut particles[i];
        p.velocity = vel;
        p.position = (p.position + vel * dt) * (1.0 - dt * force.decay);

        let fraction = density as f32 / k as f32;
        let target = force.base_opacity + fraction * (force.max_opacity - force.base_opacity);
        p.opacity += (target - p.opacity) * (dt * force.opacity_rate).min(1.0);
    }
}

pub struct Dark {
    options: DarkOptions,
    force: NeighborForce,
    rng: SpawnRng,
    layers: Layers,
    color: Vec3,
    particles: Vec<DarkParticle>,
}

impl Configurable for Dark {
    type Options = DarkOptions;

    fn with_options(options: DarkOptions) -> Self {
        Self {
            force: NeighborForce::from(&options),
            options,
            rng: SpawnRng::from_entropy(),
            layers: Layers::default(),
            color: Vec3::ONE,
            particles: Vec::new(),
        }
    }
}

impl Dark {
    pub fn particles(&self) -> &[DarkParticle] {
        &self.particles
    }
}

impl Simulation for Dark {
    fn name(&self) -> &'static str {
        "dark"
    }

    fn initialize(&mut self, host: &mut Host) -> Result<(), SimulationError> {
        self.teardown(host);
        let o = &self.options;
        if o.radius_max <= 0.0 {
            return Err(SimulationError::init("dark", "radius_max must be positive"));
        }
        let palette = host.palette();
        self.color = palette.primary.lerp(palette.secondary, 0.3);

        let rng = &mut self.rng;
        self.particles = (0..o.count)
            .map(|_| DarkParticle {
                position: rng.point_in_shell(0.0, o.radius_max),
                velocity: rng.in_cube(0.01),
                opacity: o.base_opacity,
            })
            .collect();
        self.layers.attach(host, "dark-matter", o.count);
        Ok(())
    }

    fn advance(&mut self, ctx: &FrameContext) {
        if !self.layers.is_active() {
            return;
        }
        neighbor_force_step(&mut self.particles, &self.force, ctx.dt, &mut self.rng);
    }

    fn teardown(&mut self, host: &mut Host) {
        self.layers.detach_all(host);
        self.particles.clear();
    }

    fn visit_sprites(&self, f: &mut dyn FnMut(&Sprite)) {
        for p in &self.particles {
            f(&Sprite::new(p.position, self.color, self.options.scale).with_opacity(p.opacity));
        }
    }

    fn census(&self) -> Census {
        Census::new().with("particles", self.particles.len())
    }
}
