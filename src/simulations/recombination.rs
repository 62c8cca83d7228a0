//! Recombination: electrons settle around the light nuclei and light decouples.
//!
//! Every free trio carries one electron (hydrogen) and every tetra two
//! (helium), each on a circle around its host at a pulsing size. Photons
//! stream through from far outside without interacting.

use super::nuclei::{Nuclei, NucleiOptions};
use super::trails::{PhotonStream, StreamOptions};
use crate::error::SimulationError;
use crate::host::{FrameContext, Host, Sprite};
use crate::simulation::{Census, Configurable, Layers, Simulation};
use crate::spawn::{orthonormal_basis, SpawnRng};
use crate::visuals::hex;
use glam::Vec3;
use serde::Deserialize;
use std::f32::consts::FRAC_PI_2;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecombinationOptions {
    pub nuclei: NucleiOptions,
    pub hydrogen_radius: f32,
    pub helium_radius: f32,
    pub electron_scale: f32,
    pub electron_speed: f32,
    pub stream: StreamOptions,
}

impl Default for RecombinationOptions {
    fn default() -> Self {
        Self {
            nuclei: NucleiOptions {
                trio_orbit_radius: 0.04,
                trio_spin: 8.0,
                tetra_radius: 0.08,
                inner_spin_min: 1.2,
                inner_spin_max: 1.2,
                ..Default::default()
            },
            hydrogen_radius: 0.28,
            helium_radius: 0.45,
            electron_scale: 0.04,
            electron_speed: 2.8,
            stream: StreamOptions {
                interval: 0.04,
                speed: 14.0,
                spawn_radius: 22.0,
                die_radius: 24.0,
                lateral_min: 0.35,
                lateral_max: 0.35,
                scale: 0.035,
                trail_capacity: 350,
                trail_fade: 0.1,
            },
        }
    }
}

#[derive(Debug, Clone)]
struct Electron {
    host: Vec3,
    u: Vec3,
    v: Vec3,
    radius: f32,
    phase: f32,
    speed: f32,
    scale: f32,
}

impl Electron {
    fn position(&self) -> Vec3 {
        self.host + self.u * (self.phase.cos() * self.radius) + self.v * (self.phase.sin() * self.radius)
    }
}

pub struct Recombination {
    options: RecombinationOptions,
    rng: SpawnRng,
    layers: Layers,
    nuclei: Nuclei,
    electrons: Vec<Electron>,
    stream: PhotonStream,
}

impl Configurable for Recombination {
    type Options = RecombinationOptions;

    fn with_options(options: RecombinationOptions) -> Self {
        Self {
            stream: PhotonStream::new(options.stream.clone()),
            options,
            rng: SpawnRng::from_entropy(),
            layers: Layers::default(),
            nuclei: Nuclei::default(),
            electrons: Vec::new(),
        }
    }
}

impl Recombination {
    fn electron(&mut self, host: Vec3, radius: f32) -> Electron {
        let rng = &mut self.rng;
        let (u, v) = orthonormal_basis(rng.direction());
        Electron {
            host,
            u,
            v,
            radius: radius * rng.range(0.9, 1.1),
            phase: rng.angle(),
            speed: self.options.electron_speed * rng.range(0.7, 1.4),
            scale: self.options.electron_scale,
        }
    }

    /// Distance of every electron from its host nucleus.
    pub fn electron_radii(&self) -> impl Iterator<Item = f32> + '_ {
        self.electrons.iter().map(|e| e.position().distance(e.host))
    }

    pub fn stream(&self) -> &PhotonStream {
        &self.stream
    }
}

impl Simulation for Recombination {
    fn name(&self) -> &'static str {
        "recombination"
    }

    fn initialize(&mut self, host: &mut Host) -> Result<(), SimulationError> {
        self.teardown(host);
        if self.options.nuclei.cloud_radius <= 0.0 {
            return Err(SimulationError::init("recombination", "cloud_radius must be positive"));
        }
        let palette = host.palette();
        self.nuclei = Nuclei::seed(
            &self.options.nuclei,
            palette.primary,
            palette.secondary,
            &mut self.rng,
        );

        let hydrogen: Vec<Vec3> = self.nuclei.trio_centers().collect();
        let helium: Vec<Vec3> = self.nuclei.helium.iter().map(|h| h.body.center).collect();
        let (h_radius, he_radius) = (self.options.hydrogen_radius, self.options.helium_radius);
        let mut electrons = Vec::with_capacity(hydrogen.len() + helium.len() * 2);
        for center in hydrogen {
            electrons.push(self.electron(center, h_radius));
        }
        for center in helium {
            electrons.push(self.electron(center, he_radius));
            let mut second = self.electron(center, he_radius * 1.05);
            second.phase += FRAC_PI_2;
            electrons.push(second);
        }
        self.electrons = electrons;
        self.stream = PhotonStream::new(self.options.stream.clone());

        self.layers.attach(host, "nuclei", self.options.nuclei.handle_count());
        self.layers.attach(host, "electrons", self.electrons.len());
        self.layers.attach(host, "trails", self.stream.trails().capacity());
        self.layers.attach(host, "photons", 0);
        Ok(())
    }

    fn advance(&mut self, ctx: &FrameContext) {
        if !self.layers.is_active() {
            return;
        }
        let (dt, t) = (ctx.dt, ctx.t);
        self.nuclei.advance(dt);
        let base = self.options.electron_scale;
        for e in &mut self.electrons {
            e.phase += dt * e.speed;
            e.scale = base * (1.0 + (t * 12.0 + e.phase * 1.2).sin() * 0.1);
        }
        self.stream.advance(dt, &mut self.rng, |_, _| {});
    }

    fn teardown(&mut self, host: &mut Host) {
        self.layers.detach_all(host);
        self.nuclei.clear();
        self.electrons.clear();
        self.stream.clear();
    }

    fn visit_sprites(&self, f: &mut dyn FnMut(&Sprite)) {
        self.nuclei.sprites(f);
        let color = hex(0xd8f3ff);
        for e in &self.electrons {
            f(&Sprite::new(e.position(), color, e.scale).with_opacity(0.95));
        }
        self.stream.sprites(f);
    }

    fn census(&self) -> Census {
        Census::new()
            .with("trios", self.nuclei.trio_count())
            .with("tetras", self.nuclei.helium.len())
            .with("electrons", self.electrons.len())
            .with("photons", self.stream.photons().len())
            .with("trail_slots", self.stream.trails().capacity())
    }
}
