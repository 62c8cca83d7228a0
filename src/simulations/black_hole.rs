//! Black hole: a hot accretion disk with bipolar jets.

use super::jets::{BipolarJets, JetOptions};
use crate::error::SimulationError;
use crate::host::{FrameContext, Host, Sprite};
use crate::particle::PolarOrbit;
use crate::simulation::{Census, Configurable, Layers, Simulation};
use crate::spawn::SpawnRng;
use glam::Vec3;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BlackHoleOptions {
    pub disk_count: usize,
    pub disk_radius_min: f32,
    pub disk_radius_max: f32,
    pub disk_speed_min: f32,
    pub disk_speed_max: f32,
    pub disk_jitter: f32,
    pub disk_scale: f32,
    pub jets: JetOptions,
}

impl Default for BlackHoleOptions {
    fn default() -> Self {
        Self {
            disk_count: 4000,
            disk_radius_min: 0.5,
            disk_radius_max: 3.5,
            disk_speed_min: 1.0,
            disk_speed_max: 2.6,
            disk_jitter: 0.08,
            disk_scale: 0.07,
            jets: JetOptions::default(),
        }
    }
}

pub struct BlackHole {
    options: BlackHoleOptions,
    rng: SpawnRng,
    layers: Layers,
    disk: Vec<(PolarOrbit, Vec3)>,
    jets: Option<BipolarJets>,
}

impl Configurable for BlackHole {
    type Options = BlackHoleOptions;

    fn with_options(options: BlackHoleOptions) -> Self {
        Self {
            options,
            rng: SpawnRng::from_entropy(),
            layers: Layers::default(),
            disk: Vec::new(),
            jets: None,
        }
    }
}

impl BlackHole {
    pub fn live_jets(&self) -> usize {
        self.jets.as_ref().map_or(0, BipolarJets::live_count)
    }
}

impl Simulation for BlackHole {
    fn name(&self) -> &'static str {
        "black_hole"
    }

    fn initialize(&mut self, host: &mut Host) -> Result<(), SimulationError> {
        self.teardown(host);
        let o = &self.options;
        let palette = host.palette();
        let rng = &mut self.rng;
        self.disk = (0..o.disk_count)
            .map(|_| {
                let color = palette.primary.lerp(palette.secondary, rng.unit());
                let orbit = PolarOrbit::new(
                    rng.range(o.disk_radius_min, o.disk_radius_max),
                    rng.angle(),
                    rng.range(o.disk_speed_min, o.disk_speed_max),
                );
                (orbit, color)
            })
            .collect();
        let jets = BipolarJets::new(o.jets.clone(), rng);
        self.layers.attach(host, "accretion-disk", o.disk_count);
        self.layers.attach(host, "jets", jets.capacity());
        self.jets = Some(jets);
        Ok(())
    }

    fn advance(&mut self, ctx: &FrameContext) {
        if !self.layers.is_active() {
            return;
        }
        let half = self.options.disk_jitter * 0.5;
        for (orbit, _) in &mut self.disk {
            orbit.advance(ctx.dt);
            orbit.y = self.rng.signed(half);
        }
        if let Some(jets) = self.jets.as_mut() {
            jets.advance(ctx.dt, &mut self.rng);
        }
    }

    fn teardown(&mut self, host: &mut Host) {
        self.layers.detach_all(host);
        self.disk.clear();
        self.jets = None;
    }

    fn visit_sprites(&self, f: &mut dyn FnMut(&Sprite)) {
        let scale = self.options.disk_scale;
        for (orbit, color) in &self.disk {
            f(&Sprite::new(orbit.position(), *color, scale));
        }
        if let Some(jets) = &self.jets {
            jets.live().for_each(|s| f(&s));
        }
    }

    fn census(&self) -> Census {
        Census::new()
            .with("disk", self.disk.len())
            .with("jet_slots", self.jets.as_ref().map_or(0, BipolarJets::capacity))
    }
}
