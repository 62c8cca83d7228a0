//! White dwarf: a slow asteroid ring around a jetting remnant.

use super::jets::{BipolarJets, JetOptions};
use crate::error::SimulationError;
use crate::host::{FrameContext, Host, Sprite};
use crate::particle::PolarOrbit;
use crate::simulation::{Census, Configurable, Layers, Simulation};
use crate::spawn::SpawnRng;
use crate::visuals::hex;
use glam::Vec3;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WhiteDwarfOptions {
    pub asteroid_count: usize,
    pub radius_min: f32,
    pub radius_max: f32,
    pub speed_min: f32,
    pub speed_max: f32,
    pub jitter: f32,
    pub opacity: f32,
    pub scale: f32,
    pub jets: JetOptions,
}

impl Default for WhiteDwarfOptions {
    fn default() -> Self {
        Self {
            asteroid_count: 500,
            radius_min: 1.7,
            radius_max: 2.7,
            speed_min: 0.15,
            speed_max: 0.3,
            jitter: 0.01,
            opacity: 0.85,
            scale: 0.05,
            jets: JetOptions::default(),
        }
    }
}

pub struct WhiteDwarf {
    options: WhiteDwarfOptions,
    rng: SpawnRng,
    layers: Layers,
    asteroids: Vec<(PolarOrbit, Vec3)>,
    jets: Option<BipolarJets>,
}

impl Configurable for WhiteDwarf {
    type Options = WhiteDwarfOptions;

    fn with_options(options: WhiteDwarfOptions) -> Self {
        Self {
            options,
            rng: SpawnRng::from_entropy(),
            layers: Layers::default(),
            asteroids: Vec::new(),
            jets: None,
        }
    }
}

impl Simulation for WhiteDwarf {
    fn name(&self) -> &'static str {
        "white_dwarf"
    }

    fn initialize(&mut self, host: &mut Host) -> Result<(), SimulationError> {
        self.teardown(host);
        let o = &self.options;
        // Asteroids ignore the era palette and glow white to orange.
        let (white, orange) = (hex(0xffffff), hex(0xff751f));
        let rng = &mut self.rng;
        self.asteroids = (0..o.asteroid_count)
            .map(|_| {
                let color = white.lerp(orange, rng.unit());
                let orbit = PolarOrbit::new(
                    rng.range(o.radius_min, o.radius_max),
                    rng.angle(),
                    rng.range(o.speed_min, o.speed_max),
                );
                (orbit, color)
            })
            .collect();
        let jets = BipolarJets::new(o.jets.clone(), rng);
        self.layers.attach(host, "asteroids", o.asteroid_count);
        self.layers.attach(host, "jets", jets.capacity());
        self.jets = Some(jets);
        Ok(())
    }

    fn advance(&mut self, ctx: &FrameContext) {
        if !self.layers.is_active() {
            return;
        }
        let half = self.options.jitter * 0.5;
        for (orbit, _) in &mut self.asteroids {
            orbit.advance(ctx.dt);
            orbit.y = self.rng.signed(half);
        }
        if let Some(jets) = self.jets.as_mut() {
            jets.advance(ctx.dt, &mut self.rng);
        }
    }

    fn teardown(&mut self, host: &mut Host) {
        self.layers.detach_all(host);
        self.asteroids.clear();
        self.jets = None;
    }

    fn visit_sprites(&self, f: &mut dyn FnMut(&Sprite)) {
        let o = &self.options;
        for (orbit, color) in &self.asteroids {
            f(&Sprite::new(orbit.position(), *color, o.scale).with_opacity(o.opacity));
        }
        if let Some(jets) = &self.jets {
            jets.live().for_each(|s| f(&s));
        }
    }

    fn census(&self) -> Census {
        Census::new()
            .with("asteroids", self.asteroids.len())
            .with("jet_slots", self.jets.as_ref().map_or(0, BipolarJets::capacity))
    }
}
