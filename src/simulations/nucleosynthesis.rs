//! Nucleosynthesis: the first light nuclei with leptons and photons crossing.
//!
//! Leptons are pushed away from nearby trios, protons more strongly than
//! neutrons:
//!
//! | Trio | Reach | Push |
//! |------|-------|------|
//! | proton | 1.0 | `0.07 * (1 - d)` |
//! | neutron | 0.7 | `0.03 * (0.7 - d)` |
//!
//! Leptons leaving `1.3 * cloud_radius` and photons leaving twice the cloud
//! radius (or outliving their 6-11 s) restart on the cloud sphere.

use super::nuclei::{Nuclei, NucleiOptions};
use crate::error::SimulationError;
use crate::host::{FrameContext, Host, Sprite};
use crate::particle::Mover;
use crate::simulation::{Census, Configurable, Layers, Simulation};
use crate::spawn::SpawnRng;
use crate::visuals::hex;
use glam::Vec3;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NucleosynthesisOptions {
    pub nuclei: NucleiOptions,
    pub lepton_count: usize,
    pub photon_count: usize,
    pub lepton_speed: f32,
    pub photon_speed: f32,
    pub lepton_scale: f32,
    pub photon_scale: f32,
}

impl Default for NucleosynthesisOptions {
    fn default() -> Self {
        Self {
            nuclei: NucleiOptions::default(),
            lepton_count: 240,
            photon_count: 120,
            lepton_speed: 1.2,
            photon_speed: 12.0,
            lepton_scale: 0.035,
            photon_scale: 0.03,
        }
    }
}

/// Velocity change pushing `position` away from `center` within `reach`.
fn repulsion(position: Vec3, center: Vec3, reach: f32, strength: f32, offset: f32) -> Vec3 {
    let d = position.distance(center);
    if d >= reach {
        return Vec3::ZERO;
    }
    (position - center).normalize_or_zero() * (strength * (offset - d))
}

fn photon_life(rng: &mut SpawnRng) -> f32 {
    rng.range(6.0, 11.0)
}

pub struct Nucleosynthesis {
    options: NucleosynthesisOptions,
    rng: SpawnRng,
    layers: Layers,
    nuclei: Nuclei,
    leptons: Vec<Mover>,
    photons: Vec<Mover>,
}

impl Configurable for Nucleosynthesis {
    type Options = NucleosynthesisOptions;

    fn with_options(options: NucleosynthesisOptions) -> Self {
        Self {
            options,
            rng: SpawnRng::from_entropy(),
            layers: Layers::default(),
            nuclei: Nuclei::default(),
            leptons: Vec::new(),
            photons: Vec::new(),
        }
    }
}

impl Nucleosynthesis {
    pub fn nuclei(&self) -> &Nuclei {
        &self.nuclei
    }

    pub fn photons(&self) -> &[Mover] {
        &self.photons
    }
}

impl Simulation for Nucleosynthesis {
    fn name(&self) -> &'static str {
        "nucleosynthesis"
    }

    fn initialize(&mut self, host: &mut Host) -> Result<(), SimulationError> {
        self.teardown(host);
        let o = &self.options;
        if o.nuclei.cloud_radius <= 0.0 {
            return Err(SimulationError::init("nucleosynthesis", "cloud_radius must be positive"));
        }
        let palette = host.palette();
        let rng = &mut self.rng;
        self.nuclei = Nuclei::seed(&o.nuclei, palette.primary, palette.secondary, rng);

        let cloud = o.nuclei.cloud_radius;
        self.leptons = (0..o.lepton_count)
            .map(|_| Mover::new(rng.point_in_shell(0.0, cloud), rng.direction() * o.lepton_speed))
            .collect();
        self.photons = (0..o.photon_count)
            .map(|_| {
                Mover::new(rng.point_in_shell(0.0, cloud), rng.direction() * o.photon_speed)
                    .with_life(photon_life(rng))
            })
            .collect();

        self.layers.attach(host, "nuclei", o.nuclei.handle_count());
        self.layers.attach(host, "leptons", o.lepton_count);
        self.layers.attach(host, "photons", o.photon_count);
        Ok(())
    }

    fn advance(&mut self, ctx: &FrameContext) {
        if !self.layers.is_active() {
            return;
        }
        let dt = ctx.dt;
        let o = &self.options;
        let cloud = o.nuclei.cloud_radius;
        self.nuclei.advance(dt);

        let rng = &mut self.rng;
        for lepton in &mut self.leptons {
            lepton.advance(dt);
            lepton.respawn_if_outside(cloud * 1.3, || {
                (rng.direction() * cloud, rng.direction() * o.lepton_speed)
            });
            for trio in &self.nuclei.protons {
                lepton.velocity += repulsion(lepton.position, trio.center, 1.0, 0.07, 1.0);
            }
            for trio in &self.nuclei.neutrons {
                lepton.velocity += repulsion(lepton.position, trio.center, 0.7, 0.03, 0.7);
            }
        }

        for photon in &mut self.photons {
            photon.advance(dt);
            if !photon.alive || photon.outside_radius(cloud * 2.0) {
                *photon = Mover::new(rng.direction() * cloud, rng.direction() * o.photon_speed)
                    .with_life(photon_life(rng));
            }
        }
    }

    fn teardown(&mut self, host: &mut Host) {
        self.layers.detach_all(host);
        self.nuclei.clear();
        self.leptons.clear();
        self.photons.clear();
    }

    fn visit_sprites(&self, f: &mut dyn FnMut(&Sprite)) {
        let o = &self.options;
        self.nuclei.sprites(f);
        let lepton_color = hex(0xffde59);
        for lepton in &self.leptons {
            f(&Sprite::new(lepton.position, lepton_color, o.lepton_scale));
        }
        for photon in &self.photons {
            f(&Sprite::new(photon.position, Vec3::ONE, o.photon_scale));
        }
    }

    fn census(&self) -> Census {
        Census::new()
            .with("protons", self.nuclei.protons.len())
            .with("neutrons", self.nuclei.neutrons.len())
            .with("tetras", self.nuclei.helium.len())
            .with("leptons", self.leptons.len())
            .with("photons", self.photons.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_counts() {
        let mut host = Host::new();
        let mut sim = Nucleosynthesis::with_defaults();
        sim.initialize(&mut host).unwrap();
        let census = sim.census();
        assert_eq!(census.get("protons"), Some(288));
        assert_eq!(census.get("neutrons"), Some(192));
        assert_eq!(census.get("tetras"), Some(120));
        assert_eq!(census.get("leptons"), Some(240));
        assert_eq!(census.get("photons"), Some(120));
        assert_eq!(host.attached_handles(), 480 * 3 + 120 * 12 + 240 + 120);
    }

    #[test]
    fn test_photons_stay_in_range() {
        let mut host = Host::new();
        let mut sim = Nucleosynthesis::with_options(NucleosynthesisOptions {
            nuclei: NucleiOptions {
                trio_count: 20,
                tetra_count: 4,
                ..Default::default()
            },
            lepton_count: 10,
            ..Default::default()
        });
        sim.initialize(&mut host).unwrap();
        for i in 0..400 {
            sim.advance(&FrameContext::new(1.0 / 30.0, i as f32 / 30.0));
            for p in sim.photons() {
                assert!(p.position.length() <= 20.0 + 1e-3);
                assert!(p.life_or_one() <= 11.0);
            }
        }
    }

    #[test]
    fn test_repulsion_reach() {
        let push = repulsion(Vec3::new(0.5, 0.0, 0.0), Vec3::ZERO, 1.0, 0.07, 1.0);
        assert!((push - Vec3::new(0.035, 0.0, 0.0)).length() < 1e-6);
        assert_eq!(repulsion(Vec3::new(0.8, 0.0, 0.0), Vec3::ZERO, 0.7, 0.03, 0.7), Vec3::ZERO);
    }
}
