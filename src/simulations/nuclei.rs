//! Light nuclei shared by the nucleosynthesis and recombination eras.
//!
//! A cloud of free proton and neutron trios plus helium-like tetras, each
//! tetra being four trios at 90° under a rotating frame. Proton trios take
//! the host triad directly; neutrons swap primary and secondary.

use crate::composite::{tetra_inner_axis, SpinCluster, Tetra};
use crate::host::Sprite;
use crate::spawn::SpawnRng;
use crate::visuals::Triad;
use glam::Vec3;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NucleiOptions {
    /// Free trios, split 60/40 between protons and neutrons.
    pub trio_count: usize,
    pub tetra_count: usize,
    pub cloud_radius: f32,
    pub trio_orbit_radius: f32,
    pub trio_spin: f32,
    pub tetra_radius: f32,
    pub tetra_spin: f32,
    /// Spin of the trios inside a tetra, about a fixed shared axis.
    pub inner_spin_min: f32,
    pub inner_spin_max: f32,
    pub trio_scale: f32,
}

impl Default for NucleiOptions {
    fn default() -> Self {
        Self {
            trio_count: 480,
            tetra_count: 120,
            cloud_radius: 10.0,
            trio_orbit_radius: 0.05,
            trio_spin: 10.0,
            tetra_radius: 0.1,
            tetra_spin: 1.0,
            inner_spin_min: 9.0,
            inner_spin_max: 13.0,
            trio_scale: 0.048,
        }
    }
}

impl NucleiOptions {
    /// 60 % of the free trios, rounded down.
    pub fn proton_count(&self) -> usize {
        self.trio_count * 3 / 5
    }

    /// The remaining free trios, so the split always adds up to `trio_count`.
    pub fn neutron_count(&self) -> usize {
        self.trio_count - self.proton_count()
    }

    /// Sprite handles the whole cloud needs.
    pub fn handle_count(&self) -> usize {
        self.trio_count * 3 + self.tetra_count * 12
    }
}

/// A trio spinning in place.
#[derive(Debug, Clone)]
pub struct FreeTrio {
    pub center: Vec3,
    pub cluster: SpinCluster<3>,
    pub colors: [Vec3; 3],
}

impl FreeTrio {
    pub fn members(&self) -> [Vec3; 3] {
        std::array::from_fn(|k| self.center + self.cluster.offsets[k])
    }
}

#[derive(Debug, Clone)]
pub struct Helium {
    pub body: Tetra,
    /// Colors per inner trio; even trios are protons.
    pub colors: [[Vec3; 3]; 4],
}

#[derive(Debug, Clone, Default)]
pub struct Nuclei {
    pub protons: Vec<FreeTrio>,
    pub neutrons: Vec<FreeTrio>,
    pub helium: Vec<Helium>,
    scale: f32,
}

impl Nuclei {
    /// Seed the cloud: free trios in `0..cloud_radius`, tetras in half that.
    pub fn seed(options: &NucleiOptions, primary: Vec3, secondary: Vec3, rng: &mut SpawnRng) -> Self {
        let proton = Triad::hadron(primary, secondary).as_array();
        let neutron = Triad::hadron(secondary, primary).as_array();
        let o = options;

        let free_trio = |colors: [Vec3; 3], rng: &mut SpawnRng| FreeTrio {
            center: rng.point_in_shell(0.0, o.cloud_radius),
            cluster: SpinCluster::flattened(
                o.trio_orbit_radius,
                rng.direction(),
                o.trio_spin * rng.range(0.7, 1.3),
            ),
            colors,
        };
        let protons = (0..o.proton_count()).map(|_| free_trio(proton, rng)).collect();
        let neutrons = (0..o.neutron_count()).map(|_| free_trio(neutron, rng)).collect();

        let helium = (0..o.tetra_count)
            .map(|_| {
                let center = rng.point_in_shell(0.0, o.cloud_radius * 0.5);
                let axis = rng.direction();
                let spin = o.tetra_spin * rng.range(0.6, 1.4);
                let body = Tetra::new(center, axis, o.tetra_radius, spin, |_| {
                    SpinCluster::flattened(
                        o.trio_orbit_radius,
                        tetra_inner_axis(),
                        rng.range(o.inner_spin_min, o.inner_spin_max),
                    )
                });
                let colors = std::array::from_fn(|k| if k % 2 == 0 { proton } else { neutron });
                Helium { body, colors }
            })
            .collect();

        Self {
            protons,
            neutrons,
            helium,
            scale: o.trio_scale,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        for trio in self.protons.iter_mut().chain(&mut self.neutrons) {
            trio.cluster.spin(dt);
        }
        for he in &mut self.helium {
            he.body.advance(dt);
        }
    }

    pub fn clear(&mut self) {
        self.protons.clear();
        self.neutrons.clear();
        self.helium.clear();
    }

    /// Centers of every free trio, protons first.
    pub fn trio_centers(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.protons.iter().chain(&self.neutrons).map(|t| t.center)
    }

    /// Number of free trios.
    pub fn trio_count(&self) -> usize {
        self.protons.len() + self.neutrons.len()
    }

    pub fn sprites(&self, f: &mut dyn FnMut(&Sprite)) {
        for trio in self.protons.iter().chain(&self.neutrons) {
            for (p, c) in trio.members().into_iter().zip(trio.colors) {
                f(&Sprite::new(p, c, self.scale));
            }
        }
        for he in &self.helium {
            for k in 0..4 {
                for (p, c) in he.body.trio_world(k).into_iter().zip(he.colors[k]) {
                    f(&Sprite::new(p, c, self.scale));
                }
            }
        }
    }
}
