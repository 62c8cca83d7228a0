//! Quark epoch: a colored quark-gluon soup bouncing inside a sphere.
//!
//! Quarks and gluons fly in straight lines and reverse when they leave the
//! containment radius. Gluons swap color every few tenths of a second. Any
//! particle may light a short-lived link flash; the link pool is bounded and
//! drops requests when full.

use super::flashes::FlashPool;
use crate::error::SimulationError;
use crate::host::{FrameContext, Host, Sprite};
use crate::lifecycle::Lifecycle;
use crate::particle::Mover;
use crate::simulation::{Census, Configurable, Layers, Simulation};
use crate::spawn::SpawnRng;
use crate::visuals::{hex, Triad};
use glam::Vec3;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QuarkOptions {
    pub count: usize,
    pub radius: f32,
    pub quark_speed: f32,
    pub gluon_count: usize,
    pub gluon_speed: f32,
    pub link_chance: f32,
    /// Gluon link chance relative to `link_chance`.
    pub gluon_link_factor: f32,
    pub link_life: f32,
    pub link_capacity: usize,
}

impl Default for QuarkOptions {
    fn default() -> Self {
        Self {
            count: 2400,
            radius: 6.5,
            quark_speed: 8.0,
            gluon_count: 450,
            gluon_speed: 10.5,
            link_chance: 0.004,
            gluon_link_factor: 0.4,
            link_life: 0.18,
            link_capacity: 80,
        }
    }
}

fn color_charges() -> Triad {
    Triad {
        r: hex(0xff3131),
        y: hex(0xffde59),
        b: hex(0x1800ad),
    }
}

#[derive(Debug, Clone)]
struct QuarkParticle {
    mover: Mover,
    color: Vec3,
    scale: f32,
}

#[derive(Debug, Clone)]
struct Gluon {
    mover: Mover,
    color: Vec3,
    /// Seconds until the next color swap.
    recolor_in: f32,
}

pub struct Quark {
    options: QuarkOptions,
    rng: SpawnRng,
    layers: Layers,
    quarks: Vec<QuarkParticle>,
    gluons: Vec<Gluon>,
    links: Option<FlashPool>,
}

impl Configurable for Quark {
    type Options = QuarkOptions;

    fn with_options(options: QuarkOptions) -> Self {
        Self {
            options,
            rng: SpawnRng::from_entropy(),
            layers: Layers::default(),
            quarks: Vec::new(),
            gluons: Vec::new(),
            links: None,
        }
    }
}

impl Quark {
    pub fn live_links(&self) -> usize {
        self.links.as_ref().map_or(0, FlashPool::live_count)
    }
}

impl Simulation for Quark {
    fn name(&self) -> &'static str {
        "quark"
    }

    fn initialize(&mut self, host: &mut Host) -> Result<(), SimulationError> {
        self.teardown(host);
        let o = &self.options;
        if o.radius <= 0.0 {
            return Err(SimulationError::init("quark", "radius must be positive"));
        }
        let charges = color_charges().as_array();
        let rng = &mut self.rng;
        self.quarks = (0..o.count)
            .map(|_| QuarkParticle {
                color: *rng.pick(&charges),
                mover: Mover::new(
                    rng.point_on_radius(0.0, o.radius * 0.9),
                    rng.in_cube(1.0) * o.quark_speed,
                ),
                scale: rng.range(0.055, 0.085),
            })
            .collect();
        self.gluons = (0..o.gluon_count)
            .map(|_| Gluon {
                mover: Mover::new(
                    rng.point_on_radius(0.0, o.radius),
                    rng.in_cube(1.0) * o.gluon_speed,
                ),
                color: Vec3::ONE,
                recolor_in: rng.range(0.0, 1.2),
            })
            .collect();
        let links = FlashPool::new(o.link_capacity, Lifecycle::flash(o.link_life, 5.0), 0.1);
        self.layers.attach(host, "quarks", o.count);
        self.layers.attach(host, "gluons", o.gluon_count);
        self.layers.attach(host, "links", links.capacity());
        self.links = Some(links);
        Ok(())
    }

    fn advance(&mut self, ctx: &FrameContext) {
        if !self.layers.is_active() {
            return;
        }
        let Some(links) = self.links.as_mut() else {
            return;
        };
        let dt = ctx.dt;
        let o = &self.options;
        let rng = &mut self.rng;

        for q in &mut self.quarks {
            q.mover.advance(dt);
            q.mover.reflect_if_outside(o.radius);
            if rng.chance(o.link_chance) {
                links.spawn(q.mover.position);
            }
        }

        let charges = color_charges().as_array();
        for g in &mut self.gluons {
            g.mover.advance(dt);
            g.mover.reflect_if_outside(o.radius);
            g.recolor_in -= dt;
            if g.recolor_in <= 0.0 {
                g.recolor_in = rng.range(0.15, 0.40);
                g.color = *rng.pick(&charges);
            }
            if rng.chance(o.link_chance * o.gluon_link_factor) {
                links.spawn(g.mover.position);
            }
        }

        links.tick(dt);
    }

    fn teardown(&mut self, host: &mut Host) {
        self.layers.detach_all(host);
        self.quarks.clear();
        self.gluons.clear();
        self.links = None;
    }

    fn visit_sprites(&self, f: &mut dyn FnMut(&Sprite)) {
        for q in &self.quarks {
            f(&Sprite::new(q.mover.position, q.color, q.scale));
        }
        for g in &self.gluons {
            f(&Sprite::new(g.mover.position, g.color, 0.04).with_opacity(0.6));
        }
        if let Some(links) = &self.links {
            links.live().for_each(|s| f(&s));
        }
    }

    fn census(&self) -> Census {
        Census::new()
            .with("quarks", self.quarks.len())
            .with("gluons", self.gluons.len())
            .with("link_slots", self.links.as_ref().map_or(0, FlashPool::capacity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> Quark {
        Quark::with_options(QuarkOptions {
            count: 300,
            gluon_count: 60,
            ..Default::default()
        })
    }

    #[test]
    fn test_counts() {
        let mut host = Host::new();
        let mut sim = small();
        sim.initialize(&mut host).unwrap();
        let census = sim.census();
        assert_eq!(census.get("quarks"), Some(300));
        assert_eq!(census.get("gluons"), Some(60));
        assert_eq!(census.get("link_slots"), Some(80));
    }

    #[test]
    fn test_particles_stay_contained() {
        let mut host = Host::new();
        let mut sim = small();
        sim.initialize(&mut host).unwrap();
        // One step can overshoot by at most |v| * dt before turning around.
        let slack = 10.5 * 3f32.sqrt() / 60.0;
        for i in 0..300 {
            sim.advance(&FrameContext::new(1.0 / 60.0, i as f32 / 60.0));
            for q in &sim.quarks {
                assert!(q.mover.position.length() <= 6.5 + 2.0 * slack);
            }
        }
    }

    #[test]
    fn test_gluons_recolor_from_charges() {
        let mut host = Host::new();
        let mut sim = small();
        sim.initialize(&mut host).unwrap();
        for _ in 0..90 {
            sim.advance(&FrameContext::new(1.0 / 60.0, 0.0));
        }
        let charges = color_charges().as_array();
        assert!(sim.gluons.iter().all(|g| charges.contains(&g.color)));
        assert!(sim.live_links() <= 80);
    }
}
