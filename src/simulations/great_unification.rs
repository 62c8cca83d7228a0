//! Grand unification: nested Fibonacci shells breathing in unison.
//!
//! `layers` shells are spaced evenly between `radius_min` and `radius_max`,
//! each holding `per_layer` golden-spiral directions. Every shell's radius
//! is scaled by `1 + sin(t * pulse_speed) * pulse_amp`, and any sprite may
//! light a flash with `flash_chance` per frame.

use super::flashes::FlashPool;
use crate::error::SimulationError;
use crate::host::{FrameContext, Host, Sprite};
use crate::lifecycle::Lifecycle;
use crate::simulation::{Census, Configurable, Layers, Simulation};
use crate::spawn::{fibonacci_sphere, SpawnRng};
use glam::Vec3;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GreatUnificationOptions {
    pub layers: usize,
    pub per_layer: usize,
    pub radius_min: f32,
    pub radius_max: f32,
    pub pulse_speed: f32,
    pub pulse_amp: f32,
    pub flash_chance: f32,
    pub flash_capacity: usize,
}

impl Default for GreatUnificationOptions {
    fn default() -> Self {
        Self {
            layers: 64,
            per_layer: 200,
            radius_min: 1.2,
            radius_max: 30.0,
            pulse_speed: 10.0,
            pulse_amp: 0.04,
            flash_chance: 0.004,
            flash_capacity: 40,
        }
    }
}

#[derive(Debug, Clone)]
struct ShellPoint {
    dir: Vec3,
    base_radius: f32,
    radius: f32,
    color: Vec3,
}

impl ShellPoint {
    fn position(&self) -> Vec3 {
        self.dir * self.radius
    }
}

pub struct GreatUnification {
    options: GreatUnificationOptions,
    rng: SpawnRng,
    layers: Layers,
    points: Vec<ShellPoint>,
    flashes: Option<FlashPool>,
}

impl Configurable for GreatUnification {
    type Options = GreatUnificationOptions;

    fn with_options(options: GreatUnificationOptions) -> Self {
        Self {
            options,
            rng: SpawnRng::from_entropy(),
            layers: Layers::default(),
            points: Vec::new(),
            flashes: None,
        }
    }
}

/// Fraction of the way from the first shell to the last.
pub(crate) fn layer_fraction(layer: usize, layers: usize) -> f32 {
    if layers <= 1 {
        0.0
    } else {
        layer as f32 / (layers - 1) as f32
    }
}

impl Simulation for GreatUnification {
    fn name(&self) -> &'static str {
        "great_unification"
    }

    fn initialize(&mut self, host: &mut Host) -> Result<(), SimulationError> {
        self.teardown(host);
        let o = &self.options;
        if o.radius_max <= o.radius_min {
            return Err(SimulationError::init(
                "great_unification",
                "radius_max must exceed radius_min",
            ));
        }
        let palette = host.palette();
        let dirs = fibonacci_sphere(o.per_layer);
        self.points = (0..o.layers)
            .flat_map(|layer| {
                let frac = layer_fraction(layer, o.layers);
                let radius = o.radius_min + (o.radius_max - o.radius_min) * frac;
                let color = palette.primary.lerp(palette.secondary, frac);
                dirs.iter().map(move |&dir| ShellPoint {
                    dir,
                    base_radius: radius,
                    radius,
                    color,
                })
            })
            .collect();
        let flashes = FlashPool::new(o.flash_capacity, Lifecycle::flash(0.15, 6.0), 0.08);
        self.layers.attach(host, "shells", self.points.len());
        self.layers.attach(host, "flashes", flashes.capacity());
        self.flashes = Some(flashes);
        Ok(())
    }

    fn advance(&mut self, ctx: &FrameContext) {
        if !self.layers.is_active() {
            return;
        }
        let Some(flashes) = self.flashes.as_mut() else {
            return;
        };
        let o = &self.options;
        let pulse = 1.0 + (ctx.t * o.pulse_speed).sin() * o.pulse_amp;
        for point in &mut self.points {
            point.radius = point.base_radius * pulse;
            if self.rng.chance(o.flash_chance) {
                flashes.spawn(point.position());
            }
        }
        flashes.tick(ctx.dt);
    }

    fn teardown(&mut self, host: &mut Host) {
        self.layers.detach_all(host);
        self.points.clear();
        self.flashes = None;
    }

    fn visit_sprites(&self, f: &mut dyn FnMut(&Sprite)) {
        for point in &self.points {
            f(&Sprite::new(point.position(), point.color, 0.065).with_opacity(0.88));
        }
        if let Some(flashes) = &self.flashes {
            flashes.live().for_each(|s| f(&s));
        }
    }

    fn census(&self) -> Census {
        Census::new()
            .with("points", self.points.len())
            .with("flash_slots", self.flashes.as_ref().map_or(0, FlashPool::capacity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> GreatUnification {
        GreatUnification::with_options(GreatUnificationOptions {
            layers: 8,
            per_layer: 50,
            ..Default::default()
        })
    }

    #[test]
    fn test_shell_counts() {
        let mut host = Host::new();
        let mut sim = small();
        sim.initialize(&mut host).unwrap();
        assert_eq!(sim.census().get("points"), Some(400));
        assert_eq!(sim.census().get("flash_slots"), Some(40));
    }

    #[test]
    fn test_pulse_scales_every_shell() {
        let mut host = Host::new();
        let mut sim = small();
        sim.initialize(&mut host).unwrap();
        let t = std::f32::consts::FRAC_PI_2 / 10.0;
        sim.advance(&FrameContext::new(0.016, t));
        for p in &sim.points {
            assert!((p.position().length() - p.base_radius * 1.04).abs() < 1e-3);
        }
    }

    #[test]
    fn test_flash_pool_never_overflows() {
        let mut host = Host::new();
        let mut sim = GreatUnification::with_options(GreatUnificationOptions {
            layers: 4,
            per_layer: 100,
            flash_chance: 1.0,
            flash_capacity: 5,
            ..Default::default()
        });
        sim.initialize(&mut host).unwrap();
        sim.advance(&FrameContext::new(0.01, 0.0));
        assert_eq!(sim.sprite_count(), 400 + 5);
    }

    #[test]
    fn test_layer_fraction_single_layer() {
        assert_eq!(layer_fraction(0, 1), 0.0);
        assert_eq!(layer_fraction(3, 4), 1.0);
    }
}
