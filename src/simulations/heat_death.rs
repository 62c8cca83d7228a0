//! Heat death: sparse embers whirling on a wide shell.
//!
//! Each ember sits on a random radius and rotates about its own random axis.
//! Opacity pulses as `0.75 + sin(4t + φ) * 0.25`.

use crate::error::SimulationError;
use crate::host::{FrameContext, Host, Sprite};
use crate::particle::AxisOrbit;
use crate::simulation::{Census, Configurable, Layers, Simulation};
use crate::spawn::SpawnRng;
use crate::visuals::hex;
use glam::Vec3;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HeatDeathOptions {
    pub count: usize,
    pub radius_min: f32,
    pub radius_max: f32,
    pub speed_min: f32,
    pub speed_max: f32,
    pub pulse_rate: f32,
    pub scale: f32,
}

impl Default for HeatDeathOptions {
    fn default() -> Self {
        Self {
            count: 500,
            radius_min: 6.6,
            radius_max: 36.8,
            speed_min: 0.2,
            speed_max: 10.8,
            pulse_rate: 4.0,
            scale: 0.03,
        }
    }
}

#[derive(Debug, Clone)]
struct Ember {
    orbit: AxisOrbit,
    color: Vec3,
    pulse_offset: f32,
    opacity: f32,
}

pub struct HeatDeath {
    options: HeatDeathOptions,
    rng: SpawnRng,
    layers: Layers,
    embers: Vec<Ember>,
}

impl Configurable for HeatDeath {
    type Options = HeatDeathOptions;

    fn with_options(options: HeatDeathOptions) -> Self {
        Self {
            options,
            rng: SpawnRng::from_entropy(),
            layers: Layers::default(),
            embers: Vec::new(),
        }
    }
}

/// 60 % gold-to-red, 30 % gold-to-orange, the rest plain gold.
fn ember_color(rng: &mut SpawnRng) -> Vec3 {
    let gold = hex(0xffde59);
    let roll = rng.unit();
    if roll < 0.6 {
        gold.lerp(hex(0xff3131), rng.unit() * 0.35)
    } else if roll < 0.9 {
        gold.lerp(hex(0xff751f), rng.unit() * 0.2)
    } else {
        gold
    }
}

impl Simulation for HeatDeath {
    fn name(&self) -> &'static str {
        "heat_death"
    }

    fn initialize(&mut self, host: &mut Host) -> Result<(), SimulationError> {
        self.teardown(host);
        let o = &self.options;
        let rng = &mut self.rng;
        self.embers = (0..o.count)
            .map(|_| {
                let color = ember_color(rng);
                let base = rng.point_on_radius(o.radius_min, o.radius_max);
                let axis = rng.direction();
                Ember {
                    orbit: AxisOrbit::new(base, axis, rng.range(o.speed_min, o.speed_max)),
                    color,
                    pulse_offset: rng.angle(),
                    opacity: 0.9,
                }
            })
            .collect();
        self.layers.attach(host, "embers", o.count);
        Ok(())
    }

    fn advance(&mut self, ctx: &FrameContext) {
        if !self.layers.is_active() {
            return;
        }
        let rate = self.options.pulse_rate;
        for ember in &mut self.embers {
            ember.orbit.advance(ctx.dt);
            ember.opacity = 0.75 + (ctx.t * rate + ember.pulse_offset).sin() * 0.25;
        }
    }

    fn teardown(&mut self, host: &mut Host) {
        self.layers.detach_all(host);
        self.embers.clear();
    }

    fn visit_sprites(&self, f: &mut dyn FnMut(&Sprite)) {
        for ember in &self.embers {
            f(&Sprite::new(ember.orbit.position(), ember.color, self.options.scale)
                .with_opacity(ember.opacity));
        }
    }

    fn census(&self) -> Census {
        Census::new().with("embers", self.embers.len())
    }
}
