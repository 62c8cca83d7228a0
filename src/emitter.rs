//! Spawn schedules.
//!
//! An [`Emitter`] decides *how many* things to spawn this frame. Where and
//! with what velocity is left to the simulation.
//!
//! | Type | Fires |
//! |------|-------|
//! | [`Emitter::Interval`] | once per `period` seconds, catching up on long frames |
//! | [`Emitter::Chance`] | at most once per frame with the given probability |
//!
//! ```ignore
//! let mut photons = Emitter::interval(0.004);
//! for _ in 0..photons.due(dt, &mut rng) {
//!     self.spawn_photon();
//! }
//! ```

use crate::spawn::SpawnRng;

/// Per-frame spawn schedule.
#[derive(Debug, Clone, PartialEq)]
pub enum Emitter {
    /// Fixed period, with an accumulator carrying the remainder between frames.
    Interval {
        /// Seconds between spawns.
        period: f32,
        /// Time accumulated since the last spawn.
        accumulator: f32,
    },
    /// Independent coin flip each frame.
    Chance {
        /// Probability of one spawn per frame.
        probability: f32,
    },
}

impl Emitter {
    pub fn interval(period: f32) -> Self {
        Emitter::Interval {
            period,
            accumulator: 0.0,
        }
    }

    pub fn chance(probability: f32) -> Self {
        Emitter::Chance { probability }
    }

    /// Number of spawns due after `dt` seconds.
    pub fn due(&mut self, dt: f32, rng: &mut SpawnRng) -> u32 {
        match self {
            Emitter::Interval {
                period,
                accumulator,
            } => {
                if *period <= 0.0 {
                    return 0;
                }
                *accumulator += dt;
                let count = (*accumulator / *period).floor();
                *accumulator -= count * *period;
                count as u32
            }
            Emitter::Chance { probability } => u32::from(rng.chance(*probability)),
        }
    }

    /// Forget accumulated time.
    pub fn reset(&mut self) {
        if let Emitter::Interval { accumulator, .. } = self {
            *accumulator = 0.0;
        }
    }
}
