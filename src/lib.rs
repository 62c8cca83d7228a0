//! # erasim - era particle simulations
//!
//! A timeline of cosmological eras, each rendered as a pooled particle
//! effect composited onto one shared host object.
//!
//! erasim keeps the renderer out of the picture: simulations mutate plain
//! motion records and expose them as [`Sprite`]s, and the [`Engine`] drives
//! shared time, the host parameter block and a cross-fade between eras.
//!
//! ## Quick Start
//!
//! ```ignore
//! use erasim::prelude::*;
//!
//! let registry = Registry::builtin();
//! let table = EraTable::builtin();
//! let mut engine = Engine::new();
//! engine.initialize();
//!
//! let mut time = Time::new().with_fixed_delta(1.0 / 60.0);
//! let done = engine.apply_era(table.get(6)?, &registry);
//! while !done.is_complete() {
//!     let (t, dt) = time.update();
//!     engine.advance(dt, t);
//! }
//! println!("{} sprites", engine.sprite_count());
//! ```
//!
//! ## Core Concepts
//!
//! ### Eras
//!
//! An [`EraRecord`] is data: background and host parameters, transform, and
//! an optional simulation reference `{ kind, options }`. The built-in table
//! holds the 18 eras from the Planck epoch to heat death.
//!
//! ### Simulations
//!
//! Every simulation implements [`Simulation`]:
//!
//! ```ignore
//! sim.initialize(&mut host)?;      // build collections, attach layers
//! sim.advance(&ctx);               // once per frame, never fails
//! sim.teardown(&mut host);         // idempotent
//! ```
//!
//! and [`Configurable`], so the [`Registry`] can build it from the era's
//! JSON options.
//!
//! ### Pools and schedules
//!
//! Short-lived visuals (trails, flashes, links, jets) live in fixed
//! [`Pool`]s. An [`Emitter`] decides how many things spawn each frame and a
//! [`Lifecycle`] maps remaining life to opacity.
//!
//! ## Feature Overview
//!
//! | Category | Types |
//! |----------|-------|
//! | Control | [`Engine`], [`TransitionHandle`], [`Time`] |
//! | Data | [`EraRecord`], [`EraTable`], [`ParameterBlock`], [`Palette`] |
//! | Motion | [`PolarOrbit`], [`AxisOrbit`], [`Mover`], [`Composite`], [`Tetra`] |
//! | Spawning | [`SpawnRng`], [`Emitter`], [`BurstSpawner`], [`Pool`] |
//! | Simulations | see [`simulations`] |

pub mod burst;
pub mod composite;
pub mod emitter;
pub mod engine;
pub mod era;
pub mod error;
pub mod host;
pub mod lifecycle;
pub mod palette;
pub mod particle;
pub mod pool;
pub mod registry;
pub mod simulation;
pub mod simulations;
pub mod spawn;
pub mod time;
pub mod uniforms;
pub mod visuals;

pub use bytemuck;
pub use glam::{Quat, Vec3};

pub use burst::{BurstSpawner, CollisionLatch, PendingRemoval};
pub use composite::{Composite, SpinCluster, Tetra};
pub use emitter::Emitter;
pub use engine::{Engine, EngineState, TransitionHandle, ERA_TRANSITION_SECS};
pub use era::{EraRecord, EraTable, SimulationRef};
pub use error::{ConfigError, PaletteError, SimulationError};
pub use host::{FrameContext, Host, HostConfig, LayerId, Sprite, Transform};
pub use lifecycle::Lifecycle;
pub use palette::Palette;
pub use particle::{AxisOrbit, Mover, PolarOrbit};
pub use pool::{ClaimMode, Pool, Slot};
pub use registry::Registry;
pub use simulation::{Census, Configurable, Layers, Simulation};
pub use spawn::SpawnRng;
pub use time::Time;
pub use uniforms::{ParamValue, ParameterBlock};
pub use visuals::{ParticleShape, Triad};

/// Convenient re-exports for driving the engine.
///
/// ```ignore
/// use erasim::prelude::*;
/// ```
///
/// This imports:
/// - [`Engine`] and [`TransitionHandle`] - the host controller
/// - [`Registry`], [`EraTable`], [`EraRecord`] - era data and simulation lookup
/// - [`Simulation`], [`Configurable`] - the simulation contract
/// - [`Host`], [`FrameContext`], [`Sprite`] - what simulations see
/// - [`Time`] - the frame clock
/// - [`Vec3`] - glam vector type
pub mod prelude {
    pub use crate::engine::{Engine, TransitionHandle};
    pub use crate::era::{EraRecord, EraTable};
    pub use crate::host::{FrameContext, Host, Sprite};
    pub use crate::registry::Registry;
    pub use crate::simulation::{Census, Configurable, Simulation};
    pub use crate::time::Time;
    pub use crate::Vec3;
}
