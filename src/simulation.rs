//! The lifecycle contract every era simulation implements.
//!
//! ```text
//!   new(options) ──► initialize(host) ──► advance(ctx) × N ──► teardown(host)
//! ```
//!
//! - `initialize` allocates every visual handle (one or more layers attached
//!   to the host) and seeds motion state.
//! - `advance` mutates only the simulation's own records.
//! - `teardown` detaches every layer and clears every collection.
//!
//! All three must be safe out of order: `teardown` before `initialize` is a
//! no-op, `teardown` twice is a no-op, and `advance` before `initialize`
//! does nothing.
//!
//! # Example
//!
//! ```ignore
//! let mut sim = Hadron::with_options(HadronOptions { trio_count: 500, ..Default::default() });
//! sim.initialize(&mut host)?;
//! sim.advance(&host.frame_context(1.0 / 60.0, 0.0));
//! assert_eq!(sim.census().get("trios"), Some(500));
//! sim.teardown(&mut host);
//! ```

use crate::error::SimulationError;
use crate::host::{FrameContext, Host, Sprite};
use serde::de::DeserializeOwned;

/// A self-contained motion pattern composited onto the host.
pub trait Simulation {
    /// Registry key of this simulation.
    fn name(&self) -> &'static str;

    /// Allocate visual handles and seed motion state.
    ///
    /// On error the simulation must leave nothing attached to `host`.
    fn initialize(&mut self, host: &mut Host) -> Result<(), SimulationError>;

    /// Step the simulation by `ctx.dt` seconds.
    fn advance(&mut self, ctx: &FrameContext);

    /// Release every visual handle. Idempotent.
    fn teardown(&mut self, host: &mut Host);

    /// Call `f` for every visible sprite.
    fn visit_sprites(&self, f: &mut dyn FnMut(&Sprite));

    /// Counts of the simulation's collections, for inspection and tests.
    fn census(&self) -> Census;

    /// Number of visible sprites.
    fn sprite_count(&self) -> usize {
        let mut n = 0;
        self.visit_sprites(&mut |_| n += 1);
        n
    }
}

/// Simulations that can be built from a deserialized options struct.
pub trait Configurable: Sized {
    /// Tuned defaults live in `Default`; every field is optional on the wire.
    type Options: DeserializeOwned + Default;

    fn with_options(options: Self::Options) -> Self;

    fn with_defaults() -> Self {
        Self::with_options(Self::Options::default())
    }
}

/// Labelled collection sizes reported by [`Simulation::census`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Census {
    entries: Vec<(&'static str, usize)>,
}

impl Census {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, label: &'static str, count: usize) -> Self {
        self.entries.push((label, count));
        self
    }

    pub fn get(&self, label: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, c)| *c)
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, c)| c).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        self.entries.iter().copied()
    }
}

/// Layer ids attached by one simulation.
///
/// Non-empty exactly while the simulation is initialized, so teardown can
/// detach them once and report whether there was anything to release.
#[derive(Debug, Clone, Default)]
pub struct Layers {
    ids: Vec<crate::host::LayerId>,
}

impl Layers {
    pub fn attach(&mut self, host: &mut Host, label: &'static str, handles: usize) {
        self.ids.push(host.attach(label, handles));
    }

    /// Detach everything. Returns `false` if nothing was attached.
    pub fn detach_all(&mut self, host: &mut Host) -> bool {
        if self.ids.is_empty() {
            return false;
        }
        for id in self.ids.drain(..) {
            host.detach(id);
        }
        true
    }

    pub fn is_active(&self) -> bool {
        !self.ids.is_empty()
    }
}
