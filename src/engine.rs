//! The host controller.
//!
//! [`Engine`] owns the host object, the background parameters, the active
//! simulation and the cross-fade transition. A single driver calls
//! [`Engine::advance`] once per frame; everything else happens between
//! frames.
//!
//! # States
//!
//! ```text
//!   Idle ──initialize()──► Steady ──configure_host()──► Configuring
//!                            ▲                              │
//!                            │                         transition()
//!                            │                              ▼
//!                            └──── blend reaches target ── Blending
//! ```
//!
//! `dispose()` returns to `Idle` from any state.
//!
//! # Era switch
//!
//! ```ignore
//! let registry = Registry::builtin();
//! let table = EraTable::builtin();
//! let mut engine = Engine::new();
//! engine.initialize();
//!
//! let done = engine.apply_era(table.get(6)?, &registry);
//! while !done.is_complete() {
//!     let (t, dt) = time.update();
//!     engine.advance(dt, t);
//! }
//! ```

use crate::era::EraRecord;
use crate::error::SimulationError;
use crate::host::{Host, HostConfig, Sprite};
use crate::palette::Palette;
use crate::registry::Registry;
use crate::simulation::Simulation;
use crate::uniforms::{
    background_defaults, host_defaults, ParamMap, ParameterBlock, U_COLOR_A, U_COLOR_B, U_MIX,
    U_TIME,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, Waker};

/// Duration of the cross-fade started by [`Engine::apply_era`], in seconds.
pub const ERA_TRANSITION_SECS: f32 = 1.2;

/// Lifecycle state of the [`Engine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Not initialized, or disposed.
    Idle,
    /// Host reconfigured, blend factor reset, waiting for a transition.
    Configuring,
    /// A transition is in flight.
    Blending,
    /// Nothing in flight.
    Steady,
}

/// Cubic ease-out: fast start, gentle landing.
#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let inv = 1.0 - t.clamp(0.0, 1.0);
    1.0 - inv * inv * inv
}

/// One cross-fade of the blend factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blend {
    pub from: f32,
    pub to: f32,
    /// Seconds.
    pub duration: f32,
    pub elapsed: f32,
}

impl Blend {
    pub fn new(from: f32, to: f32, duration: f32) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: 0.0,
        }
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Value at the current elapsed time. Exactly `to` once finished.
    pub fn sample(&self) -> f32 {
        if self.is_finished() {
            return self.to;
        }
        self.from + (self.to - self.from) * ease_out_cubic(self.elapsed / self.duration)
    }

    /// Advance by `dt` seconds and return the new value.
    pub fn step(&mut self, dt: f32) -> f32 {
        self.elapsed += dt.max(0.0);
        self.sample()
    }
}

#[derive(Debug, Default)]
struct Signal {
    complete: bool,
    waker: Option<Waker>,
}

/// Deferred completion of a transition.
///
/// Resolves once the blend reaches its target, or when the engine abandons
/// the transition (reconfigure, dispose). Await it, poll
/// [`is_complete`](Self::is_complete) from the frame loop, or hand it to
/// `pollster::block_on` once the loop has driven it home.
#[derive(Debug, Clone)]
pub struct TransitionHandle {
    signal: Arc<Mutex<Signal>>,
}

impl TransitionHandle {
    fn pending() -> Self {
        Self {
            signal: Arc::new(Mutex::new(Signal::default())),
        }
    }

    /// A handle that has already resolved.
    pub fn completed() -> Self {
        let handle = Self::pending();
        handle.complete();
        handle
    }

    pub fn is_complete(&self) -> bool {
        self.signal.lock().map(|s| s.complete).unwrap_or(true)
    }

    fn complete(&self) {
        let waker = match self.signal.lock() {
            Ok(mut s) => {
                s.complete = true;
                s.waker.take()
            }
            Err(_) => None,
        };
        if let Some(w) = waker {
            w.wake();
        }
    }
}

impl Future for TransitionHandle {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        match self.signal.lock() {
            Ok(mut s) if !s.complete => {
                s.waker = Some(cx.waker().clone());
                Poll::Pending
            }
            _ => Poll::Ready(()),
        }
    }
}

#[derive(Debug)]
struct ActiveTransition {
    blend: Blend,
    handle: TransitionHandle,
}

/// Owns shared render state and the active simulation.
pub struct Engine {
    state: EngineState,
    host: Host,
    background: ParameterBlock,
    simulation: Option<Box<dyn Simulation>>,
    transition: Option<ActiveTransition>,
    elapsed: f32,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("state", &self.state)
            .field("simulation", &self.simulation_name())
            .field("blend", &self.blend_factor())
            .field("elapsed", &self.elapsed)
            .finish()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self {
            state: EngineState::Idle,
            host: Host::new(),
            background: ParameterBlock::new(),
            simulation: None,
            transition: None,
            elapsed: 0.0,
        }
    }

    /// Install default host and background parameters. No-op unless idle.
    pub fn initialize(&mut self) {
        if self.state != EngineState::Idle {
            return;
        }
        let mut params = host_defaults();
        params.set(U_TIME, 0.0f32);
        params.set(U_MIX, 1.0f32);
        *self.host.params_mut() = params;
        self.background = background_defaults();
        self.elapsed = 0.0;
        self.state = EngineState::Steady;
        tracing::info!("engine initialized");
    }

    // ========== Accessors ==========

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn background(&self) -> &ParameterBlock {
        &self.background
    }

    /// Current `u_mix`.
    pub fn blend_factor(&self) -> f32 {
        self.host.params().scalar(U_MIX).unwrap_or(0.0)
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    pub fn simulation(&self) -> Option<&dyn Simulation> {
        self.simulation.as_deref()
    }

    pub fn simulation_name(&self) -> Option<&'static str> {
        self.simulation.as_ref().map(|s| s.name())
    }

    pub fn palette(&self) -> Palette {
        self.host.palette()
    }

    /// Visit every visible sprite of the active simulation.
    pub fn visit_sprites(&self, f: &mut dyn FnMut(&Sprite)) {
        if let Some(sim) = &self.simulation {
            sim.visit_sprites(f);
        }
    }

    pub fn sprite_count(&self) -> usize {
        self.simulation.as_ref().map_or(0, |s| s.sprite_count())
    }

    // ========== Configuration ==========

    /// Merge background parameters over the current ones.
    pub fn configure_background(&mut self, parameters: &ParamMap) {
        self.background.merge(parameters);
    }

    /// Reset the host to defaults plus `config`, and zero the blend factor.
    ///
    /// A transition still in flight is abandoned and its handle resolves.
    pub fn configure_host(&mut self, config: &HostConfig) {
        if self.state == EngineState::Idle {
            tracing::debug!("configure_host ignored while idle");
            return;
        }
        self.abandon_transition();

        let params = self.host.params_mut();
        params.reconfigure(&host_defaults(), &config.parameters);
        if let Some(path) = &config.palette_image {
            let palette = Palette::load_or_default(path);
            params.set(U_COLOR_A, palette.primary);
            params.set(U_COLOR_B, palette.secondary);
        }
        params.set(U_MIX, 0.0f32);

        if !config.shader.is_empty() {
            self.host.set_shader(config.shader.as_str());
        }
        *self.host.transform_mut() = config.transform;
        self.state = EngineState::Configuring;
    }

    /// Replace the active simulation.
    ///
    /// The old simulation is torn down before the new one is initialized. If
    /// initialization fails the engine is left with no active simulation.
    pub fn set_simulation(
        &mut self,
        simulation: Option<Box<dyn Simulation>>,
    ) -> Result<(), SimulationError> {
        if self.state == EngineState::Idle {
            return Err(SimulationError::NotInitialized);
        }
        if let Some(mut old) = self.simulation.take() {
            tracing::debug!(simulation = old.name(), "tearing down simulation");
            old.teardown(&mut self.host);
        }
        let Some(mut sim) = simulation else {
            return Ok(());
        };
        if let Err(e) = sim.initialize(&mut self.host) {
            sim.teardown(&mut self.host);
            return Err(e);
        }
        tracing::debug!(simulation = sim.name(), "simulation initialized");
        self.simulation = Some(sim);
        Ok(())
    }

    /// Ease the blend factor toward `target` over `duration` seconds.
    ///
    /// Only one transition runs at a time; a call while one is in flight
    /// returns an already-complete handle and changes nothing.
    pub fn transition(&mut self, target: f32, duration: f32) -> TransitionHandle {
        if self.state == EngineState::Idle {
            return TransitionHandle::completed();
        }
        if self.transition.is_some() {
            tracing::debug!(target, "transition already running, request ignored");
            return TransitionHandle::completed();
        }
        let from = self.blend_factor();
        let handle = TransitionHandle::pending();
        self.transition = Some(ActiveTransition {
            blend: Blend::new(from, target, duration.max(0.0)),
            handle: handle.clone(),
        });
        self.state = EngineState::Blending;
        handle
    }

    /// Advance shared time, the blend, host rotation and the active simulation.
    pub fn advance(&mut self, dt: f32, t: f32) {
        if self.state == EngineState::Idle {
            return;
        }
        self.elapsed = t;
        self.host.params_mut().set(U_TIME, t);
        self.background.set(U_TIME, t);

        if let Some(active) = self.transition.as_mut() {
            let mix = active.blend.step(dt);
            let finished = active.blend.is_finished();
            self.host.params_mut().set(U_MIX, mix);
            if finished {
                if let Some(done) = self.transition.take() {
                    done.handle.complete();
                }
                self.state = EngineState::Steady;
            }
        }

        self.host.transform_mut().spin(dt);

        let ctx = self.host.frame_context(dt, t);
        if let Some(sim) = self.simulation.as_mut() {
            sim.advance(&ctx);
        }
    }

    /// Run one complete era switch.
    ///
    /// Resolution and initialization failures are logged and leave the
    /// engine with no active simulation; the transition still starts.
    pub fn apply_era(&mut self, era: &EraRecord, registry: &Registry) -> TransitionHandle {
        tracing::info!(
            era = era.id,
            name = %era.name,
            simulation = era.simulation_kind().unwrap_or("none"),
            "applying era"
        );

        if era.background.is_empty() {
            self.configure_background(&background_fallback());
        } else {
            self.configure_background(&era.background);
        }
        self.configure_host(&era.host_config());

        let simulation = match &era.simulation {
            None => None,
            Some(reference) => match registry.create(&reference.kind, &reference.options) {
                Ok(sim) => Some(sim),
                Err(e) => {
                    tracing::warn!(era = era.id, error = %e, "could not resolve simulation");
                    None
                }
            },
        };
        if let Err(e) = self.set_simulation(simulation) {
            tracing::warn!(era = era.id, error = %e, "simulation failed to start");
        }

        self.transition(1.0, ERA_TRANSITION_SECS)
    }

    /// Tear everything down and return to `Idle`.
    pub fn dispose(&mut self) {
        if let Some(mut sim) = self.simulation.take() {
            sim.teardown(&mut self.host);
        }
        self.abandon_transition();
        self.host.clear();
        self.state = EngineState::Idle;
        tracing::info!("engine disposed");
    }

    fn abandon_transition(&mut self) {
        if let Some(active) = self.transition.take() {
            active.handle.complete();
        }
    }
}

fn background_fallback() -> ParamMap {
    background_defaults()
        .iter()
        .filter(|(name, _)| *name != U_TIME)
        .map(|(name, value)| (name.to_string(), *value))
        .collect()
}
