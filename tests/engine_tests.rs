//! End-to-end tests for the engine: era switches, transitions and teardown.

use erasim::prelude::*;
use erasim::{EngineState, HostConfig, SimulationError, SimulationRef};
use serde_json::json;
use std::cell::Cell;
use std::rc::Rc;

// ============================================================================
// Counting simulation
// ============================================================================

#[derive(Default)]
struct Counts {
    initialized: Cell<u32>,
    advanced: Cell<u32>,
    torn_down: Cell<u32>,
}

struct CountingSim {
    counts: Rc<Counts>,
    fail: bool,
    layers: erasim::Layers,
}

impl CountingSim {
    fn boxed(counts: &Rc<Counts>) -> Box<dyn Simulation> {
        Box::new(Self {
            counts: Rc::clone(counts),
            fail: false,
            layers: Default::default(),
        })
    }

    fn failing(counts: &Rc<Counts>) -> Box<dyn Simulation> {
        Box::new(Self {
            counts: Rc::clone(counts),
            fail: true,
            layers: Default::default(),
        })
    }
}

impl Simulation for CountingSim {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn initialize(&mut self, host: &mut Host) -> Result<(), SimulationError> {
        self.teardown(host);
        if self.fail {
            return Err(SimulationError::init("counting", "asked to fail"));
        }
        self.counts.initialized.set(self.counts.initialized.get() + 1);
        self.layers.attach(host, "counting", 4);
        Ok(())
    }

    fn advance(&mut self, _ctx: &FrameContext) {
        if self.layers.is_active() {
            self.counts.advanced.set(self.counts.advanced.get() + 1);
        }
    }

    fn teardown(&mut self, host: &mut Host) {
        if self.layers.detach_all(host) {
            self.counts.torn_down.set(self.counts.torn_down.get() + 1);
        }
    }

    fn visit_sprites(&self, f: &mut dyn FnMut(&Sprite)) {
        if self.layers.is_active() {
            for i in 0..4 {
                f(&Sprite::new(Vec3::splat(i as f32), Vec3::ONE, 0.1));
            }
        }
    }

    fn census(&self) -> Census {
        Census::new().with("slots", if self.layers.is_active() { 4 } else { 0 })
    }
}

fn ready_engine() -> Engine {
    let mut engine = Engine::new();
    engine.initialize();
    engine.configure_host(&HostConfig::default());
    engine
}

fn run(engine: &mut Engine, frames: u32, t0: &mut f32) {
    let dt = 1.0 / 60.0;
    for _ in 0..frames {
        *t0 += dt;
        engine.advance(dt, *t0);
    }
}

// ============================================================================
// Simulation swaps
// ============================================================================

#[test]
fn test_swap_mid_transition() {
    let mut engine = ready_engine();
    let (a, b) = (Rc::new(Counts::default()), Rc::new(Counts::default()));
    let mut t = 0.0;

    engine.set_simulation(Some(CountingSim::boxed(&a))).unwrap();
    let handle = engine.transition(1.0, 1.0);
    run(&mut engine, 30, &mut t);
    assert!(!handle.is_complete());
    assert_eq!(a.advanced.get(), 30);

    engine.set_simulation(Some(CountingSim::boxed(&b))).unwrap();
    assert_eq!(a.torn_down.get(), 1);
    assert_eq!(b.initialized.get(), 1);
    assert_eq!(engine.host().layer_count(), 1);

    run(&mut engine, 40, &mut t);
    assert_eq!(a.advanced.get(), 30);
    assert_eq!(b.advanced.get(), 40);
    assert!(handle.is_complete());
    assert_eq!(engine.blend_factor(), 1.0);
    assert_eq!(engine.state(), EngineState::Steady);
}

#[test]
fn test_failed_initialize_leaves_nothing_attached() {
    let mut engine = ready_engine();
    let (a, b) = (Rc::new(Counts::default()), Rc::new(Counts::default()));
    engine.set_simulation(Some(CountingSim::boxed(&a))).unwrap();

    let err = engine.set_simulation(Some(CountingSim::failing(&b))).err();
    assert!(matches!(err, Some(SimulationError::Init { name: "counting", .. })));
    assert_eq!(a.torn_down.get(), 1);
    assert!(engine.simulation().is_none());
    assert_eq!(engine.host().layer_count(), 0);
    assert_eq!(engine.sprite_count(), 0);
}

#[test]
fn test_dispose_tears_down_and_resolves() {
    let mut engine = ready_engine();
    let counts = Rc::new(Counts::default());
    engine.set_simulation(Some(CountingSim::boxed(&counts))).unwrap();
    let handle = engine.transition(1.0, 5.0);
    engine.dispose();
    assert!(handle.is_complete());
    assert_eq!(counts.torn_down.get(), 1);
    assert_eq!(engine.state(), EngineState::Idle);

    // Advancing an idle engine does nothing.
    engine.advance(0.016, 0.016);
    assert_eq!(counts.advanced.get(), 0);
}

// ============================================================================
// Era switches
// ============================================================================

fn small_era(id: u32, kind: &str, options: serde_json::Value) -> EraRecord {
    let mut era = EraRecord::new(id, format!("test {kind}"));
    era.simulation = Some(SimulationRef {
        kind: kind.to_string(),
        options,
    });
    era
}

#[test]
fn test_apply_era_runs_simulation_and_blend() {
    let registry = Registry::builtin();
    let mut engine = Engine::new();
    engine.initialize();
    let era = small_era(6, "hadron", json!({ "trio_count": 50 }));

    let handle = engine.apply_era(&era, &registry);
    assert_eq!(engine.blend_factor(), 0.0);
    assert_eq!(engine.simulation_name(), Some("hadron"));
    assert_eq!(engine.sprite_count(), 150);

    let mut t = 0.0;
    let mut frames = 0;
    while !handle.is_complete() && frames < 200 {
        run(&mut engine, 1, &mut t);
        frames += 1;
    }
    assert!(handle.is_complete());
    assert!((70..=74).contains(&frames), "blend took {frames} frames");
    assert_eq!(engine.blend_factor(), 1.0);
    pollster::block_on(handle);
}

#[test]
fn test_apply_era_with_unknown_simulation() {
    let registry = Registry::builtin();
    let mut engine = Engine::new();
    engine.initialize();
    engine.apply_era(&small_era(3, "inflation", json!({ "layers": 4, "per_layer": 10 })), &registry);
    assert_eq!(engine.simulation_name(), Some("inflation"));

    let handle = engine.apply_era(&small_era(4, "warp_drive", serde_json::Value::Null), &registry);
    assert!(engine.simulation().is_none());
    assert_eq!(engine.host().layer_count(), 0);
    assert!(!handle.is_complete());
}

#[test]
fn test_walk_builtin_timeline() {
    let registry = Registry::builtin();
    let table = EraTable::builtin();
    let mut engine = Engine::new();
    engine.initialize();
    let mut t = 0.0;

    for era in table.iter() {
        let handle = engine.apply_era(era, &registry);
        run(&mut engine, 3, &mut t);
        assert_eq!(engine.simulation_name(), era.simulation_kind());
        if era.simulation_kind().is_some() {
            assert!(engine.host().layer_count() > 0, "era {} attached nothing", era.id);
        }
        drop(handle);
    }
    engine.dispose();
    assert_eq!(engine.host().layer_count(), 0);
}
