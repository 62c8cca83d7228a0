//! Static registry of simulation constructors.
//!
//! Era records name simulations by key. The registry maps each key to a
//! factory that deserializes the record's options and builds the
//! simulation; nothing is resolved dynamically at runtime.
//!
//! ```ignore
//! let registry = Registry::builtin();
//! let sim = registry.create("dark", &serde_json::json!({ "count": 600 }))?;
//! ```

use crate::error::SimulationError;
use crate::simulation::{Configurable, Simulation};
use crate::simulations::{
    BlackHole, Dark, Electroweak, GalaxyDisk, GreatUnification, HeatDeath, Hadron, Inflation,
    Lepton, Nucleosynthesis, Photon, Planck, Quark, Recombination, Reionization, Stellar,
    WhiteDwarf,
};
use serde_json::Value;
use std::collections::BTreeMap;

/// Builds a simulation from its JSON options.
pub type SimulationFactory = fn(&Value) -> Result<Box<dyn Simulation>, SimulationError>;

/// Deserialize `options` for the simulation registered as `kind`.
///
/// `null` yields the defaults.
pub fn parse_options<O>(kind: &str, options: &Value) -> Result<O, SimulationError>
where
    O: serde::de::DeserializeOwned + Default,
{
    if options.is_null() {
        return Ok(O::default());
    }
    O::deserialize(options).map_err(|source| SimulationError::InvalidOptions {
        kind: kind.to_string(),
        source,
    })
}

/// Factory body shared by every configurable simulation.
pub fn build<S>(kind: &str, options: &Value) -> Result<Box<dyn Simulation>, SimulationError>
where
    S: Configurable + Simulation + 'static,
{
    let options = parse_options::<S::Options>(kind, options)?;
    Ok(Box::new(S::with_options(options)))
}

/// Key-to-factory map.
#[derive(Clone, Default)]
pub struct Registry {
    factories: BTreeMap<&'static str, SimulationFactory>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.factories.keys()).finish()
    }
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every simulation shipped with the crate.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("planck", |o| build::<Planck>("planck", o));
        registry.register("great_unification", |o| {
            build::<GreatUnification>("great_unification", o)
        });
        registry.register("inflation", |o| build::<Inflation>("inflation", o));
        registry.register("electroweak", |o| build::<Electroweak>("electroweak", o));
        registry.register("quark", |o| build::<Quark>("quark", o));
        registry.register("hadron", |o| build::<Hadron>("hadron", o));
        registry.register("lepton", |o| build::<Lepton>("lepton", o));
        registry.register("nucleosynthesis", |o| {
            build::<Nucleosynthesis>("nucleosynthesis", o)
        });
        registry.register("photon", |o| build::<Photon>("photon", o));
        registry.register("recombination", |o| build::<Recombination>("recombination", o));
        registry.register("dark", |o| build::<Dark>("dark", o));
        registry.register("reionization", |o| build::<Reionization>("reionization", o));
        registry.register("galaxy", |o| build::<GalaxyDisk>("galaxy", o));
        registry.register("stellar", |o| build::<Stellar>("stellar", o));
        registry.register("white_dwarf", |o| build::<WhiteDwarf>("white_dwarf", o));
        registry.register("black_hole", |o| build::<BlackHole>("black_hole", o));
        registry.register("heat_death", |o| build::<HeatDeath>("heat_death", o));
        registry
    }

    /// Add or replace a factory.
    pub fn register(&mut self, key: &'static str, factory: SimulationFactory) {
        self.factories.insert(key, factory);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.factories.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.factories.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Build the simulation registered under `key`.
    pub fn create(&self, key: &str, options: &Value) -> Result<Box<dyn Simulation>, SimulationError> {
        let factory = self
            .factories
            .get(key)
            .ok_or_else(|| SimulationError::UnknownSimulation(key.to_string()))?;
        factory(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::era::EraTable;
    use serde_json::json;

    #[test]
    fn test_builtin_covers_era_table() {
        let registry = Registry::builtin();
        assert_eq!(registry.len(), 17);
        for era in EraTable::builtin().iter() {
            if let Some(kind) = era.simulation_kind() {
                assert!(registry.contains(kind), "missing {kind}");
            }
        }
    }

    #[test]
    fn test_unknown_key() {
        let err = Registry::builtin().create("warp", &Value::Null).err().unwrap();
        assert!(matches!(err, SimulationError::UnknownSimulation(k) if k == "warp"));
    }

    #[test]
    fn test_invalid_options() {
        let err = Registry::builtin()
            .create("dark", &json!({ "count": "lots" }))
            .err()
            .unwrap();
        assert!(matches!(err, SimulationError::InvalidOptions { .. }));
    }

    #[test]
    fn test_create_names_match_keys() {
        let registry = Registry::builtin();
        for key in registry.keys() {
            let sim = registry.create(key, &Value::Null).unwrap();
            assert_eq!(sim.name(), key);
        }
    }
}
