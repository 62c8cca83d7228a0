//! Declarative era records.
//!
//! An era is static data: display text, background and host parameters, the
//! host transform and an optional reference to a registered simulation. The
//! engine only reads the parameter maps, transform and simulation reference.
//!
//! # JSON format
//!
//! A table is a JSON array of records. Colors are `"#rrggbb"` strings and
//! omitted fields take their defaults:
//!
//! ```json
//! [
//!   {
//!     "id": 6,
//!     "name": "Hadron Era",
//!     "background": { "u_intensity": 0.2 },
//!     "host": { "parameters": { "u_colorA": "#1800ad", "u_colorB": "#ff6633" } },
//!     "scale": 0.5,
//!     "auto_rotate": [0.1, 0.1, 0.1],
//!     "simulation": { "kind": "hadron", "options": { "trio_count": 2000 } }
//!   }
//! ]
//! ```

use crate::error::ConfigError;
use crate::host::{HostConfig, Transform};
use crate::uniforms::{
    ParamMap, ParamValue, U_COLOR_A, U_COLOR_B, U_DISP, U_EMISSIVE, U_INTENSITY, U_POINT_DENSITY,
    U_SHOW_ORBITS, U_SHOW_PAIRS, U_SHOW_PLANCK, U_TINT,
};
use crate::visuals::hex;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Reference to a registered simulation.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SimulationRef {
    /// Registry key.
    pub kind: String,
    /// Simulation-specific options; `null` means all defaults.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub options: serde_json::Value,
}

impl SimulationRef {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            options: serde_json::Value::Null,
        }
    }
}

/// Host section of an era record.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct HostSection {
    pub shader: String,
    pub parameters: ParamMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub palette_image: Option<PathBuf>,
}

fn default_scale() -> f32 {
    1.0
}

/// One era.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EraRecord {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub interval: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub background: ParamMap,
    #[serde(default)]
    pub host: HostSection,
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(default)]
    pub rotation: [f32; 3],
    #[serde(default)]
    pub auto_rotate: [f32; 3],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulation: Option<SimulationRef>,
}

impl EraRecord {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            interval: String::new(),
            description: String::new(),
            background: ParamMap::new(),
            host: HostSection {
                shader: "base".to_string(),
                ..Default::default()
            },
            scale: 1.0,
            rotation: [0.0; 3],
            auto_rotate: [0.0; 3],
            simulation: None,
        }
    }

    pub fn interval(mut self, interval: impl Into<String>) -> Self {
        self.interval = interval.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn background(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.background.insert(name.to_string(), value.into());
        self
    }

    pub fn param(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.host.parameters.insert(name.to_string(), value.into());
        self
    }

    pub fn scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn auto_rotate(mut self, rates: [f32; 3]) -> Self {
        self.auto_rotate = rates;
        self
    }

    pub fn simulation(mut self, kind: &str) -> Self {
        self.simulation = Some(SimulationRef::new(kind));
        self
    }

    pub fn simulation_kind(&self) -> Option<&str> {
        self.simulation.as_ref().map(|s| s.kind.as_str())
    }

    /// Engine input for the host part of this era.
    pub fn host_config(&self) -> HostConfig {
        HostConfig {
            shader: self.host.shader.clone(),
            parameters: self.host.parameters.clone(),
            palette_image: self.host.palette_image.clone(),
            transform: Transform {
                scale: self.scale,
                rotation: Vec3::from_array(self.rotation),
                auto_rotate: Vec3::from_array(self.auto_rotate),
            },
        }
    }
}

/// An ordered list of eras.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct EraTable {
    eras: Vec<EraRecord>,
}

impl EraTable {
    pub fn new(eras: Vec<EraRecord>) -> Self {
        Self { eras }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn get(&self, id: u32) -> Result<&EraRecord, ConfigError> {
        self.eras
            .iter()
            .find(|e| e.id == id)
            .ok_or(ConfigError::UnknownEra(id))
    }

    pub fn len(&self) -> usize {
        self.eras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.eras.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EraRecord> {
        self.eras.iter()
    }

    /// The eighteen built-in eras, from the dimensionless state to heat death.
    pub fn builtin() -> Self {
        let base = |id: u32, name: &str, interval: &str, intensity: f32| {
            EraRecord::new(id, name)
                .interval(interval)
                .background(U_INTENSITY, intensity)
        };
        // Every built-in era spells out the display toggles explicitly.
        let toggles = |era: EraRecord, tint: u32, disp: f32, emissive: f32, show: [f32; 3], density: f32| {
            era.param(U_TINT, hex(tint))
                .param(U_DISP, disp)
                .param(U_EMISSIVE, emissive)
                .param(U_SHOW_PLANCK, show[0])
                .param(U_SHOW_PAIRS, show[1])
                .param(U_SHOW_ORBITS, show[2])
                .param(U_POINT_DENSITY, density)
        };
        let colors = |era: EraRecord, a: u32, b: u32| {
            era.param(U_COLOR_A, hex(a)).param(U_COLOR_B, hex(b))
        };
        let slow = [0.1, 0.1, 0.1];

        let eras = vec![
            toggles(
                base(0, "Non-Era: Dimensionless, Homogeneous State", "No interval, there is no time", 0.0),
                0x000000, 0.0, 1.0, [1.0, 0.0, 0.0], 0.0,
            )
            .description("From nothing."),
            colors(
                toggles(base(1, "Planck Era", "0 - 10⁻⁴³ s", 0.1), 0x000000, 0.0001, 1.0, [1.0, 0.0, 0.0], 0.0),
                0x8c00ff, 0xff3131,
            )
            .description("Spacetime is born from a highly unstable quantum field. Gravity is not yet separate.")
            .scale(0.8)
            .auto_rotate([2.0, 2.0, 2.0])
            .simulation("planck"),
            colors(
                toggles(base(2, "Grand Unification Era", "10⁻⁴³ - 10⁻³⁶ s", 0.2), 0xffffff, 0.0001, 0.0, [1.0, 0.0, 0.0], 0.0),
                0x1800ad, 0xffffff,
            )
            .description("Gravity separates from the other forces. Extreme energy.")
            .scale(0.5)
            .auto_rotate([0.0, 0.1, 0.0])
            .simulation("great_unification"),
            colors(
                toggles(base(3, "Inflationary Era", "~10⁻³⁶ - 10⁻³² s", 0.1), 0xffffff, -0.0001, 0.0, [1.0, 0.0, 0.0], 0.0),
                0xffffff, 0x1800ad,
            )
            .description("Exponential expansion of space. Seeds of the galaxies.")
            .scale(0.5)
            .auto_rotate([0.0, 0.1, 0.0])
            .simulation("inflation"),
            colors(
                toggles(base(4, "Electroweak Era", "10⁻³⁶ - 10⁻¹² s", 0.1), 0x000000, 0.0001, 1.0, [0.0, 1.0, 1.0], 0.0),
                0xff751f, 0x1800ad,
            )
            .description("Matter/antimatter pairs form in a dense plasma.")
            .scale(0.5)
            .auto_rotate([0.1, 2.0, 0.1])
            .simulation("electroweak"),
            colors(
                toggles(base(5, "Quark Era", "10⁻¹² - 10⁻⁶ s", 0.2), 0xffffff, 0.0, 1.0, [0.0; 3], 0.0),
                0xff6633, 0x1800ad,
            )
            .description("A dense soup of quarks and gluons.")
            .scale(0.5)
            .auto_rotate(slow)
            .simulation("quark"),
            colors(
                toggles(base(6, "Hadron Era", "10⁻⁶ - 1 s", 0.2), 0xffffff, 0.0, 1.0, [0.0; 3], 0.0),
                0x1800ad, 0xff6633,
            )
            .description("Protons and neutrons emerge from the primordial soup.")
            .scale(0.5)
            .auto_rotate(slow)
            .simulation("hadron"),
            colors(
                toggles(base(7, "Lepton Era", "1 s - 3 min", 0.2), 0xffffff, 0.0, 1.0, [0.0; 3], 0.0),
                0xff3131, 0xffde59,
            )
            .description("A dense, luminous plasma dominated by electrons and photons.")
            .scale(0.5)
            .auto_rotate(slow)
            .simulation("lepton"),
            colors(
                toggles(base(8, "Primordial Nucleosynthesis", "3 - 20 min", 0.2), 0xffffff, 0.0, 1.0, [0.0; 3], 0.0),
                0x1800ad, 0xff6633,
            )
            .description("Light nuclei form.")
            .scale(0.5)
            .auto_rotate(slow)
            .simulation("nucleosynthesis"),
            colors(
                toggles(base(9, "Photon Era", "20 min - 380 thousand years", 0.1), 0x000000, 0.0, 1.0, [0.0; 3], 0.0),
                0x000000, 0xff6633,
            )
            .description("An opaque plasma.")
            .scale(0.5)
            .auto_rotate(slow)
            .simulation("photon"),
            colors(
                toggles(base(10, "Recombination", "380 thousand years", 0.22), 0x88ccff, 0.0, 1.0, [0.0; 3], 0.002),
                0xff3131, 0xff6633,
            )
            .description("The CMB decouples from matter.")
            .scale(0.5)
            .auto_rotate(slow)
            .simulation("recombination"),
            toggles(
                base(11, "Dark Ages", "380 thousand - 150 million years", 0.1),
                0x222233, 0.0, 1.0, [0.0; 3], 0.01,
            )
            .description("No stars, only cold and tenuous matter.")
            .scale(0.5)
            .auto_rotate(slow)
            .simulation("dark"),
            colors(
                toggles(base(12, "Reionization and First Stars", "150 million - 1 billion years", 0.001), 0xffffff, 0.0001, 1.0, [0.0, 0.0, 1.0], 0.02),
                0xff3131, 0xff751f,
            )
            .description("The first stars (Population III) are born.")
            .scale(0.5)
            .auto_rotate([0.5, 1.0, 0.05])
            .simulation("reionization"),
            colors(
                toggles(base(13, "Galaxy Era", "1 - 10 billion years", 0.0), 0xffffff, 0.001, 3.0, [0.0; 3], 0.0),
                0x8c00ff, 0xff751f,
            )
            .description("Cosmic filaments, galaxies and clusters.")
            .scale(0.1)
            .auto_rotate([0.5, 1.0, 0.3])
            .simulation("galaxy"),
            toggles(
                base(14, "Stelliferous Era", "1 billion - 100 trillion years", 0.0),
                0xffde59, 0.00001, 2.0, [0.0, 0.0, 1.0], 0.0,
            )
            .description("The universe as we know it, and as we are.")
            .scale(1.0)
            .auto_rotate([0.1, 0.1, 0.0])
            .simulation("stellar"),
            colors(
                toggles(base(15, "Degenerate Era", "100 trillion - 10¹⁵ years", 0.1), 0xffffff, 0.00001, 1.0, [0.0; 3], 0.003),
                0x8c00ff, 0xff751f,
            )
            .description("Star formation ceases; white dwarfs dominate.")
            .scale(0.5)
            .auto_rotate([0.5, 1.0, 0.05])
            .simulation("white_dwarf"),
            colors(
                toggles(base(16, "Black Hole Era", "10¹⁵ - 10¹⁰⁰ years", 0.05), 0x000000, 0.0, 1.0, [0.0, 0.0, 0.5], 0.001),
                0xff3131, 0xff751f,
            )
            .description("Slow evaporation; extreme gravitational dominance.")
            .scale(0.6)
            .auto_rotate([0.0, -1.0, -1.0])
            .simulation("black_hole"),
            toggles(
                base(17, "Heat Death", "After 10¹⁰⁰ years", 0.02),
                0x222233, 0.0, 1.0, [0.0; 3], 0.002,
            )
            .description("Absolute thermal equilibrium. Nothing happens.")
            .scale(1.0)
            .auto_rotate([0.0; 3])
            .simulation("heat_death"),
        ];
        Self::new(eras)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table() {
        let table = EraTable::builtin();
        assert_eq!(table.len(), 18);
        for (i, era) in table.iter().enumerate() {
            assert_eq!(era.id, i as u32);
        }
        assert!(table.get(0).unwrap().simulation.is_none());
        assert_eq!(table.get(11).unwrap().simulation_kind(), Some("dark"));
        assert!(matches!(table.get(99), Err(ConfigError::UnknownEra(99))));
    }

    #[test]
    fn test_minimal_record_defaults() {
        let table = EraTable::from_json(r#"[{"id": 3, "name": "x"}]"#).unwrap();
        let era = table.get(3).unwrap();
        assert_eq!(era.scale, 1.0);
        assert!(era.simulation.is_none());
        assert!(era.host.parameters.is_empty());
    }

    #[test]
    fn test_json_roundtrip_builtin() {
        let table = EraTable::builtin();
        let json = table.to_json().unwrap();
        let back = EraTable::from_json(&json).unwrap();
        assert_eq!(back.len(), table.len());
        assert_eq!(back.get(1).unwrap().simulation_kind(), Some("planck"));
        assert_eq!(back.get(1).unwrap().auto_rotate, [2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_host_config_transform() {
        let era = EraRecord::new(1, "p").scale(0.8).auto_rotate([2.0, 2.0, 2.0]);
        let config = era.host_config();
        assert_eq!(config.transform.scale, 0.8);
        assert_eq!(config.transform.auto_rotate, Vec3::splat(2.0));
        assert_eq!(config.shader, "base");
    }
}
