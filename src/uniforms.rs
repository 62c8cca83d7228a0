//! Named shader-style parameters shared by the engine and its host.
//!
//! A [`ParameterBlock`] is an ordered map from name to [`ParamValue`]. The
//! engine keeps two of them, one for the host object and one for the
//! background, and packs them into bytes for an external renderer.
//!
//! # Reconfiguration
//!
//! [`ParameterBlock::reconfigure`] resets every declared default before
//! applying the overrides, so a value set explicitly by one era never leaks
//! into the next:
//!
//! ```ignore
//! let mut host = host_defaults();
//! host.reconfigure(&host_defaults(), &era_a);   // sets u_showPairs = 1
//! host.reconfigure(&host_defaults(), &era_b);   // u_showPairs back to 0
//! ```
//!
//! [`ParameterBlock::merge`] applies overrides without a reset, which is how
//! background parameters behave.

use crate::error::ConfigError;
use crate::visuals::{hex, parse_hex, to_hex};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Elapsed time, written by the engine every frame.
pub const U_TIME: &str = "u_time";
/// Blend factor driven by transitions.
pub const U_MIX: &str = "u_mix";
/// Shared displacement scalar read by simulations.
pub const U_DISP: &str = "u_disp";
pub const U_TINT: &str = "u_tint";
pub const U_EMISSIVE: &str = "u_emissive";
pub const U_SHOW_PLANCK: &str = "u_showPlanck";
pub const U_SHOW_PAIRS: &str = "u_showPairs";
pub const U_SHOW_ORBITS: &str = "u_showOrbits";
pub const U_POINT_DENSITY: &str = "u_pointDensity";
/// Host flag raised while the Planck appendages are shown.
pub const U_PLANCK_GRADIENT: &str = "u_enablePlanckGradient";
/// Palette primary color.
pub const U_COLOR_A: &str = "u_colorA";
/// Palette secondary color.
pub const U_COLOR_B: &str = "u_colorB";
/// Background glow intensity.
pub const U_INTENSITY: &str = "u_intensity";

/// A single parameter value.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "RawParam", into = "RawParam")]
pub enum ParamValue {
    Scalar(f32),
    Color(Vec3),
}

impl ParamValue {
    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            ParamValue::Scalar(v) => Some(*v),
            ParamValue::Color(_) => None,
        }
    }

    pub fn as_color(&self) -> Option<Vec3> {
        match self {
            ParamValue::Color(c) => Some(*c),
            ParamValue::Scalar(_) => None,
        }
    }

    /// Byte size without trailing padding.
    pub fn byte_size(&self) -> usize {
        match self {
            ParamValue::Scalar(_) => 4,
            ParamValue::Color(_) => 12,
        }
    }

    /// Alignment inside a packed buffer (colors align like a `vec3<f32>`).
    pub fn align(&self) -> usize {
        match self {
            ParamValue::Scalar(_) => 4,
            ParamValue::Color(_) => 16,
        }
    }

    pub fn write_bytes(&self, buf: &mut Vec<u8>) {
        match self {
            ParamValue::Scalar(v) => buf.extend_from_slice(bytemuck::bytes_of(v)),
            ParamValue::Color(c) => buf.extend_from_slice(bytemuck::bytes_of(c)),
        }
    }

    /// Interpolate toward `other`. Mismatched kinds snap to `other` at `t >= 0.5`.
    pub fn lerp(&self, other: &ParamValue, t: f32) -> ParamValue {
        match (self, other) {
            (ParamValue::Scalar(a), ParamValue::Scalar(b)) => ParamValue::Scalar(a + (b - a) * t),
            (ParamValue::Color(a), ParamValue::Color(b)) => ParamValue::Color(a.lerp(*b, t)),
            _ if t >= 0.5 => *other,
            _ => *self,
        }
    }
}

impl From<f32> for ParamValue {
    fn from(v: f32) -> Self {
        ParamValue::Scalar(v)
    }
}

impl From<Vec3> for ParamValue {
    fn from(v: Vec3) -> Self {
        ParamValue::Color(v)
    }
}

/// Wire form: a JSON number or a `"#rrggbb"` string.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(untagged)]
enum RawParam {
    Number(f32),
    Text(String),
}

impl TryFrom<RawParam> for ParamValue {
    type Error = ConfigError;

    fn try_from(raw: RawParam) -> Result<Self, Self::Error> {
        match raw {
            RawParam::Number(v) => Ok(ParamValue::Scalar(v)),
            RawParam::Text(s) => parse_hex(&s).map(ParamValue::Color),
        }
    }
}

impl From<ParamValue> for RawParam {
    fn from(value: ParamValue) -> Self {
        match value {
            ParamValue::Scalar(v) => RawParam::Number(v),
            ParamValue::Color(c) => RawParam::Text(to_hex(c)),
        }
    }
}

/// Parameter overrides as they appear in an era record.
pub type ParamMap = BTreeMap<String, ParamValue>;

/// Ordered collection of named parameters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParameterBlock {
    /// Ordered `(name, value)` pairs. Order fixes the packed layout.
    values: Vec<(String, ParamValue)>,
    indices: HashMap<String, usize>,
}

impl ParameterBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or update a value.
    pub fn set<V: Into<ParamValue>>(&mut self, name: &str, value: V) {
        let value = value.into();
        if let Some(&idx) = self.indices.get(name) {
            self.values[idx].1 = value;
        } else {
            let idx = self.values.len();
            self.values.push((name.to_string(), value));
            self.indices.insert(name.to_string(), idx);
        }
    }

    pub fn with<V: Into<ParamValue>>(mut self, name: &str, value: V) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.indices.get(name).map(|&idx| &self.values[idx].1)
    }

    pub fn scalar(&self, name: &str) -> Option<f32> {
        self.get(name).and_then(ParamValue::as_scalar)
    }

    pub fn color(&self, name: &str) -> Option<Vec3> {
        self.get(name).and_then(ParamValue::as_color)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.indices.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Apply overrides on top of the current values.
    pub fn merge<'a, I>(&mut self, overrides: I)
    where
        I: IntoIterator<Item = (&'a String, &'a ParamValue)>,
    {
        for (name, value) in overrides {
            self.set(name, *value);
        }
    }

    /// Reset every declared default, then apply overrides.
    ///
    /// Parameters not declared in `defaults` and not overridden keep their
    /// current value (engine-owned entries such as `u_time`).
    pub fn reconfigure<'a, I>(&mut self, defaults: &ParameterBlock, overrides: I)
    where
        I: IntoIterator<Item = (&'a String, &'a ParamValue)>,
    {
        for (name, value) in defaults.iter() {
            self.set(name, *value);
        }
        self.merge(overrides);
    }

    /// Pack every value into a byte buffer, padded to a multiple of 16.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        for (_, value) in &self.values {
            let align = value.align();
            while buf.len() % align != 0 {
                buf.push(0);
            }
            value.write_bytes(&mut buf);
        }
        while buf.len() % 16 != 0 {
            buf.push(0);
        }
        buf
    }
}

/// Declared defaults for the host object.
pub fn host_defaults() -> ParameterBlock {
    ParameterBlock::new()
        .with(U_DISP, 0.0f32)
        .with(U_TINT, Vec3::ONE)
        .with(U_EMISSIVE, 0.5f32)
        .with(U_SHOW_PLANCK, 0.0f32)
        .with(U_SHOW_PAIRS, 0.0f32)
        .with(U_SHOW_ORBITS, 0.0f32)
        .with(U_POINT_DENSITY, 0.0f32)
        .with(U_COLOR_A, hex(0x000000))
        .with(U_COLOR_B, hex(0xffffff))
}

/// Declared defaults for the background.
pub fn background_defaults() -> ParameterBlock {
    ParameterBlock::new()
        .with(U_TIME, 0.0f32)
        .with(U_INTENSITY, 0.12f32)
}
