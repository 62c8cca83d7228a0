//! Colors and shapes for simulation sprites.
//!
//! Colors are linear `Vec3` triples in `[0, 1]`. Helpers here cover the
//! handful of operations the simulations need:
//!
//! ```ignore
//! let gold = hex(0xffde59);
//! let tinted = offset_hsl(gold, 0.03, 0.08, 0.02);
//! let triad = Triad::hadron(palette.primary, palette.secondary);
//! let c = ColorRamp::planck().sample(radius / 3.0);
//! ```

use crate::error::ConfigError;
use glam::Vec3;

/// Color from a packed `0xRRGGBB` value.
pub fn hex(rgb: u32) -> Vec3 {
    Vec3::new(
        ((rgb >> 16) & 0xff) as f32 / 255.0,
        ((rgb >> 8) & 0xff) as f32 / 255.0,
        (rgb & 0xff) as f32 / 255.0,
    )
}

/// Parse a `#rrggbb` string.
pub fn parse_hex(s: &str) -> Result<Vec3, ConfigError> {
    let digits = s
        .strip_prefix('#')
        .filter(|d| d.len() == 6)
        .ok_or_else(|| ConfigError::InvalidColor(s.to_string()))?;
    u32::from_str_radix(digits, 16)
        .map(hex)
        .map_err(|_| ConfigError::InvalidColor(s.to_string()))
}

/// Format a color as `#rrggbb`.
pub fn to_hex(color: Vec3) -> String {
    let c = (color.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
    format!("#{:02x}{:02x}{:02x}", c.x as u8, c.y as u8, c.z as u8)
}

/// Serde adapter reading a `#rrggbb` string into a color.
pub fn deserialize_hex<'de, D>(deserializer: D) -> Result<Vec3, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = <String as serde::Deserialize>::deserialize(deserializer)?;
    parse_hex(&s).map_err(serde::de::Error::custom)
}

#[inline]
pub fn lerp_color(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a.lerp(b, t)
}

/// RGB to `(hue, saturation, lightness)`, all in `[0, 1]`.
pub fn rgb_to_hsl(c: Vec3) -> (f32, f32, f32) {
    let max = c.max_element();
    let min = c.min_element();
    let l = (max + min) * 0.5;
    if max == min {
        return (0.0, 0.0, l);
    }
    let d = max - min;
    let s = if l <= 0.5 { d / (max + min) } else { d / (2.0 - max - min) };
    let h = if max == c.x {
        (c.y - c.z) / d + if c.y < c.z { 6.0 } else { 0.0 }
    } else if max == c.y {
        (c.z - c.x) / d + 2.0
    } else {
        (c.x - c.y) / d + 4.0
    };
    (h / 6.0, s, l)
}

pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Vec3 {
    if s <= 0.0 {
        return Vec3::splat(l);
    }
    let q = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let channel = |t: f32| {
        let t = t.rem_euclid(1.0);
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * 6.0 * (2.0 / 3.0 - t)
        } else {
            p
        }
    };
    Vec3::new(channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0))
}

/// Shift hue (wrapping), saturation and lightness (clamped).
pub fn offset_hsl(color: Vec3, dh: f32, ds: f32, dl: f32) -> Vec3 {
    let (h, s, l) = rgb_to_hsl(color);
    hsl_to_rgb(
        (h + dh).rem_euclid(1.0),
        (s + ds).clamp(0.0, 1.0),
        (l + dl).clamp(0.0, 1.0),
    )
}

/// The three member colors of a trio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triad {
    pub r: Vec3,
    pub y: Vec3,
    pub b: Vec3,
}

impl Triad {
    /// Fixed red/yellow/blue used when no host palette is available.
    pub fn classic() -> Self {
        Self {
            r: hex(0xff3333),
            y: hex(0xffee33),
            b: hex(0x3366ff),
        }
    }

    /// Triad derived from a two-color palette.
    ///
    /// R is the secondary lifted 12% toward white, Y is the midpoint and B is
    /// the primary.
    pub fn hadron(primary: Vec3, secondary: Vec3) -> Self {
        Self {
            r: secondary.lerp(Vec3::ONE, 0.12),
            y: primary.lerp(secondary, 0.5),
            b: primary,
        }
    }

    #[inline]
    pub fn as_array(&self) -> [Vec3; 3] {
        [self.r, self.y, self.b]
    }
}

/// Piecewise-linear gradient over evenly spaced stops.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRamp {
    stops: Vec<Vec3>,
}

impl ColorRamp {
    pub fn new(stops: Vec<Vec3>) -> Self {
        Self { stops }
    }

    /// Black through indigo, red, orange and gold to white.
    pub fn planck() -> Self {
        Self::new(vec![
            Vec3::ZERO,
            hex(0x1800ad),
            hex(0xff3131),
            hex(0xff751f),
            hex(0xffde59),
            Vec3::ONE,
        ])
    }

    /// Color at `t` in `[0, 1]` (clamped).
    pub fn sample(&self, t: f32) -> Vec3 {
        match self.stops.len() {
            0 => Vec3::ONE,
            1 => self.stops[0],
            n => {
                let scaled = t.clamp(0.0, 1.0) * (n - 1) as f32;
                let i = (scaled.floor() as usize).min(n - 2);
                self.stops[i].lerp(self.stops[i + 1], scaled - i as f32)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }
}

/// Sprite geometry hint for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParticleShape {
    /// Camera-facing point sprite (default).
    #[default]
    Sprite,
    Tetrahedron,
    Cube,
    Octahedron,
    Icosahedron,
}

impl ParticleShape {
    /// The polyhedra used for planck appendages.
    pub const POLYHEDRA: [ParticleShape; 4] = [
        ParticleShape::Tetrahedron,
        ParticleShape::Cube,
        ParticleShape::Octahedron,
        ParticleShape::Icosahedron,
    ];

    pub fn is_mesh(&self) -> bool {
        !matches!(self, ParticleShape::Sprite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-4
    }

    #[test]
    fn test_parse_hex() {
        assert!(close(parse_hex("#ff751f").unwrap(), hex(0xff751f)));
        assert!(close(parse_hex("#FFFFFF").unwrap(), Vec3::ONE));
        assert!(parse_hex("ff751f").is_err());
        assert!(parse_hex("#ff75").is_err());
        assert!(parse_hex("#gg0000").is_err());
    }

    #[test]
    fn test_hex_roundtrip_string() {
        assert_eq!(to_hex(hex(0x1800ad)), "#1800ad");
    }

    #[test]
    fn test_hsl_roundtrip() {
        for c in [hex(0x1800ad), hex(0xff751f), hex(0x222233), Vec3::splat(0.5)] {
            let (h, s, l) = rgb_to_hsl(c);
            assert!(close(hsl_to_rgb(h, s, l), c), "{c:?}");
        }
    }

    #[test]
    fn test_offset_hsl_lightness() {
        let grey = Vec3::splat(0.5);
        let lighter = offset_hsl(grey, 0.0, 0.0, 0.1);
        assert!(close(lighter, Vec3::splat(0.6)));
    }

    #[test]
    fn test_hadron_triad() {
        let a = hex(0x1800ad);
        let b = hex(0xff751f);
        let triad = Triad::hadron(a, b);
        assert_eq!(triad.b, a);
        assert!(close(triad.y, (a + b) * 0.5));
        assert!(close(triad.r, b + (Vec3::ONE - b) * 0.12));
    }

    #[test]
    fn test_ramp_endpoints() {
        let ramp = ColorRamp::planck();
        assert_eq!(ramp.sample(0.0), Vec3::ZERO);
        assert_eq!(ramp.sample(1.0), Vec3::ONE);
        assert_eq!(ramp.sample(2.0), Vec3::ONE);
        assert!(close(ramp.sample(0.2), hex(0x1800ad)));
    }
}
