//! Lifetime and fade configuration for short-lived particles.
//!
//! A [`Lifecycle`] answers two questions for a pooled or burst particle:
//! how long it lives when spawned, and how opaque it is given the life it
//! has left.
//!
//! ```ignore
//! let flash = Lifecycle::new().lifetime(0.15).fade_rate(6.0);
//! let life = flash.spawn_life(&mut rng);
//! sprite.opacity = flash.opacity(slot.life);
//! ```
//!
//! # Presets
//!
//! | Preset | Lifetime | Opacity |
//! |--------|----------|---------|
//! | [`Lifecycle::flash`] | fixed | `life * rate` |
//! | [`Lifecycle::trail`] | fixed | `life / lifetime` |
//! | [`Lifecycle::beam`] | 0.45-0.70 s | `life * 2` |
//! | [`Lifecycle::jet`] | 1.0-2.3 s | `life / lifetime` |

use crate::spawn::SpawnRng;
use std::ops::Range;

/// How opacity follows remaining life.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fade {
    /// Always fully opaque.
    None,
    /// `opacity = life * rate`, clamped to `[0, 1]`.
    Rate(f32),
    /// `opacity = life / lifetime`, using the longest possible lifetime.
    OverLife,
}

/// Lifetime and fade builder.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    lifetime_fixed: Option<f32>,
    /// Random lifetime range (overrides fixed).
    lifetime_range: Option<Range<f32>>,
    fade: Fade,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self {
            lifetime_fixed: Some(1.0),
            lifetime_range: None,
            fade: Fade::None,
        }
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // PRESETS
    // =========================================================================

    /// Brief flash between two nearby particles.
    pub fn flash(lifetime: f32, rate: f32) -> Self {
        Self::new().lifetime(lifetime).fade_rate(rate)
    }

    /// Trail segment that fades linearly over `duration`.
    pub fn trail(duration: f32) -> Self {
        Self::new().lifetime(duration).fade_over_life()
    }

    /// Annihilation beam.
    pub fn beam() -> Self {
        Self::new().lifetime_range(0.45..0.70).fade_rate(2.0)
    }

    /// Polar jet particle.
    pub fn jet() -> Self {
        Self::new().lifetime_range(1.0..2.3).fade_over_life()
    }

    // =========================================================================
    // BUILDER
    // =========================================================================

    pub fn lifetime(mut self, seconds: f32) -> Self {
        self.lifetime_fixed = Some(seconds);
        self.lifetime_range = None;
        self
    }

    pub fn lifetime_range(mut self, range: Range<f32>) -> Self {
        self.lifetime_range = Some(range);
        self
    }

    pub fn fade_rate(mut self, rate: f32) -> Self {
        self.fade = Fade::Rate(rate);
        self
    }

    pub fn fade_over_life(mut self) -> Self {
        self.fade = Fade::OverLife;
        self
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Draw a lifetime for a freshly spawned particle.
    pub fn spawn_life(&self, rng: &mut SpawnRng) -> f32 {
        match &self.lifetime_range {
            Some(range) => rng.range(range.start, range.end),
            None => self.lifetime_fixed.unwrap_or(1.0),
        }
    }

    /// Longest lifetime this configuration can produce.
    pub fn max_lifetime(&self) -> f32 {
        match &self.lifetime_range {
            Some(range) => range.end,
            None => self.lifetime_fixed.unwrap_or(1.0),
        }
    }

    /// Opacity for a particle with `life` seconds left.
    pub fn opacity(&self, life: f32) -> f32 {
        let raw = match self.fade {
            Fade::None => 1.0,
            Fade::Rate(rate) => life * rate,
            Fade::OverLife => {
                let max = self.max_lifetime();
                if max > 0.0 {
                    life / max
                } else {
                    0.0
                }
            }
        };
        raw.clamp(0.0, 1.0)
    }

    pub fn fade(&self) -> Fade {
        self.fade
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flash_opacity() {
        let flash = Lifecycle::flash(0.15, 6.0);
        assert!((flash.opacity(0.15) - 0.9).abs() < 1e-6);
        assert!((flash.opacity(0.05) - 0.3).abs() < 1e-6);
        assert_eq!(flash.opacity(-0.1), 0.0);
    }

    #[test]
    fn test_trail_fades_linearly() {
        let trail = Lifecycle::trail(0.1);
        assert_eq!(trail.opacity(0.1), 1.0);
        assert!((trail.opacity(0.05) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_lifetime_range() {
        let beam = Lifecycle::beam();
        let mut rng = SpawnRng::seeded(5);
        for _ in 0..100 {
            let life = beam.spawn_life(&mut rng);
            assert!((0.45..0.70).contains(&life));
        }
        assert_eq!(beam.max_lifetime(), 0.70);
    }

    #[test]
    fn test_default_is_opaque() {
        let l = Lifecycle::new();
        assert_eq!(l.opacity(0.01), 1.0);
        assert_eq!(l.fade(), Fade::None);
    }
}
