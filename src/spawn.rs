//! Random sampling helpers for seeding and respawning particles.
//!
//! Every simulation owns one [`SpawnRng`]. Instead of hand-rolling spherical
//! coordinates in each simulation, use the helpers here:
//!
//! ```ignore
//! let mut rng = SpawnRng::from_entropy();
//! let center = rng.point_in_shell(0.8, 6.0);   // uniform volume density
//! let heading = rng.direction();               // unit vector
//! let (u, v) = orthonormal_basis(heading);     // plane perpendicular to heading
//! ```
//!
//! # Shell sampling
//!
//! [`SpawnRng::point_in_shell`] draws the radius with the inverse cube-root
//! law and the polar angle with `acos(2u - 1)`, so the cloud has uniform
//! density per unit volume. Naive `(r, theta, phi)` sampling piles points up
//! at the poles and near the center.

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::{PI, TAU};

/// Seedable random source with spawn helpers.
#[derive(Debug, Clone)]
pub struct SpawnRng {
    rng: SmallRng,
}

impl SpawnRng {
    /// Create a generator seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    /// Create a reproducible generator.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    // ========== Random primitives ==========

    /// Random f32 in `[0, 1)`.
    #[inline]
    pub fn unit(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in `[min, max)`. Degenerate ranges return `min`.
    #[inline]
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.unit()
    }

    /// Random f32 in `[-half, half)`.
    #[inline]
    pub fn signed(&mut self, half: f32) -> f32 {
        (self.unit() - 0.5) * 2.0 * half
    }

    /// Returns `true` with the given probability.
    #[inline]
    pub fn chance(&mut self, probability: f32) -> bool {
        self.unit() < probability
    }

    /// Random index in `0..len`. `len` must be non-zero.
    #[inline]
    pub fn index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    /// Random angle in `[0, 2π)`.
    #[inline]
    pub fn angle(&mut self) -> f32 {
        self.unit() * TAU
    }

    // ========== Position helpers ==========

    /// Unit vector built from three independent uniform components.
    pub fn direction(&mut self) -> Vec3 {
        Vec3::new(self.signed(1.0), self.signed(1.0), self.signed(1.0))
            .try_normalize()
            .unwrap_or(Vec3::Y)
    }

    /// Vector with each component uniform in `[-half, half)`.
    pub fn in_cube(&mut self, half: f32) -> Vec3 {
        Vec3::new(self.signed(half), self.signed(half), self.signed(half))
    }

    /// Uniform-volume point in the spherical shell between `r_min` and `r_max`.
    pub fn point_in_shell(&mut self, r_min: f32, r_max: f32) -> Vec3 {
        let u = self.unit();
        let inner = r_min.powi(3);
        let r = (u * (r_max.powi(3) - inner) + inner).cbrt();
        let theta = (2.0 * self.unit() - 1.0).clamp(-1.0, 1.0).acos();
        let phi = self.angle();
        let sin_t = theta.sin();
        Vec3::new(phi.cos() * sin_t, theta.cos(), phi.sin() * sin_t) * r
    }

    /// Point on a random direction at a radius drawn uniformly from `[r_min, r_max)`.
    ///
    /// Used for sprites placed on thin shells where volumetric density does
    /// not matter (nebula halos, far orbiters).
    pub fn point_on_radius(&mut self, r_min: f32, r_max: f32) -> Vec3 {
        let r = self.range(r_min, r_max);
        self.direction() * r
    }

    /// Choose one element of a non-empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.index(items.len())]
    }
}

impl Default for SpawnRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

/// Two unit vectors spanning the plane perpendicular to `axis`.
pub fn orthonormal_basis(axis: Vec3) -> (Vec3, Vec3) {
    let axis = axis.try_normalize().unwrap_or(Vec3::Y);
    let seed = if axis.x.abs() < 0.9 { Vec3::X } else { Vec3::Y };
    let u = seed.cross(axis).normalize();
    let v = axis.cross(u).normalize();
    (u, v)
}

/// `n` near-evenly spaced directions on the unit sphere (golden-angle spiral).
pub fn fibonacci_sphere(n: usize) -> Vec<Vec3> {
    let golden = PI * (3.0 - 5.0_f32.sqrt());
    (0..n)
        .map(|i| {
            let t = if n == 1 {
                0.5
            } else {
                i as f32 / (n - 1) as f32
            };
            let y = 1.0 - 2.0 * t;
            let r = (1.0 - y * y).max(0.0).sqrt();
            let theta = golden * i as f32;
            Vec3::new(theta.cos() * r, y, theta.sin() * r)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_in_shell_bounds() {
        let mut rng = SpawnRng::seeded(7);
        for _ in 0..1000 {
            let p = rng.point_in_shell(0.8, 6.0);
            let r = p.length();
            assert!(r >= 0.8 - 1e-4 && r <= 6.0 + 1e-4, "radius {r} out of shell");
        }
    }

    #[test]
    fn test_shell_sampling_is_volumetric() {
        // For a full ball, P(r < R/2) is 1/8 under the volume law and 1/2
        // under a uniform-radius law.
        let mut rng = SpawnRng::seeded(11);
        let n = 20_000;
        let inner = (0..n)
            .filter(|_| rng.point_in_shell(0.0, 1.0).length() < 0.5)
            .count();
        let fraction = inner as f32 / n as f32;
        assert!((fraction - 0.125).abs() < 0.02, "fraction {fraction}");
    }

    #[test]
    fn test_direction_is_unit() {
        let mut rng = SpawnRng::seeded(3);
        for _ in 0..100 {
            assert!((rng.direction().length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_orthonormal_basis() {
        for axis in [Vec3::X, Vec3::Y, Vec3::new(0.3, -0.4, 0.8)] {
            let (u, v) = orthonormal_basis(axis);
            let a = axis.normalize();
            assert!(u.dot(a).abs() < 1e-5);
            assert!(v.dot(a).abs() < 1e-5);
            assert!(u.dot(v).abs() < 1e-5);
            assert!((u.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_fibonacci_sphere() {
        let dirs = fibonacci_sphere(200);
        assert_eq!(dirs.len(), 200);
        assert!((dirs[0].y - 1.0).abs() < 1e-5);
        assert!((dirs[199].y + 1.0).abs() < 1e-5);
        assert_eq!(fibonacci_sphere(1).len(), 1);
        assert!(fibonacci_sphere(0).is_empty());
    }

    #[test]
    fn test_degenerate_range() {
        let mut rng = SpawnRng::seeded(1);
        assert_eq!(rng.range(2.0, 2.0), 2.0);
    }
}
