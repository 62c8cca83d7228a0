//! Motion-state records shared by the simulations.
//!
//! These are plain data: each simulation keeps its own `Vec` of them and
//! mutates them inside its `advance`. None of them own a visual; the owning
//! simulation pairs each record with a [`Sprite`](crate::host::Sprite).
//!
//! - [`PolarOrbit`] - planar circle around the Y axis (galaxy, accretion disk)
//! - [`AxisOrbit`] - an offset rotated about an arbitrary axis (planck, heat death)
//! - [`Mover`] - position + velocity with bound handling (leptons, quarks, jets)

use glam::{Quat, Vec3};

/// Planar orbit in the XZ plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarOrbit {
    pub radius: f32,
    pub angle: f32,
    /// Angular speed in rad/s.
    pub speed: f32,
    /// Height above the orbital plane, usually re-jittered each frame.
    pub y: f32,
}

impl PolarOrbit {
    pub fn new(radius: f32, angle: f32, speed: f32) -> Self {
        Self {
            radius,
            angle,
            speed,
            y: 0.0,
        }
    }

    /// Increment the angle by `speed * dt`.
    #[inline]
    pub fn advance(&mut self, dt: f32) {
        self.angle += self.speed * dt;
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        Vec3::new(
            self.angle.cos() * self.radius,
            self.y,
            self.angle.sin() * self.radius,
        )
    }
}

/// A fixed offset rotated about an arbitrary axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisOrbit {
    /// Offset at angle zero.
    pub base: Vec3,
    /// Normalized rotation axis.
    pub axis: Vec3,
    pub angle: f32,
    pub speed: f32,
}

impl AxisOrbit {
    pub fn new(base: Vec3, axis: Vec3, speed: f32) -> Self {
        Self {
            base,
            axis: axis.try_normalize().unwrap_or(Vec3::Y),
            angle: 0.0,
            speed,
        }
    }

    #[inline]
    pub fn advance(&mut self, dt: f32) {
        self.angle += self.speed * dt;
    }

    #[inline]
    pub fn rotation(&self) -> Quat {
        Quat::from_axis_angle(self.axis, self.angle)
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.rotation() * self.base
    }
}

/// Linear mover with optional lifetime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mover {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Seconds left to live. `None` for immortal particles.
    pub life: Option<f32>,
    pub alive: bool,
}

impl Mover {
    pub fn new(position: Vec3, velocity: Vec3) -> Self {
        Self {
            position,
            velocity,
            life: None,
            alive: true,
        }
    }

    pub fn with_life(mut self, life: f32) -> Self {
        self.life = Some(life);
        self
    }

    /// Add `velocity * dt` to the position and count down life.
    ///
    /// A mover whose life reaches zero is marked dead.
    #[inline]
    pub fn advance(&mut self, dt: f32) {
        self.position += self.velocity * dt;
        if let Some(life) = self.life.as_mut() {
            *life -= dt;
            if *life <= 0.0 {
                self.alive = false;
            }
        }
    }

    #[inline]
    pub fn outside_radius(&self, limit: f32) -> bool {
        self.position.length_squared() > limit * limit
    }

    /// True when any single axis exceeds `limit` in magnitude.
    #[inline]
    pub fn outside_box(&self, limit: f32) -> bool {
        self.position.abs().max_element() > limit
    }

    /// Reset position and velocity from `reseed` when outside `limit`.
    ///
    /// Returns `true` when the mover was re-seeded.
    pub fn respawn_if_outside(
        &mut self,
        limit: f32,
        reseed: impl FnOnce() -> (Vec3, Vec3),
    ) -> bool {
        if !self.outside_radius(limit) {
            return false;
        }
        let (position, velocity) = reseed();
        self.position = position;
        self.velocity = velocity;
        true
    }

    /// Flip the velocity when outside `limit`.
    ///
    /// The position is not corrected, so a mover that overshot turns around
    /// on the next step.
    pub fn reflect_if_outside(&mut self, limit: f32) -> bool {
        if !self.outside_radius(limit) {
            return false;
        }
        self.velocity = -self.velocity;
        true
    }

    /// Life left, or `1.0` for immortal movers.
    #[inline]
    pub fn life_or_one(&self) -> f32 {
        self.life.unwrap_or(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_polar_orbit_quarter_turn() {
        let mut orbit = PolarOrbit::new(2.0, 0.0, FRAC_PI_2);
        orbit.advance(1.0);
        let p = orbit.position();
        assert!(p.x.abs() < 1e-5);
        assert!((p.z - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_axis_orbit_preserves_radius() {
        let mut orbit = AxisOrbit::new(Vec3::new(1.0, 2.0, 0.5), Vec3::new(1.0, 1.0, 0.0), 0.7);
        let r0 = orbit.position().length();
        for _ in 0..50 {
            orbit.advance(0.1);
        }
        assert!((orbit.position().length() - r0).abs() < 1e-4);
    }

    #[test]
    fn test_mover_life() {
        let mut m = Mover::new(Vec3::ZERO, Vec3::X).with_life(0.25);
        m.advance(0.1);
        assert!(m.alive);
        m.advance(0.2);
        assert!(!m.alive);
        assert!((m.position.x - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_respawn_if_outside() {
        let mut m = Mover::new(Vec3::new(9.0, 0.0, 0.0), Vec3::X);
        assert!(m.respawn_if_outside(8.0, || (Vec3::ZERO, Vec3::Y)));
        assert_eq!(m.position, Vec3::ZERO);
        assert_eq!(m.velocity, Vec3::Y);
        assert!(!m.respawn_if_outside(8.0, || unreachable!()));
    }

    #[test]
    fn test_reflect_if_outside() {
        let mut m = Mover::new(Vec3::new(0.0, 7.0, 0.0), Vec3::new(0.0, 2.0, 0.0));
        assert!(m.reflect_if_outside(6.5));
        assert_eq!(m.velocity, Vec3::new(0.0, -2.0, 0.0));
    }

    #[test]
    fn test_outside_box() {
        let m = Mover::new(Vec3::new(0.0, -6.5, 0.0), Vec3::ZERO);
        assert!(m.outside_box(6.0));
        assert!(!m.outside_box(7.0));
    }
}
