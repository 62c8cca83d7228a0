//! Composite bodies: fixed groups of particles orbiting a shared center.
//!
//! Three shapes cover every trio-based simulation:
//!
//! - [`Composite`] - `N` members on a circle spanned by an orthonormal basis
//!   `(u, v)` around `axis`. Members share one phase and sit at fixed
//!   `k * 2π / N` offsets from it, so the spacing between them can never drift.
//! - [`SpinCluster`] - `N` arbitrary local offsets spun together by a single
//!   axis-angle quaternion per frame.
//! - [`Tetra`] - four spin clusters placed at 90° around a rotating frame.
//!   The outer frame and the inner clusters rotate independently, giving two
//!   levels of spin.
//!
//! In all three the center is authoritative: member world positions are
//! recomputed from it every frame.

use crate::spawn::orthonormal_basis;
use glam::{Quat, Vec3};
use std::f32::consts::TAU;

/// `N` members evenly spaced on a circle around a drifting center.
#[derive(Debug, Clone, PartialEq)]
pub struct Composite<const N: usize> {
    pub center: Vec3,
    /// Linear drift of the center per second.
    pub drift: Vec3,
    pub axis: Vec3,
    pub u: Vec3,
    pub v: Vec3,
    /// Radius the body was created with.
    pub base_inner: f32,
    /// Current radius before per-frame breathing.
    pub inner_radius: f32,
    /// Angular speed in rad/s before modulation.
    pub spin_speed: f32,
    /// Phase of member 0.
    pub phase: f32,
    /// Per-body random offset used to desynchronize wobbles.
    pub wobble: f32,
}

impl<const N: usize> Composite<N> {
    /// Phase gap between consecutive members.
    pub const SPACING: f32 = TAU / N as f32;

    pub fn new(center: Vec3, axis: Vec3, inner_radius: f32, spin_speed: f32, phase: f32) -> Self {
        let axis = axis.try_normalize().unwrap_or(Vec3::Y);
        let (u, v) = orthonormal_basis(axis);
        Self {
            center,
            drift: Vec3::ZERO,
            axis,
            u,
            v,
            base_inner: inner_radius,
            inner_radius,
            spin_speed,
            phase,
            wobble: 0.0,
        }
    }

    pub fn with_drift(mut self, drift: Vec3) -> Self {
        self.drift = drift;
        self
    }

    pub fn with_wobble(mut self, wobble: f32) -> Self {
        self.wobble = wobble;
        self
    }

    /// Advance the shared phase by `dt * spin_speed * modulation`.
    #[inline]
    pub fn advance_phase(&mut self, dt: f32, modulation: f32) {
        self.phase = (self.phase + dt * self.spin_speed * modulation) % TAU;
    }

    /// Move the center along its drift.
    #[inline]
    pub fn advance_center(&mut self, dt: f32) {
        self.center += self.drift * dt;
    }

    #[inline]
    pub fn member_phase(&self, k: usize) -> f32 {
        self.phase + k as f32 * Self::SPACING
    }

    pub fn phases(&self) -> [f32; N] {
        std::array::from_fn(|k| self.member_phase(k))
    }

    /// Offset of member `k` from the center at the given radius.
    #[inline]
    pub fn member_offset(&self, k: usize, radius: f32) -> Vec3 {
        let a = self.member_phase(k);
        self.u * (a.cos() * radius) + self.v * (a.sin() * radius)
    }

    /// World positions of all members at the given radius.
    pub fn member_positions(&self, radius: f32) -> [Vec3; N] {
        std::array::from_fn(|k| self.center + self.member_offset(k, radius))
    }
}

/// `N` local offsets spun together about one axis.
#[derive(Debug, Clone, PartialEq)]
pub struct SpinCluster<const N: usize> {
    pub offsets: [Vec3; N],
    pub axis: Vec3,
    pub spin_speed: f32,
}

impl<const N: usize> SpinCluster<N> {
    pub fn from_offsets(offsets: [Vec3; N], axis: Vec3, spin_speed: f32) -> Self {
        Self {
            offsets,
            axis: axis.try_normalize().unwrap_or(Vec3::Y),
            spin_speed,
        }
    }

    /// Members at `k * 2π / N` on a tilted, flattened ring of the given radius.
    pub fn flattened(radius: f32, axis: Vec3, spin_speed: f32) -> Self {
        let offsets = std::array::from_fn(|k| {
            let a = k as f32 / N as f32 * TAU;
            Vec3::new(
                a.cos() * radius,
                a.sin() * radius * 0.6,
                (a + 0.3).sin() * radius * 0.3,
            )
        });
        Self::from_offsets(offsets, axis, spin_speed)
    }

    /// Rotate every offset by `spin_speed * dt` about the axis.
    pub fn spin(&mut self, dt: f32) {
        let q = Quat::from_axis_angle(self.axis, self.spin_speed * dt);
        for offset in &mut self.offsets {
            *offset = q * *offset;
        }
    }

    /// World positions under `frame`, placed at `origin`.
    pub fn world(&self, origin: Vec3, frame: Quat) -> [Vec3; N] {
        std::array::from_fn(|k| origin + frame * self.offsets[k])
    }
}

/// Fixed inner spin axis shared by every cluster inside a tetra.
pub fn tetra_inner_axis() -> Vec3 {
    Vec3::new(0.3, 0.7, 0.2).normalize()
}

/// Four trios at 90° around a rotating frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Tetra {
    pub center: Vec3,
    /// Accumulated outer rotation.
    pub frame: Quat,
    pub spin_axis: Vec3,
    pub spin_speed: f32,
    /// Local position of each trio inside the frame.
    pub anchors: [Vec3; 4],
    pub trios: [SpinCluster<3>; 4],
}

impl Tetra {
    /// Build a tetra whose anchors lie on the circle of `radius` perpendicular to `spin_axis`.
    pub fn new(
        center: Vec3,
        spin_axis: Vec3,
        radius: f32,
        spin_speed: f32,
        mut make_trio: impl FnMut(usize) -> SpinCluster<3>,
    ) -> Self {
        let spin_axis = spin_axis.try_normalize().unwrap_or(Vec3::Y);
        let (u, v) = orthonormal_basis(spin_axis);
        let anchors = std::array::from_fn(|k| {
            let a = k as f32 / 4.0 * TAU;
            u * (a.cos() * radius) + v * (a.sin() * radius)
        });
        Self {
            center,
            frame: Quat::IDENTITY,
            spin_axis,
            spin_speed,
            anchors,
            trios: std::array::from_fn(&mut make_trio),
        }
    }

    /// Rotate the outer frame about its local spin axis, then spin each trio.
    pub fn advance(&mut self, dt: f32) {
        let step = Quat::from_axis_angle(self.spin_axis, self.spin_speed * dt);
        self.frame = (self.frame * step).normalize();
        for trio in &mut self.trios {
            trio.spin(dt);
        }
    }

    /// World position of trio `k`'s center.
    pub fn anchor_world(&self, k: usize) -> Vec3 {
        self.center + self.frame * self.anchors[k]
    }

    /// World positions of the three members of trio `k`.
    pub fn trio_world(&self, k: usize) -> [Vec3; 3] {
        self.trios[k].world(self.anchor_world(k), self.frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrapped_gap(a: f32, b: f32) -> f32 {
        (b - a).rem_euclid(TAU)
    }

    #[test]
    fn test_composite_phase_spacing_holds() {
        let mut trio = Composite::<3>::new(Vec3::ONE, Vec3::new(0.2, 1.0, 0.1), 0.05, 1.2, 0.4);
        for frame in 0..500 {
            let t = frame as f32 / 60.0;
            trio.advance_phase(1.0 / 60.0, 1.0 + (t * 0.5 + trio.wobble).sin() * 0.12);
            let p = trio.phases();
            for k in 0..3 {
                let gap = wrapped_gap(p[k], p[(k + 1) % 3]);
                assert!((gap - TAU / 3.0).abs() < 1e-4, "gap {gap}");
            }
        }
    }

    #[test]
    fn test_composite_members_on_circle() {
        let trio = Composite::<3>::new(Vec3::new(1.0, 2.0, 3.0), Vec3::Z, 0.5, 1.0, 0.0);
        for p in trio.member_positions(0.5) {
            let offset = p - trio.center;
            assert!((offset.length() - 0.5).abs() < 1e-5);
            assert!(offset.dot(trio.axis).abs() < 1e-5);
        }
    }

    #[test]
    fn test_four_member_spacing() {
        assert!((Composite::<4>::SPACING - TAU / 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_spin_cluster_is_rigid() {
        let mut cluster = SpinCluster::<3>::flattened(0.05, Vec3::new(1.0, 0.3, 0.0), 10.0);
        let before: Vec<f32> = (0..3)
            .map(|k| cluster.offsets[k].distance(cluster.offsets[(k + 1) % 3]))
            .collect();
        for _ in 0..120 {
            cluster.spin(1.0 / 60.0);
        }
        for k in 0..3 {
            let d = cluster.offsets[k].distance(cluster.offsets[(k + 1) % 3]);
            assert!((d - before[k]).abs() < 1e-5);
        }
    }

    #[test]
    fn test_tetra_two_level_spin() {
        let mut tetra = Tetra::new(Vec3::ZERO, Vec3::Y, 0.1, 1.0, |_| {
            SpinCluster::flattened(0.05, tetra_inner_axis(), 8.0)
        });
        let anchor_gap = tetra.anchor_world(0).distance(tetra.anchor_world(1));
        let member_radius = tetra.trio_world(0)[0].distance(tetra.anchor_world(0));
        for _ in 0..90 {
            tetra.advance(1.0 / 60.0);
        }
        assert!((tetra.anchor_world(0).distance(tetra.anchor_world(1)) - anchor_gap).abs() < 1e-5);
        assert!((tetra.trio_world(0)[0].distance(tetra.anchor_world(0)) - member_radius).abs() < 1e-5);
        for k in 0..4 {
            assert!((tetra.anchor_world(k).length() - 0.1).abs() < 1e-5);
        }
    }
}
