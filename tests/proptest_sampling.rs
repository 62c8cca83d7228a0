//! Property-based invariant tests for sampling, pools and schedules.
//!
//! 1. Shell samples stay between the inner and outer radius.
//! 2. Fibonacci sphere directions are unit length.
//! 3. Orthonormal bases are perpendicular to their axis.
//! 4. Pools never hold more live slots than their capacity.
//! 5. Interval emitters spawn once per elapsed period.
//! 6. Lifecycle opacity stays in [0, 1].
//! 7. Blends stay between their endpoints and land exactly on the target.

use erasim::engine::Blend;
use erasim::spawn::{fibonacci_sphere, orthonormal_basis};
use erasim::{ClaimMode, Emitter, Lifecycle, Pool, SpawnRng};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn shell_strategy() -> impl Strategy<Value = (f32, f32)> {
    (0.0f32..20.0, 0.01f32..20.0).prop_map(|(inner, width)| (inner, inner + width))
}

#[derive(Debug, Clone, Copy)]
enum PoolOp {
    Claim(f32),
    Tick(f32),
    Release(usize),
}

fn pool_op_strategy() -> impl Strategy<Value = PoolOp> {
    prop_oneof![
        (0.01f32..2.0).prop_map(PoolOp::Claim),
        (0.0f32..0.5).prop_map(PoolOp::Tick),
        (0usize..32).prop_map(PoolOp::Release),
    ]
}

// ═════════════════════════════════════════════════════════════════════════
// 1-3. Sampling
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn shell_samples_within_radii(seed in any::<u64>(), (inner, outer) in shell_strategy()) {
        let mut rng = SpawnRng::seeded(seed);
        let tolerance = outer * 1e-4 + 1e-4;
        for _ in 0..64 {
            let r = rng.point_in_shell(inner, outer).length();
            prop_assert!(r >= inner - tolerance, "r={} below {}", r, inner);
            prop_assert!(r <= outer + tolerance, "r={} above {}", r, outer);
        }
    }

    #[test]
    fn fibonacci_directions_are_unit(n in 1usize..400) {
        let dirs = fibonacci_sphere(n);
        prop_assert_eq!(dirs.len(), n);
        for d in dirs {
            prop_assert!((d.length() - 1.0).abs() < 1e-4, "{:?}", d);
        }
    }

    #[test]
    fn basis_is_orthonormal(x in -1.0f32..1.0, y in -1.0f32..1.0, z in -1.0f32..1.0) {
        let axis = erasim::Vec3::new(x, y, z);
        prop_assume!(axis.length() > 1e-3);
        let (u, v) = orthonormal_basis(axis);
        let axis = axis.normalize();
        prop_assert!((u.length() - 1.0).abs() < 1e-4);
        prop_assert!((v.length() - 1.0).abs() < 1e-4);
        prop_assert!(u.dot(axis).abs() < 1e-4);
        prop_assert!(v.dot(axis).abs() < 1e-4);
        prop_assert!(u.dot(v).abs() < 1e-4);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Pools
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn pool_live_never_exceeds_capacity(
        capacity in 0usize..32,
        cyclic in any::<bool>(),
        ops in prop::collection::vec(pool_op_strategy(), 0..200),
    ) {
        let mode = if cyclic { ClaimMode::Cyclic } else { ClaimMode::FirstFree };
        let mut pool = Pool::new(capacity, mode, |i| i);
        for op in ops {
            match op {
                PoolOp::Claim(life) => {
                    let was_full = pool.live_count() == capacity;
                    let claimed = pool.claim(life).is_some();
                    match mode {
                        ClaimMode::Cyclic => prop_assert_eq!(claimed, capacity > 0),
                        ClaimMode::FirstFree => prop_assert_eq!(claimed, !was_full),
                    }
                }
                PoolOp::Tick(dt) => {
                    let before = pool.live_count();
                    let expired = pool.tick(dt);
                    prop_assert_eq!(pool.live_count(), before - expired);
                }
                PoolOp::Release(index) => pool.release(index),
            }
            prop_assert!(pool.live_count() <= pool.capacity());
            prop_assert_eq!(pool.capacity(), capacity);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5-7. Schedules
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn interval_emitter_matches_elapsed(
        period in 0.005f32..0.5,
        dts in prop::collection::vec(0.0f32..0.1, 1..120),
    ) {
        let mut emitter = Emitter::interval(period);
        let mut rng = SpawnRng::seeded(7);
        let spawned: u32 = dts.iter().map(|&dt| emitter.due(dt, &mut rng)).sum();
        let elapsed: f32 = dts.iter().sum();
        let expected = (elapsed / period).floor() as i64;
        prop_assert!((spawned as i64 - expected).abs() <= 1, "spawned {} expected {}", spawned, expected);
    }

    #[test]
    fn lifecycle_opacity_in_unit_range(
        lo in 0.1f32..3.0,
        width in 0.1f32..3.0,
        rate in 0.0f32..20.0,
        seed in any::<u64>(),
    ) {
        let over_life = Lifecycle::new().lifetime_range(lo..lo + width).fade_over_life();
        let by_rate = Lifecycle::flash(lo, rate);
        let mut rng = SpawnRng::seeded(seed);
        for _ in 0..16 {
            let life = over_life.spawn_life(&mut rng);
            prop_assert!(life >= lo && life <= lo + width);
            for l in [life, life * 0.5, 0.0, -1.0] {
                let a = over_life.opacity(l);
                let b = by_rate.opacity(l);
                prop_assert!((0.0..=1.0).contains(&a));
                prop_assert!((0.0..=1.0).contains(&b));
            }
        }
    }

    #[test]
    fn blend_stays_between_endpoints(
        from in 0.0f32..1.0,
        to in 0.0f32..1.0,
        duration in 0.05f32..3.0,
        dt in 0.001f32..0.1,
    ) {
        let mut blend = Blend::new(from, to, duration);
        let (lo, hi) = (from.min(to) - 1e-5, from.max(to) + 1e-5);
        let mut steps = 0;
        while !blend.is_finished() {
            let value = blend.step(dt);
            prop_assert!(value >= lo && value <= hi, "{} outside [{}, {}]", value, lo, hi);
            steps += 1;
            prop_assert!(steps < 10_000);
        }
        prop_assert_eq!(blend.sample(), to);
    }
}
