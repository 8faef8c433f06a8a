//! Interpolation.
//!
//! The authoritative pose changes in discrete steps: fixed-rate simulation ticks
//! on a host, network updates on a remote viewer. The client renders at its own
//! rate and smooths those steps over a fixed window.

use arena_shared::math::{Quat, Vec3};

/// Values a [`Lerper`] can blend.
pub trait Interpolate: Copy + PartialEq {
    /// Blends from `self` to `to`. `t >= 1` must return `to` exactly.
    fn interpolate(self, to: Self, t: f32) -> Self;
}

impl Interpolate for Vec3 {
    fn interpolate(self, to: Self, t: f32) -> Self {
        self.lerp(to, t)
    }
}

impl Interpolate for Quat {
    fn interpolate(self, to: Self, t: f32) -> Self {
        self.slerp(to, t)
    }
}

/// Time-bounded interpolator for one channel.
///
/// When the target differs from the one passed on the previous call, the anchor
/// moves to the caller's current output and the clock restarts, so a jump in the
/// source never makes the output snap.
#[derive(Debug, Clone)]
pub struct Lerper<T> {
    anchor: T,
    last_target: T,
    elapsed: f32,
    duration: f32,
}

pub type PositionLerper = Lerper<Vec3>;
pub type RotationLerper = Lerper<Quat>;

impl<T: Interpolate> Lerper<T> {
    pub fn new(start: T, duration: f32) -> Self {
        Self {
            anchor: start,
            last_target: start,
            elapsed: 0.0,
            duration,
        }
    }

    /// Produces the next output given the value currently displayed, the latest
    /// target sample, and the frame delta.
    pub fn advance(&mut self, current: T, target: T, dt: f32) -> T {
        if target != self.last_target {
            self.anchor = current;
            self.elapsed = 0.0;
            self.last_target = target;
        }

        if self.duration <= 0.0 {
            return target;
        }

        self.elapsed = (self.elapsed + dt).clamp(0.0, self.duration);
        self.anchor.interpolate(target, self.elapsed / self.duration)
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// True once the output has reached the last target.
    pub fn is_settled(&self) -> bool {
        self.duration <= 0.0 || self.elapsed >= self.duration
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;

    const LERP_TIME: f32 = 0.08;

    #[test]
    fn held_target_converges_exactly() {
        let mut l = PositionLerper::new(Vec3::ZERO, LERP_TIME);
        let target = Vec3::new(10.0, 0.0, 0.0);
        let mut out = Vec3::ZERO;
        for _ in 0..10 {
            out = l.advance(out, target, 0.01);
        }
        assert_eq!(out, target);
        assert!(l.is_settled());

        // Stays put afterwards.
        out = l.advance(out, target, 0.5);
        assert_eq!(out, target);
    }

    #[test]
    fn jump_does_not_snap() {
        let mut l = PositionLerper::new(Vec3::ZERO, LERP_TIME);
        let out = l.advance(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), 0.02);
        assert!((out.x - 2.5).abs() < 1e-4);
    }

    #[test]
    fn retarget_mid_flight_starts_from_current_output() {
        let mut l = PositionLerper::new(Vec3::ZERO, LERP_TIME);
        let mid = l.advance(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), 0.04);
        assert!((mid.x - 5.0).abs() < 1e-4);

        // New target: the next output is anchored at `mid`, not at the old anchor
        // and not at the new target.
        let next = l.advance(mid, Vec3::new(-10.0, 0.0, 0.0), 0.02);
        assert!((next.x - (5.0 - 15.0 * 0.25)).abs() < 1e-3);
    }

    #[test]
    fn repeated_target_keeps_progressing() {
        let mut l = PositionLerper::new(Vec3::ZERO, LERP_TIME);
        let target = Vec3::new(0.0, 8.0, 0.0);
        let mut out = Vec3::ZERO;
        let mut last = -1.0;
        for dt in [0.005, 0.03, 0.001, 0.02, 0.04] {
            out = l.advance(out, target, dt);
            assert!(out.y > last);
            assert!(out.y <= target.y);
            last = out.y;
        }
        assert_eq!(out, target);
    }

    #[test]
    fn zero_duration_passes_through() {
        let mut l = PositionLerper::new(Vec3::ZERO, 0.0);
        let target = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(l.advance(Vec3::ZERO, target, 0.016), target);
    }

    #[test]
    fn rotation_converges() {
        let mut l = RotationLerper::new(Quat::IDENTITY, LERP_TIME);
        let target = Quat::from_yaw(FRAC_PI_2);
        let half = l.advance(Quat::IDENTITY, target, 0.04);
        assert!((half.angle_between(Quat::IDENTITY) - FRAC_PI_2 / 2.0).abs() < 1e-3);
        let done = l.advance(half, target, 0.04);
        assert_eq!(done, target);
    }
}
