//! Arrival steering and banked orientation for the plane.
//!
//! Velocities here are per-frame displacements: the desired velocity is
//! scaled by the frame delta and the new position is `position + velocity`.
//! Speed is never clamped directly. A bounded steering force plus per-frame
//! damping makes `|velocity|` approach its limit asymptotically.
//!
//! # Example
//!
//! ```
//! use skytrail::steering::{PlaneState, SteeringConfig};
//! use glam::Vec3;
//!
//! let config = SteeringConfig::default();
//! let mut plane = PlaneState::default();
//! let out = plane.step(Vec3::new(500.0, 0.0, 0.0), 1.0 / 60.0, &config);
//! assert!(out.desired_velocity.x > 0.0);
//! ```

use glam::{Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_4;

/// Tuning for the steering controller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringConfig {
    /// Cruise speed in world units per time unit.
    pub max_speed: f32,
    /// Largest change of velocity per time unit.
    pub max_force: f32,
    /// Fraction of velocity kept each frame after the steering force.
    pub damping: f32,
    /// Distance below which the desired speed falls off linearly.
    pub slowing_radius: f32,
    /// Minimum `|velocity|²` before the orientation follows the velocity.
    pub orientation_epsilon: f32,
    /// Radians of bank per unit of lateral steering force.
    pub bank_factor: f32,
    /// Bank angle limit in radians.
    pub max_bank: f32,
    /// Fraction of the orientation error left after one time unit.
    /// The per-frame slerp factor is `1 - orientation_smoothing^delta`.
    pub orientation_smoothing: f32,
    /// World up used to build the look rotation.
    pub up: Vec3,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            max_speed: 800.0,
            max_force: 600.0,
            damping: 0.95,
            slowing_radius: 300.0,
            orientation_epsilon: 0.01,
            bank_factor: 0.15,
            max_bank: FRAC_PI_4,
            orientation_smoothing: 0.001,
            up: Vec3::Y,
        }
    }
}

impl SteeringConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_speed(mut self, max_speed: f32) -> Self {
        self.max_speed = max_speed;
        self
    }

    pub fn with_max_force(mut self, max_force: f32) -> Self {
        self.max_force = max_force;
        self
    }

    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_slowing_radius(mut self, radius: f32) -> Self {
        self.slowing_radius = radius;
        self
    }

    /// Set bank gain and limit together.
    pub fn with_banking(mut self, factor: f32, max_bank: f32) -> Self {
        self.bank_factor = factor;
        self.max_bank = max_bank;
        self
    }

    pub fn with_orientation_smoothing(mut self, base: f32) -> Self {
        self.orientation_smoothing = base;
        self
    }

    /// Speed the plane wants at `distance` from its target (arrival falloff).
    pub fn desired_speed(&self, distance: f32) -> f32 {
        if distance >= self.slowing_radius {
            self.max_speed
        } else {
            self.max_speed * (distance / self.slowing_radius)
        }
    }
}

/// Kinematic state of the plane.
///
/// `orientation` is the smoothed, rendered rotation. It is derived from the
/// velocity each frame and stored only so smoothing can continue from it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaneState {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Force accumulator, cleared after every integration step.
    pub acceleration: Vec3,
    pub orientation: Quat,
}

impl Default for PlaneState {
    fn default() -> Self {
        Self::at(Vec3::ZERO)
    }
}

/// Intermediate values of one steering step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SteeringOutput {
    pub desired_velocity: Vec3,
    /// Clamped steering force that was applied this step.
    pub steering_force: Vec3,
    /// Orientation the plane is turning toward, if it was moving fast
    /// enough to have one.
    pub target_orientation: Option<Quat>,
}

/// Desired per-frame velocity toward `target`.
///
/// Zero when the plane already sits on the target.
pub fn desired_velocity(position: Vec3, target: Vec3, delta: f32, config: &SteeringConfig) -> Vec3 {
    let to_target = target - position;
    let distance = to_target.length();
    if distance == 0.0 {
        return Vec3::ZERO;
    }
    to_target / distance * config.desired_speed(distance) * delta
}

/// Steering force from `velocity` toward `desired`, clamped to `max_force * delta`.
pub fn steering_force(desired: Vec3, velocity: Vec3, delta: f32, config: &SteeringConfig) -> Vec3 {
    (desired - velocity).clamp_length_max(config.max_force * delta)
}

/// Rotation that points local `+Z` along `forward` with local `+Y` as close
/// to `up` as possible.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let z = forward.normalize();
    let mut x = up.cross(z);
    if x.length_squared() < 1e-8 {
        // Flying straight along the up axis; borrow another reference axis.
        let alt = if z.z.abs() < 0.9 { Vec3::Z } else { Vec3::X };
        x = alt.cross(z);
    }
    let x = x.normalize();
    let y = z.cross(x);
    Quat::from_mat3(&Mat3::from_cols(x, y, z))
}

/// Target orientation for a plane moving along `velocity` while `force`
/// pulls it sideways.
pub fn banked_orientation(velocity: Vec3, force: Vec3, config: &SteeringConfig) -> Quat {
    let forward = velocity.normalize();
    let lateral_axis = forward.cross(config.up).normalize_or_zero();
    let lateral = force.dot(lateral_axis);
    let bank = (-lateral * config.bank_factor).clamp(-config.max_bank, config.max_bank);

    Quat::from_axis_angle(forward, bank) * look_rotation(forward, config.up)
}

/// Frame-rate independent slerp factor: after one time unit the remaining
/// error is `base`, however that unit is split into frames.
#[inline]
pub fn smoothing_factor(base: f32, delta: f32) -> f32 {
    1.0 - base.powf(delta)
}

impl PlaneState {
    /// A stationary plane at `position`, facing `+Z`.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            orientation: Quat::IDENTITY,
        }
    }

    /// Accumulate an extra force for the next integration.
    pub fn apply_force(&mut self, force: Vec3) {
        self.acceleration += force;
    }

    /// Advance one frame toward `target`.
    pub fn step(&mut self, target: Vec3, delta: f32, config: &SteeringConfig) -> SteeringOutput {
        let desired = desired_velocity(self.position, target, delta, config);
        let force = steering_force(desired, self.velocity, delta, config);

        self.apply_force(force);
        self.integrate(config.damping);

        let target_orientation = if self.velocity.length_squared() > config.orientation_epsilon {
            let q = banked_orientation(self.velocity, force, config);
            let t = smoothing_factor(config.orientation_smoothing, delta);
            self.orientation = self.orientation.slerp(q, t).normalize();
            Some(q)
        } else {
            None
        };

        SteeringOutput {
            desired_velocity: desired,
            steering_force: force,
            target_orientation,
        }
    }

    /// Apply the accumulated force, damp, move, and clear the accumulator.
    fn integrate(&mut self, damping: f32) {
        self.velocity = (self.velocity + self.acceleration) * damping;
        self.position += self.velocity;
        self.acceleration = Vec3::ZERO;
    }

    /// Current speed in per-frame units.
    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Transform a point from plane-local space into world space.
    #[inline]
    pub fn local_to_world(&self, local: Vec3) -> Vec3 {
        self.position + self.orientation * local
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn config() -> SteeringConfig {
        SteeringConfig::default()
            .with_max_speed(800.0)
            .with_slowing_radius(300.0)
    }

    #[test]
    fn test_desired_speed_outside_radius() {
        assert_eq!(config().desired_speed(500.0), 800.0);
        assert_eq!(config().desired_speed(300.0), 800.0);
    }

    #[test]
    fn test_desired_speed_inside_radius() {
        assert_eq!(config().desired_speed(150.0), 400.0);
        assert_eq!(config().desired_speed(0.0), 0.0);
    }

    #[test]
    fn test_desired_velocity_full_speed() {
        let v = desired_velocity(Vec3::ZERO, Vec3::new(500.0, 0.0, 0.0), 1.0, &config());
        assert!((v.length() - 800.0).abs() < 1e-3);
        assert!(v.x > 0.0);
    }

    #[test]
    fn test_desired_velocity_scaled_by_delta() {
        let v = desired_velocity(Vec3::ZERO, Vec3::new(0.0, 150.0, 0.0), 0.5, &config());
        assert!((v.length() - 200.0).abs() < 1e-3);
    }

    #[test]
    fn test_desired_velocity_zero_at_target() {
        let p = Vec3::new(3.0, -2.0, 7.0);
        for d in [1e-4, DT, 0.1, 1.0] {
            assert_eq!(desired_velocity(p, p, d, &config()), Vec3::ZERO);
        }
    }

    #[test]
    fn test_step_at_target_is_finite() {
        let mut plane = PlaneState::at(Vec3::ONE);
        let out = plane.step(Vec3::ONE, DT, &config());
        assert_eq!(out.desired_velocity, Vec3::ZERO);
        assert_eq!(plane.position, Vec3::ONE);
        assert!(plane.orientation.is_finite());
        assert!(out.target_orientation.is_none());
    }

    #[test]
    fn test_steering_force_clamped() {
        let cfg = config();
        let f = steering_force(Vec3::new(1000.0, 0.0, 0.0), Vec3::ZERO, DT, &cfg);
        assert!(f.length() <= cfg.max_force * DT + 1e-4);
    }

    #[test]
    fn test_velocity_bound_per_step() {
        let cfg = config();
        let mut plane = PlaneState::at(Vec3::ZERO);
        plane.velocity = Vec3::new(-4.0, 2.0, 1.0);
        let prev = plane.speed();
        plane.step(Vec3::new(900.0, 300.0, -50.0), DT, &cfg);
        let bound = (prev + cfg.max_force * DT) * cfg.damping;
        assert!(plane.speed() <= bound + 1e-4);
    }

    #[test]
    fn test_damping_without_force() {
        // Already moving at the desired velocity, so the force is zero but
        // damping still bleeds speed.
        let cfg = config();
        let mut plane = PlaneState::at(Vec3::ZERO);
        let target = Vec3::new(10_000.0, 0.0, 0.0);
        plane.velocity = desired_velocity(plane.position, target, DT, &cfg);
        let before = plane.velocity;
        let out = plane.step(target, DT, &cfg);
        assert!(out.steering_force.length() < 1e-4);
        assert!(plane.velocity.length() < before.length());
    }

    #[test]
    fn test_acceleration_cleared() {
        let mut plane = PlaneState::default();
        plane.apply_force(Vec3::new(1.0, 2.0, 3.0));
        plane.step(Vec3::new(50.0, 0.0, 0.0), DT, &config());
        assert_eq!(plane.acceleration, Vec3::ZERO);
    }

    #[test]
    fn test_speed_approaches_limit() {
        let cfg = config();
        let mut plane = PlaneState::default();
        let mut target = Vec3::new(0.0, 0.0, 1.0e6);
        for _ in 0..2000 {
            plane.step(target, DT, &cfg);
            target.z += 1.0;
        }
        assert!(plane.speed() <= cfg.max_speed * DT);
        assert!(plane.speed() > 0.5 * cfg.max_speed * DT);
    }

    #[test]
    fn test_look_rotation_points_forward() {
        let q = look_rotation(Vec3::X, Vec3::Y);
        let fwd = q * Vec3::Z;
        assert!((fwd - Vec3::X).length() < 1e-5);
        let up = q * Vec3::Y;
        assert!((up - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_look_rotation_vertical() {
        let q = look_rotation(Vec3::Y, Vec3::Y);
        assert!(q.is_finite());
        assert!(((q * Vec3::Z) - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_bank_clamped_and_signed() {
        let cfg = config().with_banking(10.0, 0.5);
        // Moving along +Z, lateral axis is +Z x +Y = -X.
        let right_push = banked_orientation(Vec3::Z, Vec3::new(-1.0, 0.0, 0.0), &cfg);
        let left_push = banked_orientation(Vec3::Z, Vec3::new(1.0, 0.0, 0.0), &cfg);
        let level = look_rotation(Vec3::Z, Vec3::Y);

        assert!((right_push.angle_between(level) - 0.5).abs() < 1e-4);
        assert!((left_push.angle_between(level) - 0.5).abs() < 1e-4);
        assert!(right_push.angle_between(left_push) > 0.9);
    }

    #[test]
    fn test_smoothing_is_frame_rate_independent() {
        let base = 0.001;
        let one = smoothing_factor(base, 0.1);
        let half = smoothing_factor(base, 0.05);
        // Two half steps leave the same remaining error as one full step
        let remaining_two = (1.0 - half) * (1.0 - half);
        assert!(((1.0 - one) - remaining_two).abs() < 1e-6);
    }

    #[test]
    fn test_orientation_turns_toward_travel() {
        let cfg = config();
        let mut plane = PlaneState::default();
        for _ in 0..240 {
            plane.step(Vec3::new(100_000.0, 0.0, 0.0), DT, &cfg);
        }
        let fwd = plane.orientation * Vec3::Z;
        assert!(fwd.dot(Vec3::X) > 0.9);
    }

    #[test]
    fn test_local_to_world() {
        let mut plane = PlaneState::at(Vec3::new(1.0, 2.0, 3.0));
        plane.orientation = look_rotation(Vec3::X, Vec3::Y);
        let tail = plane.local_to_world(Vec3::new(0.0, 0.0, -2.0));
        assert!((tail - Vec3::new(-1.0, 2.0, 3.0)).length() < 1e-5);
    }
}
