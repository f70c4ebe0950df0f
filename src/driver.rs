//! Frame driver: owns the plane, the trail, and the noise field, and runs
//! them in a fixed order once per frame.
//!
//! # Phases
//!
//! | Phase | Entered | Frame behavior |
//! |-------|---------|----------------|
//! | [`FlightPhase::Idle`] | at construction | pose holds, no emission, trail still ages |
//! | [`FlightPhase::Active`] | first target update | steer, pose, emit, then age the trail |
//!
//! There is no way back to `Idle` short of [`FlightSim::reset`].
//!
//! # Frame order
//!
//! 1. clamp the delta (zero delta: nothing happens)
//! 2. steer toward the last recorded target
//! 3. copy the plane state into the renderable pose
//! 4. place the tail in world space and emit the particles that are due
//! 5. age and move every particle
//!
//! Emission runs before aging so a fresh particle is never expired in the
//! frame it appears.

use crate::config::FlightConfig;
use crate::error::ConfigError;
use crate::model::PlaneModel;
use crate::noise::NoiseField;
use crate::steering::{PlaneState, SteeringOutput};
use crate::trail::{EmissionGate, TrailBuffer, TrailPool};
use glam::{Quat, Vec2, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// A steering goal in world space.
///
/// 2D pointer positions land on the `z = 0` plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Target(Vec3);

impl Target {
    pub fn new(position: Vec3) -> Self {
        Self(position)
    }

    pub fn position(&self) -> Vec3 {
        self.0
    }
}

impl From<Vec3> for Target {
    fn from(v: Vec3) -> Self {
        Self(v)
    }
}

impl From<Vec2> for Target {
    fn from(v: Vec2) -> Self {
        Self(v.extend(0.0))
    }
}

/// Driver state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlightPhase {
    /// Waiting for the first target.
    Idle,
    /// Steering toward the latest target.
    Active,
}

/// What the renderer needs to place the plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlanePose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl From<&PlaneState> for PlanePose {
    fn from(state: &PlaneState) -> Self {
        Self {
            position: state.position,
            orientation: state.orientation,
        }
    }
}

/// One flight session.
///
/// Single-threaded: call [`on_target_update`](Self::on_target_update)
/// whenever the pointer moves and [`on_frame`](Self::on_frame) once per
/// display refresh, then read [`pose`](Self::pose) and [`trail`](Self::trail).
#[derive(Debug)]
pub struct FlightSim {
    config: FlightConfig,
    plane: PlaneState,
    pose: PlanePose,
    /// Latest target. `None` until the first update; last write wins.
    target: Option<Vec3>,
    model: PlaneModel,
    pool: TrailPool,
    gate: EmissionGate,
    noise: NoiseField,
    last_steering: Option<SteeringOutput>,
    frames: u64,
    elapsed: f32,
}

impl FlightSim {
    /// Start a session.
    ///
    /// With `config.noise.seed` set, the noise permutation and the per-slot
    /// trail lifetimes are reproducible; otherwise they are drawn from OS
    /// entropy.
    ///
    /// # Panics
    ///
    /// Panics if `config.trail.capacity` is zero. Use
    /// [`try_new`](Self::try_new) for untrusted configs.
    pub fn new(config: FlightConfig) -> Self {
        let (noise, mut rng) = match config.noise.seed {
            Some(seed) => (
                NoiseField::from_seed(seed),
                StdRng::seed_from_u64(seed.wrapping_add(1)),
            ),
            None => (NoiseField::from_entropy(), StdRng::from_entropy()),
        };
        let pool = TrailPool::new(&config.trail, &mut rng);
        let plane = PlaneState::at(config.start_position);

        log::debug!(
            "flight session: {} trail slots, model {}, seed {:?}",
            pool.capacity(),
            config.model.name(),
            config.noise.seed
        );

        Self {
            pose: PlanePose::from(&plane),
            plane,
            target: None,
            model: config.model,
            pool,
            gate: EmissionGate::new(),
            noise,
            last_steering: None,
            frames: 0,
            elapsed: 0.0,
            config,
        }
    }

    /// Validate `config`, then start a session.
    pub fn try_new(config: FlightConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    // ========== Inbound ==========

    /// Record a new steering target. The first call switches the session to
    /// [`FlightPhase::Active`].
    pub fn on_target_update(&mut self, target: impl Into<Target>) {
        let position = target.into().position();
        if self.target.is_none() {
            log::debug!("first target at {:?}, steering engaged", position);
        }
        self.target = Some(position);
    }

    /// Advance one frame by `delta` time units.
    ///
    /// Deltas above `clock.max_delta` are clamped. A delta that is not
    /// positive skips the frame entirely. Returns whether the frame ran.
    pub fn on_frame(&mut self, delta: f32) -> bool {
        if delta.is_nan() || delta <= 0.0 {
            return false;
        }
        let max_delta = self.config.clock.max_delta;
        let delta = if delta > max_delta {
            log::debug!("frame delta {:.3} clamped to {:.3}", delta, max_delta);
            max_delta
        } else {
            delta
        };

        if let Some(target) = self.target {
            let out = self.plane.step(target, delta, &self.config.steering);
            self.pose = PlanePose::from(&self.plane);
            self.last_steering = Some(out);
            self.emit_trail(delta);
        }

        self.pool.update(delta, &self.noise);

        self.frames += 1;
        self.elapsed += delta;
        log::trace!(
            "frame {}: pos {:?} speed {:.2} trail {}/{}",
            self.frames,
            self.pose.position,
            self.plane.speed(),
            self.pool.active_count(),
            self.pool.capacity()
        );
        true
    }

    fn emit_trail(&mut self, delta: f32) {
        let tail = self.plane.local_to_world(self.model.tail_offset());
        let previous = self.gate.track_origin(tail);
        // Cadence and drift work in units per time, the plane velocity is per frame
        let velocity = self.plane.velocity / self.gate.reference_delta(delta);
        let due = self.gate.advance(delta, velocity.length(), &self.config.trail);
        if due > 0 {
            self.pool.emit_along(previous, tail, due, velocity);
        }
    }

    // ========== Outbound ==========

    pub fn pose(&self) -> PlanePose {
        self.pose
    }

    /// Renderer buffers: one position and alpha per trail slot.
    pub fn trail(&self) -> &TrailBuffer {
        self.pool.buffer()
    }

    pub fn pool(&self) -> &TrailPool {
        &self.pool
    }

    pub fn phase(&self) -> FlightPhase {
        if self.target.is_some() {
            FlightPhase::Active
        } else {
            FlightPhase::Idle
        }
    }

    pub fn target(&self) -> Option<Vec3> {
        self.target
    }

    /// Steering values of the most recent active frame.
    pub fn last_steering(&self) -> Option<&SteeringOutput> {
        self.last_steering.as_ref()
    }

    pub fn noise(&self) -> &NoiseField {
        &self.noise
    }

    pub fn config(&self) -> &FlightConfig {
        &self.config
    }

    /// Frames that actually ran (skipped zero-delta frames are not counted).
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Simulated time, after clamping.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    // ========== Session ==========

    pub fn model(&self) -> PlaneModel {
        self.model
    }

    /// Swap the plane silhouette. The trail continues from the new tail.
    pub fn set_model(&mut self, model: PlaneModel) {
        self.model = model;
        self.gate.reset();
    }

    /// Snapshot of the plane for saving.
    pub fn plane_state(&self) -> PlaneState {
        self.plane
    }

    /// Replace the plane state. The plane then flies exactly as it would
    /// have in the session the state came from. The trail does not: emission
    /// cadence restarts and the next particle leaves from the restored tail.
    pub fn restore_plane_state(&mut self, state: PlaneState) {
        self.plane = state;
        self.pose = PlanePose::from(&self.plane);
        self.gate.reset();
        log::debug!("plane state restored at {:?}", state.position);
    }

    /// Back to `Idle` at the start position with an empty trail. Trail slots
    /// and the noise field are reused.
    pub fn reset(&mut self) {
        self.plane = PlaneState::at(self.config.start_position);
        self.pose = PlanePose::from(&self.plane);
        self.target = None;
        self.pool.clear();
        self.gate.reset();
        self.last_steering = None;
        self.frames = 0;
        self.elapsed = 0.0;
    }
}
