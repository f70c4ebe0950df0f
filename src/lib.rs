//! # skytrail - paper plane flight and particle trail simulation
//!
//! A cursor-steered paper plane glides toward a moving target, banks into
//! its turns, and leaves a fading trail of particles that drift on a noise
//! field. This crate is the simulation only: it takes a frame delta and a
//! pointer target, and produces a pose plus position/alpha buffers for
//! whatever renderer draws them.
//!
//! ## Quick Start
//!
//! ```
//! use skytrail::prelude::*;
//!
//! let mut sim = FlightSim::new(FlightConfig::new().with_seed(7));
//!
//! // From the input handler:
//! sim.on_target_update(Vec2::new(250.0, 120.0));
//!
//! // Once per display refresh:
//! sim.on_frame(1.0 / 60.0);
//!
//! let pose = sim.pose();
//! let trail = sim.trail();
//! assert_eq!(trail.positions.len(), trail.alphas.len());
//! # let _ = pose;
//! ```
//!
//! ## Core Concepts
//!
//! ### Steering
//!
//! The plane uses arrival steering: full speed far from the target, slowing
//! linearly inside `slowing_radius`. The steering force is clamped and the
//! velocity damped every frame, so speed approaches its limit without ever
//! being hard-clamped. See [`steering`].
//!
//! ### Trail
//!
//! A fixed-size ring buffer of particles. Faster flight emits a denser
//! trail; each particle fades quadratically and is pushed around by
//! [`NoiseField`]. See [`trail`].
//!
//! ### Frame driver
//!
//! [`FlightSim`] owns everything and runs steering, pose, emission, and
//! particle aging in that order. Nothing is emitted until the first target
//! arrives. See [`driver`].
//!
//! ## Module Overview
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`noise`] | 3D simplex noise |
//! | [`steering`] | Arrival steering, banking, orientation smoothing |
//! | [`trail`] | Particle pool, emission cadence, renderer buffers |
//! | [`driver`] | [`FlightSim`] session and frame ordering |
//! | [`config`] | [`FlightConfig`] and JSON loading |
//! | [`model`] | [`PlaneModel`] silhouettes |
//! | [`input`] | winit pointer events to targets |
//! | [`time`] | [`FrameClock`](time::FrameClock) frame timer |

pub mod config;
pub mod driver;
pub mod error;
pub mod input;
pub mod model;
pub mod noise;
pub mod steering;
pub mod time;
pub mod trail;

pub use config::{ClockConfig, FlightConfig, NoiseConfig};
pub use driver::{FlightPhase, FlightSim, PlanePose, Target};
pub use error::{ConfigError, RunError};
pub use glam::{Quat, Vec2, Vec3};
pub use input::{PointerInput, TargetMapping};
pub use model::PlaneModel;
pub use noise::NoiseField;
pub use steering::{PlaneState, SteeringConfig, SteeringOutput};
pub use trail::{Particle, TrailBuffer, TrailConfig, TrailPool};

/// Convenient re-exports for common usage.
///
/// ```
/// use skytrail::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::FlightConfig;
    pub use crate::driver::{FlightPhase, FlightSim, PlanePose, Target};
    pub use crate::input::{PointerInput, TargetMapping};
    pub use crate::model::PlaneModel;
    pub use crate::steering::{PlaneState, SteeringConfig};
    pub use crate::time::FrameClock;
    pub use crate::trail::{TrailBuffer, TrailConfig};
    pub use crate::{Quat, Vec2, Vec3};
}
