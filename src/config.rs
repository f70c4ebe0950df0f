//! Flight configuration.
//!
//! [`FlightConfig`] gathers every tunable of a session. Build it in code with
//! the `with_*` setters or load it from JSON; every field is optional in the
//! file and falls back to its default.
//!
//! ```json
//! {
//!   "steering": { "max_speed": 600.0, "slowing_radius": 250.0 },
//!   "trail": { "capacity": 4000, "life_range": { "start": 1.0, "end": 2.5 } },
//!   "noise": { "seed": 42 },
//!   "model": "glider"
//! }
//! ```

use crate::error::ConfigError;
use crate::input::TargetMapping;
use crate::model::PlaneModel;
use crate::steering::SteeringConfig;
use crate::time::DEFAULT_MAX_DELTA;
use crate::trail::TrailConfig;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Noise field setup.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    /// Seed for the permutation table. `None` draws a fresh one per run.
    pub seed: Option<u64>,
}

/// Frame stepping limits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Largest delta a single frame integrates.
    pub max_delta: f32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            max_delta: DEFAULT_MAX_DELTA,
        }
    }
}

/// Complete configuration for a [`FlightSim`](crate::FlightSim) session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightConfig {
    pub steering: SteeringConfig,
    pub trail: TrailConfig,
    pub noise: NoiseConfig,
    pub clock: ClockConfig,
    pub model: PlaneModel,
    pub mapping: TargetMapping,
    /// Where the plane waits before the first target arrives.
    pub start_position: Vec3,
}

impl FlightConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_steering(mut self, steering: SteeringConfig) -> Self {
        self.steering = steering;
        self
    }

    pub fn with_trail(mut self, trail: TrailConfig) -> Self {
        self.trail = trail;
        self
    }

    /// Use a fixed noise seed so runs are reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.noise.seed = Some(seed);
        self
    }

    pub fn with_max_delta(mut self, max_delta: f32) -> Self {
        self.clock.max_delta = max_delta;
        self
    }

    pub fn with_model(mut self, model: PlaneModel) -> Self {
        self.model = model;
        self
    }

    pub fn with_mapping(mut self, mapping: TargetMapping) -> Self {
        self.mapping = mapping;
        self
    }

    pub fn with_start_position(mut self, position: Vec3) -> Self {
        self.start_position = position;
        self
    }

    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: FlightConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        log::debug!("loaded flight config from {}", path.display());
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.steering;
        let t = &self.trail;

        check(s.max_speed >= 0.0, "steering.max_speed must be non-negative")?;
        check(s.max_force >= 0.0, "steering.max_force must be non-negative")?;
        check(
            s.damping > 0.0 && s.damping <= 1.0,
            "steering.damping must be in (0, 1]",
        )?;
        check(s.slowing_radius > 0.0, "steering.slowing_radius must be positive")?;
        check(s.max_bank >= 0.0, "steering.max_bank must be non-negative")?;
        check(
            s.orientation_smoothing > 0.0 && s.orientation_smoothing < 1.0,
            "steering.orientation_smoothing must be in (0, 1)",
        )?;
        check(s.up.length_squared() > 0.0, "steering.up must be non-zero")?;

        check(t.capacity > 0, "trail.capacity must be non-zero")?;
        check(
            t.life_range.start > 0.0 && t.life_range.start <= t.life_range.end,
            "trail.life_range must be positive and ordered",
        )?;
        check(t.drag_rate >= 0.0, "trail.drag_rate must be non-negative")?;
        check(
            t.min_interval > 0.0 && t.min_interval <= t.base_interval,
            "trail intervals must satisfy 0 < min_interval <= base_interval",
        )?;
        check(t.reference_speed > 0.0, "trail.reference_speed must be positive")?;

        check(self.clock.max_delta > 0.0, "clock.max_delta must be positive")?;
        Ok(())
    }
}

fn check(ok: bool, msg: &str) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::Invalid(msg.to_string()))
    }
}
