//! Particle trail behind the plane.
//!
//! The trail is a fixed-capacity ring buffer. Emission always writes the slot
//! under the cursor, whether or not the particle living there has expired, so
//! memory use is fixed at construction and nothing is allocated per frame.
//!
//! # Particle lifecycle
//!
//! | Field | Meaning |
//! |-------|---------|
//! | `life` | Remaining time. `0` = inactive, invisible, not simulated |
//! | `max_life` | Drawn once per slot when the pool is built |
//! | alpha | `(life / max_life)²`, `0` for inactive slots |
//!
//! `life` is set to `max_life` by [`TrailPool::emit`] and only ever decreases
//! afterwards.
//!
//! # Example
//!
//! ```
//! use skytrail::noise::NoiseField;
//! use skytrail::trail::{TrailConfig, TrailPool};
//! use glam::Vec3;
//! use rand::SeedableRng;
//!
//! let config = TrailConfig::default().with_capacity(64);
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//! let mut pool = TrailPool::new(&config, &mut rng);
//! let noise = NoiseField::from_seed(1);
//!
//! pool.emit(Vec3::ZERO, Vec3::new(0.0, 0.0, -100.0));
//! pool.update(1.0 / 60.0, &noise);
//! assert_eq!(pool.active_count(), 1);
//! ```

use crate::noise::NoiseField;
use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Trail tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailConfig {
    /// Number of particle slots. Fixed for the life of the pool.
    pub capacity: usize,
    /// Range each slot's `max_life` is drawn from.
    pub life_range: Range<f32>,
    /// Emitted particles move at `-emitter_velocity * backward_drift`.
    pub backward_drift: f32,
    /// Spatial frequency of the noise force.
    pub noise_frequency: f32,
    /// Magnitude of the noise force.
    pub noise_strength: f32,
    /// Exponential drag rate applied after integration.
    pub drag_rate: f32,
    /// Emission interval at or below `reference_speed`.
    pub base_interval: f32,
    /// Shortest emission interval, reached at high speed.
    pub min_interval: f32,
    /// Speed at which the interval starts shrinking.
    pub reference_speed: f32,
    /// No emission below this speed.
    pub min_speed: f32,
    /// Upper bound on particles emitted in a single frame.
    pub max_emissions_per_frame: u32,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            capacity: 2000,
            life_range: 1.5..3.5,
            backward_drift: 0.1,
            noise_frequency: 0.01,
            noise_strength: 40.0,
            drag_rate: 0.8,
            base_interval: 0.05,
            min_interval: 0.004,
            reference_speed: 100.0,
            min_speed: 5.0,
            max_emissions_per_frame: 8,
        }
    }
}

impl TrailConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the range per-slot lifetimes are drawn from.
    ///
    /// A single value gives every slot the same lifetime:
    /// `with_life_range(2.0..2.0)`.
    pub fn with_life_range(mut self, range: Range<f32>) -> Self {
        self.life_range = range;
        self
    }

    pub fn with_backward_drift(mut self, drift: f32) -> Self {
        self.backward_drift = drift;
        self
    }

    /// Noise force frequency and strength. A strength of zero disables it.
    pub fn with_noise(mut self, frequency: f32, strength: f32) -> Self {
        self.noise_frequency = frequency;
        self.noise_strength = strength;
        self
    }

    pub fn with_drag(mut self, rate: f32) -> Self {
        self.drag_rate = rate;
        self
    }

    /// Emission cadence: `base` interval up to `reference_speed`, shrinking
    /// in proportion to speed above it, never below `min`.
    pub fn with_cadence(mut self, base: f32, min: f32, reference_speed: f32) -> Self {
        self.base_interval = base;
        self.min_interval = min;
        self.reference_speed = reference_speed;
        self
    }

    pub fn with_min_speed(mut self, speed: f32) -> Self {
        self.min_speed = speed;
        self
    }

    pub fn with_max_emissions_per_frame(mut self, max: u32) -> Self {
        self.max_emissions_per_frame = max;
        self
    }

    /// Emission interval at `speed`, or `None` if the plane is too slow to
    /// leave a trail.
    pub fn emission_interval(&self, speed: f32) -> Option<f32> {
        if speed < self.min_speed || speed <= 0.0 {
            return None;
        }
        let interval = self.base_interval * self.reference_speed / speed;
        Some(interval.clamp(self.min_interval, self.base_interval))
    }

    fn sample_life<R: Rng>(&self, rng: &mut R) -> f32 {
        if self.life_range.is_empty() {
            self.life_range.start
        } else {
            rng.gen_range(self.life_range.clone())
        }
    }
}

/// A single trail particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub life: f32,
    pub max_life: f32,
}

impl Particle {
    fn dormant(max_life: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            life: 0.0,
            max_life,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.life > 0.0
    }

    /// Quadratic fade: `(life / max_life)²`, zero once expired.
    pub fn alpha(&self) -> f32 {
        if !self.is_active() {
            return 0.0;
        }
        let t = self.life / self.max_life;
        t * t
    }
}

/// Renderer-facing view of the trail: one position and one alpha per slot.
///
/// Both arrays always have exactly `capacity` entries. Inactive slots keep
/// their last position and report alpha `0`.
#[derive(Clone, Debug, Default)]
pub struct TrailBuffer {
    pub positions: Vec<Vec3>,
    pub alphas: Vec<f32>,
}

impl TrailBuffer {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            positions: vec![Vec3::ZERO; capacity],
            alphas: vec![0.0; capacity],
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Positions as raw bytes, tightly packed `3 x f32` per slot.
    pub fn positions_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Alphas as raw bytes, one `f32` per slot.
    pub fn alphas_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.alphas)
    }
}

/// Fixed-capacity ring buffer of trail particles.
#[derive(Clone, Debug)]
pub struct TrailPool {
    particles: Vec<Particle>,
    buffer: TrailBuffer,
    cursor: usize,
    emitted: u64,
    backward_drift: f32,
    noise_frequency: f32,
    noise_strength: f32,
    drag_rate: f32,
}

impl TrailPool {
    /// Allocate the pool. Each slot's `max_life` is drawn from `rng` here and
    /// kept for the lifetime of the pool.
    ///
    /// # Panics
    ///
    /// Panics if `config.capacity` is zero.
    pub fn new<R: Rng>(config: &TrailConfig, rng: &mut R) -> Self {
        assert!(config.capacity > 0, "trail capacity must be non-zero");

        let particles = (0..config.capacity)
            .map(|_| Particle::dormant(config.sample_life(rng)))
            .collect();

        Self {
            particles,
            buffer: TrailBuffer::with_capacity(config.capacity),
            cursor: 0,
            emitted: 0,
            backward_drift: config.backward_drift,
            noise_frequency: config.noise_frequency,
            noise_strength: config.noise_strength,
            drag_rate: config.drag_rate,
        }
    }

    /// Emit one particle at `origin`, overwriting the slot under the cursor.
    ///
    /// The particle drifts opposite to `emitter_velocity`, scaled down by
    /// `backward_drift`. Returns the slot index written.
    pub fn emit(&mut self, origin: Vec3, emitter_velocity: Vec3) -> usize {
        let slot = self.cursor;
        let p = &mut self.particles[slot];
        p.position = origin;
        p.velocity = -emitter_velocity * self.backward_drift;
        p.life = p.max_life;

        self.buffer.positions[slot] = origin;
        self.buffer.alphas[slot] = 1.0;

        self.cursor = (self.cursor + 1) % self.particles.len();
        self.emitted += 1;
        slot
    }

    /// Emit `count` particles spread evenly along the segment `from -> to`,
    /// the last one landing exactly on `to`.
    pub fn emit_along(&mut self, from: Vec3, to: Vec3, count: u32, emitter_velocity: Vec3) {
        for k in 1..=count {
            let origin = from.lerp(to, k as f32 / count as f32);
            self.emit(origin, emitter_velocity);
        }
    }

    /// Age, fade, and move every active particle.
    pub fn update(&mut self, delta: f32, noise: &NoiseField) {
        for (i, p) in self.particles.iter_mut().enumerate() {
            if !p.is_active() {
                continue;
            }

            p.life -= delta;
            if p.life <= 0.0 {
                p.life = 0.0;
                self.buffer.alphas[i] = 0.0;
                continue;
            }

            let t = p.life / p.max_life;
            self.buffer.alphas[i] = t * t;

            let force = noise.sample_vec3(p.position * self.noise_frequency) * self.noise_strength;
            p.velocity += force * delta;
            p.position += p.velocity * delta;
            p.velocity *= 1.0 - self.drag_rate * delta;

            self.buffer.positions[i] = p.position;
        }
    }

    /// Deactivate every particle and rewind the cursor. Slot lifetimes are kept.
    pub fn clear(&mut self) {
        for p in &mut self.particles {
            p.life = 0.0;
        }
        self.buffer.alphas.iter_mut().for_each(|a| *a = 0.0);
        self.cursor = 0;
    }

    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    /// Slot the next emission will write.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Total emissions since the pool was created.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    pub fn active_count(&self) -> usize {
        self.particles.iter().filter(|p| p.is_active()).count()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn buffer(&self) -> &TrailBuffer {
        &self.buffer
    }
}

/// Decides how many particles to emit each frame from plane speed.
#[derive(Clone, Debug, Default)]
pub struct EmissionGate {
    accumulator: f32,
    last_origin: Option<Vec3>,
    last_delta: Option<f32>,
}

impl EmissionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate `delta` and return how many emissions are due at `speed`.
    ///
    /// Too-slow frames reset the accumulator. When more than
    /// `max_emissions_per_frame` are due, the excess is dropped.
    pub fn advance(&mut self, delta: f32, speed: f32, config: &TrailConfig) -> u32 {
        let Some(interval) = config.emission_interval(speed) else {
            self.accumulator = 0.0;
            return 0;
        };

        self.accumulator += delta;
        let mut due = 0;
        while self.accumulator >= interval && due < config.max_emissions_per_frame {
            self.accumulator -= interval;
            due += 1;
        }
        if self.accumulator >= interval {
            self.accumulator = 0.0;
        }
        due
    }

    /// Swap in the current tail position, returning the previous one
    /// (or `current` itself on the first call).
    pub fn track_origin(&mut self, current: Vec3) -> Vec3 {
        self.last_origin.replace(current).unwrap_or(current)
    }

    /// Frame time to convert a per-frame velocity into a per-time speed.
    ///
    /// The larger of `delta` and the previous frame's delta, so a single
    /// short frame does not inflate the speed of a velocity built up over
    /// normal frames.
    pub fn reference_delta(&mut self, delta: f32) -> f32 {
        let previous = self.last_delta.replace(delta).unwrap_or(delta);
        delta.max(previous)
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.last_origin = None;
        self.last_delta = None;
    }
}
