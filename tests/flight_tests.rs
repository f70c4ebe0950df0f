//! Integration tests for a full flight session.
//!
//! These drive `FlightSim` through its public API the way a render loop
//! would: target updates between frames, one `on_frame` per refresh.

use glam::{Vec2, Vec3};
use skytrail::steering::{desired_velocity, PlaneState, SteeringConfig};
use skytrail::trail::{TrailConfig, TrailPool};
use skytrail::{FlightConfig, FlightPhase, FlightSim, NoiseField, PlaneModel};
use rand::rngs::StdRng;
use rand::SeedableRng;

const DT: f32 = 1.0 / 60.0;

fn seeded(capacity: usize) -> FlightConfig {
    FlightConfig::new()
        .with_seed(1234)
        .with_trail(TrailConfig::default().with_capacity(capacity))
}

/// Target path that keeps the plane turning.
fn circling_target(frame: u32) -> Vec3 {
    let t = frame as f32 * 0.02;
    Vec3::new(t.cos() * 400.0, t.sin() * 250.0, (t * 0.5).sin() * 100.0)
}

// ============================================================================
// Arrival steering scenarios
// ============================================================================

#[test]
fn test_full_speed_outside_slowing_radius() {
    let config = SteeringConfig::default()
        .with_max_speed(800.0)
        .with_slowing_radius(300.0);
    let v = desired_velocity(Vec3::ZERO, Vec3::new(0.0, 0.0, 500.0), 1.0, &config);
    assert!((v.length() - 800.0).abs() < 1e-3);
}

#[test]
fn test_half_speed_at_half_radius() {
    let config = SteeringConfig::default()
        .with_max_speed(800.0)
        .with_slowing_radius(300.0);
    let v = desired_velocity(Vec3::ZERO, Vec3::new(150.0, 0.0, 0.0), 1.0, &config);
    assert!((v.length() - 400.0).abs() < 1e-3);
}

#[test]
fn test_velocity_bound_holds_over_session() {
    let config = SteeringConfig::default();
    let mut plane = PlaneState::default();
    for frame in 0..600 {
        let prev = plane.speed();
        plane.step(circling_target(frame), DT, &config);
        let bound = (prev + config.max_force * DT) * config.damping;
        assert!(plane.speed() <= bound + 1e-4, "frame {}", frame);
    }
}

#[test]
fn test_plane_arrives_and_settles() {
    let mut sim = FlightSim::new(seeded(256));
    let target = Vec3::new(120.0, -40.0, 60.0);
    sim.on_target_update(target);
    for _ in 0..1200 {
        sim.on_frame(DT);
    }
    let distance = (sim.pose().position - target).length();
    assert!(distance < 1.0, "distance {}", distance);
    assert!(sim.plane_state().speed() < 0.1);
}

// ============================================================================
// Frame driver phases
// ============================================================================

#[test]
fn test_no_emission_before_first_target() {
    let mut sim = FlightSim::new(seeded(128));
    for _ in 0..300 {
        sim.on_frame(DT);
    }
    assert_eq!(sim.phase(), FlightPhase::Idle);
    assert_eq!(sim.pool().emitted(), 0);
    assert!(sim.trail().alphas.iter().all(|&a| a == 0.0));

    sim.on_target_update(Vec2::new(600.0, 0.0));
    for _ in 0..10 {
        sim.on_frame(DT);
    }
    assert!(sim.pool().emitted() > 0);
}

#[test]
fn test_fresh_particle_ages_in_its_first_frame() {
    let trail = TrailConfig::default()
        .with_capacity(64)
        .with_life_range(2.0..2.0)
        .with_noise(0.01, 0.0);
    let mut sim = FlightSim::new(FlightConfig::new().with_seed(1234).with_trail(trail));
    sim.on_target_update(Vec3::new(0.0, 0.0, 5000.0));
    sim.on_frame(DT);
    assert_eq!(sim.pool().emitted(), 1);

    // Emitted then aged once: a particle aged before emission would still be at 2.0
    let first = sim.pool().particles()[0];
    assert_eq!(first.max_life, 2.0);
    assert_eq!(first.life, 2.0 - DT);

    let expected = ((2.0 - DT) / 2.0) * ((2.0 - DT) / 2.0);
    assert!((sim.trail().alphas[0] - expected).abs() < 1e-6);
    assert!(sim.trail().alphas[0] < 1.0);
}

#[test]
fn test_reset_returns_to_idle_without_emission() {
    let mut sim = FlightSim::new(seeded(64));
    sim.on_target_update(Vec3::new(1000.0, 0.0, 0.0));
    for _ in 0..30 {
        sim.on_frame(DT);
    }
    assert!(sim.pool().active_count() > 0);

    sim.reset();
    assert_eq!(sim.phase(), FlightPhase::Idle);
    assert_eq!(sim.pool().active_count(), 0);

    let emitted = sim.pool().emitted();
    for _ in 0..300 {
        sim.on_frame(DT);
    }
    assert_eq!(sim.pool().emitted(), emitted);
    assert_eq!(sim.pose().position, Vec3::ZERO);
}

#[test]
fn test_trail_expires_after_plane_stops() {
    let mut sim = FlightSim::new(seeded(256));
    sim.on_target_update(Vec3::new(300.0, 0.0, 0.0));
    for _ in 0..60 {
        sim.on_frame(DT);
    }
    assert!(sim.pool().active_count() > 0);

    // Park the target on the plane; it decelerates, drops below the emission
    // speed, and the remaining particles age out.
    sim.on_target_update(sim.pose().position);
    for _ in 0..60 * 10 {
        sim.on_frame(DT);
    }
    assert_eq!(sim.pool().active_count(), 0);
    assert!(sim.trail().alphas.iter().all(|&a| a == 0.0));
}

// ============================================================================
// Trail pool invariants
// ============================================================================

#[test]
fn test_pool_never_exceeds_capacity() {
    let mut sim = FlightSim::new(seeded(16));
    for frame in 0..600 {
        sim.on_target_update(circling_target(frame) * 3.0);
        sim.on_frame(DT);
        assert!(sim.pool().active_count() <= 16);
        assert_eq!(sim.trail().positions.len(), 16);
        assert_eq!(sim.trail().alphas.len(), 16);
    }
    assert!(sim.pool().emitted() > 16);
}

#[test]
fn test_life_resets_only_on_emission() {
    let config = TrailConfig::default().with_capacity(4);
    let mut pool = TrailPool::new(&config, &mut StdRng::seed_from_u64(5));
    let noise = NoiseField::from_seed(5);

    pool.emit(Vec3::ZERO, Vec3::new(0.0, 0.0, -100.0));
    let max_life = pool.particles()[0].max_life;
    assert_eq!(pool.particles()[0].life, max_life);
    assert!((pool.particles()[0].velocity - Vec3::new(0.0, 0.0, 10.0)).length() < 1e-5);

    let mut last = max_life;
    for _ in 0..30 {
        pool.update(DT, &noise);
        let life = pool.particles()[0].life;
        assert!(life < last);
        last = life;
    }

    // Wrap the ring back around to slot 0
    for _ in 0..4 {
        pool.emit(Vec3::ONE, Vec3::X);
    }
    assert_eq!(pool.particles()[0].life, max_life);
    assert_eq!(pool.particles()[0].position, Vec3::ONE);
}

#[test]
fn test_alphas_match_quadratic_fade() {
    let mut sim = FlightSim::new(seeded(64));
    sim.on_target_update(Vec3::new(800.0, 200.0, 0.0));
    for _ in 0..90 {
        sim.on_frame(DT);
    }
    let trail = sim.trail();
    for (p, &alpha) in sim.pool().particles().iter().zip(&trail.alphas) {
        let t = p.life / p.max_life;
        assert!((alpha - t * t).abs() < 1e-6);
        assert!(p.life >= 0.0 && p.life <= p.max_life);
    }
}

// ============================================================================
// Determinism and snapshots
// ============================================================================

#[test]
fn test_same_seed_same_session() {
    let mut a = FlightSim::new(seeded(128));
    let mut b = FlightSim::new(seeded(128));
    for frame in 0..240 {
        let target = circling_target(frame);
        a.on_target_update(target);
        b.on_target_update(target);
        a.on_frame(DT);
        b.on_frame(DT);
    }
    assert_eq!(a.pose(), b.pose());
    assert_eq!(a.trail().positions, b.trail().positions);
    assert_eq!(a.trail().alphas, b.trail().alphas);
}

#[test]
fn test_plane_state_round_trip_resumes_identically() {
    let mut original = FlightSim::new(seeded(64));
    for frame in 0..120 {
        original.on_target_update(circling_target(frame));
        original.on_frame(DT);
    }

    let saved = serde_json::to_value(original.plane_state()).unwrap();
    let restored_state: PlaneState = serde_json::from_value(saved).unwrap();
    assert_eq!(restored_state, original.plane_state());

    let mut resumed = FlightSim::new(seeded(64));
    resumed.on_target_update(circling_target(119));
    resumed.restore_plane_state(restored_state);
    assert_eq!(resumed.pose(), original.pose());

    for frame in 120..360 {
        let target = circling_target(frame);
        original.on_target_update(target);
        resumed.on_target_update(target);
        original.on_frame(DT);
        resumed.on_frame(DT);

        let a = original.plane_state();
        let b = resumed.plane_state();
        assert_eq!(a.position.to_array().map(f32::to_bits), b.position.to_array().map(f32::to_bits));
        assert_eq!(a.velocity.to_array().map(f32::to_bits), b.velocity.to_array().map(f32::to_bits));
        assert_eq!(a.orientation.to_array().map(f32::to_bits), b.orientation.to_array().map(f32::to_bits));
    }
}

#[test]
fn test_plane_state_json_text() {
    let state = PlaneState::at(Vec3::new(1.0, 2.0, 3.0));
    let json = serde_json::to_string(&state).unwrap();
    let back: PlaneState = serde_json::from_str(&json).unwrap();
    assert_eq!(back, state);
}

// ============================================================================
// Plane models
// ============================================================================

#[test]
fn test_trail_leaves_from_tail() {
    let mut sim = FlightSim::new(seeded(64).with_model(PlaneModel::Dart));
    sim.on_target_update(Vec3::new(0.0, 0.0, 5000.0));
    sim.on_frame(DT);
    assert_eq!(sim.pool().emitted(), 1);

    // Flying toward +Z while still mostly unrotated, the tail sits behind the plane
    let state = sim.plane_state();
    let tail = state.local_to_world(PlaneModel::Dart.tail_offset());
    let first = sim.pool().particles()[0];
    assert!((first.position - tail).length() < 2.0);
    assert!(first.position.z < state.position.z);
}
