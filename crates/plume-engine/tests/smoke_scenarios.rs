//! Integration test: end-to-end smoke scenarios.
//!
//! A lone particle, at rest and moving, and a column of smoke falling onto
//! a solid slab. The slab scenario checks no-penetration at the solid faces
//! and that projection drives divergence from clearly nonzero to within the
//! solver tolerance.

use glam::DVec3;
use plume_core::{Axis, CellTransform, Coord, Grid};
use plume_engine::{SimConfig, Simulator};
use plume_sim::Particle;
use plume_test_utils::{grid_positions, init_logging, max_divergence, slab_mesh};

// ── Scenario A: single particle ──────────────────────────────────────

#[test]
fn single_particle_at_rest_without_gravity() {
    init_logging();
    let config = SimConfig {
        transform: CellTransform::uniform(0.5).unwrap(),
        gravity: DVec3::ZERO,
        ..SimConfig::default()
    };
    let mut sim = Simulator::new(config).unwrap();
    let start = DVec3::new(0.3, 0.55, 0.8);
    sim.seed_particles([Particle::at_rest(start, 0.25)]);

    assert!(sim.step(0.1));

    // Index position (0.6, 1.1, 1.6): one trilinear stencil based at (0, 1, 1).
    let base = Coord::new(0, 1, 1);
    assert_eq!(sim.density().active_count(), 8);
    for c in sim.density().coords() {
        let d = c - base;
        assert!(
            (0..=1).contains(&d.x) && (0..=1).contains(&d.y) && (0..=1).contains(&d.z)
        );
    }
    let total: f64 = sim.density().iter().map(|(_, d)| d).sum();
    assert!((total - 1.0).abs() < 1e-12);

    for (c, v) in sim.velocity().iter() {
        let d = c - base;
        assert!(
            (-1..=2).contains(&d.x) && (-1..=2).contains(&d.y) && (-1..=2).contains(&d.z)
        );
        assert_eq!(v, DVec3::ZERO);
    }

    let p = sim.particles()[0];
    assert!((p.position - start).length() <= 1e-12);
    assert_eq!(p.velocity, DVec3::ZERO);
}

#[test]
fn single_moving_particle_travels_at_most_its_speed() {
    init_logging();
    let dt = 0.1;
    let start = DVec3::new(0.3, 0.55, 0.8);
    for initial in [
        DVec3::new(1.0, 0.0, 0.0),
        DVec3::new(0.7, -0.4, 1.3),
        DVec3::new(0.0, 0.0, 2.0),
    ] {
        let config = SimConfig {
            transform: CellTransform::uniform(0.5).unwrap(),
            gravity: DVec3::ZERO,
            ..SimConfig::default()
        };
        let mut sim = Simulator::new(config).unwrap();
        sim.seed_particles([Particle::new(start, 0.25, initial)]);

        assert!(sim.step(dt), "solve failed for initial velocity {initial}");

        let base = Coord::new(0, 1, 1);
        assert_eq!(sim.density().active_count(), 8);
        for c in sim.density().coords() {
            let d = c - base;
            assert!(
                (0..=1).contains(&d.x) && (0..=1).contains(&d.y) && (0..=1).contains(&d.z)
            );
        }

        let p = sim.particles()[0];
        let moved = (p.position - start).length();
        let bound = initial.length() * dt;
        assert!(
            moved <= bound + 1e-12,
            "moved {moved} > {bound} for {initial}"
        );
        assert!(p.velocity.is_finite());
    }
}

// ── Scenario B: smoke column on a slab ───────────────────────────────

fn slab_scene(gradient_scale: f64) -> Simulator {
    let config = SimConfig {
        transform: CellTransform::uniform(1.0).unwrap(),
        gradient_scale,
        ..SimConfig::default()
    };
    let mut sim = Simulator::new(config).unwrap();
    // Solid cells z in {-3, -2, -1}; the slab's top face is the lower face
    // of the z = 0 layer.
    let (v, t) = slab_mesh(4.5, -0.5, 3.0);
    assert_eq!(sim.add_obstacle(&v, &t).unwrap(), 9 * 9 * 3);
    let column = grid_positions(
        DVec3::new(-1.0, -1.0, 0.25),
        DVec3::new(1.0, 1.0, 2.25),
        0.5,
    );
    sim.seed_particles(column.into_iter().map(|p| Particle::at_rest(p, 0.25)));
    sim
}

#[test]
fn slab_blocks_vertical_flow_at_its_top_face() {
    init_logging();
    let mut sim = slab_scene(1.0);
    for _ in 0..3 {
        assert!(sim.step(0.05));
    }
    let mut checked = 0;
    for (c, v) in sim.velocity().iter() {
        for axis in Axis::ALL {
            if sim.obstacles().is_solid(c.step_down(axis)) {
                assert_eq!(
                    v[axis.index()],
                    0.0,
                    "component {axis:?} at {c} faces a solid"
                );
                checked += 1;
            }
        }
        assert!(
            !sim.obstacles().is_solid(c),
            "velocity active inside solid at {c}"
        );
    }
    assert!(checked > 0, "no velocity sample touched the slab");
    let solid = sim.obstacles();
    assert!(sim.density().coords().all(|c| !solid.is_solid(c)));
}

#[test]
fn projection_removes_divergence_created_by_gravity() {
    init_logging();
    let dt = 0.05;

    let mut uncorrected = slab_scene(0.0);
    assert!(uncorrected.step(dt));
    let before = max_divergence(uncorrected.velocity(), uncorrected.density(), 1.0);
    assert!(
        before > 0.1,
        "gravity should create divergence, got {before}"
    );

    let mut projected = slab_scene(1.0);
    assert!(projected.step(dt));
    assert!(projected.last_solve().success);
    let after = max_divergence(projected.velocity(), projected.density(), 1.0);
    let bound = (1e-4 * before).max(1e-4);
    assert!(
        after <= bound * 1.05 + 1e-9,
        "divergence {after} exceeds {bound}"
    );
}

#[test]
fn smoke_falls_but_stops_at_the_slab() {
    let mut sim = slab_scene(1.0);
    for _ in 0..10 {
        assert!(sim.step(0.05));
    }
    for p in sim.particles() {
        assert!(p.position.is_finite());
        assert!(
            p.position.z > -0.5 - 1e-6,
            "particle sank into the slab: {}",
            p.position
        );
    }
}
