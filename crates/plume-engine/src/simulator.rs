//! The owned smoke simulator.
//!
//! [`Simulator`] holds all persistent state (particles, density, velocity,
//! obstacles, last solve) and runs the fixed per-step pipeline:
//!
//! 1. rasterize particles into density and velocity;
//! 2. prune faint density;
//! 3. carve obstacles out of both fields and prune again;
//! 4. apply gravity over the density topology;
//! 5. self-advect velocity;
//! 6. project velocity to be divergence-free;
//! 7. integrate particles through the projected velocity.
//!
//! Velocity components facing a solid cell are zeroed after every stage
//! that writes velocity.
//!
//! # Ownership model
//!
//! `Simulator` is [`Send`] but all mutation goes through `&mut self`, so
//! two concurrent steps on one instance cannot compile. Dropping it frees
//! every field.

use std::time::Instant;

use glam::DVec3;
use log::{debug, info, trace, warn};
use plume_core::{CellTransform, Grid, GridError, StepError, StepId};
use plume_grid::{ScalarGrid, VectorGrid};
use plume_sim::{
    advect_velocity, apply_forces, gravity_field, rasterize_to_grid, scatter_in_mesh,
    update_particles, ObstacleMask, Particle, PressureProjector, Projection,
};
use plume_solver::{NullInterrupter, SolverState};

use crate::config::{ConfigError, SimConfig};
use crate::metrics::StepMetrics;

// Compile-time assertion: Simulator is Send.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<Simulator>();
    }
};

const STAGES: [&str; 6] = [
    "rasterize",
    "obstacles",
    "forces",
    "advect",
    "project",
    "integrate",
];

// ── StepReport ──────────────────────────────────────────────────

/// Result of a [`Simulator::try_step()`] call.
#[derive(Clone, Debug, PartialEq)]
pub struct StepReport {
    /// Identifier of the step just completed.
    pub step_id: StepId,
    /// Pressure solve outcome. With substeps, the first failing substep's
    /// state, or the last substep's when all succeeded.
    pub solve: SolverState,
    /// Whether the linear solver ran in any substep.
    pub solver_invoked: bool,
    /// Performance metrics for this step.
    pub metrics: StepMetrics,
}

// ── Simulator ───────────────────────────────────────────────────

/// Particle-driven smoke simulation on a sparse staggered grid.
pub struct Simulator {
    config: SimConfig,
    particles: Vec<Particle>,
    density: ScalarGrid,
    velocity: VectorGrid,
    obstacles: ObstacleMask,
    projector: PressureProjector,
    last_solve: SolverState,
    last_metrics: StepMetrics,
    step_id: StepId,
}

impl Simulator {
    /// Create a simulator from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config` fails validation.
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    /// Create a simulator with default settings on the given transform.
    pub fn with_transform(transform: CellTransform) -> Self {
        Self::from_valid(SimConfig {
            transform,
            ..SimConfig::default()
        })
    }

    fn from_valid(config: SimConfig) -> Self {
        Self {
            particles: Vec::new(),
            density: ScalarGrid::new(),
            velocity: VectorGrid::new(),
            obstacles: ObstacleMask::with_half_width(config.obstacle_half_width),
            projector: PressureProjector::new(config.projection_settings()),
            last_solve: SolverState::trivial(),
            last_metrics: StepMetrics::default(),
            step_id: StepId::default(),
            config,
        }
    }

    // ── Scene setup ─────────────────────────────────────────────

    /// Voxelize a closed triangle mesh and add it to the obstacles.
    ///
    /// Returns the total number of solid cells.
    ///
    /// # Errors
    ///
    /// Returns [`GridError`] for out-of-range triangle indices or
    /// non-finite vertices; existing obstacles are kept.
    pub fn add_obstacle(
        &mut self,
        vertices: &[DVec3],
        triangles: &[[u32; 3]],
    ) -> Result<usize, GridError> {
        self.obstacles
            .add_obstacle(&self.config.transform, vertices, triangles)
    }

    /// Remove every obstacle.
    pub fn clear_obstacles(&mut self) {
        self.obstacles.clear();
    }

    /// Replace the uniform body acceleration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NonFiniteGravity`] for a non-finite vector;
    /// the current gravity is kept.
    pub fn set_gravity(&mut self, gravity: DVec3) -> Result<(), ConfigError> {
        if !gravity.is_finite() {
            warn!("gravity {gravity} rejected: not finite");
            return Err(ConfigError::NonFiniteGravity);
        }
        self.config.gravity = gravity;
        Ok(())
    }

    /// Seed the particle cloud. Seeding happens once: if particles already
    /// exist the call is ignored. Returns the number of particles added.
    pub fn seed_particles(&mut self, particles: impl IntoIterator<Item = Particle>) -> usize {
        if !self.particles.is_empty() {
            debug!(
                "seed ignored: {} particles already present",
                self.particles.len()
            );
            return 0;
        }
        self.particles.extend(particles);
        info!("seeded {} particles", self.particles.len());
        self.particles.len()
    }

    /// Seed `points_per_cell` particles at rest in every voxel inside a
    /// closed mesh, jittered deterministically from `seed`. Same one-shot
    /// rule as [`seed_particles`](Self::seed_particles).
    ///
    /// # Errors
    ///
    /// Returns [`GridError`] if the mesh is malformed.
    pub fn seed_from_mesh(
        &mut self,
        vertices: &[DVec3],
        triangles: &[[u32; 3]],
        points_per_cell: usize,
        seed: u64,
    ) -> Result<usize, GridError> {
        if !self.particles.is_empty() {
            debug!(
                "mesh seed ignored: {} particles already present",
                self.particles.len()
            );
            return Ok(0);
        }
        let transform = &self.config.transform;
        let particles = scatter_in_mesh(
            transform,
            vertices,
            triangles,
            self.config.obstacle_half_width,
            points_per_cell,
            0.5 * transform.voxel_size(),
            seed,
        )?;
        Ok(self.seed_particles(particles))
    }

    // ── Stepping ────────────────────────────────────────────────

    /// Advance by `dt`. Returns `false` if any pressure solve failed to
    /// converge or `dt` was rejected; the simulation stays usable either way.
    pub fn step(&mut self, dt: f64) -> bool {
        match self.try_step(dt) {
            Ok(report) => report.solve.success,
            Err(e) => {
                warn!("step rejected: {e}");
                false
            }
        }
    }

    /// Advance by `dt`, returning the full step report.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::InvalidDt`] for a non-finite or non-positive
    /// `dt` (state is untouched), or [`StepError::SolverMisuse`] if the
    /// pressure system was structurally invalid.
    pub fn try_step(&mut self, dt: f64) -> Result<StepReport, StepError> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(StepError::InvalidDt { value: dt });
        }
        let step_start = Instant::now();
        let substeps = self.config.substeps.max(1);
        let sub_dt = dt / f64::from(substeps);

        let mut stage_us = [0u64; STAGES.len()];
        let mut solve: Option<SolverState> = None;
        let mut solver_invoked = false;
        let mut solver_iterations = 0;

        for _ in 0..substeps {
            let projection = self.run_pipeline(sub_dt, &mut stage_us)?;
            solver_invoked |= projection.solver_invoked;
            solver_iterations += projection.state.iterations;
            if solve.is_none_or(|s| s.success) {
                solve = Some(projection.state);
            }
        }

        let solve = solve.unwrap_or_else(SolverState::trivial);
        self.last_solve = solve;
        self.step_id = self.step_id.next();

        let metrics = StepMetrics {
            total_us: step_start.elapsed().as_micros() as u64,
            stage_us: STAGES.iter().copied().zip(stage_us).collect(),
            particle_count: self.particles.len(),
            density_cells: self.density.active_count(),
            velocity_cells: self.velocity.active_count(),
            solver_iterations,
        };
        trace!(
            "step {} stage timings (us): {:?}",
            self.step_id,
            metrics.stage_us
        );
        debug!(
            "step {}: {} particles, {} density cells, {} velocity cells, solve ok={} iters={} in {}us",
            self.step_id,
            metrics.particle_count,
            metrics.density_cells,
            metrics.velocity_cells,
            solve.success,
            solver_iterations,
            metrics.total_us
        );
        self.last_metrics = metrics.clone();

        Ok(StepReport {
            step_id: self.step_id,
            solve,
            solver_invoked,
            metrics,
        })
    }

    /// One pass of the pipeline over `dt`, adding stage timings into `stage_us`.
    fn run_pipeline(
        &mut self,
        dt: f64,
        stage_us: &mut [u64; STAGES.len()],
    ) -> Result<Projection, StepError> {
        let transform = self.config.transform;
        let voxel = transform.voxel_size();
        let tolerance = self.config.density_prune_tolerance;
        let mut clock = Instant::now();
        let mut lap = |slot: &mut u64| {
            *slot += clock.elapsed().as_micros() as u64;
            clock = Instant::now();
        };

        rasterize_to_grid(
            &transform,
            &self.particles,
            &mut self.density,
            &mut self.velocity,
        );
        self.density.prune(tolerance);
        lap(&mut stage_us[0]);

        self.obstacles.apply_to(&mut self.density);
        self.obstacles.apply_to(&mut self.velocity);
        self.density.prune(tolerance);
        lap(&mut stage_us[1]);

        let forces = gravity_field(&self.density, self.config.gravity);
        apply_forces(&mut self.velocity, &forces, dt);
        self.obstacles.zero_obstacle_adjacent_velocity(&mut self.velocity);
        lap(&mut stage_us[2]);

        advect_velocity(&transform, &mut self.velocity, dt);
        self.obstacles.zero_obstacle_adjacent_velocity(&mut self.velocity);
        lap(&mut stage_us[3]);

        let projection = self
            .projector
            .project(
                &self.density,
                &self.obstacles,
                &mut self.velocity,
                voxel,
                &NullInterrupter,
            )
            .map_err(|e| StepError::SolverMisuse {
                reason: e.to_string(),
            })?;
        lap(&mut stage_us[4]);

        update_particles(&transform, &mut self.particles, &self.velocity, dt);
        lap(&mut stage_us[5]);

        Ok(projection)
    }

    // ── Accessors ───────────────────────────────────────────────

    /// Density field from the most recent step.
    pub fn density(&self) -> &ScalarGrid {
        &self.density
    }

    /// Staggered velocity field from the most recent step.
    pub fn velocity(&self) -> &VectorGrid {
        &self.velocity
    }

    /// Pressure from the most recent successful projection.
    pub fn pressure(&self) -> &ScalarGrid {
        self.projector.pressure()
    }

    /// Accumulated obstacles.
    pub fn obstacles(&self) -> &ObstacleMask {
        &self.obstacles
    }

    /// The particle cloud.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Pressure solve outcome from the most recent step.
    pub fn last_solve(&self) -> SolverState {
        self.last_solve
    }

    /// Metrics from the most recent step.
    pub fn last_metrics(&self) -> &StepMetrics {
        &self.last_metrics
    }

    /// Number of times the pressure solver has run.
    pub fn solver_invocations(&self) -> u64 {
        self.projector.solver_invocations()
    }

    /// Identifier of the last completed step (zero before the first).
    pub fn current_step(&self) -> StepId {
        self.step_id
    }

    /// Active configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// The shared world/index transform.
    pub fn transform(&self) -> &CellTransform {
        &self.config.transform
    }
}

impl std::fmt::Debug for Simulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulator")
            .field("current_step", &self.step_id)
            .field("particles", &self.particles.len())
            .field("density_cells", &self.density.active_count())
            .field("solid_cells", &self.obstacles.cell_count())
            .finish()
    }
}
