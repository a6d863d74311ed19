//! Pressure projection: make the velocity field divergence-free.
//!
//! Stages run in a fixed order: divergence, row indexing, neighbour
//! classification, matrix assembly, Jacobi preconditioning, PCG solve,
//! pressure reconstruction, gradient, subtraction. Each stage is a free
//! function so it can be tested on its own; [`PressureProjector`] strings
//! them together.

use crate::obstacle::ObstacleMask;
use indexmap::IndexSet;
use log::{trace, warn};
use plume_core::{Axis, Coord, Grid, NEIGHBOUR_OFFSETS};
use plume_grid::{ScalarGrid, VectorGrid};
use plume_solver::{
    solve, Interrupter, JacobiPreconditioner, SolverError, SolverState, SparseMatrix,
    TerminationCriteria,
};

/// Knobs for [`PressureProjector`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectionSettings {
    /// Pressure assumed outside the fluid (at empty neighbours).
    pub background_pressure: f64,
    /// Multiplier on the pressure gradient before subtraction. 1 for a
    /// physical projection; other values are for debugging.
    pub gradient_scale: f64,
    /// Solver stopping rule.
    pub criteria: TerminationCriteria,
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        Self {
            background_pressure: 0.0,
            gradient_scale: 1.0,
            criteria: TerminationCriteria::default(),
        }
    }
}

/// Role of an axis neighbour in the pressure system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NeighbourKind {
    /// Obstacle cell: no flux, no matrix entry.
    Solid,
    /// Active fluid cell with its own unknown.
    Fluid,
    /// Outside the fluid: pressure fixed at the background value.
    Empty,
}

/// Discrete divergence of a staggered velocity field, evaluated on
/// exactly the active cells of `domain`.
pub fn divergence(velocity: &VectorGrid, domain: &ScalarGrid, voxel_size: f64) -> ScalarGrid {
    domain
        .coords()
        .map(|c| {
            let v = velocity.get(c);
            let flux: f64 = Axis::ALL
                .iter()
                .map(|&a| velocity.get(c.step_up(a))[a.index()] - v[a.index()])
                .sum();
            (c, flux / voxel_size)
        })
        .collect()
}

/// Stable bijection between active cells and dense row indices.
#[derive(Clone, Debug, Default)]
pub struct RowIndex {
    cells: IndexSet<Coord>,
}

impl RowIndex {
    /// Index the active cells of `field` in its iteration order.
    pub fn new(field: &ScalarGrid) -> Self {
        Self {
            cells: field.coords().collect(),
        }
    }

    /// Row of an indexed cell.
    pub fn row(&self, c: Coord) -> Option<usize> {
        self.cells.get_index_of(&c)
    }

    /// Cell of a row.
    pub fn coord(&self, row: usize) -> Option<Coord> {
        self.cells.get_index(row).copied()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether there are no rows.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cells in row order.
    pub fn iter(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells.iter().copied()
    }
}

/// Classify the six axis neighbours of `c`, ordered as [`NEIGHBOUR_OFFSETS`].
pub fn classify_neighbours(
    c: Coord,
    fluid: &ScalarGrid,
    obstacles: &ObstacleMask,
) -> [NeighbourKind; 6] {
    NEIGHBOUR_OFFSETS.map(|offset| {
        let n = c + offset;
        if obstacles.is_solid(n) {
            NeighbourKind::Solid
        } else if fluid.is_active(n) {
            NeighbourKind::Fluid
        } else {
            NeighbourKind::Empty
        }
    })
}

/// The pressure Poisson system for one solve.
#[derive(Clone, Debug)]
pub struct LinearSystem {
    /// Row-scaled Laplacian.
    pub matrix: SparseMatrix,
    /// Right-hand side.
    pub rhs: Vec<f64>,
    /// Cell for each row.
    pub index: RowIndex,
}

/// Assemble the Poisson system over the active cells of `divergence`.
///
/// Per row: the diagonal loses one per non-solid neighbour, each fluid
/// neighbour contributes a unit off-diagonal, and each empty neighbour
/// moves `background_pressure` to the right-hand side. A row with only
/// solid neighbours gets a unit diagonal. The matrix row is divided by the
/// voxel size; the right-hand side is not.
pub fn assemble(
    divergence: &ScalarGrid,
    fluid: &ScalarGrid,
    obstacles: &ObstacleMask,
    voxel_size: f64,
    background_pressure: f64,
) -> LinearSystem {
    let index = RowIndex::new(divergence);
    let mut matrix = SparseMatrix::new(index.len());
    let mut rhs = Vec::with_capacity(index.len());

    for (row, (c, div)) in divergence.iter().enumerate() {
        let mut diagonal = 0.0;
        let mut b = div;
        let kinds = classify_neighbours(c, fluid, obstacles);
        for (offset, kind) in NEIGHBOUR_OFFSETS.iter().zip(kinds) {
            match kind {
                NeighbourKind::Solid => {}
                NeighbourKind::Fluid => {
                    diagonal -= 1.0;
                    if let Some(col) = index.row(c + *offset) {
                        matrix.set_value(row, col, 1.0);
                    }
                }
                NeighbourKind::Empty => {
                    diagonal -= 1.0;
                    b -= background_pressure;
                }
            }
        }
        if diagonal == 0.0 {
            diagonal = 1.0;
        }
        matrix.set_value(row, row, diagonal);
        matrix.scale_row(row, 1.0 / voxel_size);
        rhs.push(b);
    }

    LinearSystem { matrix, rhs, index }
}

/// Pressure field from the solution vector: `p = x * voxel_size`.
pub fn reconstruct_pressure(index: &RowIndex, solution: &[f64], voxel_size: f64) -> ScalarGrid {
    index
        .iter()
        .zip(solution)
        .map(|(c, &x)| (c, x * voxel_size))
        .collect()
}

/// Staggered backward-difference gradient of `pressure`.
///
/// Evaluated on every non-solid cell that is a pressure cell or sits one
/// step above one along some axis, so both faces of each pressure cell are
/// covered. Cells without a pressure value read `background_pressure`.
pub fn pressure_gradient(
    pressure: &ScalarGrid,
    obstacles: &ObstacleMask,
    voxel_size: f64,
    background_pressure: f64,
) -> VectorGrid {
    let p_at = |c: Coord| pressure.probe(c).unwrap_or(background_pressure);
    let mut gradient = VectorGrid::with_capacity(pressure.active_count() * 2);
    for c in pressure.coords() {
        let up = Axis::ALL.map(|a| c.step_up(a));
        for cell in std::iter::once(c).chain(up) {
            if gradient.is_active(cell) || obstacles.is_solid(cell) {
                continue;
            }
            let here = p_at(cell);
            let mut g = glam::DVec3::ZERO;
            for axis in Axis::ALL {
                g[axis.index()] = (here - p_at(cell.step_down(axis))) / voxel_size;
            }
            gradient.set(cell, g);
        }
    }
    gradient
}

/// Outcome of one projection.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Projection {
    /// Solver result; trivially successful when nothing was solved.
    pub state: SolverState,
    /// Whether the linear solver actually ran.
    pub solver_invoked: bool,
    /// Number of unknowns in the system.
    pub rows: usize,
}

/// Runs the projection pipeline and keeps the last pressure field.
#[derive(Clone, Debug, Default)]
pub struct PressureProjector {
    settings: ProjectionSettings,
    pressure: ScalarGrid,
    solver_invocations: u64,
}

impl PressureProjector {
    /// A projector with the given settings.
    pub fn new(settings: ProjectionSettings) -> Self {
        Self {
            settings,
            pressure: ScalarGrid::new(),
            solver_invocations: 0,
        }
    }

    /// Current settings.
    pub fn settings(&self) -> &ProjectionSettings {
        &self.settings
    }

    /// Pressure from the last successful projection; empty otherwise.
    pub fn pressure(&self) -> &ScalarGrid {
        &self.pressure
    }

    /// Number of times the linear solver has run.
    pub fn solver_invocations(&self) -> u64 {
        self.solver_invocations
    }

    /// Project `velocity` so the cells of `fluid` become divergence-free.
    ///
    /// On solver non-convergence the pressure is discarded, `velocity` is
    /// left uncorrected and the failed state is returned.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError`] only if the assembled system is structurally
    /// invalid.
    pub fn project(
        &mut self,
        fluid: &ScalarGrid,
        obstacles: &ObstacleMask,
        velocity: &mut VectorGrid,
        voxel_size: f64,
        interrupter: &dyn Interrupter,
    ) -> Result<Projection, SolverError> {
        let s = self.settings;
        self.pressure.clear();

        let div = divergence(velocity, fluid, voxel_size);
        if div.is_empty() {
            trace!("projection skipped: no fluid cells");
            return Ok(Projection {
                state: SolverState::trivial(),
                solver_invoked: false,
                rows: 0,
            });
        }

        let system = assemble(&div, fluid, obstacles, voxel_size, s.background_pressure);
        let preconditioner = JacobiPreconditioner::new(&system.matrix)?;
        let mut x = vec![0.0; system.index.len()];
        self.solver_invocations += 1;
        let state = solve(
            &system.matrix,
            &system.rhs,
            &mut x,
            &preconditioner,
            interrupter,
            s.criteria,
        )?;
        let projection = Projection {
            state,
            solver_invoked: true,
            rows: system.index.len(),
        };
        if !state.success {
            warn!(
                "pressure solve failed after {} iterations (abs {:e}, rel {:e})",
                state.iterations, state.absolute_error, state.relative_error
            );
            return Ok(projection);
        }

        self.pressure = reconstruct_pressure(&system.index, &x, voxel_size);
        let mut gradient =
            pressure_gradient(&self.pressure, obstacles, voxel_size, s.background_pressure);
        gradient.transform_values(|g| g * -s.gradient_scale);
        obstacles.zero_obstacle_adjacent_velocity(&mut gradient);
        velocity.combine(&gradient, |v, g| v + g);
        obstacles.zero_obstacle_adjacent_velocity(velocity);
        Ok(projection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;
    use plume_core::CellTransform;
    use plume_solver::NullInterrupter;
    use plume_test_utils::box_mesh;

    fn block(n: i32) -> ScalarGrid {
        let mut g = ScalarGrid::new();
        for z in 0..n {
            for y in 0..n {
                for x in 0..n {
                    g.set(Coord::new(x, y, z), 1.0);
                }
            }
        }
        g
    }

    fn max_abs(g: &ScalarGrid) -> f64 {
        g.iter().fold(0.0, |m, (_, v)| m.max(v.abs()))
    }

    #[test]
    fn divergence_of_uniform_field_is_zero_inside() {
        let mut velocity = VectorGrid::new();
        for z in -1..4 {
            for y in -1..4 {
                for x in -1..4 {
                    velocity.set(Coord::new(x, y, z), DVec3::new(1.0, 2.0, 3.0));
                }
            }
        }
        let div = divergence(&velocity, &block(3), 0.5);
        assert_eq!(div.active_count(), 27);
        assert_eq!(div.get(Coord::new(1, 1, 1)), 0.0);
    }

    #[test]
    fn divergence_counts_face_fluxes() {
        let mut velocity = VectorGrid::new();
        velocity.set(Coord::new(1, 0, 0), DVec3::new(2.0, 0.0, 0.0));
        let mut domain = ScalarGrid::new();
        domain.set(Coord::new(0, 0, 0), 1.0);
        domain.set(Coord::new(1, 0, 0), 1.0);
        let div = divergence(&velocity, &domain, 0.5);
        assert_eq!(div.get(Coord::new(0, 0, 0)), 4.0);
        assert_eq!(div.get(Coord::new(1, 0, 0)), -4.0);
    }

    #[test]
    fn classification_prefers_solid() {
        let mut obstacles = ObstacleMask::new();
        let xf = CellTransform::uniform(1.0).unwrap();
        let (v, t) = box_mesh(DVec3::new(-1.5, -0.5, -0.5), DVec3::new(-0.5, 0.5, 0.5));
        obstacles.add_obstacle(&xf, &v, &t).unwrap();
        let mut fluid = ScalarGrid::new();
        fluid.set(Coord::new(0, 0, 0), 1.0);
        fluid.set(Coord::new(1, 0, 0), 1.0);
        fluid.set(Coord::new(-1, 0, 0), 1.0);
        let kinds = classify_neighbours(Coord::new(0, 0, 0), &fluid, &obstacles);
        assert_eq!(kinds[0], NeighbourKind::Solid);
        assert_eq!(kinds[1], NeighbourKind::Fluid);
        assert!(kinds[2..].iter().all(|&k| k == NeighbourKind::Empty));
    }

    #[test]
    fn assembly_rows_and_boundary_terms() {
        let obstacles = ObstacleMask::new();
        let mut fluid = ScalarGrid::new();
        fluid.set(Coord::new(0, 0, 0), 1.0);
        fluid.set(Coord::new(1, 0, 0), 1.0);
        let mut div = ScalarGrid::new();
        div.set(Coord::new(0, 0, 0), 3.0);
        div.set(Coord::new(1, 0, 0), -3.0);
        let system = assemble(&div, &fluid, &obstacles, 0.5, 2.0);
        assert_eq!(system.index.len(), 2);
        // Six non-solid neighbours, one of them fluid.
        assert_eq!(system.matrix.get(0, 0), -12.0);
        assert_eq!(system.matrix.get(0, 1), 2.0);
        assert!(system.matrix.is_symmetric(0.0));
        // Five empty neighbours each subtract the unscaled background.
        assert_eq!(system.rhs, vec![3.0 - 10.0, -3.0 - 10.0]);
    }

    #[test]
    fn fully_enclosed_cell_gets_unit_diagonal() {
        let xf = CellTransform::uniform(1.0).unwrap();
        let mut fluid = ScalarGrid::new();
        fluid.set(Coord::new(5, 5, 5), 1.0);
        let mut shell = ObstacleMask::new();
        for c in Coord::new(5, 5, 5).neighbours() {
            let lo = c.as_dvec3() - DVec3::splat(0.5);
            let (v, t) = box_mesh(lo, lo + DVec3::ONE);
            shell.add_obstacle(&xf, &v, &t).unwrap();
        }
        let system = assemble(&fluid, &fluid, &shell, 0.25, 0.0);
        assert_eq!(system.matrix.get(0, 0), 4.0);
        assert_eq!(system.rhs, vec![1.0]);
    }

    #[test]
    fn reconstruct_scales_by_voxel() {
        let index = RowIndex::new(&block(1));
        let p = reconstruct_pressure(&index, &[3.0], 0.5);
        assert_eq!(p.get(Coord::new(0, 0, 0)), 1.5);
    }

    #[test]
    fn gradient_covers_upper_faces_and_reads_background() {
        let mut pressure = ScalarGrid::new();
        pressure.set(Coord::new(0, 0, 0), 2.0);
        let g = pressure_gradient(&pressure, &ObstacleMask::new(), 0.5, 1.0);
        assert_eq!(g.active_count(), 4);
        assert_eq!(g.get(Coord::new(0, 0, 0)), DVec3::splat(2.0));
        assert_eq!(g.get(Coord::new(1, 0, 0)), DVec3::new(-2.0, 0.0, 0.0));
        assert_eq!(g.get(Coord::new(0, 0, 1)), DVec3::new(0.0, 0.0, -2.0));
    }

    #[test]
    fn empty_fluid_skips_the_solver() {
        let mut projector = PressureProjector::default();
        let mut velocity = VectorGrid::new();
        velocity.set(Coord::new(0, 0, 0), DVec3::X);
        let out = projector
            .project(
                &ScalarGrid::new(),
                &ObstacleMask::new(),
                &mut velocity,
                1.0,
                &NullInterrupter,
            )
            .unwrap();
        assert!(out.state.success);
        assert!(!out.solver_invoked);
        assert_eq!(projector.solver_invocations(), 0);
        assert_eq!(velocity.get(Coord::new(0, 0, 0)), DVec3::X);
    }

    #[test]
    fn projection_removes_divergence() {
        let voxel = 0.5;
        let fluid = block(4);
        let mut velocity = VectorGrid::new();
        for (c, _) in fluid.iter() {
            let p = c.as_dvec3();
            let flow = DVec3::new(p.x * 0.3, -p.y * p.y * 0.1, (p.z + p.x).sin());
            velocity.set(c, flow);
        }
        let before = max_abs(&divergence(&velocity, &fluid, voxel));
        assert!(before > 0.1);

        let mut projector = PressureProjector::default();
        let out = projector
            .project(
                &fluid,
                &ObstacleMask::new(),
                &mut velocity,
                voxel,
                &NullInterrupter,
            )
            .unwrap();
        assert!(out.state.success);
        assert!(out.solver_invoked);
        assert_eq!(out.rows, 64);
        assert_eq!(projector.pressure().active_count(), 64);

        let after = max_abs(&divergence(&velocity, &fluid, voxel));
        let bound = (1e-4 * before).max(1e-4);
        assert!(after <= bound * 1.01, "divergence {after} above {bound}");
    }

    #[test]
    fn failed_solve_leaves_velocity_untouched() {
        let settings = ProjectionSettings {
            criteria: TerminationCriteria {
                iterations: 1,
                relative_error: 1e-14,
                absolute_error: 1e-14,
            },
            ..ProjectionSettings::default()
        };
        let mut projector = PressureProjector::new(settings);
        let fluid = block(4);
        let mut velocity = VectorGrid::new();
        for (c, _) in fluid.iter() {
            velocity.set(c, DVec3::new(c.x as f64, 0.0, -(c.z as f64)));
        }
        let original = velocity.clone();
        let out = projector
            .project(
                &fluid,
                &ObstacleMask::new(),
                &mut velocity,
                1.0,
                &NullInterrupter,
            )
            .unwrap();
        assert!(!out.state.success);
        assert_eq!(projector.solver_invocations(), 1);
        assert!(projector.pressure().is_empty());
        assert_eq!(
            velocity.iter().collect::<Vec<_>>(),
            original.iter().collect::<Vec<_>>()
        );
    }
}
