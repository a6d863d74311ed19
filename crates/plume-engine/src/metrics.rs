//! Per-step performance metrics for the simulator.
//!
//! [`StepMetrics`] captures timing and size data for a single
//! `step()` call, summed over substeps.

/// Timing and size metrics collected during a single step.
///
/// All durations are in microseconds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepMetrics {
    /// Wall-clock time for the entire step.
    pub total_us: u64,
    /// Per-stage execution times, in pipeline order: `(name, microseconds)`.
    pub stage_us: Vec<(&'static str, u64)>,
    /// Particles integrated.
    pub particle_count: usize,
    /// Active density cells after the last substep's carving.
    pub density_cells: usize,
    /// Active velocity cells after the last substep's projection.
    pub velocity_cells: usize,
    /// Solver iterations summed over substeps.
    pub solver_iterations: usize,
}

impl StepMetrics {
    /// Time recorded for a named stage, if it ran.
    pub fn stage(&self, name: &str) -> Option<u64> {
        self.stage_us
            .iter()
            .find(|(n, _)| *n == name)
            .map(|&(_, us)| us)
    }
}
