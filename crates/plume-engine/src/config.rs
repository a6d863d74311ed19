//! Simulator configuration, validation, and error types.
//!
//! [`SimConfig`] is the construction input for a
//! [`Simulator`](crate::Simulator). [`validate()`](SimConfig::validate)
//! checks every numeric invariant up front so the step pipeline never has
//! to.

use std::error::Error;
use std::fmt;

use glam::DVec3;
use plume_core::{CellTransform, GridError};
use plume_grid::LEVEL_SET_HALF_WIDTH;
use plume_sim::ProjectionSettings;
use plume_solver::TerminationCriteria;

// ── SolverSettings ────────────────────────────────────────────────

/// Pressure solver stopping rule.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolverSettings {
    /// Iteration cap. Default: 100.
    pub max_iterations: usize,
    /// Relative residual threshold. Default: 1e-4.
    pub relative_tolerance: f64,
    /// Absolute residual threshold. Default: 1e-4.
    pub absolute_tolerance: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            relative_tolerance: 1e-4,
            absolute_tolerance: 1e-4,
        }
    }
}

impl From<SolverSettings> for TerminationCriteria {
    fn from(s: SolverSettings) -> Self {
        Self {
            iterations: s.max_iterations,
            relative_error: s.relative_tolerance,
            absolute_error: s.absolute_tolerance,
        }
    }
}

// ── ConfigError ───────────────────────────────────────────────────

/// Errors detected during [`SimConfig::validate()`].
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// The grid transform could not be built.
    Grid(GridError),
    /// Gravity has a NaN or infinite component.
    NonFiniteGravity,
    /// Density prune tolerance is NaN, infinite, or negative.
    InvalidPruneTolerance {
        /// The invalid value.
        value: f64,
    },
    /// Background pressure is NaN or infinite.
    InvalidBackgroundPressure {
        /// The invalid value.
        value: f64,
    },
    /// Gradient scale is NaN or infinite.
    InvalidGradientScale {
        /// The invalid value.
        value: f64,
    },
    /// Obstacle narrow-band half-width is NaN, infinite, zero, or negative.
    InvalidObstacleHalfWidth {
        /// The invalid value, in voxels.
        value: f64,
    },
    /// Substep count is zero.
    ZeroSubsteps,
    /// Solver settings invariant violated.
    InvalidSolver {
        /// Description of which invariant was violated.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grid(e) => write!(f, "grid: {e}"),
            Self::NonFiniteGravity => write!(f, "gravity must be finite"),
            Self::InvalidPruneTolerance { value } => {
                write!(
                    f,
                    "density_prune_tolerance must be finite and >= 0, got {value}"
                )
            }
            Self::InvalidBackgroundPressure { value } => {
                write!(f, "background_pressure must be finite, got {value}")
            }
            Self::InvalidGradientScale { value } => {
                write!(f, "gradient_scale must be finite, got {value}")
            }
            Self::InvalidObstacleHalfWidth { value } => {
                write!(
                    f,
                    "obstacle_half_width must be finite and positive, got {value}"
                )
            }
            Self::ZeroSubsteps => write!(f, "substeps must be at least 1"),
            Self::InvalidSolver { reason } => write!(f, "invalid solver settings: {reason}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Grid(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GridError> for ConfigError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}

// ── SimConfig ─────────────────────────────────────────────────────

/// Complete configuration for constructing a [`Simulator`](crate::Simulator).
#[derive(Clone, Debug, PartialEq)]
pub struct SimConfig {
    /// World/index transform shared by every field.
    pub transform: CellTransform,
    /// Uniform body acceleration. Default: `(0, 0, -9.81)` (Z-up).
    pub gravity: DVec3,
    /// Density cells below this magnitude are deactivated. Default: 1e-4.
    pub density_prune_tolerance: f64,
    /// Pressure assumed outside the fluid. Default: 0.
    pub background_pressure: f64,
    /// Multiplier on the pressure gradient. Default: 1.
    pub gradient_scale: f64,
    /// Narrow-band half-width for mesh conversion, in voxels. Default: 3.
    pub obstacle_half_width: f64,
    /// Pipeline runs per `step(dt)`, each advancing `dt / substeps`. Default: 1.
    pub substeps: u32,
    /// Pressure solver stopping rule.
    pub solver: SolverSettings,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            transform: CellTransform::default(),
            gravity: DVec3::new(0.0, 0.0, -9.81),
            density_prune_tolerance: 1e-4,
            background_pressure: 0.0,
            gradient_scale: 1.0,
            obstacle_half_width: LEVEL_SET_HALF_WIDTH,
            substeps: 1,
            solver: SolverSettings::default(),
        }
    }
}

impl SimConfig {
    /// Default configuration on a grid with the given voxel size and origin.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Grid`] if the transform is invalid.
    pub fn with_voxel_size(voxel_size: f64, origin: DVec3) -> Result<Self, ConfigError> {
        Ok(Self {
            transform: CellTransform::new(voxel_size, origin)?,
            ..Self::default()
        })
    }

    /// Validate all numeric invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.gravity.is_finite() {
            return Err(ConfigError::NonFiniteGravity);
        }
        let tol = self.density_prune_tolerance;
        if !tol.is_finite() || tol < 0.0 {
            return Err(ConfigError::InvalidPruneTolerance { value: tol });
        }
        if !self.background_pressure.is_finite() {
            return Err(ConfigError::InvalidBackgroundPressure {
                value: self.background_pressure,
            });
        }
        if !self.gradient_scale.is_finite() {
            return Err(ConfigError::InvalidGradientScale {
                value: self.gradient_scale,
            });
        }
        let hw = self.obstacle_half_width;
        if !hw.is_finite() || hw <= 0.0 {
            return Err(ConfigError::InvalidObstacleHalfWidth { value: hw });
        }
        if self.substeps == 0 {
            return Err(ConfigError::ZeroSubsteps);
        }
        let s = &self.solver;
        if s.max_iterations == 0 {
            return Err(ConfigError::InvalidSolver {
                reason: "max_iterations must be at least 1".to_string(),
            });
        }
        for (name, value) in [
            ("relative_tolerance", s.relative_tolerance),
            ("absolute_tolerance", s.absolute_tolerance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidSolver {
                    reason: format!("{name} must be finite and >= 0, got {value}"),
                });
            }
        }
        Ok(())
    }

    /// Projection settings derived from this configuration.
    pub fn projection_settings(&self) -> ProjectionSettings {
        ProjectionSettings {
            background_pressure: self.background_pressure,
            gradient_scale: self.gradient_scale,
            criteria: self.solver.into(),
        }
    }
}
