//! Simulator orchestration for Plume smoke simulations.
//!
//! - [`SimConfig`] and [`ConfigError`]: construction input and validation.
//! - [`Simulator`]: owns all state and runs the fixed step pipeline.
//! - [`StepMetrics`]: per-step timings and sizes.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod metrics;
pub mod simulator;

pub use config::{ConfigError, SimConfig, SolverSettings};
pub use metrics::StepMetrics;
pub use simulator::{Simulator, StepReport};
