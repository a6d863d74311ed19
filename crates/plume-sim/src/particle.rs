//! Lagrangian particles carrying density and velocity samples.

use glam::DVec3;

/// One smoke particle in world space.
///
/// Each particle deposits one unit of density when rasterized. Its
/// velocity is overwritten every step by sampling the projected field.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Particle {
    /// World-space position.
    pub position: DVec3,
    /// Particle radius in world units.
    pub radius: f64,
    /// Velocity in world units per second.
    pub velocity: DVec3,
}

impl Particle {
    /// A particle with the given position, radius and velocity.
    pub fn new(position: DVec3, radius: f64, velocity: DVec3) -> Self {
        Self {
            position,
            radius,
            velocity,
        }
    }

    /// A particle at rest.
    pub fn at_rest(position: DVec3, radius: f64) -> Self {
        Self::new(position, radius, DVec3::ZERO)
    }
}
