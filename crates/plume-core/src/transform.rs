//! Uniform-voxel world/index transform.

use crate::coord::Coord;
use crate::error::GridError;
use glam::DVec3;

/// Similarity mapping between world space and voxel index space.
///
/// `index = (world - origin) / voxel_size`. Voxel centers sit at integer
/// index positions, so `index_to_world(Coord(0,0,0)) == origin`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellTransform {
    voxel_size: f64,
    origin: DVec3,
}

impl CellTransform {
    /// Create a transform with the given voxel edge length and origin.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidVoxelSize`] if `voxel_size` is not
    /// finite and strictly positive, or [`GridError::NonFiniteOrigin`]
    /// if the origin has a non-finite component.
    pub fn new(voxel_size: f64, origin: DVec3) -> Result<Self, GridError> {
        if !voxel_size.is_finite() || voxel_size <= 0.0 {
            return Err(GridError::InvalidVoxelSize { value: voxel_size });
        }
        if !origin.is_finite() {
            return Err(GridError::NonFiniteOrigin);
        }
        Ok(Self { voxel_size, origin })
    }

    /// Transform with the given voxel size and origin at the world origin.
    pub fn uniform(voxel_size: f64) -> Result<Self, GridError> {
        Self::new(voxel_size, DVec3::ZERO)
    }

    /// Edge length of one voxel in world units.
    pub fn voxel_size(&self) -> f64 {
        self.voxel_size
    }

    /// World position of voxel `(0, 0, 0)`'s center.
    pub fn origin(&self) -> DVec3 {
        self.origin
    }

    /// Map a world position to fractional index space.
    pub fn world_to_index(&self, p: DVec3) -> DVec3 {
        (p - self.origin) / self.voxel_size
    }

    /// Map a fractional index-space position to world space.
    pub fn index_to_world(&self, p: DVec3) -> DVec3 {
        p * self.voxel_size + self.origin
    }

    /// World position of a voxel center.
    pub fn cell_center(&self, c: Coord) -> DVec3 {
        self.index_to_world(c.as_dvec3())
    }

    /// Voxel containing the world position `p`.
    pub fn world_to_cell(&self, p: DVec3) -> Coord {
        Coord::floor(self.world_to_index(p) + DVec3::splat(0.5))
    }
}

impl Default for CellTransform {
    /// Unit voxels with the origin at the world origin.
    fn default() -> Self {
        Self {
            voxel_size: 1.0,
            origin: DVec3::ZERO,
        }
    }
}
