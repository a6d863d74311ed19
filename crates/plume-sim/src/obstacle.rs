//! Persistent solid-cell topology and no-penetration boundary conditions.

use glam::DVec3;
use log::info;
use plume_core::{Axis, CellTransform, Coord, Grid, GridError, GridValue};
use plume_grid::{
    interior_mask, mesh_to_level_set, ScalarGrid, SparseGrid, VectorGrid, LEVEL_SET_HALF_WIDTH,
};

/// Accumulated solid cells, one scalar value of 1 per solid cell.
///
/// Obstacles only ever grow until [`clear`](Self::clear) is called.
#[derive(Clone, Debug)]
pub struct ObstacleMask {
    field: ScalarGrid,
    half_width: f64,
}

impl ObstacleMask {
    /// An empty mask using the default narrow-band half-width.
    pub fn new() -> Self {
        Self::with_half_width(LEVEL_SET_HALF_WIDTH)
    }

    /// An empty mask converting meshes with the given narrow-band
    /// half-width, in voxels.
    pub fn with_half_width(half_width: f64) -> Self {
        Self {
            field: ScalarGrid::new(),
            half_width,
        }
    }

    /// Voxelize a closed triangle mesh and merge its interior into the mask.
    ///
    /// Returns the number of solid cells after the merge.
    ///
    /// # Errors
    ///
    /// Propagates [`GridError`] from mesh conversion; the mask is left
    /// unchanged on error.
    pub fn add_obstacle(
        &mut self,
        transform: &CellTransform,
        vertices: &[DVec3],
        triangles: &[[u32; 3]],
    ) -> Result<usize, GridError> {
        let level_set = mesh_to_level_set(transform, vertices, triangles, self.half_width)?;
        let solid = interior_mask(&level_set);
        let added = solid.active_count();
        self.field.max_combine(&solid);
        info!(
            "obstacle added: {} interior cells, {} solid cells total",
            added,
            self.field.active_count()
        );
        Ok(self.field.active_count())
    }

    /// Remove every obstacle.
    pub fn clear(&mut self) {
        self.field.clear();
        self.field.compact();
    }

    /// Whether `c` is a solid cell.
    pub fn is_solid(&self, c: Coord) -> bool {
        self.field.is_active(c)
    }

    /// Number of solid cells.
    pub fn cell_count(&self) -> usize {
        self.field.active_count()
    }

    /// Whether there are no solid cells.
    pub fn is_empty(&self) -> bool {
        self.field.is_empty()
    }

    /// The solid-cell field.
    pub fn field(&self) -> &ScalarGrid {
        &self.field
    }

    /// Deactivate every solid cell in `field` and release the freed storage.
    pub fn apply_to<T: GridValue>(&self, field: &mut SparseGrid<T>) {
        if self.field.is_empty() {
            return;
        }
        field.topology_difference(&self.field);
        field.compact();
    }

    /// Zero every staggered component that faces a solid cell.
    ///
    /// Component `a` stored at `c` lives on the face shared with
    /// `c - e_a`, so it is zeroed when that cell is solid.
    pub fn zero_obstacle_adjacent_velocity(&self, velocity: &mut VectorGrid) {
        if self.field.is_empty() {
            return;
        }
        for (c, v) in velocity.iter_mut() {
            for axis in Axis::ALL {
                if self.field.is_active(c.step_down(axis)) {
                    v[axis.index()] = 0.0;
                }
            }
        }
    }
}

impl Default for ObstacleMask {
    fn default() -> Self {
        Self::new()
    }
}
