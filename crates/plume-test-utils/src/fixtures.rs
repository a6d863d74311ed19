//! Mesh and particle layout fixtures.

use glam::DVec3;

/// Triangle soup: world-space vertices and index triples.
pub type Mesh = (Vec<DVec3>, Vec<[u32; 3]>);

/// Closed axis-aligned box spanning `min..max`, as 12 triangles.
pub fn box_mesh(min: DVec3, max: DVec3) -> Mesh {
    let vertices = vec![
        DVec3::new(min.x, min.y, min.z),
        DVec3::new(max.x, min.y, min.z),
        DVec3::new(max.x, max.y, min.z),
        DVec3::new(min.x, max.y, min.z),
        DVec3::new(min.x, min.y, max.z),
        DVec3::new(max.x, min.y, max.z),
        DVec3::new(max.x, max.y, max.z),
        DVec3::new(min.x, max.y, max.z),
    ];
    let triangles = vec![
        [0, 2, 1],
        [0, 3, 2],
        [4, 5, 6],
        [4, 6, 7],
        [0, 1, 5],
        [0, 5, 4],
        [3, 7, 6],
        [3, 6, 2],
        [0, 4, 7],
        [0, 7, 3],
        [1, 2, 6],
        [1, 6, 5],
    ];
    (vertices, triangles)
}

/// Horizontal slab (Z-up) centered on the origin in x and y, with
/// `half_extent` reach and its top face at `top`.
pub fn slab_mesh(half_extent: f64, top: f64, thickness: f64) -> Mesh {
    box_mesh(
        DVec3::new(-half_extent, -half_extent, top - thickness),
        DVec3::new(half_extent, half_extent, top),
    )
}

/// Positions on a regular lattice with `spacing`, filling `min..=max`.
pub fn grid_positions(min: DVec3, max: DVec3, spacing: f64) -> Vec<DVec3> {
    let counts = ((max - min) / spacing).floor().as_ivec3() + glam::IVec3::ONE;
    let mut out = Vec::new();
    for z in 0..counts.z.max(0) {
        for y in 0..counts.y.max(0) {
            for x in 0..counts.x.max(0) {
                out.push(min + DVec3::new(x as f64, y as f64, z as f64) * spacing);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_mesh_is_closed() {
        let (v, t) = box_mesh(DVec3::ZERO, DVec3::ONE);
        assert_eq!(v.len(), 8);
        assert_eq!(t.len(), 12);
        // Every edge of a closed mesh is shared by exactly two triangles.
        let mut edges = std::collections::BTreeMap::new();
        for tri in &t {
            for i in 0..3 {
                let (a, b) = (tri[i], tri[(i + 1) % 3]);
                *edges.entry((a.min(b), a.max(b))).or_insert(0) += 1;
            }
        }
        assert!(edges.values().all(|&n| n == 2));
    }

    #[test]
    fn grid_positions_are_inclusive() {
        let pts = grid_positions(DVec3::ZERO, DVec3::new(1.0, 0.0, 0.5), 0.5);
        assert_eq!(pts.len(), 6);
        assert_eq!(pts[0], DVec3::ZERO);
    }
}
