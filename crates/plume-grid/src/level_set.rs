//! Closed triangle mesh to narrow-band signed distance field.
//!
//! The level set stores signed distances (world units, negative inside)
//! for every voxel within `half_width` voxels of the surface. Voxels deeper
//! inside than the band are also active, clamped to `-half_width` voxels,
//! so the interior mask can be read straight off the sign without a flood
//! fill. Exterior voxels beyond the band are inactive.
//!
//! Inside/outside is decided per voxel center by ray parity along +x,
//! which only requires the mesh to be closed; winding order is ignored.

use crate::sparse::SparseGrid;
use glam::{DVec2, DVec3};
use indexmap::{IndexMap, IndexSet};
use log::debug;
use plume_core::{CellTransform, Coord, Grid, GridError};
use smallvec::SmallVec;

/// Default narrow-band half-width, in voxels.
pub const LEVEL_SET_HALF_WIDTH: f64 = 3.0;

/// Row rays are nudged off the lattice so they never graze an edge or
/// vertex that sits exactly on integer coordinates.
const RAY_JITTER: DVec2 = DVec2::new(1.234_567e-6, 2.345_678e-6);

/// Convert a closed triangle mesh to a narrow-band signed distance field.
///
/// `vertices` are world-space positions; each triangle indexes three of
/// them. `half_width` is measured in voxels.
///
/// # Errors
///
/// - [`GridError::InvalidHalfWidth`] if `half_width` is not finite and positive.
/// - [`GridError::NonFiniteVertex`] if any vertex has a NaN or infinite coordinate.
/// - [`GridError::MeshIndexOutOfRange`] if a triangle references a missing vertex.
pub fn mesh_to_level_set(
    transform: &CellTransform,
    vertices: &[DVec3],
    triangles: &[[u32; 3]],
    half_width: f64,
) -> Result<SparseGrid<f64>, GridError> {
    if !half_width.is_finite() || half_width <= 0.0 {
        return Err(GridError::InvalidHalfWidth { value: half_width });
    }
    if let Some(index) = vertices.iter().position(|v| !v.is_finite()) {
        return Err(GridError::NonFiniteVertex { index });
    }
    for (t, tri) in triangles.iter().enumerate() {
        if let Some(&vertex) = tri.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(GridError::MeshIndexOutOfRange {
                triangle: t,
                vertex,
                vertex_count: vertices.len(),
            });
        }
    }

    let points: Vec<DVec3> = vertices
        .iter()
        .map(|&v| transform.world_to_index(v))
        .collect();
    let tris: Vec<[DVec3; 3]> = triangles
        .iter()
        .map(|t| t.map(|i| points[i as usize]))
        .collect();

    let band = unsigned_band(&tris, half_width);
    let inside = interior_cells(&tris);
    let voxel = transform.voxel_size();

    let mut sdf = SparseGrid::with_capacity(band.len() + inside.len());
    for (&c, &d) in &band {
        let value = if inside.contains(&c) { -d * voxel } else { d * voxel };
        sdf.set(c, value);
    }
    for &c in &inside {
        if !band.contains_key(&c) {
            sdf.set(c, -half_width * voxel);
        }
    }
    debug!(
        "level set: {} triangles, {} band cells, {} interior cells",
        triangles.len(),
        band.len(),
        inside.len()
    );
    Ok(sdf)
}

/// Extract the interior of a level set: every active voxel with a negative
/// signed distance, valued 1.
pub fn interior_mask(level_set: &SparseGrid<f64>) -> SparseGrid<f64> {
    level_set
        .iter()
        .filter(|(_, d)| d.is_sign_negative())
        .map(|(c, _)| (c, 1.0))
        .collect()
}

/// Minimum unsigned distance (index units) from each voxel center within
/// `half_width` of any triangle.
fn unsigned_band(tris: &[[DVec3; 3]], half_width: f64) -> IndexMap<Coord, f64> {
    let mut band: IndexMap<Coord, f64> = IndexMap::new();
    for tri in tris {
        let lo = tri[0].min(tri[1]).min(tri[2]) - DVec3::splat(half_width);
        let hi = tri[0].max(tri[1]).max(tri[2]) + DVec3::splat(half_width);
        let lo = Coord::floor(lo.ceil());
        let hi = Coord::floor(hi);
        for z in lo.z..=hi.z {
            for y in lo.y..=hi.y {
                for x in lo.x..=hi.x {
                    let c = Coord::new(x, y, z);
                    let d = point_triangle_distance(c.as_dvec3(), tri);
                    if d > half_width {
                        continue;
                    }
                    let slot = band.entry(c).or_insert(f64::INFINITY);
                    if d < *slot {
                        *slot = d;
                    }
                }
            }
        }
    }
    band
}

/// Voxel centers inside the closed mesh, by crossing parity along +x.
fn interior_cells(tris: &[[DVec3; 3]]) -> IndexSet<Coord> {
    let mut rows: IndexMap<(i32, i32), SmallVec<[f64; 8]>> = IndexMap::new();
    for tri in tris {
        let lo = tri[0].min(tri[1]).min(tri[2]);
        let hi = tri[0].max(tri[1]).max(tri[2]);
        for z in (lo.z.floor() as i32)..=(hi.z.ceil() as i32) {
            for y in (lo.y.floor() as i32)..=(hi.y.ceil() as i32) {
                let ray = DVec2::new(y as f64, z as f64) + RAY_JITTER;
                if let Some(x) = ray_crossing(ray, tri) {
                    rows.entry((y, z)).or_default().push(x);
                }
            }
        }
    }

    let mut inside = IndexSet::new();
    for ((y, z), mut xs) in rows {
        xs.sort_by(f64::total_cmp);
        for pair in xs.chunks_exact(2) {
            let first = pair[0].floor() as i32 + 1;
            let last = pair[1].ceil() as i32 - 1;
            for x in first..=last {
                inside.insert(Coord::new(x, y, z));
            }
        }
    }
    inside
}

/// X coordinate where the +x ray through `(y, z) = ray` crosses the
/// triangle, if it does.
fn ray_crossing(ray: DVec2, tri: &[DVec3; 3]) -> Option<f64> {
    let a = DVec2::new(tri[0].y, tri[0].z);
    let b = DVec2::new(tri[1].y, tri[1].z);
    let c = DVec2::new(tri[2].y, tri[2].z);
    let area = (b - a).perp_dot(c - a);
    if area.abs() < 1e-14 {
        return None;
    }
    let wa = (b - ray).perp_dot(c - ray) / area;
    let wb = (c - ray).perp_dot(a - ray) / area;
    let wc = 1.0 - wa - wb;
    if wa < 0.0 || wb < 0.0 || wc < 0.0 {
        return None;
    }
    Some(wa * tri[0].x + wb * tri[1].x + wc * tri[2].x)
}

/// Euclidean distance from `p` to the closest point on a triangle.
pub(crate) fn point_triangle_distance(p: DVec3, tri: &[DVec3; 3]) -> f64 {
    (p - closest_point_on_triangle(p, tri)).length()
}

/// Closest point on a triangle via Voronoi-region classification.
fn closest_point_on_triangle(p: DVec3, tri: &[DVec3; 3]) -> DVec3 {
    let [a, b, c] = *tri;
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;
    let d1 = ab.dot(ap);
    let d2 = ac.dot(ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return a;
    }

    let bp = p - b;
    let d3 = ab.dot(bp);
    let d4 = ac.dot(bp);
    if d3 >= 0.0 && d4 <= d3 {
        return b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return a + ab * v;
    }

    let cp = p - c;
    let d5 = ab.dot(cp);
    let d6 = ac.dot(cp);
    if d6 >= 0.0 && d5 <= d6 {
        return c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return a + ac * w;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return b + (c - b) * w;
    }

    let denom = va + vb + vc;
    if denom.abs() < f64::MIN_POSITIVE {
        // Degenerate (zero-area) triangle: fall back to the nearest vertex.
        let dist = |q: &DVec3| q.distance_squared(p);
        return [a, b, c]
            .into_iter()
            .min_by(|x, y| dist(x).total_cmp(&dist(y)))
            .unwrap_or(a);
    }
    let v = vb / denom;
    let w = vc / denom;
    a + ab * v + ac * w
}
