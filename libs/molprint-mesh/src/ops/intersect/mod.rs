//! # Mesh Intersection
//!
//! Surface-level overlap tests between two meshes.
//!
//! A spatial hash over the second mesh prunes candidate triangle pairs;
//! candidates are then tested exactly with orientation predicates. Only
//! surfaces are compared: a mesh fully enclosed by another does not count
//! as intersecting it.

mod spatial_index;
mod triangle;

pub use spatial_index::SpatialIndex;
pub use triangle::{segment_intersects_triangle, triangles_intersect};

use crate::error::{MeshError, MeshResult};
use crate::mesh::Mesh;
use glam::DVec3;

/// Returns true if the surfaces of `a` and `b` touch or cross.
///
/// # Errors
///
/// `DegenerateGeometry` when either mesh has non-finite coordinates.
///
/// # Example
///
/// ```rust
/// use molprint_mesh::ops::intersect::meshes_intersect;
/// use molprint_mesh::primitives::{create_cylinder_between, create_sphere};
/// use glam::DVec3;
///
/// let atom = create_sphere(0.6, 16).unwrap();
/// let bond = create_cylinder_between(DVec3::ZERO, DVec3::X * 1.5, 0.2, 16).unwrap();
/// assert!(meshes_intersect(&atom, &bond).unwrap());
/// ```
pub fn meshes_intersect(a: &Mesh, b: &Mesh) -> MeshResult<bool> {
    Ok(!collect_pairs(a, b, true)?.is_empty())
}

/// Returns every pair `(triangle of a, triangle of b)` whose triangles
/// intersect, sorted by `a` then `b` index.
pub fn overlapping_triangles(a: &Mesh, b: &Mesh) -> MeshResult<Vec<(usize, usize)>> {
    collect_pairs(a, b, false)
}

fn collect_pairs(a: &Mesh, b: &Mesh, first_only: bool) -> MeshResult<Vec<(usize, usize)>> {
    if !a.is_finite() || !b.is_finite() {
        return Err(MeshError::degenerate(
            "Intersection test on non-finite mesh",
        ));
    }
    if a.is_empty() || b.is_empty() {
        return Ok(Vec::new());
    }

    let (a_min, a_max) = a.bounding_box();
    let (b_min, b_max) = b.bounding_box();
    if !boxes_overlap(a_min, a_max, b_min, b_max) {
        return Ok(Vec::new());
    }

    let index = SpatialIndex::from_mesh(b);
    let mut pairs = Vec::new();

    for i in 0..a.triangle_count() {
        let tri_a = a.triangle_corners(i);
        let tri_min = tri_a[0].min(tri_a[1]).min(tri_a[2]);
        let tri_max = tri_a[0].max(tri_a[1]).max(tri_a[2]);
        if !boxes_overlap(tri_min, tri_max, b_min, b_max) {
            continue;
        }

        // Clamp to b's bounds so large triangles do not sweep empty cells
        let query_min = tri_min.max(b_min);
        let query_max = tri_max.min(b_max);

        for j in index.query_box(query_min, query_max) {
            let tri_b = b.triangle_corners(j);
            let b_tri_min = tri_b[0].min(tri_b[1]).min(tri_b[2]);
            let b_tri_max = tri_b[0].max(tri_b[1]).max(tri_b[2]);
            if !boxes_overlap(tri_min, tri_max, b_tri_min, b_tri_max) {
                continue;
            }
            if triangles_intersect(tri_a, tri_b) {
                pairs.push((i, j));
                if first_only {
                    return Ok(pairs);
                }
            }
        }
    }

    Ok(pairs)
}

fn boxes_overlap(a_min: DVec3, a_max: DVec3, b_min: DVec3, b_max: DVec3) -> bool {
    a_min.cmple(b_max).all() && b_min.cmple(a_max).all()
}
