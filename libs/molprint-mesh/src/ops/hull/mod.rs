//! # Convex Hull
//!
//! QuickHull convex hulls plus coplanar facet merging.
//!
//! ## Facets
//!
//! A hull triangulates every flat side of a solid into several triangles.
//! [`hull_facets`] merges edge-adjacent triangles whose normals differ by
//! less than an angle tolerance, so a cube yields six facets rather than
//! twelve triangles.

mod quickhull;

#[cfg(test)]
mod tests;

pub use quickhull::convex_hull;

use crate::error::MeshResult;
use crate::mesh::Mesh;
use glam::DVec3;
use std::collections::{HashMap, VecDeque};

/// A flat region of a convex hull.
#[derive(Debug, Clone, PartialEq)]
pub struct HullFacet {
    /// Area-weighted unit normal
    pub normal: DVec3,
    /// Total area
    pub area: f64,
    /// Area-weighted centroid
    pub centroid: DVec3,
    /// Hull triangle indices making up the facet
    pub triangles: Vec<usize>,
}

/// Computes the convex hull of one or more meshes.
///
/// # Example
///
/// ```rust,ignore
/// let result = hull(&[&atom, &bond])?;
/// ```
pub fn hull(meshes: &[&Mesh]) -> MeshResult<Mesh> {
    let points: Vec<DVec3> = meshes
        .iter()
        .flat_map(|mesh| mesh.vertices().iter().copied())
        .collect();

    convex_hull(&points)
}

/// Merges hull triangles into facets.
///
/// Facets are seeded from triangles in index order, so the facet holding
/// triangle 0 always comes first.
pub fn hull_facets(hull: &Mesh, angle_tolerance: f64) -> Vec<HullFacet> {
    let count = hull.triangle_count();
    let normals: Vec<DVec3> = (0..count).map(|i| hull.triangle_normal(i)).collect();

    let mut edge_owners: HashMap<(u32, u32), Vec<usize>> = HashMap::new();
    for (i, tri) in hull.triangles().iter().enumerate() {
        for k in 0..3 {
            let (a, b) = (tri[k], tri[(k + 1) % 3]);
            edge_owners.entry((a.min(b), a.max(b))).or_default().push(i);
        }
    }

    let mut facet_of: Vec<Option<usize>> = vec![None; count];
    let mut facets = Vec::new();

    for seed in 0..count {
        if facet_of[seed].is_some() {
            continue;
        }
        let facet_index = facets.len();
        facet_of[seed] = Some(facet_index);

        let mut members = Vec::new();
        let mut queue = VecDeque::from([seed]);
        while let Some(current) = queue.pop_front() {
            members.push(current);
            let tri = hull.triangle(current);
            for k in 0..3 {
                let (a, b) = (tri[k], tri[(k + 1) % 3]);
                for &neighbor in &edge_owners[&(a.min(b), a.max(b))] {
                    if facet_of[neighbor].is_some() {
                        continue;
                    }
                    if normals[current].angle_between(normals[neighbor]) < angle_tolerance {
                        facet_of[neighbor] = Some(facet_index);
                        queue.push_back(neighbor);
                    }
                }
            }
        }

        members.sort_unstable();
        facets.push(build_facet(hull, &normals, members));
    }

    facets
}

fn build_facet(hull: &Mesh, normals: &[DVec3], triangles: Vec<usize>) -> HullFacet {
    let mut area = 0.0;
    let mut weighted_normal = DVec3::ZERO;
    let mut weighted_centroid = DVec3::ZERO;

    for &i in &triangles {
        let tri_area = hull.triangle_area(i);
        let [a, b, c] = hull.triangle_corners(i);
        area += tri_area;
        weighted_normal += normals[i] * tri_area;
        weighted_centroid += (a + b + c) / 3.0 * tri_area;
    }

    let centroid = if area > 0.0 {
        weighted_centroid / area
    } else {
        let [a, b, c] = hull.triangle_corners(triangles[0]);
        (a + b + c) / 3.0
    };

    HullFacet {
        normal: weighted_normal.normalize_or_zero(),
        area,
        centroid,
        triangles,
    }
}
