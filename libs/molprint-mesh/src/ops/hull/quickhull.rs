//! # QuickHull Algorithm
//!
//! 3D convex hull computation using the QuickHull algorithm.
//! Based on the original algorithm by Barber, Dobkin, and Huhdanpaa.
//!
//! ## Algorithm Steps
//!
//! 1. Find 6 extreme points (min/max on each axis)
//! 2. Build initial tetrahedron from 4 non-coplanar points
//! 3. Assign remaining points to faces they're outside of
//! 4. For each face with outside points:
//!    a. Find farthest point
//!    b. Find horizon edges (boundary of visible faces)
//!    c. Create new faces from horizon to farthest point
//!    d. Reassign outside points to new faces
//! 5. Repeat until no faces have outside points
//!
//! Output vertex order follows input order, so identical input always yields
//! an identical mesh.

use crate::error::{MeshError, MeshResult};
use crate::mesh::Mesh;
use config::constants::EPSILON;
use glam::DVec3;
use std::collections::{BTreeMap, HashMap};

/// Computes the convex hull of a set of 3D points.
///
/// # Errors
///
/// `DegenerateGeometry` when fewer than 4 unique points exist or all points
/// are collinear or coplanar.
///
/// # Example
///
/// ```rust
/// use molprint_mesh::ops::hull::convex_hull;
/// use glam::DVec3;
///
/// let points = vec![
///     DVec3::new(0.0, 0.0, 0.0),
///     DVec3::new(1.0, 0.0, 0.0),
///     DVec3::new(0.0, 1.0, 0.0),
///     DVec3::new(0.0, 0.0, 1.0),
/// ];
/// let hull = convex_hull(&points).unwrap();
/// assert_eq!(hull.triangle_count(), 4);
/// ```
pub fn convex_hull(points: &[DVec3]) -> MeshResult<Mesh> {
    if points.iter().any(|p| !p.is_finite()) {
        return Err(MeshError::degenerate("Hull input has non-finite points"));
    }

    let unique_points = remove_duplicates(points);
    if unique_points.len() < 4 {
        return Err(MeshError::degenerate(
            "Convex hull requires at least 4 unique points",
        ));
    }

    let tolerance = hull_tolerance(&unique_points);
    let (faces, interior) = build_initial_simplex(&unique_points, tolerance)?;
    let faces = quickhull_iterate(faces, interior, &unique_points, tolerance);

    Ok(faces_to_mesh(&faces, &unique_points))
}

/// A triangular face of the hull under construction.
#[derive(Debug, Clone)]
struct HullFace {
    vertices: [usize; 3],
    normal: DVec3,
    distance: f64,
    outside_points: Vec<usize>,
}

impl HullFace {
    fn new(v0: usize, v1: usize, v2: usize, points: &[DVec3]) -> Self {
        let p0 = points[v0];
        let normal = (points[v1] - p0).cross(points[v2] - p0).normalize_or_zero();
        Self {
            vertices: [v0, v1, v2],
            normal,
            distance: normal.dot(p0),
            outside_points: Vec::new(),
        }
    }

    fn signed_distance(&self, point: DVec3) -> f64 {
        self.normal.dot(point) - self.distance
    }

    fn farthest_point(&self, points: &[DVec3]) -> Option<usize> {
        self.outside_points.iter().copied().max_by(|&a, &b| {
            self.signed_distance(points[a])
                .total_cmp(&self.signed_distance(points[b]))
        })
    }
}

/// Distance tolerance scaled to the point cloud size.
fn hull_tolerance(points: &[DVec3]) -> f64 {
    let scale = points
        .iter()
        .fold(0.0_f64, |acc, p| acc.max(p.abs().max_element()));
    EPSILON * scale.max(1.0) * 100.0
}

/// Removes duplicate points within EPSILON tolerance, keeping first occurrences.
fn remove_duplicates(points: &[DVec3]) -> Vec<DVec3> {
    let mut unique: Vec<DVec3> = Vec::with_capacity(points.len());
    let mut seen: HashMap<(i64, i64, i64), ()> = HashMap::new();
    for p in points {
        let key = (
            (p.x / EPSILON).round() as i64,
            (p.y / EPSILON).round() as i64,
            (p.z / EPSILON).round() as i64,
        );
        if seen.insert(key, ()).is_none() {
            unique.push(*p);
        }
    }
    unique
}

/// Builds the initial tetrahedron and returns its faces plus an interior point.
fn build_initial_simplex(
    points: &[DVec3],
    tolerance: f64,
) -> MeshResult<(Vec<HullFace>, DVec3)> {
    let mut extremes = [0usize; 6];
    for (i, p) in points.iter().enumerate() {
        if p.x < points[extremes[0]].x { extremes[0] = i; }
        if p.x > points[extremes[1]].x { extremes[1] = i; }
        if p.y < points[extremes[2]].y { extremes[2] = i; }
        if p.y > points[extremes[3]].y { extremes[3] = i; }
        if p.z < points[extremes[4]].z { extremes[4] = i; }
        if p.z > points[extremes[5]].z { extremes[5] = i; }
    }

    let (p0, p1) = find_farthest_pair(&extremes, points);
    if (points[p1] - points[p0]).length() < tolerance {
        return Err(MeshError::degenerate("All points coincide"));
    }
    let p2 = find_farthest_from_line(p0, p1, points, tolerance)?;
    let p3 = find_farthest_from_plane(p0, p1, p2, points, tolerance)?;

    let interior = (points[p0] + points[p1] + points[p2] + points[p3]) / 4.0;
    let mut faces = vec![
        create_face_outward(p0, p1, p2, interior, points),
        create_face_outward(p0, p2, p3, interior, points),
        create_face_outward(p0, p3, p1, interior, points),
        create_face_outward(p1, p3, p2, interior, points),
    ];

    let used = [p0, p1, p2, p3];
    for idx in (0..points.len()).filter(|i| !used.contains(i)) {
        assign_point(&mut faces, idx, points, tolerance);
    }

    Ok((faces, interior))
}

fn assign_point(faces: &mut [HullFace], idx: usize, points: &[DVec3], tolerance: f64) {
    if let Some(face) = faces
        .iter_mut()
        .find(|f| f.signed_distance(points[idx]) > tolerance)
    {
        face.outside_points.push(idx);
    }
}

fn find_farthest_pair(indices: &[usize], points: &[DVec3]) -> (usize, usize) {
    let mut max_dist = -1.0;
    let mut best = (indices[0], indices[1]);

    for (i, &a) in indices.iter().enumerate() {
        for &b in indices.iter().skip(i + 1) {
            let dist = (points[a] - points[b]).length_squared();
            if dist > max_dist {
                max_dist = dist;
                best = (a, b);
            }
        }
    }
    best
}

fn find_farthest_from_line(
    p0: usize,
    p1: usize,
    points: &[DVec3],
    tolerance: f64,
) -> MeshResult<usize> {
    let line_dir = (points[p1] - points[p0]).normalize();
    let mut max_dist = tolerance;
    let mut best = None;

    for (i, p) in points.iter().enumerate() {
        let v = *p - points[p0];
        let dist = (v - v.dot(line_dir) * line_dir).length();
        if dist > max_dist {
            max_dist = dist;
            best = Some(i);
        }
    }

    best.ok_or_else(|| MeshError::degenerate("All points are collinear"))
}

fn find_farthest_from_plane(
    p0: usize,
    p1: usize,
    p2: usize,
    points: &[DVec3],
    tolerance: f64,
) -> MeshResult<usize> {
    let normal = (points[p1] - points[p0])
        .cross(points[p2] - points[p0])
        .normalize();

    let mut max_dist = tolerance;
    let mut best = None;

    for (i, p) in points.iter().enumerate() {
        let dist = normal.dot(*p - points[p0]).abs();
        if dist > max_dist {
            max_dist = dist;
            best = Some(i);
        }
    }

    best.ok_or_else(|| MeshError::degenerate("All points are coplanar"))
}

/// Creates a face whose normal points away from `interior`.
fn create_face_outward(
    v0: usize,
    v1: usize,
    v2: usize,
    interior: DVec3,
    points: &[DVec3],
) -> HullFace {
    let face = HullFace::new(v0, v1, v2, points);
    if face.signed_distance(interior) > 0.0 {
        HullFace::new(v0, v2, v1, points)
    } else {
        face
    }
}

fn quickhull_iterate(
    mut faces: Vec<HullFace>,
    interior: DVec3,
    points: &[DVec3],
    tolerance: f64,
) -> Vec<HullFace> {
    // Every iteration consumes one point
    for _ in 0..points.len() {
        let Some(face_idx) = faces.iter().position(|f| !f.outside_points.is_empty()) else {
            break;
        };
        let Some(farthest) = faces[face_idx].farthest_point(points) else {
            break;
        };
        let apex = points[farthest];

        let visible: Vec<usize> = faces
            .iter()
            .enumerate()
            .filter(|(_, f)| f.signed_distance(apex) > tolerance)
            .map(|(i, _)| i)
            .collect();

        let horizon = find_horizon_edges(&faces, &visible);

        let mut reassign: Vec<usize> = visible
            .iter()
            .flat_map(|&idx| faces[idx].outside_points.iter().copied())
            .filter(|&p| p != farthest)
            .collect();
        reassign.sort_unstable();

        let mut visible_sorted = visible;
        visible_sorted.sort_unstable_by(|a, b| b.cmp(a));
        for idx in visible_sorted {
            faces.remove(idx);
        }

        let first_new = faces.len();
        for (e0, e1) in horizon {
            faces.push(create_face_outward(e0, e1, farthest, interior, points));
        }

        for idx in reassign {
            assign_point(&mut faces[first_new..], idx, points, tolerance);
        }
    }

    faces
}

/// Finds horizon edges: edges of visible faces not shared by another
/// visible face, in the winding of the face they belong to.
fn find_horizon_edges(faces: &[HullFace], visible: &[usize]) -> Vec<(usize, usize)> {
    let mut edge_count: HashMap<(usize, usize), usize> = HashMap::new();

    let edges_of = |idx: usize| {
        let v = faces[idx].vertices;
        [(v[0], v[1]), (v[1], v[2]), (v[2], v[0])]
    };

    for &idx in visible {
        for (a, b) in edges_of(idx) {
            *edge_count.entry((a.min(b), a.max(b))).or_insert(0) += 1;
        }
    }

    visible
        .iter()
        .flat_map(|&idx| edges_of(idx))
        .filter(|&(a, b)| edge_count[&(a.min(b), a.max(b))] == 1)
        .collect()
}

/// Converts hull faces to a mesh with vertices in input order.
fn faces_to_mesh(faces: &[HullFace], points: &[DVec3]) -> Mesh {
    let mut vertex_map: BTreeMap<usize, u32> = BTreeMap::new();
    for face in faces {
        for &v in &face.vertices {
            vertex_map.insert(v, 0);
        }
    }

    let mut mesh = Mesh::with_capacity(vertex_map.len(), faces.len());
    for (&v, slot) in vertex_map.iter_mut() {
        *slot = mesh.add_vertex(points[v]);
    }

    for face in faces {
        let [a, b, c] = face.vertices.map(|v| vertex_map[&v]);
        mesh.add_triangle(a, b, c);
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_cube_points() -> Vec<DVec3> {
        vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(1.0, 1.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
            DVec3::new(0.0, 0.0, 1.0),
            DVec3::new(1.0, 0.0, 1.0),
            DVec3::new(1.0, 1.0, 1.0),
            DVec3::new(0.0, 1.0, 1.0),
        ]
    }

    #[test]
    fn test_convex_hull_tetrahedron() {
        let points = vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(0.5, 1.0, 0.0),
            DVec3::new(0.5, 0.5, 1.0),
        ];
        let mesh = convex_hull(&points).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 4);
        assert!(mesh.volume() > 0.0);
    }

    #[test]
    fn test_convex_hull_cube_with_interior_point() {
        let mut points = unit_cube_points();
        points.push(DVec3::splat(0.5));
        let mesh = convex_hull(&points).unwrap();

        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.triangle_count(), 12);
        assert!((mesh.volume() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_convex_hull_is_deterministic() {
        let points = unit_cube_points();
        let a = convex_hull(&points).unwrap();
        let b = convex_hull(&points).unwrap();
        assert_eq!(a.triangles(), b.triangles());
        assert_eq!(a.vertices(), b.vertices());
    }

    #[test]
    fn test_convex_hull_coplanar_points() {
        let points = vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(1.0, 1.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
            DVec3::new(0.5, 0.5, 0.0),
        ];
        assert!(convex_hull(&points).unwrap_err().is_degenerate());
    }

    #[test]
    fn test_convex_hull_too_few_points() {
        let points = vec![DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::X];
        assert!(convex_hull(&points).is_err());
    }
}
