//! # Hull Integration Tests
//!
//! Tests for convex hulls of primitives and facet merging.

use super::*;
use crate::primitives::{create_cube, create_cylinder, create_sphere};
use approx::assert_relative_eq;
use config::constants::FLOOR_ANGLE_TOLERANCE;

#[test]
fn test_hull_single_cube() {
    let cube = create_cube(DVec3::splat(10.0), true).unwrap();
    let result = hull(&[&cube]).unwrap();

    assert_eq!(result.vertex_count(), 8);
    assert_eq!(result.triangle_count(), 12);
}

#[test]
fn test_hull_two_cubes() {
    let cube1 = create_cube(DVec3::splat(5.0), false).unwrap();
    let mut cube2 = create_cube(DVec3::splat(5.0), false).unwrap();
    cube2.translate(DVec3::new(10.0, 0.0, 0.0));

    let result = hull(&[&cube1, &cube2]).unwrap();
    let (min, max) = result.bounding_box();
    assert_relative_eq!(min.x, 0.0);
    assert_relative_eq!(max.x, 15.0);
    assert_relative_eq!(result.volume(), 375.0, epsilon = 1e-6);
}

#[test]
fn test_hull_sphere_encloses_sphere() {
    let sphere = create_sphere(5.0, 16).unwrap();
    let result = hull(&[&sphere]).unwrap();

    assert!(result.volume() >= sphere.volume() - 1e-6);
}

#[test]
fn test_hull_empty_mesh_is_degenerate() {
    let empty = Mesh::new();
    assert!(hull(&[&empty]).unwrap_err().is_degenerate());
}

#[test]
fn test_cube_facets() {
    let cube = create_cube(DVec3::new(1.0, 2.0, 3.0), true).unwrap();
    let result = hull(&[&cube]).unwrap();
    let facets = hull_facets(&result, FLOOR_ANGLE_TOLERANCE);

    assert_eq!(facets.len(), 6);
    let total: f64 = facets.iter().map(|f| f.area).sum();
    assert_relative_eq!(total, 22.0, epsilon = 1e-9);
    for facet in &facets {
        assert_eq!(facet.triangles.len(), 2);
        assert_relative_eq!(facet.normal.length(), 1.0, epsilon = 1e-9);
        // Outward: the centroid lies on the side the normal points to
        assert!(facet.centroid.dot(facet.normal) > 0.0);
    }
}

#[test]
fn test_cylinder_facets_include_caps() {
    let cylinder = create_cylinder(2.0, 1.0, true, 16).unwrap();
    let result = hull(&[&cylinder]).unwrap();
    let facets = hull_facets(&result, FLOOR_ANGLE_TOLERANCE);

    // Two caps plus sixteen side quads; adjacent sides differ by 22.5 degrees
    assert_eq!(facets.len(), 18);
    let caps = facets
        .iter()
        .filter(|f| f.normal.z.abs() > 0.999)
        .count();
    assert_eq!(caps, 2);
}

#[test]
fn test_facets_are_deterministic() {
    let cube = create_cube(DVec3::ONE, true).unwrap();
    let result = hull(&[&cube]).unwrap();
    assert_eq!(
        hull_facets(&result, FLOOR_ANGLE_TOLERANCE),
        hull_facets(&result, FLOOR_ANGLE_TOLERANCE)
    );
}
