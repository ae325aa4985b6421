//! # Cylinder Primitive
//!
//! Generates bond, strut and pin cylinders.

use crate::error::{MeshError, MeshResult};
use crate::mesh::Mesh;
use config::constants::{EPSILON, MIN_SEGMENTS};
use glam::{DQuat, DVec3};
use std::f64::consts::PI;

/// Creates a capped cylinder along the Z axis.
///
/// # Arguments
///
/// * `height` - Height along Z axis
/// * `radius` - Radius of both caps
/// * `center` - If true, center vertically at origin
/// * `segments` - Number of segments around circumference
///
/// # Example
///
/// ```rust
/// use molprint_mesh::primitives::create_cylinder;
///
/// let mesh = create_cylinder(2.0, 0.25, true, 16).unwrap();
/// assert_eq!(mesh.vertex_count(), 32);
/// ```
pub fn create_cylinder(height: f64, radius: f64, center: bool, segments: u32) -> MeshResult<Mesh> {
    if !height.is_finite() || height <= 0.0 {
        return Err(MeshError::degenerate(format!(
            "Cylinder height must be positive: {}",
            height
        )));
    }

    if !radius.is_finite() || radius <= 0.0 {
        return Err(MeshError::degenerate(format!(
            "Cylinder radius must be positive: {}",
            radius
        )));
    }

    if segments < MIN_SEGMENTS {
        return Err(MeshError::degenerate(format!(
            "Cylinder segments must be at least {}: {}",
            MIN_SEGMENTS, segments
        )));
    }

    let n = segments as usize;
    let mut mesh = Mesh::with_capacity(2 * n, 4 * n - 4);

    let (z_bottom, z_top) = if center {
        (-height / 2.0, height / 2.0)
    } else {
        (0.0, height)
    };

    let ring = |mesh: &mut Mesh, z: f64| -> Vec<u32> {
        (0..segments)
            .map(|j| {
                let theta = 2.0 * PI * j as f64 / segments as f64;
                mesh.add_vertex(DVec3::new(radius * theta.cos(), radius * theta.sin(), z))
            })
            .collect()
    };
    let bottom = ring(&mut mesh, z_bottom);
    let top = ring(&mut mesh, z_top);

    for j in 0..n {
        let j_next = (j + 1) % n;
        mesh.add_triangle(bottom[j], bottom[j_next], top[j_next]);
        mesh.add_triangle(bottom[j], top[j_next], top[j]);
    }

    for j in 1..n - 1 {
        mesh.add_triangle(bottom[0], bottom[j + 1], bottom[j]);
        mesh.add_triangle(top[0], top[j], top[j + 1]);
    }

    Ok(mesh)
}

/// Returns the rotation taking the +Z axis onto `direction`.
///
/// `direction` need not be normalized. Zero-length directions yield identity.
pub fn axis_rotation(direction: DVec3) -> DQuat {
    let unit = direction.normalize_or_zero();
    if unit == DVec3::ZERO {
        return DQuat::IDENTITY;
    }
    DQuat::from_rotation_arc(DVec3::Z, unit)
}

/// Creates a cylinder spanning two points.
///
/// # Example
///
/// ```rust
/// use molprint_mesh::primitives::create_cylinder_between;
/// use glam::DVec3;
///
/// let bond = create_cylinder_between(DVec3::ZERO, DVec3::X * 1.5, 0.2, 16).unwrap();
/// let (min, max) = bond.bounding_box();
/// assert!((max.x - 1.5).abs() < 1e-9);
/// assert!(min.x.abs() < 1e-9);
/// ```
pub fn create_cylinder_between(
    start: DVec3,
    end: DVec3,
    radius: f64,
    segments: u32,
) -> MeshResult<Mesh> {
    let axis = end - start;
    let length = axis.length();
    if length < EPSILON {
        return Err(MeshError::degenerate(
            "Cylinder endpoints coincide",
        ));
    }

    let mut mesh = create_cylinder(length, radius, true, segments)?;
    mesh.rotate_about(axis_rotation(axis), DVec3::ZERO);
    mesh.translate((start + end) / 2.0);
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cylinder_basic() {
        let mesh = create_cylinder(10.0, 5.0, false, 32).unwrap();
        assert!(mesh.validate());
        let (min, max) = mesh.bounding_box();
        assert_relative_eq!(min.z, 0.0);
        assert_relative_eq!(max.z, 10.0);
    }

    #[test]
    fn test_cylinder_centered_volume() {
        let mesh = create_cylinder(2.0, 1.0, true, 64).unwrap();
        let analytic = PI * 2.0;
        assert!(mesh.volume() > 0.0);
        assert!((mesh.volume() - analytic).abs() / analytic < 0.05);
    }

    #[test]
    fn test_cylinder_invalid_input() {
        assert!(create_cylinder(0.0, 5.0, false, 32).is_err());
        assert!(create_cylinder(10.0, 0.0, false, 32).is_err());
        assert!(create_cylinder(10.0, 5.0, false, 2).is_err());
    }

    #[test]
    fn test_cylinder_between_diagonal() {
        let start = DVec3::new(1.0, 1.0, 1.0);
        let end = DVec3::new(2.0, 3.0, -1.0);
        let mesh = create_cylinder_between(start, end, 0.1, 16).unwrap();
        let center = mesh.centroid();
        let mid = (start + end) / 2.0;
        assert_relative_eq!(center.x, mid.x, epsilon = 1e-9);
        assert_relative_eq!(center.y, mid.y, epsilon = 1e-9);
        assert_relative_eq!(center.z, mid.z, epsilon = 1e-9);
        assert!(mesh.volume() > 0.0);
    }

    #[test]
    fn test_cylinder_between_antiparallel() {
        let mesh = create_cylinder_between(DVec3::Z, -DVec3::Z, 0.1, 8).unwrap();
        let (min, max) = mesh.bounding_box();
        assert_relative_eq!(min.z, -1.0, epsilon = 1e-9);
        assert_relative_eq!(max.z, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_cylinder_between_coincident() {
        assert!(create_cylinder_between(DVec3::ONE, DVec3::ONE, 0.1, 8).is_err());
    }
}
