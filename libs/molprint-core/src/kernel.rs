//! # Geometry Kernel
//!
//! The pipeline never touches mesh algorithms directly; every geometric
//! query and boolean goes through [`GeometryKernel`]. The provided methods
//! are backed by `molprint-mesh`, so [`MeshKernel`] needs no overrides.
//! Tests substitute kernels that fail on purpose.

use glam::{DQuat, DVec3};
use molprint_mesh::primitives::{create_cube, create_cylinder_between, create_sphere};
use molprint_mesh::{BooleanOp, HullFacet, Mesh, MeshResult};

/// Geometry services consumed by the pipeline.
pub trait GeometryKernel {
    /// Axis-aligned extents of a mesh.
    fn bounding_box(&self, mesh: &Mesh) -> DVec3 {
        mesh.extents()
    }

    /// Returns true if the two surfaces touch or cross.
    fn intersects(&self, a: &Mesh, b: &Mesh) -> MeshResult<bool> {
        molprint_mesh::meshes_intersect(a, b)
    }

    /// Returns every intersecting `(face of a, face of b)` pair.
    fn overlapping_faces(&self, a: &Mesh, b: &Mesh) -> MeshResult<Vec<(usize, usize)>> {
        molprint_mesh::overlapping_triangles(a, b)
    }

    /// Convex hull of a mesh's vertices.
    fn convex_hull(&self, mesh: &Mesh) -> MeshResult<Mesh> {
        molprint_mesh::hull(&[mesh])
    }

    /// Hull faces with coplanar triangles merged.
    fn hull_facets(&self, hull: &Mesh, angle_tolerance: f64) -> Vec<HullFacet> {
        molprint_mesh::hull_facets(hull, angle_tolerance)
    }

    /// Boolean of two solids.
    fn boolean(&self, op: BooleanOp, a: &Mesh, b: &Mesh) -> MeshResult<Mesh> {
        molprint_mesh::boolean(op, a, b)
    }

    /// Cylinder spanning `start` to `end`.
    fn cylinder(&self, start: DVec3, end: DVec3, radius: f64, segments: u32) -> MeshResult<Mesh> {
        create_cylinder_between(start, end, radius, segments)
    }

    /// Box of the given edge lengths, rotated and centered at `center`.
    fn cuboid(&self, size: DVec3, center: DVec3, rotation: DQuat) -> MeshResult<Mesh> {
        let mut mesh = create_cube(size, true)?;
        mesh.rotate_about(rotation, DVec3::ZERO);
        mesh.translate(center);
        Ok(mesh)
    }

    /// Sphere centered at `center`.
    fn sphere(&self, center: DVec3, radius: f64, segments: u32) -> MeshResult<Mesh> {
        let mut mesh = create_sphere(radius, segments)?;
        mesh.translate(center);
        Ok(mesh)
    }
}

/// The in-tree kernel.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeshKernel;

impl GeometryKernel for MeshKernel {}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cuboid_is_rotated_and_placed() {
        let kernel = MeshKernel;
        let rotation = DQuat::from_rotation_z(std::f64::consts::FRAC_PI_2);
        let mesh = kernel
            .cuboid(DVec3::new(4.0, 1.0, 1.0), DVec3::new(1.0, 2.0, 3.0), rotation)
            .unwrap();

        let extents = kernel.bounding_box(&mesh);
        assert_relative_eq!(extents.x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(extents.y, 4.0, epsilon = 1e-9);
        let centroid = mesh.centroid();
        assert_relative_eq!(centroid.z, 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_sphere_is_placed() {
        let mesh = MeshKernel.sphere(DVec3::new(5.0, 0.0, 0.0), 0.5, 12).unwrap();
        let (min, max) = mesh.bounding_box();
        assert!(min.x > 4.4 && max.x < 5.6);
    }

    #[test]
    fn test_intersects_delegates() {
        let kernel = MeshKernel;
        let atom = kernel.sphere(DVec3::ZERO, 0.6, 16).unwrap();
        let bond = kernel.cylinder(DVec3::ZERO, DVec3::X * 1.5, 0.2, 16).unwrap();
        assert!(kernel.intersects(&atom, &bond).unwrap());
        assert!(!kernel.overlapping_faces(&atom, &bond).unwrap().is_empty());
    }
}
