//! # Sphere Primitive
//!
//! Generates atom meshes using latitude/longitude tessellation.

use crate::error::{MeshError, MeshResult};
use crate::mesh::Mesh;
use config::constants::MIN_SEGMENTS;
use glam::DVec3;
use std::f64::consts::PI;

/// Creates a sphere mesh centered at the origin.
///
/// # Arguments
///
/// * `radius` - The radius of the sphere
/// * `segments` - Number of segments around the circumference
///
/// # Algorithm
///
/// - num_rings = (segments + 1) / 2, at polar angle PI * (i + 0.5) / num_rings
/// - No pole vertices; the first and last rings are closed with fans
///
/// # Example
///
/// ```rust
/// use molprint_mesh::primitives::create_sphere;
///
/// let mesh = create_sphere(0.6, 16).unwrap();
/// assert!(mesh.volume() > 0.0);
/// ```
pub fn create_sphere(radius: f64, segments: u32) -> MeshResult<Mesh> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(MeshError::degenerate(format!(
            "Sphere radius must be positive: {}",
            radius
        )));
    }

    if segments < MIN_SEGMENTS {
        return Err(MeshError::degenerate(format!(
            "Sphere segments must be at least {}: {}",
            MIN_SEGMENTS, segments
        )));
    }

    let num_rings = ((segments + 1) / 2).max(2);
    let mut mesh = Mesh::with_capacity(
        (num_rings * segments) as usize,
        (2 * num_rings * segments) as usize,
    );

    let rings: Vec<Vec<u32>> = (0..num_rings)
        .map(|i| {
            let phi = PI * (i as f64 + 0.5) / num_rings as f64;
            let ring_radius = radius * phi.sin();
            let z = radius * phi.cos();

            (0..segments)
                .map(|j| {
                    let theta = 2.0 * PI * j as f64 / segments as f64;
                    mesh.add_vertex(DVec3::new(
                        ring_radius * theta.cos(),
                        ring_radius * theta.sin(),
                        z,
                    ))
                })
                .collect()
        })
        .collect();

    // Top cap
    let first_ring = &rings[0];
    for j in 1..segments as usize - 1 {
        mesh.add_triangle(first_ring[0], first_ring[j], first_ring[j + 1]);
    }

    for pair in rings.windows(2) {
        let (ring_a, ring_b) = (&pair[0], &pair[1]);
        for j in 0..segments as usize {
            let j_next = (j + 1) % segments as usize;
            mesh.add_triangle(ring_a[j], ring_b[j], ring_b[j_next]);
            mesh.add_triangle(ring_a[j], ring_b[j_next], ring_a[j_next]);
        }
    }

    // Bottom cap, reversed
    let last_ring = &rings[rings.len() - 1];
    for j in 1..segments as usize - 1 {
        mesh.add_triangle(last_ring[0], last_ring[j + 1], last_ring[j]);
    }

    Ok(mesh)
}
