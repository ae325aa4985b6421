//! # Boolean Operations (CSG)
//!
//! Constructive Solid Geometry operations using BSP trees.
//!
//! ## Algorithm
//!
//! Based on the csg.js algorithm by Evan Wallace:
//! - Union: A.clipTo(B); B.clipTo(A); B.invert(); B.clipTo(A); B.invert(); A.build(B)
//! - Difference: A.invert(); A.clipTo(B); B.clipTo(A); B.invert(); B.clipTo(A); B.invert(); A.build(B); A.invert()
//! - Intersection: A.invert(); B.clipTo(A); B.invert(); A.clipTo(B); B.clipTo(A); A.build(B); A.invert()
//!
//! Operands holding several shells are first folded into one solid by
//! unioning their shells, so overlapping shells (merged pins, fused groups)
//! behave as a single body.
//!
//! ## Example
//!
//! ```rust
//! use molprint_mesh::ops::boolean::difference;
//! use molprint_mesh::primitives::{create_cube, create_sphere};
//! use glam::DVec3;
//!
//! let block = create_cube(DVec3::splat(2.0), true).unwrap();
//! let ball = create_sphere(0.8, 12).unwrap();
//! let hollow = difference(&block, &ball).unwrap();
//! assert!(hollow.volume() < block.volume());
//! ```

mod bsp;
mod plane;
mod polygon;


use crate::error::{MeshError, MeshResult};
use crate::mesh::Mesh;
use bsp::BspTree;
use config::constants::{COORDINATE_SCALE, VERTEX_MERGE_EPSILON};
use glam::DVec3;
use polygon::Polygon;
use std::collections::HashMap;
use tracing::debug;

/// The three boolean operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BooleanOp {
    Union,
    Difference,
    Intersection,
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Applies `op` to two meshes.
pub fn boolean(op: BooleanOp, a: &Mesh, b: &Mesh) -> MeshResult<Mesh> {
    match op {
        BooleanOp::Union => union(a, b),
        BooleanOp::Difference => difference(a, b),
        BooleanOp::Intersection => intersection(a, b),
    }
}

/// Compute union of two meshes.
///
/// An empty operand yields a copy of the other one.
pub fn union(a: &Mesh, b: &Mesh) -> MeshResult<Mesh> {
    let polys_a = solid_polygons(a)?;
    let polys_b = solid_polygons(b)?;

    if polys_a.is_empty() {
        return Ok(b.clone());
    }
    if polys_b.is_empty() {
        return Ok(a.clone());
    }

    finish("union", union_polygons(polys_a, polys_b))
}

/// Compute difference of two meshes (A - B).
pub fn difference(a: &Mesh, b: &Mesh) -> MeshResult<Mesh> {
    let polys_a = solid_polygons(a)?;
    let polys_b = solid_polygons(b)?;

    if polys_a.is_empty() {
        return Ok(Mesh::new());
    }
    if polys_b.is_empty() {
        return Ok(a.clone());
    }

    let mut bsp_a = BspTree::new(polys_a);
    let mut bsp_b = BspTree::new(polys_b);

    bsp_a.invert();
    bsp_a.clip_to(&bsp_b);
    bsp_b.clip_to(&bsp_a);
    bsp_b.invert();
    bsp_b.clip_to(&bsp_a);
    bsp_b.invert();
    bsp_a.build(bsp_b.all_polygons());
    bsp_a.invert();

    finish("difference", bsp_a.all_polygons())
}

/// Compute intersection of two meshes.
///
/// An empty operand yields an empty mesh.
pub fn intersection(a: &Mesh, b: &Mesh) -> MeshResult<Mesh> {
    let polys_a = solid_polygons(a)?;
    let polys_b = solid_polygons(b)?;

    if polys_a.is_empty() || polys_b.is_empty() {
        return Ok(Mesh::new());
    }

    let mut bsp_a = BspTree::new(polys_a);
    let mut bsp_b = BspTree::new(polys_b);

    bsp_a.invert();
    bsp_b.clip_to(&bsp_a);
    bsp_b.invert();
    bsp_a.clip_to(&bsp_b);
    bsp_b.clip_to(&bsp_a);
    bsp_a.build(bsp_b.all_polygons());
    bsp_a.invert();

    finish("intersection", bsp_a.all_polygons())
}

// =============================================================================
// INTERNALS
// =============================================================================

fn union_polygons(polys_a: Vec<Polygon>, polys_b: Vec<Polygon>) -> Vec<Polygon> {
    if polys_a.is_empty() {
        return polys_b;
    }
    if polys_b.is_empty() {
        return polys_a;
    }

    let mut bsp_a = BspTree::new(polys_a);
    let mut bsp_b = BspTree::new(polys_b);

    bsp_a.clip_to(&bsp_b);
    bsp_b.clip_to(&bsp_a);
    bsp_b.invert();
    bsp_b.clip_to(&bsp_a);
    bsp_b.invert();
    bsp_a.build(bsp_b.all_polygons());

    bsp_a.all_polygons()
}

/// Checks an operand and folds its shells into one polygon soup.
fn solid_polygons(mesh: &Mesh) -> MeshResult<Vec<Polygon>> {
    if !mesh.is_finite() {
        return Err(MeshError::degenerate("Operand has non-finite coordinates"));
    }
    if mesh.is_empty() {
        return Ok(Vec::new());
    }
    if mesh.volume().abs() < VERTEX_MERGE_EPSILON {
        return Err(MeshError::degenerate(format!(
            "Operand with {} triangles encloses no volume",
            mesh.triangle_count()
        )));
    }

    let mut shells = mesh.shells().into_iter().map(|shell| mesh_to_polygons(&shell));
    let first = shells.next().unwrap_or_default();
    Ok(shells.fold(first, union_polygons))
}

/// Convert mesh triangles to polygons, skipping degenerate ones.
fn mesh_to_polygons(mesh: &Mesh) -> Vec<Polygon> {
    (0..mesh.triangle_count())
        .filter_map(|i| Polygon::from_vertices(mesh.triangle_corners(i).to_vec()))
        .collect()
}

fn finish(op: &str, polygons: Vec<Polygon>) -> MeshResult<Mesh> {
    let mesh = polygons_to_mesh(&polygons);
    if !mesh.is_finite() {
        return Err(MeshError::boolean_failed(format!(
            "{} produced non-finite vertices",
            op
        )));
    }
    debug!(
        op,
        polygons = polygons.len(),
        triangles = mesh.triangle_count(),
        "boolean finished"
    );
    Ok(mesh)
}

/// Convert polygons back to a mesh, welding coincident vertices.
fn polygons_to_mesh(polygons: &[Polygon]) -> Mesh {
    let mut mesh = Mesh::new();
    let mut welded: HashMap<(i64, i64, i64), u32> = HashMap::new();

    let mut index_of = |mesh: &mut Mesh, v: DVec3| -> u32 {
        let key = (
            (v.x * COORDINATE_SCALE).round() as i64,
            (v.y * COORDINATE_SCALE).round() as i64,
            (v.z * COORDINATE_SCALE).round() as i64,
        );
        *welded.entry(key).or_insert_with(|| mesh.add_vertex(v))
    };

    for poly in polygons {
        let indices: Vec<u32> = poly
            .vertices()
            .iter()
            .map(|&v| index_of(&mut mesh, v))
            .collect();

        // Fan triangulation; polygons are convex
        for i in 1..indices.len().saturating_sub(1) {
            let tri = [indices[0], indices[i], indices[i + 1]];
            if tri[0] == tri[1] || tri[1] == tri[2] || tri[0] == tri[2] {
                continue;
            }
            let [a, b, c] = tri.map(|index| mesh.vertex(index));
            if (b - a).cross(c - a).length() * 0.5 < VERTEX_MERGE_EPSILON {
                continue;
            }
            mesh.add_triangle(tri[0], tri[1], tri[2]);
        }
    }

    mesh
}
