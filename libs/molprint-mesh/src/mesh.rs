//! # Mesh Data Structure
//!
//! Core mesh representation with vertices, triangles, shells and optional
//! colors.

use config::constants::{DEFAULT_COLOR, VERTEX_MERGE_EPSILON};
use glam::{DMat4, DQuat, DVec3};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A triangle mesh with vertices and indices.
///
/// A mesh can hold several closed shells. Each shell occupies a contiguous
/// run of triangles; [`Mesh::merge`] appends the other mesh's shells after
/// this one's.
///
/// # Example
///
/// ```rust
/// use molprint_mesh::Mesh;
/// use glam::DVec3;
///
/// let mut mesh = Mesh::new();
/// mesh.add_vertex(DVec3::new(0.0, 0.0, 0.0));
/// mesh.add_vertex(DVec3::new(1.0, 0.0, 0.0));
/// mesh.add_vertex(DVec3::new(0.0, 1.0, 0.0));
/// mesh.add_triangle(0, 1, 2);
/// assert_eq!(mesh.shell_count(), 1);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mesh {
    /// Vertex positions
    vertices: Vec<DVec3>,
    /// Triangle indices (3 indices per triangle)
    triangles: Vec<[u32; 3]>,
    /// First triangle of every shell after the first
    shell_starts: Vec<usize>,
    /// Optional vertex colors (RGBA)
    colors: Option<Vec<[f32; 4]>>,
}

impl Mesh {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mesh with pre-allocated capacity.
    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            triangles: Vec::with_capacity(triangle_count),
            shell_starts: Vec::new(),
            colors: None,
        }
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Returns true if the mesh has no triangles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Adds a vertex and returns its index.
    pub fn add_vertex(&mut self, position: DVec3) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(position);
        index
    }

    /// Adds a triangle by vertex indices.
    pub fn add_triangle(&mut self, v0: u32, v1: u32, v2: u32) {
        self.triangles.push([v0, v1, v2]);
    }

    /// Returns a reference to the vertices.
    #[inline]
    pub fn vertices(&self) -> &[DVec3] {
        &self.vertices
    }

    /// Returns a reference to the triangles.
    #[inline]
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// Returns the vertex at the given index.
    #[inline]
    pub fn vertex(&self, index: u32) -> DVec3 {
        self.vertices[index as usize]
    }

    /// Returns the triangle at the given index.
    #[inline]
    pub fn triangle(&self, index: usize) -> [u32; 3] {
        self.triangles[index]
    }

    /// Returns the three corner positions of a triangle.
    #[inline]
    pub fn triangle_corners(&self, index: usize) -> [DVec3; 3] {
        let [a, b, c] = self.triangles[index];
        [self.vertex(a), self.vertex(b), self.vertex(c)]
    }

    /// Sets a uniform color for all vertices.
    pub fn set_uniform_color(&mut self, color: [f32; 4]) {
        self.colors = Some(vec![color; self.vertices.len()]);
    }

    /// Removes vertex colors.
    pub fn clear_colors(&mut self) {
        self.colors = None;
    }

    /// Returns the vertex colors.
    pub fn colors(&self) -> Option<&[[f32; 4]]> {
        self.colors.as_deref()
    }

    // =========================================================================
    // SHELLS
    // =========================================================================

    /// Returns the triangle range of every non-empty shell.
    pub fn shell_ranges(&self) -> Vec<Range<usize>> {
        let mut starts = Vec::with_capacity(self.shell_starts.len() + 1);
        starts.push(0);
        starts.extend(self.shell_starts.iter().copied());
        starts.push(self.triangles.len());

        starts
            .windows(2)
            .filter(|w| w[0] < w[1])
            .map(|w| w[0]..w[1])
            .collect()
    }

    /// Returns the number of non-empty shells.
    pub fn shell_count(&self) -> usize {
        self.shell_ranges().len()
    }

    /// Splits the mesh into one mesh per shell.
    ///
    /// Vertices are re-indexed; unused vertices are dropped.
    pub fn shells(&self) -> Vec<Mesh> {
        self.shell_ranges()
            .into_iter()
            .map(|range| self.submesh(range))
            .collect()
    }

    fn submesh(&self, range: Range<usize>) -> Mesh {
        let mut remap: Vec<Option<u32>> = vec![None; self.vertices.len()];
        let mut mesh = Mesh::with_capacity(range.len() * 3, range.len());

        for tri in &self.triangles[range] {
            let mut out = [0u32; 3];
            for (slot, &index) in out.iter_mut().zip(tri) {
                *slot = match remap[index as usize] {
                    Some(mapped) => mapped,
                    None => {
                        let mapped = mesh.add_vertex(self.vertices[index as usize]);
                        remap[index as usize] = Some(mapped);
                        mapped
                    }
                };
            }
            mesh.add_triangle(out[0], out[1], out[2]);
        }

        if let Some(colors) = &self.colors {
            let mut shell_colors = vec![DEFAULT_COLOR; mesh.vertex_count()];
            for (old, new) in remap.iter().enumerate() {
                if let Some(new) = new {
                    shell_colors[*new as usize] = colors[old];
                }
            }
            mesh.colors = Some(shell_colors);
        }

        mesh
    }

    // =========================================================================
    // MEASUREMENTS
    // =========================================================================

    /// Computes the axis-aligned bounding box.
    ///
    /// Returns (min, max) corners of the bounding box.
    pub fn bounding_box(&self) -> (DVec3, DVec3) {
        if self.vertices.is_empty() {
            return (DVec3::ZERO, DVec3::ZERO);
        }

        let mut min = self.vertices[0];
        let mut max = self.vertices[0];

        for v in &self.vertices[1..] {
            min = min.min(*v);
            max = max.max(*v);
        }

        (min, max)
    }

    /// Returns the bounding box size along each axis.
    pub fn extents(&self) -> DVec3 {
        let (min, max) = self.bounding_box();
        max - min
    }

    /// Returns the mean of all vertex positions.
    pub fn centroid(&self) -> DVec3 {
        if self.vertices.is_empty() {
            return DVec3::ZERO;
        }
        self.vertices.iter().copied().sum::<DVec3>() / self.vertices.len() as f64
    }

    /// Returns the unit normal of a triangle, or zero when it is degenerate.
    pub fn triangle_normal(&self, index: usize) -> DVec3 {
        let [a, b, c] = self.triangle_corners(index);
        (b - a).cross(c - a).normalize_or_zero()
    }

    /// Returns the area of a triangle.
    pub fn triangle_area(&self, index: usize) -> f64 {
        let [a, b, c] = self.triangle_corners(index);
        (b - a).cross(c - a).length() * 0.5
    }

    /// Returns the total surface area.
    pub fn surface_area(&self) -> f64 {
        (0..self.triangles.len()).map(|i| self.triangle_area(i)).sum()
    }

    /// Returns the signed enclosed volume.
    ///
    /// Positive for closed meshes with outward (counter-clockwise) winding.
    pub fn volume(&self) -> f64 {
        (0..self.triangles.len())
            .map(|i| {
                let [a, b, c] = self.triangle_corners(i);
                a.dot(b.cross(c)) / 6.0
            })
            .sum()
    }

    /// Returns the center of mass of the enclosed solid.
    ///
    /// Falls back to the vertex centroid when the enclosed volume vanishes.
    pub fn center_of_mass(&self) -> DVec3 {
        let mut weighted = DVec3::ZERO;
        let mut total = 0.0;

        for i in 0..self.triangles.len() {
            let [a, b, c] = self.triangle_corners(i);
            let volume = a.dot(b.cross(c)) / 6.0;
            weighted += (a + b + c) / 4.0 * volume;
            total += volume;
        }

        if total.abs() < VERTEX_MERGE_EPSILON {
            return self.centroid();
        }
        weighted / total
    }

    /// Returns true if every vertex coordinate is finite.
    pub fn is_finite(&self) -> bool {
        self.vertices.iter().all(|v| v.is_finite())
    }

    // =========================================================================
    // TRANSFORMS
    // =========================================================================

    /// Transforms all vertices by a 4x4 matrix.
    ///
    /// Mirroring matrices flip the winding so normals stay outward.
    pub fn transform(&mut self, matrix: &DMat4) {
        for v in &mut self.vertices {
            *v = matrix.transform_point3(*v);
        }
        if matrix.determinant() < 0.0 {
            for tri in &mut self.triangles {
                tri.swap(1, 2);
            }
        }
    }

    /// Translates the mesh by a vector.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// mesh.translate(DVec3::new(10.0, 0.0, 0.0));
    /// ```
    pub fn translate(&mut self, offset: DVec3) {
        for v in &mut self.vertices {
            *v += offset;
        }
    }

    /// Rotates the mesh about a pivot point.
    pub fn rotate_about(&mut self, rotation: DQuat, pivot: DVec3) {
        for v in &mut self.vertices {
            *v = pivot + rotation * (*v - pivot);
        }
    }

    /// Scales the mesh about a pivot point.
    pub fn scale_about(&mut self, factors: DVec3, pivot: DVec3) {
        let matrix = DMat4::from_translation(pivot)
            * DMat4::from_scale(factors)
            * DMat4::from_translation(-pivot);
        self.transform(&matrix);
    }

    /// Merges another mesh into this one.
    ///
    /// The other mesh's shells are kept as separate shells.
    pub fn merge(&mut self, other: &Mesh) {
        if other.is_empty() {
            return;
        }

        let vertex_offset = self.vertices.len() as u32;
        let triangle_offset = self.triangles.len();

        if triangle_offset > 0 {
            self.shell_starts.push(triangle_offset);
        }
        self.shell_starts
            .extend(other.shell_starts.iter().map(|s| s + triangle_offset));

        let own_vertices = self.vertices.len();
        self.vertices.extend_from_slice(&other.vertices);

        for tri in &other.triangles {
            self.triangles.push([
                tri[0] + vertex_offset,
                tri[1] + vertex_offset,
                tri[2] + vertex_offset,
            ]);
        }

        match (&mut self.colors, &other.colors) {
            (Some(self_colors), Some(other_colors)) => {
                self_colors.extend_from_slice(other_colors);
            }
            (Some(self_colors), None) => {
                self_colors.extend(std::iter::repeat(DEFAULT_COLOR).take(other.vertices.len()));
            }
            (None, Some(other_colors)) => {
                let mut colors = vec![DEFAULT_COLOR; own_vertices];
                colors.extend_from_slice(other_colors);
                self.colors = Some(colors);
            }
            (None, None) => {}
        }
    }

    /// Validates the mesh for correctness.
    ///
    /// Checks:
    /// - All triangle indices are valid
    /// - No degenerate triangles (zero area)
    ///
    /// Returns true if valid.
    pub fn validate(&self) -> bool {
        let vertex_count = self.vertices.len() as u32;

        for (i, tri) in self.triangles.iter().enumerate() {
            if tri.iter().any(|&index| index >= vertex_count) {
                return false;
            }

            if tri[0] == tri[1] || tri[1] == tri[2] || tri[0] == tri[2] {
                return false;
            }

            if self.triangle_area(i) < VERTEX_MERGE_EPSILON {
                return false;
            }
        }

        true
    }
}
