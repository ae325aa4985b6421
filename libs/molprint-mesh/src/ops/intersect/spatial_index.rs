//! # Spatial Index for Fast Triangle Queries
//!
//! Uses spatial hashing for O(1) average-case triangle lookups.
//!
//! ## Example
//!
//! ```rust,ignore
//! let index = SpatialIndex::from_mesh(&mesh);
//! let candidates = index.query_box(min, max);
//! ```

use crate::mesh::Mesh;
use glam::DVec3;
use std::collections::HashMap;

/// Cell size multiplier for spatial hashing.
/// Larger values = fewer cells but more triangles per cell.
const CELL_SIZE_FACTOR: f64 = 2.0;

/// Minimum cell size to avoid too many cells.
const MIN_CELL_SIZE: f64 = 0.01;

/// 3D cell coordinate for spatial hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CellCoord {
    x: i32,
    y: i32,
    z: i32,
}

impl CellCoord {
    fn from_position(pos: DVec3, cell_size: f64) -> Self {
        Self {
            x: (pos.x / cell_size).floor() as i32,
            y: (pos.y / cell_size).floor() as i32,
            z: (pos.z / cell_size).floor() as i32,
        }
    }
}

/// Hash grid mapping cells to the triangles whose bounding boxes touch them.
#[derive(Debug)]
pub struct SpatialIndex {
    grid: HashMap<CellCoord, Vec<usize>>,
    cell_size: f64,
    triangle_count: usize,
}

impl SpatialIndex {
    /// Creates a spatial index from a mesh.
    ///
    /// The cell size is derived from the mesh extent and triangle count.
    pub fn from_mesh(mesh: &Mesh) -> Self {
        let triangle_count = mesh.triangle_count();
        let extent = mesh.extents();
        let avg_extent = (extent.x + extent.y + extent.z) / 3.0;
        let cell_size = (avg_extent / (triangle_count.max(1) as f64).cbrt() * CELL_SIZE_FACTOR)
            .max(MIN_CELL_SIZE);

        let mut grid: HashMap<CellCoord, Vec<usize>> = HashMap::new();

        for i in 0..triangle_count {
            let [v0, v1, v2] = mesh.triangle_corners(i);
            let cell_min = CellCoord::from_position(v0.min(v1).min(v2), cell_size);
            let cell_max = CellCoord::from_position(v0.max(v1).max(v2), cell_size);

            for cx in cell_min.x..=cell_max.x {
                for cy in cell_min.y..=cell_max.y {
                    for cz in cell_min.z..=cell_max.z {
                        let cell = CellCoord { x: cx, y: cy, z: cz };
                        grid.entry(cell).or_default().push(i);
                    }
                }
            }
        }

        Self {
            grid,
            cell_size,
            triangle_count,
        }
    }

    /// Returns triangle indices that may intersect the box, in ascending order.
    pub fn query_box(&self, min: DVec3, max: DVec3) -> Vec<usize> {
        let cell_min = CellCoord::from_position(min, self.cell_size);
        let cell_max = CellCoord::from_position(max, self.cell_size);

        let mut seen = vec![false; self.triangle_count];
        for cx in cell_min.x..=cell_max.x {
            for cy in cell_min.y..=cell_max.y {
                for cz in cell_min.z..=cell_max.z {
                    let cell = CellCoord { x: cx, y: cy, z: cz };
                    if let Some(tris) = self.grid.get(&cell) {
                        for &tri_idx in tris {
                            seen[tri_idx] = true;
                        }
                    }
                }
            }
        }

        seen.iter()
            .enumerate()
            .filter_map(|(i, &hit)| hit.then_some(i))
            .collect()
    }

    /// Returns the number of cells in the index.
    pub fn cell_count(&self) -> usize {
        self.grid.len()
    }
}
