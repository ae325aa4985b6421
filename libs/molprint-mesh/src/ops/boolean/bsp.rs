//! # BSP Tree
//!
//! Binary Space Partitioning tree for CSG boolean operations.
//! Based on the csg.js algorithm by Evan Wallace.
//!
//! ## Layout
//!
//! Nodes live in a flat arena and refer to their children by index. Every
//! traversal is a loop over the arena or an explicit work stack, so deep
//! trees cannot overflow the call stack.
//!
//! ## Operations
//!
//! - `build`: Insert polygons, creating nodes as needed
//! - `clip_to`: Remove polygons from this tree that are inside another tree
//! - `invert`: Flip all polygons and swap front/back subtrees
//! - `all_polygons`: Collect all polygons from the tree

use super::plane::Plane;
use super::polygon::{Polygon, SplitBuckets};

#[derive(Debug, Clone, Default)]
struct Node {
    /// Splitting plane; `None` until the first polygon arrives
    plane: Option<Plane>,
    /// Polygons coplanar with `plane`
    polygons: Vec<Polygon>,
    front: Option<usize>,
    back: Option<usize>,
}

/// A BSP tree over convex polygons.
///
/// # Example
///
/// ```rust,ignore
/// let tree = BspTree::new(mesh_to_polygons(&mesh));
/// let outside = tree.clip_polygons(other_polygons);
/// ```
#[derive(Debug, Clone)]
pub struct BspTree {
    nodes: Vec<Node>,
}

impl BspTree {
    /// Creates a tree from polygons.
    pub fn new(polygons: Vec<Polygon>) -> Self {
        let mut tree = Self {
            nodes: vec![Node::default()],
        };
        tree.build(polygons);
        tree
    }

    /// Inserts polygons into the tree.
    ///
    /// A node without a plane adopts the plane of its first polygon.
    pub fn build(&mut self, polygons: Vec<Polygon>) {
        let mut stack: Vec<(usize, Vec<Polygon>)> = vec![(0, polygons)];

        while let Some((index, polys)) = stack.pop() {
            if polys.is_empty() {
                continue;
            }

            let plane = match self.nodes[index].plane {
                Some(plane) => plane,
                None => {
                    let plane = *polys[0].plane();
                    self.nodes[index].plane = Some(plane);
                    plane
                }
            };

            let mut buckets = SplitBuckets::default();
            for poly in polys {
                poly.split(&plane, &mut buckets);
            }

            let node = &mut self.nodes[index];
            node.polygons.append(&mut buckets.coplanar_front);
            node.polygons.append(&mut buckets.coplanar_back);

            if !buckets.front.is_empty() {
                let child = self.child(index, true);
                stack.push((child, buckets.front));
            }
            if !buckets.back.is_empty() {
                let child = self.child(index, false);
                stack.push((child, buckets.back));
            }
        }
    }

    /// Returns the front or back child of a node, creating it if missing.
    fn child(&mut self, index: usize, front: bool) -> usize {
        let existing = if front {
            self.nodes[index].front
        } else {
            self.nodes[index].back
        };
        if let Some(child) = existing {
            return child;
        }

        let child = self.nodes.len();
        self.nodes.push(Node::default());
        if front {
            self.nodes[index].front = Some(child);
        } else {
            self.nodes[index].back = Some(child);
        }
        child
    }

    /// Converts solid space to empty space and vice versa.
    pub fn invert(&mut self) {
        for node in &mut self.nodes {
            for poly in &mut node.polygons {
                poly.flip();
            }
            if let Some(plane) = &mut node.plane {
                plane.flip();
            }
            std::mem::swap(&mut node.front, &mut node.back);
        }
    }

    /// Removes the parts of `polygons` that lie inside this tree's solid.
    pub fn clip_polygons(&self, polygons: Vec<Polygon>) -> Vec<Polygon> {
        let mut result = Vec::new();
        let mut stack: Vec<(usize, Vec<Polygon>)> = vec![(0, polygons)];

        while let Some((index, polys)) = stack.pop() {
            let node = &self.nodes[index];
            let plane = match node.plane {
                Some(plane) => plane,
                None => {
                    result.extend(polys);
                    continue;
                }
            };

            let mut buckets = SplitBuckets::default();
            for poly in polys {
                poly.split(&plane, &mut buckets);
            }
            let mut front = buckets.front;
            front.append(&mut buckets.coplanar_front);
            let mut back = buckets.back;
            back.append(&mut buckets.coplanar_back);

            match node.front {
                Some(child) => stack.push((child, front)),
                None => result.extend(front),
            }
            // Polygons falling behind a leaf are inside the solid and dropped
            if let Some(child) = node.back {
                stack.push((child, back));
            }
        }

        result
    }

    /// Removes every polygon of this tree lying inside `other`.
    pub fn clip_to(&mut self, other: &BspTree) {
        for node in &mut self.nodes {
            let polygons = std::mem::take(&mut node.polygons);
            node.polygons = other.clip_polygons(polygons);
        }
    }

    /// Returns all polygons in node order.
    pub fn all_polygons(&self) -> Vec<Polygon> {
        self.nodes
            .iter()
            .flat_map(|node| node.polygons.iter().cloned())
            .collect()
    }

    /// Returns the number of nodes in the arena.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    fn square_at(z: f64, up: bool) -> Polygon {
        let mut verts = vec![
            DVec3::new(0.0, 0.0, z),
            DVec3::new(1.0, 0.0, z),
            DVec3::new(1.0, 1.0, z),
            DVec3::new(0.0, 1.0, z),
        ];
        if !up {
            verts.reverse();
        }
        Polygon::from_vertices(verts).unwrap()
    }

    #[test]
    fn test_build_creates_children() {
        let tree = BspTree::new(vec![square_at(0.0, true), square_at(1.0, true), square_at(-1.0, true)]);
        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.all_polygons().len(), 3);
    }

    #[test]
    fn test_invert_twice_is_identity() {
        let mut tree = BspTree::new(vec![square_at(0.0, true), square_at(1.0, false)]);
        let before: Vec<DVec3> = tree.all_polygons().iter().map(|p| p.plane().normal()).collect();
        tree.invert();
        tree.invert();
        let after: Vec<DVec3> = tree.all_polygons().iter().map(|p| p.plane().normal()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_clip_drops_polygons_behind_leaf() {
        // Single upward plane at z=0: the half-space below is solid
        let tree = BspTree::new(vec![square_at(0.0, true)]);
        let kept = tree.clip_polygons(vec![square_at(2.0, true), square_at(-2.0, true)]);
        assert_eq!(kept.len(), 1);
        assert!(kept[0].vertices()[0].z > 0.0);
    }
}
