//! # Polygon for BSP Operations
//!
//! Convex polygon with plane and splitting support.

use super::plane::{Classification, Plane};
use glam::DVec3;

/// A convex polygon with its supporting plane.
///
/// Split fragments keep the plane of the polygon they came from.
#[derive(Debug, Clone)]
pub struct Polygon {
    vertices: Vec<DVec3>,
    plane: Plane,
}

/// Output buckets for [`Polygon::split`].
#[derive(Debug, Default)]
pub struct SplitBuckets {
    pub coplanar_front: Vec<Polygon>,
    pub coplanar_back: Vec<Polygon>,
    pub front: Vec<Polygon>,
    pub back: Vec<Polygon>,
}

impl Polygon {
    /// Create polygon from counter-clockwise vertices.
    ///
    /// Returns `None` if the first three vertices are collinear.
    pub fn from_vertices(vertices: Vec<DVec3>) -> Option<Self> {
        if vertices.len() < 3 {
            return None;
        }
        let plane = Plane::from_points(vertices[0], vertices[1], vertices[2])?;
        Some(Self { vertices, plane })
    }

    pub fn vertices(&self) -> &[DVec3] {
        &self.vertices
    }

    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    /// Reverse winding order and plane.
    pub fn flip(&mut self) {
        self.vertices.reverse();
        self.plane.flip();
    }

    /// Classify this polygon relative to a plane.
    pub fn classify(&self, plane: &Plane) -> Classification {
        let mut front = false;
        let mut back = false;

        for v in &self.vertices {
            match plane.classify_point(*v) {
                Classification::Front => front = true,
                Classification::Back => back = true,
                _ => {}
            }
        }

        match (front, back) {
            (true, true) => Classification::Spanning,
            (true, false) => Classification::Front,
            (false, true) => Classification::Back,
            (false, false) => Classification::Coplanar,
        }
    }

    /// Split polygon by a plane into the matching buckets.
    ///
    /// Coplanar polygons go to `coplanar_front` when they face the same way
    /// as the plane, otherwise to `coplanar_back`.
    pub fn split(self, plane: &Plane, out: &mut SplitBuckets) {
        match self.classify(plane) {
            Classification::Coplanar => {
                if self.plane.normal().dot(plane.normal()) > 0.0 {
                    out.coplanar_front.push(self);
                } else {
                    out.coplanar_back.push(self);
                }
            }
            Classification::Front => out.front.push(self),
            Classification::Back => out.back.push(self),
            Classification::Spanning => {
                let count = self.vertices.len();
                let mut front_verts = Vec::with_capacity(count + 1);
                let mut back_verts = Vec::with_capacity(count + 1);

                for i in 0..count {
                    let vi = self.vertices[i];
                    let vj = self.vertices[(i + 1) % count];
                    let ti = plane.classify_point(vi);
                    let tj = plane.classify_point(vj);

                    if ti != Classification::Back {
                        front_verts.push(vi);
                    }
                    if ti != Classification::Front {
                        back_verts.push(vi);
                    }

                    let crosses = matches!(
                        (ti, tj),
                        (Classification::Front, Classification::Back)
                            | (Classification::Back, Classification::Front)
                    );
                    if crosses {
                        let di = plane.signed_distance(vi);
                        let dj = plane.signed_distance(vj);
                        let point = vi.lerp(vj, di / (di - dj));
                        front_verts.push(point);
                        back_verts.push(point);
                    }
                }

                if front_verts.len() >= 3 {
                    out.front.push(Polygon {
                        vertices: front_verts,
                        plane: self.plane,
                    });
                }
                if back_verts.len() >= 3 {
                    out.back.push(Polygon {
                        vertices: back_verts,
                        plane: self.plane,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle(z0: f64, z1: f64, z2: f64) -> Polygon {
        Polygon::from_vertices(vec![
            DVec3::new(0.0, 0.0, z0),
            DVec3::new(1.0, 0.0, z1),
            DVec3::new(0.5, 1.0, z2),
        ])
        .unwrap()
    }

    #[test]
    fn test_polygon_flip() {
        let mut poly = triangle(0.0, 0.0, 0.0);
        let first = poly.vertices()[0];
        poly.flip();
        assert_eq!(poly.vertices()[2], first);
        assert_eq!(poly.plane().normal(), -DVec3::Z);
    }

    #[test]
    fn test_polygon_classify() {
        let plane = Plane::new(DVec3::Z, 0.0);
        assert_eq!(triangle(1.0, 1.0, 1.0).classify(&plane), Classification::Front);
        assert_eq!(triangle(-1.0, -1.0, -1.0).classify(&plane), Classification::Back);
        assert_eq!(triangle(-1.0, 1.0, 0.0).classify(&plane), Classification::Spanning);
    }

    #[test]
    fn test_polygon_split_spanning() {
        let plane = Plane::new(DVec3::Z, 0.0);
        let mut buckets = SplitBuckets::default();
        triangle(-1.0, -1.0, 1.0).split(&plane, &mut buckets);

        assert_eq!(buckets.front.len(), 1);
        assert_eq!(buckets.back.len(), 1);
        assert_eq!(buckets.front[0].vertices().len(), 3);
        assert_eq!(buckets.back[0].vertices().len(), 4);
    }

    #[test]
    fn test_polygon_split_coplanar_orientation() {
        let plane = Plane::new(DVec3::Z, 0.0);
        let mut buckets = SplitBuckets::default();
        let mut flipped = triangle(0.0, 0.0, 0.0);
        flipped.flip();
        triangle(0.0, 0.0, 0.0).split(&plane, &mut buckets);
        flipped.split(&plane, &mut buckets);

        assert_eq!(buckets.coplanar_front.len(), 1);
        assert_eq!(buckets.coplanar_back.len(), 1);
    }
}
