//! Triangle-triangle and edge-triangle intersection tests.
//!
//! Orientation signs come from the adaptive-precision predicates of the
//! `robust` crate, so touching and nearly-touching triangles are classified
//! consistently.

use glam::DVec3;
use robust::{orient2d, orient3d, Coord, Coord3D};

fn coord3(p: DVec3) -> Coord3D<f64> {
    Coord3D {
        x: p.x,
        y: p.y,
        z: p.z,
    }
}

/// Sign of the volume spanned by `d` against the plane through `a`, `b`, `c`.
///
/// Positive when `d` lies below the counter-clockwise plane.
fn orient(a: DVec3, b: DVec3, c: DVec3, d: DVec3) -> f64 {
    orient3d(coord3(a), coord3(b), coord3(c), coord3(d))
}

/// Drops the coordinate along `axis`.
fn project(p: DVec3, axis: usize) -> Coord<f64> {
    match axis {
        0 => Coord { x: p.y, y: p.z },
        1 => Coord { x: p.z, y: p.x },
        _ => Coord { x: p.x, y: p.y },
    }
}

fn orient_2d(a: DVec3, b: DVec3, c: DVec3, axis: usize) -> f64 {
    orient2d(project(a, axis), project(b, axis), project(c, axis))
}

/// Index of the largest normal component; projecting it away keeps the
/// triangle non-degenerate in 2D.
fn dominant_axis(normal: DVec3) -> usize {
    let n = normal.abs();
    if n.x >= n.y && n.x >= n.z {
        0
    } else if n.y >= n.z {
        1
    } else {
        2
    }
}

fn same_side(values: [f64; 3]) -> bool {
    values.iter().all(|&v| v > 0.0) || values.iter().all(|&v| v < 0.0)
}

/// Tests whether segment `e0`-`e1` touches triangle `tri`.
///
/// # Example
///
/// ```rust
/// use molprint_mesh::ops::intersect::segment_intersects_triangle;
/// use glam::DVec3;
///
/// let tri = [DVec3::ZERO, DVec3::X * 2.0, DVec3::Y * 2.0];
/// let hit = segment_intersects_triangle(
///     DVec3::new(0.5, 0.5, -1.0),
///     DVec3::new(0.5, 0.5, 1.0),
///     tri,
/// );
/// assert!(hit);
/// ```
pub fn segment_intersects_triangle(e0: DVec3, e1: DVec3, tri: [DVec3; 3]) -> bool {
    let [a, b, c] = tri;
    let s0 = orient(a, b, c, e0);
    let s1 = orient(a, b, c, e1);

    if (s0 > 0.0 && s1 > 0.0) || (s0 < 0.0 && s1 < 0.0) {
        return false;
    }

    if s0 == 0.0 && s1 == 0.0 {
        return coplanar_segment_triangle(e0, e1, tri);
    }

    // The segment crosses the plane; it hits the triangle when it passes on
    // the same side of all three edges
    let sides = [
        orient(e0, e1, a, b),
        orient(e0, e1, b, c),
        orient(e0, e1, c, a),
    ];
    let positive = sides.iter().all(|&v| v >= 0.0);
    let negative = sides.iter().all(|&v| v <= 0.0);
    positive || negative
}

fn coplanar_segment_triangle(e0: DVec3, e1: DVec3, tri: [DVec3; 3]) -> bool {
    let [a, b, c] = tri;
    let axis = dominant_axis((b - a).cross(c - a));

    if point_in_triangle_2d(e0, tri, axis) || point_in_triangle_2d(e1, tri, axis) {
        return true;
    }
    [(a, b), (b, c), (c, a)]
        .iter()
        .any(|&(p, q)| segments_intersect_2d(e0, e1, p, q, axis))
}

fn point_in_triangle_2d(p: DVec3, tri: [DVec3; 3], axis: usize) -> bool {
    let [a, b, c] = tri;
    let sides = [
        orient_2d(a, b, p, axis),
        orient_2d(b, c, p, axis),
        orient_2d(c, a, p, axis),
    ];
    sides.iter().all(|&v| v >= 0.0) || sides.iter().all(|&v| v <= 0.0)
}

fn segments_intersect_2d(p0: DVec3, p1: DVec3, q0: DVec3, q1: DVec3, axis: usize) -> bool {
    let d1 = orient_2d(q0, q1, p0, axis);
    let d2 = orient_2d(q0, q1, p1, axis);
    let d3 = orient_2d(p0, p1, q0, axis);
    let d4 = orient_2d(p0, p1, q1, axis);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    let on_segment = |a: DVec3, b: DVec3, p: DVec3| {
        let (lo, hi) = (a.min(b), a.max(b));
        p.cmpge(lo).all() && p.cmple(hi).all()
    };

    (d1 == 0.0 && on_segment(q0, q1, p0))
        || (d2 == 0.0 && on_segment(q0, q1, p1))
        || (d3 == 0.0 && on_segment(p0, p1, q0))
        || (d4 == 0.0 && on_segment(p0, p1, q1))
}

/// Tests whether two triangles share at least one point.
///
/// Non-coplanar triangles intersect exactly when an edge of one meets the
/// other; coplanar pairs are resolved in 2D.
pub fn triangles_intersect(t1: [DVec3; 3], t2: [DVec3; 3]) -> bool {
    let [a0, a1, a2] = t1;
    let [b0, b1, b2] = t2;

    let b_vs_a = [orient(a0, a1, a2, b0), orient(a0, a1, a2, b1), orient(a0, a1, a2, b2)];
    if same_side(b_vs_a) {
        return false;
    }
    let a_vs_b = [orient(b0, b1, b2, a0), orient(b0, b1, b2, a1), orient(b0, b1, b2, a2)];
    if same_side(a_vs_b) {
        return false;
    }

    let edges_a = [(a0, a1), (a1, a2), (a2, a0)];
    let edges_b = [(b0, b1), (b1, b2), (b2, b0)];

    edges_a
        .iter()
        .any(|&(e0, e1)| segment_intersects_triangle(e0, e1, t2))
        || edges_b
            .iter()
            .any(|&(e0, e1)| segment_intersects_triangle(e0, e1, t1))
}
