//! # Model Clean-Up
//!
//! Structure viewers export atoms drawn twice, bonds drawn twice and bonds
//! split into two colored halves. Cleaning removes the first two and welds
//! the halves back together, then builds the interaction set.

use crate::error::{MolPrintError, MolPrintResult};
use crate::kernel::GeometryKernel;
use crate::primitive::{Primitive, PrimitiveId};
use crate::session::Session;
use config::constants::{
    COLLINEAR_TOLERANCE, DUPLICATE_CYLINDER_CUTOFF, INSIDE_SPHERE_CUTOFF, SPLIT_CYLINDER_CUTOFF,
    SPLIT_ENDPOINT_TOLERANCE,
};
use glam::DVec3;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info};

const OPERATION: &str = "clean";

/// What a clean pass changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanReport {
    /// Spheres contained in another sphere
    pub inside: Vec<PrimitiveId>,
    /// Cylinders coinciding with an earlier cylinder
    pub duplicates: Vec<PrimitiveId>,
    /// `(kept, removed)` halves welded into one bond
    pub merged: Vec<(PrimitiveId, PrimitiveId)>,
}

/// Which of two primitives sits inside the other's bounding box.
///
/// The candidate is the one with the smaller bounding-box volume; it is
/// inside when, on every axis, its half extent plus the center offset fits
/// in the other's half extent. Equal volumes pick `b`.
pub fn is_inside<K: GeometryKernel>(
    kernel: &K,
    (a_id, a): (PrimitiveId, &Primitive),
    (b_id, b): (PrimitiveId, &Primitive),
) -> Option<PrimitiveId> {
    let a_extents = kernel.bounding_box(&a.mesh);
    let b_extents = kernel.bounding_box(&b.mesh);
    let volume = |e: DVec3| e.x * e.y * e.z;

    let ((small_id, small, small_extents), (big, big_extents)) =
        if volume(a_extents) < volume(b_extents) {
            ((a_id, a, a_extents), (b, b_extents))
        } else {
            ((b_id, b, b_extents), (a, a_extents))
        };

    let offset = (small.position() - big.position()).abs();
    let fits = offset + small_extents / 2.0;
    let room = big_extents / 2.0;
    (fits.cmple(room)).all().then_some(small_id)
}

/// Outer end points of two bond halves meeting at a shared end point.
///
/// Returns `None` unless an end point of `a` lies on an end point of `b`
/// and both halves point along the same line.
pub fn split_span(a: (DVec3, DVec3), b: (DVec3, DVec3)) -> Option<(DVec3, DVec3)> {
    let a_dir = (a.1 - a.0).normalize_or_zero();
    let b_dir = (b.1 - b.0).normalize_or_zero();
    if a_dir == DVec3::ZERO
        || b_dir == DVec3::ZERO
        || a_dir.cross(b_dir).length() > COLLINEAR_TOLERANCE
    {
        return None;
    }

    let a_ends = [(a.0, a.1), (a.1, a.0)];
    let b_ends = [(b.0, b.1), (b.1, b.0)];
    for (a_shared, a_outer) in a_ends {
        for (b_shared, b_outer) in b_ends {
            if a_shared.distance(b_shared) < SPLIT_ENDPOINT_TOLERANCE {
                return Some((a_outer, b_outer));
            }
        }
    }
    None
}

impl<K: GeometryKernel> Session<K> {
    /// Removes contained spheres and duplicate cylinders, welds split
    /// bonds, and builds the interaction set.
    ///
    /// Pairs are visited in id order; a primitive removed earlier in the
    /// pass takes no further part. Split bonds are welded after the scan,
    /// so every pair is compared on the imported geometry.
    pub fn clean(&mut self) -> MolPrintResult<CleanReport> {
        if self.registry.is_empty() {
            return Err(MolPrintError::precondition(OPERATION, "the model is empty"));
        }
        if self.flags.groups_joined || self.flags.cpk_split {
            return Err(MolPrintError::precondition(
                OPERATION,
                "the model has already been joined",
            ));
        }
        let start = Instant::now();

        let ids = self.registry.ids();
        let mut removed: HashSet<PrimitiveId> = HashSet::new();
        let mut report = CleanReport::default();
        let mut splits = Vec::new();
        let mut welding: HashSet<PrimitiveId> = HashSet::new();

        for (i, &a) in ids.iter().enumerate() {
            for &b in &ids[i + 1..] {
                if removed.contains(&a) {
                    break;
                }
                if removed.contains(&b) {
                    continue;
                }
                let (Some(pa), Some(pb)) = (self.registry.get(a), self.registry.get(b)) else {
                    continue;
                };
                let distance = pa.distance_to(pb);

                if pa.is_sphere() && pb.is_sphere() {
                    if distance < INSIDE_SPHERE_CUTOFF {
                        if let Some(inner) = is_inside(&self.kernel, (a, pa), (b, pb)) {
                            debug!(%inner, "Sphere inside another");
                            removed.insert(inner);
                            report.inside.push(inner);
                        }
                    }
                } else if pa.is_cylinder() && pb.is_cylinder() {
                    if distance < DUPLICATE_CYLINDER_CUTOFF {
                        debug!(duplicate = %b, of = %a, "Duplicate cylinder");
                        removed.insert(b);
                        report.duplicates.push(b);
                    } else if distance < SPLIT_CYLINDER_CUTOFF {
                        let (Some(a_axis), Some(b_axis)) = (pa.axis, pb.axis) else {
                            continue;
                        };
                        if welding.contains(&a) {
                            continue;
                        }
                        if let Some(span) = split_span(a_axis, b_axis) {
                            removed.insert(b);
                            welding.insert(a);
                            splits.push((a, b, span));
                        }
                    }
                }
            }
        }

        // Welds run on the geometry the scan compared
        for (kept, half, span) in splits {
            if self.weld(kept, span)? {
                report.merged.push((kept, half));
            } else {
                removed.remove(&half);
            }
        }

        for &id in &removed {
            self.remove_primitive(id);
        }
        self.flags.cleaned = true;
        self.rebuild_interactions();

        info!(
            inside = report.inside.len(),
            duplicates = report.duplicates.len(),
            merged = report.merged.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Cleaned model"
        );
        Ok(report)
    }

    /// Regenerates `id` as one bond over `span`. Returns false when the
    /// bond could not be rebuilt, which is recorded.
    fn weld(&mut self, id: PrimitiveId, (start, end): (DVec3, DVec3)) -> MolPrintResult<bool> {
        let radius = self.registry.radius(id)?;
        let mesh = match self
            .kernel
            .cylinder(start, end, radius, self.settings.prim_detail)
        {
            Ok(mesh) => mesh,
            Err(err) => {
                self.record(OPERATION, format!("could not weld {}: {}", id, err));
                return Ok(false);
            }
        };

        let bond = self.registry.require_mut(id)?;
        bond.replace_mesh(mesh);
        bond.axis = Some((start, end));
        bond.origin = (start + end) / 2.0;
        debug!(%id, length = start.distance(end), "Welded split bond");
        Ok(true)
    }
}
