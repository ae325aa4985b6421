//! # CPK Split
//!
//! Cuts a space-filling model into one part per element so each can be
//! printed in its own color.
//!
//! Overlapping atoms of different radii are cut apart at their radical
//! plane, where the two sphere surfaces meet, with a cylinder reaching past
//! the far side of the atom being cut. Cuts are collected first and applied
//! afterwards, so every cutter is built from the uncut spheres. Atoms of
//! equal radius are then fused into one part.

use crate::error::{MolPrintError, MolPrintResult};
use crate::grouping::group_material;
use crate::kernel::GeometryKernel;
use crate::pinjoin::solid;
use crate::primitive::{PrimitiveId, PrimitiveKind};
use crate::session::Session;
use config::constants::{
    round_to, BULK_UNION_CUBE_SIZE, EPSILON, RADIUS_MATCH_TOLERANCE, RADIUS_ROUND_DECIMALS,
};
use glam::{DQuat, DVec3};
use molprint_mesh::{BooleanOp, Mesh};
use std::time::Instant;
use tracing::{debug, info};

const OPERATION: &str = "cpk split";

/// Outcome of a CPK split.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CpkReport {
    /// One part per distinct radius, smallest id first
    pub parts: Vec<PrimitiveId>,
    /// Number of cuts applied
    pub cuts: usize,
}

/// Distance from the center of a sphere of radius `r_self` to the radical
/// plane it shares with a sphere of radius `r_other` at `distance`.
///
/// # Example
///
/// ```rust
/// use molprint_core::cpk::radical_plane_offset;
///
/// // Equal spheres meet half way
/// assert_eq!(radical_plane_offset(2.0, 1.0, 1.0), 1.0);
/// ```
pub fn radical_plane_offset(distance: f64, r_self: f64, r_other: f64) -> f64 {
    (distance * distance + r_self * r_self - r_other * r_other) / (2.0 * distance)
}

/// Cylinder end points removing the part of a sphere beyond the radical
/// plane, toward `toward`.
pub fn cutter_span(center: DVec3, toward: DVec3, r_self: f64, r_other: f64) -> (DVec3, DVec3) {
    let distance = center.distance(toward);
    let direction = (toward - center) / distance;
    let offset = radical_plane_offset(distance, r_self, r_other);
    (
        center + direction * offset,
        center + direction * (offset + 2.0 * r_self),
    )
}

impl<K: GeometryKernel> Session<K> {
    /// Splits the atoms into one composite part per radius.
    ///
    /// A failed cut or fuse is recorded and the atom keeps its uncut
    /// geometry. Afterwards the session is in the joined stage.
    pub fn cpk_split(&mut self) -> MolPrintResult<CpkReport> {
        if !self.flags.cleaned {
            return Err(MolPrintError::precondition(
                OPERATION,
                "the model has not been cleaned",
            ));
        }
        if self.flags.groups_joined || self.flags.cpk_split {
            return Err(MolPrintError::precondition(
                OPERATION,
                "the model has already been joined",
            ));
        }
        let start = Instant::now();

        let mut atoms = Vec::new();
        for (id, primitive) in self.registry.iter() {
            if primitive.is_sphere() {
                atoms.push(id);
            }
        }
        let mut radii = Vec::with_capacity(atoms.len());
        for &id in &atoms {
            radii.push(self.registry.radius(id)?);
        }

        let cutters = self.radical_cutters(&atoms, &radii);
        let cuts = self.apply_cuts(cutters);
        let parts = self.fuse_elements(&atoms, &radii);

        self.flags.cpk_split = true;
        self.invalidate_interactions();

        info!(
            parts = parts.len(),
            cuts,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Split model by element"
        );
        Ok(CpkReport { parts, cuts })
    }

    fn radical_cutters(&mut self, atoms: &[PrimitiveId], radii: &[f64]) -> Vec<(PrimitiveId, Mesh)> {
        let scale = self.settings.atom_scale;
        let segments = self.settings.prim_detail;
        let mut cutters = Vec::new();

        for i in 0..atoms.len() {
            for j in i + 1..atoms.len() {
                if (radii[i] - radii[j]).abs() < RADIUS_MATCH_TOLERANCE {
                    continue;
                }
                let (Some(a), Some(b)) = (self.registry.get(atoms[i]), self.registry.get(atoms[j]))
                else {
                    continue;
                };
                if a.distance_to(b) < EPSILON {
                    continue;
                }
                let touching = self.kernel.intersects(&a.mesh, &b.mesh);
                let (ca, cb) = (a.position(), b.position());
                match touching {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(err) => {
                        self.record(
                            OPERATION,
                            format!("contact test {} / {} failed: {}", atoms[i], atoms[j], err),
                        );
                        continue;
                    }
                }

                let (ra, rb) = (radii[i] * scale, radii[j] * scale);
                for (id, center, other, r_self, r_other) in
                    [(atoms[i], ca, cb, ra, rb), (atoms[j], cb, ca, rb, ra)]
                {
                    let (from, to) = cutter_span(center, other, r_self, r_other);
                    match self.kernel.cylinder(from, to, 2.0 * r_self, segments) {
                        Ok(cutter) => cutters.push((id, cutter)),
                        Err(err) => self.record(
                            OPERATION,
                            format!("could not build cutter for {}: {}", id, err),
                        ),
                    }
                }
            }
        }

        debug!(cutters = cutters.len(), "Built radical plane cutters");
        cutters
    }

    fn apply_cuts(&mut self, cutters: Vec<(PrimitiveId, Mesh)>) -> usize {
        let mut cuts = 0;
        for (id, cutter) in cutters {
            let result = match self.registry.get(id) {
                Some(atom) => solid(
                    self.kernel
                        .boolean(BooleanOp::Difference, &atom.mesh, &cutter),
                ),
                None => continue,
            };
            match result {
                Ok(mesh) => {
                    if let Some(atom) = self.registry.get_mut(id) {
                        atom.replace_mesh(mesh);
                        cuts += 1;
                    }
                }
                Err(err) => self.record(OPERATION, format!("cut of {} failed: {}", id, err)),
            }
        }
        cuts
    }

    /// Fuses atoms of equal rounded radius into their first atom.
    fn fuse_elements(&mut self, atoms: &[PrimitiveId], radii: &[f64]) -> Vec<PrimitiveId> {
        let mut elements: Vec<(f64, Vec<PrimitiveId>)> = Vec::new();
        for (&id, &radius) in atoms.iter().zip(radii) {
            let key = round_to(radius, RADIUS_ROUND_DECIMALS);
            match elements.iter_mut().find(|(k, _)| *k == key) {
                Some((_, members)) => members.push(id),
                None => elements.push((key, vec![id])),
            }
        }

        let mut parts = Vec::with_capacity(elements.len());
        for (index, (radius, members)) in elements.into_iter().enumerate() {
            let Some((&head, rest)) = members.split_first() else {
                continue;
            };
            for &id in rest {
                if let Some(atom) = self.remove_primitive(id) {
                    if let Some(part) = self.registry.get_mut(head) {
                        part.mesh.merge(&atom.mesh);
                    }
                }
            }

            let Some(part) = self.registry.get_mut(head) else {
                continue;
            };
            part.recenter();
            let result = self
                .kernel
                .cuboid(DVec3::splat(BULK_UNION_CUBE_SIZE), part.origin, DQuat::IDENTITY)
                .and_then(|cube| self.kernel.boolean(BooleanOp::Intersection, &cube, &part.mesh));
            let fused = solid(result);

            let Some(part) = self.registry.get_mut(head) else {
                continue;
            };
            match fused {
                Ok(mesh) => part.mesh = mesh,
                Err(err) => {
                    let message = format!("fuse of radius {} failed: {}", radius, err);
                    self.record(OPERATION, message);
                }
            }

            if let Some(part) = self.registry.get_mut(head) {
                part.kind = PrimitiveKind::CompositeSolid;
                part.pin_refs = Some(Vec::new());
                part.axis = None;
                part.set_material(group_material(index));
            }
            debug!(%head, radius, atoms = members.len(), "Fused element");
            parts.push(head);
        }
        parts
    }
}
