//! # Orientation Solver
//!
//! Rotates parts so a flat side rests on the print bed.
//!
//! The resting side is a facet of the part's convex hull: automatically the
//! largest one, or the average of facets the user picks on a preview of the
//! hull. Rotations pivot about the part's origin, so its position is kept.

use crate::error::{MolPrintError, MolPrintResult};
use crate::kernel::GeometryKernel;
use crate::primitive::PrimitiveId;
use crate::session::Session;
use config::constants::{EPSILON, FLOOR_ANGLE_TOLERANCE, FLOOR_NORMAL};
use glam::{DQuat, DVec3};
use molprint_mesh::{HullFacet, Mesh};
use tracing::{debug, info};

const OPERATION: &str = "floor";

/// Minimal rotation taking `normal` onto the bed's downward normal.
///
/// The axis is the cross product of the two directions and the angle the
/// arc cosine of their dot product. Opposite directions turn half way round
/// an arbitrary perpendicular axis.
///
/// # Example
///
/// ```rust
/// use molprint_core::orient::floor_rotation;
/// use glam::DVec3;
///
/// let rotated = floor_rotation(DVec3::X) * DVec3::X;
/// assert!((rotated - DVec3::NEG_Z).length() < 1e-12);
/// ```
pub fn floor_rotation(normal: DVec3) -> DQuat {
    let from = normal.normalize_or_zero();
    let to = DVec3::from(FLOOR_NORMAL);
    if from == DVec3::ZERO {
        return DQuat::IDENTITY;
    }

    let axis = from.cross(to);
    let dot = from.dot(to).clamp(-1.0, 1.0);
    if axis.length_squared() < EPSILON {
        if dot > 0.0 {
            return DQuat::IDENTITY;
        }
        return DQuat::from_axis_angle(from.any_orthonormal_vector(), std::f64::consts::PI);
    }
    DQuat::from_axis_angle(axis.normalize(), dot.acos())
}

/// Index of the facet with the largest area.
///
/// Ties keep the earliest facet.
pub fn largest_facet(facets: &[HullFacet]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, facet) in facets.iter().enumerate() {
        match best {
            Some((_, area)) if facet.area <= area => {}
            _ => best = Some((index, facet.area)),
        }
    }
    best.map(|(index, _)| index)
}

/// Temporary hull shown while the user picks resting faces.
#[derive(Debug, Clone)]
pub struct FloorPreview {
    /// Primitive that will be rotated
    pub target: PrimitiveId,
    pub hull: Mesh,
    pub facets: Vec<HullFacet>,
}

/// Outcome of flooring every part.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FloorReport {
    pub floored: Vec<PrimitiveId>,
    /// Parts whose hull was degenerate
    pub skipped: Vec<PrimitiveId>,
}

impl<K: GeometryKernel> Session<K> {
    /// Floors every primitive on its largest hull facet.
    ///
    /// Parts whose hull cannot be built are skipped and recorded.
    pub fn floor_all(&mut self) -> MolPrintResult<FloorReport> {
        let mut report = FloorReport::default();

        for id in self.registry.ids() {
            let rotation = match self.resting_rotation(id) {
                Ok(rotation) => rotation,
                Err(err) => {
                    self.record(OPERATION, format!("{} skipped: {}", id, err));
                    report.skipped.push(id);
                    continue;
                }
            };
            if let Some(primitive) = self.registry.get_mut(id) {
                primitive.rotate(rotation);
                report.floored.push(id);
            }
        }

        info!(
            floored = report.floored.len(),
            skipped = report.skipped.len(),
            "Floored parts"
        );
        Ok(report)
    }

    /// Rotation that puts a primitive's largest hull facet on the bed.
    pub fn resting_rotation(&self, id: PrimitiveId) -> MolPrintResult<DQuat> {
        let primitive = self.registry.require(id)?;
        let hull = self.kernel.convex_hull(&primitive.mesh)?;
        let facets = self.kernel.hull_facets(&hull, FLOOR_ANGLE_TOLERANCE);
        let index = largest_facet(&facets)
            .ok_or_else(|| MolPrintError::degenerate(format!("hull of {} has no faces", id)))?;
        debug!(%id, facet = index, area = facets[index].area, "Chose resting facet");
        Ok(floor_rotation(facets[index].normal))
    }

    /// Builds the hull preview of the single selected primitive.
    ///
    /// # Errors
    ///
    /// - `AmbiguousSelection` unless exactly one primitive is selected
    /// - `PreconditionNotMet` while another preview is open
    /// - geometry errors when the hull is degenerate
    pub fn begin_floor_selected(&mut self) -> MolPrintResult<&FloorPreview> {
        if self.floor_preview.is_some() {
            return Err(MolPrintError::precondition(
                "begin floor selection",
                "a floor preview is already open",
            ));
        }
        let target = match self.selection.as_slice() {
            [only] => *only,
            other => {
                return Err(MolPrintError::ambiguous(format!(
                    "flooring needs one selected object, found {}",
                    other.len()
                )))
            }
        };

        let primitive = self.registry.require(target)?;
        let hull = self.kernel.convex_hull(&primitive.mesh)?;
        let facets = self.kernel.hull_facets(&hull, FLOOR_ANGLE_TOLERANCE);
        if facets.is_empty() {
            return Err(MolPrintError::degenerate(format!(
                "hull of {} has no faces",
                target
            )));
        }

        Ok(&*self.floor_preview.insert(FloorPreview {
            target,
            hull,
            facets,
        }))
    }

    /// The open hull preview, if any.
    pub fn floor_preview(&self) -> Option<&FloorPreview> {
        self.floor_preview.as_ref()
    }

    /// Floors the preview's target on the average normal of the chosen
    /// facets and closes the preview. Returns the applied rotation.
    pub fn apply_floor_selected(&mut self, facets: &[usize]) -> MolPrintResult<DQuat> {
        let Some(preview) = self.floor_preview.as_ref() else {
            return Err(MolPrintError::precondition(
                "apply floor selection",
                "no floor preview is open",
            ));
        };
        if facets.is_empty() {
            return Err(MolPrintError::ambiguous("no preview faces are selected"));
        }

        let mut total = DVec3::ZERO;
        for &index in facets {
            let facet = preview.facets.get(index).ok_or_else(|| {
                MolPrintError::ambiguous(format!("face {} is not on the preview", index))
            })?;
            total += facet.normal;
        }
        let average = total / facets.len() as f64;
        if average.length_squared() < EPSILON {
            return Err(MolPrintError::degenerate(
                "selected faces point in opposite directions",
            ));
        }

        let target = preview.target;
        let rotation = floor_rotation(average);
        self.registry.require_mut(target)?.rotate(rotation);
        self.floor_preview = None;
        info!(%target, faces = facets.len(), "Floored on selected faces");
        Ok(rotation)
    }

    /// Discards the preview without rotating anything. Returns true if one
    /// was open.
    pub fn cancel_floor_selected(&mut self) -> bool {
        self.floor_preview.take().is_some()
    }
}
