//! # Model Edits
//!
//! Manual adjustments made between building interactions and joining:
//! struts that brace a flexible model, and bond thickness.

use crate::error::{MolPrintError, MolPrintResult};
use crate::interaction::Interaction;
use crate::kernel::GeometryKernel;
use crate::primitive::{Primitive, PrimitiveId, PrimitiveKind};
use crate::session::Session;
use glam::{DMat4, DVec3};
use molprint_mesh::primitives::axis_rotation;
use tracing::{debug, info};

/// Matrix scaling radially by `factor` about the line through `start`
/// and `end`, leaving lengths along the line untouched.
pub fn radial_scale(start: DVec3, end: DVec3, factor: f64) -> DMat4 {
    let center = (start + end) / 2.0;
    let rotation = DMat4::from_quat(axis_rotation(end - start));
    DMat4::from_translation(center)
        * rotation
        * DMat4::from_scale(DVec3::new(factor, factor, 1.0))
        * rotation.inverse()
        * DMat4::from_translation(-center)
}

impl<K: GeometryKernel> Session<K> {
    /// Adds a strut between the two selected spheres.
    ///
    /// Struts are flagged as hydrogen bonds, so they get the looser pin
    /// fit when joined. Their contacts are recorded once the model has more
    /// than two; the selection is left as it was.
    pub fn add_strut(&mut self) -> MolPrintResult<PrimitiveId> {
        self.require_interactions("add strut")?;
        let (a, b) = match self.selection.as_slice() {
            &[a, b] => (a, b),
            other => {
                return Err(MolPrintError::ambiguous(format!(
                    "a strut needs two selected atoms, found {} selected objects",
                    other.len()
                )))
            }
        };
        let start = self.registry.require(a)?;
        let end = self.registry.require(b)?;
        if !start.is_sphere() || !end.is_sphere() {
            return Err(MolPrintError::ambiguous(
                "a strut can only join two atoms",
            ));
        }
        let (start, end) = (start.position(), end.position());

        let radius = self.settings.strut_radius;
        let mesh = self
            .kernel
            .cylinder(start, end, radius, self.settings.prim_detail)?;
        let mut strut = Primitive::new("", PrimitiveKind::Cylinder, (start + end) / 2.0, mesh)
            .with_radius(radius)
            .with_axis(start, end);
        strut.is_hbond = true;
        strut.pin_refs = Some(Vec::new());

        let id = self.registry.insert(strut);
        if let Some(strut) = self.registry.get_mut(id) {
            strut.name = format!("Strut.{:03}", id.0);
        }

        if self.interactions.len() > 2 {
            self.interactions.push(Interaction::new(a, id));
            self.interactions.push(Interaction::new(b, id));
        }

        info!(%id, from = %a, to = %b, length = start.distance(end), "Added strut");
        Ok(id)
    }

    /// Scales every covalent bond radially by `bond_scale`.
    ///
    /// Scaling compounds when repeated. Returns the number of bonds scaled.
    pub fn scale_bonds(&mut self) -> MolPrintResult<usize> {
        self.require_interactions("scale bonds")?;
        let factor = self.settings.bond_scale;
        let mut scaled = 0;

        for (id, primitive) in self.registry.iter_mut() {
            if !primitive.is_cylinder() || primitive.is_hbond {
                continue;
            }
            let (Some((start, end)), Some(radius)) = (primitive.axis, primitive.radius) else {
                debug!(%id, "Bond without axis or radius left unscaled");
                continue;
            };
            primitive.mesh.transform(&radial_scale(start, end, factor));
            primitive.radius = Some(radius * factor);
            scaled += 1;
        }

        info!(scaled, factor, "Scaled bonds");
        Ok(scaled)
    }
}
