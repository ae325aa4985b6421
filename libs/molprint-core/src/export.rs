//! # Export
//!
//! Hands the finished parts to a file writer. Serialization formats live
//! with the host; this only decides which meshes leave the session and with
//! which colors.

use crate::error::{MolPrintError, MolPrintResult};
use crate::kernel::GeometryKernel;
use crate::primitive::PrimitiveId;
use crate::session::Session;
use molprint_mesh::Mesh;
use tracing::info;

/// A part ready to be written out.
#[derive(Debug, Clone)]
pub struct ExportedPart {
    pub id: PrimitiveId,
    pub name: String,
    /// Material color, only when exporting in multiple colors
    pub color: Option<[f32; 3]>,
    pub mesh: Mesh,
}

impl<K: GeometryKernel> Session<K> {
    /// Returns every remaining part in id order.
    ///
    /// Single-color exports strip vertex colors from the meshes.
    pub fn export(&mut self) -> MolPrintResult<Vec<ExportedPart>> {
        if !(self.flags.groups_joined || self.flags.cpk_split) {
            return Err(MolPrintError::precondition(
                "export",
                "the model has not been joined",
            ));
        }
        let multicolor = self.settings.multicolor;

        let parts: Vec<ExportedPart> = self
            .registry
            .iter()
            .map(|(id, primitive)| {
                let mut mesh = primitive.mesh.clone();
                let color = if multicolor {
                    primitive.material.as_ref().map(|m| m.color)
                } else {
                    mesh.clear_colors();
                    None
                };
                ExportedPart {
                    id,
                    name: primitive.name.clone(),
                    color,
                    mesh,
                }
            })
            .collect();

        self.flags.exported = true;
        info!(parts = parts.len(), multicolor, "Exported parts");
        Ok(parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::PipelineStage;
    use glam::DVec3;

    fn split(settings: Settings) -> Session {
        let mut session = Session::new(settings).unwrap();
        session.import_sphere(None, DVec3::ZERO, 0.6).unwrap();
        session.import_sphere(None, DVec3::X * 4.0, 0.36).unwrap();
        session.clean().unwrap();
        session.cpk_split().unwrap();
        session
    }

    #[test]
    fn test_export_requires_join() {
        let mut session = Session::default();
        session.import_sphere(None, DVec3::ZERO, 0.6).unwrap();
        assert!(matches!(
            session.export(),
            Err(MolPrintError::PreconditionNotMet { .. })
        ));
    }

    #[test]
    fn test_single_color_strips_colors() {
        let mut session = split(Settings::default());
        let parts = session.export().unwrap();
        assert_eq!(parts.len(), 2);
        assert!(parts.iter().all(|p| p.color.is_none() && p.mesh.colors().is_none()));
        assert_eq!(session.stage(), PipelineStage::Exported);
    }

    #[test]
    fn test_multicolor_keeps_material_colors() {
        let settings = Settings {
            multicolor: true,
            ..Settings::default()
        };
        let mut session = split(settings);
        let parts = session.export().unwrap();
        assert_eq!(parts[0].color, Some([0.0, 1.0, 1.0]));
        assert_eq!(parts[1].color, Some([0.25, 0.66, 0.33]));
    }
}
