//! # Scene Import
//!
//! Creates atom and bond primitives from positions and radii.
//!
//! Sphere meshes are tessellated at `atom_scale` times the nominal radius,
//! but the radius attribute keeps the nominal value so the motif selectors
//! still recognize elements.

use crate::error::{MolPrintError, MolPrintResult};
use crate::kernel::GeometryKernel;
use crate::primitive::{Material, Primitive, PrimitiveId, PrimitiveKind};
use crate::session::Session;
use glam::DVec3;
use molprint_mesh::Mesh;
use serde::{Deserialize, Serialize};
use tracing::info;

/// One atom of an imported model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtomSpec {
    #[serde(default)]
    pub name: Option<String>,
    pub position: [f64; 3],
    pub radius: f64,
    #[serde(default)]
    pub color: Option<[f32; 3]>,
}

/// One bond of an imported model, given by its end points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondSpec {
    #[serde(default)]
    pub name: Option<String>,
    pub start: [f64; 3],
    pub end: [f64; 3],
    pub radius: f64,
    #[serde(default)]
    pub color: Option<[f32; 3]>,
}

/// A ball-and-stick model as produced by a structure viewer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneSpec {
    #[serde(default)]
    pub atoms: Vec<AtomSpec>,
    #[serde(default)]
    pub bonds: Vec<BondSpec>,
}

impl SceneSpec {
    /// Parses a scene from JSON.
    ///
    /// # Example
    ///
    /// ```rust
    /// use molprint_core::SceneSpec;
    ///
    /// let scene = SceneSpec::from_json(r#"{
    ///     "atoms": [{ "position": [0, 0, 0], "radius": 0.6 }],
    ///     "bonds": [{ "start": [0, 0, 0], "end": [1.5, 0, 0], "radius": 0.3 }]
    /// }"#).unwrap();
    /// assert_eq!(scene.atoms.len(), 1);
    /// ```
    pub fn from_json(json: &str) -> MolPrintResult<Self> {
        let scene: Self = serde_json::from_str(json)?;
        scene.validate()?;
        Ok(scene)
    }

    /// Checks every radius and bond length before anything is created.
    pub fn validate(&self) -> MolPrintResult<()> {
        for (index, atom) in self.atoms.iter().enumerate() {
            check_radius("atom", index, atom.radius)?;
            check_point("atom", index, atom.position)?;
        }
        for (index, bond) in self.bonds.iter().enumerate() {
            check_radius("bond", index, bond.radius)?;
            check_point("bond", index, bond.start)?;
            check_point("bond", index, bond.end)?;
            if DVec3::from(bond.start).distance(DVec3::from(bond.end)) <= 0.0 {
                return Err(MolPrintError::degenerate(format!(
                    "bond {} has zero length",
                    index
                )));
            }
        }
        Ok(())
    }
}

fn check_radius(what: &str, index: usize, radius: f64) -> MolPrintResult<()> {
    if radius.is_finite() && radius > 0.0 {
        Ok(())
    } else {
        Err(MolPrintError::degenerate(format!(
            "{} {} has radius {}",
            what, index, radius
        )))
    }
}

fn check_point(what: &str, index: usize, point: [f64; 3]) -> MolPrintResult<()> {
    if point.iter().all(|c| c.is_finite()) {
        Ok(())
    } else {
        Err(MolPrintError::degenerate(format!(
            "{} {} has a non-finite coordinate",
            what, index
        )))
    }
}

fn imported_material(color: Option<[f32; 3]>) -> Option<Material> {
    color.map(|color| Material {
        name: "imported".to_string(),
        color,
    })
}

impl<K: GeometryKernel> Session<K> {
    /// Adds an atom. Unnamed atoms are called `Sphere.NNN` after their id.
    pub fn import_sphere(
        &mut self,
        name: Option<&str>,
        center: DVec3,
        radius: f64,
    ) -> MolPrintResult<PrimitiveId> {
        check_radius("atom", 0, radius)?;
        let mesh = self.kernel.sphere(
            center,
            radius * self.settings.atom_scale,
            self.settings.prim_detail,
        )?;
        let primitive =
            Primitive::new(name.unwrap_or_default(), PrimitiveKind::Sphere, center, mesh)
                .with_radius(radius);
        Ok(self.insert_imported(primitive, name.is_none()))
    }

    /// Adds a bond between two points. Unnamed bonds are called
    /// `Cylinder.NNN` after their id.
    pub fn import_cylinder(
        &mut self,
        name: Option<&str>,
        start: DVec3,
        end: DVec3,
        radius: f64,
    ) -> MolPrintResult<PrimitiveId> {
        check_radius("bond", 0, radius)?;
        if start.distance(end) <= 0.0 {
            return Err(MolPrintError::degenerate("bond has zero length"));
        }
        let mesh = self
            .kernel
            .cylinder(start, end, radius, self.settings.prim_detail)?;
        let primitive = Primitive::new(
            name.unwrap_or_default(),
            PrimitiveKind::Cylinder,
            (start + end) / 2.0,
            mesh,
        )
        .with_radius(radius)
        .with_axis(start, end);
        Ok(self.insert_imported(primitive, name.is_none()))
    }

    /// Imports a whole model, atoms first, and returns the new ids in
    /// scene order.
    ///
    /// The scene is validated up front, so an invalid entry adds nothing.
    pub fn import_scene(&mut self, scene: &SceneSpec) -> MolPrintResult<Vec<PrimitiveId>> {
        scene.validate()?;
        let mut ids = Vec::with_capacity(scene.atoms.len() + scene.bonds.len());

        for atom in &scene.atoms {
            let id = self.import_sphere(
                atom.name.as_deref(),
                DVec3::from(atom.position),
                atom.radius,
            )?;
            if let Some(material) = imported_material(atom.color) {
                self.registry.require_mut(id)?.set_material(material);
            }
            ids.push(id);
        }
        for bond in &scene.bonds {
            let id = self.import_cylinder(
                bond.name.as_deref(),
                DVec3::from(bond.start),
                DVec3::from(bond.end),
                bond.radius,
            )?;
            if let Some(material) = imported_material(bond.color) {
                self.registry.require_mut(id)?.set_material(material);
            }
            ids.push(id);
        }

        info!(
            atoms = scene.atoms.len(),
            bonds = scene.bonds.len(),
            "Imported scene"
        );
        Ok(ids)
    }

    /// Adds an object that did not come through import, so it carries no
    /// radius or axis. Its origin is the mesh centroid.
    pub fn insert_raw(
        &mut self,
        name: impl Into<String>,
        kind: PrimitiveKind,
        mesh: Mesh,
    ) -> PrimitiveId {
        let origin = mesh.centroid();
        self.insert_imported(Primitive::new(name, kind, origin, mesh), false)
    }

    /// New geometry makes every earlier clean-up and contact stale.
    fn insert_imported(&mut self, primitive: Primitive, default_name: bool) -> PrimitiveId {
        let kind = primitive.kind;
        let id = self.registry.insert(primitive);
        if default_name {
            if let Some(primitive) = self.registry.get_mut(id) {
                let prefix = match kind {
                    PrimitiveKind::Sphere => "Sphere",
                    _ => "Cylinder",
                };
                primitive.name = format!("{}.{:03}", prefix, id.0);
            }
        }
        self.flags.cleaned = false;
        self.flags.exported = false;
        self.invalidate_interactions();
        id
    }
}
