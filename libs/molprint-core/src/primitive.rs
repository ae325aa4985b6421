//! # Primitives
//!
//! Typed records for the solids in a model and the arena that owns them.
//!
//! Identifiers are indices into the arena and are never reused, so an id
//! held across a deletion resolves to nothing rather than to a stranger.

use crate::error::{MolPrintError, MolPrintResult};
use glam::{DQuat, DVec3};
use molprint_mesh::Mesh;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a primitive within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PrimitiveId(pub u32);

impl fmt::Display for PrimitiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a primitive represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveKind {
    /// An atom
    Sphere,
    /// A bond or strut
    Cylinder,
    /// A connector generated while joining
    Pin,
    /// A fused, printable part
    CompositeSolid,
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sphere => "sphere",
            Self::Cylinder => "cylinder",
            Self::Pin => "pin",
            Self::CompositeSolid => "composite solid",
        };
        f.write_str(name)
    }
}

/// A named color assigned to a group of primitives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub color: [f32; 3],
}

/// A solid in the model together with its pipeline attributes.
#[derive(Debug, Clone)]
pub struct Primitive {
    pub name: String,
    pub kind: PrimitiveKind,
    /// Pivot for rotations; the center of the atom or bond on import
    pub origin: DVec3,
    /// Nominal atom or bond radius; absent on objects added outside import
    pub radius: Option<f64>,
    /// Bond end points, for cylinders
    pub axis: Option<(DVec3, DVec3)>,
    pub is_hbond: bool,
    /// Pins attached to this primitive. `None` until interactions are built;
    /// after a join, only final parts carry a list.
    pub pin_refs: Option<Vec<PrimitiveId>>,
    pub material: Option<Material>,
    pub mesh: Mesh,
}

impl Primitive {
    /// Creates a primitive with no attributes beyond its kind and mesh.
    pub fn new(name: impl Into<String>, kind: PrimitiveKind, origin: DVec3, mesh: Mesh) -> Self {
        Self {
            name: name.into(),
            kind,
            origin,
            radius: None,
            axis: None,
            is_hbond: false,
            pin_refs: None,
            material: None,
            mesh,
        }
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn with_axis(mut self, start: DVec3, end: DVec3) -> Self {
        self.axis = Some((start, end));
        self
    }

    pub fn is_sphere(&self) -> bool {
        self.kind == PrimitiveKind::Sphere
    }

    pub fn is_cylinder(&self) -> bool {
        self.kind == PrimitiveKind::Cylinder
    }

    /// World position used for distance cutoffs.
    pub fn position(&self) -> DVec3 {
        self.origin
    }

    /// Distance between the positions of two primitives.
    pub fn distance_to(&self, other: &Primitive) -> f64 {
        self.origin.distance(other.origin)
    }

    /// Moves the primitive and everything that describes it.
    pub fn translate(&mut self, offset: DVec3) {
        self.mesh.translate(offset);
        self.origin += offset;
        if let Some((start, end)) = self.axis.as_mut() {
            *start += offset;
            *end += offset;
        }
    }

    /// Rotates the primitive about its origin.
    pub fn rotate(&mut self, rotation: DQuat) {
        let pivot = self.origin;
        self.mesh.rotate_about(rotation, pivot);
        if let Some((start, end)) = self.axis.as_mut() {
            *start = pivot + rotation * (*start - pivot);
            *end = pivot + rotation * (*end - pivot);
        }
    }

    /// Moves the origin to the mesh's center of mass without moving the mesh.
    pub fn recenter(&mut self) {
        self.origin = self.mesh.center_of_mass();
    }

    /// Product of the bounding box extents.
    pub fn bounding_volume(&self) -> f64 {
        let extents = self.mesh.extents();
        extents.x * extents.y * extents.z
    }

    /// Assigns a material and paints the mesh with it.
    pub fn set_material(&mut self, material: Material) {
        let [r, g, b] = material.color;
        self.mesh.set_uniform_color([r, g, b, 1.0]);
        self.material = Some(material);
    }

    /// Swaps in a new mesh, repainting it with the current material.
    pub fn replace_mesh(&mut self, mesh: Mesh) {
        self.mesh = mesh;
        if let Some(material) = self.material.clone() {
            self.set_material(material);
        }
    }

    /// Pins attached to this primitive, empty when none are recorded.
    pub fn pins(&self) -> &[PrimitiveId] {
        self.pin_refs.as_deref().unwrap_or(&[])
    }
}

/// Arena of primitives keyed by [`PrimitiveId`].
#[derive(Debug, Clone, Default)]
pub struct Registry {
    slots: Vec<Option<Primitive>>,
    live: usize,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a primitive and returns its new id.
    pub fn insert(&mut self, primitive: Primitive) -> PrimitiveId {
        let id = PrimitiveId(self.slots.len() as u32);
        self.slots.push(Some(primitive));
        self.live += 1;
        id
    }

    pub fn get(&self, id: PrimitiveId) -> Option<&Primitive> {
        self.slots.get(id.0 as usize).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: PrimitiveId) -> Option<&mut Primitive> {
        self.slots.get_mut(id.0 as usize).and_then(Option::as_mut)
    }

    /// Looks up a primitive, failing with `UnknownPrimitive`.
    pub fn require(&self, id: PrimitiveId) -> MolPrintResult<&Primitive> {
        self.get(id).ok_or(MolPrintError::UnknownPrimitive(id))
    }

    pub fn require_mut(&mut self, id: PrimitiveId) -> MolPrintResult<&mut Primitive> {
        self.get_mut(id).ok_or(MolPrintError::UnknownPrimitive(id))
    }

    /// Radius of a primitive, failing with `MissingAttribute`.
    pub fn radius(&self, id: PrimitiveId) -> MolPrintResult<f64> {
        self.require(id)?
            .radius
            .ok_or(MolPrintError::MissingAttribute {
                id,
                attribute: "radius",
            })
    }

    /// Kind of a primitive; `None` for unknown ids.
    pub fn kind(&self, id: PrimitiveId) -> Option<PrimitiveKind> {
        self.get(id).map(|p| p.kind)
    }

    pub fn contains(&self, id: PrimitiveId) -> bool {
        self.get(id).is_some()
    }

    /// Removes a primitive; its id is never handed out again.
    pub fn remove(&mut self, id: PrimitiveId) -> Option<Primitive> {
        let removed = self.slots.get_mut(id.0 as usize).and_then(Option::take);
        if removed.is_some() {
            self.live -= 1;
        }
        removed
    }

    /// Live ids in ascending order.
    pub fn ids(&self) -> Vec<PrimitiveId> {
        self.iter().map(|(id, _)| id).collect()
    }

    /// Live primitives in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (PrimitiveId, &Primitive)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|p| (PrimitiveId(i as u32), p)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (PrimitiveId, &mut Primitive)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_mut().map(|p| (PrimitiveId(i as u32), p)))
    }

    /// Number of live primitives.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }
}
