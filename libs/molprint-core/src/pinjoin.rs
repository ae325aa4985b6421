//! # Pin/Join Engine
//!
//! Turns each group into one printable solid with pin connectors at the
//! contacts the selection cut.
//!
//! ## Steps
//!
//! 1. **Pairing**: selected spheres and cylinders whose meshes touch
//! 2. **Socket clearance**: each cylinder minus its sphere
//! 3. **Pin synthesis**: a pin between the two centers, unioned into the
//!    cylinder and recorded on the sphere
//! 4. **Group fusion**: members merged into the first one, pin lists combined
//! 5. **Bulk union**: intersection with a large cube to resolve internal faces
//! 6. **Pin clearance**: enlarged pins differenced out of each part
//! 7. **Cleanup**: everything without a pin list is deleted
//!
//! A failing boolean skips its pair or group and is recorded as a
//! diagnostic; the rest of the run continues.

use crate::error::{MolPrintError, MolPrintResult};
use crate::kernel::GeometryKernel;
use crate::primitive::{Primitive, PrimitiveId, PrimitiveKind};
use crate::session::Session;
use crate::settings::{PinShape, Settings};
use config::constants::{BULK_UNION_CUBE_SIZE, EPSILON, WOODRUFF_KEY_FRACTION};
use glam::{DQuat, DVec3};
use molprint_mesh::{BooleanOp, Mesh, MeshResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::time::Instant;
use tracing::{debug, info};

const OPERATION: &str = "pin join";

/// Outcome of a join run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinReport {
    /// Sphere/cylinder contacts found among the selection
    pub pairs: usize,
    /// Pins generated
    pub pins: usize,
    /// Final parts, one per group
    pub parts: Vec<PrimitiveId>,
    /// Scaffolding primitives deleted
    pub removed: usize,
    /// Recoverable failures recorded during the run
    pub failures: usize,
}

/// Rotation taking +Z onto `direction`, built from its azimuth and inclination.
pub fn bond_rotation(direction: DVec3) -> DQuat {
    let length = direction.length();
    if length < EPSILON {
        return DQuat::IDENTITY;
    }
    let phi = direction.y.atan2(direction.x);
    let theta = (direction.z / length).clamp(-1.0, 1.0).acos();
    DQuat::from_rotation_z(phi) * DQuat::from_rotation_y(theta)
}

/// Placement and size of one pin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinGeometry {
    pub start: DVec3,
    pub end: DVec3,
    pub center: DVec3,
    pub rotation: DQuat,
    pub length: f64,
    pub radius: f64,
    pub sides: u32,
    pub cuboid: bool,
}

/// Sizes the pin joining a sphere center to a cylinder center.
///
/// Hydrogen-bond pins use their own ratio and side count and are always
/// round. Returns `None` when the centers coincide.
pub fn pin_geometry(
    sphere_center: DVec3,
    cylinder_center: DVec3,
    bond_radius: f64,
    hbond: bool,
    settings: &Settings,
) -> Option<PinGeometry> {
    let direction = cylinder_center - sphere_center;
    let length = direction.length();
    if length < EPSILON {
        return None;
    }

    let (ratio, sides) = if hbond {
        (settings.h_pin_to_bond, settings.h_pin_sides)
    } else {
        (settings.pin_to_bond, settings.pin_sides)
    };

    Some(PinGeometry {
        start: sphere_center,
        end: cylinder_center,
        center: (sphere_center + cylinder_center) / 2.0,
        rotation: bond_rotation(direction),
        length,
        radius: bond_radius * ratio,
        sides,
        cuboid: settings.pin_shape == PinShape::Cuboid && !hbond,
    })
}

/// Center, size and rotation of the anti-rotation key on side `face`.
///
/// The key is half the pin's size in every direction and is centered on the
/// pin surface, so half of it protrudes.
pub fn woodruff_key(pin: &PinGeometry, face: u32) -> (DVec3, DVec3, DQuat) {
    let (bearing, apothem) = if pin.cuboid {
        (face as f64 * FRAC_PI_2, pin.radius)
    } else {
        let sides = pin.sides.max(3) as f64;
        ((face as f64 + 0.5) * TAU / sides, pin.radius * (PI / sides).cos())
    };

    let local = DVec3::new(bearing.cos(), bearing.sin(), 0.0) * apothem;
    let center = pin.center + pin.rotation * local;
    let size = DVec3::new(2.0 * pin.radius, 2.0 * pin.radius, pin.length) * WOODRUFF_KEY_FRACTION;
    let rotation = pin.rotation * DQuat::from_rotation_z(bearing);
    (center, size, rotation)
}

/// Pin solid in the same frame [`woodruff_key`] places keys in.
///
/// Round pins are built along +Z and then turned by `pin.rotation`, so side
/// face `j` spans bearings `j` to `j + 1` of `TAU / sides` about the bond.
pub fn pin_solid<K: GeometryKernel>(kernel: &K, pin: &PinGeometry) -> MeshResult<Mesh> {
    if pin.cuboid {
        let size = DVec3::new(2.0 * pin.radius, 2.0 * pin.radius, pin.length);
        return kernel.cuboid(size, pin.center, pin.rotation);
    }
    let half = DVec3::Z * (pin.length / 2.0);
    let mut mesh = kernel.cylinder(-half, half, pin.radius, pin.sides)?;
    mesh.rotate_about(pin.rotation, DVec3::ZERO);
    mesh.translate(pin.center);
    Ok(mesh)
}

/// Rejects boolean results that came back empty.
pub(crate) fn solid(result: MeshResult<Mesh>) -> MolPrintResult<Mesh> {
    let mesh = result?;
    if mesh.is_empty() {
        return Err(MolPrintError::degenerate("boolean produced an empty solid"));
    }
    Ok(mesh)
}

impl<K: GeometryKernel> Session<K> {
    /// Joins the current groups into printable parts.
    ///
    /// Regroups from the current selection first. Afterwards the session is
    /// in the joined stage: interactions, groups and selection are cleared.
    ///
    /// # Errors
    ///
    /// - `PreconditionNotMet` when interactions are not built or nothing is
    ///   selected
    /// - `MissingAttribute` when a selected cylinder has no radius
    pub fn pin_join(&mut self) -> MolPrintResult<JoinReport> {
        self.require_interactions("join")?;
        for &id in &self.selection {
            let primitive = self.registry.require(id)?;
            if primitive.is_cylinder() && primitive.radius.is_none() {
                return Err(MolPrintError::MissingAttribute {
                    id,
                    attribute: "radius",
                });
            }
        }

        self.update_groups()?;
        if self.groups.is_empty() {
            return Err(MolPrintError::precondition(
                "join",
                "there are no groups; select the primitives to print",
            ));
        }

        let failures_before = self.diagnostics.len();
        let mut rng = match self.settings.woodruff_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let start = Instant::now();
        let pairs = self.pair_contacts();
        let socketed = self.clear_sockets(&pairs);
        let pins = self.synthesize_pins(&socketed, &mut rng);
        debug!(
            pairs = pairs.len(),
            pins,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Pin generation finished"
        );

        let start = Instant::now();
        let fused = self.fuse_groups();
        let unioned = self.bulk_union(&fused);
        debug!(
            parts = fused.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Bulk union finished"
        );

        let start = Instant::now();
        self.clear_pin_holes(&unioned);
        let removed = self.remove_scaffolding();
        debug!(
            removed,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Pin clearance finished"
        );

        self.flags.groups_joined = true;
        self.invalidate_interactions();
        self.selection.clear();

        let report = JoinReport {
            pairs: pairs.len(),
            pins,
            parts: fused,
            removed,
            failures: self.diagnostics.len() - failures_before,
        };
        info!(
            parts = report.parts.len(),
            pins = report.pins,
            failures = report.failures,
            "Joined groups"
        );
        Ok(report)
    }

    /// Step 1: touching (sphere, cylinder) pairs among the selection.
    fn pair_contacts(&mut self) -> Vec<(PrimitiveId, PrimitiveId)> {
        let mut spheres = Vec::new();
        let mut cylinders = Vec::new();
        for &id in &self.selection {
            match self.registry.kind(id) {
                Some(PrimitiveKind::Sphere) => spheres.push(id),
                Some(PrimitiveKind::Cylinder) => cylinders.push(id),
                _ => {}
            }
        }

        for &id in spheres.iter().chain(&cylinders) {
            if let Some(primitive) = self.registry.get_mut(id) {
                primitive.pin_refs = Some(Vec::new());
            }
        }

        let mut pairs = Vec::new();
        let mut failures = Vec::new();
        for &cylinder in &cylinders {
            for &sphere in &spheres {
                let (Some(s), Some(c)) = (self.registry.get(sphere), self.registry.get(cylinder))
                else {
                    continue;
                };
                match self.kernel.intersects(&s.mesh, &c.mesh) {
                    Ok(true) => pairs.push((sphere, cylinder)),
                    Ok(false) => {}
                    Err(err) => failures.push(format!(
                        "contact test of {} and {} failed: {}",
                        sphere, cylinder, err
                    )),
                }
            }
        }

        for message in failures {
            self.record(OPERATION, message);
        }
        pairs
    }

    /// Step 2: carves each sphere out of its cylinder.
    fn clear_sockets(
        &mut self,
        pairs: &[(PrimitiveId, PrimitiveId)],
    ) -> Vec<(PrimitiveId, PrimitiveId)> {
        let mut cleared = Vec::with_capacity(pairs.len());
        for &(sphere, cylinder) in pairs {
            let result = match (self.registry.get(sphere), self.registry.get(cylinder)) {
                (Some(s), Some(c)) => {
                    solid(self.kernel.boolean(BooleanOp::Difference, &c.mesh, &s.mesh))
                }
                _ => continue,
            };
            match result {
                Ok(mesh) => {
                    if let Some(c) = self.registry.get_mut(cylinder) {
                        c.replace_mesh(mesh);
                    }
                    cleared.push((sphere, cylinder));
                }
                Err(err) => self.record(
                    OPERATION,
                    format!("socket of {} in {} failed: {}", sphere, cylinder, err),
                ),
            }
        }
        cleared
    }

    /// Step 3: builds one pin per pair and returns how many were made.
    fn synthesize_pins(&mut self, pairs: &[(PrimitiveId, PrimitiveId)], rng: &mut StdRng) -> usize {
        let mut made = 0;
        for &(sphere, cylinder) in pairs {
            let (Some(s), Some(c)) = (self.registry.get(sphere), self.registry.get(cylinder)) else {
                continue;
            };
            let Some(bond_radius) = c.radius else {
                continue;
            };
            let hbond = c.is_hbond;
            let Some(geometry) =
                pin_geometry(s.position(), c.position(), bond_radius, hbond, &self.settings)
            else {
                self.record(
                    OPERATION,
                    format!("{} and {} share a center; no pin made", sphere, cylinder),
                );
                continue;
            };

            let pin_mesh = match self.build_pin(&geometry, rng) {
                Ok(mesh) => mesh,
                Err(err) => {
                    self.record(OPERATION, format!("pin for {} failed: {}", cylinder, err));
                    continue;
                }
            };

            let joined = match self.registry.get(cylinder) {
                Some(c) => solid(self.kernel.boolean(BooleanOp::Union, &c.mesh, &pin_mesh)),
                None => continue,
            };
            let joined = match joined {
                Ok(mesh) => mesh,
                Err(err) => {
                    self.record(
                        OPERATION,
                        format!("uniting pin into {} failed: {}", cylinder, err),
                    );
                    continue;
                }
            };
            if let Some(c) = self.registry.get_mut(cylinder) {
                c.replace_mesh(joined);
            }

            let mut pin = Primitive::new(
                format!("Pin.{:03}", made),
                PrimitiveKind::Pin,
                geometry.center,
                pin_mesh,
            )
            .with_radius(geometry.radius)
            .with_axis(geometry.start, geometry.end);
            pin.is_hbond = hbond;
            let pin_id = self.registry.insert(pin);

            if let Some(s) = self.registry.get_mut(sphere) {
                s.pin_refs.get_or_insert_with(Vec::new).push(pin_id);
            }
            made += 1;
        }
        made
    }

    fn build_pin(&mut self, geometry: &PinGeometry, rng: &mut StdRng) -> MolPrintResult<Mesh> {
        let pin = pin_solid(&self.kernel, geometry)?;

        if !self.settings.woodruff {
            return Ok(pin);
        }

        let faces = if geometry.cuboid { 4 } else { geometry.sides.max(3) };
        let (center, size, rotation) = woodruff_key(geometry, rng.gen_range(0..faces));
        let keyed = self
            .kernel
            .cuboid(size, center, rotation)
            .and_then(|key| self.kernel.boolean(BooleanOp::Union, &pin, &key));
        match solid(keyed) {
            Ok(mesh) => Ok(mesh),
            Err(err) => {
                self.record(OPERATION, format!("woodruff key skipped: {}", err));
                Ok(pin)
            }
        }
    }

    /// Step 4: merges each group into its first member.
    fn fuse_groups(&mut self) -> Vec<PrimitiveId> {
        let groups = std::mem::take(&mut self.groups);
        let mut fused = Vec::with_capacity(groups.len());

        for group in &groups {
            let live: Vec<PrimitiveId> = group
                .members
                .iter()
                .copied()
                .filter(|&id| self.registry.contains(id))
                .collect();
            let Some((&head, rest)) = live.split_first() else {
                continue;
            };

            let mut pins: Vec<PrimitiveId> = Vec::new();
            for &id in &live {
                if let Some(primitive) = self.registry.get(id) {
                    for &pin in primitive.pins() {
                        if !pins.contains(&pin) {
                            pins.push(pin);
                        }
                    }
                }
            }

            for &id in rest {
                if let Some(member) = self.remove_primitive(id) {
                    if let Some(part) = self.registry.get_mut(head) {
                        part.mesh.merge(&member.mesh);
                    }
                }
            }

            if let Some(part) = self.registry.get_mut(head) {
                part.kind = PrimitiveKind::CompositeSolid;
                part.pin_refs = Some(pins);
                part.recenter();
                fused.push(head);
            }
        }

        self.groups = groups;
        fused
    }

    /// Step 5: intersects each part with a cube around it. Returns the parts
    /// that came through.
    fn bulk_union(&mut self, parts: &[PrimitiveId]) -> Vec<PrimitiveId> {
        let mut unioned = Vec::with_capacity(parts.len());
        for &id in parts {
            let result = match self.registry.get(id) {
                Some(part) => self
                    .kernel
                    .cuboid(DVec3::splat(BULK_UNION_CUBE_SIZE), part.origin, DQuat::IDENTITY)
                    .and_then(|cube| self.kernel.boolean(BooleanOp::Intersection, &cube, &part.mesh)),
                None => continue,
            };
            match solid(result) {
                Ok(mesh) => {
                    if let Some(part) = self.registry.get_mut(id) {
                        part.replace_mesh(mesh);
                        part.radius = None;
                        part.axis = None;
                    }
                    unioned.push(id);
                }
                Err(err) => self.record(OPERATION, format!("bulk union of {} failed: {}", id, err)),
            }
        }
        unioned
    }

    /// Step 6: differences enlarged copies of each part's pins out of it.
    fn clear_pin_holes(&mut self, parts: &[PrimitiveId]) {
        let scale = DVec3::splat(self.settings.pin_scale);
        for &id in parts {
            let Some(part) = self.registry.get(id) else {
                continue;
            };
            if part.pins().is_empty() {
                continue;
            }

            let mut cutter = Mesh::new();
            for &pin_id in part.pins() {
                if let Some(pin) = self.registry.get(pin_id) {
                    let mut hole = pin.mesh.clone();
                    hole.scale_about(scale, pin.origin);
                    cutter.merge(&hole);
                }
            }
            if cutter.is_empty() {
                continue;
            }

            match solid(self.kernel.boolean(BooleanOp::Difference, &part.mesh, &cutter)) {
                Ok(mesh) => {
                    if let Some(part) = self.registry.get_mut(id) {
                        part.replace_mesh(mesh);
                    }
                }
                Err(err) => {
                    self.record(OPERATION, format!("pin clearance of {} failed: {}", id, err))
                }
            }
        }
    }

    /// Step 7: deletes everything that carries no pin list.
    fn remove_scaffolding(&mut self) -> usize {
        let scaffolding: Vec<PrimitiveId> = self
            .registry
            .iter()
            .filter(|(_, primitive)| primitive.pin_refs.is_none())
            .map(|(id, _)| id)
            .collect();
        for &id in &scaffolding {
            self.remove_primitive(id);
        }
        scaffolding.len()
    }
}
