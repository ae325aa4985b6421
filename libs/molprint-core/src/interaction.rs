//! # Interaction Index
//!
//! Records which atoms touch which bonds.
//!
//! Every unordered sphere/cylinder pair whose centers are closer than
//! [`INTERACTION_CUTOFF`] is tested with the kernel's surface intersection.
//! Touching pairs are stored sphere first. Sphere-sphere and
//! cylinder-cylinder pairs are never recorded.

use crate::error::{Diagnostic, MolPrintError, MolPrintResult};
use crate::kernel::GeometryKernel;
use crate::primitive::{PrimitiveId, PrimitiveKind, Registry};
use crate::session::Session;
use config::constants::INTERACTION_CUTOFF;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info};

/// A contact between an atom and a bond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Interaction {
    pub sphere: PrimitiveId,
    pub cylinder: PrimitiveId,
}

impl Interaction {
    pub fn new(sphere: PrimitiveId, cylinder: PrimitiveId) -> Self {
        Self { sphere, cylinder }
    }

    /// Returns true if `id` is either end of the contact.
    pub fn involves(&self, id: PrimitiveId) -> bool {
        self.sphere == id || self.cylinder == id
    }
}

/// Adjacency view over an interaction set.
///
/// Neighbor lists keep the order contacts appear in the interaction set.
#[derive(Debug, Clone, Default)]
pub struct ContactGraph {
    cylinders_of: BTreeMap<PrimitiveId, Vec<PrimitiveId>>,
    spheres_of: BTreeMap<PrimitiveId, Vec<PrimitiveId>>,
}

impl ContactGraph {
    pub fn new(interactions: &[Interaction]) -> Self {
        let mut graph = Self::default();
        for contact in interactions {
            let cylinders = graph.cylinders_of.entry(contact.sphere).or_default();
            if !cylinders.contains(&contact.cylinder) {
                cylinders.push(contact.cylinder);
            }
            let spheres = graph.spheres_of.entry(contact.cylinder).or_default();
            if !spheres.contains(&contact.sphere) {
                spheres.push(contact.sphere);
            }
        }
        graph
    }

    /// Cylinders touching a sphere.
    pub fn cylinders_of(&self, sphere: PrimitiveId) -> &[PrimitiveId] {
        self.cylinders_of.get(&sphere).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Spheres touching a cylinder.
    pub fn spheres_of(&self, cylinder: PrimitiveId) -> &[PrimitiveId] {
        self.spheres_of.get(&cylinder).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every primitive touching `id`, whichever side it is on.
    pub fn neighbors(&self, id: PrimitiveId) -> &[PrimitiveId] {
        match self.cylinders_of.get(&id) {
            Some(cylinders) => cylinders.as_slice(),
            None => self.spheres_of(id),
        }
    }

    /// Number of cylinders touching a sphere.
    pub fn contact_count(&self, sphere: PrimitiveId) -> usize {
        self.cylinders_of(sphere).len()
    }

    /// Spheres with at least one contact, in ascending id order.
    pub fn spheres(&self) -> impl Iterator<Item = PrimitiveId> + '_ {
        self.cylinders_of.keys().copied()
    }
}

/// Orders a pair as (sphere, cylinder), or `None` for any other combination.
fn sphere_first(
    a: (PrimitiveId, PrimitiveKind),
    b: (PrimitiveId, PrimitiveKind),
) -> Option<Interaction> {
    match (a.1, b.1) {
        (PrimitiveKind::Sphere, PrimitiveKind::Cylinder) => Some(Interaction::new(a.0, b.0)),
        (PrimitiveKind::Cylinder, PrimitiveKind::Sphere) => Some(Interaction::new(b.0, a.0)),
        _ => None,
    }
}

/// Finds every touching sphere/cylinder pair in the registry.
///
/// Pairs are visited in ascending id order, so the result is deterministic.
/// A kernel failure on a pair counts as no contact and is reported in
/// `diagnostics`.
pub fn find_interactions<K: GeometryKernel>(
    kernel: &K,
    registry: &Registry,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<Interaction> {
    let primitives: Vec<_> = registry.iter().collect();
    let mut interactions = Vec::new();
    let mut tested = 0usize;

    for (i, &(id_a, a)) in primitives.iter().enumerate() {
        for &(id_b, b) in &primitives[i + 1..] {
            let Some(candidate) = sphere_first((id_a, a.kind), (id_b, b.kind)) else {
                continue;
            };
            if a.distance_to(b) >= INTERACTION_CUTOFF {
                continue;
            }

            tested += 1;
            match kernel.intersects(&a.mesh, &b.mesh) {
                Ok(true) => interactions.push(candidate),
                Ok(false) => {}
                Err(err) => diagnostics.push(Diagnostic::new(
                    "build interactions",
                    format!("{} and {} treated as apart: {}", id_a, id_b, err),
                )),
            }
        }
    }

    debug!(
        primitives = primitives.len(),
        tested,
        found = interactions.len(),
        "Interaction search finished"
    );
    interactions
}

impl<K: GeometryKernel> Session<K> {
    /// Rebuilds the interaction set from the whole registry.
    ///
    /// Every primitive's pin list is reset to empty and its hydrogen-bond
    /// flag cleared, whether or not it touches anything. Returns the number
    /// of interactions found.
    pub fn build_interactions(&mut self) -> MolPrintResult<usize> {
        if !self.flags.cleaned {
            return Err(MolPrintError::precondition(
                "build interactions",
                "the model has not been cleaned",
            ));
        }
        Ok(self.rebuild_interactions())
    }

    pub(crate) fn rebuild_interactions(&mut self) -> usize {
        let start = Instant::now();

        for (_, primitive) in self.registry.iter_mut() {
            primitive.pin_refs = Some(Vec::new());
            primitive.is_hbond = false;
        }

        let mut diagnostics = Vec::new();
        let interactions = find_interactions(&self.kernel, &self.registry, &mut diagnostics);
        for diagnostic in diagnostics {
            self.record(diagnostic.operation, diagnostic.message);
        }

        self.interactions = interactions;
        self.groups.clear();
        self.flags.interactions_computed = true;
        self.observed_selection = self.selection.clone();

        info!(
            interactions = self.interactions.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Built interaction set"
        );
        self.interactions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::MeshKernel;
    use crate::primitive::Primitive;
    use glam::DVec3;
    use molprint_mesh::{Mesh, MeshError, MeshResult};

    fn registry_with(items: &[(PrimitiveKind, DVec3, DVec3)]) -> (Registry, Vec<PrimitiveId>) {
        let kernel = MeshKernel;
        let mut registry = Registry::new();
        let mut ids = Vec::new();
        for &(kind, a, b) in items {
            let primitive = match kind {
                PrimitiveKind::Sphere => {
                    let mesh = kernel.sphere(a, 0.6, 16).unwrap();
                    Primitive::new("atom", kind, a, mesh).with_radius(0.6)
                }
                _ => {
                    let mesh = kernel.cylinder(a, b, 0.2, 16).unwrap();
                    Primitive::new("bond", kind, (a + b) / 2.0, mesh)
                        .with_radius(0.2)
                        .with_axis(a, b)
                }
            };
            ids.push(registry.insert(primitive));
        }
        (registry, ids)
    }

    #[test]
    fn test_contacts_are_sphere_first() {
        let (registry, ids) = registry_with(&[
            (PrimitiveKind::Cylinder, DVec3::ZERO, DVec3::X * 1.5),
            (PrimitiveKind::Sphere, DVec3::ZERO, DVec3::ZERO),
            (PrimitiveKind::Sphere, DVec3::X * 1.5, DVec3::ZERO),
        ]);
        let mut diagnostics = Vec::new();
        let found = find_interactions(&MeshKernel, &registry, &mut diagnostics);

        assert_eq!(
            found,
            vec![
                Interaction::new(ids[1], ids[0]),
                Interaction::new(ids[2], ids[0]),
            ]
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_same_kind_pairs_never_recorded() {
        let (registry, _) = registry_with(&[
            (PrimitiveKind::Sphere, DVec3::ZERO, DVec3::ZERO),
            (PrimitiveKind::Sphere, DVec3::X * 0.5, DVec3::ZERO),
            (PrimitiveKind::Cylinder, DVec3::Y, DVec3::new(1.0, 1.0, 0.0)),
            (PrimitiveKind::Cylinder, DVec3::new(0.5, 0.8, 0.0), DVec3::new(0.5, 1.6, 0.0)),
        ]);
        let found = find_interactions(&MeshKernel, &registry, &mut Vec::new());
        for contact in &found {
            assert_eq!(registry.kind(contact.sphere), Some(PrimitiveKind::Sphere));
            assert_eq!(registry.kind(contact.cylinder), Some(PrimitiveKind::Cylinder));
        }
    }

    #[test]
    fn test_distant_pairs_skipped() {
        let (registry, _) = registry_with(&[
            (PrimitiveKind::Sphere, DVec3::ZERO, DVec3::ZERO),
            (PrimitiveKind::Cylinder, DVec3::X * 4.0, DVec3::X * 5.0),
        ]);
        assert!(find_interactions(&MeshKernel, &registry, &mut Vec::new()).is_empty());
    }

    struct BrokenKernel;

    impl GeometryKernel for BrokenKernel {
        fn intersects(&self, _a: &Mesh, _b: &Mesh) -> MeshResult<bool> {
            Err(MeshError::degenerate("coincident faces"))
        }
    }

    #[test]
    fn test_kernel_failure_is_no_contact() {
        let (registry, _) = registry_with(&[
            (PrimitiveKind::Sphere, DVec3::ZERO, DVec3::ZERO),
            (PrimitiveKind::Cylinder, DVec3::ZERO, DVec3::X * 1.5),
        ]);
        let mut diagnostics = Vec::new();
        let found = find_interactions(&BrokenKernel, &registry, &mut diagnostics);

        assert!(found.is_empty());
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("coincident faces"));
    }

    #[test]
    fn test_contact_graph_views() {
        let s = PrimitiveId(0);
        let c1 = PrimitiveId(1);
        let c2 = PrimitiveId(2);
        let t = PrimitiveId(3);
        let graph = ContactGraph::new(&[
            Interaction::new(s, c1),
            Interaction::new(s, c2),
            Interaction::new(t, c1),
            Interaction::new(s, c1),
        ]);

        assert_eq!(graph.cylinders_of(s), &[c1, c2]);
        assert_eq!(graph.spheres_of(c1), &[s, t]);
        assert_eq!(graph.neighbors(c1), &[s, t]);
        assert_eq!(graph.neighbors(s), &[c1, c2]);
        assert_eq!(graph.contact_count(s), 2);
        assert_eq!(graph.contact_count(c2), 0);
        assert_eq!(graph.spheres().collect::<Vec<_>>(), vec![s, t]);
    }

    #[test]
    fn test_build_requires_clean() {
        let mut session = Session::default();
        session.import_sphere(None, DVec3::ZERO, 0.6).unwrap();
        assert!(session.build_interactions().is_err());
    }

    #[test]
    fn test_build_initializes_attributes() {
        let mut session = Session::default();
        let lone = session.import_sphere(None, DVec3::ZERO, 0.6).unwrap();
        session.clean().unwrap();

        let primitive = session.primitive(lone).unwrap();
        assert_eq!(primitive.pin_refs, Some(Vec::new()));
        assert!(!primitive.is_hbond);
        assert!(session.flags().interactions_computed);
    }
}
