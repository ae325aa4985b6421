//! # Motif Selectors
//!
//! Heuristic pattern matches over the interaction set that select
//! chemically meaningful spots: hydrogen bonds to cut, phosphate and
//! glycosidic bonds to reinforce, amide bonds to pin.
//!
//! The matches are tolerance-based and depend on the order contacts were
//! recorded; they flag candidates for the user rather than prove chemistry.
//! Only the hydrogen-bond selector mutates anything (the `is_hbond` flag);
//! the others only extend the selection.

use crate::error::MolPrintResult;
use crate::interaction::{ContactGraph, Interaction};
use crate::kernel::GeometryKernel;
use crate::primitive::{PrimitiveId, Registry};
use crate::session::Session;
use crate::settings::Settings;
use config::constants::{
    round_to, AMIDE_CARBON_RADIUS, AMIDE_NITROGEN_RADIUS, AMIDE_OXYGEN_RADIUS,
    GLYCOSIDIC_MIN_MEAN_DISTANCE, PHOSPHATE_CONTACTS, PHOSPHATE_MIN_THIRD_CONTACTS,
    RADIUS_MATCH_TOLERANCE, RADIUS_ROUND_DECIMALS, TRIGONAL_CONTACTS,
};
use tracing::debug;

fn radius_matches(radius: f64, expected: f64) -> bool {
    (radius - expected).abs() < RADIUS_MATCH_TOLERANCE
}

fn rounded(radius: f64) -> f64 {
    round_to(radius, RADIUS_ROUND_DECIMALS)
}

/// Sorts three radii for order-free comparison.
fn sorted_triple(mut radii: [f64; 3]) -> [f64; 3] {
    radii.sort_by(f64::total_cmp);
    radii
}

fn triples_match(found: [f64; 3], expected: [f64; 3]) -> bool {
    sorted_triple(found)
        .iter()
        .zip(sorted_triple(expected).iter())
        .all(|(&a, &b)| radius_matches(a, b))
}

/// Fails with `MissingAttribute` if any interacting primitive lacks a radius.
fn check_radii(registry: &Registry, interactions: &[Interaction]) -> MolPrintResult<()> {
    for contact in interactions {
        registry.radius(contact.sphere)?;
        registry.radius(contact.cylinder)?;
    }
    Ok(())
}

/// Cylinders thinner than the hydrogen-bond threshold, with both ends.
///
/// Returns `(hbond cylinders, everything to select)`.
pub fn hbond_matches(
    registry: &Registry,
    interactions: &[Interaction],
    settings: &Settings,
) -> MolPrintResult<(Vec<PrimitiveId>, Vec<PrimitiveId>)> {
    check_radii(registry, interactions)?;

    let mut cylinders = Vec::new();
    let mut selected = Vec::new();
    for contact in interactions {
        if settings.is_hbond_radius(registry.radius(contact.cylinder)?) {
            if !cylinders.contains(&contact.cylinder) {
                cylinders.push(contact.cylinder);
            }
            selected.push(contact.sphere);
            selected.push(contact.cylinder);
        }
    }
    Ok((cylinders, selected))
}

/// Phosphorus atoms with four contacts, plus one ester bond each.
///
/// Walking outward over a covalent bond of the phosphorus, its second
/// neighbor's other bonds must reach an atom with more than two contacts;
/// the first bond that does is selected.
pub fn phosphate_matches(
    registry: &Registry,
    interactions: &[Interaction],
    settings: &Settings,
) -> MolPrintResult<Vec<PrimitiveId>> {
    check_radii(registry, interactions)?;
    let graph = ContactGraph::new(interactions);
    let mut selected = Vec::new();

    for phosphorus in graph.spheres() {
        if graph.contact_count(phosphorus) != PHOSPHATE_CONTACTS
            || !radius_matches(registry.radius(phosphorus)?, settings.phosphorus_radius)
        {
            continue;
        }
        selected.push(phosphorus);

        let bonds: Vec<PrimitiveId> = graph
            .cylinders_of(phosphorus)
            .iter()
            .copied()
            .filter(|&c| registry.get(c).is_some_and(|p| !p.is_hbond))
            .collect();

        'bonds: for &bond in &bonds {
            for &second in graph.spheres_of(bond).iter().filter(|&&s| s != phosphorus) {
                for &outer in graph.cylinders_of(second).iter().filter(|&&c| !bonds.contains(&c)) {
                    let third = graph.spheres_of(outer).iter().find(|&&s| s != second);
                    if third.is_some_and(|&t| graph.contact_count(t) > PHOSPHATE_MIN_THIRD_CONTACTS)
                    {
                        selected.push(bond);
                        break 'bonds;
                    }
                }
            }
        }
    }

    Ok(selected)
}

/// Second neighbors of a three-contact atom over the given bonds.
///
/// Entries follow interaction order. Returns `None` unless there are
/// exactly three.
fn trigonal_neighbors(
    interactions: &[Interaction],
    center: PrimitiveId,
    bonds: &[PrimitiveId],
) -> Option<[(PrimitiveId, PrimitiveId); 3]> {
    let neighbors: Vec<(PrimitiveId, PrimitiveId)> = interactions
        .iter()
        .filter(|c| c.sphere != center && bonds.contains(&c.cylinder))
        .map(|c| (c.sphere, c.cylinder))
        .collect();
    neighbors.try_into().ok()
}

/// Carbons bonded to a carbon, a nitrogen and an oxygen that sit far apart,
/// plus the bond toward the nitrogen.
///
/// The nitrogen must itself have more than one contact.
pub fn glycosidic_matches(
    registry: &Registry,
    interactions: &[Interaction],
    settings: &Settings,
) -> MolPrintResult<Vec<PrimitiveId>> {
    check_radii(registry, interactions)?;
    let graph = ContactGraph::new(interactions);
    let carbon = rounded(settings.carbon_radius);
    let nitrogen = rounded(settings.nitrogen_radius);
    let expected = [carbon, nitrogen, rounded(settings.oxygen_radius)];
    let mut selected = Vec::new();

    for center in graph.spheres() {
        if graph.contact_count(center) != TRIGONAL_CONTACTS
            || rounded(registry.radius(center)?) != carbon
        {
            continue;
        }

        let bonds: Vec<PrimitiveId> = graph
            .cylinders_of(center)
            .iter()
            .copied()
            .filter(|&c| registry.get(c).is_some_and(|p| !p.is_hbond))
            .collect();
        let Some(neighbors) = trigonal_neighbors(interactions, center, &bonds) else {
            continue;
        };

        let mut radii = [0.0; 3];
        let mut positions = [glam::DVec3::ZERO; 3];
        for (i, &(sphere, _)) in neighbors.iter().enumerate() {
            radii[i] = rounded(registry.radius(sphere)?);
            positions[i] = registry.require(sphere)?.position();
        }
        if !triples_match(radii, expected) {
            continue;
        }

        let mean = (positions[0].distance(positions[1])
            + positions[0].distance(positions[2])
            + positions[1].distance(positions[2]))
            / 3.0;
        if mean <= GLYCOSIDIC_MIN_MEAN_DISTANCE {
            continue;
        }

        let toward_nitrogen = neighbors
            .iter()
            .zip(radii.iter())
            .find(|&(_, &r)| radius_matches(r, nitrogen))
            .map(|(&pair, _)| pair);
        if let Some((n, bond)) = toward_nitrogen {
            if graph.contact_count(n) > 1 {
                debug!(%center, %bond, mean, "Glycosidic bond");
                selected.push(center);
                selected.push(bond);
            }
        }
    }

    Ok(selected)
}

/// Peptide-bond carbons, selecting the neighboring carbon and its bond.
///
/// Matches three-contact atoms of the amide carbon radius whose covalent
/// neighbors have the amide carbon, nitrogen and oxygen radii. A nitrogen
/// with a single contact marks an Asn/Gln side chain and is skipped.
pub fn amide_matches(
    registry: &Registry,
    interactions: &[Interaction],
    settings: &Settings,
) -> MolPrintResult<Vec<PrimitiveId>> {
    check_radii(registry, interactions)?;
    let graph = ContactGraph::new(interactions);
    let expected = [AMIDE_CARBON_RADIUS, AMIDE_NITROGEN_RADIUS, AMIDE_OXYGEN_RADIUS];
    let mut selected = Vec::new();

    for center in graph.spheres() {
        if graph.contact_count(center) != TRIGONAL_CONTACTS
            || !radius_matches(registry.radius(center)?, AMIDE_CARBON_RADIUS)
        {
            continue;
        }

        let mut bonds = Vec::new();
        for &c in graph.cylinders_of(center) {
            if registry.radius(c)? > settings.max_hbond {
                bonds.push(c);
            }
        }
        let Some(neighbors) = trigonal_neighbors(interactions, center, &bonds) else {
            continue;
        };

        let mut radii = [0.0; 3];
        for (i, &(sphere, _)) in neighbors.iter().enumerate() {
            radii[i] = registry.radius(sphere)?;
        }
        if !triples_match(radii, expected) {
            continue;
        }

        let find = |target: f64| {
            neighbors
                .iter()
                .zip(radii.iter())
                .find(|&(_, &r)| radius_matches(r, target))
                .map(|(&pair, _)| pair)
        };
        let backbone = find(AMIDE_NITROGEN_RADIUS).is_some_and(|(n, _)| graph.contact_count(n) > 1);
        if let (true, Some((carbon, bond))) = (backbone, find(AMIDE_CARBON_RADIUS)) {
            selected.push(carbon);
            selected.push(bond);
        }
    }

    Ok(selected)
}

impl<K: GeometryKernel> Session<K> {
    /// Flags hydrogen bonds and selects them with both ends.
    ///
    /// Every contacted cylinder's flag is recomputed from its radius.
    /// Returns the hydrogen-bond cylinders.
    pub fn select_hbonds(&mut self) -> MolPrintResult<Vec<PrimitiveId>> {
        self.require_interactions("select hydrogen bonds")?;
        let (hbonds, selected) = hbond_matches(&self.registry, &self.interactions, &self.settings)?;

        let contacted: Vec<PrimitiveId> = self.interactions.iter().map(|c| c.cylinder).collect();
        for id in contacted {
            if let Some(cylinder) = self.registry.get_mut(id) {
                cylinder.is_hbond = hbonds.contains(&id);
            }
        }

        self.extend_selection(selected)?;
        Ok(hbonds)
    }

    /// Selects phosphorus atoms and one ester bond of each.
    pub fn select_phosphates(&mut self) -> MolPrintResult<Vec<PrimitiveId>> {
        self.require_interactions("select phosphates")?;
        let selected = phosphate_matches(&self.registry, &self.interactions, &self.settings)?;
        self.extend_selection(selected.clone())?;
        Ok(selected)
    }

    /// Selects glycosidic carbons and their bond toward the base.
    pub fn select_glycosidic(&mut self) -> MolPrintResult<Vec<PrimitiveId>> {
        self.require_interactions("select glycosidic bonds")?;
        let selected = glycosidic_matches(&self.registry, &self.interactions, &self.settings)?;
        self.extend_selection(selected.clone())?;
        Ok(selected)
    }

    /// Selects backbone amide carbons and their bonds.
    pub fn select_amides(&mut self) -> MolPrintResult<Vec<PrimitiveId>> {
        self.require_interactions("select amides")?;
        let selected = amide_matches(&self.registry, &self.interactions, &self.settings)?;
        self.extend_selection(selected.clone())?;
        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MolPrintError;
    use crate::primitive::{Primitive, PrimitiveKind};
    use glam::DVec3;
    use molprint_mesh::Mesh;

    /// Registry of attribute-only primitives; meshes are not consulted.
    struct Fixture {
        registry: Registry,
        interactions: Vec<Interaction>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                registry: Registry::new(),
                interactions: Vec::new(),
            }
        }

        fn atom(&mut self, radius: f64, position: DVec3) -> PrimitiveId {
            let primitive = Primitive::new("atom", PrimitiveKind::Sphere, position, Mesh::new())
                .with_radius(radius);
            self.registry.insert(primitive)
        }

        fn bond(&mut self, radius: f64, a: PrimitiveId, b: PrimitiveId) -> PrimitiveId {
            let pa = self.registry.get(a).unwrap().position();
            let pb = self.registry.get(b).unwrap().position();
            let primitive =
                Primitive::new("bond", PrimitiveKind::Cylinder, (pa + pb) / 2.0, Mesh::new())
                    .with_radius(radius)
                    .with_axis(pa, pb);
            let id = self.registry.insert(primitive);
            self.interactions.push(Interaction::new(a, id));
            self.interactions.push(Interaction::new(b, id));
            id
        }
    }

    #[test]
    fn test_hbond_selector() {
        let settings = Settings::default();
        let mut f = Fixture::new();
        let a = f.atom(0.534, DVec3::ZERO);
        let b = f.atom(0.36, DVec3::X * 2.0);
        let c = f.atom(0.6, DVec3::X * -2.0);
        let thin = f.bond(0.2, a, b);
        let thick = f.bond(0.3, a, c);

        let (hbonds, selected) = hbond_matches(&f.registry, &f.interactions, &settings).unwrap();
        assert_eq!(hbonds, vec![thin]);
        assert!(selected.contains(&a) && selected.contains(&b) && selected.contains(&thin));
        assert!(!selected.contains(&thick) && !selected.contains(&c));
    }

    #[test]
    fn test_missing_radius_refuses() {
        let settings = Settings::default();
        let mut f = Fixture::new();
        let a = f.atom(0.6, DVec3::ZERO);
        let raw = f.registry.insert(Primitive::new(
            "raw",
            PrimitiveKind::Cylinder,
            DVec3::X,
            Mesh::new(),
        ));
        f.interactions.push(Interaction::new(a, raw));

        assert!(matches!(
            hbond_matches(&f.registry, &f.interactions, &settings),
            Err(MolPrintError::MissingAttribute { id, .. }) if id == raw
        ));
    }

    #[test]
    fn test_phosphate_selector() {
        let settings = Settings::default();
        let mut f = Fixture::new();
        let p = f.atom(settings.phosphorus_radius, DVec3::ZERO);
        let o1 = f.atom(0.534, DVec3::X);
        let o2 = f.atom(0.534, DVec3::NEG_X);
        let o3 = f.atom(0.534, DVec3::Y);
        let o4 = f.atom(0.534, DVec3::NEG_Y);
        let ester = f.bond(0.3, p, o1);
        f.bond(0.3, p, o2);
        f.bond(0.3, p, o3);
        f.bond(0.3, p, o4);

        // o1 - C5', which carries three contacts
        let c5 = f.atom(0.6, DVec3::X * 2.0);
        f.bond(0.3, o1, c5);
        let h1 = f.atom(0.36, DVec3::new(2.0, 1.0, 0.0));
        let h2 = f.atom(0.36, DVec3::new(2.0, -1.0, 0.0));
        f.bond(0.3, c5, h1);
        f.bond(0.3, c5, h2);

        let selected = phosphate_matches(&f.registry, &f.interactions, &settings).unwrap();
        assert_eq!(selected, vec![p, ester]);
    }

    #[test]
    fn test_phosphate_needs_four_contacts() {
        let settings = Settings::default();
        let mut f = Fixture::new();
        let p = f.atom(settings.phosphorus_radius, DVec3::ZERO);
        let o = f.atom(0.534, DVec3::X);
        f.bond(0.3, p, o);

        assert!(phosphate_matches(&f.registry, &f.interactions, &settings)
            .unwrap()
            .is_empty());
    }

    /// Carbon at the origin bonded to C, N and O on a triangle of side `side`.
    fn glycosidic_fixture(settings: &Settings, side: f64) -> (Fixture, PrimitiveId, PrimitiveId) {
        let mut f = Fixture::new();
        let r = side / 3f64.sqrt();
        let at = |angle: f64| DVec3::new(r * angle.cos(), r * angle.sin(), 0.0);
        let third = std::f64::consts::TAU / 3.0;

        let center = f.atom(settings.carbon_radius, DVec3::ZERO);
        let c = f.atom(settings.carbon_radius, at(0.0));
        let n = f.atom(settings.nitrogen_radius, at(third));
        let o = f.atom(settings.oxygen_radius, at(2.0 * third));
        f.bond(0.3, center, c);
        let glycosidic = f.bond(0.3, center, n);
        f.bond(0.3, center, o);

        let ring = f.atom(settings.carbon_radius, at(third) * 1.5);
        f.bond(0.3, n, ring);
        (f, center, glycosidic)
    }

    #[test]
    fn test_glycosidic_selector() {
        let settings = Settings::default();
        let (f, center, bond) = glycosidic_fixture(&settings, 6.0);
        let selected = glycosidic_matches(&f.registry, &f.interactions, &settings).unwrap();
        assert_eq!(selected, vec![center, bond]);
    }

    #[test]
    fn test_glycosidic_uses_true_mean_distance() {
        // Mean pairwise distance 5.0 is below the threshold even though
        // d1 + d2 + d3 / 3 would exceed it
        let settings = Settings::default();
        let (f, _, _) = glycosidic_fixture(&settings, 5.0);
        assert!(glycosidic_matches(&f.registry, &f.interactions, &settings)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_amide_selector_skips_side_chains() {
        let settings = Settings::default();
        let mut f = Fixture::new();
        let carbonyl = f.atom(AMIDE_CARBON_RADIUS, DVec3::ZERO);
        let alpha = f.atom(AMIDE_CARBON_RADIUS, DVec3::X);
        let nitrogen = f.atom(AMIDE_NITROGEN_RADIUS, DVec3::Y);
        let oxygen = f.atom(AMIDE_OXYGEN_RADIUS, DVec3::NEG_Y);
        let alpha_bond = f.bond(0.3, carbonyl, alpha);
        f.bond(0.3, carbonyl, nitrogen);
        f.bond(0.3, carbonyl, oxygen);

        // A terminal nitrogen is a side-chain amide
        assert!(amide_matches(&f.registry, &f.interactions, &settings)
            .unwrap()
            .is_empty());

        let next_alpha = f.atom(AMIDE_CARBON_RADIUS, DVec3::new(0.0, 2.0, 0.0));
        f.bond(0.3, nitrogen, next_alpha);
        let selected = amide_matches(&f.registry, &f.interactions, &settings).unwrap();
        assert_eq!(selected, vec![alpha, alpha_bond]);
    }
}
