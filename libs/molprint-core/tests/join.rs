use approx::assert_relative_eq;
use glam::DVec3;
use molprint_core::{
    GeometryKernel, MolPrintError, PinShape, PrimitiveId, PrimitiveKind, Session, Settings,
};
use molprint_mesh::{BooleanOp, Mesh, MeshError, MeshResult};

/// Kernel whose differences always fail.
struct NoDifference;

impl GeometryKernel for NoDifference {
    fn boolean(&self, op: BooleanOp, a: &Mesh, b: &Mesh) -> MeshResult<Mesh> {
        match op {
            BooleanOp::Difference => Err(MeshError::boolean_failed("difference disabled")),
            _ => molprint_mesh::boolean(op, a, b),
        }
    }
}

/// Kernel whose intersections always fail, so the bulk union step does.
struct NoIntersection;

impl GeometryKernel for NoIntersection {
    fn boolean(&self, op: BooleanOp, a: &Mesh, b: &Mesh) -> MeshResult<Mesh> {
        match op {
            BooleanOp::Intersection => Err(MeshError::boolean_failed("intersection disabled")),
            _ => molprint_mesh::boolean(op, a, b),
        }
    }
}

/// An atom with one bond, both selected so the contact between them is cut.
fn atom_and_bond<K: GeometryKernel>(session: &mut Session<K>) -> PrimitiveId {
    let atom = session.import_sphere(None, DVec3::ZERO, 0.6).unwrap();
    let bond = session
        .import_cylinder(None, DVec3::ZERO, DVec3::X * 1.5, 0.3)
        .unwrap();
    session.clean().unwrap();
    session.on_selection_changed([atom, bond]).unwrap();
    atom
}

#[test]
fn single_atom_passes_through_unchanged() {
    let mut session = Session::default();
    let atom = session
        .import_sphere(None, DVec3::new(1.0, 2.0, 3.0), 0.6)
        .unwrap();
    let volume = session.primitive(atom).unwrap().mesh.volume();
    session.clean().unwrap();
    session.on_selection_changed([atom]).unwrap();

    let report = session.pin_join().unwrap();
    assert_eq!(report.parts, vec![atom]);
    assert_eq!(report.pins, 0);
    assert_eq!(report.failures, 0);

    let part = session.primitive(atom).unwrap();
    assert_eq!(part.kind, PrimitiveKind::CompositeSolid);
    assert_relative_eq!(part.mesh.volume(), volume, epsilon = 1e-6);
    assert_relative_eq!(part.origin.x, 1.0, epsilon = 1e-6);
    assert_relative_eq!(part.origin.z, 3.0, epsilon = 1e-6);
}

#[test]
fn cut_contact_gets_a_pin() {
    let mut session = Session::default();
    atom_and_bond(&mut session);
    assert_eq!(session.groups().len(), 2);

    let report = session.pin_join().unwrap();
    assert_eq!(report.pairs, 1);
    assert_eq!(report.pins, 1);
    assert_eq!(report.parts.len(), 2);

    // The pin itself is scaffolding
    assert!(session
        .registry()
        .iter()
        .all(|(_, p)| p.kind == PrimitiveKind::CompositeSolid));
    assert!(session.flags().groups_joined);
    assert!(session.selection().is_empty());
    assert!(session.interactions().is_empty());
}

#[test]
fn cuboid_pins_with_keys_are_reproducible() {
    let settings = Settings {
        pin_shape: PinShape::Cuboid,
        woodruff: true,
        woodruff_seed: Some(3),
        ..Settings::default()
    };

    let mut volumes = Vec::new();
    for _ in 0..2 {
        let mut session = Session::new(settings.clone()).unwrap();
        atom_and_bond(&mut session);
        let report = session.pin_join().unwrap();
        assert_eq!(report.pins, 1);
        let atom = report.parts[0];
        volumes.push(session.primitive(atom).unwrap().mesh.volume());
    }
    assert_relative_eq!(volumes[0], volumes[1], epsilon = 1e-9);
}

#[test]
fn failed_booleans_are_recorded_not_fatal() {
    let mut session = Session::with_kernel(NoDifference, Settings::default());
    atom_and_bond(&mut session);

    let report = session.pin_join().unwrap();
    assert_eq!(report.pairs, 1);
    assert_eq!(report.pins, 0);
    assert_eq!(report.parts.len(), 2);
    assert_eq!(report.failures, 1);

    let diagnostics = session.take_diagnostics();
    assert_eq!(diagnostics[0].operation, "pin join");
    assert!(diagnostics[0].message.contains("socket"));
}

#[test]
fn join_needs_a_radius_on_selected_bonds() {
    let mut session = Session::default();
    let mesh = session
        .kernel()
        .cylinder(DVec3::ZERO, DVec3::X * 1.5, 0.3, 16)
        .unwrap();
    let raw = session.insert_raw("Cylinder", PrimitiveKind::Cylinder, mesh);
    session.import_sphere(None, DVec3::ZERO, 0.6).unwrap();
    session.clean().unwrap();
    session.on_selection_changed([raw]).unwrap();

    assert!(matches!(
        session.pin_join(),
        Err(MolPrintError::MissingAttribute { id, attribute: "radius" }) if id == raw
    ));
    assert!(!session.flags().groups_joined);
}

#[test]
fn pin_clearance_carves_the_sphere() {
    let mut session = Session::default();
    let atom = atom_and_bond(&mut session);
    let before = session.primitive(atom).unwrap().mesh.volume();

    let report = session.pin_join().unwrap();
    assert_eq!(report.failures, 0);
    assert!(report.parts.contains(&atom));

    let after = session.primitive(atom).unwrap().mesh.volume();
    assert!(after > 0.0);
    assert!(after < before, "sphere volume {} not below {}", after, before);
}

#[test]
fn failed_bulk_union_keeps_the_part() {
    let mut session = Session::with_kernel(NoIntersection, Settings::default());
    let atom = atom_and_bond(&mut session);

    let report = session.pin_join().unwrap();
    assert_eq!(report.pins, 1);
    assert_eq!(report.parts.len(), 2);
    assert!(report.failures >= 1);

    let part = session.primitive(atom).unwrap();
    assert_eq!(part.kind, PrimitiveKind::CompositeSolid);
    assert_eq!(part.pins().len(), 1);
    assert!(!part.mesh.is_empty());

    let diagnostics = session.take_diagnostics();
    assert!(diagnostics
        .iter()
        .any(|d| d.operation == "pin join" && d.message.contains("bulk union")));
}
