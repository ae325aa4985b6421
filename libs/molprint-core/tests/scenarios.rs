use approx::assert_relative_eq;
use config::constants::FLOOR_ANGLE_TOLERANCE;
use glam::DVec3;
use molprint_core::clean::is_inside;
use molprint_core::orient::largest_facet;
use molprint_core::{GeometryKernel, MeshKernel, PrimitiveKind, Session, Settings};
use molprint_mesh::primitives::create_cube;

#[test]
fn sphere_inside_another_is_cleaned() {
    let mut session = Session::default();
    let big = session.import_sphere(None, DVec3::ZERO, 1.0).unwrap();
    let small = session.import_sphere(None, DVec3::new(0.2, 0.0, 0.0), 0.3).unwrap();

    let registry = session.registry();
    let inner = is_inside(
        session.kernel(),
        (big, registry.get(big).unwrap()),
        (small, registry.get(small).unwrap()),
    );
    assert_eq!(inner, Some(small));

    let report = session.clean().unwrap();
    assert_eq!(report.inside, vec![small]);
    assert_eq!(session.registry().ids(), vec![big]);
}

#[test]
fn near_coincident_cylinder_is_a_duplicate() {
    let mut session = Session::default();
    let first = session
        .import_cylinder(None, DVec3::ZERO, DVec3::X * 1.5, 0.3)
        .unwrap();
    let offset = DVec3::new(0.0, 0.00005, 0.0);
    let second = session
        .import_cylinder(None, offset, DVec3::X * 1.5 + offset, 0.3)
        .unwrap();

    let report = session.clean().unwrap();
    assert_eq!(report.duplicates, vec![second]);
    assert!(report.merged.is_empty());
    assert_eq!(session.registry().ids(), vec![first]);
}

#[test]
fn glycosidic_carbon_and_bond_are_selected() {
    let settings = Settings::default();
    let mut session = Session::new(settings.clone()).unwrap();

    // Neighbors on a triangle of side 6 around the carbon
    let r = 6.0 / 3f64.sqrt();
    let at = |degrees: f64| {
        let a = degrees.to_radians();
        DVec3::new(r * a.cos(), r * a.sin(), 0.0)
    };

    let carbon = session
        .import_sphere(Some("C1'"), DVec3::ZERO, settings.carbon_radius)
        .unwrap();
    let c2 = session
        .import_sphere(Some("C2'"), at(0.0), settings.carbon_radius)
        .unwrap();
    let n9 = session
        .import_sphere(Some("N9"), at(120.0), settings.nitrogen_radius)
        .unwrap();
    let o4 = session
        .import_sphere(Some("O4'"), at(240.0), settings.oxygen_radius)
        .unwrap();
    session.import_cylinder(None, DVec3::ZERO, at(0.0), 0.3).unwrap();
    let glycosidic = session.import_cylinder(None, DVec3::ZERO, at(120.0), 0.3).unwrap();
    session.import_cylinder(None, DVec3::ZERO, at(240.0), 0.3).unwrap();

    // The base continues past the nitrogen
    let c8 = at(120.0) * (1.0 + 1.5 / r);
    session
        .import_sphere(Some("C8"), c8, settings.carbon_radius)
        .unwrap();
    session.import_cylinder(None, at(120.0), c8, 0.3).unwrap();

    session.clean().unwrap();
    let selected = session.select_glycosidic().unwrap();

    assert_eq!(selected, vec![carbon, glycosidic]);
    assert!(session.selection().contains(&carbon));
    assert!(session.selection().contains(&glycosidic));
    for id in [c2, n9, o4] {
        assert!(!session.selection().contains(&id));
    }
}

#[test]
fn thin_bond_is_a_hydrogen_bond() {
    let mut session = Session::default();
    assert_eq!(session.settings().max_hbond, 0.25);

    let donor = session.import_sphere(None, DVec3::ZERO, 0.36).unwrap();
    let acceptor = session.import_sphere(None, DVec3::X * 3.0, 0.534).unwrap();
    let bond = session
        .import_cylinder(None, DVec3::ZERO, DVec3::X * 3.0, 0.2)
        .unwrap();
    session.clean().unwrap();
    assert_eq!(session.interactions().len(), 2);

    let hbonds = session.select_hbonds().unwrap();
    assert_eq!(hbonds, vec![bond]);
    assert!(session.primitive(bond).unwrap().is_hbond);
    for id in [donor, acceptor, bond] {
        assert!(session.selection().contains(&id));
    }
}

#[test]
fn cube_floors_on_first_face() {
    let kernel = MeshKernel;
    let mut session = Session::default();
    let mut cube = create_cube(DVec3::splat(2.0), true).unwrap();
    cube.translate(DVec3::new(5.0, 5.0, 5.0));
    let id = session.insert_raw("Cube", PrimitiveKind::CompositeSolid, cube.clone());

    let hull = kernel.convex_hull(&cube).unwrap();
    let facets = kernel.hull_facets(&hull, FLOOR_ANGLE_TOLERANCE);
    assert_eq!(facets.len(), 6);
    assert_eq!(largest_facet(&facets), Some(0));

    let rotation = session.resting_rotation(id).unwrap();
    let rotated = rotation * facets[0].normal;
    assert_relative_eq!(rotated.dot(DVec3::NEG_Z), 1.0, epsilon = 1e-9);

    let report = session.floor_all().unwrap();
    assert_eq!(report.floored, vec![id]);
    // Rotation pivots on the origin, which stays put
    let center = session.primitive(id).unwrap().mesh.centroid();
    assert_relative_eq!(center.x, 5.0, epsilon = 1e-9);
    assert_relative_eq!(center.z, 5.0, epsilon = 1e-9);
}
