use glam::DVec3;
use molprint_core::{MolPrintError, PipelineStage, PrimitiveKind, Session};
use molprint_mesh::primitives::create_cube;
use molprint_mesh::Mesh;

fn is_precondition<T: std::fmt::Debug>(result: Result<T, MolPrintError>) -> bool {
    matches!(result, Err(MolPrintError::PreconditionNotMet { .. }))
}

#[test]
fn stages_refuse_to_run_early() {
    let mut session = Session::default();
    let atom = session.import_sphere(None, DVec3::ZERO, 0.6).unwrap();
    session.on_selection_changed([atom]).unwrap();

    assert!(is_precondition(session.build_interactions()));
    assert!(is_precondition(session.pin_join()));
    assert!(is_precondition(session.select_hbonds()));
    assert!(is_precondition(session.select_phosphates()));
    assert!(is_precondition(session.select_glycosidic()));
    assert!(is_precondition(session.select_amides()));
    assert!(is_precondition(session.add_strut()));
    assert!(is_precondition(session.scale_bonds()));
    assert!(is_precondition(session.update_groups()));
    assert!(is_precondition(session.cpk_split()));
    assert!(is_precondition(session.export()));

    // Nothing was touched
    assert_eq!(session.stage(), PipelineStage::Imported);
    assert!(session.diagnostics().is_empty());
}

#[test]
fn refusal_message_names_the_operation() {
    let mut session = Session::default();
    let err = session.export().unwrap_err();
    assert_eq!(err.to_string(), "Cannot export: the model has not been joined");
}

#[test]
fn full_pipeline_walks_every_stage() {
    let mut session = Session::default();
    let atom = session.import_sphere(None, DVec3::ZERO, 0.6).unwrap();
    let bond = session
        .import_cylinder(None, DVec3::ZERO, DVec3::X * 1.5, 0.3)
        .unwrap();
    assert_eq!(session.stage(), PipelineStage::Imported);

    session.clean().unwrap();
    assert_eq!(session.stage(), PipelineStage::InteractionsBuilt);

    session.on_selection_changed([atom, bond]).unwrap();
    assert_eq!(session.stage(), PipelineStage::Grouped);

    session.pin_join().unwrap();
    assert_eq!(session.stage(), PipelineStage::Joined);
    assert!(is_precondition(session.clean()));

    session.floor_all().unwrap();
    let parts = session.export().unwrap();
    assert_eq!(parts.len(), 2);
    assert_eq!(session.stage(), PipelineStage::Exported);
}

#[test]
fn empty_join_selection_is_refused() {
    let mut session = Session::default();
    session.import_sphere(None, DVec3::ZERO, 0.6).unwrap();
    session.clean().unwrap();
    assert!(is_precondition(session.pin_join()));
}

#[test]
fn floor_selected_needs_one_object() {
    let mut session = Session::default();
    assert!(matches!(
        session.begin_floor_selected(),
        Err(MolPrintError::AmbiguousSelection { .. })
    ));
    assert!(is_precondition(session.apply_floor_selected(&[0])));
}

#[test]
fn floor_selected_preview_round_trip() {
    let mut session = Session::default();
    let cube = create_cube(DVec3::new(4.0, 2.0, 1.0), true).unwrap();
    let id = session.insert_raw("Slab", PrimitiveKind::CompositeSolid, cube);
    session.on_selection_changed([id]).unwrap();

    let preview = session.begin_floor_selected().unwrap();
    assert_eq!(preview.target, id);
    assert_eq!(preview.facets.len(), 6);
    let up = preview
        .facets
        .iter()
        .position(|f| f.normal.z > 0.99)
        .unwrap();

    // Only one preview at a time
    assert!(is_precondition(session.begin_floor_selected()));
    assert!(matches!(
        session.apply_floor_selected(&[]),
        Err(MolPrintError::AmbiguousSelection { .. })
    ));
    assert!(matches!(
        session.apply_floor_selected(&[99]),
        Err(MolPrintError::AmbiguousSelection { .. })
    ));

    let rotation = session.apply_floor_selected(&[up]).unwrap();
    assert!(((rotation * DVec3::Z) - DVec3::NEG_Z).length() < 1e-9);
    assert!(session.floor_preview().is_none());
    assert!(!session.cancel_floor_selected());
}

#[test]
fn floor_all_skips_flat_parts_and_floors_the_rest() {
    let mut session = Session::default();

    let mut sheet = Mesh::new();
    let corners = [
        DVec3::new(0.0, 0.0, 3.0),
        DVec3::new(2.0, 0.0, 3.0),
        DVec3::new(2.0, 2.0, 3.0),
        DVec3::new(0.0, 2.0, 3.0),
    ]
    .map(|corner| sheet.add_vertex(corner));
    sheet.add_triangle(corners[0], corners[1], corners[2]);
    sheet.add_triangle(corners[0], corners[2], corners[3]);
    let flat = session.insert_raw("Sheet", PrimitiveKind::CompositeSolid, sheet.clone());

    // Standing on its narrow side
    let slab = create_cube(DVec3::new(1.0, 4.0, 2.0), true).unwrap();
    let upright = session.insert_raw("Slab", PrimitiveKind::CompositeSolid, slab);

    let report = session.floor_all().unwrap();
    assert_eq!(report.skipped, vec![flat]);
    assert_eq!(report.floored, vec![upright]);

    let extents = session.primitive(upright).unwrap().mesh.extents();
    assert!((extents.z - 1.0).abs() < 1e-9, "slab not laid flat: {:?}", extents);
    assert_eq!(session.primitive(flat).unwrap().mesh.vertices(), sheet.vertices());

    let diagnostics = session.take_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].operation, "floor");
}
