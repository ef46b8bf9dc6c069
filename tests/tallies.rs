// standard library
use std::f64::consts::PI;
use std::path::PathBuf;

// crate modules
use meshtally::mesh::{CylindricalMesh, Mesh, RectilinearMesh, RegularMesh, SphericalMesh};
use meshtally::tally::*;
use meshtally::{voxels_to_vtk, ErrorKind, Registry};

// external crates
use rstest::{fixture, rstest};
use vtkio::model::{DataSet, Piece};

/// Fresh path in the system temp directory, removed if already there
fn scratch(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("meshtally_{}_{name}", std::process::id()));
    let _ = std::fs::remove_file(&path);
    path
}

fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[fixture]
fn registry() -> Registry {
    Registry::new()
}

fn regular(registry: &Registry) -> Mesh {
    RegularMesh::new(registry, [-10.0; 3], [10.0; 3], [5, 5, 5])
        .unwrap()
        .into()
}

fn rectilinear(registry: &Registry) -> Mesh {
    RectilinearMesh::new(
        registry,
        vec![0.0, 1.0, 5.0, 10.0],
        vec![-10.0, -2.5, 0.0, 2.5, 10.0],
        vec![-100.0, 0.0, 100.0],
    )
    .unwrap()
    .into()
}

fn cylindrical(registry: &Registry) -> Mesh {
    CylindricalMesh::new(
        registry,
        vec![0.0, 1.0, 2.0, 5.0],
        vec![0.0, 0.5 * PI, PI, 1.5 * PI, 2.0 * PI],
        vec![-3.0, 0.0, 3.0],
    )
    .unwrap()
    .into()
}

fn spherical(registry: &Registry) -> Mesh {
    SphericalMesh::new(registry, vec![0.0, 1.0, 2.0], vec![0.0, PI], vec![0.0, 2.0 * PI])
        .unwrap()
        .into()
}

/// Tally using every kind of attribute
fn full_tally(registry: &Registry) -> Tally {
    let mut tally = Tally::new(registry);
    tally.add_filter(MeshFilter::new(regular(registry)));
    tally.add_filter(EnergyFilter::new(vec![0.0, 1e6, 2e7]).unwrap());
    tally
        .set_nuclides(names(&["U235", "I135", "Li6"]))
        .unwrap();
    tally
        .set_scores(names(&["total", "fission", "heating"]))
        .unwrap();
    tally.set_derivative(
        TallyDerivative::new(DerivativeVariable::NuclideDensity, 1, Some("Li6".into())).unwrap(),
    );

    let mut trigger = Trigger::new(TriggerType::RelErr, 0.025).unwrap();
    trigger.set_scores(names(&["total", "fission"]));
    tally.add_trigger(trigger).unwrap();
    tally
}

#[rstest]
fn round_trip(registry: Registry) {
    let path = scratch("round_trip.xml");
    let original = full_tally(&registry);
    let tallies = Tallies::from_vec(vec![original.clone()]).unwrap();
    tallies.export_to_xml(Some(&path)).unwrap();

    let reloaded = Tallies::from_xml(Some(&path), &Registry::new()).unwrap();
    assert_eq!(reloaded.len(), 1);
    let tally = &reloaded[0];

    assert_eq!(tally.id(), original.id());
    assert_eq!(tally.nuclides(), original.nuclides());
    assert_eq!(tally.scores(), original.scores());
    assert_eq!(tally.derivative(), original.derivative());
    assert_eq!(tally.triggers(), original.triggers());

    let types: Vec<&str> = tally.filters().iter().map(|f| f.type_name()).collect();
    assert_eq!(types, vec!["mesh", "energy"]);

    let Mesh::Regular(mesh) = tally.find_mesh_filter().unwrap().as_ref() else {
        panic!("expected a regular mesh");
    };
    for (a, b) in mesh.lower_left().iter().zip([-10.0; 3]) {
        assert!((a - b).abs() < 1e-12);
    }
    for (a, b) in mesh.upper_right().iter().zip([10.0; 3]) {
        assert!((a - b).abs() < 1e-12);
    }
    assert_eq!(mesh.dimension(), [5, 5, 5]);

    std::fs::remove_file(path).unwrap();
}

#[rstest]
fn re_export_is_byte_identical(registry: Registry) {
    let first = scratch("first.xml");
    let second = scratch("second.xml");

    let mut other = Tally::new(&registry);
    other.set_name("cylinder heating");
    other.set_estimator(Estimator::Tracklength);
    other.add_filter(MeshFilter::new(cylindrical(&registry)));
    other.add_filter(CellFilter::new(vec![10, 11]).unwrap());
    other.set_scores(names(&["heating"])).unwrap();

    let tallies = Tallies::from_vec(vec![full_tally(&registry), other]).unwrap();
    tallies.export_to_xml(Some(&first)).unwrap();

    let reloaded = Tallies::from_xml(Some(&first), &Registry::new()).unwrap();
    assert_eq!(reloaded, tallies);
    reloaded.export_to_xml(Some(&second)).unwrap();

    let a = std::fs::read(&first).unwrap();
    let b = std::fs::read(&second).unwrap();
    assert_eq!(a, b);

    std::fs::remove_file(first).unwrap();
    std::fs::remove_file(second).unwrap();
}

#[rstest]
fn document_layout(registry: Registry) {
    let tallies = Tallies::from_vec(vec![full_tally(&registry)]).unwrap();
    let text = tallies.to_xml_string().unwrap();

    let expected = "\
<?xml version='1.0' encoding='utf-8'?>
<tallies>
  <mesh id=\"1\" type=\"regular\">
    <dimension>5 5 5</dimension>
    <lower_left>-10 -10 -10</lower_left>
    <upper_right>10 10 10</upper_right>
  </mesh>
  <tally id=\"1\">
    <filters>
      <filter type=\"mesh\" bins=\"1\"/>
      <filter type=\"energy\" bins=\"0 1000000 20000000\"/>
    </filters>
    <nuclides>U235 I135 Li6</nuclides>
    <scores>total fission heating</scores>
    <derivative variable=\"nuclide_density\" material=\"1\" nuclide=\"Li6\"/>
    <trigger type=\"rel_err\" threshold=\"0.025\" scores=\"total fission\"/>
  </tally>
</tallies>
";
    assert_eq!(text, expected);
}

#[rstest]
#[case::regular(regular)]
#[case::rectilinear(rectilinear)]
#[case::cylindrical(cylindrical)]
fn grid_without_data(registry: Registry, #[case] mesh: fn(&Registry) -> Mesh) {
    let mesh = mesh(&registry);
    let vtk = voxels_to_vtk(&mesh, None, None).unwrap();

    let cell_arrays = match &vtk.data {
        DataSet::StructuredGrid { pieces, .. } => match &pieces[0] {
            Piece::Inline(p) => p.data.cell.len(),
            _ => panic!("expected inline data"),
        },
        DataSet::RectilinearGrid { pieces, .. } => match &pieces[0] {
            Piece::Inline(p) => p.data.cell.len(),
            _ => panic!("expected inline data"),
        },
        DataSet::UnstructuredGrid { pieces, .. } => match &pieces[0] {
            Piece::Inline(p) => p.data.cell.len(),
            _ => panic!("expected inline data"),
        },
        _ => panic!("unexpected grid type"),
    };
    assert_eq!(cell_arrays, 0);
}

#[rstest]
#[case::regular(regular, "regular.vtk")]
#[case::rectilinear(rectilinear, "rectilinear.vtk")]
#[case::cylindrical(cylindrical, "cylindrical.vtk")]
#[case::xml(rectilinear, "rectilinear.vtr")]
fn write_to_vtk_creates_file(
    registry: Registry,
    #[case] mesh: fn(&Registry) -> Mesh,
    #[case] name: &str,
) {
    let path = scratch(name);
    let mut tally = Tally::new(&registry);
    tally.add_filter(MeshFilter::new(mesh(&registry)));

    tally.write_to_vtk(&path).unwrap();
    assert!(path.exists());
    std::fs::remove_file(path).unwrap();
}

#[rstest]
fn write_to_vtk_with_results(registry: Registry) {
    let path = scratch("results.vtk");
    let mut tally = Tally::new(&registry);
    let mesh = regular(&registry);
    let n = mesh.n_voxels();
    tally.add_filter(MeshFilter::new(mesh));
    tally.set_results(Some(vec![1.0; n]), Some(vec![0.1; n]));

    tally.write_to_vtk(&path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("mean"));
    assert!(text.contains("std_dev"));
    std::fs::remove_file(path).unwrap();
}

#[rstest]
fn missing_mesh_filter(registry: Registry) {
    let path = scratch("missing.vtk");
    let tally = Tally::new(&registry);

    let error = tally.write_to_vtk(&path).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Value);
    assert_eq!(
        error.to_string(),
        "write_to_vtk requires a MeshFilter in the tally filters"
    );
    assert!(!path.exists());
}

#[rstest]
#[case::geometry_only("spherical.vtk", None)]
#[case::wrong_length_results("spherical_results.vtk", Some(vec![1.0; 3]))]
fn spherical_mesh_unsupported(
    registry: Registry,
    #[case] name: &str,
    #[case] mean: Option<Vec<f64>>,
) {
    let path = scratch(name);
    let mut tally = Tally::new(&registry);
    tally.add_filter(MeshFilter::new(spherical(&registry)));
    tally.set_results(mean, None);

    let error = tally.write_to_vtk(&path).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Value);
    assert_eq!(
        error.to_string(),
        "voxels_to_vtk only works with openmc.RegularMesh, openmc.RectilinearMesh, openmc.CylindricalMesh"
    );
    assert!(!path.exists());
}

#[rstest]
fn trigger_scores_checked_on_attach(registry: Registry) {
    let mut tally = Tally::new(&registry);
    tally.set_scores(names(&["flux"])).unwrap();

    let mut trigger = Trigger::new(TriggerType::StdDev, 0.1).unwrap();
    trigger.set_scores(names(&["fission"]));

    let error = tally.add_trigger(trigger).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Validation);
    assert!(tally.triggers().is_empty());
}

#[rstest]
fn trigger_scores_checked_on_export(registry: Registry) {
    let path = scratch("stale_trigger.xml");
    let mut tally = full_tally(&registry);

    // fission is still required by the trigger
    tally.set_scores(names(&["total"])).unwrap();

    let tallies = Tallies::from_vec(vec![tally]).unwrap();
    let error = tallies.export_to_xml(Some(&path)).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Validation);
    assert!(!path.exists());
}

#[rstest]
#[case::missing_id("<tallies><tally><scores>flux</scores></tally></tallies>")]
#[case::bad_id("<tallies><tally id=\"one\"/></tallies>")]
#[case::dangling_mesh(
    "<tallies><tally id=\"1\"><filters><filter type=\"mesh\" bins=\"3\"/></filters></tally></tallies>"
)]
#[case::unknown_mesh_type("<tallies><mesh id=\"1\" type=\"hexagonal\"/></tallies>")]
#[case::unclosed("<tallies><tally id=\"1\"></tallies>")]
#[case::wrong_root("<materials/>")]
fn malformed_documents(registry: Registry, #[case] text: &str) {
    let error = Tallies::from_xml_str(text, &registry).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Parse);
}

#[rstest]
fn oversized_mesh_rejected(registry: Registry) {
    let error = RegularMesh::new(&registry, [0.0; 3], [1.0; 3], [10_000_000; 3]).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Validation);

    let text = "<tallies><mesh id=\"1\" type=\"regular\">\
        <dimension>10000000 10000000 10000000</dimension>\
        <lower_left>0 0 0</lower_left><upper_right>1 1 1</upper_right>\
        </mesh></tallies>";
    let error = Tallies::from_xml_str(text, &registry).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Parse);
    assert!(error.to_string().contains("too large"));
}

#[rstest]
fn ids_reserved_after_load(registry: Registry) {
    let text = "<tallies>\
        <mesh id=\"3\" type=\"rectilinear\">\
        <x_grid>0 1</x_grid><y_grid>0 1</y_grid><z_grid>0 1</z_grid>\
        </mesh>\
        <tally id=\"2\"><filters><filter type=\"mesh\" bins=\"3\"/></filters></tally>\
        </tallies>";
    let tallies = Tallies::from_xml_str(text, &registry).unwrap();
    assert_eq!(tallies[0].id(), 2);

    // new objects never collide with loaded ones
    assert_ne!(Tally::new(&registry).id(), 2);
    let mesh = RegularMesh::new(&registry, [0.0; 3], [1.0; 3], [1, 1, 1]).unwrap();
    assert_ne!(mesh.id(), 3);
}
