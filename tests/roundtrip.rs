mod util;

use approx::assert_abs_diff_eq;
use ugrid_mesh::algs::interpolate::ScatteredPointSet;
use ugrid_mesh::algs::reconstruct::PolygonReconstructor;
use ugrid_mesh::geometry::crs::{Crs, Transformer};
use ugrid_mesh::io::geojson::FaceFeatureCollection;
use ugrid_mesh::io::present::PresentationOptions;
use ugrid_mesh::io::ugrid::{INT_FILL_VALUE, UgridDataset};
use ugrid_mesh::io::{JsonUgrid, UgridReader, UgridWriter};
use ugrid_mesh::mesh_error::{ErrorKind, MeshError};
use ugrid_mesh::mesh_generation::{MeshBuildOptions, MeshTopologyBuilder, face_values_from_bathymetry};
use util::{mixed_geographic_mesh, unit_square};

fn through_json(dataset: &UgridDataset) -> UgridDataset {
    let mut buf = Vec::new();
    JsonUgrid { pretty: true }.write(&mut buf, dataset).unwrap();
    JsonUgrid::default().read(buf.as_slice()).unwrap()
}

#[test]
fn build_export_reconstruct_preserves_faces() {
    let bathymetry = ScatteredPointSet::from_points(
        [(10.0, 60.0, -3.0), (10.03, 60.02, -9.0), (10.035, 60.01, -4.5)],
        Crs::Wgs84,
    )
    .unwrap();
    let built = MeshTopologyBuilder::default()
        .build(&mixed_geographic_mesh(), Some(&bathymetry))
        .unwrap();
    let mesh = &built.topology;

    let dataset = through_json(&UgridDataset::from_topology(mesh));
    assert_eq!(dataset.dimensions.faces, 8);
    assert_eq!(dataset.dimensions.max_face_nodes, 4);
    assert!(dataset.face_nodes[6].ends_with(&[INT_FILL_VALUE]));

    let polygons = PolygonReconstructor::from_dataset(&dataset).unwrap();
    assert_eq!(polygons.len(), mesh.face_count());
    for (polygon, face) in polygons.iter().zip(mesh.faces()) {
        assert_eq!(polygon.arity(), face.arity());
        let [cx, cy] = polygon.vertex_centroid().unwrap();
        assert_abs_diff_eq!(cx, face.x, epsilon = 1e-6);
        assert_abs_diff_eq!(cy, face.y, epsilon = 1e-6);
    }
}

#[test]
fn stored_topology_reloads_identically() {
    let built = MeshTopologyBuilder::default().build(&unit_square(), None).unwrap();
    let dataset = through_json(&UgridDataset::from_topology(&built.topology));
    let reloaded = dataset.to_topology().unwrap();
    assert_eq!(&reloaded, built.topology.as_ref());
}

#[test]
fn unit_square_polygon_has_unit_area() {
    let built = MeshTopologyBuilder::default().build(&unit_square(), None).unwrap();
    let polygons = PolygonReconstructor::from_topology(&built.topology).unwrap();
    assert_abs_diff_eq!(polygons[0].area(), 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(polygons[0].area_centroid().unwrap()[0], 0.5, epsilon = 1e-12);
}

#[test]
fn projected_dataset_is_reprojected_to_wgs84() {
    let utm = Crs::Utm { zone: 32, north: true };
    let to_utm = Transformer::new(Crs::Wgs84, utm);
    let mut input = mixed_geographic_mesh();
    let (ex, ny) = to_utm.transform_slices(&input.node_x, &input.node_y).unwrap();
    let (lon, lat) = (input.node_x.clone(), input.node_y.clone());
    input.node_x = ex;
    input.node_y = ny;
    input.crs = utm;

    let mesh = MeshTopologyBuilder::default().build(&input, None).unwrap().topology;
    let dataset = UgridDataset::from_topology(&mesh);
    assert_eq!(dataset.crs.epsg, Some(32632));
    let polygons = PolygonReconstructor::from_dataset(&dataset).unwrap();
    for (polygon, face) in polygons.iter().zip(mesh.faces()) {
        for (vertex, &node) in polygon.exterior.iter().zip(&face.nodes) {
            assert_abs_diff_eq!(vertex[0], lon[node], epsilon = 1e-7);
            assert_abs_diff_eq!(vertex[1], lat[node], epsilon = 1e-7);
        }
    }
}

#[test]
fn missing_crs_declaration_is_refused() {
    let built = MeshTopologyBuilder::default().build(&unit_square(), None).unwrap();
    let mut dataset = UgridDataset::from_topology(&built.topology);
    dataset.crs.geographic = None;
    dataset.crs.epsg = None;
    let err = PolygonReconstructor::from_dataset(&dataset).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CrsResolution);
    assert!(dataset.to_topology().is_err());
}

#[test]
fn shape_is_rechecked_on_load() {
    let built = MeshTopologyBuilder::default().build(&unit_square(), None).unwrap();
    let mut dataset = UgridDataset::from_topology(&built.topology);
    dataset.face_x.push(0.0);
    let json = serde_json::to_string(&dataset).unwrap();
    let err = JsonUgrid::default().read(json.as_bytes()).unwrap_err();
    assert!(matches!(err, MeshError::LengthMismatch { field: "mesh2d_face_x", .. }));
}

#[test]
fn geojson_features_align_with_values() {
    let built = MeshTopologyBuilder::default()
        .build(&mixed_geographic_mesh(), None)
        .unwrap();
    let dataset = UgridDataset::from_topology(&built.topology);
    let polygons = PolygonReconstructor::from_dataset(&dataset).unwrap();
    let bathymetry = ScatteredPointSet::from_points(
        [(10.0, 60.0, -0.000_123_4), (10.05, 60.03, -20.0)],
        Crs::Wgs84,
    )
    .unwrap();
    let values =
        face_values_from_bathymetry(&built.topology, &bathymetry, &MeshBuildOptions::default())
            .unwrap();
    let collection =
        FaceFeatureCollection::new(&polygons, &values, PresentationOptions::default()).unwrap();
    assert_eq!(collection.len(), built.topology.face_count());
    assert_eq!(collection.values.len(), collection.features.len());
    for (i, feature) in collection.features.iter().enumerate() {
        assert_eq!(feature.id, i);
        assert_eq!(feature.properties.face_index, i);
        let ring = &feature.geometry.coordinates[0];
        assert_eq!(ring.first(), ring.last());
        assert!(collection.values[i].is_some());
    }

    let json: serde_json::Value =
        serde_json::from_str(&collection.to_json_string().unwrap()).unwrap();
    assert_eq!(json["features"].as_array().unwrap().len(), 8);
}
