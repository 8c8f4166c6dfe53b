mod util;

use ugrid_mesh::geometry::crs::Crs;
use ugrid_mesh::mesh_error::{ErrorKind, MeshError};
use ugrid_mesh::mesh_generation::{GeneratorOutput, MeshTopologyBuilder};
use ugrid_mesh::topology::EdgeFaceAdjacencyResolver;
use util::{three_triangles_on_one_edge, two_triangles};

#[test]
fn third_face_on_an_edge_aborts_the_build() {
    let err = MeshTopologyBuilder::default()
        .build(&three_triangles_on_one_edge(), None)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NonManifoldEdge);
    match err {
        MeshError::NonManifoldEdge {
            nodes,
            faces,
            offending_face,
            ..
        } => {
            assert_eq!(nodes, (0, 1));
            assert_eq!(faces, [0, 1]);
            assert_eq!(offending_face, 2);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn derived_edges_are_checked_too() {
    let input = three_triangles_on_one_edge().with_edges(Vec::new());
    let err = MeshTopologyBuilder::default().build(&input, None).unwrap_err();
    assert!(matches!(err, MeshError::NonManifoldEdge { .. }));
}

#[test]
fn shared_diagonal_has_oriented_slots() {
    let built = MeshTopologyBuilder::default().build(&two_triangles(), None).unwrap();
    let mesh = &built.topology;
    let diagonal = mesh
        .edges()
        .iter()
        .find(|e| e.nodes == [2, 0])
        .expect("diagonal edge");
    assert_eq!(diagonal.face_count(), 2);
    // Slot 0 holds the lower face index.
    assert_eq!(diagonal.faces[0].map(|s| s.face), Some(0));
    // Face 0 (0, 1, 2) walks 2 -> 0, so it lies left of the stored direction.
    assert_eq!(diagonal.left_face(), Some(0));
    assert_eq!(diagonal.right_face(), Some(1));
    let boundary = mesh.edges().iter().filter(|e| e.is_boundary()).count();
    assert_eq!(boundary, 4);
}

#[test]
fn face_counts_per_edge_stay_manifold() {
    let grid = GeneratorOutput::structured_quads(8, 5, [0.0, 0.0], [8.0, 5.0], Crs::WebMercator).unwrap();
    let mesh = MeshTopologyBuilder::default().build(&grid, None).unwrap().topology;
    let mut histogram = [0usize; 3];
    for edge in mesh.edges() {
        histogram[edge.face_count()] += 1;
    }
    assert_eq!(histogram[0], 0);
    assert_eq!(histogram[1], 2 * (8 + 5));
    assert_eq!(histogram[1] + histogram[2], mesh.edge_count());
}

#[test]
fn unknown_face_edge_is_an_input_error() {
    let input = two_triangles().with_edges(vec![[0, 1], [1, 2], [2, 0], [2, 3]]);
    let err = MeshTopologyBuilder::default().build(&input, None).unwrap_err();
    assert!(matches!(err, MeshError::UnknownFaceEdge { face: 1, .. }));
    assert_eq!(err.kind(), ErrorKind::InputShape);
}

#[test]
fn duplicate_and_self_loop_edges_are_rejected() {
    let dup = EdgeFaceAdjacencyResolver::new(vec![[0, 1], [1, 0]]).unwrap_err();
    assert!(matches!(dup, MeshError::DuplicateEdge { first: 0, second: 1, .. }));
    let lp = EdgeFaceAdjacencyResolver::new(vec![[3, 3]]).unwrap_err();
    assert!(matches!(lp, MeshError::DegenerateEdge { edge: 0, node: 3 }));
}

#[test]
fn failed_assignment_leaves_slots_untouched() {
    let mut resolver =
        EdgeFaceAdjacencyResolver::new(vec![[0, 1], [1, 2], [2, 0], [1, 3], [3, 0], [1, 4], [4, 0]])
            .unwrap();
    resolver.assign_face(0, &[0, 1, 2]).unwrap();
    resolver.assign_face(1, &[1, 0, 3]).unwrap();
    assert!(resolver.assign_face(2, &[4, 0, 1]).is_err());
    let (_, slots) = resolver.resolve(std::iter::empty::<&[usize]>()).unwrap();
    // (4, 0) was claimed before (0, 1) failed; the claim was discarded.
    assert!(slots[5].iter().all(Option::is_none));
    assert!(slots[6].iter().all(Option::is_none));
}
