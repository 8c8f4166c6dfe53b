mod util;

use std::sync::Arc;
use std::thread;
use ugrid_mesh::algs::interpolate::ScatteredPointSet;
use ugrid_mesh::algs::pool::{BuildPool, BuildRequest};
use ugrid_mesh::geometry::crs::Crs;
use ugrid_mesh::mesh_error::ErrorKind;
use ugrid_mesh::mesh_generation::GeneratorOutput;
use util::{mixed_geographic_mesh, three_triangles_on_one_edge};

#[test]
fn independent_builds_complete_concurrently() {
    let pool = BuildPool::new(4).unwrap();
    let bathymetry = ScatteredPointSet::from_points([(10.01, 60.01, -5.0)], Crs::Wgs84).unwrap();
    let tickets: Vec<_> = (0..6)
        .map(|i| {
            let request = if i % 2 == 0 {
                BuildRequest::new(mixed_geographic_mesh()).with_bathymetry(bathymetry.clone())
            } else {
                BuildRequest::new(
                    GeneratorOutput::structured_quads(10, 10, [0.0, 0.0], [1e3, 1e3], Crs::WebMercator)
                        .unwrap(),
                )
            };
            pool.submit(request)
        })
        .collect();
    for (i, ticket) in tickets.into_iter().enumerate() {
        let built = ticket.wait().unwrap();
        if i % 2 == 0 {
            assert_eq!(built.topology.face_count(), 8);
            assert!(built.topology.nodes().iter().all(|n| n.z == Some(-5.0)));
        } else {
            assert_eq!(built.topology.face_count(), 100);
        }
    }
}

#[test]
fn non_manifold_build_publishes_nothing() {
    let pool = BuildPool::new(1).unwrap();
    let ticket = pool.submit(BuildRequest::new(three_triangles_on_one_edge()));
    let err = ticket.wait().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NonManifoldEdge);
}

#[test]
fn published_topology_is_shared_by_readers() {
    let pool = BuildPool::new(2).unwrap();
    let built = pool
        .submit(BuildRequest::new(mixed_geographic_mesh()))
        .wait()
        .unwrap();
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let mesh = Arc::clone(&built.topology);
            thread::spawn(move || mesh.edges().iter().map(|e| e.face_count()).sum::<usize>())
        })
        .collect();
    let sums: Vec<usize> = readers.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(sums.windows(2).all(|w| w[0] == w[1]));
    // 6 quads and 2 triangles: every face contributes one slot per side.
    assert_eq!(sums[0], 6 * 4 + 2 * 3);
}

#[test]
fn try_result_eventually_reports() {
    let pool = BuildPool::new(1).unwrap();
    let ticket = pool.submit(BuildRequest::new(mixed_geographic_mesh()));
    let result = loop {
        if let Some(result) = ticket.try_result() {
            break result;
        }
        thread::yield_now();
    };
    assert!(result.is_ok());
}

#[test]
fn panicking_build_does_not_take_down_siblings() {
    let pool = BuildPool::new(1).unwrap();
    let failing = pool.submit_with(|| panic!("generator exploded"));
    let sibling = pool.submit(BuildRequest::new(mixed_geographic_mesh()));

    let err = failing.wait().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Worker);
    assert!(err.to_string().contains("generator exploded"));
    assert_eq!(sibling.wait().unwrap().topology.face_count(), 8);

    // The worker thread survives and keeps serving requests.
    let again = pool.submit(BuildRequest::new(mixed_geographic_mesh()));
    assert!(again.wait().is_ok());
}
