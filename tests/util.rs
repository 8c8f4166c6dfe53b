#![allow(dead_code)]
use ugrid_mesh::geometry::crs::Crs;
use ugrid_mesh::mesh_generation::GeneratorOutput;

/// Unit square given as one face in scrambled order `[2, 0, 3, 1]`.
pub fn unit_square() -> GeneratorOutput {
    GeneratorOutput::new(
        vec![0.0, 1.0, 1.0, 0.0],
        vec![0.0, 0.0, 1.0, 1.0],
        vec![4],
        vec![2, 0, 3, 1],
        Crs::Wgs84,
    )
}

/// Three triangles that all use the edge (0, 1), with an explicit edge list.
pub fn three_triangles_on_one_edge() -> GeneratorOutput {
    GeneratorOutput::new(
        vec![0.0, 1.0, 0.5, 0.5, 0.5],
        vec![0.0, 0.0, 1.0, -1.0, 2.0],
        vec![3, 3, 3],
        vec![0, 1, 2, 1, 0, 3, 0, 1, 4],
        Crs::WebMercator,
    )
    .with_edges(vec![[0, 1], [1, 2], [2, 0], [1, 3], [3, 0], [1, 4], [4, 0]])
}

/// Two triangles sharing the diagonal (0, 2) of the unit square.
pub fn two_triangles() -> GeneratorOutput {
    GeneratorOutput::new(
        vec![0.0, 1.0, 1.0, 0.0],
        vec![0.0, 0.0, 1.0, 1.0],
        vec![3, 3],
        vec![0, 1, 2, 2, 3, 0],
        Crs::WebMercator,
    )
    .with_edges(vec![[0, 1], [1, 2], [2, 0], [2, 3], [3, 0]])
}

/// A small mixed mesh near 10°E 60°N: a 3×2 quad grid, two triangles on its
/// right side and one degenerate face (index 8).
pub fn mixed_geographic_mesh() -> GeneratorOutput {
    let (x0, y0, d) = (10.0, 60.0, 0.01);
    let mut node_x = Vec::new();
    let mut node_y = Vec::new();
    for j in 0..3 {
        for i in 0..4 {
            node_x.push(x0 + d * i as f64);
            node_y.push(y0 + d * j as f64);
        }
    }
    // Apex right of the grid, node 12.
    node_x.push(x0 + 3.5 * d);
    node_y.push(y0 + d);

    let mut rows: Vec<Vec<i64>> = Vec::new();
    for j in 0..2i64 {
        for i in 0..3i64 {
            let v0 = j * 4 + i;
            rows.push(vec![v0 + 5, v0, v0 + 4, v0 + 1]);
        }
    }
    rows.push(vec![3, 12, 7, -1]);
    rows.push(vec![12, 11, 7, -1]);
    rows.push(vec![5, 5, 6, 5]);
    GeneratorOutput::from_padded_rows(node_x, node_y, &rows, Crs::Wgs84)
}

/// Assert `got` is a rotation of `want`.
pub fn assert_cyclic(got: &[usize], want: &[usize]) {
    assert!(
        ugrid_mesh::topology::orientation::is_cyclic_rotation(got, want),
        "not a cyclic rotation\n got={:?}\nwant={:?}",
        got,
        want
    );
}
