//! Raw mesh-generator output and the topology build that consumes it.
//!
//! A generator hands over flat arrays: node coordinates, a face-node stream
//! sliced by per-face counts, and optionally edges and rendering
//! coordinates. [`GeneratorOutput`] holds those arrays unchanged;
//! [`MeshTopologyBuilder`] turns them into an immutable [`MeshTopology`].

pub mod builder;

pub use builder::{BuildReport, BuiltMesh, ExclusionReason, FaceExclusion, MeshTopologyBuilder};

use crate::algs::interpolate::{
    DEFAULT_EPSILON, DEFAULT_NEIGHBOR_COUNT, IdwConfig, ScatteredPointSet, interpolate_across_crs,
};
use crate::geometry::crs::{Crs, select_metric_crs};
use crate::io::ugrid::INT_FILL_VALUE;
use crate::mesh_error::MeshError;
use crate::topology::mesh::MeshTopology;
use crate::topology::validation::SimplicityHandling;
use serde::{Deserialize, Serialize};

/// Arrays produced by a mesh generator.
///
/// `edge_nodes`, `edge_x`/`edge_y` and `face_x`/`face_y` may be left empty;
/// the builder derives edges from faces and falls back to midpoints and
/// vertex centroids for coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorOutput {
    pub node_x: Vec<f64>,
    pub node_y: Vec<f64>,
    /// Number of stream entries belonging to each face.
    pub nodes_per_face: Vec<usize>,
    /// Flattened face-node stream. Entries that are negative after removing
    /// `start_index` are sentinels.
    pub face_nodes: Vec<i64>,
    #[serde(default)]
    pub edge_nodes: Vec<[i64; 2]>,
    #[serde(default)]
    pub edge_x: Vec<f64>,
    #[serde(default)]
    pub edge_y: Vec<f64>,
    #[serde(default)]
    pub face_x: Vec<f64>,
    #[serde(default)]
    pub face_y: Vec<f64>,
    /// Index base of `face_nodes` and `edge_nodes` (UGRID uses 0 or 1).
    #[serde(default)]
    pub start_index: i64,
    /// CRS of every coordinate array.
    pub crs: Crs,
}

impl GeneratorOutput {
    pub fn new(
        node_x: Vec<f64>,
        node_y: Vec<f64>,
        nodes_per_face: Vec<usize>,
        face_nodes: Vec<i64>,
        crs: Crs,
    ) -> Self {
        Self {
            node_x,
            node_y,
            nodes_per_face,
            face_nodes,
            edge_nodes: Vec::new(),
            edge_x: Vec::new(),
            edge_y: Vec::new(),
            face_x: Vec::new(),
            face_y: Vec::new(),
            start_index: 0,
            crs,
        }
    }

    /// Build from fixed-width rows padded with [`INT_FILL_VALUE`].
    pub fn from_padded_rows(node_x: Vec<f64>, node_y: Vec<f64>, rows: &[Vec<i64>], crs: Crs) -> Self {
        let mut nodes_per_face = Vec::with_capacity(rows.len());
        let mut face_nodes = Vec::new();
        for row in rows {
            let before = face_nodes.len();
            face_nodes.extend(row.iter().copied().filter(|&n| n != INT_FILL_VALUE));
            nodes_per_face.push(face_nodes.len() - before);
        }
        Self::new(node_x, node_y, nodes_per_face, face_nodes, crs)
    }

    pub fn with_edges(mut self, edge_nodes: Vec<[i64; 2]>) -> Self {
        self.edge_nodes = edge_nodes;
        self
    }

    pub fn with_edge_coordinates(mut self, edge_x: Vec<f64>, edge_y: Vec<f64>) -> Self {
        self.edge_x = edge_x;
        self.edge_y = edge_y;
        self
    }

    pub fn with_face_coordinates(mut self, face_x: Vec<f64>, face_y: Vec<f64>) -> Self {
        self.face_x = face_x;
        self.face_y = face_y;
        self
    }

    pub fn with_start_index(mut self, start_index: i64) -> Self {
        self.start_index = start_index;
        self
    }

    pub fn node_count(&self) -> usize {
        self.node_x.len()
    }

    pub fn face_count(&self) -> usize {
        self.nodes_per_face.len()
    }

    /// Slice the face-node stream per face via prefix sums of
    /// `nodes_per_face`.
    pub fn face_slices(&self) -> Result<Vec<&[i64]>, MeshError> {
        let total = self
            .nodes_per_face
            .iter()
            .try_fold(0usize, |acc, &count| acc.checked_add(count))
            .ok_or_else(|| {
                MeshError::InputShape("nodes_per_face total overflows the index range".into())
            })?;
        if total != self.face_nodes.len() {
            return Err(MeshError::LengthMismatch {
                field: "face_nodes",
                expected: total,
                found: self.face_nodes.len(),
            });
        }
        let mut start = 0usize;
        self.nodes_per_face
            .iter()
            .enumerate()
            .map(|(face, &count)| {
                let slice = start
                    .checked_add(count)
                    .and_then(|end| self.face_nodes.get(start..end))
                    .ok_or_else(|| {
                        MeshError::InputShape(format!(
                            "face {face}: {count} nodes starting at {start} exceed the face-node stream"
                        ))
                    })?;
                start += count;
                Ok(slice)
            })
            .collect()
    }

    /// Structured `nx × ny` quadrilateral grid over `[min, max]`, with faces
    /// listed clockwise from the top-left corner and explicit edges.
    pub fn structured_quads(
        nx: usize,
        ny: usize,
        min: [f64; 2],
        max: [f64; 2],
        crs: Crs,
    ) -> Result<Self, MeshError> {
        if nx == 0 || ny == 0 {
            return Err(MeshError::InputShape("nx and ny must be positive".into()));
        }
        let dx = (max[0] - min[0]) / nx as f64;
        let dy = (max[1] - min[1]) / ny as f64;
        let mut node_x = Vec::with_capacity((nx + 1) * (ny + 1));
        let mut node_y = Vec::with_capacity((nx + 1) * (ny + 1));
        for j in 0..=ny {
            for i in 0..=nx {
                node_x.push(min[0] + dx * i as f64);
                node_y.push(min[1] + dy * j as f64);
            }
        }

        let stride = nx + 1;
        let mut face_nodes = Vec::with_capacity(4 * nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                let v0 = (j * stride + i) as i64;
                let v1 = v0 + 1;
                let v3 = v0 + stride as i64;
                let v2 = v3 + 1;
                face_nodes.extend([v3, v2, v1, v0]);
            }
        }

        let mut edge_nodes = Vec::with_capacity(nx * (ny + 1) + ny * (nx + 1));
        for j in 0..=ny {
            for i in 0..nx {
                let v = (j * stride + i) as i64;
                edge_nodes.push([v, v + 1]);
            }
        }
        for j in 0..ny {
            for i in 0..=nx {
                let v = (j * stride + i) as i64;
                edge_nodes.push([v, v + stride as i64]);
            }
        }

        Ok(Self::new(node_x, node_y, vec![4; nx * ny], face_nodes, crs).with_edges(edge_nodes))
    }
}

/// Options of a mesh build.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshBuildOptions {
    /// Bathymetry neighbours per node.
    pub neighbor_count: usize,
    /// IDW distance offset.
    pub epsilon: f64,
    /// Treatment of self-intersecting faces.
    pub simplicity: SimplicityHandling,
    /// Projected EPSG code for distance work. `None` picks the mesh CRS if
    /// projected, else the UTM zone of the mesh centre.
    pub metric_crs: Option<u32>,
    /// Derive edges from faces when the generator supplies none.
    pub derive_missing_edges: bool,
}

impl Default for MeshBuildOptions {
    fn default() -> Self {
        Self {
            neighbor_count: DEFAULT_NEIGHBOR_COUNT,
            epsilon: DEFAULT_EPSILON,
            simplicity: SimplicityHandling::default(),
            metric_crs: None,
            derive_missing_edges: true,
        }
    }
}

impl MeshBuildOptions {
    /// Parse options from JSON; absent keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, MeshError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn idw_config(&self) -> IdwConfig {
        IdwConfig {
            neighbor_count: self.neighbor_count,
            epsilon: self.epsilon,
        }
    }
}

/// A bathymetry store: `(x, y, depth)` samples in a declared CRS.
pub trait BathymetrySource {
    fn crs(&self) -> Crs;

    fn depth_samples(&self) -> Box<dyn Iterator<Item = (f64, f64, f64)> + '_>;

    /// Collect the samples into an interpolation source set.
    fn to_point_set(&self) -> Result<ScatteredPointSet, MeshError> {
        ScatteredPointSet::from_points(self.depth_samples(), self.crs())
    }
}

impl BathymetrySource for ScatteredPointSet {
    fn crs(&self) -> Crs {
        ScatteredPointSet::crs(self)
    }

    fn depth_samples(&self) -> Box<dyn Iterator<Item = (f64, f64, f64)> + '_> {
        Box::new(
            self.x()
                .iter()
                .zip(self.y())
                .zip(self.values())
                .map(|((&x, &y), &v)| (x, y, v)),
        )
    }

    fn to_point_set(&self) -> Result<ScatteredPointSet, MeshError> {
        Ok(self.clone())
    }
}

/// Interpolate bathymetry at every face centre, indexed by face.
pub fn face_values_from_bathymetry(
    topology: &MeshTopology,
    bathymetry: &dyn BathymetrySource,
    options: &MeshBuildOptions,
) -> Result<Vec<f64>, MeshError> {
    let (fx, fy): (Vec<f64>, Vec<f64>) = topology.faces().iter().map(|f| (f.x, f.y)).unzip();
    if fx.is_empty() {
        return Ok(Vec::new());
    }
    let sources = bathymetry.to_point_set()?;
    let metric = select_metric_crs(topology.crs(), &fx, &fy, options.metric_crs)?;
    interpolate_across_crs(&fx, &fy, topology.crs(), &sources, metric, options.idw_config())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh_error::ErrorKind;

    #[test]
    fn padded_rows_become_counts_and_stream() {
        let out = GeneratorOutput::from_padded_rows(
            vec![0.0; 5],
            vec![0.0; 5],
            &[vec![0, 1, 2, -1], vec![1, 2, 3, 4]],
            Crs::Wgs84,
        );
        assert_eq!(out.nodes_per_face, vec![3, 4]);
        assert_eq!(out.face_nodes, vec![0, 1, 2, 1, 2, 3, 4]);
        let slices = out.face_slices().unwrap();
        assert_eq!(slices[1], &[1, 2, 3, 4]);
    }

    #[test]
    fn stream_length_must_match_counts() {
        let out = GeneratorOutput::new(vec![0.0; 3], vec![0.0; 3], vec![3, 3], vec![0, 1, 2], Crs::Wgs84);
        assert!(matches!(
            out.face_slices(),
            Err(MeshError::LengthMismatch { field: "face_nodes", .. })
        ));
    }

    #[test]
    fn overflowing_counts_are_a_shape_error() {
        let out = GeneratorOutput::new(
            vec![0.0; 3],
            vec![0.0; 3],
            vec![usize::MAX, 4],
            vec![0, 1, 2],
            Crs::Wgs84,
        );
        assert!(matches!(out.face_slices(), Err(MeshError::InputShape(_))));
        let err = MeshTopologyBuilder::default().build(&out, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputShape);
    }

    #[test]
    fn structured_grid_counts() {
        let out = GeneratorOutput::structured_quads(3, 2, [0.0, 0.0], [3.0, 2.0], Crs::WebMercator)
            .unwrap();
        assert_eq!(out.node_count(), 12);
        assert_eq!(out.face_count(), 6);
        assert_eq!(out.edge_nodes.len(), 3 * 3 + 2 * 4);
        assert!(GeneratorOutput::structured_quads(0, 1, [0.0; 2], [1.0; 2], Crs::Wgs84).is_err());
    }

    #[test]
    fn options_from_partial_json() {
        let opts = MeshBuildOptions::from_json_str(r#"{"neighbor_count": 4, "simplicity": "exclude"}"#)
            .unwrap();
        assert_eq!(opts.neighbor_count, 4);
        assert_eq!(opts.simplicity, SimplicityHandling::Exclude);
        assert_eq!(opts.epsilon, DEFAULT_EPSILON);
        assert!(opts.derive_missing_edges);
    }
}
