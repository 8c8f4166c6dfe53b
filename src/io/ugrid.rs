//! CF-UGRID-style mesh container.
//!
//! [`UgridDataset`] is the serialization boundary of a [`MeshTopology`]:
//! variable-arity faces become fixed-width rows padded with
//! [`INT_FILL_VALUE`] (connectivity) or `null` (coordinates), and the
//! container carries its own dimension sizes and a [`TopologyDescriptor`]
//! naming the role of every array, so readers need no out-of-band shape
//! knowledge.
//!
//! Array keys are the raw variable names of [`VariableName`].

use crate::geometry::crs::CrsDeclaration;
use crate::io::VariableName;
use crate::mesh_error::MeshError;
use crate::topology::mesh::{AdjacentFace, Edge, Face, MeshTopology, Node};
use serde::{Deserialize, Serialize};

/// Fill value of integer connectivity arrays.
pub const INT_FILL_VALUE: i64 = -1;

/// Declared dimension sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshDimensions {
    #[serde(rename = "nMesh2d_node")]
    pub nodes: usize,
    #[serde(rename = "nMesh2d_edge")]
    pub edges: usize,
    #[serde(rename = "nMesh2d_face")]
    pub faces: usize,
    #[serde(rename = "max_nMesh2d_face_nodes")]
    pub max_face_nodes: usize,
}

/// Mesh topology variable attributes, following the CF-UGRID conventions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyDescriptor {
    pub cf_role: String,
    pub topology_dimension: u8,
    pub node_coordinates: String,
    pub node_elevation: String,
    pub edge_node_connectivity: String,
    pub edge_coordinates: String,
    pub edge_face_connectivity: String,
    pub face_node_connectivity: String,
    pub face_coordinates: String,
    pub face_boundary_coordinates: String,
    pub node_dimension: String,
    pub edge_dimension: String,
    pub face_dimension: String,
    pub max_face_nodes_dimension: String,
    pub start_index: i64,
    #[serde(rename = "_FillValue")]
    pub fill_value: i64,
}

impl Default for TopologyDescriptor {
    fn default() -> Self {
        let pair = |a: VariableName, b: VariableName| format!("{} {}", a.raw(), b.raw());
        Self {
            cf_role: "mesh_topology".into(),
            topology_dimension: 2,
            node_coordinates: pair(VariableName::NodeX, VariableName::NodeY),
            node_elevation: VariableName::NodeZ.raw().into(),
            edge_node_connectivity: VariableName::EdgeNodes.raw().into(),
            edge_coordinates: pair(VariableName::EdgeX, VariableName::EdgeY),
            edge_face_connectivity: VariableName::EdgeFaces.raw().into(),
            face_node_connectivity: VariableName::FaceNodes.raw().into(),
            face_coordinates: pair(VariableName::FaceX, VariableName::FaceY),
            face_boundary_coordinates: pair(VariableName::FaceXBnd, VariableName::FaceYBnd),
            node_dimension: "nMesh2d_node".into(),
            edge_dimension: "nMesh2d_edge".into(),
            face_dimension: "nMesh2d_face".into(),
            max_face_nodes_dimension: "max_nMesh2d_face_nodes".into(),
            start_index: 0,
            fill_value: INT_FILL_VALUE,
        }
    }
}

/// Serializable mesh container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UgridDataset {
    pub dimensions: MeshDimensions,
    #[serde(rename = "mesh2d")]
    pub topology: TopologyDescriptor,
    pub crs: CrsDeclaration,
    #[serde(rename = "mesh2d_node_x")]
    pub node_x: Vec<f64>,
    #[serde(rename = "mesh2d_node_y")]
    pub node_y: Vec<f64>,
    #[serde(rename = "mesh2d_node_z")]
    pub node_z: Vec<Option<f64>>,
    #[serde(rename = "mesh2d_edge_nodes")]
    pub edge_nodes: Vec<[i64; 2]>,
    #[serde(rename = "mesh2d_edge_x")]
    pub edge_x: Vec<f64>,
    #[serde(rename = "mesh2d_edge_y")]
    pub edge_y: Vec<f64>,
    #[serde(rename = "mesh2d_edge_faces")]
    pub edge_faces: Vec<[i64; 2]>,
    #[serde(rename = "mesh2d_face_nodes")]
    pub face_nodes: Vec<Vec<i64>>,
    #[serde(rename = "mesh2d_face_x")]
    pub face_x: Vec<f64>,
    #[serde(rename = "mesh2d_face_y")]
    pub face_y: Vec<f64>,
    #[serde(rename = "mesh2d_face_x_bnd")]
    pub face_x_bnd: Vec<Vec<Option<f64>>>,
    #[serde(rename = "mesh2d_face_y_bnd")]
    pub face_y_bnd: Vec<Vec<Option<f64>>>,
}

fn slot_to_raw(slot: Option<AdjacentFace>) -> i64 {
    slot.map_or(INT_FILL_VALUE, |s| s.face as i64)
}

fn check_len(field: &'static str, expected: usize, found: usize) -> Result<(), MeshError> {
    if expected == found {
        Ok(())
    } else {
        Err(MeshError::LengthMismatch {
            field,
            expected,
            found,
        })
    }
}

impl UgridDataset {
    /// Export a topology, padding face rows to the maximum arity.
    pub fn from_topology(topology: &MeshTopology) -> Self {
        let width = topology.max_face_arity();
        let descriptor = TopologyDescriptor::default();

        let (node_x, node_y) = topology.node_coordinates();
        let node_z = topology.nodes().iter().map(|n| n.z).collect();

        let edges = topology.edges();
        let edge_nodes = edges
            .iter()
            .map(|e| [e.nodes[0] as i64, e.nodes[1] as i64])
            .collect();
        let edge_faces = edges
            .iter()
            .map(|e| [slot_to_raw(e.faces[0]), slot_to_raw(e.faces[1])])
            .collect();

        let faces = topology.faces();
        let mut face_nodes = Vec::with_capacity(faces.len());
        let mut face_x_bnd = Vec::with_capacity(faces.len());
        let mut face_y_bnd = Vec::with_capacity(faces.len());
        for face in faces {
            let mut row = vec![descriptor.fill_value; width];
            let mut bx = vec![None; width];
            let mut by = vec![None; width];
            for (slot, &n) in face.nodes.iter().enumerate() {
                row[slot] = n as i64 + descriptor.start_index;
                bx[slot] = Some(node_x[n]);
                by[slot] = Some(node_y[n]);
            }
            face_nodes.push(row);
            face_x_bnd.push(bx);
            face_y_bnd.push(by);
        }

        Self {
            dimensions: MeshDimensions {
                nodes: topology.node_count(),
                edges: topology.edge_count(),
                faces: topology.face_count(),
                max_face_nodes: width,
            },
            topology: descriptor,
            crs: CrsDeclaration::from_crs(topology.crs()),
            node_x,
            node_y,
            node_z,
            edge_nodes,
            edge_x: edges.iter().map(|e| e.x).collect(),
            edge_y: edges.iter().map(|e| e.y).collect(),
            edge_faces,
            face_nodes,
            face_x: faces.iter().map(|f| f.x).collect(),
            face_y: faces.iter().map(|f| f.y).collect(),
            face_x_bnd,
            face_y_bnd,
        }
    }

    /// Check every array against the declared dimensions.
    pub fn validate(&self) -> Result<(), MeshError> {
        let d = self.dimensions;
        check_len("mesh2d_node_x", d.nodes, self.node_x.len())?;
        check_len("mesh2d_node_y", d.nodes, self.node_y.len())?;
        check_len("mesh2d_node_z", d.nodes, self.node_z.len())?;
        check_len("mesh2d_edge_nodes", d.edges, self.edge_nodes.len())?;
        check_len("mesh2d_edge_x", d.edges, self.edge_x.len())?;
        check_len("mesh2d_edge_y", d.edges, self.edge_y.len())?;
        check_len("mesh2d_edge_faces", d.edges, self.edge_faces.len())?;
        check_len("mesh2d_face_nodes", d.faces, self.face_nodes.len())?;
        check_len("mesh2d_face_x", d.faces, self.face_x.len())?;
        check_len("mesh2d_face_y", d.faces, self.face_y.len())?;
        check_len("mesh2d_face_x_bnd", d.faces, self.face_x_bnd.len())?;
        check_len("mesh2d_face_y_bnd", d.faces, self.face_y_bnd.len())?;
        for face in 0..d.faces {
            check_len("mesh2d_face_nodes row", d.max_face_nodes, self.face_nodes[face].len())?;
            check_len("mesh2d_face_x_bnd row", d.max_face_nodes, self.face_x_bnd[face].len())?;
            check_len("mesh2d_face_y_bnd row", d.max_face_nodes, self.face_y_bnd[face].len())?;
        }
        Ok(())
    }

    /// Valid (non-fill) zero-based node indices of one face row.
    pub fn face_row(&self, face: usize) -> Result<Vec<usize>, MeshError> {
        let row = self.face_nodes.get(face).ok_or_else(|| {
            MeshError::InputShape(format!(
                "face {face} out of range for {} faces",
                self.face_nodes.len()
            ))
        })?;
        valid_row_entries(
            face,
            row,
            self.topology.fill_value,
            self.topology.start_index,
            self.node_x.len(),
        )
    }

    /// Rebuild the in-memory topology. The result is validated like any
    /// freshly built mesh.
    pub fn to_topology(&self) -> Result<MeshTopology, MeshError> {
        self.validate()?;
        let crs = self.crs.resolve()?;
        let node_count = self.dimensions.nodes;
        let fill = self.topology.fill_value;
        let start = self.topology.start_index;

        let nodes = (0..node_count)
            .map(|i| Node {
                x: self.node_x[i],
                y: self.node_y[i],
                z: self.node_z[i],
            })
            .collect();

        let faces = (0..self.dimensions.faces)
            .map(|f| {
                Ok(Face {
                    nodes: self.face_row(f)?,
                    x: self.face_x[f],
                    y: self.face_y[f],
                    source_index: f,
                })
            })
            .collect::<Result<Vec<_>, MeshError>>()?;

        let mut edges = Vec::with_capacity(self.dimensions.edges);
        for (e, raw) in self.edge_nodes.iter().enumerate() {
            let mut ends = [0usize; 2];
            for (k, &r) in raw.iter().enumerate() {
                let n = r - start;
                if n < 0 || n as usize >= node_count {
                    return Err(MeshError::EdgeNodeOutOfRange {
                        edge: e,
                        node: r,
                        node_count,
                    });
                }
                ends[k] = n as usize;
            }
            let mut slots = [None, None];
            for (k, &raw_face) in self.edge_faces[e].iter().enumerate() {
                if raw_face == fill {
                    continue;
                }
                let face_idx = usize::try_from(raw_face)
                    .ok()
                    .filter(|&f| f < faces.len())
                    .ok_or_else(|| {
                        MeshError::InputShape(format!(
                            "edge {e} references face {raw_face}, but the mesh has {} faces",
                            faces.len()
                        ))
                    })?;
                let face: &Face = &faces[face_idx];
                let forward = face.boundary_segments().any(|seg| seg == (ends[0], ends[1]));
                slots[k] = Some(AdjacentFace {
                    face: face_idx,
                    forward,
                });
            }
            edges.push(Edge {
                nodes: ends,
                faces: slots,
                x: self.edge_x[e],
                y: self.edge_y[e],
            });
        }

        MeshTopology::try_new(nodes, edges, faces, crs)
    }
}

/// Filter a padded connectivity row down to valid zero-based node indices.
///
/// Entries equal to `fill` (or negative after removing `start_index`) are
/// padding; anything at or past `node_count` is an error.
pub fn valid_row_entries(
    face: usize,
    row: &[i64],
    fill: i64,
    start_index: i64,
    node_count: usize,
) -> Result<Vec<usize>, MeshError> {
    let mut out = Vec::with_capacity(row.len());
    for &raw in row {
        if raw == fill {
            continue;
        }
        let n = raw - start_index;
        if n < 0 {
            continue;
        }
        if n as usize >= node_count {
            return Err(MeshError::NodeIndexOutOfRange {
                face,
                node: raw,
                node_count,
            });
        }
        out.push(n as usize);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_is_skipped_per_row() {
        let row = [4, 2, -1, -1];
        assert_eq!(valid_row_entries(0, &row, -1, 0, 5).unwrap(), vec![4, 2]);
        let one_based = [1, 2, 3, 0];
        assert_eq!(
            valid_row_entries(0, &one_based, 0, 1, 5).unwrap(),
            vec![0, 1, 2]
        );
        assert!(valid_row_entries(3, &[9], -1, 0, 5).is_err());
    }

    #[test]
    fn default_descriptor_names_raw_variables() {
        let d = TopologyDescriptor::default();
        assert_eq!(d.node_coordinates, "mesh2d_node_x mesh2d_node_y");
        assert_eq!(d.face_node_connectivity, "mesh2d_face_nodes");
        assert_eq!(d.fill_value, INT_FILL_VALUE);
    }
}
