//! Topology validation helpers.

use crate::debug_invariants::DebugInvariants;
use crate::geometry::metrics::{is_simple, polar_angle, vertex_centroid};
use crate::mesh_error::MeshError;
use crate::topology::adjacency::EdgeKey;
use crate::topology::mesh::MeshTopology;
use crate::topology::orientation::MIN_FACE_NODES;
use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

/// Optional validation toggles for mesh topology checks.
#[derive(Debug, Clone, Copy)]
pub struct TopologyValidationOptions {
    /// Ensure face nodes are sorted counter-clockwise by polar angle.
    pub check_winding: bool,
    /// Ensure each adjacent face really contains the edge it is attached to.
    pub check_adjacency_membership: bool,
    /// Ensure no two edges share the same unordered node pair.
    pub check_duplicate_edges: bool,
}

impl TopologyValidationOptions {
    /// Enable all topology validation checks.
    pub fn all() -> Self {
        Self {
            check_winding: true,
            check_adjacency_membership: true,
            check_duplicate_edges: true,
        }
    }
}

/// Behavior for faces whose ordered boundary self-intersects or has no area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimplicityHandling {
    /// Skip the simplicity check.
    Ignore,
    /// Log a warning and keep the face.
    #[default]
    Warn,
    /// Exclude the face, like a degenerate one.
    Exclude,
}

/// `true` when the ordered ring of `nodes` is a simple polygon.
pub fn face_is_simple(node_x: &[f64], node_y: &[f64], nodes: &[usize]) -> bool {
    let ring: Vec<[f64; 2]> = nodes.iter().map(|&n| [node_x[n], node_y[n]]).collect();
    is_simple(&ring)
}

/// Validate a mesh topology against the structural invariants:
/// face arity and uniqueness, index ranges, winding and adjacency consistency.
pub fn validate_topology(
    topology: &MeshTopology,
    options: TopologyValidationOptions,
) -> Result<(), MeshError> {
    let node_count = topology.node_count();
    let face_count = topology.face_count();

    for (face_idx, face) in topology.faces().iter().enumerate() {
        let mut seen = HashSet::with_capacity(face.nodes.len());
        for &n in &face.nodes {
            if n >= node_count {
                return Err(MeshError::NodeIndexOutOfRange {
                    face: face_idx,
                    node: n as i64,
                    node_count,
                });
            }
            seen.insert(n);
        }
        if seen.len() < MIN_FACE_NODES || seen.len() != face.nodes.len() {
            return Err(MeshError::DegenerateFace {
                face: face_idx,
                unique_nodes: seen.len(),
            });
        }
        if options.check_winding && !is_polar_sorted(topology, &face.nodes) {
            return Err(MeshError::InputShape(format!(
                "face {face_idx} is not ordered counter-clockwise"
            )));
        }
    }

    let mut keys = HashMap::with_capacity(topology.edge_count());
    for (edge_idx, edge) in topology.edges().iter().enumerate() {
        let [a, b] = edge.nodes;
        for n in [a, b] {
            if n >= node_count {
                return Err(MeshError::EdgeNodeOutOfRange {
                    edge: edge_idx,
                    node: n as i64,
                    node_count,
                });
            }
        }
        if a == b {
            return Err(MeshError::DegenerateEdge {
                edge: edge_idx,
                node: a,
            });
        }
        if options.check_duplicate_edges {
            if let Some(first) = keys.insert(EdgeKey::new(a, b), edge_idx) {
                return Err(MeshError::DuplicateEdge {
                    first,
                    second: edge_idx,
                    nodes: EdgeKey::new(a, b).nodes(),
                });
            }
        }
        if let [Some(s0), Some(s1)] = edge.faces {
            if s0.face == s1.face {
                return Err(MeshError::InputShape(format!(
                    "edge {edge_idx} lists face {} twice",
                    s0.face
                )));
            }
        }
        for slot in edge.faces.iter().flatten() {
            let face = topology.faces().get(slot.face).ok_or_else(|| {
                MeshError::InputShape(format!(
                    "edge {edge_idx} references face {}, but the mesh has {face_count} faces",
                    slot.face
                ))
            })?;
            if options.check_adjacency_membership {
                let walks = if slot.forward { (a, b) } else { (b, a) };
                if !face.boundary_segments().any(|seg| seg == walks) {
                    return Err(MeshError::InputShape(format!(
                        "edge {edge_idx} claims face {} which does not traverse {walks:?}",
                        slot.face
                    )));
                }
            }
        }
    }
    Ok(())
}

/// Polar angles about the vertex centroid increase around the ring, with at
/// most one wrap-around.
fn is_polar_sorted(topology: &MeshTopology, nodes: &[usize]) -> bool {
    let ring: Vec<[f64; 2]> = nodes.iter().map(|&n| topology.nodes()[n].xy()).collect();
    let Some(center) = vertex_centroid(&ring) else {
        return false;
    };
    let angles: Vec<f64> = ring.iter().map(|&p| polar_angle(p, center)).collect();
    let descents = (0..angles.len())
        .filter(|&i| angles[(i + 1) % angles.len()] < angles[i])
        .count();
    descents <= 1
}

impl DebugInvariants for MeshTopology {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "MeshTopology");
    }

    fn validate_invariants(&self) -> Result<(), MeshError> {
        validate_topology(self, TopologyValidationOptions::all())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::crs::Crs;
    use crate::topology::mesh::{AdjacentFace, Edge, Face, Node};

    fn square_nodes() -> Vec<Node> {
        vec![
            Node::new(0.0, 0.0),
            Node::new(1.0, 0.0),
            Node::new(1.0, 1.0),
            Node::new(0.0, 1.0),
        ]
    }

    fn face(nodes: Vec<usize>) -> Face {
        Face {
            nodes,
            x: 0.5,
            y: 0.5,
            source_index: 0,
        }
    }

    #[test]
    fn clockwise_face_is_rejected() {
        let err = MeshTopology::try_new(square_nodes(), vec![], vec![face(vec![0, 3, 2, 1])], Crs::Wgs84)
            .unwrap_err();
        assert!(matches!(err, MeshError::InputShape(_)));
    }

    #[test]
    fn out_of_range_node_is_rejected() {
        let err = MeshTopology::try_new(square_nodes(), vec![], vec![face(vec![0, 1, 7])], Crs::Wgs84)
            .unwrap_err();
        assert!(matches!(err, MeshError::NodeIndexOutOfRange { node: 7, .. }));
    }

    #[test]
    fn adjacency_must_match_face_boundary() {
        let edge = Edge {
            nodes: [0, 2],
            faces: [
                Some(AdjacentFace {
                    face: 0,
                    forward: true,
                }),
                None,
            ],
            x: 0.5,
            y: 0.5,
        };
        let err = MeshTopology::try_new(
            square_nodes(),
            vec![edge],
            vec![face(vec![0, 1, 2, 3])],
            Crs::Wgs84,
        )
        .unwrap_err();
        assert!(matches!(err, MeshError::InputShape(_)));
    }

    #[test]
    fn valid_square_passes_invariants() {
        let edge = Edge {
            nodes: [0, 1],
            faces: [
                Some(AdjacentFace {
                    face: 0,
                    forward: true,
                }),
                None,
            ],
            x: 0.5,
            y: 0.0,
        };
        let mesh = MeshTopology::try_new(
            square_nodes(),
            vec![edge],
            vec![face(vec![1, 2, 3, 0])],
            Crs::Wgs84,
        )
        .unwrap();
        assert!(mesh.validate_invariants().is_ok());
        mesh.debug_assert_invariants();
    }
}
