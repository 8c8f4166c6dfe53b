//! Counter-clockwise canonicalization of face node lists.
//!
//! Generators hand over a face as an unordered bag of node indices, possibly
//! with repeats. [`FaceNodeOrderer`] removes repeats (first occurrence wins)
//! and sorts the survivors by polar angle about their vertex centroid, which
//! yields counter-clockwise winding for any star-shaped face.
//!
//! Ties in angle are broken by node index so the result is deterministic.

use crate::geometry::metrics::{polar_angle, vertex_centroid};
use crate::mesh_error::MeshError;
use itertools::Itertools;

/// Minimum number of unique nodes for a face.
pub const MIN_FACE_NODES: usize = 3;

/// Orders face nodes counter-clockwise against a node coordinate table.
#[derive(Clone, Copy, Debug)]
pub struct FaceNodeOrderer<'a> {
    node_x: &'a [f64],
    node_y: &'a [f64],
}

impl<'a> FaceNodeOrderer<'a> {
    /// Build an orderer over aligned coordinate arrays.
    pub fn new(node_x: &'a [f64], node_y: &'a [f64]) -> Result<Self, MeshError> {
        if node_x.len() != node_y.len() {
            return Err(MeshError::LengthMismatch {
                field: "node_y",
                expected: node_x.len(),
                found: node_y.len(),
            });
        }
        Ok(Self { node_x, node_y })
    }

    /// Number of nodes in the coordinate table.
    pub fn node_count(&self) -> usize {
        self.node_x.len()
    }

    /// De-duplicate and order the nodes of `face`.
    ///
    /// Every index must already be a valid node index. Fewer than three unique
    /// nodes yields [`MeshError::DegenerateFace`], which callers treat as a
    /// per-face exclusion rather than a build failure.
    pub fn order(&self, face: usize, nodes: &[usize]) -> Result<Vec<usize>, MeshError> {
        let unique: Vec<usize> = nodes.iter().copied().unique().collect();
        if unique.len() < MIN_FACE_NODES {
            return Err(MeshError::DegenerateFace {
                face,
                unique_nodes: unique.len(),
            });
        }
        Ok(self.sort_counter_clockwise(unique))
    }

    /// Vertex centroid of a set of nodes.
    pub fn centroid(&self, nodes: &[usize]) -> Option<[f64; 2]> {
        let ring: Vec<[f64; 2]> = nodes.iter().map(|&n| self.xy(n)).collect();
        vertex_centroid(&ring)
    }

    #[inline]
    fn xy(&self, node: usize) -> [f64; 2] {
        [self.node_x[node], self.node_y[node]]
    }

    fn sort_counter_clockwise(&self, nodes: Vec<usize>) -> Vec<usize> {
        let Some(center) = self.centroid(&nodes) else {
            return nodes;
        };
        let mut keyed: Vec<(f64, usize)> = nodes
            .into_iter()
            .map(|n| (polar_angle(self.xy(n), center), n))
            .collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        keyed.into_iter().map(|(_, n)| n).collect()
    }
}

/// `true` when `a` is a rotation of `b`.
pub fn is_cyclic_rotation(a: &[usize], b: &[usize]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    if a.is_empty() {
        return true;
    }
    b.iter()
        .positions(|&v| v == a[0])
        .any(|start| a.iter().enumerate().all(|(i, &v)| b[(start + i) % b.len()] == v))
}
