//! Edge ↔ face adjacency resolution with 2D-manifold enforcement.
//!
//! The resolver indexes every edge by its unordered node pair once (O(E)),
//! then walks each face boundary and drops the face into the first free
//! adjacency slot of every edge it touches (O(F · max_n)). A third claim on
//! an edge is a [`MeshError::NonManifoldEdge`].
//!
//! Faces must be assigned in ascending index order for slot 0 to always hold
//! the lower face index; [`EdgeFaceAdjacencyResolver::resolve`] does this.

use crate::mesh_error::MeshError;
use crate::topology::mesh::AdjacentFace;
use hashbrown::HashMap;
use hashbrown::hash_map::Entry;

/// Unordered node pair, stored as `(min, max)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey(usize, usize);

impl EdgeKey {
    #[inline]
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b { EdgeKey(a, b) } else { EdgeKey(b, a) }
    }

    #[inline]
    pub fn nodes(self) -> (usize, usize) {
        (self.0, self.1)
    }
}

/// Adjacency slots for one edge.
pub type EdgeSlots = [Option<AdjacentFace>; 2];

/// Builds the edge → face adjacency table for a set of ordered faces.
#[derive(Debug, Clone)]
pub struct EdgeFaceAdjacencyResolver {
    edge_nodes: Vec<[usize; 2]>,
    index: HashMap<EdgeKey, usize>,
    slots: Vec<EdgeSlots>,
}

impl EdgeFaceAdjacencyResolver {
    /// Index an explicit edge list. Self-loops and repeated node pairs are
    /// input errors.
    pub fn new(edge_nodes: Vec<[usize; 2]>) -> Result<Self, MeshError> {
        let mut index = HashMap::with_capacity(edge_nodes.len());
        for (edge, &[a, b]) in edge_nodes.iter().enumerate() {
            if a == b {
                return Err(MeshError::DegenerateEdge { edge, node: a });
            }
            match index.entry(EdgeKey::new(a, b)) {
                Entry::Occupied(first) => {
                    return Err(MeshError::DuplicateEdge {
                        first: *first.get(),
                        second: edge,
                        nodes: first.key().nodes(),
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(edge);
                }
            }
        }
        let slots = vec![[None, None]; edge_nodes.len()];
        Ok(Self {
            edge_nodes,
            index,
            slots,
        })
    }

    /// Derive the edge list from ordered faces, numbering edges in the order
    /// their first boundary traversal is met. Each edge is stored in that
    /// first traversal direction.
    pub fn from_faces<'f, I>(faces: I) -> Self
    where
        I: IntoIterator<Item = &'f [usize]>,
    {
        let mut edge_nodes = Vec::new();
        let mut index = HashMap::new();
        for nodes in faces {
            for (a, b) in boundary_pairs(nodes) {
                index.entry(EdgeKey::new(a, b)).or_insert_with(|| {
                    edge_nodes.push([a, b]);
                    edge_nodes.len() - 1
                });
            }
        }
        let slots = vec![[None, None]; edge_nodes.len()];
        Self {
            edge_nodes,
            index,
            slots,
        }
    }

    pub fn edge_count(&self) -> usize {
        self.edge_nodes.len()
    }

    /// Stored endpoints of every edge.
    pub fn edge_nodes(&self) -> &[[usize; 2]] {
        &self.edge_nodes
    }

    /// Index of the edge joining `a` and `b`, in either direction.
    pub fn edge_index(&self, a: usize, b: usize) -> Option<usize> {
        self.index.get(&EdgeKey::new(a, b)).copied()
    }

    /// Record `face` as adjacent to each edge of its boundary.
    ///
    /// The face is checked in full before any slot is written, so a failing
    /// face leaves the table untouched.
    pub fn assign_face(&mut self, face: usize, nodes: &[usize]) -> Result<(), MeshError> {
        let mut claims = Vec::with_capacity(nodes.len());
        for (a, b) in boundary_pairs(nodes) {
            let edge = self
                .edge_index(a, b)
                .ok_or(MeshError::UnknownFaceEdge { face, nodes: (a, b) })?;
            let slot = match self.slots[edge] {
                [None, _] => 0,
                [Some(_), None] => 1,
                [Some(first), Some(second)] => {
                    let [n0, n1] = self.edge_nodes[edge];
                    return Err(MeshError::NonManifoldEdge {
                        edge,
                        nodes: (n0, n1),
                        faces: [first.face, second.face],
                        offending_face: face,
                    });
                }
            };
            let forward = self.edge_nodes[edge] == [a, b];
            claims.push((edge, slot, AdjacentFace { face, forward }));
        }
        for (edge, slot, adjacent) in claims {
            self.slots[edge][slot] = Some(adjacent);
        }
        Ok(())
    }

    /// Assign every face, in index order, and return the per-edge slots.
    pub fn resolve<'f, I>(mut self, faces: I) -> Result<(Vec<[usize; 2]>, Vec<EdgeSlots>), MeshError>
    where
        I: IntoIterator<Item = &'f [usize]>,
    {
        for (face, nodes) in faces.into_iter().enumerate() {
            self.assign_face(face, nodes)?;
        }
        Ok((self.edge_nodes, self.slots))
    }
}

fn boundary_pairs(nodes: &[usize]) -> impl Iterator<Item = (usize, usize)> + '_ {
    let n = nodes.len();
    (0..n).map(move |i| (nodes[i], nodes[(i + 1) % n]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_triangles_share_one_edge() {
        // 0-1-2 and 2-1-3 share edge (1,2).
        let edges = vec![[0, 1], [1, 2], [2, 0], [1, 3], [3, 2]];
        let faces: Vec<Vec<usize>> = vec![vec![0, 1, 2], vec![1, 3, 2]];
        let resolver = EdgeFaceAdjacencyResolver::new(edges).unwrap();
        let (_, slots) = resolver.resolve(faces.iter().map(Vec::as_slice)).unwrap();
        let shared = slots[1];
        assert_eq!(shared[0].unwrap().face, 0);
        assert!(shared[0].unwrap().forward);
        assert_eq!(shared[1].unwrap().face, 1);
        assert!(!shared[1].unwrap().forward);
        assert!(slots[0][1].is_none());
    }

    #[test]
    fn third_face_on_an_edge_is_rejected() {
        let edges = vec![[0, 1], [1, 2], [2, 0], [1, 3], [3, 0], [1, 4], [4, 0]];
        let faces: Vec<Vec<usize>> = vec![vec![0, 1, 2], vec![1, 0, 3], vec![0, 1, 4]];
        let resolver = EdgeFaceAdjacencyResolver::new(edges).unwrap();
        let err = resolver
            .resolve(faces.iter().map(Vec::as_slice))
            .unwrap_err();
        match err {
            MeshError::NonManifoldEdge {
                edge,
                faces,
                offending_face,
                ..
            } => {
                assert_eq!(edge, 0);
                assert_eq!(faces, [0, 1]);
                assert_eq!(offending_face, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn failed_face_leaves_slots_untouched() {
        let edges = vec![[0, 1], [1, 2], [2, 0]];
        let mut resolver = EdgeFaceAdjacencyResolver::new(edges).unwrap();
        let err = resolver.assign_face(0, &[0, 1, 3]).unwrap_err();
        assert!(matches!(err, MeshError::UnknownFaceEdge { face: 0, .. }));
        assert!(resolver.slots.iter().all(|s| s[0].is_none()));
    }

    #[test]
    fn duplicate_and_degenerate_edges() {
        assert!(matches!(
            EdgeFaceAdjacencyResolver::new(vec![[0, 1], [1, 0]]),
            Err(MeshError::DuplicateEdge {
                first: 0,
                second: 1,
                ..
            })
        ));
        assert!(matches!(
            EdgeFaceAdjacencyResolver::new(vec![[2, 2]]),
            Err(MeshError::DegenerateEdge { edge: 0, node: 2 })
        ));
    }

    #[test]
    fn derived_edges_follow_first_traversal() {
        let faces: Vec<Vec<usize>> = vec![vec![0, 1, 2], vec![1, 3, 2]];
        let resolver = EdgeFaceAdjacencyResolver::from_faces(faces.iter().map(Vec::as_slice));
        assert_eq!(
            resolver.edge_nodes(),
            &[[0, 1], [1, 2], [2, 0], [1, 3], [3, 2]]
        );
        assert_eq!(resolver.edge_index(2, 1), Some(1));
    }
}
