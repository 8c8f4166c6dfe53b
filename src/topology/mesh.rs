//! Mesh topology records: nodes, edges, faces and their immutable aggregate.
//!
//! Faces own a variable-length, counter-clockwise node list; fixed-width
//! padded rows exist only in the storage container
//! ([`crate::io::ugrid::UgridDataset`]). Indices are positions in the
//! owning vectors of [`MeshTopology`].

use crate::geometry::crs::Crs;
use crate::geometry::metrics;
use crate::mesh_error::MeshError;
use crate::topology::validation::{TopologyValidationOptions, validate_topology};
use serde::{Deserialize, Serialize};

/// A mesh vertex.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub x: f64,
    pub y: f64,
    /// Elevation interpolated from bathymetry, if any was supplied.
    pub z: Option<f64>,
}

impl Node {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    #[inline]
    pub fn xy(&self) -> [f64; 2] {
        [self.x, self.y]
    }
}

/// One occupied adjacency slot of an edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdjacentFace {
    /// Index of the face.
    pub face: usize,
    /// `true` when the face's counter-clockwise boundary walks the edge from
    /// `nodes[0]` to `nodes[1]`, i.e. the face lies to the left of the edge.
    pub forward: bool,
}

/// A mesh edge with up to two adjacent faces.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Endpoints in stored direction.
    pub nodes: [usize; 2],
    /// Slot 0 is filled first; slot 1 only for interior edges.
    pub faces: [Option<AdjacentFace>; 2],
    /// Rendering coordinate (the generator's, or the midpoint).
    pub x: f64,
    pub y: f64,
}

impl Edge {
    /// Number of adjacent faces (0, 1 or 2).
    pub fn face_count(&self) -> usize {
        self.faces.iter().flatten().count()
    }

    /// Indices of the adjacent faces in slot order.
    pub fn adjacent_faces(&self) -> impl Iterator<Item = usize> + '_ {
        self.faces.iter().flatten().map(|slot| slot.face)
    }

    /// `true` when exactly one face touches this edge.
    pub fn is_boundary(&self) -> bool {
        self.face_count() == 1
    }

    /// Face to the left of `nodes[0] -> nodes[1]`.
    pub fn left_face(&self) -> Option<usize> {
        self.faces
            .iter()
            .flatten()
            .find(|slot| slot.forward)
            .map(|slot| slot.face)
    }

    /// Face to the right of `nodes[0] -> nodes[1]`.
    pub fn right_face(&self) -> Option<usize> {
        self.faces
            .iter()
            .flatten()
            .find(|slot| !slot.forward)
            .map(|slot| slot.face)
    }
}

/// A mesh cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Face {
    /// Unique node indices in counter-clockwise order.
    pub nodes: Vec<usize>,
    /// Centroid used for rendering.
    pub x: f64,
    pub y: f64,
    /// Position of this face in the generator output, before degenerate
    /// faces were excluded.
    pub source_index: usize,
}

impl Face {
    #[inline]
    pub fn arity(&self) -> usize {
        self.nodes.len()
    }

    /// Boundary segments `(nodes[i], nodes[i + 1])`, wrapping at the end.
    pub fn boundary_segments(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.nodes.len();
        (0..n).map(move |i| (self.nodes[i], self.nodes[(i + 1) % n]))
    }
}

/// Immutable mesh topology: the single artifact of a successful build.
///
/// Publish it behind an `Arc` and share it freely between readers.
///
/// Deserialization runs the same validation as [`MeshTopology::try_new`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMeshTopology")]
pub struct MeshTopology {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    faces: Vec<Face>,
    crs: Crs,
}

/// Unvalidated wire form of [`MeshTopology`].
#[derive(Deserialize)]
struct RawMeshTopology {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    faces: Vec<Face>,
    crs: Crs,
}

impl TryFrom<RawMeshTopology> for MeshTopology {
    type Error = MeshError;

    fn try_from(raw: RawMeshTopology) -> Result<Self, Self::Error> {
        Self::try_new(raw.nodes, raw.edges, raw.faces, raw.crs)
    }
}

impl MeshTopology {
    /// Assemble a topology, validating every structural invariant first.
    pub fn try_new(
        nodes: Vec<Node>,
        edges: Vec<Edge>,
        faces: Vec<Face>,
        crs: Crs,
    ) -> Result<Self, MeshError> {
        let topology = Self {
            nodes,
            edges,
            faces,
            crs,
        };
        validate_topology(&topology, TopologyValidationOptions::all())?;
        Ok(topology)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// CRS of node, edge and face coordinates.
    pub fn crs(&self) -> Crs {
        self.crs
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Largest face arity, 0 for a mesh without faces.
    pub fn max_face_arity(&self) -> usize {
        self.faces.iter().map(Face::arity).max().unwrap_or(0)
    }

    /// Node x and y as separate arrays.
    pub fn node_coordinates(&self) -> (Vec<f64>, Vec<f64>) {
        self.nodes.iter().map(|n| (n.x, n.y)).unzip()
    }

    /// Ordered boundary coordinates of one face.
    pub fn face_boundary(&self, face: usize) -> Option<Vec<[f64; 2]>> {
        self.faces
            .get(face)
            .map(|f| f.nodes.iter().map(|&n| self.nodes[n].xy()).collect())
    }

    /// Planar area of one face in CRS units.
    pub fn face_area(&self, face: usize) -> Option<f64> {
        self.face_boundary(face).map(|ring| metrics::polygon_area(&ring))
    }
}
