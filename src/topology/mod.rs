//! Core mesh topology: data model, face winding, adjacency and validation.

pub mod adjacency;
pub mod mesh;
pub mod orientation;
pub mod validation;

pub use adjacency::{EdgeFaceAdjacencyResolver, EdgeKey};
pub use mesh::{AdjacentFace, Edge, Face, MeshTopology, Node};
pub use orientation::FaceNodeOrderer;
