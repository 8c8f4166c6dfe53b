//! MeshError: unified error type for ugrid-mesh public APIs
//!
//! Every fallible operation in the crate returns `Result<_, MeshError>`.
//! Variants are grouped into a small taxonomy ([`ErrorKind`]) so callers can
//! report a structured failure kind together with the human-readable message.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse classification of a [`MeshError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Mismatched or malformed arrays from the mesh generator or a stored dataset.
    InputShape,
    /// A face with fewer than three unique nodes (recoverable during builds).
    DegenerateFace,
    /// An edge claimed by more than two faces.
    NonManifoldEdge,
    /// Invalid input to the scattered-point interpolator.
    InterpolationInput,
    /// No usable coordinate reference system, or a coordinate it cannot represent.
    CrsResolution,
    /// Reading, writing or (de)serializing a mesh container failed.
    Io,
    /// The worker running a build went away before reporting a result.
    Worker,
}

/// Unified error type for ugrid-mesh operations.
#[derive(Debug, Error)]
pub enum MeshError {
    /// Two arrays that must be aligned have different lengths.
    #[error("Input shape error: `{field}` has length {found}, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },
    /// A face references a node index outside `0..node_count`.
    #[error("Input shape error: face {face} references node {node}, but the mesh has {node_count} nodes")]
    NodeIndexOutOfRange {
        face: usize,
        node: i64,
        node_count: usize,
    },
    /// An edge references a node index outside `0..node_count`.
    #[error("Input shape error: edge {edge} references node {node}, but the mesh has {node_count} nodes")]
    EdgeNodeOutOfRange {
        edge: usize,
        node: i64,
        node_count: usize,
    },
    /// An edge connects a node to itself.
    #[error("Input shape error: edge {edge} connects node {node} to itself")]
    DegenerateEdge { edge: usize, node: usize },
    /// The same unordered node pair appears twice in the edge list.
    #[error("Input shape error: edges {first} and {second} both connect nodes {nodes:?}")]
    DuplicateEdge {
        first: usize,
        second: usize,
        nodes: (usize, usize),
    },
    /// A face boundary segment has no matching entry in the edge list.
    #[error("Input shape error: face {face} uses edge {nodes:?}, which is absent from the edge list")]
    UnknownFaceEdge { face: usize, nodes: (usize, usize) },
    /// Any other malformed input.
    #[error("Input shape error: {0}")]
    InputShape(String),
    /// A face has fewer than three unique nodes after de-duplication.
    #[error("Degenerate face {face}: {unique_nodes} unique node(s) after de-duplication, at least 3 required")]
    DegenerateFace { face: usize, unique_nodes: usize },
    /// An edge is claimed by a third face.
    #[error("Non-manifold edge {edge} {nodes:?}: already adjacent to faces {faces:?}, claimed again by face {offending_face}")]
    NonManifoldEdge {
        edge: usize,
        nodes: (usize, usize),
        faces: [usize; 2],
        offending_face: usize,
    },
    /// Invalid input passed to the interpolator.
    #[error("Interpolation input error: {0}")]
    InterpolationInput(String),
    /// No usable CRS could be resolved.
    #[error("CRS resolution error: {0}")]
    CrsResolution(String),
    /// A coordinate cannot be represented in the requested CRS.
    #[error("Projection error: ({x}, {y}) cannot be projected: {reason}")]
    Projection { x: f64, y: f64, reason: String },
    /// Underlying I/O failure.
    #[error("Mesh I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON (de)serialization failure.
    #[error("Mesh serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// The build worker pool could not be created or a worker vanished.
    #[error("Build worker error: {0}")]
    Worker(String),
}

impl MeshError {
    /// Returns the taxonomy bucket of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MeshError::LengthMismatch { .. }
            | MeshError::NodeIndexOutOfRange { .. }
            | MeshError::EdgeNodeOutOfRange { .. }
            | MeshError::DegenerateEdge { .. }
            | MeshError::DuplicateEdge { .. }
            | MeshError::UnknownFaceEdge { .. }
            | MeshError::InputShape(_) => ErrorKind::InputShape,
            MeshError::DegenerateFace { .. } => ErrorKind::DegenerateFace,
            MeshError::NonManifoldEdge { .. } => ErrorKind::NonManifoldEdge,
            MeshError::InterpolationInput(_) => ErrorKind::InterpolationInput,
            MeshError::CrsResolution(_) | MeshError::Projection { .. } => ErrorKind::CrsResolution,
            MeshError::Io(_) | MeshError::Serialization(_) => ErrorKind::Io,
            MeshError::Worker(_) => ErrorKind::Worker,
        }
    }

    /// `true` for errors that abort a whole mesh build.
    pub fn is_fatal(&self) -> bool {
        self.kind() != ErrorKind::DegenerateFace
    }
}
