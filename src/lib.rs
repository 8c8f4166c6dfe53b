//! # ugrid-mesh
//!
//! ugrid-mesh turns the raw output of an unstructured mesh generator into a
//! topologically consistent, serializable 2D mesh, and rebuilds renderable
//! polygon geometry from the stored form.
//!
//! ## Features
//! - Counter-clockwise face canonicalization ([`topology::FaceNodeOrderer`])
//! - Edge ↔ face adjacency with manifold enforcement and left/right
//!   orientation ([`topology::EdgeFaceAdjacencyResolver`])
//! - k-nearest inverse-distance-weighted interpolation of bathymetry
//!   ([`algs::interpolate`])
//! - CF-UGRID-style storage container with JSON I/O ([`io::ugrid`])
//! - Polygon reconstruction normalized to EPSG:4326 and GeoJSON output
//!   ([`algs::reconstruct`], [`io::geojson`])
//! - A worker pool that runs builds off the calling thread ([`algs::pool`])
//!
//! ## Lifecycle
//!
//! A mesh is built once, published as an `Arc<MeshTopology>` and never
//! mutated afterwards; any number of readers may share it. A build either
//! produces a complete topology or an error. Degenerate faces are the only
//! recoverable problem: they are dropped and listed in the
//! [`mesh_generation::BuildReport`].
//!
//! ## Usage
//! ```rust
//! # fn try_main() -> Result<(), ugrid_mesh::mesh_error::MeshError> {
//! use ugrid_mesh::prelude::*;
//!
//! let grid = GeneratorOutput::structured_quads(2, 2, [0.0, 0.0], [2.0, 2.0], Crs::WebMercator)?;
//! let built = MeshTopologyBuilder::default().build(&grid, None)?;
//! assert_eq!(built.topology.face_count(), 4);
//!
//! let dataset = UgridDataset::from_topology(&built.topology);
//! let polygons = PolygonReconstructor::from_dataset(&dataset)?;
//! assert_eq!(polygons.len(), 4);
//! # Ok(())
//! # }
//! # try_main().unwrap();
//! ```

pub mod algs;
pub mod debug_invariants;
pub mod geometry;
pub mod io;
pub mod mesh_error;
pub mod mesh_generation;
pub mod topology;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::interpolate::{IdwConfig, IdwInterpolator, ScatteredPointSet};
    pub use crate::algs::pool::{BuildPool, BuildRequest, BuildTicket};
    pub use crate::algs::reconstruct::{FacePolygon, PolygonReconstructor};
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::geometry::crs::{Crs, CrsDeclaration, Transformer};
    pub use crate::io::geojson::FaceFeatureCollection;
    pub use crate::io::present::PresentationOptions;
    pub use crate::io::ugrid::UgridDataset;
    pub use crate::io::{JsonUgrid, UgridReader, UgridWriter, VariableName};
    pub use crate::mesh_error::{ErrorKind, MeshError};
    pub use crate::mesh_generation::{
        BathymetrySource, BuildReport, BuiltMesh, GeneratorOutput, MeshBuildOptions,
        MeshTopologyBuilder,
    };
    pub use crate::topology::validation::SimplicityHandling;
    pub use crate::topology::{
        AdjacentFace, Edge, EdgeFaceAdjacencyResolver, Face, FaceNodeOrderer, MeshTopology, Node,
    };
}
