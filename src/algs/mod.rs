//! Mesh algorithms: interpolation, polygon reconstruction and the build pool.

pub mod interpolate;
pub mod pool;
pub mod reconstruct;

pub use interpolate::{IdwConfig, IdwInterpolator, ScatteredPointSet, interpolate_across_crs};
pub use pool::{BuildPool, BuildRequest, BuildTicket};
pub use reconstruct::{FacePolygon, PolygonReconstructor};
