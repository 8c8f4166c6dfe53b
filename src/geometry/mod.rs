//! Geometry utilities for ugrid-mesh.
//!
//! Planar polygon metrics plus the coordinate reference systems used to move
//! between generator coordinates, metric interpolation space and the
//! geographic output boundary.

pub mod crs;
pub mod metrics;
pub mod projection;
