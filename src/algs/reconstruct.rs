//! Polygon reconstruction from a persisted mesh.
//!
//! The inverse of the build path: every padded face row of a stored mesh is
//! masked down to its valid entries and turned into an explicit polygon in
//! geographic WGS84, which is what rendering consumers expect.
//!
//! The validity mask is computed per row. An entry is valid when it is not
//! the fill value, is not negative after removing `start_index`, and points
//! at a node with finite coordinates. Rows left with fewer than three valid
//! vertices produce no polygon and are logged.

use crate::geometry::crs::{Crs, CrsDeclaration, Transformer};
use crate::geometry::metrics;
use crate::io::ugrid::{UgridDataset, valid_row_entries};
use crate::mesh_error::MeshError;
use crate::topology::mesh::MeshTopology;
use crate::topology::orientation::MIN_FACE_NODES;

/// One reconstructed face outline in EPSG:4326.
#[derive(Debug, Clone, PartialEq)]
pub struct FacePolygon {
    /// Index of the face row this polygon came from.
    pub face: usize,
    /// Open exterior ring, `(lon, lat)` in face-node order.
    pub exterior: Vec<[f64; 2]>,
}

impl FacePolygon {
    pub fn arity(&self) -> usize {
        self.exterior.len()
    }

    /// Planar area in squared degrees.
    pub fn area(&self) -> f64 {
        metrics::polygon_area(&self.exterior)
    }

    pub fn vertex_centroid(&self) -> Option<[f64; 2]> {
        metrics::vertex_centroid(&self.exterior)
    }

    /// Area-weighted centroid; `None` for zero-area outlines.
    pub fn area_centroid(&self) -> Option<[f64; 2]> {
        metrics::area_centroid(&self.exterior)
    }

    /// Exterior ring with the first vertex repeated at the end.
    pub fn closed_ring(&self) -> Vec<[f64; 2]> {
        let mut ring = self.exterior.clone();
        if let Some(&first) = self.exterior.first() {
            ring.push(first);
        }
        ring
    }
}

/// Rebuilds face polygons and normalizes them to geographic WGS84.
#[derive(Debug, Clone, Copy)]
pub struct PolygonReconstructor {
    transformer: Transformer,
}

impl PolygonReconstructor {
    /// Resolve the source CRS from a declaration.
    ///
    /// A geographic indicator is trusted as-is; otherwise the declared code
    /// must resolve, and coordinates are reprojected. There is no default.
    pub fn new(declaration: &CrsDeclaration) -> Result<Self, MeshError> {
        let source = declaration.resolve()?;
        Ok(Self::for_crs(source))
    }

    /// Reconstructor for coordinates already known to be in `source`.
    pub fn for_crs(source: Crs) -> Self {
        Self {
            transformer: Transformer::new(source, Crs::Wgs84),
        }
    }

    pub fn source_crs(&self) -> Crs {
        self.transformer.source()
    }

    /// Rebuild one polygon per usable face row.
    pub fn reconstruct(
        &self,
        node_x: &[f64],
        node_y: &[f64],
        face_nodes: &[Vec<i64>],
        fill_value: i64,
        start_index: i64,
    ) -> Result<Vec<FacePolygon>, MeshError> {
        if node_x.len() != node_y.len() {
            return Err(MeshError::LengthMismatch {
                field: "node_y",
                expected: node_x.len(),
                found: node_y.len(),
            });
        }
        let mut polygons = Vec::with_capacity(face_nodes.len());
        let mut skipped = 0usize;
        for (face, row) in face_nodes.iter().enumerate() {
            let entries = valid_row_entries(face, row, fill_value, start_index, node_x.len())?;
            let raw: Vec<[f64; 2]> = entries
                .iter()
                .map(|&n| [node_x[n], node_y[n]])
                .filter(|p| p[0].is_finite() && p[1].is_finite())
                .collect();
            if raw.len() < MIN_FACE_NODES {
                log::warn!(
                    "reconstruct: face {face} has {} valid vertices, skipping",
                    raw.len()
                );
                skipped += 1;
                continue;
            }
            let exterior = raw
                .into_iter()
                .map(|[x, y]| self.transformer.transform_point(x, y).map(|(lon, lat)| [lon, lat]))
                .collect::<Result<Vec<_>, _>>()?;
            polygons.push(FacePolygon { face, exterior });
        }
        log::debug!(
            "reconstruct: {} polygons from {} rows ({skipped} skipped) in {}",
            polygons.len(),
            face_nodes.len(),
            self.source_crs()
        );
        Ok(polygons)
    }

    /// Reconstruct a stored dataset, resolving its own CRS declaration.
    pub fn from_dataset(dataset: &UgridDataset) -> Result<Vec<FacePolygon>, MeshError> {
        dataset.validate()?;
        Self::new(&dataset.crs)?.reconstruct(
            &dataset.node_x,
            &dataset.node_y,
            &dataset.face_nodes,
            dataset.topology.fill_value,
            dataset.topology.start_index,
        )
    }

    /// Reconstruct an in-memory topology.
    pub fn from_topology(topology: &MeshTopology) -> Result<Vec<FacePolygon>, MeshError> {
        let reconstructor = Self::for_crs(topology.crs());
        let (node_x, node_y) = topology.node_coordinates();
        topology
            .faces()
            .iter()
            .enumerate()
            .map(|(face, f)| -> Result<FacePolygon, MeshError> {
                let exterior = f
                    .nodes
                    .iter()
                    .map(|&n| {
                        reconstructor
                            .transformer
                            .transform_point(node_x[n], node_y[n])
                            .map(|(lon, lat)| [lon, lat])
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(FacePolygon { face, exterior })
            })
            .collect()
    }
}
