//! Inverse-distance-weighted interpolation from scattered points.
//!
//! For every query point the `k` nearest source points are found through an
//! R-tree and combined with weights `1 / (d + ε)²`. A query on top of a
//! source point therefore collapses to that source's value. With `k = 1` the
//! nearest value is returned unchanged.
//!
//! Distances are only meaningful in a projected CRS: use
//! [`interpolate_across_crs`] to bring queries and sources into a shared
//! metric system first.
//!
//! # Example
//! ```rust
//! # fn try_main() -> Result<(), ugrid_mesh::mesh_error::MeshError> {
//! use ugrid_mesh::algs::interpolate::{IdwConfig, IdwInterpolator};
//!
//! let idw = IdwInterpolator::from_slices(
//!     &[0.0, 10.0],
//!     &[0.0, 0.0],
//!     &[10.0, 20.0],
//!     IdwConfig::default(),
//! )?;
//! let v = idw.interpolate_point(5.0, 0.0);
//! assert!((v - 15.0).abs() < 1e-12);
//! # Ok(())
//! # }
//! # try_main().unwrap();
//! ```

use crate::geometry::crs::{Crs, Transformer};
use crate::mesh_error::MeshError;
use rayon::prelude::*;
use rstar::RTree;
use rstar::primitives::GeomWithData;
use serde::{Deserialize, Serialize};

/// Default number of neighbours.
pub const DEFAULT_NEIGHBOR_COUNT: usize = 2;
/// Default distance offset ε.
pub const DEFAULT_EPSILON: f64 = 1e-10;

/// Below this many queries interpolation stays on the calling thread.
const PARALLEL_QUERY_THRESHOLD: usize = 2048;

/// IDW parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdwConfig {
    /// Number of nearest sources per query (k).
    pub neighbor_count: usize,
    /// Offset added to every distance before squaring.
    pub epsilon: f64,
}

impl Default for IdwConfig {
    fn default() -> Self {
        Self {
            neighbor_count: DEFAULT_NEIGHBOR_COUNT,
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl IdwConfig {
    pub fn with_neighbor_count(mut self, k: usize) -> Self {
        self.neighbor_count = k;
        self
    }

    fn validate(&self) -> Result<(), MeshError> {
        if self.neighbor_count == 0 {
            return Err(MeshError::InterpolationInput(
                "neighbor count must be at least 1".into(),
            ));
        }
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(MeshError::InterpolationInput(format!(
                "epsilon must be a positive finite number, got {}",
                self.epsilon
            )));
        }
        Ok(())
    }
}

/// Scattered `(x, y, value)` samples in a declared CRS, e.g. a bathymetry
/// survey. Always holds at least one point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatteredPointSet {
    x: Vec<f64>,
    y: Vec<f64>,
    values: Vec<f64>,
    crs: Crs,
}

impl ScatteredPointSet {
    /// Build from aligned arrays.
    pub fn new(x: Vec<f64>, y: Vec<f64>, values: Vec<f64>, crs: Crs) -> Result<Self, MeshError> {
        check_sources(&x, &y, &values)?;
        Ok(Self { x, y, values, crs })
    }

    /// Build from `(x, y, value)` triples.
    pub fn from_points<I>(points: I, crs: Crs) -> Result<Self, MeshError>
    where
        I: IntoIterator<Item = (f64, f64, f64)>,
    {
        let mut x = Vec::new();
        let mut y = Vec::new();
        let mut values = Vec::new();
        for (px, py, v) in points {
            x.push(px);
            y.push(py);
            values.push(v);
        }
        Self::new(x, y, values, crs)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn crs(&self) -> Crs {
        self.crs
    }

    /// Copy of this set with coordinates expressed in `target`.
    pub fn reprojected(&self, target: Crs) -> Result<Self, MeshError> {
        let (x, y) = Transformer::new(self.crs, target).transform_slices(&self.x, &self.y)?;
        Ok(Self {
            x,
            y,
            values: self.values.clone(),
            crs: target,
        })
    }
}

fn check_sources(x: &[f64], y: &[f64], values: &[f64]) -> Result<(), MeshError> {
    if x.is_empty() {
        return Err(MeshError::InterpolationInput(
            "source point set is empty".into(),
        ));
    }
    if y.len() != x.len() {
        return Err(MeshError::LengthMismatch {
            field: "source y",
            expected: x.len(),
            found: y.len(),
        });
    }
    if values.len() != x.len() {
        return Err(MeshError::LengthMismatch {
            field: "source values",
            expected: x.len(),
            found: values.len(),
        });
    }
    if let Some(i) = x
        .iter()
        .zip(y)
        .position(|(px, py)| !px.is_finite() || !py.is_finite())
    {
        return Err(MeshError::InterpolationInput(format!(
            "source point {i} has a non-finite coordinate"
        )));
    }
    Ok(())
}

type IndexedPoint = GeomWithData<[f64; 2], usize>;

/// k-nearest IDW interpolator over a fixed source set.
#[derive(Debug, Clone)]
pub struct IdwInterpolator {
    tree: RTree<IndexedPoint>,
    values: Vec<f64>,
    config: IdwConfig,
}

impl IdwInterpolator {
    /// Index a source set. Coordinates are taken as-is; make sure they share
    /// the query CRS.
    pub fn new(sources: &ScatteredPointSet, config: IdwConfig) -> Result<Self, MeshError> {
        Self::from_slices(sources.x(), sources.y(), sources.values(), config)
    }

    /// Index aligned source arrays.
    pub fn from_slices(
        x: &[f64],
        y: &[f64],
        values: &[f64],
        config: IdwConfig,
    ) -> Result<Self, MeshError> {
        config.validate()?;
        check_sources(x, y, values)?;
        let points: Vec<IndexedPoint> = x
            .iter()
            .zip(y)
            .enumerate()
            .map(|(i, (&px, &py))| GeomWithData::new([px, py], i))
            .collect();
        Ok(Self {
            tree: RTree::bulk_load(points),
            values: values.to_vec(),
            config,
        })
    }

    pub fn config(&self) -> &IdwConfig {
        &self.config
    }

    pub fn source_count(&self) -> usize {
        self.values.len()
    }

    /// Interpolate a single query point.
    pub fn interpolate_point(&self, x: f64, y: f64) -> f64 {
        let eps = self.config.epsilon;
        let mut neighbors = self
            .tree
            .nearest_neighbor_iter_with_distance_2(&[x, y])
            .take(self.config.neighbor_count)
            .peekable();

        let Some((first, first_d2)) = neighbors.next() else {
            return f64::NAN;
        };
        if neighbors.peek().is_none() {
            return self.values[first.data];
        }

        let mut weight_sum = 0.0;
        let mut value_sum = 0.0;
        for (point, d2) in std::iter::once((first, first_d2)).chain(neighbors) {
            let w = 1.0 / (d2.sqrt() + eps).powi(2);
            weight_sum += w;
            value_sum += w * self.values[point.data];
        }
        value_sum / weight_sum
    }

    /// Interpolate aligned query arrays. Output order matches input order;
    /// large inputs are processed in parallel.
    pub fn interpolate(&self, qx: &[f64], qy: &[f64]) -> Result<Vec<f64>, MeshError> {
        if qx.len() != qy.len() {
            return Err(MeshError::LengthMismatch {
                field: "query y",
                expected: qx.len(),
                found: qy.len(),
            });
        }
        if qx.len() < PARALLEL_QUERY_THRESHOLD {
            return Ok(qx
                .iter()
                .zip(qy)
                .map(|(&x, &y)| self.interpolate_point(x, y))
                .collect());
        }
        Ok(qx
            .par_iter()
            .zip(qy.par_iter())
            .with_min_len(512)
            .map(|(&x, &y)| self.interpolate_point(x, y))
            .collect())
    }
}

/// Interpolate `sources` onto query coordinates given in `query_crs`, doing
/// all distance work in `metric_crs`.
pub fn interpolate_across_crs(
    qx: &[f64],
    qy: &[f64],
    query_crs: Crs,
    sources: &ScatteredPointSet,
    metric_crs: Crs,
    config: IdwConfig,
) -> Result<Vec<f64>, MeshError> {
    if metric_crs.is_geographic() {
        return Err(MeshError::CrsResolution(format!(
            "{metric_crs} is geographic; interpolation distances need a projected CRS"
        )));
    }
    let (mx, my) = Transformer::new(query_crs, metric_crs).transform_slices(qx, qy)?;
    let metric_sources = sources.reprojected(metric_crs)?;
    let idw = IdwInterpolator::new(&metric_sources, config)?;
    log::debug!(
        "idw: {} queries against {} sources in {metric_crs} (k = {})",
        mx.len(),
        idw.source_count(),
        config.neighbor_count
    );
    idw.interpolate(&mx, &my)
}
