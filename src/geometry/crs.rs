//! Coordinate reference systems and transforms.
//!
//! Only the systems the mesh pipeline actually needs are modelled:
//! geographic WGS84 (EPSG:4326) for every output boundary, and projected
//! metric systems (UTM zones, Web Mercator) for distance computations.
//! Unknown codes are a [`MeshError::CrsResolution`]; nothing ever falls back
//! to an assumed CRS.

use crate::geometry::projection::{
    geographic_to_utm, geographic_to_web_mercator, utm_to_geographic, utm_zone_for,
    web_mercator_to_geographic,
};
use crate::mesh_error::MeshError;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// EPSG code of geographic WGS84.
pub const EPSG_WGS84: u32 = 4326;
/// EPSG code of Web Mercator.
pub const EPSG_WEB_MERCATOR: u32 = 3857;

/// Coordinate arrays shorter than this are transformed on the calling thread.
const PARALLEL_TRANSFORM_THRESHOLD: usize = 4096;

/// A supported coordinate reference system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Crs {
    /// Geographic WGS84, longitude/latitude in degrees.
    Wgs84,
    /// Spherical Web Mercator, metres.
    WebMercator,
    /// WGS84 / UTM zone, metres.
    Utm { zone: u8, north: bool },
}

impl Crs {
    /// Resolve an EPSG code.
    pub fn from_epsg(code: u32) -> Result<Self, MeshError> {
        match code {
            EPSG_WGS84 => Ok(Crs::Wgs84),
            EPSG_WEB_MERCATOR | 900_913 => Ok(Crs::WebMercator),
            32601..=32660 => Ok(Crs::Utm {
                zone: (code - 32600) as u8,
                north: true,
            }),
            32701..=32760 => Ok(Crs::Utm {
                zone: (code - 32700) as u8,
                north: false,
            }),
            other => Err(MeshError::CrsResolution(format!(
                "unsupported coordinate-system code EPSG:{other}"
            ))),
        }
    }

    /// EPSG code of this CRS.
    pub fn epsg(self) -> u32 {
        match self {
            Crs::Wgs84 => EPSG_WGS84,
            Crs::WebMercator => EPSG_WEB_MERCATOR,
            Crs::Utm { zone, north: true } => 32600 + u32::from(zone),
            Crs::Utm { zone, north: false } => 32700 + u32::from(zone),
        }
    }

    /// `true` for longitude/latitude systems.
    pub fn is_geographic(self) -> bool {
        matches!(self, Crs::Wgs84)
    }

    /// `true` for systems measured in metres.
    pub fn is_projected(self) -> bool {
        !self.is_geographic()
    }

    /// UTM zone containing a geographic position.
    pub fn auto_utm(lon: f64, lat: f64) -> Self {
        Crs::Utm {
            zone: utm_zone_for(lon),
            north: lat >= 0.0,
        }
    }

    /// Convert a coordinate in this CRS to geographic WGS84.
    pub fn to_geographic(self, x: f64, y: f64) -> Result<(f64, f64), MeshError> {
        match self {
            Crs::Wgs84 => Ok((x, y)),
            Crs::WebMercator => web_mercator_to_geographic(x, y),
            Crs::Utm { zone, north } => utm_to_geographic(x, y, zone, north),
        }
    }

    /// Convert a geographic WGS84 coordinate into this CRS.
    pub fn from_geographic(self, lon: f64, lat: f64) -> Result<(f64, f64), MeshError> {
        match self {
            Crs::Wgs84 => Ok((lon, lat)),
            Crs::WebMercator => geographic_to_web_mercator(lon, lat),
            Crs::Utm { zone, north } => geographic_to_utm(lon, lat, zone, north),
        }
    }
}

impl std::fmt::Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

/// How a stored dataset declares its CRS: a geographic indicator, an
/// explicit coordinate-system code, both, or neither.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrsDeclaration {
    /// Set when the producer asserts coordinates are longitude/latitude.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geographic: Option<bool>,
    /// Explicit EPSG code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epsg: Option<u32>,
}

impl CrsDeclaration {
    /// Declaration written for a known CRS.
    pub fn from_crs(crs: Crs) -> Self {
        Self {
            geographic: Some(crs.is_geographic()),
            epsg: Some(crs.epsg()),
        }
    }

    /// Resolve the declared CRS.
    ///
    /// A geographic indicator is trusted as-is. Otherwise the explicit code
    /// must be present and supported.
    pub fn resolve(&self) -> Result<Crs, MeshError> {
        if self.geographic == Some(true) {
            return Ok(Crs::Wgs84);
        }
        match self.epsg {
            Some(code) => Crs::from_epsg(code),
            None => Err(MeshError::CrsResolution(
                "no geographic indicator or coordinate-system code declared".into(),
            )),
        }
    }
}

/// Converts coordinates between two CRSs, pivoting through geographic WGS84.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transformer {
    source: Crs,
    target: Crs,
}

impl Transformer {
    pub fn new(source: Crs, target: Crs) -> Self {
        Self { source, target }
    }

    pub fn source(&self) -> Crs {
        self.source
    }

    pub fn target(&self) -> Crs {
        self.target
    }

    pub fn is_identity(&self) -> bool {
        self.source == self.target
    }

    /// Transform one coordinate.
    pub fn transform_point(&self, x: f64, y: f64) -> Result<(f64, f64), MeshError> {
        if self.is_identity() {
            return Ok((x, y));
        }
        let (lon, lat) = self.source.to_geographic(x, y)?;
        self.target.from_geographic(lon, lat)
    }

    /// Transform aligned coordinate arrays. Large inputs are processed in
    /// parallel chunks; output order always matches input order.
    pub fn transform_slices(&self, xs: &[f64], ys: &[f64]) -> Result<(Vec<f64>, Vec<f64>), MeshError> {
        if xs.len() != ys.len() {
            return Err(MeshError::LengthMismatch {
                field: "y coordinates",
                expected: xs.len(),
                found: ys.len(),
            });
        }
        if self.is_identity() {
            return Ok((xs.to_vec(), ys.to_vec()));
        }
        let pairs: Vec<(f64, f64)> = if xs.len() < PARALLEL_TRANSFORM_THRESHOLD {
            xs.iter()
                .zip(ys)
                .map(|(&x, &y)| self.transform_point(x, y))
                .collect::<Result<_, _>>()?
        } else {
            xs.par_iter()
                .zip(ys.par_iter())
                .with_min_len(1024)
                .map(|(&x, &y)| self.transform_point(x, y))
                .collect::<Result<_, _>>()?
        };
        Ok(pairs.into_iter().unzip())
    }
}

/// Pick the projected CRS used for distance computations.
///
/// An explicit code wins (and must be projected). Otherwise a projected mesh
/// CRS is reused, and a geographic mesh gets the UTM zone of its mean
/// position.
pub fn select_metric_crs(
    mesh_crs: Crs,
    xs: &[f64],
    ys: &[f64],
    explicit: Option<u32>,
) -> Result<Crs, MeshError> {
    if let Some(code) = explicit {
        let crs = Crs::from_epsg(code)?;
        if crs.is_geographic() {
            return Err(MeshError::CrsResolution(format!(
                "EPSG:{code} is geographic; distance computations need a projected CRS"
            )));
        }
        return Ok(crs);
    }
    if mesh_crs.is_projected() {
        return Ok(mesh_crs);
    }
    if xs.is_empty() {
        return Err(MeshError::CrsResolution(
            "cannot derive a metric CRS from an empty coordinate set".into(),
        ));
    }
    let n = xs.len() as f64;
    let lon = xs.iter().sum::<f64>() / n;
    let lat = ys.iter().sum::<f64>() / n;
    Ok(Crs::auto_utm(lon, lat))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epsg_round_trip() {
        for code in [4326, 3857, 32632, 32719] {
            assert_eq!(Crs::from_epsg(code).unwrap().epsg(), code);
        }
        assert!(matches!(
            Crs::from_epsg(2154),
            Err(MeshError::CrsResolution(_))
        ));
    }

    #[test]
    fn geographic_indicator_is_trusted_as_is() {
        let decl = CrsDeclaration {
            geographic: Some(true),
            epsg: Some(32632),
        };
        assert_eq!(decl.resolve().unwrap(), Crs::Wgs84);
    }

    #[test]
    fn missing_declaration_is_an_error() {
        let decl = CrsDeclaration::default();
        assert!(matches!(decl.resolve(), Err(MeshError::CrsResolution(_))));
        let decl = CrsDeclaration {
            geographic: Some(false),
            epsg: None,
        };
        assert!(decl.resolve().is_err());
    }

    #[test]
    fn metric_crs_selection() {
        let crs = select_metric_crs(Crs::Wgs84, &[10.0, 11.0], &[59.0, 60.0], None).unwrap();
        assert_eq!(crs, Crs::Utm { zone: 32, north: true });
        let utm = Crs::Utm { zone: 19, north: false };
        assert_eq!(select_metric_crs(utm, &[], &[], None).unwrap(), utm);
        assert!(select_metric_crs(Crs::Wgs84, &[0.0], &[0.0], Some(4326)).is_err());
    }

    #[test]
    fn transformer_round_trip() {
        let to_utm = Transformer::new(Crs::Wgs84, Crs::Utm { zone: 32, north: true });
        let back = Transformer::new(to_utm.target(), Crs::Wgs84);
        let (xs, ys) = to_utm.transform_slices(&[10.5, 10.6], &[59.9, 60.0]).unwrap();
        let (lon, lat) = back.transform_slices(&xs, &ys).unwrap();
        assert!((lon[0] - 10.5).abs() < 1e-7 && (lat[1] - 60.0).abs() < 1e-7);
    }
}
