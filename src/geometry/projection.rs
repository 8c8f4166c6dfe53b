//! Pure-Rust map projections on the WGS84 ellipsoid.
//!
//! Two projected systems are supported:
//! - Universal Transverse Mercator (series expansion after Snyder, USGS PP 1395).
//!   Sub-millimetre accurate inside a zone and usable a few zones beyond it.
//! - Web Mercator (EPSG:3857), spherical, for tile-aligned visualization inputs.
//!
//! All angles in the public API are degrees; projected coordinates are metres.

use crate::mesh_error::MeshError;
use std::f64::consts::PI;

/// Reference ellipsoid given by semi-major axis and flattening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major axis (m).
    pub a: f64,
    /// Flattening.
    pub f: f64,
}

impl Ellipsoid {
    /// WGS84 (EPSG:7030).
    pub const WGS84: Self = Self {
        a: 6_378_137.0,
        f: 1.0 / 298.257_223_563,
    };

    /// First eccentricity squared, `e² = 2f - f²`.
    #[inline]
    pub fn e2(&self) -> f64 {
        self.f * (2.0 - self.f)
    }

    /// Second eccentricity squared, `e'² = e² / (1 - e²)`.
    #[inline]
    pub fn ep2(&self) -> f64 {
        let e2 = self.e2();
        e2 / (1.0 - e2)
    }
}

/// UTM scale factor on the central meridian.
pub const UTM_SCALE_FACTOR: f64 = 0.9996;
/// UTM false easting (m).
pub const UTM_FALSE_EASTING: f64 = 500_000.0;
/// UTM false northing for southern-hemisphere zones (m).
pub const UTM_FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// Web Mercator sphere radius (WGS84 semi-major axis).
pub const WEB_MERCATOR_RADIUS: f64 = Ellipsoid::WGS84.a;
/// Latitude limit of the Web Mercator square world.
pub const WEB_MERCATOR_MAX_LAT: f64 = 85.051_128_779_806_6;

/// Central meridian (degrees) of a UTM zone.
#[inline]
pub fn utm_central_meridian(zone: u8) -> f64 {
    f64::from(zone) * 6.0 - 183.0
}

/// UTM zone (1..=60) containing `lon`.
pub fn utm_zone_for(lon: f64) -> u8 {
    let wrapped = (lon + 180.0).rem_euclid(360.0);
    ((wrapped / 6.0).floor() as u8 + 1).clamp(1, 60)
}

fn check_geographic(lon: f64, lat: f64) -> Result<(), MeshError> {
    if !lon.is_finite() || !lat.is_finite() {
        return Err(MeshError::Projection {
            x: lon,
            y: lat,
            reason: "non-finite coordinate".into(),
        });
    }
    if !(-90.0..=90.0).contains(&lat) {
        return Err(MeshError::Projection {
            x: lon,
            y: lat,
            reason: format!("latitude {lat} outside [-90, 90]"),
        });
    }
    Ok(())
}

fn check_finite(x: f64, y: f64) -> Result<(), MeshError> {
    if x.is_finite() && y.is_finite() {
        Ok(())
    } else {
        Err(MeshError::Projection {
            x,
            y,
            reason: "non-finite coordinate".into(),
        })
    }
}

/// Meridional arc length from the equator to latitude `phi` (radians).
fn meridian_arc(ell: &Ellipsoid, phi: f64) -> f64 {
    let e2 = ell.e2();
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    ell.a
        * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
            - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
            + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
            - (35.0 * e6 / 3072.0) * (6.0 * phi).sin())
}

/// Geographic (lon, lat) → UTM (easting, northing) for the given zone.
pub fn geographic_to_utm(lon: f64, lat: f64, zone: u8, north: bool) -> Result<(f64, f64), MeshError> {
    check_geographic(lon, lat)?;
    let ell = Ellipsoid::WGS84;
    let e2 = ell.e2();
    let ep2 = ell.ep2();
    let k0 = UTM_SCALE_FACTOR;

    let phi = lat.to_radians();
    let dlam = (lon - utm_central_meridian(zone)).to_radians();
    let (sin_phi, cos_phi) = phi.sin_cos();
    let tan_phi = phi.tan();

    let n = ell.a / (1.0 - e2 * sin_phi * sin_phi).sqrt();
    let t = tan_phi * tan_phi;
    let c = ep2 * cos_phi * cos_phi;
    let a = dlam * cos_phi;
    let m = meridian_arc(&ell, phi);

    let a2 = a * a;
    let a3 = a2 * a;
    let a4 = a3 * a;
    let a5 = a4 * a;
    let a6 = a5 * a;

    let easting = k0
        * n
        * (a + (1.0 - t + c) * a3 / 6.0
            + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a5 / 120.0)
        + UTM_FALSE_EASTING;
    let mut northing = k0
        * (m + n
            * tan_phi
            * (a2 / 2.0
                + (5.0 - t + 9.0 * c + 4.0 * c * c) * a4 / 24.0
                + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a6 / 720.0));
    if !north {
        northing += UTM_FALSE_NORTHING_SOUTH;
    }
    Ok((easting, northing))
}

/// UTM (easting, northing) → geographic (lon, lat) for the given zone.
pub fn utm_to_geographic(
    easting: f64,
    northing: f64,
    zone: u8,
    north: bool,
) -> Result<(f64, f64), MeshError> {
    check_finite(easting, northing)?;
    let ell = Ellipsoid::WGS84;
    let e2 = ell.e2();
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    let ep2 = ell.ep2();
    let k0 = UTM_SCALE_FACTOR;

    let x = easting - UTM_FALSE_EASTING;
    let y = if north {
        northing
    } else {
        northing - UTM_FALSE_NORTHING_SOUTH
    };

    let m = y / k0;
    let mu = m / (ell.a * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));
    let s = (1.0 - e2).sqrt();
    let e1 = (1.0 - s) / (1.0 + s);
    let e1_2 = e1 * e1;
    let e1_3 = e1_2 * e1;
    let e1_4 = e1_3 * e1;

    let phi1 = mu
        + (3.0 * e1 / 2.0 - 27.0 * e1_3 / 32.0) * (2.0 * mu).sin()
        + (21.0 * e1_2 / 16.0 - 55.0 * e1_4 / 32.0) * (4.0 * mu).sin()
        + (151.0 * e1_3 / 96.0) * (6.0 * mu).sin()
        + (1097.0 * e1_4 / 512.0) * (8.0 * mu).sin();

    let (sin1, cos1) = phi1.sin_cos();
    let tan1 = phi1.tan();
    let c1 = ep2 * cos1 * cos1;
    let t1 = tan1 * tan1;
    let denom = 1.0 - e2 * sin1 * sin1;
    let n1 = ell.a / denom.sqrt();
    let r1 = ell.a * (1.0 - e2) / denom.powf(1.5);
    let d = x / (n1 * k0);

    let d2 = d * d;
    let d3 = d2 * d;
    let d4 = d3 * d;
    let d5 = d4 * d;
    let d6 = d5 * d;

    let phi = phi1
        - (n1 * tan1 / r1)
            * (d2 / 2.0
                - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d4 / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * ep2 - 3.0 * c1 * c1)
                    * d6
                    / 720.0);
    let lam = (d - (1.0 + 2.0 * t1 + c1) * d3 / 6.0
        + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1) * d5 / 120.0)
        / cos1;

    Ok((
        utm_central_meridian(zone) + lam.to_degrees(),
        phi.to_degrees(),
    ))
}

/// Geographic (lon, lat) → Web Mercator (x, y). Latitude is clamped to the
/// Web Mercator world square.
pub fn geographic_to_web_mercator(lon: f64, lat: f64) -> Result<(f64, f64), MeshError> {
    check_geographic(lon, lat)?;
    let lat = lat.clamp(-WEB_MERCATOR_MAX_LAT, WEB_MERCATOR_MAX_LAT);
    let x = WEB_MERCATOR_RADIUS * lon.to_radians();
    let y = WEB_MERCATOR_RADIUS * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln();
    Ok((x, y))
}

/// Web Mercator (x, y) → geographic (lon, lat).
pub fn web_mercator_to_geographic(x: f64, y: f64) -> Result<(f64, f64), MeshError> {
    check_finite(x, y)?;
    let lon = (x / WEB_MERCATOR_RADIUS).to_degrees();
    let lat = (2.0 * (y / WEB_MERCATOR_RADIUS).exp().atan() - PI / 2.0).to_degrees();
    Ok((lon, lat))
}
