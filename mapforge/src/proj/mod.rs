//! Coordinate reference systems and reprojection
//!
//! The core treats reprojection as an opaque collaborator: everything
//! downstream of the [`Reproject`] trait works with whatever implementation
//! the caller supplies. The built-in [`KrugerReprojector`] covers the CRSs
//! a map run actually touches (geographic WGS84, a transverse Mercator
//! working projection including UTM zones, and spherical web Mercator for
//! tiled imagery services) so no external geodesy toolchain is required.

mod ellipsoid;
mod tmerc;

pub use ellipsoid::{Ellipsoid, WGS84};
pub use tmerc::TransverseMercator;

use thiserror::Error;

use crate::geometry::{GeoBounds, Point};

/// Mean equatorial radius used by spherical web Mercator, in metres.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Errors from coordinate transforms.
#[derive(Debug, Clone, Error)]
pub enum ProjError {
    /// Latitude outside the projectable domain of the target CRS.
    #[error("latitude {0} is outside the projectable domain")]
    LatitudeOutOfRange(f64),

    /// A UTM zone outside 1..=60.
    #[error("invalid UTM zone {0}")]
    InvalidZone(u8),
}

/// A coordinate reference system, as a tagged value.
///
/// Geographic coordinates are (longitude, latitude) degree pairs; projected
/// coordinates are (easting, northing) metre pairs.
#[derive(Clone, Debug, PartialEq)]
pub enum Crs {
    Wgs84,
    TransverseMercator {
        central_meridian: f64,
        scale_factor: f64,
        false_easting: f64,
        false_northing: f64,
    },
    Utm {
        zone: u8,
        south: bool,
    },
    WebMercator,
}

impl Crs {
    pub fn wgs84() -> Self {
        Crs::Wgs84
    }

    /// A transverse Mercator centred on `central_meridian`, with the
    /// southern-hemisphere false origin the original mapping services use.
    pub fn transverse_mercator(central_meridian: f64, scale_factor: f64) -> Self {
        Crs::TransverseMercator {
            central_meridian,
            scale_factor,
            false_easting: 500_000.0,
            false_northing: 10_000_000.0,
        }
    }

    pub fn utm(zone: u8, south: bool) -> Self {
        Crs::Utm { zone, south }
    }

    pub fn web_mercator() -> Self {
        Crs::WebMercator
    }

    /// The UTM zone containing a WGS84 point.
    pub fn utm_zone_for(point: Point) -> u8 {
        (((point.x + 180.0) / 6.0).floor() as i32).clamp(0, 59) as u8 + 1
    }

    pub fn is_geographic(&self) -> bool {
        matches!(self, Crs::Wgs84)
    }
}

impl std::fmt::Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Crs::Wgs84 => write!(f, "+proj=longlat +datum=WGS84 +no_defs"),
            Crs::TransverseMercator {
                central_meridian,
                scale_factor,
                false_easting,
                false_northing,
            } => write!(
                f,
                "+proj=tmerc +lat_0=0.0 +lon_0={central_meridian} +k={scale_factor} \
                 +x_0={false_easting} +y_0={false_northing} +datum=WGS84 +units=m"
            ),
            Crs::Utm { zone, south } => write!(
                f,
                "+proj=utm +zone={zone}{} +datum=WGS84 +units=m +no_defs",
                if *south { " +south" } else { "" }
            ),
            Crs::WebMercator => write!(
                f,
                "+proj=merc +a={EARTH_RADIUS} +b={EARTH_RADIUS} +units=m +no_defs"
            ),
        }
    }
}

/// Opaque reprojection collaborator.
///
/// Implementations must preserve input ordering and length and be free of
/// side effects.
pub trait Reproject {
    /// Reprojects `points` from `source` to `target`.
    fn reproject(&self, source: &Crs, target: &Crs, points: &[Point])
        -> Result<Vec<Point>, ProjError>;

    /// Reprojects a single point.
    fn reproject_point(&self, source: &Crs, target: &Crs, point: Point) -> Result<Point, ProjError> {
        let projected = self.reproject(source, target, &[point])?;
        Ok(projected[0])
    }

    /// Transforms an axis-aligned envelope by reprojecting its corner
    /// products and taking the per-axis extremes in the target CRS.
    fn transform_bounds(
        &self,
        source: &Crs,
        target: &Crs,
        bounds: &GeoBounds,
    ) -> Result<GeoBounds, ProjError> {
        let corners = self.reproject(source, target, &bounds.corners())?;
        Ok(GeoBounds::around(&corners).expect("four corners always produce bounds"))
    }
}

/// Built-in reprojector routing every transform through geodetic WGS84.
///
/// Transverse Mercator legs use the Krüger series ([`TransverseMercator`]);
/// web Mercator legs are closed-form spherical.
#[derive(Clone, Copy, Debug, Default)]
pub struct KrugerReprojector;

impl KrugerReprojector {
    pub fn new() -> Self {
        Self
    }

    fn tmerc_for(crs: &Crs) -> Option<TransverseMercator> {
        match *crs {
            Crs::TransverseMercator {
                central_meridian,
                scale_factor,
                false_easting,
                false_northing,
            } => Some(TransverseMercator::new(
                central_meridian,
                scale_factor,
                false_easting,
                false_northing,
            )),
            Crs::Utm { zone, south } => {
                let central_meridian = (zone as f64 - 1.0) * 6.0 - 180.0 + 3.0;
                Some(TransverseMercator::new(
                    central_meridian,
                    0.9996,
                    500_000.0,
                    if south { 10_000_000.0 } else { 0.0 },
                ))
            }
            _ => None,
        }
    }

    fn to_geographic(crs: &Crs, p: Point) -> Result<Point, ProjError> {
        match crs {
            Crs::Wgs84 => Ok(p),
            Crs::WebMercator => {
                let lon = (p.x / EARTH_RADIUS).to_degrees();
                let lat = (p.y / EARTH_RADIUS).sinh().atan().to_degrees();
                Ok(Point::new(lon, lat))
            }
            _ => {
                let tmerc = Self::tmerc_for(crs).expect("projected CRS");
                let (lon, lat) = tmerc.inverse(p.x, p.y)?;
                Ok(Point::new(lon, lat))
            }
        }
    }

    fn from_geographic(crs: &Crs, p: Point) -> Result<Point, ProjError> {
        match crs {
            Crs::Wgs84 => Ok(p),
            Crs::WebMercator => {
                if !(-90.0..=90.0).contains(&p.y) || p.y.abs() >= 89.9999 {
                    return Err(ProjError::LatitudeOutOfRange(p.y));
                }
                let x = EARTH_RADIUS * p.x.to_radians();
                let y = EARTH_RADIUS * p.y.to_radians().tan().asinh();
                Ok(Point::new(x, y))
            }
            _ => {
                let tmerc = Self::tmerc_for(crs).expect("projected CRS");
                let (x, y) = tmerc.forward(p.x, p.y)?;
                Ok(Point::new(x, y))
            }
        }
    }
}

impl Reproject for KrugerReprojector {
    fn reproject(
        &self,
        source: &Crs,
        target: &Crs,
        points: &[Point],
    ) -> Result<Vec<Point>, ProjError> {
        for crs in [source, target] {
            if let Crs::Utm { zone, .. } = *crs {
                if !(1..=60).contains(&zone) {
                    return Err(ProjError::InvalidZone(zone));
                }
            }
        }
        if source == target {
            return Ok(points.to_vec());
        }
        points
            .iter()
            .map(|&p| {
                let geographic = Self::to_geographic(source, p)?;
                Self::from_geographic(target, geographic)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_identity_when_crs_match() {
        let reprojector = KrugerReprojector::new();
        let points = vec![Point::new(151.0, -33.0), Point::new(150.5, -33.5)];
        let out = reprojector
            .reproject(&Crs::wgs84(), &Crs::wgs84(), &points)
            .unwrap();
        assert_eq!(out, points);
    }

    #[test]
    fn test_preserves_order_and_length() {
        let reprojector = KrugerReprojector::new();
        let points: Vec<Point> = (0..5)
            .map(|i| Point::new(150.0 + 0.1 * i as f64, -33.0 - 0.1 * i as f64))
            .collect();
        let working = Crs::transverse_mercator(150.2, 1.0);
        let out = reprojector
            .reproject(&Crs::wgs84(), &working, &points)
            .unwrap();
        assert_eq!(out.len(), points.len());
        // Longitude increases west→east, so eastings must too.
        for pair in out.windows(2) {
            assert!(pair[1].x > pair[0].x);
        }
    }

    #[test]
    fn test_wgs84_to_web_mercator_roundtrip() {
        let reprojector = KrugerReprojector::new();
        let point = Point::new(151.2, -33.87);
        let projected = reprojector
            .reproject_point(&Crs::wgs84(), &Crs::web_mercator(), point)
            .unwrap();
        let back = reprojector
            .reproject_point(&Crs::web_mercator(), &Crs::wgs84(), projected)
            .unwrap();
        assert_relative_eq!(back.x, point.x, epsilon = 1e-9);
        assert_relative_eq!(back.y, point.y, epsilon = 1e-9);
    }

    #[test]
    fn test_web_mercator_equator_scale() {
        let reprojector = KrugerReprojector::new();
        let projected = reprojector
            .reproject_point(&Crs::wgs84(), &Crs::web_mercator(), Point::new(180.0, 0.0))
            .unwrap();
        assert_relative_eq!(projected.x, PI * EARTH_RADIUS, epsilon = 1e-6);
        assert_relative_eq!(projected.y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_tmerc_to_web_mercator_via_hub() {
        let reprojector = KrugerReprojector::new();
        let working = Crs::transverse_mercator(151.0, 1.0);
        let wgs84_point = Point::new(151.3, -33.5);
        let projected = reprojector
            .reproject_point(&Crs::wgs84(), &working, wgs84_point)
            .unwrap();
        let mercator = reprojector
            .reproject_point(&working, &Crs::web_mercator(), projected)
            .unwrap();
        let direct = reprojector
            .reproject_point(&Crs::wgs84(), &Crs::web_mercator(), wgs84_point)
            .unwrap();
        assert_relative_eq!(mercator.x, direct.x, epsilon = 1e-6);
        assert_relative_eq!(mercator.y, direct.y, epsilon = 1e-6);
    }

    #[test]
    fn test_transform_bounds_extremes() {
        let reprojector = KrugerReprojector::new();
        let bounds = GeoBounds::new(Point::new(150.8, -34.0), Point::new(151.4, -33.4));
        let working = Crs::transverse_mercator(151.1, 1.0);
        let projected = reprojector
            .transform_bounds(&Crs::wgs84(), &working, &bounds)
            .unwrap();
        assert!(projected.width() > 0.0);
        assert!(projected.height() > 0.0);
        // Roughly 0.6° of longitude at -33.7° ≈ 55 km.
        assert!((projected.width() - 55_000.0).abs() < 3_000.0);
    }

    #[test]
    fn test_utm_zone_lookup() {
        assert_eq!(Crs::utm_zone_for(Point::new(151.2, -33.9)), 56);
        assert_eq!(Crs::utm_zone_for(Point::new(-74.0, 40.7)), 18);
    }

    #[test]
    fn test_invalid_utm_zone_rejected() {
        let reprojector = KrugerReprojector::new();
        let result = reprojector.reproject(
            &Crs::utm(61, true),
            &Crs::wgs84(),
            &[Point::new(500_000.0, 6_000_000.0)],
        );
        assert!(matches!(result, Err(ProjError::InvalidZone(61))));
    }
}
