//! Zone-local transverse Mercator projection on the WGS84 ellipsoid.
//!
//! Forward projection only, using the series expansion from Snyder,
//! *Map Projections: A Working Manual* (USGS PP 1395), eqs. 8-9 to 8-10.
//! Accurate to well under a meter within a few degrees of the central
//! meridian, which is all the planar distance methods need.

use serde::Serialize;

use super::GeoPoint;

/// Scale factor on the central meridian.
pub const SCALE_FACTOR: f64 = 0.9996;

/// Easting assigned to the central meridian.
pub const FALSE_EASTING: f64 = 500_000.0;

const SEMI_MAJOR_AXIS: f64 = 6_378_137.0;
const FLATTENING: f64 = 1.0 / 298.257_223_563;

/// A UTM longitudinal zone number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct UtmZone(u8);

impl UtmZone {
    pub fn number(self) -> u8 {
        self.0
    }

    /// Longitude of the zone's central meridian, in degrees.
    pub fn central_meridian(self) -> f64 {
        f64::from(self.0) * 6.0 - 183.0
    }
}

/// Planar coordinates in meters. Northern hemisphere, so no false northing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UtmCoordinate {
    pub zone: UtmZone,
    pub easting: f64,
    pub northing: f64,
}

/// Select the projection zone for a reference longitude.
///
/// Only zones 8, 9 and 10 are produced. This covers the Pacific Northwest
/// coast and does not follow the global 6° zone grid west of -126°:
///
/// - `longitude >= -126` → zone 10
/// - `-129 < longitude < -126` → zone 9
/// - `longitude <= -129` → zone 8
pub fn utm_zone(longitude: f64) -> UtmZone {
    if longitude >= -126.0 {
        UtmZone(10)
    } else if longitude > -129.0 {
        UtmZone(9)
    } else {
        UtmZone(8)
    }
}

/// Project a point into the given zone.
pub fn project(point: GeoPoint, zone: UtmZone) -> UtmCoordinate {
    let e2 = FLATTENING * (2.0 - FLATTENING);
    let ep2 = e2 / (1.0 - e2);

    let phi = point.latitude().to_radians();
    let lambda = (point.longitude() - zone.central_meridian()).to_radians();
    let (sin_phi, cos_phi) = phi.sin_cos();
    let tan_phi = phi.tan();

    let n = SEMI_MAJOR_AXIS / (1.0 - e2 * sin_phi * sin_phi).sqrt();
    let t = tan_phi * tan_phi;
    let c = ep2 * cos_phi * cos_phi;
    let a = lambda * cos_phi;
    let m = meridional_arc(phi, e2);

    let easting = SCALE_FACTOR
        * n
        * (a + (1.0 - t + c) * a.powi(3) / 6.0
            + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a.powi(5) / 120.0)
        + FALSE_EASTING;

    let northing = SCALE_FACTOR
        * (m + n
            * tan_phi
            * (a * a / 2.0
                + (5.0 - t + 9.0 * c + 4.0 * c * c) * a.powi(4) / 24.0
                + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a.powi(6) / 720.0));

    UtmCoordinate {
        zone,
        easting,
        northing,
    }
}

/// Distance along the meridian from the equator to latitude `phi` (radians).
fn meridional_arc(phi: f64, e2: f64) -> f64 {
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    SEMI_MAJOR_AXIS
        * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
            - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
            + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
            - (35.0 * e6 / 3072.0) * (6.0 * phi).sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    #[test]
    fn zone_boundaries() {
        assert_eq!(utm_zone(-126.0).number(), 10);
        assert_eq!(utm_zone(-126.0001).number(), 9);
        assert_eq!(utm_zone(-129.0).number(), 8);
        assert_eq!(utm_zone(-129.0001).number(), 8);
        assert_eq!(utm_zone(-128.9999).number(), 9);
    }

    #[test]
    fn zones_outside_region_clamp_to_ends() {
        assert_eq!(utm_zone(-124.0451).number(), 10);
        assert_eq!(utm_zone(10.0).number(), 10);
        assert_eq!(utm_zone(-170.0).number(), 8);
    }

    #[test]
    fn central_meridians() {
        assert!((utm_zone(-124.0).central_meridian() - -123.0).abs() < f64::EPSILON);
        assert!((utm_zone(-127.0).central_meridian() - -129.0).abs() < f64::EPSILON);
        assert!((utm_zone(-130.0).central_meridian() - -135.0).abs() < f64::EPSILON);
    }

    #[test]
    fn central_meridian_at_equator_is_false_origin() {
        let c = project(point(0.0, -123.0), utm_zone(-123.0));
        assert!((c.easting - FALSE_EASTING).abs() < 1e-6);
        assert!(c.northing.abs() < 1e-6);
    }

    #[test]
    fn central_meridian_at_45_north() {
        // Scaled WGS84 meridian arc length to 45°.
        let c = project(point(45.0, -123.0), utm_zone(-123.0));
        assert!((c.easting - FALSE_EASTING).abs() < 1e-6);
        assert!((c.northing - 4_982_950.400).abs() < 0.01, "{}", c.northing);
    }

    #[test]
    fn osu_dock_coordinates() {
        let c = project(point(44.6258, -124.0451), utm_zone(-124.0451));
        assert_eq!(c.zone.number(), 10);
        assert!((c.easting - 417_095.685).abs() < 0.01, "{}", c.easting);
        assert!((c.northing - 4_941_914.065).abs() < 0.01, "{}", c.northing);
    }

    #[test]
    fn east_of_central_meridian_increases_easting() {
        let zone = utm_zone(-123.0);
        let west = project(point(45.0, -123.5), zone);
        let east = project(point(45.0, -122.5), zone);
        assert!(west.easting < FALSE_EASTING);
        assert!(east.easting > FALSE_EASTING);
        // Symmetric about the central meridian.
        assert!((FALSE_EASTING - west.easting - (east.easting - FALSE_EASTING)).abs() < 1e-6);
    }
}
