//! Ship-relative geometry: distance, bearing, and watch-circle containment.
//!
//! Every operation is a pure function of its arguments. There is no notion
//! of a "current" ship position; callers pass both points explicitly.
//!
//! Three distance methods are available:
//!
//! - [`DistanceMethod::GreatCircle`]: haversine on a sphere of radius 6 371 km.
//! - [`DistanceMethod::PlanarEuclidean`]: straight line between UTM coordinates.
//! - [`DistanceMethod::PlanarManhattan`]: taxicab distance between UTM coordinates.
//!
//! The planar methods project both points into the UTM zone selected from the
//! first point's longitude (see [`utm::utm_zone`]). Zone selection only covers
//! the Pacific Northwest operating region (zones 8 to 10).

pub mod utm;

use serde::{Deserialize, Serialize};

use utm::{project, utm_zone};

/// Mean Earth radius used by the great-circle method.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Errors raised for input that cannot describe a point or a watch circle.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum GeoError {
    #[error("invalid argument: latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("invalid argument: longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),

    #[error("invalid argument: radius {0} must be a finite number of meters greater than zero")]
    InvalidRadius(f64),
}

pub type Result<T> = core::result::Result<T, GeoError>;

/// A position on the WGS84 globe, in decimal degrees.
///
/// Construction validates the ranges, so every `GeoPoint` in existence
/// is usable by the distance and bearing functions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Creates a point, rejecting non-finite or out-of-range coordinates.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(self) -> f64 {
        self.latitude
    }

    pub fn longitude(self) -> f64 {
        self.longitude
    }
}

/// How distance between two points is measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DistanceMethod {
    /// Haversine distance along the surface of a sphere.
    #[default]
    GreatCircle,

    /// Straight-line distance between UTM coordinates.
    PlanarEuclidean,

    /// Sum of easting and northing differences between UTM coordinates.
    PlanarManhattan,
}

/// Distance and initial bearing from one point to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeAndBearing {
    /// Whole meters, truncated.
    pub distance_meters: u64,

    /// Whole degrees clockwise from true north, in `0..360`.
    pub bearing_degrees: u16,
}

/// A circular radius around a center point, measured with a fixed method.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchCircle {
    pub center: GeoPoint,
    pub radius_meters: f64,
    pub method: DistanceMethod,
}

impl WatchCircle {
    /// Creates a watch circle. The radius must be finite and positive.
    pub fn new(center: GeoPoint, radius_meters: f64, method: DistanceMethod) -> Result<Self> {
        if !radius_meters.is_finite() || radius_meters <= 0.0 {
            return Err(GeoError::InvalidRadius(radius_meters));
        }
        Ok(Self {
            center,
            radius_meters,
            method,
        })
    }

    /// Whether `point` lies on or inside the circle.
    ///
    /// Uses the same truncated distance that [`compute_distance`] reports,
    /// so containment and reported distance never disagree.
    #[allow(clippy::cast_precision_loss)]
    pub fn contains(&self, point: GeoPoint) -> bool {
        compute_distance(self.center, point, self.method) as f64 <= self.radius_meters
    }
}

/// Distance in whole meters between two points.
///
/// The fractional part is discarded, not rounded. Coincident points are
/// always 0 apart under every method.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn compute_distance(from: GeoPoint, to: GeoPoint, method: DistanceMethod) -> u64 {
    let meters = match method {
        DistanceMethod::GreatCircle => haversine(from, to),
        DistanceMethod::PlanarEuclidean => {
            let (dx, dy) = planar_offsets(from, to);
            dx.hypot(dy)
        }
        DistanceMethod::PlanarManhattan => {
            let (dx, dy) = planar_offsets(from, to);
            dx.abs() + dy.abs()
        }
    };
    meters.trunc() as u64
}

/// Initial bearing from `from` to `to`, in whole degrees clockwise from north.
///
/// 0 is north, 90 east, 180 south, 270 west. The bearing between
/// coincident points is 0, including two points on the same pole whose
/// longitudes differ.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn compute_bearing(from: GeoPoint, to: GeoPoint) -> u16 {
    if same_position(from, to) {
        return 0;
    }

    let phi1 = from.latitude.to_radians();
    let phi2 = to.latitude.to_radians();
    let delta_lambda = (to.longitude - from.longitude).to_radians();

    let y = delta_lambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    let degrees = y.atan2(x).to_degrees().rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    (degrees.trunc() as u16) % 360
}

/// Whether `to` lies within `radius_meters` of `from`.
///
/// Equivalent to `compute_distance(from, to, method) <= radius_meters`.
pub fn is_within_radius(
    from: GeoPoint,
    to: GeoPoint,
    radius_meters: f64,
    method: DistanceMethod,
) -> Result<bool> {
    Ok(WatchCircle::new(from, radius_meters, method)?.contains(to))
}

/// Distance and bearing from `from` to `to` in one call.
pub fn range_and_bearing(from: GeoPoint, to: GeoPoint, method: DistanceMethod) -> RangeAndBearing {
    RangeAndBearing {
        distance_meters: compute_distance(from, to, method),
        bearing_degrees: compute_bearing(from, to),
    }
}

fn haversine(from: GeoPoint, to: GeoPoint) -> f64 {
    let phi1 = from.latitude.to_radians();
    let phi2 = to.latitude.to_radians();
    let delta_phi = phi2 - phi1;
    let delta_lambda = (to.longitude - from.longitude).to_radians();

    // Rounding can push `a` just past 1 for near-antipodal points.
    let a = ((delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2))
    .clamp(0.0, 1.0);
    2.0 * EARTH_RADIUS_METERS * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Longitude is meaningless at the poles.
#[allow(clippy::float_cmp)]
fn same_position(a: GeoPoint, b: GeoPoint) -> bool {
    a == b || (a.latitude == b.latitude && a.latitude.abs() == 90.0)
}

/// Easting and northing differences, both points in `from`'s zone.
fn planar_offsets(from: GeoPoint, to: GeoPoint) -> (f64, f64) {
    let zone = utm_zone(from.longitude);
    let a = project(from, zone);
    let b = project(to, zone);
    (b.easting - a.easting, b.northing - a.northing)
}
