//! Spherical-earth geometry used by the engine.
//!
//! Two pieces live here: the exact great-circle distance used for the final
//! radius cut and for proximity ordering, and the cheap latitude/longitude
//! rectangle handed to the store as a prefilter. The rectangle only has to
//! be a superset of the circle; the distance decides.

use serde::Serialize;

/// Mean earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Approximate length of one degree of latitude, rounded down so the
/// derived box errs on the wide side.
pub const KM_PER_DEGREE: f64 = 111.0;

// floor for cos(latitude) so the longitude span stays finite at the poles
const MIN_COS_LATITUDE: f64 = 0.0001;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Both components finite and inside their degree ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        haversine_km(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

/// Haversine distance in kilometers between two points given in degrees.
///
/// The intermediate term is clamped to [0, 1] so rounding near antipodal or
/// coincident points can never produce NaN.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let d_phi = phi2 - phi1;
    let d_lambda = (lon2 - lon1).to_radians();
    let a = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.clamp(0.0, 1.0).sqrt().asin()
}

/// Inclusive latitude/longitude rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl BoundingBox {
    /// Rectangle around `origin` containing every point within `radius_km`.
    ///
    /// Latitude half-height is `r / 111`, longitude half-width is
    /// `r / (111 * cos(lat))`. Callers wanting a hard cutoff pass an
    /// inflated radius. When the span reaches a pole or crosses the
    /// antimeridian the longitude range opens to the full circle, since a
    /// single non-wrapping interval could not cover it.
    pub fn around(origin: Coordinate, radius_km: f64) -> Self {
        let radius_km = radius_km.max(0.0);
        let lat_delta = radius_km / KM_PER_DEGREE;
        let cos_lat = origin.latitude.to_radians().cos().max(MIN_COS_LATITUDE);
        let lon_delta = radius_km / (KM_PER_DEGREE * cos_lat);

        let min_latitude = origin.latitude - lat_delta;
        let max_latitude = origin.latitude + lat_delta;
        let mut min_longitude = origin.longitude - lon_delta;
        let mut max_longitude = origin.longitude + lon_delta;

        let reaches_pole = min_latitude <= -90.0 || max_latitude >= 90.0;
        let wraps = min_longitude < -180.0 || max_longitude > 180.0;
        if reaches_pole || wraps {
            min_longitude = -180.0;
            max_longitude = 180.0;
        }

        Self {
            min_latitude: min_latitude.max(-90.0),
            max_latitude: max_latitude.min(90.0),
            min_longitude,
            max_longitude,
        }
    }

    pub fn contains(&self, point: &Coordinate) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&point.latitude)
            && (self.min_longitude..=self.max_longitude).contains(&point.longitude)
    }
}
