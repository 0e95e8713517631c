#![allow(dead_code)]

use solarsite::geo::EARTH_RADIUS_KM;
use solarsite::persist::{PersistenceMode, SqliteStore};
use solarsite::record::NewRecord;

pub const ORIGIN: (f64, f64) = (25.0, -80.0);

/// Latitude of the point `km` due north of `latitude` along a meridian.
pub fn north_of(latitude: f64, km: f64) -> f64 {
    latitude + (km / EARTH_RADIUS_KM).to_degrees()
}

/// Point reached from (lat, lon) after `km` on initial `bearing` degrees,
/// with the longitude normalised to [-180, 180].
pub fn destination(lat: f64, lon: f64, bearing: f64, km: f64) -> (f64, f64) {
    let delta = km / EARTH_RADIUS_KM;
    let (phi1, lambda1, theta) = (lat.to_radians(), lon.to_radians(), bearing.to_radians());
    let phi2 = (phi1.sin() * delta.cos() + phi1.cos() * delta.sin() * theta.cos()).asin();
    let lambda2 = lambda1
        + (theta.sin() * delta.sin() * phi1.cos()).atan2(delta.cos() - phi1.sin() * phi2.sin());
    let mut lon2 = lambda2.to_degrees();
    while lon2 > 180.0 {
        lon2 -= 360.0;
    }
    while lon2 < -180.0 {
        lon2 += 360.0;
    }
    (phi2.to_degrees(), lon2)
}

pub fn store_with(records: Vec<NewRecord>) -> SqliteStore {
    let store = SqliteStore::open(PersistenceMode::InMemory).unwrap();
    for record in &records {
        store.insert(record).unwrap();
    }
    store
}

/// A parcel `km` due north of [`ORIGIN`].
pub fn parcel_north(address: &str, km: f64) -> NewRecord {
    NewRecord::new(address, north_of(ORIGIN.0, km), ORIGIN.1)
}
