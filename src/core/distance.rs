use crate::models::GeoPoint;

/// Earth's mean radius in miles
pub const EARTH_RADIUS_MILES: f64 = 3956.0;

/// Calculate the great-circle distance between two points in miles
///
/// Uses the haversine formula. Coordinates are not range-checked; values
/// outside [-90, 90] / [-180, 180] give a defined but meaningless result.
///
/// # Returns
/// Non-negative distance in miles
#[inline]
pub fn distance_miles(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let delta_lat = lat2 - lat1;
    let delta_lon = b.longitude.to_radians() - a.longitude.to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    // Floating point can push h just outside [0, 1] at identical or antipodal points
    let c = 2.0 * h.clamp(0.0, 1.0).sqrt().asin();

    EARTH_RADIUS_MILES * c
}
