/// Mean Earth radius in kilometers, as used by the haversine formula.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometers between two points given as
/// (latitude, longitude) pairs in degrees.
///
/// Uses the haversine formula in its atan2 form, which stays numerically
/// stable for near-antipodal points.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_phi = (lat2 - lat1).to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}
