use super::model::FacilityRecord;

/// Mean Earth radius used for great-circle distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS84 position in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    /// Validated constructor: finite and within ±90 / ±180.
    pub fn new(lat: f64, lon: f64) -> Option<Self> {
        let valid = lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon);
        valid.then_some(GeoPoint { lat, lon })
    }
}

/// Haversine great-circle distance in kilometres.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can leave h a hair outside [0, 1] for antipodal points.
    let h = h.clamp(0.0, 1.0);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Unrounded distance from `reference` to the record, if both are known.
pub fn distance_km(record: &FacilityRecord, reference: Option<GeoPoint>) -> Option<f64> {
    Some(haversine_km(reference?, record.coordinates()?))
}

/// One decimal place, for display only. Sorting uses the raw value.
pub fn round_km(km: f64) -> f64 {
    (km * 10.0).round() / 10.0
}

pub fn format_distance(km: f64) -> String {
    format!("{:.1} km", round_km(km))
}
