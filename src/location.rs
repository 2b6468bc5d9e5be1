//! One-shot lookup of the user's reference point.
//!
//! Desktop machines have no browser geolocation, so the position comes from
//! an IP geolocation service or from coordinates typed in by the user.
//! Either way a failure is reported as [`LocationError`] and never stops
//! the directory from rendering.

use serde::Deserialize;

use crate::data::geo::GeoPoint;
use crate::error::LocationError;

pub const DEFAULT_ENDPOINT: &str = "https://ipapi.co/json/";

/// Fields understood from common IP geolocation responses
/// (`latitude`/`longitude` or `lat`/`lon`).
#[derive(Debug, Deserialize)]
struct IpLocation {
    latitude: Option<f64>,
    longitude: Option<f64>,
    lat: Option<f64>,
    lon: Option<f64>,
}

/// Ask `endpoint` where this machine is.
pub fn locate_by_ip(endpoint: &str) -> Result<GeoPoint, LocationError> {
    let response = ureq::get(endpoint)
        .set("User-Agent", concat!("zimcare/", env!("CARGO_PKG_VERSION")))
        .call()
        .map_err(|e| LocationError::Network(e.to_string()))?;

    let body = response
        .into_string()
        .map_err(|e| LocationError::InvalidResponse(e.to_string()))?;

    parse_ip_location(&body)
}

pub fn parse_ip_location(body: &str) -> Result<GeoPoint, LocationError> {
    let loc: IpLocation =
        serde_json::from_str(body).map_err(|e| LocationError::InvalidResponse(e.to_string()))?;

    match (loc.latitude.or(loc.lat), loc.longitude.or(loc.lon)) {
        (Some(lat), Some(lon)) => GeoPoint::new(lat, lon).ok_or(LocationError::OutOfRange { lat, lon }),
        _ => Err(LocationError::InvalidResponse(
            "response has no coordinates".to_string(),
        )),
    }
}

/// Coordinates typed by the user, e.g. `-17.83` and `31.05`.
pub fn parse_manual(lat: &str, lon: &str) -> Result<GeoPoint, LocationError> {
    let parse = |field: &str, text: &str| {
        text.trim()
            .parse::<f64>()
            .map_err(|_| LocationError::InvalidInput(format!("{field} {text:?} is not a number")))
    };
    let lat = parse("latitude", lat)?;
    let lon = parse("longitude", lon)?;
    GeoPoint::new(lat, lon).ok_or(LocationError::OutOfRange { lat, lon })
}
