//! Great-circle distance and the `"<miles> mi"` distance strings.

use pronto_core::{Coordinates, RestaurantRecord};

const EARTH_RADIUS_KM: f64 = 6371.0;
const KM_TO_MILES: f64 = 0.621_371;
/// Smallest distance ever displayed, so nothing reads `"0.0 mi"`.
const MIN_DISPLAY_MILES: f64 = 0.1;

/// Haversine distance in kilometres between two points in decimal degrees.
#[must_use]
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (lat1, lon1, lat2, lon2) = (
        lat1.to_radians(),
        lon1.to_radians(),
        lat2.to_radians(),
        lon2.to_radians(),
    );
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

#[must_use]
pub fn km_to_miles(km: f64) -> f64 {
    km * KM_TO_MILES
}

/// Formats a mile value with one decimal, clamping anything under 0.1 to `"0.1 mi"`.
#[must_use]
pub fn format_distance_miles(miles: f64) -> String {
    if miles < MIN_DISPLAY_MILES {
        "0.1 mi".to_string()
    } else {
        format!("{miles:.1} mi")
    }
}

/// Parses the leading number of a distance string such as `"2.4 mi"`.
///
/// Anything unparseable (including `"Unknown"` and the empty string) yields `0.0`.
#[must_use]
pub fn distance_value(distance: &str) -> f64 {
    distance
        .split_whitespace()
        .next()
        .and_then(|first| first.parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Recomputes `distance` for every record that has coordinates.
///
/// Records without coordinates keep whatever distance string they already had.
pub fn apply_user_distance(records: &mut [RestaurantRecord], user: Coordinates) {
    for record in records.iter_mut() {
        if let Some(at) = record.coordinates {
            let km = haversine_km(user.latitude, user.longitude, at.latitude, at.longitude);
            record.distance = format_distance_miles(km_to_miles(km));
        }
    }
}
