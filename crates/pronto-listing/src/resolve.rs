//! Coordinate resolution for restaurants.
//!
//! Strategies run in a fixed order and the first one that produces a pair
//! wins: street-address geocoding, maps-link parsing, the named-area table,
//! and finally the city centre.

use std::future::Future;
use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use pronto_core::{Coordinates, RestaurantRecord, CITY_CENTRE};
use regex::Regex;

static AT_PAIR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([-\d.]+),([-\d.]+)").expect("valid regex"));
static LNG_2D_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!2d([-\d.]+)").expect("valid regex"));
static LAT_3D_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!3d([-\d.]+)").expect("valid regex"));
static DADDR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"daddr=([^&]+)").expect("valid regex"));

/// Street fragments recognised inside `daddr=` maps links (case-sensitive).
const MAPS_STREET_AREAS: [(&str, Coordinates); 5] = [
    ("Pembina", Coordinates::new(49.8155, -97.1531)),
    ("Kenaston", Coordinates::new(49.8372, -97.2055)),
    ("Sterling", Coordinates::new(49.8372, -97.2055)),
    ("Ness", Coordinates::new(49.8788, -97.2210)),
    ("Keenlyside", Coordinates::new(49.9121, -97.0623)),
];

/// Lower-case area names checked in order against a location label.
const NAMED_AREAS: [(&str, Coordinates); 6] = [
    ("pembina", Coordinates::new(49.8155, -97.1531)),
    ("kenaston", Coordinates::new(49.8372, -97.2055)),
    ("sterling", Coordinates::new(49.8372, -97.2055)),
    ("ness", Coordinates::new(49.8788, -97.2210)),
    ("keenlyside", Coordinates::new(49.9121, -97.0623)),
    ("winnipeg", CITY_CENTRE),
];

/// Address-to-coordinate lookup against an external service.
///
/// Implementations swallow their own failures and return `None`; the
/// resolution chain then moves on to the next strategy.
pub trait Geocoder {
    fn geocode(&self, address: &str) -> impl Future<Output = Option<Coordinates>> + Send;
}

/// Geocoder that never resolves; used for fully offline loads.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeocoder;

impl Geocoder for NoGeocoder {
    fn geocode(&self, _address: &str) -> impl Future<Output = Option<Coordinates>> + Send {
        std::future::ready(None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    Geocoded,
    MapsUrl,
    AreaTable,
    CityCentre,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub coordinates: Coordinates,
    pub source: ResolutionSource,
}

/// The record fields the resolvers read.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocationHints<'a> {
    pub address: &'a str,
    pub maps_url: &'a str,
    pub location: &'a str,
}

impl<'a> LocationHints<'a> {
    #[must_use]
    pub fn from_record(record: &'a RestaurantRecord) -> Self {
        Self {
            address: &record.address,
            maps_url: &record.maps_url,
            location: &record.location,
        }
    }
}

type OfflineResolver = fn(&LocationHints<'_>) -> Option<Coordinates>;

const OFFLINE_RESOLVERS: [(ResolutionSource, OfflineResolver); 2] = [
    (ResolutionSource::MapsUrl, |h| {
        coordinates_from_maps_url(h.maps_url)
    }),
    (ResolutionSource::AreaTable, |h| {
        let label = if h.location.trim().is_empty() {
            h.address
        } else {
            h.location
        };
        area_coordinates(label)
    }),
];

/// Runs the resolution chain. Always produces a pair; the city centre is the floor.
pub async fn resolve_coordinates<G: Geocoder + ?Sized>(
    geocoder: &G,
    hints: &LocationHints<'_>,
) -> Resolution {
    if !hints.address.trim().is_empty() {
        if let Some(coordinates) = geocoder.geocode(hints.address).await {
            return Resolution {
                coordinates,
                source: ResolutionSource::Geocoded,
            };
        }
    }

    OFFLINE_RESOLVERS
        .iter()
        .find_map(|(source, resolver)| {
            resolver(hints).map(|coordinates| Resolution {
                coordinates,
                source: *source,
            })
        })
        .unwrap_or(Resolution {
            coordinates: CITY_CENTRE,
            source: ResolutionSource::CityCentre,
        })
}

/// Extracts coordinates embedded in a Google Maps link.
///
/// Recognised shapes, tried in order:
/// - `…@49.81,-97.23,…`
/// - `…!2d<lon>…!3d<lat>…` (`!2d` carries longitude)
/// - `…geocode=…&daddr=<address>` for Winnipeg addresses, mapped through the
///   street-fragment table with downtown as the default
///
/// A matched pattern whose numbers do not parse resolves nothing.
#[must_use]
pub fn coordinates_from_maps_url(maps_url: &str) -> Option<Coordinates> {
    if maps_url.trim().is_empty() {
        return None;
    }

    if let Some(caps) = AT_PAIR_RE.captures(maps_url) {
        let lat = caps[1].parse::<f64>().ok()?;
        let lon = caps[2].parse::<f64>().ok()?;
        return Some(Coordinates::new(lat, lon));
    }

    if let (Some(lng), Some(lat)) = (LNG_2D_RE.captures(maps_url), LAT_3D_RE.captures(maps_url)) {
        let lat = lat[1].parse::<f64>().ok()?;
        let lon = lng[1].parse::<f64>().ok()?;
        return Some(Coordinates::new(lat, lon));
    }

    if maps_url.contains("geocode=") {
        let caps = DADDR_RE.captures(maps_url)?;
        let address = percent_decode_str(&caps[1].replace('+', " "))
            .decode_utf8_lossy()
            .into_owned();
        tracing::debug!(%address, "maps link carries a destination address");

        let decoded_url = percent_decode_str(maps_url).decode_utf8_lossy();
        if decoded_url.contains("Winnipeg") {
            let area = MAPS_STREET_AREAS
                .iter()
                .find(|(street, _)| decoded_url.contains(street))
                .map_or(CITY_CENTRE, |(_, at)| *at);
            return Some(area);
        }
    }

    None
}

/// Looks up a case-insensitive area name inside a free-text location label.
#[must_use]
pub fn area_coordinates(label: &str) -> Option<Coordinates> {
    let lower = label.to_lowercase();
    NAMED_AREAS
        .iter()
        .find(|(area, _)| lower.contains(area))
        .map(|(_, at)| *at)
}
