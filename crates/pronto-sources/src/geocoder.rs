//! Nominatim (OpenStreetMap) street-address geocoding.

use std::future::Future;

use pronto_core::Coordinates;
use pronto_listing::Geocoder;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::http::{build_client, join, parse_base_url};
use crate::SourceError;

const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";
const CITY_SUFFIX: &str = ", Winnipeg, Manitoba, Canada";

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
}

/// Geocoder backed by the Nominatim `/search` endpoint.
///
/// Nominatim rejects requests without a descriptive User-Agent, so one is
/// always set from configuration.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: Client,
    base_url: Url,
}

impl NominatimGeocoder {
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, SourceError> {
        Self::with_base_url(timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be constructed,
    /// or [`SourceError::InvalidUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, SourceError> {
        Ok(Self {
            client: build_client(timeout_secs, user_agent)?,
            base_url: parse_base_url(base_url)?,
        })
    }

    /// Looks up the first match for `address`, scoped to Winnipeg when the
    /// address names neither the city nor the province.
    ///
    /// # Errors
    ///
    /// - [`SourceError::Http`] on network failure or a non-2xx status.
    /// - [`SourceError::Deserialize`] if the body is not the expected JSON.
    pub async fn lookup(&self, address: &str) -> Result<Option<Coordinates>, SourceError> {
        let address = address.trim();
        if address.is_empty() {
            return Ok(None);
        }
        let query = scoped_query(address);

        let mut url = join(&self.base_url, "search")?;
        url.query_pairs_mut()
            .append_pair("q", &query)
            .append_pair("format", "json")
            .append_pair("limit", "1")
            .append_pair("addressdetails", "1");

        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let hits: Vec<SearchHit> =
            serde_json::from_str(&body).map_err(|e| SourceError::Deserialize {
                context: format!("nominatim search(q={query})"),
                source: e,
            })?;

        let Some(hit) = hits.first() else {
            tracing::debug!(%query, "no geocoding result");
            return Ok(None);
        };
        match (hit.lat.trim().parse::<f64>(), hit.lon.trim().parse::<f64>()) {
            (Ok(lat), Ok(lon)) => Ok(Some(Coordinates::new(lat, lon))),
            _ => {
                tracing::debug!(%query, lat = %hit.lat, lon = %hit.lon, "unparseable geocoding result");
                Ok(None)
            }
        }
    }
}

fn scoped_query(address: &str) -> String {
    let lower = address.to_lowercase();
    if lower.contains("winnipeg") || lower.contains("manitoba") {
        address.to_string()
    } else {
        format!("{address}{CITY_SUFFIX}")
    }
}

impl Geocoder for NominatimGeocoder {
    fn geocode(&self, address: &str) -> impl Future<Output = Option<Coordinates>> + Send {
        async move {
            match self.lookup(address).await {
                Ok(found) => found,
                Err(e) => {
                    tracing::warn!(address, error = %e, "geocoding failed");
                    None
                }
            }
        }
    }
}
