//! IP-based user location (ipinfo-style `/json` endpoint).

use std::net::IpAddr;

use pronto_core::UserLocation;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::http::{build_client, join, parse_base_url};
use crate::SourceError;

const DEFAULT_BASE_URL: &str = "https://ipinfo.io";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IpInfo {
    loc: Option<String>,
    city: Option<String>,
    region: Option<String>,
    country: Option<String>,
}

#[derive(Debug, Clone)]
pub struct IpLocator {
    client: Client,
    base_url: Url,
}

impl IpLocator {
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

    /// Locates `ip`, or the caller of the service itself when `ip` is `None`.
    ///
    /// # Errors
    ///
    /// - [`SourceError::Http`] on network failure or a non-2xx status.
    /// - [`SourceError::Deserialize`] if the body is not the expected JSON.
    /// - [`SourceError::MissingField`] if `loc` is absent or malformed.
    pub async fn lookup(&self, ip: Option<IpAddr>) -> Result<UserLocation, SourceError> {
        let path = match ip {
            Some(ip) => format!("{ip}/json"),
            None => "json".to_string(),
        };
        let url = join(&self.base_url, &path)?;
        let context = url.to_string();

        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let info: IpInfo = serde_json::from_str(&body).map_err(|e| SourceError::Deserialize {
            context: context.clone(),
            source: e,
        })?;

        let (latitude, longitude) = info
            .loc
            .as_deref()
            .and_then(parse_loc)
            .ok_or(SourceError::MissingField {
                context,
                field: "loc",
            })?;

        Ok(UserLocation {
            latitude,
            longitude,
            address: describe(&info),
        })
    }

    /// Like [`IpLocator::lookup`] but never fails: any error yields the city-centre default.
    pub async fn locate(&self, ip: Option<IpAddr>) -> UserLocation {
        match self.lookup(ip).await {
            Ok(location) => location,
            Err(e) => {
                tracing::info!(error = %e, "IP location unavailable; using city centre");
                UserLocation::city_centre_default()
            }
        }
    }
}

fn parse_loc(loc: &str) -> Option<(f64, f64)> {
    let (lat, lon) = loc.split_once(',')?;
    Some((lat.trim().parse().ok()?, lon.trim().parse().ok()?))
}

fn describe(info: &IpInfo) -> String {
    fn present(v: &Option<String>) -> Option<&str> {
        v.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
    match (present(&info.city), present(&info.region), present(&info.country)) {
        (Some(city), Some(region), Some(country)) => format!("{city}, {region}, {country}"),
        (Some(city), None, Some(country)) => format!("{city}, {country}"),
        _ => "Current Location".to_string(),
    }
}
