//! Shared `reqwest` client construction for every outbound collaborator.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::SourceError;

const CONNECT_TIMEOUT_SECS: u64 = 10;

pub(crate) fn build_client(timeout_secs: u64, user_agent: &str) -> Result<Client, SourceError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}

/// Parses a base URL, normalised to end in exactly one slash so `join` appends
/// rather than replacing the last path segment.
pub(crate) fn parse_base_url(base_url: &str) -> Result<Url, SourceError> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| SourceError::InvalidUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })
}

pub(crate) fn join(base: &Url, path: &str) -> Result<Url, SourceError> {
    base.join(path).map_err(|e| SourceError::InvalidUrl {
        url: format!("{base}{path}"),
        reason: e.to_string(),
    })
}
