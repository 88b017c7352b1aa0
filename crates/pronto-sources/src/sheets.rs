//! Google Sheets CSV export with a local-file fallback.

use std::path::Path;

use pronto_listing::RawRow;
use reqwest::{Client, Url};

use crate::csv_source::{parse_csv_rows, read_csv_file};
use crate::http::{build_client, join, parse_base_url};
use crate::SourceError;

const DEFAULT_BASE_URL: &str = "https://docs.google.com";

/// Downloads the public CSV export of a sheet tab.
///
/// Use [`SheetsClient::new`] for production or [`SheetsClient::with_base_url`]
/// to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct SheetsClient {
    client: Client,
    base_url: Url,
}

impl SheetsClient {
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

    /// `{base}/spreadsheets/d/{id}/gviz/tq?tqx=out:csv&sheet={name}`
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidUrl`] if the sheet id cannot form a path.
    pub fn export_url(&self, sheet_id: &str, sheet_name: &str) -> Result<Url, SourceError> {
        let mut url = join(&self.base_url, &format!("spreadsheets/d/{sheet_id}/gviz/tq"))?;
        url.query_pairs_mut()
            .append_pair("tqx", "out:csv")
            .append_pair("sheet", sheet_name);
        Ok(url)
    }

    /// Downloads the export as CSV text. A sheet with no data rows is an error.
    ///
    /// # Errors
    ///
    /// - [`SourceError::Http`] on network failure or a non-2xx status.
    /// - [`SourceError::Csv`] if the body is not valid CSV.
    /// - [`SourceError::EmptySheet`] if the export has no data rows.
    pub async fn fetch_csv(&self, sheet_id: &str, sheet_name: &str) -> Result<String, SourceError> {
        let url = self.export_url(sheet_id, sheet_name)?;
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        if parse_csv_rows(&body)?.is_empty() {
            return Err(SourceError::EmptySheet(sheet_name.to_string()));
        }
        Ok(body)
    }

    /// Loads the sheet, refreshing the local copy at `cache_path` on success.
    ///
    /// Any download failure (including an empty sheet) falls back to the
    /// cached copy; with no usable cached copy the result is empty.
    pub async fn load_rows(&self, sheet_id: &str, sheet_name: &str, cache_path: &Path) -> Vec<RawRow> {
        match self.fetch_csv(sheet_id, sheet_name).await {
            Ok(text) => {
                if let Err(e) = write_cache(cache_path, &text).await {
                    tracing::warn!(error = %e, "could not refresh local sheet copy");
                }
                match parse_csv_rows(&text) {
                    Ok(rows) => {
                        tracing::info!(sheet = sheet_name, rows = rows.len(), "loaded sheet");
                        return rows;
                    }
                    Err(e) => tracing::warn!(error = %e, "sheet export did not parse"),
                }
            }
            Err(e) => {
                tracing::warn!(sheet = sheet_name, error = %e, "sheet download failed");
            }
        }

        if !tokio::fs::try_exists(cache_path).await.unwrap_or(false) {
            tracing::warn!(path = %cache_path.display(), "no cached sheet copy; returning no rows");
            return Vec::new();
        }
        match read_csv_file(cache_path).await {
            Ok(rows) => {
                tracing::info!(path = %cache_path.display(), rows = rows.len(), "using cached sheet copy");
                rows
            }
            Err(e) => {
                tracing::warn!(error = %e, "cached sheet copy unreadable; returning no rows");
                Vec::new()
            }
        }
    }
}

async fn write_cache(path: &Path, text: &str) -> Result<(), SourceError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| SourceError::io(parent, e))?;
    }
    tokio::fs::write(path, text)
        .await
        .map_err(|e| SourceError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_url_has_csv_query() {
        let client = SheetsClient::new(5, "test").expect("client");
        let url = client
            .export_url("14IK_ep3q3oPgVQP6oRPttgESuT4FhLiED01mCZW3SSI", "refined data")
            .expect("url");
        assert_eq!(
            url.as_str(),
            "https://docs.google.com/spreadsheets/d/14IK_ep3q3oPgVQP6oRPttgESuT4FhLiED01mCZW3SSI/gviz/tq?tqx=out%3Acsv&sheet=refined+data"
        );
    }
}
