//! Restaurant logo download into a local file cache.
//!
//! Files are named from the restaurant name plus a digest of the logo URL, so
//! a changed URL produces a new file while an unchanged one is never fetched twice.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use futures::stream::{self, StreamExt};
use pronto_core::RestaurantRecord;
use regex::Regex;
use reqwest::Client;
use sha2::{Digest, Sha256};

use crate::http::build_client;
use crate::SourceError;

static DRIVE_FILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/file/d/([^/?#]+)").expect("valid regex"));
static DRIVE_ID_PARAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:open|uc)\?(?:[^#]*&)?id=([^&#]+)").expect("valid regex"));

const DEFAULT_DRIVE_BASE: &str = "https://drive.google.com";
const URL_DIGEST_LEN: usize = 10;
const DEFAULT_CONCURRENCY: usize = 4;

/// Counts reported after a download pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogoSummary {
    pub downloaded: usize,
    pub failed: usize,
    pub skipped: usize,
}

enum LogoOutcome {
    Downloaded,
    Failed,
    Skipped,
}

/// Extracts the file id from a Google Drive sharing link.
#[must_use]
pub fn drive_file_id(url: &str) -> Option<&str> {
    if !url.contains("drive.google.com") {
        return None;
    }
    DRIVE_FILE_RE
        .captures(url)
        .or_else(|| DRIVE_ID_PARAM_RE.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Lower-cases `name` and replaces everything outside `[A-Za-z0-9_-]` with `_`.
#[must_use]
pub fn safe_name(name: &str) -> String {
    let safe: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    if safe.is_empty() {
        "unknown".to_string()
    } else {
        safe
    }
}

/// `{dir}/{safe_name}_{first 10 hex of sha256(url)}.png`
#[must_use]
pub fn logo_path(dir: &Path, name: &str, url: &str) -> PathBuf {
    let digest = format!("{:x}", Sha256::digest(url.as_bytes()));
    dir.join(format!(
        "{}_{}.png",
        safe_name(name),
        &digest[..URL_DIGEST_LEN]
    ))
}

/// Sibling file a download is written to before it is renamed into place.
fn partial_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

#[derive(Debug, Clone)]
pub struct LogoDownloader {
    client: Client,
    logo_dir: PathBuf,
    drive_base: String,
    concurrency: usize,
}

impl LogoDownloader {
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        logo_dir: impl Into<PathBuf>,
    ) -> Result<Self, SourceError> {
        Ok(Self {
            client: build_client(timeout_secs, user_agent)?,
            logo_dir: logo_dir.into(),
            drive_base: DEFAULT_DRIVE_BASE.to_string(),
            concurrency: DEFAULT_CONCURRENCY,
        })
    }

    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Points Drive download rewrites at another host (tests).
    #[must_use]
    pub fn with_drive_base(mut self, drive_base: &str) -> Self {
        self.drive_base = drive_base.trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn logo_dir(&self) -> &Path {
        &self.logo_dir
    }

    /// The URL actually fetched: Drive links become direct-download links.
    #[must_use]
    pub fn download_url(&self, url: &str) -> String {
        match drive_file_id(url) {
            Some(id) => format!("{}/uc?export=download&id={id}", self.drive_base),
            None => url.to_string(),
        }
    }

    /// Downloads one logo to `target`.
    ///
    /// # Errors
    ///
    /// - [`SourceError::Http`] on network failure or a non-2xx status.
    /// - [`SourceError::Io`] if the file cannot be written.
    pub async fn download(&self, url: &str, target: &Path) -> Result<(), SourceError> {
        let bytes = self
            .client
            .get(self.download_url(url))
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        let partial = partial_path(target);
        if let Err(e) = tokio::fs::write(&partial, &bytes).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(SourceError::io(&partial, e));
        }
        tokio::fs::rename(&partial, target)
            .await
            .map_err(|e| SourceError::io(target, e))
    }

    /// Downloads every missing logo, up to `concurrency` at a time.
    /// Individual failures are counted, not returned.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Io`] only if the logo directory cannot be created.
    pub async fn download_all(
        &self,
        records: &[RestaurantRecord],
    ) -> Result<LogoSummary, SourceError> {
        tokio::fs::create_dir_all(&self.logo_dir)
            .await
            .map_err(|e| SourceError::io(&self.logo_dir, e))?;

        let jobs = records.iter().filter_map(|record| {
            let url = record.logo_url.trim();
            (!url.is_empty()).then_some((record.name.as_str(), url))
        });
        let outcomes = stream::iter(jobs.map(|(name, url)| self.fetch_missing(name, url)))
            .buffer_unordered(self.concurrency.max(1))
            .collect::<Vec<_>>()
            .await;

        let mut summary = LogoSummary::default();
        for outcome in outcomes {
            match outcome {
                LogoOutcome::Downloaded => summary.downloaded += 1,
                LogoOutcome::Failed => summary.failed += 1,
                LogoOutcome::Skipped => summary.skipped += 1,
            }
        }

        tracing::info!(
            downloaded = summary.downloaded,
            failed = summary.failed,
            skipped = summary.skipped,
            "logo download pass complete"
        );
        Ok(summary)
    }

    async fn fetch_missing(&self, restaurant: &str, url: &str) -> LogoOutcome {
        let target = logo_path(&self.logo_dir, restaurant, url);
        if tokio::fs::try_exists(&target).await.unwrap_or(false) {
            tracing::debug!(restaurant, "logo already cached");
            return LogoOutcome::Skipped;
        }
        match self.download(url, &target).await {
            Ok(()) => {
                tracing::debug!(restaurant, path = %target.display(), "logo downloaded");
                LogoOutcome::Downloaded
            }
            Err(e) => {
                tracing::warn!(restaurant, error = %e, "logo download failed");
                LogoOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drive_ids_from_all_link_shapes() {
        assert_eq!(
            drive_file_id("https://drive.google.com/file/d/1AbC-xyz/view?usp=sharing"),
            Some("1AbC-xyz")
        );
        assert_eq!(
            drive_file_id("https://drive.google.com/open?id=1AbC-xyz"),
            Some("1AbC-xyz")
        );
        assert_eq!(
            drive_file_id("https://drive.google.com/uc?export=view&id=1AbC-xyz"),
            Some("1AbC-xyz")
        );
        assert_eq!(drive_file_id("https://cdn.example.com/logo.png"), None);
    }

    #[test]
    fn safe_name_replaces_punctuation() {
        assert_eq!(safe_name("Nicolino's Pizza"), "nicolino_s_pizza");
        assert_eq!(safe_name("Bar-B-Q_2"), "bar-b-q_2");
        assert_eq!(safe_name(""), "unknown");
    }

    #[test]
    fn logo_path_appends_url_digest() {
        let path = logo_path(Path::new("/tmp/logos"), "Pho Hoa", "https://x/logo.png");
        let file = path.file_name().and_then(|f| f.to_str()).expect("file name");
        assert!(file.starts_with("pho_hoa_"), "{file}");
        assert!(file.ends_with(".png"));
        assert_eq!(file.len(), "pho_hoa_".len() + URL_DIGEST_LEN + ".png".len());

        let other = logo_path(Path::new("/tmp/logos"), "Pho Hoa", "https://x/other.png");
        assert_ne!(path, other);
    }

    #[test]
    fn download_url_rewrites_drive_links_only() {
        let downloader = LogoDownloader::new(5, "test", "/tmp/logos").expect("downloader");
        assert_eq!(
            downloader.download_url("https://drive.google.com/file/d/abc123/view"),
            "https://drive.google.com/uc?export=download&id=abc123"
        );
        assert_eq!(
            downloader.download_url("https://cdn.example.com/logo.png"),
            "https://cdn.example.com/logo.png"
        );
    }
}
