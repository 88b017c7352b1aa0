//! `logos download`: fill the local logo cache.

use std::path::{Path, PathBuf};

use pronto_sources::LogoDownloader;

use crate::list::{load_records, open_source, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_USER_AGENT};

const DEFAULT_LOGO_DIR: &str = "./static/logos";

pub(crate) async fn run_logos_download(
    csv: Option<&Path>,
    logo_dir: Option<&Path>,
) -> anyhow::Result<()> {
    let (source, config) = open_source(csv).await?;
    let records = load_records(&source, config.as_ref(), false).await?;

    let downloader = match &config {
        Some(c) => LogoDownloader::new(
            c.http_timeout_secs,
            &c.user_agent,
            logo_dir.map_or_else(|| c.logo_dir.clone(), Path::to_path_buf),
        )?,
        None => LogoDownloader::new(
            DEFAULT_HTTP_TIMEOUT_SECS,
            DEFAULT_USER_AGENT,
            logo_dir.map_or_else(|| PathBuf::from(DEFAULT_LOGO_DIR), Path::to_path_buf),
        )?,
    };

    let summary = downloader.download_all(&records).await?;
    println!(
        "logos: {} downloaded, {} skipped, {} failed (in {})",
        summary.downloaded,
        summary.skipped,
        summary.failed,
        downloader.logo_dir().display()
    );
    Ok(())
}
