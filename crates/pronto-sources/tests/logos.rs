//! Integration tests for `LogoDownloader` using wiremock HTTP mocks.

use pronto_core::RestaurantRecord;
use pronto_sources::{logo_path, LogoDownloader, LogoSummary};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn with_logo(name: &str, url: &str) -> RestaurantRecord {
    let mut record = RestaurantRecord::named(name);
    record.logo_url = url.to_string();
    record
}

#[tokio::test]
async fn downloads_skips_and_counts_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/logos/pho.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"\x89PNG-pho".to_vec()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/logos/cached.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"fresh".to_vec()))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/logos/gone.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let logo_dir = dir.path().join("logos");
    let cached_url = format!("{}/logos/cached.png", server.uri());
    std::fs::create_dir_all(&logo_dir).expect("mkdir");
    std::fs::write(logo_path(&logo_dir, "Cached Cafe", &cached_url), b"old").expect("seed");

    let pho_url = format!("{}/logos/pho.png", server.uri());
    let records = vec![
        with_logo("Pho Hoa", &pho_url),
        with_logo("Cached Cafe", &cached_url),
        with_logo("Gone Grill", &format!("{}/logos/gone.png", server.uri())),
        RestaurantRecord::named("No Logo"),
    ];

    let downloader = LogoDownloader::new(5, "pronto-test", &logo_dir).expect("downloader");
    let summary = downloader.download_all(&records).await.expect("download pass");

    assert_eq!(
        summary,
        LogoSummary {
            downloaded: 1,
            failed: 1,
            skipped: 1,
        }
    );
    let saved = std::fs::read(logo_path(&logo_dir, "Pho Hoa", &pho_url)).expect("saved");
    assert_eq!(saved, b"\x89PNG-pho");
}

#[tokio::test]
async fn drive_links_are_fetched_as_direct_downloads() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/uc"))
        .and(query_param("export", "download"))
        .and(query_param("id", "1AbCdEf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"drive-bytes".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let drive_url = "https://drive.google.com/file/d/1AbCdEf/view?usp=sharing";
    let downloader = LogoDownloader::new(5, "pronto-test", dir.path())
        .expect("downloader")
        .with_drive_base(&server.uri());

    let summary = downloader
        .download_all(&[with_logo("Drive Diner", drive_url)])
        .await
        .expect("download pass");

    assert_eq!(summary.downloaded, 1);
    let saved = std::fs::read(logo_path(dir.path(), "Drive Diner", drive_url)).expect("saved");
    assert_eq!(saved, b"drive-bytes");
}

#[tokio::test]
async fn interrupted_download_is_retried_and_leaves_no_partial_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/logos/taco.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"taco".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let url = format!("{}/logos/taco.png", server.uri());
    let target = logo_path(dir.path(), "Taco Time", &url);
    let mut partial = target.clone().into_os_string();
    partial.push(".part");
    std::fs::write(&partial, b"ta").expect("seed partial");

    let downloader = LogoDownloader::new(5, "pronto-test", dir.path()).expect("downloader");
    let summary = downloader
        .download_all(&[with_logo("Taco Time", &url)])
        .await
        .expect("download pass");

    assert_eq!(summary.downloaded, 1);
    assert_eq!(std::fs::read(&target).expect("saved"), b"taco");
    assert!(!std::path::Path::new(&partial).exists());
}
