//! Integration tests for `SheetsClient` using wiremock HTTP mocks.

use pronto_sources::SheetsClient;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SHEET_ID: &str = "sheet-123";
const SHEET_NAME: &str = "refined_data";
const EXPORT_PATH: &str = "/spreadsheets/d/sheet-123/gviz/tq";

const SHEET_CSV: &str = "name,address,reviews_data\n\
Pho Hoa,\"1500 Pembina Hwy\",\"Total Reviews: 120\nAverage Rating: 9/10\"\n\
Nicolinos,\"2 Main St\",\n";

fn test_client(base_url: &str) -> SheetsClient {
    SheetsClient::with_base_url(5, "pronto-test", base_url)
        .expect("client construction should not fail")
}

#[tokio::test]
async fn successful_download_refreshes_local_copy() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(EXPORT_PATH))
        .and(query_param("tqx", "out:csv"))
        .and(query_param("sheet", SHEET_NAME))
        .respond_with(ResponseTemplate::new(200).set_body_string(SHEET_CSV))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let cache = dir.path().join("nested").join("restaurant_data.csv");

    let rows = test_client(&server.uri())
        .load_rows(SHEET_ID, SHEET_NAME, &cache)
        .await;

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["name"], "Pho Hoa");
    let cached = std::fs::read_to_string(&cache).expect("cache written");
    assert_eq!(cached, SHEET_CSV);
}

#[tokio::test]
async fn server_error_falls_back_to_local_copy() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(EXPORT_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let cache = dir.path().join("restaurant_data.csv");
    std::fs::write(&cache, "name\nCached Cafe\n").expect("seed cache");

    let rows = test_client(&server.uri())
        .load_rows(SHEET_ID, SHEET_NAME, &cache)
        .await;

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], "Cached Cafe");
}

#[tokio::test]
async fn empty_sheet_uses_local_copy_and_leaves_it_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(EXPORT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("name,address\n"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let cache = dir.path().join("restaurant_data.csv");
    std::fs::write(&cache, "name\nCached Cafe\n").expect("seed cache");

    let client = test_client(&server.uri());
    let err = client
        .fetch_csv(SHEET_ID, SHEET_NAME)
        .await
        .expect_err("empty sheet is an error");
    assert!(matches!(err, pronto_sources::SourceError::EmptySheet(_)));

    let rows = client.load_rows(SHEET_ID, SHEET_NAME, &cache).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(
        std::fs::read_to_string(&cache).expect("cache"),
        "name\nCached Cafe\n"
    );
}

#[tokio::test]
async fn failure_without_local_copy_yields_no_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let rows = test_client(&server.uri())
        .load_rows(SHEET_ID, SHEET_NAME, &dir.path().join("missing.csv"))
        .await;

    assert!(rows.is_empty());
}
