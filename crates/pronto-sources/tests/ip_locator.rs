//! Integration tests for `IpLocator` using wiremock HTTP mocks.

use std::net::IpAddr;

use pronto_core::UserLocation;
use pronto_sources::{IpLocator, SourceError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_locator(base_url: &str) -> IpLocator {
    IpLocator::with_base_url(5, "pronto-test", base_url)
        .expect("locator construction should not fail")
}

#[tokio::test]
async fn caller_location_uses_bare_json_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ip": "203.0.113.9",
            "city": "Winnipeg",
            "region": "Manitoba",
            "country": "CA",
            "loc": "49.8844,-97.1470"
        })))
        .mount(&server)
        .await;

    let location = test_locator(&server.uri()).locate(None).await;
    assert_eq!(
        location,
        UserLocation {
            latitude: 49.8844,
            longitude: -97.147,
            address: "Winnipeg, Manitoba, CA".to_string(),
        }
    );
}

#[tokio::test]
async fn explicit_ip_is_placed_in_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/198.51.100.4/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "city": "Brandon",
            "country": "CA",
            "loc": "49.8485,-99.9501"
        })))
        .mount(&server)
        .await;

    let ip: IpAddr = "198.51.100.4".parse().expect("ip");
    let location = test_locator(&server.uri())
        .lookup(Some(ip))
        .await
        .expect("lookup");
    assert_eq!(location.address, "Brandon, CA");
}

#[tokio::test]
async fn missing_loc_is_an_error_and_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "bogon": true })))
        .mount(&server)
        .await;

    let locator = test_locator(&server.uri());
    let err = locator.lookup(None).await.expect_err("no loc");
    assert!(matches!(err, SourceError::MissingField { field: "loc", .. }));
    assert_eq!(locator.locate(None).await, UserLocation::city_centre_default());
}

#[tokio::test]
async fn server_error_falls_back_to_city_centre() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let location = test_locator(&server.uri()).locate(None).await;
    assert_eq!(location.address, "Winnipeg City Center (Default)");
    assert!((location.latitude - 49.8951).abs() < 1e-9);
}
