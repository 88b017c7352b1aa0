//! Offline tests for pronto-db pool configuration and row types.
//! These tests do not require a live database connection.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use chrono::Utc;
use pronto_core::{AppConfig, DataSourceKind, Environment};
use pronto_db::{PoolConfig, UserRow, ADMIN_ROLE_ID, USER_ROLE_ID};

fn app_config() -> AppConfig {
    AppConfig {
        database_url: Some("postgres://example".to_string()),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        data_source: DataSourceKind::Database,
        csv_path: PathBuf::from("./data/restaurant_data.csv"),
        sheet_id: None,
        sheet_name: "refined_data".to_string(),
        listing_cache_ttl_secs: 3600,
        http_timeout_secs: 10,
        user_agent: "ua".to_string(),
        geocoder_url: "http://localhost:1".to_string(),
        ip_locator_url: "http://localhost:2".to_string(),
        logo_dir: PathBuf::from("./static/logos"),
        flyer_dir: PathBuf::from("./static/flyers"),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[tokio::test]
async fn connect_from_config_without_url_is_missing_database_url() {
    let mut config = app_config();
    config.database_url = None;
    let err = pronto_db::connect_pool_from_config(&config)
        .await
        .expect_err("no url configured");
    assert!(matches!(err, pronto_db::DbError::MissingDatabaseUrl));
}

#[test]
fn user_row_never_serializes_password() {
    let row = UserRow {
        id: 1,
        email: "owner@example.com".to_string(),
        password: "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8".to_string(),
        role: ADMIN_ROLE_ID,
        created_at: Utc::now(),
    };
    let json = serde_json::to_value(&row).expect("serialize");
    assert!(json.get("password").is_none());
    assert_eq!(json["email"], "owner@example.com");
    assert!(row.is_admin());
    assert_ne!(ADMIN_ROLE_ID, USER_ROLE_ID);
}
