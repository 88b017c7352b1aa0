use crate::app_config::{AppConfig, DataSourceKind, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        optional(var).unwrap_or_else(|| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = optional("DATABASE_URL");
    let env = parse_environment(&or_default("PRONTO_ENV", "development"));
    let bind_addr = parse_addr("PRONTO_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("PRONTO_LOG_LEVEL", "info");

    let data_source = or_default("PRONTO_DATA_SOURCE", "database")
        .parse::<DataSourceKind>()
        .map_err(|reason| invalid("PRONTO_DATA_SOURCE", reason))?;

    let csv_path = PathBuf::from(or_default("PRONTO_CSV_PATH", "./data/restaurant_data.csv"));
    let sheet_id = optional("PRONTO_SHEET_ID");
    let sheet_name = or_default("PRONTO_SHEET_NAME", "refined_data");

    if data_source == DataSourceKind::Sheets && sheet_id.is_none() {
        return Err(ConfigError::MissingEnvVar("PRONTO_SHEET_ID".to_string()));
    }
    if data_source == DataSourceKind::Database && database_url.is_none() {
        return Err(ConfigError::MissingEnvVar("DATABASE_URL".to_string()));
    }

    let listing_cache_ttl_secs = parse_u64("PRONTO_LISTING_CACHE_TTL_SECS", "3600")?;
    let http_timeout_secs = parse_u64("PRONTO_HTTP_TIMEOUT_SECS", "10")?;
    let user_agent = or_default("PRONTO_USER_AGENT", "Pronto-Restaurant-App/1.0");
    let geocoder_url = or_default(
        "PRONTO_GEOCODER_URL",
        "https://nominatim.openstreetmap.org",
    );
    let ip_locator_url = or_default("PRONTO_IP_LOCATOR_URL", "https://ipinfo.io");
    let logo_dir = PathBuf::from(or_default("PRONTO_LOGO_DIR", "./static/logos"));
    let flyer_dir = PathBuf::from(or_default("PRONTO_FLYER_DIR", "./static/flyers"));

    let db_max_connections = parse_u32("PRONTO_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("PRONTO_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("PRONTO_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        data_source,
        csv_path,
        sheet_id,
        sheet_name,
        listing_cache_ttl_secs,
        http_timeout_secs,
        user_agent,
        geocoder_url,
        ip_locator_url,
        logo_dir,
        flyer_dir,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
