mod api;
mod listing_cache;
mod middleware;

use std::time::Duration;

use pronto_sources::{DataSource, IpLocator, NominatimGeocoder};
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    listing_cache::ListingCache,
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = pronto_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool = if config.database_url.is_some() {
        let pool = pronto_db::connect_pool_from_config(&config).await?;
        let applied = pronto_db::run_migrations(&pool).await?;
        tracing::info!(applied, "database migrations up to date");
        Some(pool)
    } else {
        tracing::info!("DATABASE_URL not set; database routes are unavailable");
        None
    };

    let source = DataSource::from_config(&config, pool.clone())?;
    let geocoder = NominatimGeocoder::with_base_url(
        config.http_timeout_secs,
        &config.user_agent,
        &config.geocoder_url,
    )?;
    let ip_locator = IpLocator::with_base_url(
        config.http_timeout_secs,
        &config.user_agent,
        &config.ip_locator_url,
    )?;

    tracing::info!(
        source = %source.kind(),
        ttl_secs = config.listing_cache_ttl_secs,
        "serving restaurant listing"
    );
    let listing = ListingCache::new(
        source,
        Some(geocoder),
        Duration::from_secs(config.listing_cache_ttl_secs),
    );

    let auth = AuthState::from_env(matches!(
        config.env,
        pronto_core::Environment::Development
    ))?;
    let state = AppState {
        pool,
        listing,
        ip_locator: Some(ip_locator),
        flyer_dir: Some(config.flyer_dir.clone()),
    };
    let app = build_app(state, auth, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "pronto-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
