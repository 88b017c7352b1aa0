//! `db` subcommands. Each connects with the configured `DATABASE_URL`.

use std::path::Path;

use pronto_listing::NoGeocoder;
use pronto_sources::DataSource;
use sqlx::PgPool;

use crate::list::build_geocoder;

async fn connect() -> anyhow::Result<(PgPool, pronto_core::AppConfig)> {
    let config = pronto_core::load_app_config()?;
    let pool = pronto_db::connect_pool_from_config(&config).await?;
    Ok((pool, config))
}

pub(crate) async fn run_db_ping() -> anyhow::Result<()> {
    let (pool, _) = connect().await?;
    pronto_db::ping(&pool).await?;
    println!("database reachable");
    Ok(())
}

pub(crate) async fn run_db_migrate() -> anyhow::Result<()> {
    let (pool, _) = connect().await?;
    let applied = pronto_db::run_migrations(&pool).await?;
    println!("applied {applied} migration(s)");
    Ok(())
}

/// Reads a CSV file, normalizes it and inserts every restaurant with its deals.
///
/// Rows are not matched against existing restaurants, so importing the same
/// file twice stores every restaurant twice.
pub(crate) async fn run_import_csv(path: &Path, geocode: bool) -> anyhow::Result<()> {
    let (pool, config) = connect().await?;
    let source = DataSource::Csv(path.to_path_buf());

    let records = if geocode {
        source.load_records(&build_geocoder(Some(&config))?).await
    } else {
        source.load_records(&NoGeocoder).await
    };
    if records.is_empty() {
        anyhow::bail!("no restaurants found in {}", path.display());
    }

    let summary = pronto_sources::import_records(&pool, &records).await?;
    tracing::info!(
        restaurants = summary.restaurants,
        deals = summary.deals,
        "csv import finished"
    );
    println!(
        "imported {} restaurant(s) and {} deal(s) from {}",
        summary.restaurants,
        summary.deals,
        path.display()
    );
    Ok(())
}
