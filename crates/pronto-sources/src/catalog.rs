//! The restaurant catalog: one loader over the three configured data sources.

use std::collections::HashMap;
use std::path::PathBuf;

use pronto_core::{AppConfig, DataSourceKind, Deals, RestaurantRecord};
use pronto_db::{DbError, DealRow, NewDeal, NewRestaurant, RestaurantRow};
use pronto_listing::normalize::columns;
use pronto_listing::{
    extract_prices, locate_records, normalize_row, normalize_rows, split_deals, Geocoder, RawRow,
};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::csv_source::read_csv_file;
use crate::sheets::SheetsClient;
use crate::SourceError;

#[derive(Debug, Clone)]
pub enum DataSource {
    Csv(PathBuf),
    Sheets {
        client: SheetsClient,
        sheet_id: String,
        sheet_name: String,
        cache_path: PathBuf,
    },
    Database(PgPool),
}

impl DataSource {
    /// Picks the source named by `PRONTO_DATA_SOURCE`.
    ///
    /// The sheets loader uses the CSV path as its local fallback copy.
    ///
    /// # Errors
    ///
    /// - [`SourceError::Db`] with [`DbError::MissingDatabaseUrl`] when the
    ///   database source is selected without a pool.
    /// - [`SourceError::Http`] if the sheets HTTP client cannot be built.
    pub fn from_config(config: &AppConfig, pool: Option<PgPool>) -> Result<Self, SourceError> {
        match config.data_source {
            DataSourceKind::Csv => Ok(Self::Csv(config.csv_path.clone())),
            DataSourceKind::Sheets => {
                let sheet_id = config.sheet_id.clone().ok_or(SourceError::MissingField {
                    context: "configuration".to_string(),
                    field: "PRONTO_SHEET_ID",
                })?;
                Ok(Self::Sheets {
                    client: SheetsClient::new(config.http_timeout_secs, &config.user_agent)?,
                    sheet_id,
                    sheet_name: config.sheet_name.clone(),
                    cache_path: config.csv_path.clone(),
                })
            }
            DataSourceKind::Database => pool
                .map(Self::Database)
                .ok_or(SourceError::Db(DbError::MissingDatabaseUrl)),
        }
    }

    #[must_use]
    pub fn kind(&self) -> DataSourceKind {
        match self {
            Self::Csv(_) => DataSourceKind::Csv,
            Self::Sheets { .. } => DataSourceKind::Sheets,
            Self::Database(_) => DataSourceKind::Database,
        }
    }

    /// Fetches and normalizes the collection, without coordinates.
    ///
    /// # Errors
    ///
    /// - [`SourceError::Io`] / [`SourceError::Csv`] for an unreadable CSV file.
    /// - [`SourceError::Db`] if the database queries fail.
    ///
    /// The sheets source never fails; see [`SheetsClient::load_rows`].
    pub async fn load_normalized(&self) -> Result<Vec<RestaurantRecord>, SourceError> {
        match self {
            Self::Csv(path) => Ok(normalize_rows(&read_csv_file(path).await?)),
            Self::Sheets {
                client,
                sheet_id,
                sheet_name,
                cache_path,
            } => Ok(normalize_rows(
                &client.load_rows(sheet_id, sheet_name, cache_path).await,
            )),
            Self::Database(pool) => {
                let restaurants = pronto_db::list_restaurants(pool).await?;
                let deals = pronto_db::list_deals(pool).await?;
                Ok(db_records(&restaurants, &deals))
            }
        }
    }

    /// Loads, normalizes and locates the full collection.
    ///
    /// A source failure is logged and yields an empty collection.
    pub async fn load_records<G: Geocoder + ?Sized>(&self, geocoder: &G) -> Vec<RestaurantRecord> {
        let mut records = match self.load_normalized().await {
            Ok(records) => records,
            Err(e) => {
                tracing::error!(source = %self.kind(), error = %e, "restaurant data unavailable");
                return Vec::new();
            }
        };
        locate_records(&mut records, geocoder).await;
        tracing::info!(source = %self.kind(), restaurants = records.len(), "restaurant collection loaded");
        records
    }
}

/// One restaurant row in the shared raw-row shape, without its deals.
///
/// Numeric review columns become a `Total Reviews / Average Rating` summary
/// so the review parser applies.
fn restaurant_raw_row(restaurant: &RestaurantRow) -> RawRow {
    let mut row = RawRow::new();
    let mut put = |column: &str, value: String| {
        row.insert(column.to_string(), value);
    };
    let text = |value: &Option<String>| value.clone().unwrap_or_default();

    put(columns::ID, restaurant.id.to_string());
    put(columns::NAME, restaurant.name.clone());
    put(columns::ADDRESS, restaurant.address.clone());
    put(columns::LOCATION, text(&restaurant.location));
    put(columns::LOGO_URL, text(&restaurant.logo_url));
    put(columns::WEBSITE, text(&restaurant.website_url));
    put(columns::MENU_URL, text(&restaurant.menu_url));
    put(columns::MAPS_URL, text(&restaurant.maps_url));
    put(
        columns::REVIEWS_DATA,
        format!(
            "Total Reviews: {}\nAverage Rating: {}/10",
            restaurant.reviews_count, restaurant.average_rating
        ),
    );
    row
}

/// Joins restaurant rows with their deals into records.
///
/// Each deal row is one summary/detail pair, kept whole even when its text
/// contains the `->` delimiter. Deals are attached in the order given, which
/// `list_deals` returns per restaurant in insertion order.
#[must_use]
pub fn db_records(restaurants: &[RestaurantRow], deals: &[DealRow]) -> Vec<RestaurantRecord> {
    let mut deals_by_restaurant: HashMap<i64, Vec<&DealRow>> = HashMap::new();
    for deal in deals {
        deals_by_restaurant
            .entry(deal.restaurant_id)
            .or_default()
            .push(deal);
    }

    restaurants
        .iter()
        .filter_map(|restaurant| {
            let mut record = normalize_row(&restaurant_raw_row(restaurant))?;
            if let Some(own) = deals_by_restaurant.get(&restaurant.id) {
                record.deals = Deals::Structured {
                    summaries: own
                        .iter()
                        .map(|d| d.summarized_deal.trim().to_string())
                        .collect(),
                    details: own.iter().map(|d| d.details.trim().to_string()).collect(),
                };
            }
            Some(record)
        })
        .collect()
}

/// Counts from [`import_records`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub restaurants: usize,
    pub deals: usize,
}

/// Summary/detail pairs to store as individual deal rows.
fn deal_pairs(deals: &Deals) -> Vec<(String, String)> {
    match deals {
        Deals::None => Vec::new(),
        Deals::Legacy { text } => split_deals(text)
            .into_iter()
            .map(|item| (item.clone(), item))
            .collect(),
        Deals::Structured { summaries, details } => summaries
            .iter()
            .cloned()
            .zip(details.iter().cloned())
            .collect(),
    }
}

/// Cheapest price named by one deal, as stored in `deals.price`.
fn deal_price(summary: &str, detail: &str) -> Option<Decimal> {
    let pair = Deals::Structured {
        summaries: vec![summary.to_string()],
        details: vec![detail.to_string()],
    };
    extract_prices(&pair)
        .into_iter()
        .min_by(f64::total_cmp)
        .and_then(Decimal::from_f64_retain)
        .map(|price| price.round_dp(2))
}

/// Inserts normalized records and their deals into the database.
///
/// Ratings are stored back on the 0-10 scale. Empty address fields are
/// stored as empty strings since the column is required.
///
/// # Errors
///
/// Returns [`SourceError::Db`] on the first failed insert; rows inserted
/// before it are kept.
pub async fn import_records(
    pool: &PgPool,
    records: &[RestaurantRecord],
) -> Result<ImportSummary, SourceError> {
    fn optional(value: &str) -> Option<&str> {
        Some(value.trim()).filter(|v| !v.is_empty() && *v != "#")
    }
    let mut summary = ImportSummary::default();

    for record in records {
        let stored = pronto_db::create_restaurant(
            pool,
            &NewRestaurant {
                name: &record.name,
                address: &record.address,
                location: optional(&record.location),
                logo_url: optional(&record.logo_url),
                website_url: optional(&record.website),
                menu_url: optional(&record.menu_url),
                maps_url: optional(&record.maps_url),
                reviews_count: i32::try_from(record.review_count).unwrap_or(i32::MAX),
                average_rating: record.rating * 2.0,
            },
        )
        .await?;
        summary.restaurants += 1;

        for (summarized_deal, details) in deal_pairs(&record.deals) {
            pronto_db::create_deal(
                pool,
                &NewDeal {
                    restaurant_id: stored.id,
                    details: &details,
                    summarized_deal: &summarized_deal,
                    price: deal_price(&summarized_deal, &details),
                },
            )
            .await?;
            summary.deals += 1;
        }
        tracing::debug!(restaurant = %record.name, id = stored.id, "imported restaurant");
    }

    tracing::info!(
        restaurants = summary.restaurants,
        deals = summary.deals,
        "import complete"
    );
    Ok(summary)
}
