//! Raw source rows into [`RestaurantRecord`]s.
//!
//! Every source (CSV, sheet export, database) produces the same row shape: a
//! map from column name to text. Only `name` is required.

use std::collections::HashMap;

use pronto_core::{Deals, RestaurantRecord, DEAL_DELIMITER, UNKNOWN_DISTANCE};

use crate::reviews::parse_reviews;

/// One source row, column name to cell text.
pub type RawRow = HashMap<String, String>;

/// Column names shared by every source.
pub mod columns {
    pub const ID: &str = "id";
    pub const NAME: &str = "name";
    pub const ADDRESS: &str = "address";
    pub const LOCATION: &str = "location";
    pub const DISTANCE: &str = "distance";
    pub const REVIEWS_DATA: &str = "reviews_data";
    pub const REVIEWS: &str = "reviews";
    pub const SUMMARIZED_DEALS: &str = "summarized_deals";
    pub const DETAILED_DEALS: &str = "detailed_deals";
    pub const DEALS: &str = "deals";
    pub const LOGO_URL: &str = "logo_url";
    pub const MENU_URL: &str = "menu_url";
    pub const WEBSITE: &str = "website";
    pub const MAPS_URL: &str = "maps_url";
}

fn cell<'a>(row: &'a RawRow, column: &str) -> Option<&'a str> {
    row.get(column)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn cell_or_default(row: &RawRow, column: &str, default: &str) -> String {
    cell(row, column).unwrap_or(default).to_string()
}

/// Splits a `->`-joined deal string into trimmed, non-empty items.
#[must_use]
pub fn split_deals(joined: &str) -> Vec<String> {
    joined
        .split(DEAL_DELIMITER)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Pairs summary and detail strings, truncating both to the shorter list.
#[must_use]
pub fn pair_deals(restaurant: &str, summarized: &str, detailed: &str) -> Deals {
    let mut summaries = split_deals(summarized);
    let mut details = split_deals(detailed);
    if summaries.len() != details.len() {
        let kept = summaries.len().min(details.len());
        tracing::debug!(
            restaurant,
            summaries = summaries.len(),
            details = details.len(),
            kept,
            "deal lists differ in length; truncating to the shorter"
        );
        summaries.truncate(kept);
        details.truncate(kept);
    }
    Deals::Structured { summaries, details }
}

fn deals_from_row(restaurant: &str, row: &RawRow) -> Deals {
    let summarized = cell(row, columns::SUMMARIZED_DEALS);
    let detailed = cell(row, columns::DETAILED_DEALS);
    let legacy = cell(row, columns::DEALS);

    match (summarized, detailed, legacy) {
        (Some(summarized), Some(detailed), _) => pair_deals(restaurant, summarized, detailed),
        (_, _, Some(text)) | (Some(text), None, None) => Deals::Legacy {
            text: text.to_string(),
        },
        _ => Deals::None,
    }
}

/// Normalizes one row. Rows without a usable name yield `None`.
#[must_use]
pub fn normalize_row(row: &RawRow) -> Option<RestaurantRecord> {
    let name = cell(row, columns::NAME)?;
    let mut record = RestaurantRecord::named(name);

    record.id = cell(row, columns::ID).and_then(|id| id.parse::<i64>().ok());
    record.address = cell_or_default(row, columns::ADDRESS, "");
    record.location = cell_or_default(row, columns::LOCATION, "");
    record.distance = cell_or_default(row, columns::DISTANCE, UNKNOWN_DISTANCE);
    record.logo_url = cell_or_default(row, columns::LOGO_URL, "");
    record.menu_url = cell_or_default(row, columns::MENU_URL, "");
    record.website = cell_or_default(row, columns::WEBSITE, "#");
    record.maps_url = cell_or_default(row, columns::MAPS_URL, "");

    if let Some(reviews) =
        cell(row, columns::REVIEWS_DATA).or_else(|| cell(row, columns::REVIEWS))
    {
        let (rating, count) = parse_reviews(reviews);
        record.rating = rating;
        record.review_count = count;
        record.reviews_text = reviews.to_string();
    }

    record.deals = deals_from_row(name, row);
    Some(record)
}

/// Normalizes every row in order, dropping rows without a name.
#[must_use]
pub fn normalize_rows(rows: &[RawRow]) -> Vec<RestaurantRecord> {
    let records: Vec<RestaurantRecord> = rows.iter().filter_map(normalize_row).collect();
    let dropped = rows.len() - records.len();
    if dropped > 0 {
        tracing::info!(dropped, "skipped rows without a restaurant name");
    }
    records
}
