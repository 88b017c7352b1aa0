//! Narrowing and ordering of a restaurant collection.
//!
//! Filters are applied in a fixed order (rating, review count, name, deal
//! text, price, distance) and each is a pure narrowing. Sorting is stable so
//! ties keep their input order in both directions.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use pronto_core::RestaurantRecord;
use serde::{Deserialize, Serialize};

use crate::geo::distance_value;
use crate::pricing::{extract_prices, min_price};

/// Thresholds supplied by the person browsing. Unset values never exclude.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParams {
    /// Miles.
    pub max_distance: Option<f64>,
    /// On a 0–10 scale; halved before comparing with stored ratings.
    pub min_rating: f64,
    pub min_reviews: u32,
    pub name_query: String,
    pub deal_query: String,
    pub max_price: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Distance,
    Rating,
    ReviewCount,
    Price,
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Distance => "distance",
            Self::Rating => "rating",
            Self::ReviewCount => "review_count",
            Self::Price => "price",
        };
        f.write_str(s)
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(' ', "_").as_str() {
            "distance" => Ok(Self::Distance),
            "rating" => Ok(Self::Rating),
            "review_count" | "reviews" => Ok(Self::ReviewCount),
            "price" => Ok(Self::Price),
            other => Err(format!(
                "unknown sort key '{other}' (expected distance, rating, review_count or price)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "asc", alias = "ascending")]
    Ascending,
    #[serde(rename = "desc", alias = "descending")]
    Descending,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            other => Err(format!("unknown sort order '{other}' (expected asc or desc)")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: SortKey,
    pub order: SortOrder,
}

impl SortSpec {
    #[must_use]
    pub const fn new(key: SortKey, order: SortOrder) -> Self {
        Self { key, order }
    }

    fn key_of(self, record: &RestaurantRecord) -> f64 {
        match self.key {
            SortKey::Distance => distance_value(&record.distance),
            SortKey::Rating => record.rating,
            SortKey::ReviewCount => f64::from(record.review_count),
            SortKey::Price => min_price(record),
        }
    }

    fn compare(self, a: &RestaurantRecord, b: &RestaurantRecord) -> Ordering {
        let (a, b) = (self.key_of(a), self.key_of(b));
        match self.order {
            SortOrder::Ascending => a.total_cmp(&b),
            SortOrder::Descending => b.total_cmp(&a),
        }
    }
}

/// Lower-cased, trimmed query, or `None` when there is nothing to match.
fn normalized_query(query: &str) -> Option<String> {
    let trimmed = query.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
}

fn passes_price_cap(record: &RestaurantRecord, cap: f64) -> bool {
    let prices = extract_prices(&record.deals);
    prices.is_empty() || prices.iter().any(|price| *price <= cap)
}

fn mentions_deal(record: &RestaurantRecord, query: &str) -> bool {
    record
        .deals
        .text_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(query))
}

/// Filters then stably sorts `records`, returning borrowed references.
///
/// The input slice is never modified, so applying the same parameters twice
/// yields the same result.
#[must_use]
pub fn apply_filters_and_sorting<'a>(
    records: &'a [RestaurantRecord],
    params: &FilterParams,
    sort: SortSpec,
) -> Vec<&'a RestaurantRecord> {
    let min_rating = params.min_rating / 10.0 * 5.0;
    let name_query = normalized_query(&params.name_query);
    let deal_query = normalized_query(&params.deal_query);

    let mut selected: Vec<&RestaurantRecord> = records
        .iter()
        .filter(|r| r.rating >= min_rating)
        .filter(|r| r.review_count >= params.min_reviews)
        .filter(|r| {
            name_query
                .as_deref()
                .is_none_or(|q| r.name.to_lowercase().contains(q))
        })
        .filter(|r| deal_query.as_deref().is_none_or(|q| mentions_deal(r, q)))
        .filter(|r| params.max_price.is_none_or(|cap| passes_price_cap(r, cap)))
        .filter(|r| {
            params
                .max_distance
                .is_none_or(|cap| distance_value(&r.distance) <= cap)
        })
        .collect();

    selected.sort_by(|a, b| sort.compare(a, b));
    selected
}

#[cfg(test)]
#[path = "filter_test.rs"]
mod tests;
