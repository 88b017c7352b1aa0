//! Card view model for one restaurant, driven by an explicit [`ViewState`].

use std::collections::HashSet;

use pronto_core::{Deals, RestaurantRecord, DEAL_DELIMITER};
use serde::Serialize;

use crate::normalize::split_deals;

const STAR_SLOTS: usize = 5;
const NO_DEALS_NOTE: &str = "No deals available";

/// Which deal and menu sections are expanded, keyed by view key.
///
/// Keys look like `deal_<slug>_<index>` and `menu_<slug>`, where the slug is
/// the lower-cased restaurant name with spaces replaced by underscores.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    expanded: HashSet<String>,
    expand_all: bool,
    flyers: HashSet<String>,
}

impl ViewState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A state with every section expanded.
    #[must_use]
    pub fn expanded_everywhere() -> Self {
        Self {
            expand_all: true,
            ..Self::default()
        }
    }

    /// Builds a state from a list of expanded keys (for example a query parameter).
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            expanded: keys.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Marks restaurants (by name) whose promotional flyer is available.
    #[must_use]
    pub fn with_flyers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.flyers.extend(names.into_iter().map(Into::into));
        self
    }

    /// Flips one key and returns its new state.
    pub fn toggle(&mut self, key: &str) -> bool {
        if self.expanded.remove(key) {
            false
        } else {
            self.expanded.insert(key.to_string());
            true
        }
    }

    #[must_use]
    pub fn is_expanded(&self, key: &str) -> bool {
        self.expand_all || self.expanded.contains(key)
    }

    #[must_use]
    pub fn has_flyer(&self, restaurant: &str) -> bool {
        self.flyers.contains(restaurant)
    }
}

fn slug(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

#[must_use]
pub fn deal_key(restaurant: &str, index: usize) -> String {
    format!("deal_{}_{index}", slug(restaurant))
}

#[must_use]
pub fn menu_key(restaurant: &str) -> String {
    format!("menu_{}", slug(restaurant))
}

/// File name of a restaurant's promotional flyer image.
#[must_use]
pub fn flyer_file_name(restaurant: &str) -> String {
    format!("{}_flyer.jpg", slug(restaurant))
}

/// Conventional location of a restaurant's promotional flyer image.
#[must_use]
pub fn flyer_path(restaurant: &str) -> String {
    format!("flyers/{}", flyer_file_name(restaurant))
}

/// Five-slot star string: full stars, an optional half, then empty stars.
#[must_use]
pub fn star_string(rating: f64) -> String {
    let rating = rating.clamp(0.0, 5.0);
    let floor = rating.floor();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let full = floor as usize;
    let half = usize::from(rating - floor >= 0.5);
    let empty = STAR_SLOTS.saturating_sub(full + half);

    let mut stars = "★".repeat(full);
    if half == 1 {
        stars.push('½');
    }
    stars.push_str(&"☆".repeat(empty));
    stars
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DealItem {
    /// Position in the restaurant's full deal list, stable under filtering.
    pub index: usize,
    pub key: String,
    pub summary: String,
    /// Present only while the deal is expanded.
    pub detail: Option<String>,
    pub expanded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestaurantCard {
    pub id: Option<i64>,
    pub name: String,
    pub address: String,
    pub location: String,
    pub distance: String,
    pub rating: f64,
    pub stars: String,
    /// `"4.3/5 (120 reviews)"`.
    pub rating_label: String,
    pub review_count: u32,
    pub reviews_text: String,
    pub logo_url: String,
    pub website: String,
    pub maps_url: String,
    pub deals: Vec<DealItem>,
    /// Shown instead of deals when none are listed.
    pub deals_note: Option<String>,
    /// Set when a flyer exists and one of the listed deals is expanded.
    pub flyer_path: Option<String>,
    pub menu_key: String,
    /// Present only while the menu section is expanded.
    pub menu_url: Option<String>,
}

fn deal_pairs(deals: &Deals) -> Vec<(String, Option<String>)> {
    match deals {
        Deals::None => Vec::new(),
        Deals::Structured { summaries, details } => summaries
            .iter()
            .zip(details)
            .map(|(s, d)| (s.clone(), Some(d.clone())))
            .collect(),
        Deals::Legacy { text } if text.contains(DEAL_DELIMITER) => {
            split_deals(text).into_iter().map(|s| (s, None)).collect()
        }
        Deals::Legacy { text } if text.trim().is_empty() => Vec::new(),
        Deals::Legacy { text } => vec![(text.trim().to_string(), None)],
    }
}

fn deal_items(record: &RestaurantRecord, view: &ViewState, query: Option<&str>) -> Vec<DealItem> {
    deal_pairs(&record.deals)
        .into_iter()
        .enumerate()
        .filter(|(_, (summary, detail))| {
            query.is_none_or(|q| {
                summary.to_lowercase().contains(q)
                    || detail.as_deref().is_some_and(|d| d.to_lowercase().contains(q))
            })
        })
        .map(|(index, (summary, detail))| {
            let key = deal_key(&record.name, index);
            let expanded = view.is_expanded(&key);
            // Legacy deals have no separate detail; expanding shows the deal text itself.
            let detail = expanded.then(|| detail.unwrap_or_else(|| summary.clone()));
            DealItem {
                index,
                key,
                summary,
                detail,
                expanded,
            }
        })
        .collect()
}

/// Renders one record into its card, honouring the view state and deal query.
#[must_use]
pub fn render_card(record: &RestaurantRecord, view: &ViewState, deal_query: &str) -> RestaurantCard {
    let trimmed = deal_query.trim();
    let query = (!trimmed.is_empty()).then(|| trimmed.to_lowercase());
    let deals = deal_items(record, view, query.as_deref());

    let deals_note = deals.is_empty().then(|| match &query {
        Some(_) => format!("No deals matching '{trimmed}'"),
        None => NO_DEALS_NOTE.to_string(),
    });

    let flyer = (view.has_flyer(&record.name) && deals.iter().any(|d| d.expanded))
        .then(|| flyer_path(&record.name));

    let menu_key = menu_key(&record.name);
    let menu_url = (view.is_expanded(&menu_key) && !record.menu_url.is_empty())
        .then(|| record.menu_url.clone());

    RestaurantCard {
        id: record.id,
        name: record.name.clone(),
        address: record.address.clone(),
        location: record.location.clone(),
        distance: record.distance.clone(),
        rating: record.rating,
        stars: star_string(record.rating),
        rating_label: format!("{:.1}/5 ({} reviews)", record.rating, record.review_count),
        review_count: record.review_count,
        reviews_text: record.reviews_text.clone(),
        logo_url: record.logo_url.clone(),
        website: record.website.clone(),
        maps_url: record.maps_url.clone(),
        deals,
        deals_note,
        flyer_path: flyer,
        menu_key,
        menu_url,
    }
}
