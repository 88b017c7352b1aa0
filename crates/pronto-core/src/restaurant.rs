//! Canonical restaurant shapes shared by every crate in the workspace.

use serde::{Deserialize, Serialize};

/// Separator between individual deals inside a joined deal string.
pub const DEAL_DELIMITER: &str = "->";

/// Distance string used until a user location is known.
pub const UNKNOWN_DISTANCE: &str = "Unknown";

/// Downtown Winnipeg; the last-resort coordinate for restaurants and users.
pub const CITY_CENTRE: Coordinates = Coordinates {
    latitude: 49.8951,
    longitude: -97.1384,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Where the person browsing the listing is, with a human-readable label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
}

impl UserLocation {
    /// The fallback used whenever IP geolocation fails.
    #[must_use]
    pub fn city_centre_default() -> Self {
        Self {
            latitude: CITY_CENTRE.latitude,
            longitude: CITY_CENTRE.longitude,
            address: "Winnipeg City Center (Default)".to_string(),
        }
    }

    #[must_use]
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// Deal text attached to a restaurant.
///
/// `Structured` holds positionally paired lists: `summaries[i]` describes
/// `details[i]` and both always have the same length.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Deals {
    #[default]
    None,
    Legacy {
        text: String,
    },
    Structured {
        summaries: Vec<String>,
        details: Vec<String>,
    },
}

impl Deals {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Deals::None => true,
            Deals::Legacy { text } => text.trim().is_empty(),
            Deals::Structured { summaries, .. } => summaries.is_empty(),
        }
    }

    /// Text fields in search order: summaries, then details, then legacy text.
    #[must_use]
    pub fn text_fields(&self) -> Vec<&str> {
        match self {
            Deals::None => Vec::new(),
            Deals::Legacy { text } => vec![text.as_str()],
            Deals::Structured { summaries, details } => summaries
                .iter()
                .chain(details.iter())
                .map(String::as_str)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantRecord {
    /// Database id when loaded from the store; `None` for sheet and CSV rows.
    pub id: Option<i64>,
    pub name: String,
    pub address: String,
    /// Free-text neighbourhood or area label.
    pub location: String,
    pub coordinates: Option<Coordinates>,
    /// Always within `[0, 5]`.
    pub rating: f64,
    pub review_count: u32,
    /// `"<miles> mi"` or [`UNKNOWN_DISTANCE`].
    pub distance: String,
    pub deals: Deals,
    /// The review summary the rating was parsed from, kept for display.
    pub reviews_text: String,
    pub logo_url: String,
    pub menu_url: String,
    pub website: String,
    pub maps_url: String,
}

impl RestaurantRecord {
    /// A record with every optional field at its default.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            address: String::new(),
            location: String::new(),
            coordinates: None,
            rating: 0.0,
            review_count: 0,
            distance: UNKNOWN_DISTANCE.to_string(),
            deals: Deals::None,
            reviews_text: String::new(),
            logo_url: String::new(),
            menu_url: String::new(),
            website: "#".to_string(),
            maps_url: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_record_uses_defaults() {
        let record = RestaurantRecord::named("Nicolinos");
        assert_eq!(record.distance, UNKNOWN_DISTANCE);
        assert_eq!(record.website, "#");
        assert_eq!(record.rating, 0.0);
        assert_eq!(record.review_count, 0);
        assert!(record.deals.is_empty());
    }

    #[test]
    fn structured_text_fields_list_summaries_before_details() {
        let deals = Deals::Structured {
            summaries: vec!["BOGO".to_string()],
            details: vec!["Buy one pizza get one free".to_string()],
        };
        assert_eq!(
            deals.text_fields(),
            vec!["BOGO", "Buy one pizza get one free"]
        );
    }

    #[test]
    fn deals_serialize_with_kind_tag() {
        let deals = Deals::Legacy {
            text: "Half-price wings".to_string(),
        };
        let json = serde_json::to_value(&deals).expect("serialize");
        assert_eq!(json["kind"], "legacy");
        assert_eq!(json["text"], "Half-price wings");
    }
}
