//! The restaurant listing pipeline.
//!
//! raw rows → [`normalize`] → [`resolve`] (coordinates) → [`geo`] (distance to
//! the user) → [`filter`] → [`view`] cards. Every step here is pure apart from
//! the [`Geocoder`] seam, which callers implement over the network.

pub mod filter;
pub mod geo;
pub mod normalize;
pub mod pricing;
pub mod resolve;
pub mod reviews;
pub mod view;

pub use filter::{apply_filters_and_sorting, FilterParams, SortKey, SortOrder, SortSpec};
pub use geo::{apply_user_distance, distance_value, format_distance_miles, haversine_km};
pub use normalize::{normalize_row, normalize_rows, split_deals, RawRow};
pub use pricing::{extract_prices, min_price};
pub use resolve::{
    area_coordinates, coordinates_from_maps_url, resolve_coordinates, Geocoder, LocationHints,
    NoGeocoder, Resolution, ResolutionSource,
};
pub use reviews::parse_reviews;
pub use view::{
    deal_key, flyer_file_name, flyer_path, menu_key, render_card, star_string, DealItem,
    RestaurantCard, ViewState,
};

use pronto_core::RestaurantRecord;

/// Normalizes raw rows and resolves coordinates for each resulting record.
///
/// Rows without a name are dropped. Resolution runs one record at a time in
/// row order, so the output order matches the input order.
pub async fn build_records<G: Geocoder + ?Sized>(
    rows: &[RawRow],
    geocoder: &G,
) -> Vec<RestaurantRecord> {
    let mut records = normalize_rows(rows);
    locate_records(&mut records, geocoder).await;
    records
}

/// Resolves coordinates for records that were normalized elsewhere.
pub async fn locate_records<G: Geocoder + ?Sized>(records: &mut [RestaurantRecord], geocoder: &G) {
    for record in records {
        let resolution = resolve_coordinates(geocoder, &LocationHints::from_record(record)).await;
        tracing::debug!(
            restaurant = %record.name,
            source = ?resolution.source,
            "resolved coordinates"
        );
        record.coordinates = Some(resolution.coordinates);
    }
}

#[cfg(test)]
mod tests {
    use pronto_core::CITY_CENTRE;

    use super::*;

    #[tokio::test]
    async fn build_records_resolves_every_named_row() {
        let rows: Vec<RawRow> = vec![
            [("name", "Downtown Diner")]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            [("name", "Pembina Pizza"), ("location", "Pembina Hwy")]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            RawRow::new(),
        ];

        let records = build_records(&rows, &NoGeocoder).await;

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].coordinates, Some(CITY_CENTRE));
        assert_eq!(
            records[1].coordinates,
            Some(pronto_core::Coordinates::new(49.8155, -97.1531))
        );
    }
}
