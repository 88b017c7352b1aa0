//! Public listing endpoints.
//!
//! - `GET /api/v1/restaurants` filtered, sorted restaurant cards
//! - `GET /api/v1/location` the caller's resolved location

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::HeaderMap,
    Extension, Json,
};
use pronto_core::UserLocation;
use pronto_listing::{
    apply_filters_and_sorting, apply_user_distance, flyer_file_name, render_card, FilterParams,
    RestaurantCard, SortKey, SortOrder, SortSpec, ViewState,
};
use serde::{Deserialize, Serialize};

use crate::middleware::{client_ip, RequestId};

use super::{ApiError, ApiResponse, AppState};

const NO_DATA_MESSAGE: &str = "No restaurant data found";
const CUSTOM_LOCATION_LABEL: &str = "Custom Location";
const MAX_RATING_THRESHOLD: f64 = 10.0;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct ListingQuery {
    pub max_distance: Option<f64>,
    /// 0–10 scale.
    pub min_rating: Option<f64>,
    pub min_reviews: Option<u32>,
    pub name: Option<String>,
    pub deal: Option<String>,
    pub max_price: Option<f64>,
    pub sort_by: Option<SortKey>,
    pub sort_order: Option<SortOrder>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// Comma-separated view keys (`deal_<slug>_<i>`, `menu_<slug>`).
    pub expand: Option<String>,
    pub expand_all: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct LocationQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[derive(Debug, Serialize)]
pub(super) struct ListingData {
    user_location: UserLocation,
    /// Size of the unfiltered collection.
    total: usize,
    count: usize,
    sort_by: SortKey,
    sort_order: SortOrder,
    restaurants: Vec<RestaurantCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct RefreshData {
    restaurants: usize,
}

impl ListingQuery {
    fn filter_params(&self) -> FilterParams {
        FilterParams {
            max_distance: self.max_distance,
            min_rating: self.min_rating.unwrap_or(0.0),
            min_reviews: self.min_reviews.unwrap_or(0),
            name_query: self.name.clone().unwrap_or_default(),
            deal_query: self.deal.clone().unwrap_or_default(),
            max_price: self.max_price,
        }
    }

    fn sort_spec(&self) -> SortSpec {
        SortSpec::new(
            self.sort_by.unwrap_or_default(),
            self.sort_order.unwrap_or_default(),
        )
    }

    fn view_state(&self) -> ViewState {
        if self.expand_all.unwrap_or(false) {
            return ViewState::expanded_everywhere();
        }
        ViewState::from_keys(
            self.expand
                .as_deref()
                .unwrap_or_default()
                .split(',')
                .map(str::trim)
                .filter(|key| !key.is_empty()),
        )
    }

    fn validate(&self, request_id: &str) -> Result<(), ApiError> {
        if let Some(rating) = self.min_rating {
            if !(0.0..=MAX_RATING_THRESHOLD).contains(&rating) {
                return Err(ApiError::new(
                    request_id,
                    "validation_error",
                    format!("min_rating must be between 0 and 10, got {rating}"),
                ));
            }
        }
        for (field, value) in [("max_distance", self.max_distance), ("max_price", self.max_price)] {
            if value.is_some_and(|v| !v.is_finite() || v < 0.0) {
                return Err(ApiError::new(
                    request_id,
                    "validation_error",
                    format!("{field} must be a non-negative number"),
                ));
            }
        }
        validate_coordinates(request_id, self.lat, self.lon)
    }
}

fn validate_coordinates(
    request_id: &str,
    lat: Option<f64>,
    lon: Option<f64>,
) -> Result<(), ApiError> {
    match (lat, lon) {
        (None, None) => Ok(()),
        (Some(lat), Some(lon)) if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon) => {
            Ok(())
        }
        (Some(_), Some(_)) => Err(ApiError::new(
            request_id,
            "validation_error",
            "lat must be within ±90 and lon within ±180",
        )),
        _ => Err(ApiError::new(
            request_id,
            "validation_error",
            "lat and lon must be supplied together",
        )),
    }
}

fn query_rejection(request_id: &str, rejection: &QueryRejection) -> ApiError {
    ApiError::new(request_id, "validation_error", rejection.body_text())
}

async fn resolve_user_location(
    state: &AppState,
    headers: &HeaderMap,
    lat: Option<f64>,
    lon: Option<f64>,
) -> UserLocation {
    if let (Some(latitude), Some(longitude)) = (lat, lon) {
        return UserLocation {
            latitude,
            longitude,
            address: CUSTOM_LOCATION_LABEL.to_string(),
        };
    }
    match &state.ip_locator {
        Some(locator) => locator.locate(client_ip(headers)).await,
        None => UserLocation::city_centre_default(),
    }
}

pub(super) async fn list_restaurants(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
    query: Result<Query<ListingQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<ListingData>>, ApiError> {
    let rid = &req_id.0;
    let Query(query) = query.map_err(|rejection| query_rejection(rid, &rejection))?;
    query.validate(rid)?;

    let user_location = resolve_user_location(&state, &headers, query.lat, query.lon).await;
    let cached = state.listing.records().await;

    let mut records = cached.as_ref().clone();
    apply_user_distance(&mut records, user_location.coordinates());

    let params = query.filter_params();
    let sort = query.sort_spec();
    let selected = apply_filters_and_sorting(&records, &params, sort);

    let mut view = query.view_state();
    if let Some(dir) = &state.flyer_dir {
        let mut with_flyer = Vec::new();
        for record in &selected {
            if tokio::fs::try_exists(dir.join(flyer_file_name(&record.name)))
                .await
                .unwrap_or(false)
            {
                with_flyer.push(record.name.clone());
            }
        }
        view = view.with_flyers(with_flyer);
    }

    let restaurants: Vec<RestaurantCard> = selected
        .iter()
        .map(|record| render_card(record, &view, &params.deal_query))
        .collect();

    tracing::debug!(
        total = records.len(),
        shown = restaurants.len(),
        sort_by = %sort.key,
        "rendered listing"
    );

    let message = records.is_empty().then(|| NO_DATA_MESSAGE.to_string());
    Ok(Json(ApiResponse::new(
        ListingData {
            user_location,
            total: records.len(),
            count: restaurants.len(),
            sort_by: sort.key,
            sort_order: sort.order,
            restaurants,
            message,
        },
        req_id.0.clone(),
    )))
}

pub(super) async fn user_location(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
    query: Result<Query<LocationQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<UserLocation>>, ApiError> {
    let rid = &req_id.0;
    let Query(query) = query.map_err(|rejection| query_rejection(rid, &rejection))?;
    validate_coordinates(rid, query.lat, query.lon)?;

    let location = resolve_user_location(&state, &headers, query.lat, query.lon).await;
    Ok(Json(ApiResponse::new(location, req_id.0.clone())))
}

/// POST /api/v1/admin/listing/refresh: reload the cached collection now.
pub(super) async fn refresh_listing(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<RefreshData>> {
    let restaurants = state.listing.refresh().await;
    Json(ApiResponse::new(RefreshData { restaurants }, req_id.0))
}
