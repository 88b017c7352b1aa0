use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use pronto_db::{NewRestaurant, RestaurantRow, RestaurantUpdate};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::super::{
    map_db_error, map_write_error, require_pool, required_text, ApiError, ApiResponse, AppState,
};
use super::{blank_to_none, double_option, validate_url};

#[derive(Debug, Deserialize)]
pub(in crate::api) struct CreateRestaurantRequest {
    pub name: String,
    pub address: String,
    pub location: Option<String>,
    pub logo_url: Option<String>,
    pub website_url: Option<String>,
    pub menu_url: Option<String>,
    pub maps_url: Option<String>,
    pub reviews_count: Option<i32>,
    /// 0–10 scale.
    pub average_rating: Option<f64>,
}

// Outer None = field absent (keep), Some(None) = explicit null (clear).
#[allow(clippy::option_option)]
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(in crate::api) struct UpdateRestaurantRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    #[serde(deserialize_with = "double_option")]
    pub location: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub logo_url: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub website_url: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub menu_url: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub maps_url: Option<Option<String>>,
    pub reviews_count: Option<i32>,
    pub average_rating: Option<f64>,
}

/// Outer `None` keeps the column; an inner blank or null clears it.
#[allow(clippy::option_option, clippy::ref_option)]
fn nullable(field: &Option<Option<String>>) -> Option<Option<&str>> {
    field.as_ref().map(|inner| blank_to_none(inner.as_deref()))
}

fn validate_counts(
    request_id: &str,
    reviews_count: Option<i32>,
    average_rating: Option<f64>,
) -> Result<(), ApiError> {
    if reviews_count.is_some_and(|n| n < 0) {
        return Err(ApiError::new(
            request_id,
            "validation_error",
            "reviews_count must not be negative",
        ));
    }
    if average_rating.is_some_and(|r| !(0.0..=10.0).contains(&r)) {
        return Err(ApiError::new(
            request_id,
            "validation_error",
            "average_rating must be between 0 and 10",
        ));
    }
    Ok(())
}

fn validate_urls<'a>(
    request_id: &str,
    urls: impl IntoIterator<Item = (&'static str, Option<&'a str>)>,
) -> Result<(), ApiError> {
    for (field, value) in urls {
        if let Some(url) = blank_to_none(value) {
            validate_url(request_id, field, url)?;
        }
    }
    Ok(())
}

/// GET /api/v1/admin/restaurants
pub(in crate::api) async fn list_restaurants(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<RestaurantRow>>>, ApiError> {
    let rid = &req_id.0;
    let pool = require_pool(&state, rid)?;
    let rows = pronto_db::list_restaurants(pool)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    Ok(Json(ApiResponse::new(rows, req_id.0.clone())))
}

/// POST /api/v1/admin/restaurants
pub(in crate::api) async fn create_restaurant(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateRestaurantRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RestaurantRow>>), ApiError> {
    let rid = &req_id.0;
    let pool = require_pool(&state, rid)?;

    let name = required_text(rid, "name", &body.name)?;
    let address = required_text(rid, "address", &body.address)?;
    validate_counts(rid, body.reviews_count, body.average_rating)?;
    validate_urls(
        rid,
        [
            ("logo_url", body.logo_url.as_deref()),
            ("website_url", body.website_url.as_deref()),
            ("menu_url", body.menu_url.as_deref()),
            ("maps_url", body.maps_url.as_deref()),
        ],
    )?;

    let row = pronto_db::create_restaurant(
        pool,
        &NewRestaurant {
            name: &name,
            address: &address,
            location: blank_to_none(body.location.as_deref()),
            logo_url: blank_to_none(body.logo_url.as_deref()),
            website_url: blank_to_none(body.website_url.as_deref()),
            menu_url: blank_to_none(body.menu_url.as_deref()),
            maps_url: blank_to_none(body.maps_url.as_deref()),
            reviews_count: body.reviews_count.unwrap_or(0),
            average_rating: body.average_rating.unwrap_or(0.0),
        },
    )
    .await
    .map_err(|e| map_write_error(rid, "restaurant", &e))?;
    tracing::info!(restaurant_id = row.id, "restaurant created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(row, req_id.0.clone())),
    ))
}

/// PATCH /api/v1/admin/restaurants/:id
pub(in crate::api) async fn update_restaurant(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateRestaurantRequest>,
) -> Result<Json<ApiResponse<RestaurantRow>>, ApiError> {
    let rid = &req_id.0;
    let pool = require_pool(&state, rid)?;

    let name = body
        .name
        .as_deref()
        .map(|n| required_text(rid, "name", n))
        .transpose()?;
    let address = body
        .address
        .as_deref()
        .map(|a| required_text(rid, "address", a))
        .transpose()?;
    validate_counts(rid, body.reviews_count, body.average_rating)?;
    validate_urls(
        rid,
        [
            ("logo_url", body.logo_url.as_ref().and_then(|v| v.as_deref())),
            ("website_url", body.website_url.as_ref().and_then(|v| v.as_deref())),
            ("menu_url", body.menu_url.as_ref().and_then(|v| v.as_deref())),
            ("maps_url", body.maps_url.as_ref().and_then(|v| v.as_deref())),
        ],
    )?;

    let update = RestaurantUpdate {
        name: name.as_deref(),
        address: address.as_deref(),
        location: nullable(&body.location),
        logo_url: nullable(&body.logo_url),
        website_url: nullable(&body.website_url),
        menu_url: nullable(&body.menu_url),
        maps_url: nullable(&body.maps_url),
        reviews_count: body.reviews_count,
        average_rating: body.average_rating,
    };

    let row = pronto_db::update_restaurant(pool, id, &update)
        .await
        .map_err(|e| map_write_error(rid, &format!("restaurant {id}"), &e))?;

    Ok(Json(ApiResponse::new(row, req_id.0.clone())))
}

/// DELETE /api/v1/admin/restaurants/:id
pub(in crate::api) async fn delete_restaurant(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;
    let pool = require_pool(&state, rid)?;

    pronto_db::delete_restaurant(pool, id)
        .await
        .map_err(|e| map_write_error(rid, &format!("restaurant {id}"), &e))?;
    tracing::info!(restaurant_id = id, "restaurant deleted");

    Ok(Json(ApiResponse::new(
        serde_json::json!({ "deleted": true }),
        req_id.0.clone(),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_distinguishes_absent_null_and_value() {
        let body: UpdateRestaurantRequest = serde_json::from_value(serde_json::json!({
            "location": null,
            "menu_url": "https://example.com/menu",
        }))
        .expect("deserialize");
        assert_eq!(body.location, Some(None));
        assert_eq!(body.menu_url, Some(Some("https://example.com/menu".to_string())));
        assert_eq!(body.maps_url, None);
        assert_eq!(nullable(&body.location), Some(None));
        assert_eq!(nullable(&body.maps_url), None);
    }

    #[test]
    fn rating_is_checked_on_the_ten_point_scale() {
        assert!(validate_counts("req", Some(3), Some(8.6)).is_ok());
        assert!(validate_counts("req", None, Some(10.5)).is_err());
        assert!(validate_counts("req", Some(-1), None).is_err());
    }
}
