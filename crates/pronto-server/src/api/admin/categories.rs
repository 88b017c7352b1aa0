use axum::{extract::State, http::StatusCode, Extension, Json};
use pronto_db::{CategoryRow, RestaurantCategoryRow};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::super::{
    map_db_error, map_write_error, require_pool, required_text, ApiError, ApiResponse, AppState,
};

#[derive(Debug, Deserialize)]
pub(in crate::api) struct CreateCategoryRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(in crate::api) struct CreateRestaurantCategoryRequest {
    pub restaurant_id: i64,
    pub category_id: i64,
}

/// GET /api/v1/admin/categories
pub(in crate::api) async fn list_categories(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<CategoryRow>>>, ApiError> {
    let rid = &req_id.0;
    let pool = require_pool(&state, rid)?;
    let rows = pronto_db::list_categories(pool)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    Ok(Json(ApiResponse::new(rows, req_id.0.clone())))
}

/// POST /api/v1/admin/categories
pub(in crate::api) async fn create_category(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryRow>>), ApiError> {
    let rid = &req_id.0;
    let pool = require_pool(&state, rid)?;
    let name = required_text(rid, "name", &body.name)?;

    let row = pronto_db::create_category(pool, &name)
        .await
        .map_err(|e| map_write_error(rid, "category", &e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(row, req_id.0.clone())),
    ))
}

/// GET /api/v1/admin/restaurant-categories
pub(in crate::api) async fn list_restaurant_categories(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<RestaurantCategoryRow>>>, ApiError> {
    let rid = &req_id.0;
    let pool = require_pool(&state, rid)?;
    let rows = pronto_db::list_restaurant_categories(pool)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    Ok(Json(ApiResponse::new(rows, req_id.0.clone())))
}

/// POST /api/v1/admin/restaurant-categories
pub(in crate::api) async fn create_restaurant_category(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateRestaurantCategoryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RestaurantCategoryRow>>), ApiError> {
    let rid = &req_id.0;
    let pool = require_pool(&state, rid)?;

    let row = pronto_db::create_restaurant_category(pool, body.restaurant_id, body.category_id)
        .await
        .map_err(|e| map_write_error(rid, "restaurant category", &e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(row, req_id.0.clone())),
    ))
}
