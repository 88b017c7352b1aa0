use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, map_write_error, require_pool, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct AddFavoriteRequest {
    pub restaurant_id: i64,
}

#[derive(Debug, Serialize)]
pub(super) struct FavoritesData {
    user_id: i64,
    restaurant_ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct FavoriteChange {
    user_id: i64,
    restaurant_id: i64,
    /// False when the call left the favorites unchanged.
    changed: bool,
}

async fn ensure_user(pool: &sqlx::PgPool, request_id: &str, user_id: i64) -> Result<(), ApiError> {
    pronto_db::get_user_by_id(pool, user_id)
        .await
        .map_err(|e| map_db_error(request_id.to_owned(), &e))?
        .map(|_| ())
        .ok_or_else(|| ApiError::new(request_id, "not_found", format!("user {user_id} not found")))
}

/// GET /api/v1/users/:user_id/favorites
pub(super) async fn list_favorites(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(user_id): Path<i64>,
) -> Result<Json<ApiResponse<FavoritesData>>, ApiError> {
    let rid = &req_id.0;
    let pool = require_pool(&state, rid)?;
    ensure_user(pool, rid, user_id).await?;

    let restaurant_ids = pronto_db::list_favorite_restaurant_ids(pool, user_id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse::new(
        FavoritesData {
            user_id,
            restaurant_ids,
        },
        req_id.0.clone(),
    )))
}

/// POST /api/v1/users/:user_id/favorites (idempotent add)
pub(super) async fn add_favorite(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(user_id): Path<i64>,
    Json(body): Json<AddFavoriteRequest>,
) -> Result<(StatusCode, Json<ApiResponse<FavoriteChange>>), ApiError> {
    let rid = &req_id.0;
    let pool = require_pool(&state, rid)?;
    ensure_user(pool, rid, user_id).await?;

    let changed = pronto_db::add_favorite(pool, user_id, body.restaurant_id)
        .await
        .map_err(|e| map_write_error(rid, "favorite", &e))?;
    let status = if changed {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(ApiResponse::new(
            FavoriteChange {
                user_id,
                restaurant_id: body.restaurant_id,
                changed,
            },
            req_id.0.clone(),
        )),
    ))
}

/// DELETE /api/v1/users/:user_id/favorites/:restaurant_id
pub(super) async fn remove_favorite(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((user_id, restaurant_id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<FavoriteChange>>, ApiError> {
    let rid = &req_id.0;
    let pool = require_pool(&state, rid)?;

    let changed = pronto_db::remove_favorite(pool, user_id, restaurant_id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse::new(
        FavoriteChange {
            user_id,
            restaurant_id,
            changed,
        },
        req_id.0.clone(),
    )))
}
