use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use pronto_db::{DealRow, NewDeal};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::super::{
    map_db_error, map_write_error, require_pool, required_text, ApiError, ApiResponse, AppState,
};

#[derive(Debug, Deserialize)]
pub(in crate::api) struct CreateDealRequest {
    pub restaurant_id: i64,
    pub details: String,
    pub summarized_deal: String,
    pub price: Option<Decimal>,
}

/// GET /api/v1/admin/deals
pub(in crate::api) async fn list_deals(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<DealRow>>>, ApiError> {
    let rid = &req_id.0;
    let pool = require_pool(&state, rid)?;
    let rows = pronto_db::list_deals(pool)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    Ok(Json(ApiResponse::new(rows, req_id.0.clone())))
}

/// POST /api/v1/admin/deals
pub(in crate::api) async fn create_deal(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateDealRequest>,
) -> Result<(StatusCode, Json<ApiResponse<DealRow>>), ApiError> {
    let rid = &req_id.0;
    let pool = require_pool(&state, rid)?;

    let details = required_text(rid, "details", &body.details)?;
    let summarized_deal = required_text(rid, "summarized_deal", &body.summarized_deal)?;
    if body.price.is_some_and(|p| p.is_sign_negative()) {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "price must not be negative",
        ));
    }

    let row = pronto_db::create_deal(
        pool,
        &NewDeal {
            restaurant_id: body.restaurant_id,
            details: &details,
            summarized_deal: &summarized_deal,
            price: body.price.map(|p| p.round_dp(2)),
        },
    )
    .await
    .map_err(|e| map_write_error(rid, &format!("restaurant {}", body.restaurant_id), &e))?;
    tracing::info!(deal_id = row.id, restaurant_id = row.restaurant_id, "deal created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(row, req_id.0.clone())),
    ))
}

/// DELETE /api/v1/admin/deals/:id
pub(in crate::api) async fn delete_deal(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;
    let pool = require_pool(&state, rid)?;

    pronto_db::delete_deal(pool, id)
        .await
        .map_err(|e| map_write_error(rid, &format!("deal {id}"), &e))?;

    Ok(Json(ApiResponse::new(
        serde_json::json!({ "deleted": true }),
        req_id.0.clone(),
    )))
}
