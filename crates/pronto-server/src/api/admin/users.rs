use axum::{
    extract::{Path, State},
    Extension, Json,
};
use pronto_db::{RoleTypeRow, UserRow};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::super::{
    map_db_error, map_write_error, require_pool, required_text, ApiError, ApiResponse, AppState,
};

#[derive(Debug, Deserialize)]
pub(in crate::api) struct SetRoleRequest {
    /// Role type name, for example `"Admin"`.
    pub role: String,
}

/// GET /api/v1/admin/users (password digests are never serialized)
pub(in crate::api) async fn list_users(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<UserRow>>>, ApiError> {
    let rid = &req_id.0;
    let pool = require_pool(&state, rid)?;
    let rows = pronto_db::list_users(pool)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    Ok(Json(ApiResponse::new(rows, req_id.0.clone())))
}

/// PUT /api/v1/admin/users/:id/role
pub(in crate::api) async fn set_user_role(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
    Json(body): Json<SetRoleRequest>,
) -> Result<Json<ApiResponse<UserRow>>, ApiError> {
    let rid = &req_id.0;
    let pool = require_pool(&state, rid)?;
    let role = required_text(rid, "role", &body.role)?;

    let role_id = pronto_db::get_role_id(pool, &role)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?
        .ok_or_else(|| {
            ApiError::new(rid, "validation_error", format!("unknown role '{role}'"))
        })?;

    let row = pronto_db::set_user_role(pool, id, role_id)
        .await
        .map_err(|e| map_write_error(rid, &format!("user {id}"), &e))?;
    tracing::info!(user_id = id, role = %role, "user role changed");

    Ok(Json(ApiResponse::new(row, req_id.0.clone())))
}

/// GET /api/v1/admin/role-types
pub(in crate::api) async fn list_role_types(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<RoleTypeRow>>>, ApiError> {
    let rid = &req_id.0;
    let pool = require_pool(&state, rid)?;
    let rows = pronto_db::list_role_types(pool)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    Ok(Json(ApiResponse::new(rows, req_id.0.clone())))
}
