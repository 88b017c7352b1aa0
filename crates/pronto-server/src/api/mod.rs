mod admin;
mod auth;
mod favorites;
mod restaurants;

use std::path::PathBuf;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{delete, get, patch, post, put},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use pronto_sources::IpLocator;
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::listing_cache::ListingCache;
use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState, RequestId,
};

#[derive(Clone)]
pub struct AppState {
    /// `None` when the server runs from a CSV or sheet without a database.
    pub pool: Option<PgPool>,
    pub listing: ListingCache,
    /// `None` skips IP lookups; every caller gets the city-centre default.
    pub ip_locator: Option<IpLocator>,
    pub flyer_dir: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(data: T, request_id: String) -> Self {
        Self {
            data,
            meta: ResponseMeta::new(request_id),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "service_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_db_error(request_id: String, error: &pronto_db::DbError) -> ApiError {
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

/// Maps write failures: duplicates become `conflict`, dangling ids
/// `validation_error`, missing rows `not_found`.
pub(super) fn map_write_error(
    request_id: &str,
    what: &str,
    error: &pronto_db::DbError,
) -> ApiError {
    if error.is_unique_violation() {
        return ApiError::new(request_id, "conflict", "This record already exists");
    }
    if error.is_foreign_key_violation() {
        return ApiError::new(
            request_id,
            "validation_error",
            format!("{what} references a record that does not exist"),
        );
    }
    if matches!(error, pronto_db::DbError::NotFound) {
        return ApiError::new(request_id, "not_found", format!("{what} not found"));
    }
    map_db_error(request_id.to_owned(), error)
}

pub(super) fn require_pool<'a>(state: &'a AppState, request_id: &str) -> Result<&'a PgPool, ApiError> {
    state.pool.as_ref().ok_or_else(|| {
        ApiError::new(
            request_id,
            "service_unavailable",
            "no database is configured for this server",
        )
    })
}

/// Trims a required text field, rejecting blank values.
pub(super) fn required_text(request_id: &str, field: &str, value: &str) -> Result<String, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::new(
            request_id,
            "validation_error",
            format!("{field} is required"),
        ));
    }
    Ok(trimmed.to_owned())
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn auth_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

fn protected_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/users/{user_id}/favorites",
            get(favorites::list_favorites).post(favorites::add_favorite),
        )
        .route(
            "/api/v1/users/{user_id}/favorites/{restaurant_id}",
            delete(favorites::remove_favorite),
        )
        .route(
            "/api/v1/admin/listing/refresh",
            post(restaurants::refresh_listing),
        )
        .route(
            "/api/v1/admin/restaurants",
            get(admin::list_restaurants).post(admin::create_restaurant),
        )
        .route(
            "/api/v1/admin/restaurants/{id}",
            patch(admin::update_restaurant).delete(admin::delete_restaurant),
        )
        .route(
            "/api/v1/admin/deals",
            get(admin::list_deals).post(admin::create_deal),
        )
        .route("/api/v1/admin/deals/{id}", delete(admin::delete_deal))
        .route(
            "/api/v1/admin/categories",
            get(admin::list_categories).post(admin::create_category),
        )
        .route(
            "/api/v1/admin/restaurant-categories",
            get(admin::list_restaurant_categories).post(admin::create_restaurant_category),
        )
        .route("/api/v1/admin/users", get(admin::list_users))
        .route("/api/v1/admin/users/{id}/role", put(admin::set_user_role))
        .route("/api/v1/admin/role-types", get(admin::list_role_types))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                )),
        )
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/restaurants", get(restaurants::list_restaurants))
        .route("/api/v1/location", get(restaurants::user_location));

    Router::new()
        .merge(public_routes)
        .merge(auth_router(rate_limit.clone()))
        .merge(protected_router(auth, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    let Some(pool) = state.pool.as_ref() else {
        return (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "not_configured",
                },
                meta,
            }),
        );
    };

    match pronto_db::health_check(pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
