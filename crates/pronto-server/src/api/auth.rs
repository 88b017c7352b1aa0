//! Account registration and login.
//!
//! Passwords are stored as lower-case SHA-256 hex. Accounts created before
//! hashing was introduced still hold the plain password; login accepts either
//! form, comparing in constant time. A stored digest is never accepted as a
//! plain password.

use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::middleware::RequestId;

use super::{map_db_error, require_pool, required_text, ApiError, ApiResponse, AppState};

const INVALID_CREDENTIALS: &str = "invalid email or password";

#[derive(Debug, Deserialize)]
pub(super) struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub(super) struct AccountData {
    id: i64,
    email: String,
    role: String,
    is_admin: bool,
    created_at: DateTime<Utc>,
}

pub(super) fn password_digest(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

fn is_password_digest(stored: &str) -> bool {
    stored.len() == 64 && stored.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Constant-time match against a stored hash or a legacy plain password.
fn password_matches(stored: &str, candidate: &str) -> bool {
    if is_password_digest(stored) {
        let digest = password_digest(candidate);
        bool::from(stored.as_bytes().ct_eq(digest.as_bytes()))
    } else {
        bool::from(stored.as_bytes().ct_eq(candidate.as_bytes()))
    }
}

fn normalize_email(request_id: &str, email: &str) -> Result<String, ApiError> {
    let email = required_text(request_id, "email", email)?.to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(ApiError::new(
            request_id,
            "validation_error",
            format!("'{email}' is not a valid email address"),
        )),
    }
}

async fn account_data(
    pool: &sqlx::PgPool,
    request_id: &str,
    user: pronto_db::UserRow,
) -> Result<AccountData, ApiError> {
    let role = pronto_db::get_role_name(pool, user.role)
        .await
        .map_err(|e| map_db_error(request_id.to_owned(), &e))?
        .unwrap_or_else(|| "User".to_string());
    Ok(AccountData {
        id: user.id,
        is_admin: user.is_admin(),
        email: user.email,
        role,
        created_at: user.created_at,
    })
}

/// POST /api/v1/auth/register: create a `User` account.
pub(super) async fn register(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AccountData>>), ApiError> {
    let rid = &req_id.0;
    let pool = require_pool(&state, rid)?;
    let email = normalize_email(rid, &body.email)?;
    if body.password.is_empty() {
        return Err(ApiError::new(rid, "validation_error", "password is required"));
    }

    let user = pronto_db::create_user(
        pool,
        &email,
        &password_digest(&body.password),
        pronto_db::USER_ROLE_ID,
    )
    .await
    .map_err(|e| {
        if e.is_unique_violation() {
            ApiError::new(rid, "conflict", "an account with that email already exists")
        } else {
            map_db_error(rid.clone(), &e)
        }
    })?;
    tracing::info!(user_id = user.id, "account registered");

    let data = account_data(pool, rid, user).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(data, req_id.0.clone())),
    ))
}

/// POST /api/v1/auth/login: verify credentials and return the account.
pub(super) async fn login(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CredentialsRequest>,
) -> Result<Json<ApiResponse<AccountData>>, ApiError> {
    let rid = &req_id.0;
    let pool = require_pool(&state, rid)?;
    let email = body.email.trim().to_lowercase();

    let user = pronto_db::get_user_by_email(pool, &email)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?
        .filter(|user| password_matches(&user.password, &body.password))
        .ok_or_else(|| ApiError::new(rid, "unauthorized", INVALID_CREDENTIALS))?;
    tracing::debug!(user_id = user.id, "login succeeded");

    let data = account_data(pool, rid, user).await?;
    Ok(Json(ApiResponse::new(data, req_id.0.clone())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_lowercase_sha256_hex() {
        assert_eq!(
            password_digest("password"),
            "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8"
        );
    }

    #[test]
    fn hashed_and_legacy_passwords_both_match() {
        let stored = password_digest("hunter2");
        assert!(password_matches(&stored, "hunter2"));
        assert!(password_matches("hunter2", "hunter2"));
        assert!(!password_matches(&stored, "hunter3"));
        assert!(!password_matches("", "hunter2"));
    }

    #[test]
    fn stored_digest_is_not_a_password() {
        let stored = password_digest("hunter2");
        assert!(!password_matches(&stored, &stored));
        assert!(!password_matches(&stored, &stored.to_uppercase()));
    }

    #[test]
    fn emails_are_lowercased_and_checked() {
        assert_eq!(
            normalize_email("req", " Diner@Example.COM ").expect("valid"),
            "diner@example.com"
        );
        assert!(normalize_email("req", "not-an-email").is_err());
        assert!(normalize_email("req", "@example.com").is_err());
        assert!(normalize_email("req", "   ").is_err());
    }
}
