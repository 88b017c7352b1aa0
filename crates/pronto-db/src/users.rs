//! Users and role types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::DbError;

pub const ADMIN_ROLE_ID: i32 = 1;
pub const USER_ROLE_ID: i32 = 2;

/// A row from the `users` table. `password` holds the stored digest and is
/// never serialized.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: i32,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE_ID
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RoleTypeRow {
    pub id: i32,
    pub role_type: String,
}

/// Inserts a user and returns the stored row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails, including a duplicate email
/// (see [`DbError::is_unique_violation`]).
pub async fn create_user(
    pool: &PgPool,
    email: &str,
    password_digest: &str,
    role: i32,
) -> Result<UserRow, DbError> {
    let row = sqlx::query_as::<_, UserRow>(
        "INSERT INTO users (email, password, role) VALUES ($1, $2, $3) \
         RETURNING id, email, password, role, created_at",
    )
    .bind(email)
    .bind(password_digest)
    .bind(role)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_user_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRow>, DbError> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, email, password, role, created_at FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_user_by_id(pool: &PgPool, id: i64) -> Result<Option<UserRow>, DbError> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, email, password, role, created_at FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_users(pool: &PgPool) -> Result<Vec<UserRow>, DbError> {
    let rows = sqlx::query_as::<_, UserRow>(
        "SELECT id, email, password, role, created_at FROM users ORDER BY id",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Changes a user's role.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the user does not exist, or
/// [`DbError::Sqlx`] if the update fails (for example an unknown role id).
pub async fn set_user_role(pool: &PgPool, user_id: i64, role: i32) -> Result<UserRow, DbError> {
    let row = sqlx::query_as::<_, UserRow>(
        "UPDATE users SET role = $2 WHERE id = $1 \
         RETURNING id, email, password, role, created_at",
    )
    .bind(user_id)
    .bind(role)
    .fetch_optional(pool)
    .await?;
    row.ok_or(DbError::NotFound)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_role_types(pool: &PgPool) -> Result<Vec<RoleTypeRow>, DbError> {
    let rows = sqlx::query_as::<_, RoleTypeRow>("SELECT id, role_type FROM role_types ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Adds a role type with the next free id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails, including a duplicate name.
pub async fn create_role_type(pool: &PgPool, role_type: &str) -> Result<RoleTypeRow, DbError> {
    let row = sqlx::query_as::<_, RoleTypeRow>(
        "INSERT INTO role_types (id, role_type) \
         SELECT COALESCE(MAX(id), 0) + 1, $1 FROM role_types \
         RETURNING id, role_type",
    )
    .bind(role_type)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_role_name(pool: &PgPool, role_id: i32) -> Result<Option<String>, DbError> {
    let name = sqlx::query_scalar::<_, String>("SELECT role_type FROM role_types WHERE id = $1")
        .bind(role_id)
        .fetch_optional(pool)
        .await?;
    Ok(name)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_role_id(pool: &PgPool, role_type: &str) -> Result<Option<i32>, DbError> {
    let id = sqlx::query_scalar::<_, i32>("SELECT id FROM role_types WHERE role_type = $1")
        .bind(role_type)
        .fetch_optional(pool)
        .await?;
    Ok(id)
}
