//! Per-user favorite restaurants.

use sqlx::PgPool;

use crate::DbError;

/// Returns the user's favorite restaurant ids, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_favorite_restaurant_ids(pool: &PgPool, user_id: i64) -> Result<Vec<i64>, DbError> {
    let ids = sqlx::query_scalar::<_, i64>(
        "SELECT restaurant_id FROM favorites WHERE user_id = $1 ORDER BY created_at, restaurant_id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(ids)
}

/// Adds a favorite. Adding an existing favorite is a no-op.
///
/// Returns `true` when a new row was written.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails (for example an unknown
/// user or restaurant id).
pub async fn add_favorite(pool: &PgPool, user_id: i64, restaurant_id: i64) -> Result<bool, DbError> {
    let result = sqlx::query(
        "INSERT INTO favorites (user_id, restaurant_id) VALUES ($1, $2) \
         ON CONFLICT (user_id, restaurant_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(restaurant_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Removes a favorite; returns `true` when a row was deleted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn remove_favorite(
    pool: &PgPool,
    user_id: i64,
    restaurant_id: i64,
) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND restaurant_id = $2")
        .bind(user_id)
        .bind(restaurant_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
