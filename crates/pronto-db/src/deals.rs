//! Database operations for the `deals` table.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use crate::DbError;

/// A row from the `deals` table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DealRow {
    pub id: i64,
    pub restaurant_id: i64,
    pub restaurant_name: Option<String>,
    pub details: String,
    pub summarized_deal: String,
    pub price: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDeal<'a> {
    pub restaurant_id: i64,
    pub details: &'a str,
    pub summarized_deal: &'a str,
    pub price: Option<Decimal>,
}

/// Returns every deal grouped by restaurant, in insertion order within each.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_deals(pool: &PgPool) -> Result<Vec<DealRow>, DbError> {
    let rows = sqlx::query_as::<_, DealRow>(
        "SELECT id, restaurant_id, restaurant_name, details, summarized_deal, price, created_at \
         FROM deals \
         ORDER BY restaurant_id, id",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Inserts a deal, denormalizing the restaurant name from `restaurants`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the restaurant does not exist, or
/// [`DbError::Sqlx`] if the insert fails.
pub async fn create_deal(pool: &PgPool, new: &NewDeal<'_>) -> Result<DealRow, DbError> {
    let row = sqlx::query_as::<_, DealRow>(
        "INSERT INTO deals (restaurant_id, restaurant_name, details, summarized_deal, price) \
         SELECT r.id, r.name, $2, $3, $4 FROM restaurants r WHERE r.id = $1 \
         RETURNING id, restaurant_id, restaurant_name, details, summarized_deal, price, created_at",
    )
    .bind(new.restaurant_id)
    .bind(new.details)
    .bind(new.summarized_deal)
    .bind(new.price)
    .fetch_optional(pool)
    .await?;
    row.ok_or(DbError::NotFound)
}

/// Deletes one deal.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no deal has `id`, or [`DbError::Sqlx`]
/// if the query fails.
pub async fn delete_deal(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM deals WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
