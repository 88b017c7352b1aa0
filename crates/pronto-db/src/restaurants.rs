//! Database operations for the `restaurants` table.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::DbError;

const RESTAURANT_COLUMNS: &str = "id, name, address, location, logo_url, website_url, menu_url, \
                                  maps_url, reviews_count, average_rating, created_at, updated_at";

/// A row from the `restaurants` table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RestaurantRow {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub location: Option<String>,
    pub logo_url: Option<String>,
    pub website_url: Option<String>,
    pub menu_url: Option<String>,
    pub maps_url: Option<String>,
    pub reviews_count: i32,
    /// 0–10 scale.
    pub average_rating: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Column values for a new restaurant.
#[derive(Debug, Clone, Default)]
pub struct NewRestaurant<'a> {
    pub name: &'a str,
    pub address: &'a str,
    pub location: Option<&'a str>,
    pub logo_url: Option<&'a str>,
    pub website_url: Option<&'a str>,
    pub menu_url: Option<&'a str>,
    pub maps_url: Option<&'a str>,
    pub reviews_count: i32,
    pub average_rating: f64,
}

/// Partial update. `None` keeps the current value; for nullable columns
/// `Some(None)` clears it.
#[allow(clippy::option_option)]
#[derive(Debug, Clone, Default)]
pub struct RestaurantUpdate<'a> {
    pub name: Option<&'a str>,
    pub address: Option<&'a str>,
    pub location: Option<Option<&'a str>>,
    pub logo_url: Option<Option<&'a str>>,
    pub website_url: Option<Option<&'a str>>,
    pub menu_url: Option<Option<&'a str>>,
    pub maps_url: Option<Option<&'a str>>,
    pub reviews_count: Option<i32>,
    pub average_rating: Option<f64>,
}

/// Returns every restaurant ordered by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_restaurants(pool: &PgPool) -> Result<Vec<RestaurantRow>, DbError> {
    let rows = sqlx::query_as::<_, RestaurantRow>(&format!(
        "SELECT {RESTAURANT_COLUMNS} FROM restaurants ORDER BY id"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Returns one restaurant by id, or `None`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_restaurant(pool: &PgPool, id: i64) -> Result<Option<RestaurantRow>, DbError> {
    let row = sqlx::query_as::<_, RestaurantRow>(&format!(
        "SELECT {RESTAURANT_COLUMNS} FROM restaurants WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Inserts a restaurant and returns the stored row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_restaurant(
    pool: &PgPool,
    new: &NewRestaurant<'_>,
) -> Result<RestaurantRow, DbError> {
    let row = sqlx::query_as::<_, RestaurantRow>(&format!(
        "INSERT INTO restaurants \
           (name, address, location, logo_url, website_url, menu_url, maps_url, \
            reviews_count, average_rating) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         RETURNING {RESTAURANT_COLUMNS}"
    ))
    .bind(new.name)
    .bind(new.address)
    .bind(new.location)
    .bind(new.logo_url)
    .bind(new.website_url)
    .bind(new.menu_url)
    .bind(new.maps_url)
    .bind(new.reviews_count)
    .bind(new.average_rating)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Applies a partial update in a single `UPDATE … RETURNING`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no restaurant has `id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn update_restaurant(
    pool: &PgPool,
    id: i64,
    update: &RestaurantUpdate<'_>,
) -> Result<RestaurantRow, DbError> {
    let row = sqlx::query_as::<_, RestaurantRow>(&format!(
        "UPDATE restaurants \
         SET name           = COALESCE($2, name), \
             address        = COALESCE($3, address), \
             location       = CASE WHEN $4::BOOL  THEN $5  ELSE location END, \
             logo_url       = CASE WHEN $6::BOOL  THEN $7  ELSE logo_url END, \
             website_url    = CASE WHEN $8::BOOL  THEN $9  ELSE website_url END, \
             menu_url       = CASE WHEN $10::BOOL THEN $11 ELSE menu_url END, \
             maps_url       = CASE WHEN $12::BOOL THEN $13 ELSE maps_url END, \
             reviews_count  = COALESCE($14, reviews_count), \
             average_rating = COALESCE($15, average_rating), \
             updated_at     = NOW() \
         WHERE id = $1 \
         RETURNING {RESTAURANT_COLUMNS}"
    ))
    .bind(id)
    .bind(update.name)
    .bind(update.address)
    .bind(update.location.is_some())
    .bind(update.location.flatten())
    .bind(update.logo_url.is_some())
    .bind(update.logo_url.flatten())
    .bind(update.website_url.is_some())
    .bind(update.website_url.flatten())
    .bind(update.menu_url.is_some())
    .bind(update.menu_url.flatten())
    .bind(update.maps_url.is_some())
    .bind(update.maps_url.flatten())
    .bind(update.reviews_count)
    .bind(update.average_rating)
    .fetch_optional(pool)
    .await?;
    row.ok_or(DbError::NotFound)
}

/// Deletes a restaurant (its deals, categories and favorites cascade).
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no restaurant has `id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn delete_restaurant(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM restaurants WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
