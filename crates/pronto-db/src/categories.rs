//! Categories and the restaurant ↔ category link table.

use serde::Serialize;
use sqlx::PgPool;

use crate::DbError;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CategoryRow {
    pub id: i64,
    pub name: String,
}

/// A link row with both sides' display names resolved.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RestaurantCategoryRow {
    pub id: i64,
    pub restaurant_id: i64,
    pub category_id: i64,
    pub restaurant_name: String,
    pub category_name: String,
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_categories(pool: &PgPool) -> Result<Vec<CategoryRow>, DbError> {
    let rows = sqlx::query_as::<_, CategoryRow>("SELECT id, name FROM categories ORDER BY name")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails, including a duplicate name
/// (see [`DbError::is_unique_violation`]).
pub async fn create_category(pool: &PgPool, name: &str) -> Result<CategoryRow, DbError> {
    let row = sqlx::query_as::<_, CategoryRow>(
        "INSERT INTO categories (name) VALUES ($1) RETURNING id, name",
    )
    .bind(name)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Lists every link with names joined in; a dangling side falls back to
/// `"Restaurant {id}"` / `"Category {id}"`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_restaurant_categories(
    pool: &PgPool,
) -> Result<Vec<RestaurantCategoryRow>, DbError> {
    let rows = sqlx::query_as::<_, RestaurantCategoryRow>(
        "SELECT rc.id, rc.restaurant_id, rc.category_id, \
                COALESCE(r.name, 'Restaurant ' || rc.restaurant_id::TEXT) AS restaurant_name, \
                COALESCE(c.name, 'Category ' || rc.category_id::TEXT) AS category_name \
         FROM restaurant_categories rc \
         LEFT JOIN restaurants r ON r.id = rc.restaurant_id \
         LEFT JOIN categories c ON c.id = rc.category_id \
         ORDER BY rc.id",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Links a restaurant to a category and returns the joined row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails, including an existing link
/// (see [`DbError::is_unique_violation`]) or a missing restaurant/category.
pub async fn create_restaurant_category(
    pool: &PgPool,
    restaurant_id: i64,
    category_id: i64,
) -> Result<RestaurantCategoryRow, DbError> {
    let row = sqlx::query_as::<_, RestaurantCategoryRow>(
        "WITH inserted AS ( \
             INSERT INTO restaurant_categories (restaurant_id, category_id) \
             VALUES ($1, $2) \
             RETURNING id, restaurant_id, category_id \
         ) \
         SELECT i.id, i.restaurant_id, i.category_id, \
                COALESCE(r.name, 'Restaurant ' || i.restaurant_id::TEXT) AS restaurant_name, \
                COALESCE(c.name, 'Category ' || i.category_id::TEXT) AS category_name \
         FROM inserted i \
         LEFT JOIN restaurants r ON r.id = i.restaurant_id \
         LEFT JOIN categories c ON c.id = i.category_id",
    )
    .bind(restaurant_id)
    .bind(category_id)
    .fetch_one(pool)
    .await?;
    Ok(row)
}
