//! Admin CRUD handlers (bearer protected).
//!
//! - `/api/v1/admin/restaurants`            list, create; `/{id}` patch, delete
//! - `/api/v1/admin/deals`                  list, create; `/{id}` delete
//! - `/api/v1/admin/categories`             list, create
//! - `/api/v1/admin/restaurant-categories`  list, create
//! - `/api/v1/admin/users`                  list; `/{id}/role` put
//! - `/api/v1/admin/role-types`             list

mod categories;
mod deals;
mod restaurants;
mod users;

pub(super) use categories::{
    create_category, create_restaurant_category, list_categories, list_restaurant_categories,
};
pub(super) use deals::{create_deal, delete_deal, list_deals};
pub(super) use restaurants::{
    create_restaurant, delete_restaurant, list_restaurants, update_restaurant,
};
pub(super) use users::{list_role_types, list_users, set_user_role};

use serde::{Deserialize, Deserializer};

use super::ApiError;

/// Keeps an explicit JSON `null` as `Some(None)`; use with `#[serde(default)]`.
#[allow(clippy::option_option)]
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Parse a URL and convert parse failures into a standardized validation error.
fn validate_url(request_id: &str, field: &str, value: &str) -> Result<(), ApiError> {
    reqwest::Url::parse(value).map(|_| ()).map_err(|_| {
        ApiError::new(
            request_id,
            "validation_error",
            format!("'{field}' must be a valid URL, got '{value}'"),
        )
    })
}

/// Blank optional text is stored as NULL.
fn blank_to_none(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
