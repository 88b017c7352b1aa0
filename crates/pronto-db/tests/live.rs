//! Live integration tests for pronto-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database from the sqlx
//! test harness. `"../../migrations"` is relative to `crates/pronto-db/`.

use pronto_db::{
    add_favorite, create_category, create_deal, create_restaurant, create_restaurant_category,
    create_role_type, create_user, delete_restaurant, get_restaurant, get_role_id, get_role_name,
    get_user_by_email, list_deals, list_favorite_restaurant_ids, list_restaurant_categories,
    list_role_types, remove_favorite, set_user_role, update_restaurant, DbError, NewDeal,
    NewRestaurant, RestaurantUpdate, ADMIN_ROLE_ID, USER_ROLE_ID,
};
use rust_decimal::Decimal;

async fn insert_restaurant(pool: &sqlx::PgPool, name: &str) -> i64 {
    create_restaurant(
        pool,
        &NewRestaurant {
            name,
            address: "100 Main St, Winnipeg",
            reviews_count: 12,
            average_rating: 8.4,
            ..NewRestaurant::default()
        },
    )
    .await
    .unwrap_or_else(|e| panic!("insert_restaurant failed for '{name}': {e}"))
    .id
}

#[sqlx::test(migrations = "../../migrations")]
async fn roles_are_seeded(pool: sqlx::PgPool) {
    let roles = list_role_types(&pool).await.expect("roles");
    let names: Vec<&str> = roles.iter().map(|r| r.role_type.as_str()).collect();
    assert_eq!(names, vec!["Admin", "User"]);
    assert_eq!(
        get_role_name(&pool, ADMIN_ROLE_ID).await.expect("name").as_deref(),
        Some("Admin")
    );
    assert_eq!(get_role_id(&pool, "User").await.expect("id"), Some(USER_ROLE_ID));
}

#[sqlx::test(migrations = "../../migrations")]
async fn create_role_type_takes_next_id(pool: sqlx::PgPool) {
    let role = create_role_type(&pool, "Moderator").await.expect("create role");
    assert_eq!(role.id, 3);
}

#[sqlx::test(migrations = "../../migrations")]
async fn duplicate_email_is_unique_violation(pool: sqlx::PgPool) {
    create_user(&pool, "a@example.com", "digest", USER_ROLE_ID)
        .await
        .expect("first insert");
    let err = create_user(&pool, "a@example.com", "digest", USER_ROLE_ID)
        .await
        .expect_err("duplicate insert");
    assert!(err.is_unique_violation(), "got {err:?}");
}

#[sqlx::test(migrations = "../../migrations")]
async fn set_user_role_updates_and_reports_missing(pool: sqlx::PgPool) {
    let user = create_user(&pool, "b@example.com", "digest", USER_ROLE_ID)
        .await
        .expect("insert");
    let promoted = set_user_role(&pool, user.id, ADMIN_ROLE_ID)
        .await
        .expect("promote");
    assert!(promoted.is_admin());

    let fetched = get_user_by_email(&pool, "b@example.com")
        .await
        .expect("query")
        .expect("user exists");
    assert_eq!(fetched.role, ADMIN_ROLE_ID);

    let missing = set_user_role(&pool, 9_999, ADMIN_ROLE_ID).await;
    assert!(matches!(missing, Err(DbError::NotFound)));
}

#[sqlx::test(migrations = "../../migrations")]
async fn update_restaurant_keeps_clears_and_sets(pool: sqlx::PgPool) {
    let id = insert_restaurant(&pool, "Patch Me").await;
    sqlx::query("UPDATE restaurants SET menu_url = 'https://menu' WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .expect("seed menu url");

    let updated = update_restaurant(
        &pool,
        id,
        &RestaurantUpdate {
            name: Some("Patched"),
            menu_url: Some(None),
            maps_url: Some(Some("https://maps/@49.9,-97.1")),
            ..RestaurantUpdate::default()
        },
    )
    .await
    .expect("update");

    assert_eq!(updated.name, "Patched");
    assert_eq!(updated.address, "100 Main St, Winnipeg");
    assert!(updated.menu_url.is_none());
    assert_eq!(updated.maps_url.as_deref(), Some("https://maps/@49.9,-97.1"));

    let missing = update_restaurant(&pool, 9_999, &RestaurantUpdate::default()).await;
    assert!(matches!(missing, Err(DbError::NotFound)));
}

#[sqlx::test(migrations = "../../migrations")]
async fn deals_copy_restaurant_name_and_cascade(pool: sqlx::PgPool) {
    let id = insert_restaurant(&pool, "Deal House").await;
    let deal = create_deal(
        &pool,
        &NewDeal {
            restaurant_id: id,
            details: "Two large pizzas for $25",
            summarized_deal: "2 for $25",
            price: Some(Decimal::new(2500, 2)),
        },
    )
    .await
    .expect("create deal");
    assert_eq!(deal.restaurant_name.as_deref(), Some("Deal House"));

    let orphan = create_deal(
        &pool,
        &NewDeal {
            restaurant_id: 9_999,
            details: "x",
            summarized_deal: "x",
            price: None,
        },
    )
    .await;
    assert!(matches!(orphan, Err(DbError::NotFound)));

    delete_restaurant(&pool, id).await.expect("delete");
    assert!(get_restaurant(&pool, id).await.expect("query").is_none());
    assert!(list_deals(&pool).await.expect("deals").is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
async fn restaurant_categories_join_names(pool: sqlx::PgPool) {
    let id = insert_restaurant(&pool, "Noodle Bar").await;
    let category = create_category(&pool, "Asian").await.expect("category");

    let link = create_restaurant_category(&pool, id, category.id)
        .await
        .expect("link");
    assert_eq!(link.restaurant_name, "Noodle Bar");
    assert_eq!(link.category_name, "Asian");

    let duplicate = create_restaurant_category(&pool, id, category.id)
        .await
        .expect_err("duplicate link");
    assert!(duplicate.is_unique_violation());

    let listed = list_restaurant_categories(&pool).await.expect("list");
    assert_eq!(listed.len(), 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn add_favorite_is_idempotent(pool: sqlx::PgPool) {
    let user = create_user(&pool, "fav@example.com", "digest", USER_ROLE_ID)
        .await
        .expect("user");
    let first = insert_restaurant(&pool, "First").await;
    let second = insert_restaurant(&pool, "Second").await;

    assert!(add_favorite(&pool, user.id, first).await.expect("add"));
    assert!(!add_favorite(&pool, user.id, first).await.expect("re-add"));
    assert!(add_favorite(&pool, user.id, second).await.expect("add"));

    let ids = list_favorite_restaurant_ids(&pool, user.id)
        .await
        .expect("list");
    assert_eq!(ids, vec![first, second]);

    assert!(remove_favorite(&pool, user.id, first).await.expect("remove"));
    assert_eq!(
        list_favorite_restaurant_ids(&pool, user.id)
            .await
            .expect("list"),
        vec![second]
    );
}
