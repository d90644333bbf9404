// Sort resolution: allow-listed columns, direction parsing, the combined
// `sort` form, the created_at DESC fallback and the id tie-break.

use axum::http::StatusCode;
use serde_json::Value;

mod common;
use common::{
    SeedCar, create_user, field_values, get, seed_car, seed_numbered_cars, setup_test_app,
    setup_test_db,
};
use vehicle_market::entities::user::{Role, Tier};

async fn app_with_cars(count: u32) -> axum::Router {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let seller = create_user(&db, Role::Admin, Tier::Professional).await;
    seed_numbered_cars(&db, seller.id, count).await;
    setup_test_app(&db)
}

fn prices(body: &Value) -> Vec<f64> {
    field_values(body, "price")
        .iter()
        .map(|price| price.as_f64().unwrap())
        .collect()
}

fn ids(body: &Value) -> Vec<String> {
    field_values(body, "id")
        .iter()
        .map(|id| id.as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_price_ascending_is_reverse_of_descending() {
    let app = app_with_cars(9).await;

    let (_, _, asc) = get(&app, "/api/cars?sortBy=price&sortOrder=ASC&limit=50").await;
    let (_, _, desc) = get(&app, "/api/cars?sortBy=price&sortOrder=DESC&limit=50").await;

    let asc = prices(&asc);
    let mut desc = prices(&desc);
    assert!(asc.windows(2).all(|pair| pair[0] < pair[1]));
    desc.reverse();
    assert_eq!(asc, desc);
}

#[tokio::test]
async fn test_sort_order_is_case_insensitive() {
    let app = app_with_cars(5).await;

    let (_, _, lower) = get(&app, "/api/cars?sortBy=price&sortOrder=asc").await;
    let (_, _, upper) = get(&app, "/api/cars?sortBy=price&sortOrder=ASC").await;
    assert_eq!(ids(&lower), ids(&upper));
}

#[tokio::test]
async fn test_invalid_sort_order_falls_back_to_descending() {
    let app = app_with_cars(5).await;

    let (status, _, body) = get(&app, "/api/cars?sortBy=price&sortOrder=sideways").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(prices(&body), vec![5_000.0, 4_000.0, 3_000.0, 2_000.0, 1_000.0]);
}

#[tokio::test]
async fn test_unknown_sort_by_falls_back_to_default() {
    let app = app_with_cars(6).await;

    let (default_status, _, default) = get(&app, "/api/cars").await;
    let (status, _, unknown) = get(&app, "/api/cars?sortBy=brand;DROP%20TABLE%20cars&sortOrder=ASC").await;
    let (_, _, explicit) = get(&app, "/api/cars?sortBy=created_at&sortOrder=DESC").await;

    assert_eq!(default_status, StatusCode::OK);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&unknown), ids(&default));
    assert_eq!(ids(&explicit), ids(&default));
}

#[tokio::test]
async fn test_combined_sort_values() {
    let app = app_with_cars(4).await;

    let (_, _, body) = get(&app, "/api/cars?sort=price_asc").await;
    assert_eq!(prices(&body), vec![1_000.0, 2_000.0, 3_000.0, 4_000.0]);

    let (_, _, body) = get(&app, "/api/cars?sort=price_desc").await;
    assert_eq!(prices(&body), vec![4_000.0, 3_000.0, 2_000.0, 1_000.0]);

    // sortBy wins over the combined form.
    let (_, _, body) = get(&app, "/api/cars?sort=price_desc&sortBy=price&sortOrder=ASC").await;
    assert_eq!(prices(&body), vec![1_000.0, 2_000.0, 3_000.0, 4_000.0]);
}

#[tokio::test]
async fn test_ties_break_on_id() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let seller = create_user(&db, Role::Admin, Tier::Professional).await;
    for _ in 0..8 {
        seed_car(
            &db,
            seller.id,
            SeedCar {
                price: 9_999.0,
                ..SeedCar::default()
            },
        )
        .await;
    }
    let app = setup_test_app(&db);

    let (_, _, all) = get(&app, "/api/cars?sortBy=price&limit=8").await;
    let all = ids(&all);
    let mut sorted = all.clone();
    sorted.sort();
    assert_eq!(all, sorted);

    let mut paged = Vec::new();
    for page in 1..=4 {
        let (_, _, body) = get(&app, &format!("/api/cars?sortBy=price&limit=2&page={page}")).await;
        paged.extend(ids(&body));
    }
    assert_eq!(paged, all);
}
