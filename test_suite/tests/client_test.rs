// The browse client against a real server bound to an ephemeral port.

use std::sync::Arc;
use std::time::Duration;

mod common;
use common::{SeedCar, create_user, seed_car, setup_test_app, setup_test_db};
use vehicle_market::VehicleKind;
use vehicle_market::client::{
    BrowseController, FetchError, HttpFetcher, ListingFetcher, MemoryPreferenceStore, Phase,
    SortChoice,
};
use vehicle_market::entities::user::{Role, Tier};

async fn spawn_server() -> String {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let seller = create_user(&db, Role::Admin, Tier::Professional).await;
    for (brand, price) in [("BMW", 21_000.0), ("BMW", 35_000.0), ("BMW", 52_000.0), ("Kia", 9_000.0)] {
        seed_car(
            &db,
            seller.id,
            SeedCar {
                brand,
                price,
                ..SeedCar::default()
            },
        )
        .await;
    }

    let app = setup_test_app(&db);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

#[tokio::test]
async fn test_http_fetcher_reads_envelope() {
    let base = spawn_server().await;
    let fetcher = HttpFetcher::new(&base, Duration::from_secs(5)).unwrap();

    let page = fetcher
        .fetch(
            VehicleKind::Car,
            &params(&[("brand", "BMW"), ("sort", "price_asc"), ("limit", "2")]),
        )
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0]["price"], 21_000.0);
}

#[tokio::test]
async fn test_http_fetcher_surfaces_server_errors() {
    let base = spawn_server().await;
    let fetcher = HttpFetcher::new(&base, Duration::from_secs(5)).unwrap();

    let err = fetcher
        .fetch(VehicleKind::Car, &params(&[("minPrice", "cheap")]))
        .await
        .unwrap_err();
    match err {
        FetchError::Status { status, message } => {
            assert_eq!(status, 422);
            assert_eq!(message, "Validation failed");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_http_fetcher_transport_failure() {
    // Bind then drop to get a port nothing listens on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let fetcher = HttpFetcher::new(&format!("http://{addr}"), Duration::from_secs(2)).unwrap();
    let err = fetcher.fetch(VehicleKind::Truck, &[]).await.unwrap_err();
    assert!(matches!(err, FetchError::Transport(_)));
}

#[tokio::test]
async fn test_controller_end_to_end() {
    let base = spawn_server().await;
    let fetcher = Arc::new(HttpFetcher::new(&base, Duration::from_secs(5)).unwrap());
    let prefs = Arc::new(MemoryPreferenceStore::default());
    let browse = BrowseController::new(VehicleKind::Car, fetcher, prefs);

    browse.refresh().await;
    let state = browse.snapshot().await;
    assert_eq!(state.phase, Phase::Success);
    assert_eq!(state.total, 4);

    browse.set_filter("brand", "BMW").await;
    browse.set_sort(SortChoice::PriceDesc).await;
    let state = browse.snapshot().await;
    assert_eq!(state.total, 3);
    assert_eq!(state.items[0]["price"], 52_000.0);

    browse.set_filter("maxPrice", "not-a-number").await;
    let state = browse.snapshot().await;
    assert_eq!(state.phase, Phase::Error);
    assert!(state.items.is_empty());
    assert_eq!(state.total, 0);
    assert!(state.error.is_some());
}
