use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode},
};
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, DbErr};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

use vehicle_market::entities::car::{self, CarCreate};
use vehicle_market::entities::user::{self, Role, Tier, new_user};
use vehicle_market::entities::NewListing;
use vehicle_market::filtering::PageDefaults;
use vehicle_market::{AppState, JwtVerifier, ListingResource, app, database};

pub const SECRET: &[u8] = b"integration-test-secret-integration";

// Helper function to get database URL from environment or default to SQLite
fn get_test_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string())
}

#[allow(dead_code)]
pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(&get_test_database_url()).await?;
    database::setup_schema(&db).await?;
    Ok(db)
}

#[allow(dead_code)]
pub fn setup_test_app(db: &DatabaseConnection) -> Router {
    let state = AppState {
        db: db.clone(),
        verifier: Arc::new(JwtVerifier::new(SECRET)),
        paging: PageDefaults::default(),
    };
    app(state, &["*".to_string()])
}

#[allow(dead_code)]
pub async fn create_user(db: &DatabaseConnection, role: Role, tier: Tier) -> user::Model {
    new_user(
        &format!("{}@example.com", Uuid::new_v4()),
        "$argon2id$placeholder",
        role,
        tier,
    )
    .insert(db)
    .await
    .expect("Failed to insert user")
}

#[allow(dead_code)]
pub fn token_for(user: &user::Model) -> String {
    JwtVerifier::new(SECRET)
        .issue(user.id, user.role, chrono::Duration::hours(1))
        .expect("Failed to sign token")
}

/// A valid car body for `POST /api/cars`.
#[allow(dead_code)]
pub fn car_json(brand: &str, model: &str, year: i32, price: f64) -> Value {
    json!({
        "brand": brand,
        "model": model,
        "year": year,
        "price": price,
        "mileage": 42_000,
        "condition": "Used",
        "country": "Germany",
        "city": "Munich",
        "description": "One owner, full service history",
        "images": ["https://img.example.com/1.jpg"],
        "body_type": "Sedan",
        "fuel_type": "Diesel",
        "transmission": "Automatic",
        "doors": 4,
        "seats": 5
    })
}

#[derive(Clone, Copy)]
pub struct SeedCar<'a> {
    pub brand: &'a str,
    pub model: &'a str,
    pub year: i32,
    pub price: f64,
    pub mileage: Option<i32>,
    pub fuel_type: &'a str,
}

impl Default for SeedCar<'_> {
    fn default() -> Self {
        Self {
            brand: "Volkswagen",
            model: "Golf",
            year: 2018,
            price: 15_000.0,
            mileage: Some(60_000),
            fuel_type: "Petrol",
        }
    }
}

/// Insert a car straight through the store, bypassing auth and limits.
#[allow(dead_code)]
pub async fn seed_car(db: &DatabaseConnection, owner: Uuid, seed: SeedCar<'_>) -> car::Model {
    let payload = CarCreate {
        listing: NewListing {
            brand: seed.brand.to_string(),
            model: seed.model.to_string(),
            year: seed.year,
            price: seed.price,
            currency: "EUR".to_string(),
            mileage: seed.mileage,
            condition: "Used".to_string(),
            country: "Germany".to_string(),
            city: "Berlin".to_string(),
            description: format!("{} {} in good shape", seed.brand, seed.model),
            images: Vec::new(),
        },
        body_type: "Hatchback".to_string(),
        fuel_type: seed.fuel_type.to_string(),
        transmission: "Manual".to_string(),
        doors: Some(5),
        seats: Some(5),
    };
    car::Model::create(db, owner, payload)
        .await
        .expect("Failed to seed car")
}

/// `count` cars with distinct prices `1000, 2000, ...`.
#[allow(dead_code)]
pub async fn seed_numbered_cars(db: &DatabaseConnection, owner: Uuid, count: u32) {
    for i in 1..=count {
        seed_car(
            db,
            owner,
            SeedCar {
                model: &format!("Model {i}"),
                price: f64::from(i) * 1_000.0,
                ..SeedCar::default()
            },
        )
        .await;
    }
}

#[allow(dead_code)]
pub async fn get(app: &Router, uri: &str) -> (StatusCode, HeaderMap, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, headers, json)
}

#[allow(dead_code)]
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<&Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, json)
}

/// Values of `field` across a list response's items.
#[allow(dead_code)]
pub fn field_values(body: &Value, field: &str) -> Vec<Value> {
    body["items"]
        .as_array()
        .expect("items array")
        .iter()
        .map(|item| item[field].clone())
        .collect()
}
