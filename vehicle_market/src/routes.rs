use axum::{
    Json, Router,
    extract::{FromRef, Path, Query, State},
    http::{HeaderValue, Method, StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use hyper::HeaderMap;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use utoipa::ToSchema;
use utoipa_scalar::{Scalar, Servable};
use uuid::Uuid;

use crate::auth::{AuthUser, TokenVerifier};
use crate::core::ListingResource;
use crate::entities::{caravan, car, ebike, motorcycle, truck};
use crate::errors::ApiError;
use crate::filtering::{PageDefaults, calculate_content_range};
use crate::models::{ListResponse, ListingQuery};
use crate::openapi;
use crate::operations;

/// Shared, immutable request context.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub verifier: Arc<dyn TokenVerifier>,
    pub paging: PageDefaults,
}

/// List one listing table with filters, sort and pagination.
pub async fn get_all<R: ListingResource>(
    State(db): State<DatabaseConnection>,
    State(paging): State<PageDefaults>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<(HeaderMap, Json<ListResponse<R>>), ApiError> {
    let query = ListingQuery::from_params(params);
    let (response, page) = operations::list_listings::<R>(&db, &query, paging).await?;
    let headers = calculate_content_range(page.offset, page.limit, response.total, R::KIND.plural());
    Ok((headers, Json(response)))
}

pub async fn get_one<R: ListingResource>(
    State(db): State<DatabaseConnection>,
    Path(id): Path<Uuid>,
) -> Result<Json<R>, ApiError> {
    operations::get_listing::<R>(&db, id).await.map(Json)
}

pub async fn create_one<R: ListingResource>(
    State(db): State<DatabaseConnection>,
    caller: AuthUser,
    Json(payload): Json<R::CreateModel>,
) -> Result<(StatusCode, Json<R>), ApiError> {
    let created = operations::create_listing::<R>(&db, caller, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_one<R: ListingResource>(
    State(db): State<DatabaseConnection>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<R::UpdateModel>,
) -> Result<Json<R>, ApiError> {
    operations::update_listing::<R>(&db, caller, id, payload)
        .await
        .map(Json)
}

pub async fn delete_one<R: ListingResource>(
    State(db): State<DatabaseConnection>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    operations::delete_listing::<R>(&db, caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Serialize, ToSchema)]
pub struct HealthStatus {
    pub status: &'static str,
    pub database: &'static str,
}

/// Liveness plus a store ping.
pub async fn health(State(db): State<DatabaseConnection>) -> impl IntoResponse {
    match db.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthStatus {
                status: "ok",
                database: "up",
            }),
        ),
        Err(err) => {
            tracing::warn!(error = %err, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthStatus {
                    status: "degraded",
                    database: "down",
                }),
            )
        }
    }
}

/// The five CRUD routes for one listing table under `/api/{plural}`.
fn listing_routes<R: ListingResource>(router: Router<AppState>) -> Router<AppState> {
    let collection = format!("/api/{}", R::KIND.plural());
    let item = format!("{collection}/{{id}}");
    router
        .route(&collection, get(get_all::<R>).post(create_one::<R>))
        .route(
            &item,
            get(get_one::<R>).put(update_one::<R>).delete(delete_one::<R>),
        )
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins = if allowed_origins.iter().any(|origin| origin == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            allowed_origins
                .iter()
                .filter_map(|origin| HeaderValue::from_str(origin).ok()),
        )
    };
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([header::CONTENT_RANGE])
}

/// The full application router.
pub fn app(state: AppState, allowed_origins: &[String]) -> Router {
    let doc = openapi::api_doc();

    let router = Router::new().route("/health", get(health));
    let router = listing_routes::<truck::Model>(router);
    let router = listing_routes::<car::Model>(router);
    let router = listing_routes::<motorcycle::Model>(router);
    let router = listing_routes::<ebike::Model>(router);
    let router = listing_routes::<caravan::Model>(router);

    let json_doc = doc.clone();
    router
        .route(
            "/api-docs/openapi.json",
            get(move || {
                let doc = json_doc.clone();
                async move { Json(doc) }
            }),
        )
        .merge(Scalar::with_url("/docs", doc))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}
