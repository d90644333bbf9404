//! # vehicle-market
//!
//! Listing API for a vehicle marketplace: trucks, cars, motorcycles,
//! e-bikes and caravans, each with filterable, sortable and paginated list
//! endpoints, single-listing reads, and authenticated writes bounded by the
//! seller's tier.
//!
//! ```rust,ignore
//! let db = database::connect(&config.database_url).await?;
//! database::setup_schema(&db).await?;
//! let state = AppState {
//!     db,
//!     verifier: Arc::new(JwtVerifier::new(config.jwt_secret.as_bytes())),
//!     paging: config.paging,
//! };
//! axum::serve(listener, routes::app(state, &config.cors_allowed_origins)).await?;
//! ```
//!
//! The [`client`] module is the consumer side: browse state, persisted
//! preferences and a debounced, race-free fetch controller.

pub mod auth;
pub mod client;
pub mod config;
pub mod core;
pub mod database;
pub mod entities;
pub mod errors;
pub mod filtering;
pub mod models;
pub mod openapi;
pub mod operations;
pub mod routes;
pub mod validation;

pub use auth::{AuthUser, JwtVerifier, TokenVerifier};
pub use config::Config;
pub use core::{IntoListingActiveModel, ListingResource, MergeIntoActiveModel};
pub use errors::ApiError;
pub use models::{ListResponse, ListingQuery, VehicleKind};
pub use routes::{AppState, app};
pub use validation::{Validatable, ValidationError, ValidationErrors};
