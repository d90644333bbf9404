//! Vehicle marketplace listing API server.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use vehicle_market::{AppState, Config, JwtVerifier, app, database};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    init_tracing();

    let config = Config::from_env().context("failed to load configuration")?;
    info!(port = config.port, "Configuration loaded");

    let db = database::connect(&config.database_url)
        .await
        .context("failed to connect to database")?;
    database::setup_schema(&db)
        .await
        .context("failed to create schema")?;

    let state = AppState {
        db,
        verifier: Arc::new(JwtVerifier::new(config.jwt_secret.as_bytes())),
        paging: config.paging,
    };
    let router = app(state, &config.cors_allowed_origins);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind to address")?;

    info!(%addr, "Server listening, API docs at /docs");

    axum::serve(listener, router).await.context("server error")?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
