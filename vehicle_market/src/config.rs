//! Configuration loaded from environment variables.

use anyhow::{Context, Result, bail};

use crate::filtering::PageDefaults;
use crate::filtering::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// Store connection URL (default: a local SQLite file).
    pub database_url: String,

    /// HS256 secret shared with the token issuer.
    pub jwt_secret: String,

    /// Page size bounds for every list endpoint (defaults: 12 and 100).
    pub paging: PageDefaults,

    /// CORS allowed origins (comma-separated, default: "*").
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Fails when a variable is present but malformed, or `JWT_SECRET` is
    /// missing or shorter than 32 bytes.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let database_url = lookup("DATABASE_URL")
            .unwrap_or_else(|| "sqlite://vehicle_market.db?mode=rwc".to_string());

        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET environment variable is required")?;
        if jwt_secret.len() < 32 {
            bail!("JWT_SECRET must be at least 32 bytes");
        }

        let page_size: u64 = lookup("DEFAULT_PAGE_SIZE")
            .map(|v| v.parse::<u64>())
            .transpose()
            .context("DEFAULT_PAGE_SIZE must be a positive integer")?
            .unwrap_or(DEFAULT_PAGE_SIZE);

        let max_page_size: u64 = lookup("MAX_PAGE_SIZE")
            .map(|v| v.parse::<u64>())
            .transpose()
            .context("MAX_PAGE_SIZE must be a positive integer")?
            .unwrap_or(MAX_PAGE_SIZE);

        if page_size == 0 || max_page_size < page_size {
            bail!("page sizes must satisfy 0 < DEFAULT_PAGE_SIZE <= MAX_PAGE_SIZE");
        }

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| vec!["*".to_string()]);

        Ok(Self {
            port,
            database_url,
            jwt_secret,
            paging: PageDefaults {
                page_size,
                max_page_size,
            },
            cors_allowed_origins,
        })
    }
}
