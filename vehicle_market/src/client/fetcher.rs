//! Outbound list requests.
//!
//! The controller only knows [`ListingFetcher`]; [`HttpFetcher`] owns the
//! transport details: base URL, timeout and HTTP error mapping.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use crate::models::{ListResponse, VehicleKind};

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid base URL '{url}': {reason}")]
    BaseUrl { url: String, reason: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
}

#[async_trait]
pub trait ListingFetcher: Send + Sync {
    /// Fetch one page of listings.
    ///
    /// # Errors
    ///
    /// Transport, timeout, non-success status or decoding failures.
    async fn fetch(
        &self,
        kind: VehicleKind,
        params: &[(String, String)],
    ) -> Result<ListResponse<Value>, FetchError>;
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// [`ListingFetcher`] over the marketplace HTTP API.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    base_url: Url,
}

impl HttpFetcher {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// # Errors
    ///
    /// Returns an error when `base_url` does not parse or the client cannot
    /// be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let base_url = Url::parse(base_url).map_err(|err| FetchError::BaseUrl {
            url: base_url.to_string(),
            reason: err.to_string(),
        })?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, kind: VehicleKind) -> Result<Url, FetchError> {
        let path = format!("api/{}", kind.plural());
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        base.join(&path).map_err(|err| FetchError::BaseUrl {
            url: self.base_url.to_string(),
            reason: err.to_string(),
        })
    }
}

#[async_trait]
impl ListingFetcher for HttpFetcher {
    async fn fetch(
        &self,
        kind: VehicleKind,
        params: &[(String, String)],
    ) -> Result<ListResponse<Value>, FetchError> {
        let url = self.endpoint(kind)?;
        tracing::debug!(%url, params = params.len(), "fetching listings");

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await?;
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .map(|body| body.error)
                .unwrap_or_else(|_| String::from_utf8_lossy(&body).into_owned());
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}
