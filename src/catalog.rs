use crate::models::CatalogSnapshot;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::fmt;
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no data returned")]
    NoResponse,
    #[error("{0}")]
    RemoteError(String),
    #[error("catalog endpoint answered {0}")]
    Status(StatusCode),
    #[error("catalog request failed: {0}")]
    Transport(#[source] reqwest::Error),
}

#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn fetch_catalog(&self) -> Result<CatalogSnapshot, FetchError>;
}

#[derive(Clone)]
pub struct CatalogClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl CatalogClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    async fn request(&self) -> Result<CatalogSnapshot, FetchError> {
        // The key is part of the path; reqwest errors must drop the URL.
        let url = format!("{}{}", self.base_url, self.api_key);
        debug!("Requesting Top 250 from {}", self.base_url);
        let res = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.without_url()))?;
        let status = res.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        let text = res
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.without_url()))?;
        parse_catalog(&text)
    }
}

impl fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl CatalogApi for CatalogClient {
    async fn fetch_catalog(&self) -> Result<CatalogSnapshot, FetchError> {
        match self.request().await {
            Ok(snapshot) => {
                info!("Fetched {} movies from the catalog", snapshot.items.len());
                Ok(snapshot)
            }
            Err(e) => {
                error!("Catalog fetch failed: {}", e);
                Err(e)
            }
        }
    }
}

/// Interprets a response body from the Top 250 endpoint.
pub fn parse_catalog(body: &str) -> Result<CatalogSnapshot, FetchError> {
    if body.trim().is_empty() {
        return Err(FetchError::NoResponse);
    }
    let mut snapshot: CatalogSnapshot = match serde_json::from_str(body) {
        Ok(s) => s,
        Err(e) => {
            warn!("Catalog body is not a valid snapshot: {}", e);
            return Err(FetchError::NoResponse);
        }
    };
    if let Some(message) = snapshot.remote_error() {
        return Err(FetchError::RemoteError(message.to_string()));
    }

    let before = snapshot.items.len();
    snapshot.items.retain(|m| m.has_id());
    let dropped = before - snapshot.items.len();
    if dropped > 0 {
        warn!("Dropped {} catalog entries without an identifier", dropped);
    }
    snapshot.error_message = None;
    Ok(snapshot)
}
