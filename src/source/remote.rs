use super::cache::FetchCache;
use super::{Document, Result, SourceError};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Fetches `<base_url>/<document>.json` over HTTP GET.
///
/// Responses are memoised in a [`FetchCache`] owned by the source, so a
/// long-lived `RemoteSource` reused across cycles only hits the network once
/// per document per TTL window.
pub struct RemoteSource {
    client: Client,
    base_url: String,
    cache: FetchCache,
}

impl RemoteSource {
    pub fn new(base_url: &str, cache_ttl: Duration, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(SourceError::Config("remote base URL is empty".to_string()));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Config(format!("failed to build HTTP client: {}", e)))?;
        let cache = FetchCache::new(cache_ttl);
        tracing::debug!(%base_url, ttl_secs = cache.ttl().as_secs(), "remote source ready");
        Ok(Self {
            client,
            base_url,
            cache,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, document: Document) -> String {
        format!("{}/{}", self.base_url, document.file_name())
    }

    /// Drop every cached document; the next fetch goes to the network.
    pub fn invalidate(&mut self) {
        self.cache.clear();
    }

    pub async fn fetch(&mut self, document: Document) -> Result<Value> {
        if let Some(value) = self.cache.get(document) {
            tracing::debug!(%document, "serving cached document");
            return Ok(value);
        }

        let url = self.url_for(document);
        let value = self.fetch_uncached(document, &url).await?;
        self.cache.insert(document, value.clone());
        Ok(value)
    }

    async fn fetch_uncached(&self, document: Document, url: &str) -> Result<Value> {
        tracing::info!(%document, url, "fetching document");
        let request_error = |source| SourceError::Request {
            document,
            url: url.to_string(),
            source,
        };

        let resp = self.client.get(url).send().await.map_err(request_error)?;
        if !resp.status().is_success() {
            return Err(SourceError::Status {
                document,
                url: url.to_string(),
                status: resp.status(),
            });
        }

        let body = resp.bytes().await.map_err(request_error)?;
        serde_json::from_slice(&body).map_err(|source| SourceError::Malformed { document, source })
    }
}
