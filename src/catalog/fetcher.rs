//! HTTP catalog source
//!
//! Fetches the remote item document and parses it into [`CatalogEntry`]
//! rows. Transient fetch failures are retried with exponential backoff
//! before the error is surfaced.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

use super::{CatalogEntry, CatalogError, CatalogResult, CatalogSource, TierConfig};

/// Configuration for the HTTP catalog source
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Maximum retry attempts on transient failure
    pub max_retries: u32,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 3,
        }
    }
}

/// Catalog source backed by a remote YAML document
pub struct HttpCatalogSource {
    url: Url,
    tiering: TierConfig,
    config: FetcherConfig,
    client: Client,
}

impl HttpCatalogSource {
    /// Create a source with default fetch settings
    pub fn new(url: Url, tiering: TierConfig) -> CatalogResult<Self> {
        Self::with_config(url, tiering, FetcherConfig::default())
    }

    /// Create a source with explicit fetch settings
    pub fn with_config(
        url: Url,
        tiering: TierConfig,
        config: FetcherConfig,
    ) -> CatalogResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(CatalogError::Http)?;

        Ok(Self {
            url,
            tiering,
            config,
            client,
        })
    }

    /// The document URL this source reads from
    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn fetch_document(&self) -> CatalogResult<String> {
        let mut last_error: Option<CatalogError> = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s...
                let delay = Duration::from_secs(2_u64.pow(attempt - 1));
                tokio::time::sleep(delay).await;
                tracing::debug!(
                    attempt = attempt + 1,
                    max = self.config.max_retries + 1,
                    "retrying catalog fetch"
                );
            }

            let result = async {
                let response = self
                    .client
                    .get(self.url.clone())
                    .send()
                    .await?
                    .error_for_status()?;
                Ok::<_, reqwest::Error>(response.text().await?)
            }
            .await;

            match result {
                Ok(body) => return Ok(body),
                Err(e) => {
                    tracing::warn!(error = %e, url = %self.url, "catalog fetch failed");
                    last_error = Some(CatalogError::Http(e));
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| CatalogError::Other("catalog fetch failed".to_string())))
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch(&self) -> CatalogResult<Vec<CatalogEntry>> {
        let body = self.fetch_document().await?;
        let entries: Vec<CatalogEntry> = serde_yaml::from_str(&body)?;
        tracing::debug!(count = entries.len(), "catalog fetched");
        Ok(entries)
    }

    fn tiering(&self) -> &TierConfig {
        &self.tiering
    }
}
