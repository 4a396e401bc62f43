//! Webhook notifier
//!
//! Publishes each store update as a JSON payload via HTTP POST.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{DeliveryStatus, NotifyError, NotifyResult, PriceNotifier, StoreUpdate};

/// Webhook notifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Webhook URL endpoint
    pub url: String,

    /// Optional authentication token (sent as Bearer token)
    pub auth_token: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retry attempts on failure
    #[serde(default = "default_retries")]
    pub max_retries: u32,
}

fn default_timeout() -> u64 {
    10
}

fn default_retries() -> u32 {
    3
}

impl WebhookConfig {
    /// Create a new webhook configuration
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            auth_token: None,
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
        }
    }

    /// Set authentication token
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Set max retries
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.url.is_empty() {
            return Err("Webhook URL cannot be empty".to_string());
        }

        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err("Webhook URL must start with http:// or https://".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("Timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}

/// Notifier that POSTs store updates to an HTTP endpoint
pub struct WebhookNotifier {
    config: WebhookConfig,
    client: Client,
}

impl WebhookNotifier {
    /// Create a new webhook notifier
    pub fn new(config: WebhookConfig) -> NotifyResult<Self> {
        config.validate().map_err(NotifyError::InvalidConfig)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(NotifyError::Http)?;

        Ok(Self { config, client })
    }

    /// Create a notifier with just a URL
    pub fn from_url(url: impl Into<String>) -> NotifyResult<Self> {
        Self::new(WebhookConfig::new(url))
    }

    /// The endpoint this notifier posts to
    pub fn url(&self) -> &str {
        &self.config.url
    }

    async fn send_with_retry(&self, payload: &serde_json::Value) -> NotifyResult<()> {
        let mut last_error: Option<NotifyError> = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s...
                let delay = Duration::from_secs(2_u64.pow(attempt - 1));
                tokio::time::sleep(delay).await;
                tracing::debug!(
                    attempt = attempt + 1,
                    max = self.config.max_retries + 1,
                    "retrying webhook delivery"
                );
            }

            let mut request = self.client.post(&self.config.url).json(payload);
            if let Some(ref token) = self.config.auth_token {
                request = request.bearer_auth(token);
            }

            match request.send().await.and_then(|r| r.error_for_status()) {
                Ok(_) => return Ok(()),
                Err(e) => {
                    tracing::warn!(error = %e, url = %self.config.url, "webhook delivery failed");
                    last_error = Some(NotifyError::Http(e));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| NotifyError::Other("webhook delivery failed".to_string())))
    }
}

#[async_trait]
impl PriceNotifier for WebhookNotifier {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn publish(&self, update: &StoreUpdate) -> NotifyResult<DeliveryStatus> {
        let payload = serde_json::to_value(update)?;
        match self.send_with_retry(&payload).await {
            Ok(()) => Ok(DeliveryStatus::success("webhook")),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PriceConglomerate;
    use crate::notify::UpdateReason;
    use chrono::Utc;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_update() -> StoreUpdate {
        StoreUpdate {
            prices: PriceConglomerate::default(),
            reason: UpdateReason::ItemReroll,
            next_update: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_config_validation() {
        assert!(WebhookConfig::new("https://hooks.example.com/store")
            .validate()
            .is_ok());
        assert!(WebhookConfig::new("").validate().is_err());
        assert!(WebhookConfig::new("ftp://nope").validate().is_err());
        assert!(WebhookConfig::new("https://hooks.example.com")
            .with_timeout(0)
            .validate()
            .is_err());
    }

    #[tokio::test]
    async fn test_publish_posts_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/store"))
            .and(body_partial_json(serde_json::json!({"reason": "item-reroll"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = WebhookNotifier::from_url(format!("{}/store", server.uri())).unwrap();
        let status = notifier.publish(&sample_update()).await.unwrap();
        assert!(status.success);
    }

    #[tokio::test]
    async fn test_publish_surfaces_failure_after_retries() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(2)
            .mount(&server)
            .await;

        let config = WebhookConfig::new(format!("{}/store", server.uri())).with_max_retries(1);
        let notifier = WebhookNotifier::new(config).unwrap();

        let result = notifier.publish(&sample_update()).await;
        assert!(matches!(result, Err(NotifyError::Http(_))));
    }
}
