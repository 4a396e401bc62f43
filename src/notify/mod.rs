//! Price update publication
//!
//! After every reroll the scheduler hands the fresh snapshot to a
//! [`PriceNotifier`]. The scheduler logs a failed delivery but never acts
//! on it; publication is fire-and-forget from the core's point of view.

pub mod webhook;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::PriceConglomerate;

pub use webhook::{WebhookConfig, WebhookNotifier};

/// Result type for notifier operations
pub type NotifyResult<T> = Result<T, NotifyError>;

/// Errors that can occur while publishing an update
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid notifier configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error
    #[error("Notifier error: {0}")]
    Other(String),
}

/// Why a snapshot was replaced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpdateReason {
    /// Prices rerolled, stocked set unchanged
    PriceReroll,
    /// Stocked set resampled from the catalog
    ItemReroll,
}

/// A fresh snapshot handed to the notifier after a reroll
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreUpdate {
    /// The new price set
    pub prices: PriceConglomerate,

    /// What kind of reroll produced it
    pub reason: UpdateReason,

    /// When the next update is expected, if known
    pub next_update: Option<DateTime<Utc>>,

    /// When this snapshot was produced
    pub updated_at: DateTime<Utc>,
}

/// Outcome of a delivery attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryStatus {
    /// Whether the update was successfully delivered
    pub success: bool,

    /// Notifier that handled the attempt
    pub channel: String,

    /// Timestamp of the attempt
    pub timestamp: DateTime<Utc>,
}

impl DeliveryStatus {
    /// Create a successful delivery status
    pub fn success(channel: impl Into<String>) -> Self {
        Self {
            success: true,
            channel: channel.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a failed delivery status
    pub fn failure(channel: impl Into<String>) -> Self {
        Self {
            success: false,
            channel: channel.into(),
            timestamp: Utc::now(),
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.success { "SUCCESS" } else { "FAILED" };
        write!(f, "[{status}] {}", self.channel)
    }
}

/// Capability that publishes a fresh price snapshot to the outside world
#[async_trait]
pub trait PriceNotifier: Send + Sync {
    /// Get the notifier name
    fn name(&self) -> &str;

    /// Publish an update
    async fn publish(&self, update: &StoreUpdate) -> NotifyResult<DeliveryStatus>;
}

/// Notifier that records updates in the log only.
///
/// The default when no webhook is configured.
pub struct LogNotifier;

#[async_trait]
impl PriceNotifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn publish(&self, update: &StoreUpdate) -> NotifyResult<DeliveryStatus> {
        tracing::info!(
            reason = ?update.reason,
            items = update.prices.item_count(),
            next_update = ?update.next_update,
            "store update"
        );
        Ok(DeliveryStatus::success("log"))
    }
}
