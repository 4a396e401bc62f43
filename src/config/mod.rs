//! Configuration management for the genstore service
//!
//! This module handles loading and validating configuration from
//! environment variables and TOML files. The store tiering values have no
//! sensible defaults and fail fast when absent; everything else falls back
//! to defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

use crate::catalog::{fetcher::FetcherConfig, TierConfig};
use crate::scheduler::SchedulerConfig;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Store catalog and tiering configuration
    pub store: StoreConfig,

    /// Scheduler configuration
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Notifier configuration
    #[serde(default)]
    pub notify: NotifyConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Store catalog and tiering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Where the item catalog document lives
    pub items_url: Url,

    /// Names of always-stocked items
    pub core_items: Vec<String>,

    /// Lowest intended value of the mid band (inclusive)
    pub mid_floor: i64,

    /// Highest intended value of the mid band (inclusive)
    pub mid_ceiling: i64,

    /// How many sellable rotating items each reroll stocks
    pub sellable_rotating_count: usize,

    /// How many buy-only rotating items each reroll stocks
    pub buyonly_rotating_count: usize,

    /// Items whose name matches are never stocked
    pub exclude_regex: String,

    /// Catalog fetch timeout in seconds
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    /// Catalog fetch retry attempts
    #[serde(default = "default_fetch_retries")]
    pub fetch_max_retries: u32,
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_fetch_retries() -> u32 {
    3
}

/// Notifier configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Webhook endpoint; log-only publication when absent
    pub webhook_url: Option<String>,

    /// Bearer token for the webhook
    pub webhook_token: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

fn required(name: &str) -> Result<String> {
    std::env::var(name)
        .with_context(|| format!("required environment variable {name} is not set"))
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// The store tiering variables are mandatory and abort startup when
    /// missing; no network access happens before this check.
    pub fn from_env() -> Result<Self> {
        let items_url = Url::parse(&required("GENSTORE_ITEMS_URL")?)
            .context("GENSTORE_ITEMS_URL must be a valid URL")?;

        let core_items = required("GENSTORE_CORE_ITEMS")?
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let mid_floor = required("GENSTORE_MID_FLOOR")?
            .parse::<i64>()
            .context("GENSTORE_MID_FLOOR must be an integer")?;

        let mid_ceiling = required("GENSTORE_MID_CEILING")?
            .parse::<i64>()
            .context("GENSTORE_MID_CEILING must be an integer")?;

        let sellable_rotating_count = required("GENSTORE_NUM_SELLABLE_ROTATING")?
            .parse::<usize>()
            .context("GENSTORE_NUM_SELLABLE_ROTATING must be a nonnegative integer")?;

        let buyonly_rotating_count = required("GENSTORE_NUM_BUYONLY_ROTATING")?
            .parse::<usize>()
            .context("GENSTORE_NUM_BUYONLY_ROTATING must be a nonnegative integer")?;

        let exclude_regex = required("GENSTORE_EXCLUDE_REGEX")?;

        let fetch_timeout_secs = std::env::var("GENSTORE_FETCH_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or_else(default_fetch_timeout);

        let fetch_max_retries = std::env::var("GENSTORE_FETCH_RETRIES")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or_else(default_fetch_retries);

        let scheduler = SchedulerConfig {
            reroll_time: std::env::var("GENSTORE_REROLL_TIME")
                .unwrap_or_else(|_| SchedulerConfig::default().reroll_time),
            price_interval_secs: std::env::var("GENSTORE_PRICE_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or_else(|| SchedulerConfig::default().price_interval_secs),
            catchup_delay_secs: std::env::var("GENSTORE_CATCHUP_DELAY_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or_else(|| SchedulerConfig::default().catchup_delay_secs),
            jobs_path: std::env::var("GENSTORE_JOBS_PATH")
                .map(Into::into)
                .unwrap_or_else(|_| SchedulerConfig::default().jobs_path),
            prices_path: std::env::var("GENSTORE_PRICES_PATH")
                .map(Into::into)
                .unwrap_or_else(|_| SchedulerConfig::default().prices_path),
        };

        let notify = NotifyConfig {
            webhook_url: std::env::var("GENSTORE_WEBHOOK_URL").ok(),
            webhook_token: std::env::var("GENSTORE_WEBHOOK_TOKEN").ok(),
        };

        let logging = LoggingConfig {
            level: std::env::var("GENSTORE_LOG_LEVEL").unwrap_or_else(|_| String::from("info")),
            format: std::env::var("GENSTORE_LOG_FORMAT").unwrap_or_else(|_| String::from("text")),
        };

        Ok(Self {
            store: StoreConfig {
                items_url,
                core_items,
                mid_floor,
                mid_ceiling,
                sellable_rotating_count,
                buyonly_rotating_count,
                exclude_regex,
                fetch_timeout_secs,
                fetch_max_retries,
            },
            scheduler,
            notify,
            logging,
        })
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.store.mid_floor > self.store.mid_ceiling {
            anyhow::bail!("mid_floor must not exceed mid_ceiling");
        }

        if self.store.fetch_timeout_secs == 0 {
            anyhow::bail!("fetch_timeout_secs must be greater than 0");
        }

        regex::Regex::new(&self.store.exclude_regex)
            .context("exclude_regex is not a valid pattern")?;

        self.scheduler
            .validate()
            .context("scheduler configuration rejected")?;

        Ok(())
    }

    /// Build the tiering rules for the catalog sampler
    pub fn tier_config(&self) -> Result<TierConfig> {
        TierConfig::new(
            self.store.core_items.iter().cloned(),
            self.store.mid_floor,
            self.store.mid_ceiling,
            self.store.sellable_rotating_count,
            self.store.buyonly_rotating_count,
            &self.store.exclude_regex,
        )
        .context("failed to build tiering configuration")
    }

    /// Build the catalog fetch settings
    #[must_use]
    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig {
            timeout_secs: self.store.fetch_timeout_secs,
            max_retries: self.store.fetch_max_retries,
        }
    }
}
