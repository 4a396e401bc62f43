//! genstore - Rotating general-store price service
//!
//! A store whose stock and prices change over time: prices jitter around
//! their bases every few minutes, and once a day the rotating part of the
//! stock is resampled from a remote item catalog. Both the schedule and
//! the current price set are persisted so restarts resume where the
//! process left off.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`models`] - Item shapes and the price conglomerate
//! - [`catalog`] - Remote item catalog access and tiering rules
//! - [`pricing`] - Catalog sampling and price rotation
//! - [`scheduler`] - Timer jobs, recurrence, and persistence
//! - [`notify`] - Price update publication
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use genstore::catalog::HttpCatalogSource;
//! use genstore::config::Config;
//! use genstore::notify::LogNotifier;
//! use genstore::scheduler::Scheduler;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     config.validate()?;
//!
//!     let catalog = Arc::new(HttpCatalogSource::new(
//!         config.store.items_url.clone(),
//!         config.tier_config()?,
//!     )?);
//!     let scheduler = Scheduler::new(catalog, Arc::new(LogNotifier), config.scheduler.clone())?;
//!
//!     let jobs_path = scheduler.config().jobs_path.clone();
//!     let prices_path = scheduler.config().prices_path.clone();
//!     scheduler.load_all(&jobs_path, &prices_path).await?;
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod pricing;
pub mod scheduler;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::catalog::{CatalogEntry, CatalogSource, HttpCatalogSource, TierConfig};
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorCategory, Result};
    pub use crate::models::{PriceConglomerate, SaleStatus, StoreItemRef};
    pub use crate::notify::{LogNotifier, PriceNotifier, StoreUpdate, WebhookNotifier};
    pub use crate::scheduler::{Job, JobKind, JobState, Scheduler, SchedulerConfig};
}

// Direct re-exports for convenience
pub use models::{BuyOnlyRotatingItem, CoreItem, PriceConglomerate, SellableRotatingItem};
