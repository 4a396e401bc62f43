//! Common test utilities

// not every integration binary uses every helper
#![allow(dead_code)]

use async_trait::async_trait;
use genstore::catalog::{CatalogEntry, CatalogResult, CatalogSource, TierConfig};
use genstore::notify::{DeliveryStatus, NotifyResult, PriceNotifier, StoreUpdate};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Create a catalog entry with sell/buy bases derived from its value
pub fn entry(name: &str, value: i64) -> CatalogEntry {
    CatalogEntry {
        name: name.to_string(),
        tag: "GP".to_string(),
        intended_value_gp: value,
        genstore_price_variance: 10,
        genstore_sell_to_player_price: value + 20,
        genstore_buy_from_player_price: value - 20,
    }
}

/// The five-item fixture: two core items below the mid band, two mid-band
/// items, one high-value item.
pub fn five_item_catalog() -> Vec<CatalogEntry> {
    vec![
        entry("Apple", 10),
        entry("Bread", 20),
        entry("Ring", 100),
        entry("Amulet", 200),
        entry("Crown", 5000),
    ]
}

/// Tiering that marks Apple/Bread core and keeps the mid band at [50, 500]
pub fn five_item_tiering(sellable: usize, buy_only: usize) -> TierConfig {
    TierConfig::new(
        vec!["Apple".to_string(), "Bread".to_string()],
        50,
        500,
        sellable,
        buy_only,
        "^Untradeable",
    )
    .unwrap()
}

/// In-memory catalog source with fixed entries
pub struct StaticCatalog {
    entries: Vec<CatalogEntry>,
    tiering: TierConfig,
}

impl StaticCatalog {
    pub fn new(entries: Vec<CatalogEntry>, tiering: TierConfig) -> Self {
        Self { entries, tiering }
    }

    /// The five-item fixture with one rotating draw per band
    pub fn five_items() -> Self {
        Self::new(five_item_catalog(), five_item_tiering(1, 1))
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn fetch(&self) -> CatalogResult<Vec<CatalogEntry>> {
        Ok(self.entries.clone())
    }

    fn tiering(&self) -> &TierConfig {
        &self.tiering
    }
}

/// Notifier that records every published update
#[derive(Default)]
pub struct RecordingNotifier {
    count: AtomicUsize,
    updates: Mutex<Vec<StoreUpdate>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published_count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    #[allow(dead_code)]
    pub fn last_update(&self) -> Option<StoreUpdate> {
        self.updates.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl PriceNotifier for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    async fn publish(&self, update: &StoreUpdate) -> NotifyResult<DeliveryStatus> {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.updates.lock().unwrap().push(update.clone());
        Ok(DeliveryStatus::success("recording"))
    }
}
