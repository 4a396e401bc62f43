//! Item catalog access
//!
//! The catalog is an external YAML document listing every tradeable item
//! with its nominal value, price variance, and base store prices. This
//! module defines the row shape, the tiering configuration that drives
//! rotating-item sampling, and the [`CatalogSource`] capability the
//! scheduler consumes.

pub mod fetcher;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub use fetcher::HttpCatalogSource;

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur while fetching or parsing the catalog
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Catalog document did not parse
    #[error("Failed to parse catalog document: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Exclusion pattern did not compile
    #[error("Invalid exclusion pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Generic error
    #[error("Catalog error: {0}")]
    Other(String),
}

impl CatalogError {
    /// Check if the error is recoverable (can be retried)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}

/// One row of the remote catalog document.
///
/// Field names match the YAML document; unknown fields (artist,
/// description, ...) are ignored on parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub tag: String,
    pub intended_value_gp: i64,
    pub genstore_price_variance: i64,
    pub genstore_sell_to_player_price: i64,
    pub genstore_buy_from_player_price: i64,
}

/// Tiering configuration driving catalog sampling.
///
/// The high tier is bounded only below: items above `mid_ceiling` are
/// high-only, items inside the mid band belong to both pools. That overlap
/// is deliberate and relied on by the buy-only draw.
#[derive(Debug, Clone)]
pub struct TierConfig {
    /// Names of always-stocked items
    pub core_names: HashSet<String>,

    /// Lowest intended value of the mid band (inclusive)
    pub mid_floor: i64,

    /// Highest intended value of the mid band (inclusive)
    pub mid_ceiling: i64,

    /// How many sellable rotating items to draw from the mid band
    pub sellable_rotating_count: usize,

    /// How many buy-only rotating items to draw from the high band
    pub buyonly_rotating_count: usize,

    /// Items whose name matches are never stocked
    pub exclude: Regex,
}

impl TierConfig {
    /// Build a tier config, compiling the exclusion pattern
    pub fn new(
        core_names: impl IntoIterator<Item = String>,
        mid_floor: i64,
        mid_ceiling: i64,
        sellable_rotating_count: usize,
        buyonly_rotating_count: usize,
        exclude_pattern: &str,
    ) -> CatalogResult<Self> {
        Ok(Self {
            core_names: core_names.into_iter().collect(),
            mid_floor,
            mid_ceiling,
            sellable_rotating_count,
            buyonly_rotating_count,
            exclude: Regex::new(exclude_pattern)?,
        })
    }
}

/// Capability supplying the flat candidate-item list and tiering rules.
///
/// The production implementation fetches a remote YAML document; tests
/// substitute a fixed in-memory catalog.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch and parse the full candidate-item list
    async fn fetch(&self) -> CatalogResult<Vec<CatalogEntry>>;

    /// Tiering rules to sample with
    fn tiering(&self) -> &TierConfig;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_entry_parses_yaml_row() {
        let yaml = r#"
- name: Apple
  artist: someone
  description: crunchy
  tag: FOOD
  intended_value_gp: 100
  genstore_price_variance: 10
  genstore_sell_to_player_price: 120
  genstore_buy_from_player_price: 80
"#;
        let entries: Vec<CatalogEntry> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Apple");
        assert_eq!(entries[0].intended_value_gp, 100);
    }

    #[test]
    fn test_tier_config_compiles_pattern() {
        let config = TierConfig::new(
            vec!["Apple".to_string()],
            50,
            500,
            2,
            1,
            "^Untradeable",
        )
        .unwrap();
        assert!(config.exclude.is_match("Untradeable Trophy"));
        assert!(!config.exclude.is_match("Apple"));
    }

    #[test]
    fn test_tier_config_rejects_bad_pattern() {
        let result = TierConfig::new(vec![], 0, 0, 0, 0, "(unclosed");
        assert!(matches!(result, Err(CatalogError::InvalidPattern(_))));
    }
}
