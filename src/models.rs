// Core data structures for the genstore price catalog

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Stocking category of an item, as it appears in persisted snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SaleStatus {
    /// Always stocked, buy and sell prices
    Core,
    /// Rotates on item reroll, buy and sell prices
    SellableRotating,
    /// Rotates on item reroll, buy price only
    BuyonlyRotating,
}

impl SaleStatus {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::SellableRotating => "sellable-rotating",
            Self::BuyonlyRotating => "buyonly-rotating",
        }
    }
}

impl std::fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Always-stocked item with both price sides.
///
/// Field names serialize in camelCase; persisted snapshot files depend on
/// this shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreItem {
    pub name: String,
    pub tag: String,
    pub intended_value: i64,
    pub variance: i64,
    pub item_sale_status: SaleStatus,
    pub base_sell_to_player_price: i64,
    pub base_buy_from_player_price: i64,
    pub sell_to_player_price: i64,
    pub buy_from_player_price: i64,
}

/// Rotating item sold and bought by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellableRotatingItem {
    pub name: String,
    pub tag: String,
    pub intended_value: i64,
    pub variance: i64,
    pub item_sale_status: SaleStatus,
    pub base_sell_to_player_price: i64,
    pub base_buy_from_player_price: i64,
    pub sell_to_player_price: i64,
    pub buy_from_player_price: i64,
}

/// Rotating item the store only buys. Has no sell price by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyOnlyRotatingItem {
    pub name: String,
    pub tag: String,
    pub intended_value: i64,
    pub variance: i64,
    pub item_sale_status: SaleStatus,
    pub buy_from_player_price: i64,
}

/// Borrowed view over any of the three item shapes.
#[derive(Debug, Clone, Copy)]
pub enum StoreItemRef<'a> {
    Core(&'a CoreItem),
    SellableRotating(&'a SellableRotatingItem),
    BuyOnlyRotating(&'a BuyOnlyRotatingItem),
}

impl<'a> StoreItemRef<'a> {
    /// Item name (unique across a conglomerate)
    pub fn name(&self) -> &'a str {
        match self {
            Self::Core(i) => &i.name,
            Self::SellableRotating(i) => &i.name,
            Self::BuyOnlyRotating(i) => &i.name,
        }
    }

    /// Display/category tag
    pub fn tag(&self) -> &'a str {
        match self {
            Self::Core(i) => &i.tag,
            Self::SellableRotating(i) => &i.tag,
            Self::BuyOnlyRotating(i) => &i.tag,
        }
    }

    /// Stocking category
    pub fn sale_status(&self) -> SaleStatus {
        match self {
            Self::Core(i) => i.item_sale_status,
            Self::SellableRotating(i) => i.item_sale_status,
            Self::BuyOnlyRotating(i) => i.item_sale_status,
        }
    }

    /// Current buy-from-player price (present on every shape)
    pub fn buy_from_player_price(&self) -> i64 {
        match self {
            Self::Core(i) => i.buy_from_player_price,
            Self::SellableRotating(i) => i.buy_from_player_price,
            Self::BuyOnlyRotating(i) => i.buy_from_player_price,
        }
    }

    /// Current sell-to-player price; buy-only items have none
    pub fn sell_to_player_price(&self) -> Option<i64> {
        match self {
            Self::Core(i) => Some(i.sell_to_player_price),
            Self::SellableRotating(i) => Some(i.sell_to_player_price),
            Self::BuyOnlyRotating(_) => None,
        }
    }
}

/// The complete stocked price set: the sole "current state" artifact.
///
/// Replaced wholesale on every reroll, never mutated in place, so readers
/// holding a snapshot always see a consistent set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceConglomerate {
    pub core_items: Vec<CoreItem>,
    pub sellable_rotating_items: Vec<SellableRotatingItem>,
    pub buy_only_rotating_items: Vec<BuyOnlyRotatingItem>,
}

impl PriceConglomerate {
    /// Iterate every stocked item across all three lists
    pub fn items(&self) -> impl Iterator<Item = StoreItemRef<'_>> {
        self.core_items
            .iter()
            .map(StoreItemRef::Core)
            .chain(
                self.sellable_rotating_items
                    .iter()
                    .map(StoreItemRef::SellableRotating),
            )
            .chain(
                self.buy_only_rotating_items
                    .iter()
                    .map(StoreItemRef::BuyOnlyRotating),
            )
    }

    /// Total stocked item count
    pub fn item_count(&self) -> usize {
        self.core_items.len()
            + self.sellable_rotating_items.len()
            + self.buy_only_rotating_items.len()
    }

    /// All stocked item names, in list order
    pub fn names(&self) -> Vec<&str> {
        self.items().map(|i| i.name()).collect()
    }

    /// Check the uniqueness invariant: no name appears in more than one tier
    pub fn has_unique_names(&self) -> bool {
        let mut seen = HashSet::new();
        self.items().all(|i| seen.insert(i.name()))
    }

    /// Serialize to pretty JSON (the persisted snapshot format)
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core_item(name: &str) -> CoreItem {
        CoreItem {
            name: name.to_string(),
            tag: "GP".to_string(),
            intended_value: 100,
            variance: 10,
            item_sale_status: SaleStatus::Core,
            base_sell_to_player_price: 120,
            base_buy_from_player_price: 80,
            sell_to_player_price: 118,
            buy_from_player_price: 85,
        }
    }

    fn buy_only_item(name: &str) -> BuyOnlyRotatingItem {
        BuyOnlyRotatingItem {
            name: name.to_string(),
            tag: "GP".to_string(),
            intended_value: 5000,
            variance: 250,
            item_sale_status: SaleStatus::BuyonlyRotating,
            buy_from_player_price: 5100,
        }
    }

    #[test]
    fn test_sale_status_serializes_kebab_case() {
        let json = serde_json::to_string(&SaleStatus::SellableRotating).unwrap();
        assert_eq!(json, "\"sellable-rotating\"");

        let json = serde_json::to_string(&SaleStatus::BuyonlyRotating).unwrap();
        assert_eq!(json, "\"buyonly-rotating\"");
    }

    #[test]
    fn test_item_fields_serialize_camel_case() {
        let json = serde_json::to_value(core_item("Apple")).unwrap();
        assert!(json.get("baseSellToPlayerPrice").is_some());
        assert!(json.get("buyFromPlayerPrice").is_some());
        assert_eq!(json["itemSaleStatus"], "core");
    }

    #[test]
    fn test_conglomerate_field_names() {
        let prices = PriceConglomerate {
            core_items: vec![core_item("Apple")],
            sellable_rotating_items: vec![],
            buy_only_rotating_items: vec![buy_only_item("Crown")],
        };

        let json = serde_json::to_value(&prices).unwrap();
        assert!(json.get("coreItems").is_some());
        assert!(json.get("sellableRotatingItems").is_some());
        assert!(json.get("buyOnlyRotatingItems").is_some());
    }

    #[test]
    fn test_buy_only_item_has_no_sell_price() {
        let item = buy_only_item("Crown");
        let as_ref = StoreItemRef::BuyOnlyRotating(&item);
        assert!(as_ref.sell_to_player_price().is_none());
        assert_eq!(as_ref.buy_from_player_price(), 5100);
    }

    #[test]
    fn test_unique_names() {
        let unique = PriceConglomerate {
            core_items: vec![core_item("Apple")],
            sellable_rotating_items: vec![],
            buy_only_rotating_items: vec![buy_only_item("Crown")],
        };
        assert!(unique.has_unique_names());

        let clashing = PriceConglomerate {
            core_items: vec![core_item("Apple")],
            sellable_rotating_items: vec![],
            buy_only_rotating_items: vec![buy_only_item("Apple")],
        };
        assert!(!clashing.has_unique_names());
    }

    #[test]
    fn test_json_roundtrip() {
        let prices = PriceConglomerate {
            core_items: vec![core_item("Apple"), core_item("Bread")],
            sellable_rotating_items: vec![],
            buy_only_rotating_items: vec![buy_only_item("Crown")],
        };

        let json = prices.to_json().unwrap();
        let parsed = PriceConglomerate::from_json(&json).unwrap();
        assert_eq!(parsed, prices);
        assert_eq!(parsed.item_count(), 3);
    }
}
