//! Integration tests for catalog sampling and price rotation
//!
//! These tests exercise the pure pricing pipeline end-to-end: tiering,
//! rotating-item draws, initial pricing, and variance rerolls.

mod common;

use common::{entry, five_item_catalog, five_item_tiering};
use genstore::models::SaleStatus;
use genstore::pricing::{reroll_prices, sample_catalog};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// ============================================================================
// End-to-End Sampling
// ============================================================================

#[test]
fn test_five_item_catalog_samples_expected_structure() {
    let catalog = five_item_catalog();
    let tiers = five_item_tiering(1, 1);

    // the high band overlaps the mid band, so a draw can collide; take the
    // first seed whose draws land on different names
    let prices = (0..64)
        .map(|seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            sample_catalog(&catalog, &tiers, &mut rng)
        })
        .find(|p| p.has_unique_names())
        .expect("some seed yields distinct rotating draws");

    let mut core_names: Vec<_> = prices.core_items.iter().map(|i| i.name.as_str()).collect();
    core_names.sort_unstable();
    assert_eq!(core_names, vec!["Apple", "Bread"]);

    assert_eq!(prices.sellable_rotating_items.len(), 1);
    let sellable = &prices.sellable_rotating_items[0];
    assert!(["Ring", "Amulet"].contains(&sellable.name.as_str()));
    assert_eq!(sellable.item_sale_status, SaleStatus::SellableRotating);

    assert_eq!(prices.buy_only_rotating_items.len(), 1);
    let buy_only = &prices.buy_only_rotating_items[0];
    assert!(["Ring", "Amulet", "Crown"].contains(&buy_only.name.as_str()));
    assert_eq!(buy_only.item_sale_status, SaleStatus::BuyonlyRotating);

    assert_eq!(prices.item_count(), 4);
    assert!(prices.has_unique_names());
}

#[test]
fn test_sampling_counts_hold_across_seeds() {
    let catalog = five_item_catalog();
    let tiers = five_item_tiering(1, 1);

    for seed in 0..200 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let prices = sample_catalog(&catalog, &tiers, &mut rng);

        assert_eq!(prices.core_items.len(), 2, "seed {seed}");
        assert_eq!(prices.sellable_rotating_items.len(), 1, "seed {seed}");
        assert_eq!(prices.buy_only_rotating_items.len(), 1, "seed {seed}");

        // the sellable draw always comes from the mid band, the buy-only
        // draw from the floor-bounded high band
        let sellable = &prices.sellable_rotating_items[0];
        assert!((50..=500).contains(&sellable.intended_value), "seed {seed}");
        let buy_only = &prices.buy_only_rotating_items[0];
        assert!(buy_only.intended_value >= 50, "seed {seed}");
    }
}

#[test]
fn test_disjoint_bands_never_repeat_names() {
    // with the mid band narrowed so only Ring/Amulet qualify and the draw
    // counts matching the pool sizes, every seed yields unique names
    let catalog = vec![
        entry("Apple", 10),
        entry("Ring", 100),
        entry("Amulet", 200),
        entry("Crown", 5000),
    ];
    let tiers = genstore::catalog::TierConfig::new(
        vec!["Apple".to_string()],
        501,
        501,
        0,
        1,
        "^$",
    )
    .unwrap();

    for seed in 0..100 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let prices = sample_catalog(&catalog, &tiers, &mut rng);
        assert!(prices.has_unique_names(), "seed {seed}");
        assert_eq!(prices.buy_only_rotating_items[0].name, "Crown");
    }
}

#[test]
fn test_overlapping_bands_are_flagged_not_deduplicated() {
    // a one-item catalog where the mid and high pools both contain the
    // same entry: both rotating lists stock it and the invariant check
    // reports the clash
    let catalog = vec![entry("Overlap", 300)];
    let tiers = genstore::catalog::TierConfig::new(vec![], 50, 500, 1, 1, "^$").unwrap();

    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let prices = sample_catalog(&catalog, &tiers, &mut rng);

    assert_eq!(prices.sellable_rotating_items[0].name, "Overlap");
    assert_eq!(prices.buy_only_rotating_items[0].name, "Overlap");
    assert!(!prices.has_unique_names());
}

// ============================================================================
// Price Rotation
// ============================================================================

#[test]
fn test_rotation_preserves_membership_and_bases() {
    let catalog = five_item_catalog();
    let tiers = five_item_tiering(2, 1);
    let mut rng = ChaCha8Rng::seed_from_u64(17);

    let original = sample_catalog(&catalog, &tiers, &mut rng);
    let rotated = reroll_prices(&original, &mut rng);

    assert_eq!(rotated.names(), original.names());

    for (before, after) in original.core_items.iter().zip(&rotated.core_items) {
        assert_eq!(before.base_sell_to_player_price, after.base_sell_to_player_price);
        assert_eq!(before.base_buy_from_player_price, after.base_buy_from_player_price);
        assert_eq!(before.intended_value, after.intended_value);
        assert_eq!(before.variance, after.variance);
    }
    for (before, after) in original
        .sellable_rotating_items
        .iter()
        .zip(&rotated.sellable_rotating_items)
    {
        assert_eq!(before.base_sell_to_player_price, after.base_sell_to_player_price);
        assert_eq!(before.base_buy_from_player_price, after.base_buy_from_player_price);
    }
    for (before, after) in original
        .buy_only_rotating_items
        .iter()
        .zip(&rotated.buy_only_rotating_items)
    {
        assert_eq!(before.intended_value, after.intended_value);
    }
}

#[test]
fn test_rotation_bounds_hold_over_many_trials() {
    let catalog = five_item_catalog();
    let tiers = five_item_tiering(2, 1);
    let mut rng = ChaCha8Rng::seed_from_u64(29);
    let original = sample_catalog(&catalog, &tiers, &mut rng);

    for _ in 0..10_000 {
        let rotated = reroll_prices(&original, &mut rng);

        for item in &rotated.core_items {
            let sell_lo = item.base_sell_to_player_price - item.variance;
            let sell_hi = item.base_sell_to_player_price + item.variance;
            assert!((sell_lo..sell_hi).contains(&item.sell_to_player_price));

            let buy_lo = item.base_buy_from_player_price - item.variance;
            let buy_hi = item.base_buy_from_player_price + item.variance;
            assert!((buy_lo..buy_hi).contains(&item.buy_from_player_price));
        }

        for item in &rotated.sellable_rotating_items {
            let lo = item.base_sell_to_player_price - item.variance;
            let hi = item.base_sell_to_player_price + item.variance;
            assert!((lo..hi).contains(&item.sell_to_player_price));
        }

        for item in &rotated.buy_only_rotating_items {
            let lo = item.intended_value - item.variance;
            let hi = item.intended_value + item.variance;
            assert!((lo..hi).contains(&item.buy_from_player_price));
        }
    }
}

#[test]
fn test_sell_and_buy_jitter_independently() {
    // with a shared offset the spread between sell and buy would be
    // constant; independent draws vary it
    let catalog = vec![entry("Apple", 100)];
    let tiers = genstore::catalog::TierConfig::new(
        vec!["Apple".to_string()],
        1000,
        1000,
        0,
        0,
        "^$",
    )
    .unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(31);

    let original = sample_catalog(&catalog, &tiers, &mut rng);
    let mut spreads = std::collections::HashSet::new();
    for _ in 0..200 {
        let rotated = reroll_prices(&original, &mut rng);
        let item = &rotated.core_items[0];
        spreads.insert(item.sell_to_player_price - item.buy_from_player_price);
    }
    assert!(spreads.len() > 1);
}
