//! Tiered catalog sampling

use rand::Rng;

use super::jitter_price;
use crate::catalog::{CatalogEntry, TierConfig};
use crate::models::{
    BuyOnlyRotatingItem, CoreItem, PriceConglomerate, SaleStatus, SellableRotatingItem,
};

/// Partition the catalog into tiers, draw the rotating subsets, and price
/// every selected item.
///
/// Core items are stocked unconditionally. The sellable-rotating draw comes
/// from the mid band, the buy-only draw from the high band (bounded only
/// below, so it overlaps the mid band). Draws are uniform without
/// replacement; a pool smaller than the requested count yields a short list.
pub fn sample_catalog(
    entries: &[CatalogEntry],
    tiers: &TierConfig,
    rng: &mut impl Rng,
) -> PriceConglomerate {
    let stocked: Vec<&CatalogEntry> = entries
        .iter()
        .filter(|e| !tiers.exclude.is_match(&e.name))
        .collect();

    let core: Vec<&CatalogEntry> = stocked
        .iter()
        .copied()
        .filter(|e| tiers.core_names.contains(&e.name))
        .collect();

    let mut mid: Vec<&CatalogEntry> = stocked
        .iter()
        .copied()
        .filter(|e| e.intended_value_gp >= tiers.mid_floor && e.intended_value_gp <= tiers.mid_ceiling)
        .collect();

    let mut high: Vec<&CatalogEntry> = stocked
        .iter()
        .copied()
        .filter(|e| e.intended_value_gp >= tiers.mid_floor)
        .collect();

    let sellable = draw_without_replacement(&mut mid, tiers.sellable_rotating_count, rng);
    let buy_only = draw_without_replacement(&mut high, tiers.buyonly_rotating_count, rng);

    PriceConglomerate {
        core_items: core
            .into_iter()
            .map(|e| CoreItem {
                name: e.name.clone(),
                tag: e.tag.clone(),
                intended_value: e.intended_value_gp,
                variance: e.genstore_price_variance,
                item_sale_status: SaleStatus::Core,
                base_sell_to_player_price: e.genstore_sell_to_player_price,
                base_buy_from_player_price: e.genstore_buy_from_player_price,
                sell_to_player_price: jitter_price(
                    e.genstore_sell_to_player_price,
                    e.genstore_price_variance,
                    rng,
                ),
                buy_from_player_price: jitter_price(
                    e.genstore_buy_from_player_price,
                    e.genstore_price_variance,
                    rng,
                ),
            })
            .collect(),
        sellable_rotating_items: sellable
            .into_iter()
            .map(|e| SellableRotatingItem {
                name: e.name.clone(),
                tag: e.tag.clone(),
                intended_value: e.intended_value_gp,
                variance: e.genstore_price_variance,
                item_sale_status: SaleStatus::SellableRotating,
                base_sell_to_player_price: e.genstore_sell_to_player_price,
                base_buy_from_player_price: e.genstore_buy_from_player_price,
                sell_to_player_price: jitter_price(
                    e.genstore_sell_to_player_price,
                    e.genstore_price_variance,
                    rng,
                ),
                buy_from_player_price: jitter_price(
                    e.genstore_buy_from_player_price,
                    e.genstore_price_variance,
                    rng,
                ),
            })
            .collect(),
        buy_only_rotating_items: buy_only
            .into_iter()
            .map(|e| BuyOnlyRotatingItem {
                name: e.name.clone(),
                tag: e.tag.clone(),
                intended_value: e.intended_value_gp,
                variance: e.genstore_price_variance,
                item_sale_status: SaleStatus::BuyonlyRotating,
                // high-value items trade around their nominal worth, not a
                // discounted store base
                buy_from_player_price: jitter_price(
                    e.intended_value_gp,
                    e.genstore_price_variance,
                    rng,
                ),
            })
            .collect(),
    }
}

/// Draw up to `count` elements by uniform index sampling without
/// replacement. An exhausted pool ends the draw early.
fn draw_without_replacement<'a>(
    pool: &mut Vec<&'a CatalogEntry>,
    count: usize,
    rng: &mut impl Rng,
) -> Vec<&'a CatalogEntry> {
    let mut drawn = Vec::with_capacity(count.min(pool.len()));
    for _ in 0..count {
        if pool.is_empty() {
            break;
        }
        let index = rng.gen_range(0..pool.len());
        drawn.push(pool.swap_remove(index));
    }
    drawn
}
