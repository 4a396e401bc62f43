//! Price rotation over an existing stocked set

use rand::Rng;

use super::jitter_price;
use crate::models::{BuyOnlyRotatingItem, CoreItem, PriceConglomerate, SellableRotatingItem};

/// Produce a new conglomerate with identical membership and base prices but
/// freshly rerolled current prices.
///
/// Membership only changes on item reroll; this runs far more often and
/// must never restock. Buy-only items reroll around their intended value
/// since they carry no base buy price.
pub fn reroll_prices(prices: &PriceConglomerate, rng: &mut impl Rng) -> PriceConglomerate {
    PriceConglomerate {
        core_items: prices
            .core_items
            .iter()
            .map(|item| CoreItem {
                sell_to_player_price: jitter_price(
                    item.base_sell_to_player_price,
                    item.variance,
                    rng,
                ),
                buy_from_player_price: jitter_price(
                    item.base_buy_from_player_price,
                    item.variance,
                    rng,
                ),
                ..item.clone()
            })
            .collect(),
        sellable_rotating_items: prices
            .sellable_rotating_items
            .iter()
            .map(|item| SellableRotatingItem {
                sell_to_player_price: jitter_price(
                    item.base_sell_to_player_price,
                    item.variance,
                    rng,
                ),
                buy_from_player_price: jitter_price(
                    item.base_buy_from_player_price,
                    item.variance,
                    rng,
                ),
                ..item.clone()
            })
            .collect(),
        buy_only_rotating_items: prices
            .buy_only_rotating_items
            .iter()
            .map(|item| BuyOnlyRotatingItem {
                buy_from_player_price: jitter_price(item.intended_value, item.variance, rng),
                ..item.clone()
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SaleStatus;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn fixture() -> PriceConglomerate {
        PriceConglomerate {
            core_items: vec![CoreItem {
                name: "Apple".to_string(),
                tag: "FOOD".to_string(),
                intended_value: 100,
                variance: 10,
                item_sale_status: SaleStatus::Core,
                base_sell_to_player_price: 120,
                base_buy_from_player_price: 80,
                sell_to_player_price: 125,
                buy_from_player_price: 77,
            }],
            sellable_rotating_items: vec![SellableRotatingItem {
                name: "Ring".to_string(),
                tag: "JEWEL".to_string(),
                intended_value: 300,
                variance: 30,
                item_sale_status: SaleStatus::SellableRotating,
                base_sell_to_player_price: 330,
                base_buy_from_player_price: 270,
                sell_to_player_price: 333,
                buy_from_player_price: 255,
            }],
            buy_only_rotating_items: vec![BuyOnlyRotatingItem {
                name: "Crown".to_string(),
                tag: "RARE".to_string(),
                intended_value: 5000,
                variance: 250,
                item_sale_status: SaleStatus::BuyonlyRotating,
                buy_from_player_price: 5100,
            }],
        }
    }

    #[test]
    fn test_membership_and_bases_preserved() {
        let original = fixture();
        let mut rng = ChaCha8Rng::seed_from_u64(21);

        let rotated = reroll_prices(&original, &mut rng);

        assert_eq!(rotated.names(), original.names());
        assert_eq!(
            rotated.core_items[0].base_sell_to_player_price,
            original.core_items[0].base_sell_to_player_price
        );
        assert_eq!(
            rotated.core_items[0].base_buy_from_player_price,
            original.core_items[0].base_buy_from_player_price
        );
        assert_eq!(
            rotated.sellable_rotating_items[0].base_sell_to_player_price,
            original.sellable_rotating_items[0].base_sell_to_player_price
        );
        assert_eq!(
            rotated.buy_only_rotating_items[0].intended_value,
            original.buy_only_rotating_items[0].intended_value
        );
    }

    #[test]
    fn test_rerolled_prices_stay_within_variance() {
        let original = fixture();
        let mut rng = ChaCha8Rng::seed_from_u64(22);

        for _ in 0..10_000 {
            let rotated = reroll_prices(&original, &mut rng);

            let core = &rotated.core_items[0];
            assert!((110..130).contains(&core.sell_to_player_price));
            assert!((70..90).contains(&core.buy_from_player_price));

            let buy_only = &rotated.buy_only_rotating_items[0];
            assert!((4750..5250).contains(&buy_only.buy_from_player_price));
        }
    }

    #[test]
    fn test_reroll_of_reroll_keeps_same_bounds() {
        // successive rerolls always jitter from the base, not the last price
        let original = fixture();
        let mut rng = ChaCha8Rng::seed_from_u64(23);

        let mut current = original.clone();
        for _ in 0..100 {
            current = reroll_prices(&current, &mut rng);
            assert!((110..130).contains(&current.core_items[0].sell_to_player_price));
        }
    }

    #[test]
    fn test_zero_variance_pins_prices_to_base() {
        let mut original = fixture();
        original.core_items[0].variance = 0;
        let mut rng = ChaCha8Rng::seed_from_u64(24);

        let rotated = reroll_prices(&original, &mut rng);
        assert_eq!(rotated.core_items[0].sell_to_player_price, 120);
        assert_eq!(rotated.core_items[0].buy_from_player_price, 80);
    }
}
