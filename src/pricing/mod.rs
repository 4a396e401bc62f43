//! Catalog sampling and price rotation
//!
//! Two pure operations over the item catalog:
//!
//! - [`sample_catalog`] — partition the catalog into tiers, draw the
//!   rotating subsets, and compute initial prices. Runs on item reroll
//!   (rare, daily).
//! - [`reroll_prices`] — keep the stocked set, reroll every current price
//!   around its base. Runs on price reroll (frequent, cheap).
//!
//! Both take a caller-supplied [`rand::Rng`] so tests can seed a
//! `ChaCha8Rng` and get reproducible draws.

pub mod rotator;
pub mod sampler;

pub use rotator::reroll_prices;
pub use sampler::sample_catalog;

use rand::Rng;

/// Jitter a base price by a symmetric uniform offset in `[-variance, +variance)`.
///
/// A non-positive variance leaves the base untouched.
pub(crate) fn jitter_price(base: i64, variance: i64, rng: &mut impl Rng) -> i64 {
    if variance <= 0 {
        base
    } else {
        base + rng.gen_range(0..variance * 2) - variance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_jitter_stays_in_half_open_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..10_000 {
            let price = jitter_price(1000, 50, &mut rng);
            assert!((950..1050).contains(&price), "price {price} out of range");
        }
    }

    #[test]
    fn test_jitter_zero_variance_is_identity() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert_eq!(jitter_price(1000, 0, &mut rng), 1000);
        assert_eq!(jitter_price(-25, 0, &mut rng), -25);
    }

    #[test]
    fn test_jitter_covers_both_sides() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut below = false;
        let mut above = false;
        for _ in 0..1000 {
            let price = jitter_price(100, 20, &mut rng);
            below |= price < 100;
            above |= price > 100;
        }
        assert!(below && above);
    }
}
