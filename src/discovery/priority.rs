//! Token-pair prioritization for the precompute cycle
//!
//! Selects which pairs are worth precomputing each cycle: the top tokens per
//! chain by aggregate pool liquidity plus volume and market-cap signal,
//! paired in both directions, capped for bounded cycle cost. Configured
//! major/stable pairs are always included regardless of ranking.

use crate::config::EngineConfig;
use crate::market::{PoolStore, PriceBook};
use crate::types::Chain;
use alloy::primitives::Address;
use std::collections::{HashMap, HashSet};

/// Damped market-cap contribution to the token ranking
fn market_cap_signal(market_cap_usd: f64) -> f64 {
    market_cap_usd.max(0.0).sqrt()
}

/// Ordered (token_in, token_out) pairs to precompute for one chain
pub fn priority_pairs(
    chain: Chain,
    pools: &PoolStore,
    prices: &PriceBook,
    config: &EngineConfig,
) -> Vec<(Address, Address)> {
    let mut scores: HashMap<Address, f64> = HashMap::new();
    for pool in pools.pools_on_chain(chain) {
        for token in [pool.token_a, pool.token_b] {
            *scores.entry(token).or_default() += pool.liquidity_usd + pool.volume_24h_usd;
        }
    }
    for (token, score) in scores.iter_mut() {
        if let Some(price) = prices.get(chain, *token) {
            *score += market_cap_signal(price.market_cap_usd);
        }
    }

    let mut ranked: Vec<Address> = scores.keys().copied().collect();
    ranked.sort_by(|a, b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(config.priority_token_count);

    // Majors first: they are precomputed even when ranking would drop them
    let majors: Vec<Address> = config
        .major_tokens
        .iter()
        .filter(|(c, _)| *c == chain)
        .map(|(_, t)| *t)
        .collect();

    let mut pairs = Vec::new();
    let mut seen: HashSet<(Address, Address)> = HashSet::new();
    let mut push_pairs = |tokens: &[Address], pairs: &mut Vec<(Address, Address)>| {
        for &a in tokens {
            for &b in tokens {
                if a != b && seen.insert((a, b)) {
                    pairs.push((a, b));
                }
            }
        }
    };

    push_pairs(&majors, &mut pairs);

    // Majors participate in ranked pairing too
    let mut universe = majors;
    for token in ranked {
        if !universe.contains(&token) {
            universe.push(token);
        }
    }
    push_pairs(&universe, &mut pairs);

    pairs.truncate(config.max_priority_pairs);
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::testutil::pool;
    use crate::types::MarketPrice;

    fn t(i: u8) -> Address {
        Address::repeat_byte(i)
    }

    fn store_with_liquidity(entries: &[(u8, u8, f64)]) -> PoolStore {
        let store = PoolStore::new();
        for (i, (a, b, liq)) in entries.iter().enumerate() {
            let mut p = pool(
                &format!("p{i}"),
                Chain::Polygon,
                "uniswap_v2",
                t(*a),
                t(*b),
                1_000_000,
                1_000_000,
            );
            p.liquidity_usd = *liq;
            p.volume_24h_usd = 0.0;
            store.upsert(p);
        }
        store
    }

    #[test]
    fn test_both_directions_generated() {
        let store = store_with_liquidity(&[(1, 2, 100.0)]);
        let pairs = priority_pairs(
            Chain::Polygon,
            &store,
            &PriceBook::new(),
            &EngineConfig::default(),
        );
        assert!(pairs.contains(&(t(1), t(2))));
        assert!(pairs.contains(&(t(2), t(1))));
        assert_eq!(pairs.len(), 2);
    }

    #[test]
    fn test_top_k_and_cap() {
        // 6 tokens, descending liquidity; keep only top 3
        let store = store_with_liquidity(&[
            (1, 2, 1_000.0),
            (3, 4, 100.0),
            (5, 6, 10.0),
        ]);
        let mut config = EngineConfig::default();
        config.priority_token_count = 3;
        let pairs = priority_pairs(Chain::Polygon, &store, &PriceBook::new(), &config);

        // 3 tokens -> 6 ordered pairs, none involving the weakest tokens
        assert_eq!(pairs.len(), 6);
        assert!(!pairs.iter().any(|(a, b)| *a == t(6) || *b == t(6)));

        config.max_priority_pairs = 4;
        let capped = priority_pairs(Chain::Polygon, &store, &PriceBook::new(), &config);
        assert_eq!(capped.len(), 4);
    }

    #[test]
    fn test_majors_always_included() {
        let store = store_with_liquidity(&[(1, 2, 1_000.0), (3, 4, 900.0)]);
        let mut config = EngineConfig::default();
        config.priority_token_count = 2;
        // Majors 8 and 9 have no pools at all
        config.major_tokens = vec![(Chain::Polygon, t(8)), (Chain::Polygon, t(9))];

        let pairs = priority_pairs(Chain::Polygon, &store, &PriceBook::new(), &config);
        assert_eq!(pairs[0], (t(8), t(9)));
        assert!(pairs.contains(&(t(9), t(8))));
    }

    #[test]
    fn test_market_cap_breaks_ties() {
        let store = store_with_liquidity(&[(1, 2, 500.0), (3, 4, 500.0)]);
        let prices = PriceBook::new();
        let mut p = MarketPrice::new(1.0);
        p.market_cap_usd = 1_000_000_000.0;
        prices.upsert(Chain::Polygon, t(3), p);

        let mut config = EngineConfig::default();
        config.priority_token_count = 1;
        let pairs = priority_pairs(Chain::Polygon, &store, &prices, &config);
        // Only one token survives ranking; it must be the one with the
        // market-cap signal, leaving no pair to form
        assert!(pairs.is_empty() || pairs.iter().all(|(a, b)| *a == t(3) || *b == t(3)));
    }
}
