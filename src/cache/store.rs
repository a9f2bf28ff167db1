//! Opportunity cache
//!
//! Top candidate routes keyed by (chain, token_in, token_out). Each chain's
//! keyed structure is one immutable `Arc<ChainRoutes>`; a completed
//! precompute pass replaces it with a single pointer swap, so readers see
//! either the old or the fully-built new structure, never a mix.

use crate::types::{Chain, PrecomputedRoute};
use alloy::primitives::Address;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;

pub type PairKey = (Address, Address);

/// One chain's fully-built route table. Immutable once published.
#[derive(Debug, Default)]
pub struct ChainRoutes {
    routes: HashMap<PairKey, Vec<Arc<PrecomputedRoute>>>,
}

impl ChainRoutes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the pair's routes sorted descending by profitability, keeping
    /// at most `cap` entries. Empty lists are not stored.
    pub fn insert_ranked(
        &mut self,
        pair: PairKey,
        mut routes: Vec<Arc<PrecomputedRoute>>,
        cap: usize,
    ) {
        if routes.is_empty() {
            return;
        }
        routes.sort_by(|a, b| {
            b.profitability
                .partial_cmp(&a.profitability)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        routes.truncate(cap);
        self.routes.insert(pair, routes);
    }

    pub fn get(&self, pair: &PairKey) -> Option<&Vec<Arc<PrecomputedRoute>>> {
        self.routes.get(pair)
    }

    pub fn pairs(&self) -> impl Iterator<Item = &PairKey> {
        self.routes.keys()
    }

    pub fn iter_routes(&self) -> impl Iterator<Item = &Arc<PrecomputedRoute>> {
        self.routes.values().flatten()
    }

    pub fn pair_count(&self) -> usize {
        self.routes.len()
    }

    pub fn route_count(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }
}

/// Per-chain cache of published route tables; cheap to clone
#[derive(Debug, Default)]
pub struct OpportunityCache {
    chains: Arc<DashMap<Chain, Arc<ChainRoutes>>>,
}

impl Clone for OpportunityCache {
    fn clone(&self) -> Self {
        Self {
            chains: Arc::clone(&self.chains),
        }
    }
}

impl OpportunityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a chain's freshly built table, returning the superseded one.
    /// The old table is discarded, never merged.
    pub fn replace_chain(&self, chain: Chain, fresh: ChainRoutes) -> Option<Arc<ChainRoutes>> {
        self.chains.insert(chain, Arc::new(fresh))
    }

    /// O(1) read of one pair's cached routes
    pub fn routes_for(
        &self,
        chain: Chain,
        token_in: Address,
        token_out: Address,
    ) -> Vec<Arc<PrecomputedRoute>> {
        self.chains
            .get(&chain)
            .and_then(|table| table.get(&(token_in, token_out)).cloned())
            .unwrap_or_default()
    }

    /// Snapshot of a whole chain's table for scans
    pub fn snapshot(&self, chain: Chain) -> Option<Arc<ChainRoutes>> {
        self.chains.get(&chain).map(|entry| Arc::clone(entry.value()))
    }

    pub fn clear(&self) {
        self.chains.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RouteStep;
    use alloy::primitives::U256;
    use std::time::Instant;

    fn create_test_route(id: &str, profitability: f64) -> Arc<PrecomputedRoute> {
        let t1 = Address::repeat_byte(1);
        let t2 = Address::repeat_byte(2);
        Arc::new(PrecomputedRoute {
            id: id.into(),
            token_in: t1,
            token_out: t2,
            chain: Chain::Polygon,
            steps: vec![RouteStep {
                protocol_id: "uniswap_v2".into(),
                pool_id: "p".into(),
                token_in: t1,
                token_out: t2,
                amount_in: U256::from(1u64),
                amount_out: U256::from(1u64),
                price_impact_percent: 0.1,
                gas_estimate: 100_000,
            }],
            expected_output: U256::from(1u64),
            cumulative_impact_percent: 0.1,
            cumulative_gas: 100_000,
            net_profit_percent: 0.0,
            profitability,
            risk: 10.0,
            confidence: 90.0,
            computed_at: Instant::now(),
        })
    }

    fn pair() -> PairKey {
        (Address::repeat_byte(1), Address::repeat_byte(2))
    }

    #[test]
    fn test_insert_ranked_sorts_and_caps() {
        let mut table = ChainRoutes::new();
        let routes: Vec<_> = [10.0, 90.0, 50.0, 70.0, 30.0, 80.0, 60.0]
            .iter()
            .enumerate()
            .map(|(i, p)| create_test_route(&format!("r{i}"), *p))
            .collect();

        table.insert_ranked(pair(), routes, 5);
        let stored = table.get(&pair()).unwrap();
        assert_eq!(stored.len(), 5);
        let profits: Vec<f64> = stored.iter().map(|r| r.profitability).collect();
        assert_eq!(profits, vec![90.0, 80.0, 70.0, 60.0, 50.0]);
    }

    #[test]
    fn test_empty_pair_not_stored() {
        let mut table = ChainRoutes::new();
        table.insert_ranked(pair(), vec![], 5);
        assert_eq!(table.pair_count(), 0);
    }

    #[test]
    fn test_replace_chain_swaps_whole_table() {
        let cache = OpportunityCache::new();

        let mut first = ChainRoutes::new();
        first.insert_ranked(pair(), vec![create_test_route("old", 10.0)], 5);
        assert!(cache.replace_chain(Chain::Polygon, first).is_none());

        // Reader holding the old snapshot keeps seeing it after the swap
        let held = cache.snapshot(Chain::Polygon).unwrap();

        let mut second = ChainRoutes::new();
        second.insert_ranked(pair(), vec![create_test_route("new", 20.0)], 5);
        let superseded = cache.replace_chain(Chain::Polygon, second).unwrap();
        assert_eq!(superseded.get(&pair()).unwrap()[0].id, "old");
        assert_eq!(held.get(&pair()).unwrap()[0].id, "old");

        let current = cache.routes_for(Chain::Polygon, pair().0, pair().1);
        assert_eq!(current[0].id, "new");
    }

    #[test]
    fn test_chains_are_independent() {
        let cache = OpportunityCache::new();
        let mut polygon = ChainRoutes::new();
        polygon.insert_ranked(pair(), vec![create_test_route("p", 10.0)], 5);
        cache.replace_chain(Chain::Polygon, polygon);

        assert!(cache.snapshot(Chain::Ethereum).is_none());
        assert!(cache
            .routes_for(Chain::Ethereum, pair().0, pair().1)
            .is_empty());
    }
}
