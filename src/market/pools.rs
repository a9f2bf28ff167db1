//! Pool store
//!
//! Thread-safe storage for liquidity pool snapshots using DashMap.
//! Pools are keyed by id and replaced wholesale on each ingest; there is
//! no partial mutation.

use crate::types::{Chain, LiquidityPool};
use alloy::primitives::Address;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Concurrent pool snapshot store; cheap to clone (shared map)
#[derive(Debug, Default)]
pub struct PoolStore {
    pools: Arc<DashMap<String, LiquidityPool>>,
}

impl Clone for PoolStore {
    fn clone(&self) -> Self {
        Self {
            pools: Arc::clone(&self.pools),
        }
    }
}

impl PoolStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a pool snapshot
    pub fn upsert(&self, pool: LiquidityPool) {
        debug!(
            pool = %pool.id,
            chain = %pool.chain,
            liquidity_usd = pool.liquidity_usd,
            "pool snapshot stored"
        );
        self.pools.insert(pool.id.clone(), pool);
    }

    pub fn get(&self, pool_id: &str) -> Option<LiquidityPool> {
        self.pools.get(pool_id).map(|entry| entry.clone())
    }

    /// Pools on `chain` quoting the (token_in, token_out) pair in either
    /// orientation, with non-zero reserves. Zero-reserve pools are skipped
    /// silently per the discovery contract.
    pub fn pools_for_pair(
        &self,
        chain: Chain,
        token_in: Address,
        token_out: Address,
    ) -> Vec<LiquidityPool> {
        self.pools
            .iter()
            .filter(|entry| {
                let p = entry.value();
                p.chain == chain && p.covers_pair(token_in, token_out) && p.has_reserves()
            })
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// All pools on a chain
    pub fn pools_on_chain(&self, chain: Chain) -> Vec<LiquidityPool> {
        self.pools
            .iter()
            .filter(|entry| entry.value().chain == chain)
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Chains currently present in the store
    pub fn chains(&self) -> Vec<Chain> {
        let set: HashSet<Chain> = self.pools.iter().map(|entry| entry.value().chain).collect();
        let mut chains: Vec<Chain> = set.into_iter().collect();
        chains.sort_by_key(|c| c.chain_id());
        chains
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    pub fn remove(&self, pool_id: &str) -> Option<LiquidityPool> {
        self.pools.remove(pool_id).map(|(_, v)| v)
    }

    pub fn clear(&self) {
        self.pools.clear();
    }
}
