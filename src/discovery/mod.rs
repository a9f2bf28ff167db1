//! Route Discovery
//!
//! Finds candidate direct and multi-hop swap paths through the token graph.
//! Candidates are raw paths; the scoring engine turns them into
//! `PrecomputedRoute`s.

pub mod direct;
pub mod multi_hop;
pub mod priority;

pub use priority::priority_pairs;

use crate::config::EngineConfig;
use crate::market::{GasBook, PoolStore, PriceBook, TokenGraph};
use crate::registry::ProtocolRegistry;
use crate::types::{Chain, LiquidityPool, RouteStep};
use alloy::primitives::{Address, U256};
use std::sync::Arc;

/// A discovered path before scoring
#[derive(Debug, Clone)]
pub struct CandidatePath {
    pub steps: Vec<RouteStep>,
    pub expected_output: U256,
    pub cumulative_impact_percent: f64,
    pub cumulative_gas: u64,
    /// Thinnest pool on the path; 0 for synthetic fallback quotes
    pub weakest_liquidity_usd: f64,
}

/// Path finder over the current market state. Cheap to clone; all stores are
/// shared handles.
#[derive(Debug, Clone)]
pub struct RouteDiscovery {
    pub(crate) pools: PoolStore,
    pub(crate) graph: TokenGraph,
    pub(crate) prices: PriceBook,
    pub(crate) gas: GasBook,
    pub(crate) registry: Arc<ProtocolRegistry>,
    pub(crate) config: Arc<EngineConfig>,
}

impl RouteDiscovery {
    pub fn new(
        pools: PoolStore,
        graph: TokenGraph,
        prices: PriceBook,
        gas: GasBook,
        registry: Arc<ProtocolRegistry>,
        config: Arc<EngineConfig>,
    ) -> Self {
        Self {
            pools,
            graph,
            prices,
            gas,
            registry,
            config,
        }
    }

    /// All candidates for a pair: direct pools (or the deterministic
    /// price-feed fallback) plus pruned multi-hop paths.
    pub fn find_candidates(
        &self,
        chain: Chain,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Vec<CandidatePath> {
        if token_in == token_out || amount_in.is_zero() {
            return Vec::new();
        }

        let mut candidates = self.direct_candidates(chain, token_in, token_out, amount_in);
        candidates.extend(self.multi_hop_candidates(chain, token_in, token_out, amount_in));
        candidates
    }

    /// Build one step through a specific pool, choosing reserves by swap
    /// direction. Returns None when the pool cannot quote (wrong tokens,
    /// drained reserves, zero output).
    pub(crate) fn step_through_pool(
        &self,
        pool: &LiquidityPool,
        token_in: Address,
        amount_in: U256,
        is_first_hop: bool,
    ) -> Option<RouteStep> {
        use crate::market::SwapCalculator;

        let (reserve_in, reserve_out) = pool.reserves_for(token_in)?;
        let amount_out = SwapCalculator::amount_out(amount_in, reserve_in, reserve_out, pool.fee_bps);
        if amount_out.is_zero() {
            return None;
        }

        let token_out = if token_in == pool.token_a {
            pool.token_b
        } else {
            pool.token_a
        };

        let protocol = self.registry.get(&pool.protocol_id)?;
        // The first hop of a route carries the protocol's base gas
        let gas_estimate = if is_first_hop {
            protocol.base_gas + protocol.per_hop_gas
        } else {
            protocol.per_hop_gas
        };

        Some(RouteStep {
            protocol_id: pool.protocol_id.clone(),
            pool_id: pool.id.clone(),
            token_in,
            token_out,
            amount_in,
            amount_out,
            price_impact_percent: SwapCalculator::price_impact_percent(
                amount_in,
                reserve_in,
                pool.fee_bps,
            ),
            gas_estimate,
        })
    }

    /// Pool passes the per-protocol liquidity floor
    pub(crate) fn meets_liquidity_floor(&self, pool: &LiquidityPool) -> bool {
        self.registry
            .get(&pool.protocol_id)
            .map(|p| pool.liquidity_usd >= p.min_liquidity_usd)
            .unwrap_or(false)
    }
}
