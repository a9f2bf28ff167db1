//! Direct (single-hop) route discovery
//!
//! Scans real pools for the requested pair; when none qualify, falls back to
//! a deterministic estimate derived from ingested prices so results stay
//! reproducible — never fabricated numbers.

use super::{CandidatePath, RouteDiscovery};
use crate::market::calculator::apply_rate;
use crate::types::{Chain, ProtocolKind, RouteStep};
use alloy::primitives::{Address, U256};
use tracing::debug;

/// Volatility-to-slippage factor for the fallback quote: 1% volatility adds
/// 10 bps of assumed slippage
const SLIPPAGE_BPS_PER_VOLATILITY_PERCENT: f64 = 10.0;

/// Cap on the fallback slippage term
const MAX_SLIPPAGE_BPS: f64 = 500.0;

impl RouteDiscovery {
    /// One candidate per qualifying pool; the price-feed fallback when no
    /// real pool exists for the pair.
    pub(crate) fn direct_candidates(
        &self,
        chain: Chain,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Vec<CandidatePath> {
        let pools = self.pools.pools_for_pair(chain, token_in, token_out);

        let mut candidates = Vec::new();
        for pool in &pools {
            if !self.meets_liquidity_floor(pool) {
                debug!(pool = %pool.id, liquidity = pool.liquidity_usd, "below protocol liquidity floor");
                continue;
            }
            let Some(step) = self.step_through_pool(pool, token_in, amount_in, true) else {
                continue;
            };
            candidates.push(CandidatePath {
                expected_output: step.amount_out,
                cumulative_impact_percent: step.price_impact_percent,
                cumulative_gas: step.gas_estimate,
                weakest_liquidity_usd: pool.liquidity_usd,
                steps: vec![step],
            });
        }

        if candidates.is_empty() {
            if let Some(fallback) = self.fallback_candidate(chain, token_in, token_out, amount_in) {
                candidates.push(fallback);
            }
        }
        candidates
    }

    /// Deterministic estimate from the price feed: exchange rate from the
    /// price ratio, minus a fixed spread and a volatility-proportional
    /// slippage term. Requires readings for both tokens.
    fn fallback_candidate(
        &self,
        chain: Chain,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Option<CandidatePath> {
        let price_in = self.prices.get(chain, token_in)?;
        let price_out = self.prices.get(chain, token_out)?;
        if price_out.usd <= 0.0 {
            return None;
        }

        let rate = price_in.usd / price_out.usd;
        let volatility = (price_in.volatility_24h + price_out.volatility_24h) / 2.0;
        let slippage_bps =
            (volatility * SLIPPAGE_BPS_PER_VOLATILITY_PERCENT).min(MAX_SLIPPAGE_BPS);
        let haircut_bps = self.config.fallback_spread_bps as f64 + slippage_bps;

        let gross = apply_rate(amount_in, rate);
        let amount_out = gross * U256::from((10_000.0 - haircut_bps) as u64) / U256::from(10_000u64);
        if amount_out.is_zero() {
            return None;
        }

        // Route the estimate through an aggregator when one covers the chain,
        // otherwise the first protocol registered for it
        let on_chain = self.registry.on_chain(chain);
        let protocol = on_chain
            .iter()
            .find(|p| p.kind == ProtocolKind::Aggregator)
            .or_else(|| on_chain.first())?;

        let step = RouteStep {
            protocol_id: protocol.id.clone(),
            pool_id: format!("virtual:{}:{:?}-{:?}", chain, token_in, token_out),
            token_in,
            token_out,
            amount_in,
            amount_out,
            price_impact_percent: haircut_bps / 100.0,
            gas_estimate: protocol.base_gas + protocol.per_hop_gas,
        };

        debug!(
            chain = %chain,
            rate,
            haircut_bps,
            "no real pool for pair, using price-feed fallback quote"
        );

        Some(CandidatePath {
            expected_output: step.amount_out,
            cumulative_impact_percent: step.price_impact_percent,
            cumulative_gas: step.gas_estimate,
            weakest_liquidity_usd: 0.0,
            steps: vec![step],
        })
    }
}
