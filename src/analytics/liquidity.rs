//! Liquidity analysis view
//!
//! Per-chain breakdown of the pool store for dashboards: totals, per-protocol
//! aggregates, and the deepest tokens.

use crate::market::PoolStore;
use crate::types::Chain;
use alloy::primitives::Address;
use serde::Serialize;
use std::collections::HashMap;

/// Tokens listed in the `top_tokens` section
const TOP_TOKEN_COUNT: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct ProtocolLiquidity {
    pub protocol_id: String,
    pub pool_count: usize,
    pub liquidity_usd: f64,
    pub volume_24h_usd: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenLiquidity {
    /// Hex-encoded token address
    pub token: String,
    pub liquidity_usd: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LiquidityAnalysis {
    pub chain: Chain,
    pub pool_count: usize,
    pub total_liquidity_usd: f64,
    pub total_volume_24h_usd: f64,
    pub by_protocol: Vec<ProtocolLiquidity>,
    pub top_tokens: Vec<TokenLiquidity>,
}

pub fn analyze_liquidity(chain: Chain, pools: &PoolStore) -> LiquidityAnalysis {
    let chain_pools = pools.pools_on_chain(chain);

    let mut by_protocol: HashMap<String, ProtocolLiquidity> = HashMap::new();
    let mut by_token: HashMap<Address, f64> = HashMap::new();
    let mut total_liquidity = 0.0;
    let mut total_volume = 0.0;

    for pool in &chain_pools {
        total_liquidity += pool.liquidity_usd;
        total_volume += pool.volume_24h_usd;

        let entry = by_protocol
            .entry(pool.protocol_id.clone())
            .or_insert_with(|| ProtocolLiquidity {
                protocol_id: pool.protocol_id.clone(),
                pool_count: 0,
                liquidity_usd: 0.0,
                volume_24h_usd: 0.0,
            });
        entry.pool_count += 1;
        entry.liquidity_usd += pool.liquidity_usd;
        entry.volume_24h_usd += pool.volume_24h_usd;

        for token in [pool.token_a, pool.token_b] {
            *by_token.entry(token).or_default() += pool.liquidity_usd;
        }
    }

    let mut by_protocol: Vec<ProtocolLiquidity> = by_protocol.into_values().collect();
    by_protocol.sort_by(|a, b| {
        b.liquidity_usd
            .partial_cmp(&a.liquidity_usd)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut top_tokens: Vec<TokenLiquidity> = by_token
        .into_iter()
        .map(|(token, liquidity_usd)| TokenLiquidity {
            token: format!("{token:#x}"),
            liquidity_usd,
        })
        .collect();
    top_tokens.sort_by(|a, b| {
        b.liquidity_usd
            .partial_cmp(&a.liquidity_usd)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    top_tokens.truncate(TOP_TOKEN_COUNT);

    LiquidityAnalysis {
        chain,
        pool_count: chain_pools.len(),
        total_liquidity_usd: total_liquidity,
        total_volume_24h_usd: total_volume,
        by_protocol,
        top_tokens,
    }
}
