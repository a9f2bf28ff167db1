//! Engine configuration
//!
//! Defaults match the precompute policy constants; `from_env` overrides
//! individual knobs from the environment (a `.env` file is honored).

use crate::types::Chain;
use alloy::primitives::{Address, U256};
use anyhow::{Context, Result};
use std::str::FromStr;
use std::time::Duration;

/// Tuning knobs for discovery, scoring, and the precompute cycle
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Cadence of the background precompute cycle
    pub recompute_interval: Duration,
    /// Routes older than this are treated as cache misses by every query
    pub max_route_age: Duration,
    /// Maximum swaps per route
    pub max_hops: usize,
    /// Cache bound per (chain, token_in, token_out)
    pub max_routes_per_pair: usize,
    /// BFS branch cap: neighbors expanded per node, best routing score first
    pub branch_limit: usize,
    /// Hard cap on pairs evaluated per chain per cycle
    pub max_priority_pairs: usize,
    /// Top-K tokens per chain considered for priority pairs
    pub priority_token_count: usize,
    /// Multi-hop paths above this cumulative impact are pruned at completion
    pub max_cumulative_impact_percent: f64,
    /// Nominal input amount routes are precomputed at (wei scale, fixed
    /// regardless of token decimals)
    pub baseline_amount: U256,
    /// best_route / route_options confidence floor
    pub min_confidence: f64,
    /// best_route / route_options risk ceiling
    pub max_risk: f64,
    /// Fixed spread applied by the price-feed fallback quote
    pub fallback_spread_bps: u32,
    /// Major/stable tokens whose pairs are always precomputed for their chain
    pub major_tokens: Vec<(Chain, Address)>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            recompute_interval: Duration::from_secs(30),
            max_route_age: Duration::from_secs(120),
            max_hops: 3,
            max_routes_per_pair: 5,
            branch_limit: 15,
            max_priority_pairs: 250,
            priority_token_count: 12,
            max_cumulative_impact_percent: 5.0,
            baseline_amount: U256::from(1_000_000_000_000_000_000u64),
            min_confidence: 70.0,
            max_risk: 30.0,
            fallback_spread_bps: 30,
            major_tokens: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Load defaults, then apply environment overrides.
    ///
    /// Recognized variables: `RECOMPUTE_INTERVAL_SECS`, `MAX_ROUTE_AGE_SECS`,
    /// `MAX_HOPS`, `MAX_ROUTES_PER_PAIR`, `BRANCH_LIMIT`,
    /// `MAX_PRIORITY_PAIRS`, `PRIORITY_TOKEN_COUNT`, `MAX_IMPACT_PERCENT`,
    /// `MAJOR_TOKENS` (comma list of `chain:0xaddress`).
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        let mut config = Self::default();

        if let Ok(v) = std::env::var("RECOMPUTE_INTERVAL_SECS") {
            config.recompute_interval =
                Duration::from_secs(v.parse().context("RECOMPUTE_INTERVAL_SECS not a number")?);
        }
        if let Ok(v) = std::env::var("MAX_ROUTE_AGE_SECS") {
            config.max_route_age =
                Duration::from_secs(v.parse().context("MAX_ROUTE_AGE_SECS not a number")?);
        }
        if let Ok(v) = std::env::var("MAX_HOPS") {
            config.max_hops = v.parse().context("MAX_HOPS not a number")?;
        }
        if let Ok(v) = std::env::var("MAX_ROUTES_PER_PAIR") {
            config.max_routes_per_pair = v.parse().context("MAX_ROUTES_PER_PAIR not a number")?;
        }
        if let Ok(v) = std::env::var("BRANCH_LIMIT") {
            config.branch_limit = v.parse().context("BRANCH_LIMIT not a number")?;
        }
        if let Ok(v) = std::env::var("MAX_PRIORITY_PAIRS") {
            config.max_priority_pairs = v.parse().context("MAX_PRIORITY_PAIRS not a number")?;
        }
        if let Ok(v) = std::env::var("PRIORITY_TOKEN_COUNT") {
            config.priority_token_count =
                v.parse().context("PRIORITY_TOKEN_COUNT not a number")?;
        }
        if let Ok(v) = std::env::var("MAX_IMPACT_PERCENT") {
            config.max_cumulative_impact_percent =
                v.parse().context("MAX_IMPACT_PERCENT not a number")?;
        }
        if let Ok(v) = std::env::var("MAJOR_TOKENS") {
            config.major_tokens = parse_major_tokens(&v)?;
        }

        Ok(config)
    }

    /// Amount reuse band for cached routes: within one order of magnitude of
    /// the precompute baseline, either direction.
    pub fn amount_within_band(&self, baseline: U256, amount: U256) -> bool {
        if baseline.is_zero() || amount.is_zero() {
            return false;
        }
        amount >= baseline / U256::from(10u64) && amount <= baseline.saturating_mul(U256::from(10u64))
    }
}

/// Parse `polygon:0xabc..,ethereum:0xdef..` into (chain, token) pairs
fn parse_major_tokens(raw: &str) -> Result<Vec<(Chain, Address)>> {
    let mut out = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (chain_str, addr_str) = entry
            .split_once(':')
            .with_context(|| format!("invalid MAJOR_TOKENS entry: {}", entry))?;
        let chain = Chain::from_str(chain_str.trim())
            .map_err(|e| anyhow::anyhow!("invalid MAJOR_TOKENS chain: {}", e))?;
        let addr = Address::from_str(addr_str.trim())
            .with_context(|| format!("invalid MAJOR_TOKENS address: {}", addr_str))?;
        out.push((chain, addr));
    }
    Ok(out)
}
