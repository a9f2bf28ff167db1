// Core data structures for the route engine.

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

/// Chains the engine can track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Chain {
    Ethereum,
    Polygon,
    Base,
    Arbitrum,
    Optimism,
    Bsc,
}

impl Chain {
    /// Canonical EVM chain id
    pub fn chain_id(&self) -> u64 {
        match self {
            Chain::Ethereum => 1,
            Chain::Polygon => 137,
            Chain::Base => 8453,
            Chain::Arbitrum => 42161,
            Chain::Optimism => 10,
            Chain::Bsc => 56,
        }
    }

    /// All chains the engine knows about
    pub fn all() -> &'static [Chain] {
        &[
            Chain::Ethereum,
            Chain::Polygon,
            Chain::Base,
            Chain::Arbitrum,
            Chain::Optimism,
            Chain::Bsc,
        ]
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Chain::Ethereum => write!(f, "ethereum"),
            Chain::Polygon => write!(f, "polygon"),
            Chain::Base => write!(f, "base"),
            Chain::Arbitrum => write!(f, "arbitrum"),
            Chain::Optimism => write!(f, "optimism"),
            Chain::Bsc => write!(f, "bsc"),
        }
    }
}

impl FromStr for Chain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ethereum" | "mainnet" | "1" => Ok(Chain::Ethereum),
            "polygon" | "matic" | "137" => Ok(Chain::Polygon),
            "base" | "8453" => Ok(Chain::Base),
            "arbitrum" | "42161" => Ok(Chain::Arbitrum),
            "optimism" | "10" => Ok(Chain::Optimism),
            "bsc" | "bnb" | "56" => Ok(Chain::Bsc),
            other => Err(format!("unknown chain: {}", other)),
        }
    }
}

/// Exchange protocol categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProtocolKind {
    Amm,
    Orderbook,
    Aggregator,
    Lending,
}

impl fmt::Display for ProtocolKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ProtocolKind::Amm => write!(f, "amm"),
            ProtocolKind::Orderbook => write!(f, "orderbook"),
            ProtocolKind::Aggregator => write!(f, "aggregator"),
            ProtocolKind::Lending => write!(f, "lending"),
        }
    }
}

/// Static configuration for one exchange protocol.
/// Immutable after registry load.
#[derive(Debug, Clone)]
pub struct ProtocolConfig {
    pub id: String,
    pub name: String,
    pub kind: ProtocolKind,
    pub chains: Vec<Chain>,
    pub router: Address,
    /// Swap fee in basis points
    pub fee_bps: u32,
    /// Gas units charged once per route using this protocol
    pub base_gas: u64,
    /// Gas units charged per hop
    pub per_hop_gas: u64,
    /// Pools below this USD liquidity are ignored for routing
    pub min_liquidity_usd: f64,
    /// Historical reliability, 0-100
    pub reliability: f64,
    pub mev_protected: bool,
}

impl ProtocolConfig {
    pub fn supports_chain(&self, chain: Chain) -> bool {
        self.chains.contains(&chain)
    }
}

/// Snapshot of one liquidity pool.
/// Owned by the pool store; replaced wholesale on each update.
#[derive(Debug, Clone)]
pub struct LiquidityPool {
    pub id: String,
    pub protocol_id: String,
    pub chain: Chain,
    pub token_a: Address,
    pub token_b: Address,
    pub reserve_a: U256,
    pub reserve_b: U256,
    pub fee_bps: u32,
    pub liquidity_usd: f64,
    pub volume_24h_usd: f64,
    /// Price impact (percent) precomputed for the baseline trade size
    pub baseline_impact_percent: f64,
    pub last_updated: Instant,
}

impl LiquidityPool {
    /// True if the pool can quote this ordered pair (either direction)
    pub fn covers_pair(&self, token_in: Address, token_out: Address) -> bool {
        (self.token_a == token_in && self.token_b == token_out)
            || (self.token_b == token_in && self.token_a == token_out)
    }

    /// Reserves oriented for a swap of `token_in`: (reserve_in, reserve_out).
    /// Returns None if the pool does not hold `token_in`.
    pub fn reserves_for(&self, token_in: Address) -> Option<(U256, U256)> {
        if token_in == self.token_a {
            Some((self.reserve_a, self.reserve_b))
        } else if token_in == self.token_b {
            Some((self.reserve_b, self.reserve_a))
        } else {
            None
        }
    }

    pub fn has_reserves(&self) -> bool {
        !self.reserve_a.is_zero() && !self.reserve_b.is_zero()
    }
}

/// Latest price-feed reading for a token
#[derive(Debug, Clone)]
pub struct MarketPrice {
    pub usd: f64,
    /// 24h volatility, percent
    pub volatility_24h: f64,
    pub market_cap_usd: f64,
    pub updated: Instant,
}

impl MarketPrice {
    pub fn new(usd: f64) -> Self {
        Self {
            usd,
            volatility_24h: 0.0,
            market_cap_usd: 0.0,
            updated: Instant::now(),
        }
    }
}

/// Latest gas conditions for a chain
#[derive(Debug, Clone)]
pub struct GasMetrics {
    pub gas_price_wei: U256,
    /// USD price of the chain's native token, for gas-cost valuation
    pub native_token_usd: f64,
    pub updated: Instant,
}

/// One swap within a route. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct RouteStep {
    pub protocol_id: String,
    pub pool_id: String,
    pub token_in: Address,
    pub token_out: Address,
    pub amount_in: U256,
    pub amount_out: U256,
    pub price_impact_percent: f64,
    pub gas_estimate: u64,
}

/// A discovered and scored route, cached per (chain, token_in, token_out).
/// Read-only after construction; superseded (never mutated) by the next
/// precompute cycle.
#[derive(Debug, Clone)]
pub struct PrecomputedRoute {
    pub id: String,
    pub token_in: Address,
    pub token_out: Address,
    pub chain: Chain,
    /// 1..=MAX_HOPS steps; the token sequence is a simple path (no repeats)
    pub steps: Vec<RouteStep>,
    pub expected_output: U256,
    pub cumulative_impact_percent: f64,
    pub cumulative_gas: u64,
    /// Net profit relative to input value, percent. Raw signal behind the
    /// clamped profitability score.
    pub net_profit_percent: f64,
    pub profitability: f64,
    pub risk: f64,
    pub confidence: f64,
    pub computed_at: Instant,
}

impl PrecomputedRoute {
    pub fn hop_count(&self) -> usize {
        self.steps.len()
    }

    /// Baseline input amount the route was priced at
    pub fn baseline_amount(&self) -> U256 {
        self.steps.first().map(|s| s.amount_in).unwrap_or(U256::ZERO)
    }

    /// Token sequence: token_in, intermediates.., token_out
    pub fn path_tokens(&self) -> Vec<Address> {
        let mut tokens = Vec::with_capacity(self.steps.len() + 1);
        tokens.push(self.token_in);
        for step in &self.steps {
            tokens.push(step.token_out);
        }
        tokens
    }

    /// Number of distinct protocols the path touches
    pub fn distinct_protocols(&self) -> usize {
        let mut ids: Vec<&str> = self.steps.iter().map(|s| s.protocol_id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }

    pub fn age_secs(&self) -> u64 {
        self.computed_at.elapsed().as_secs()
    }
}

/// Outcome pushed back by an execution layer after attempting a route.
/// Recorded for reporting only; never fed back into scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteExecutionOutcome {
    pub success: bool,
    pub actual_output: String,
    pub expected_output: String,
    pub slippage_percent: f64,
    pub execution_time_ms: u64,
    pub gas_used: u64,
    pub mev_detected: bool,
    pub recorded_at: chrono::DateTime<chrono::Utc>,
}
