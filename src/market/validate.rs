//! Ingest-boundary validation
//!
//! Every pushed update is checked here before it can touch the stores or
//! the token graph. Rejection is a typed error, never a panic.

use crate::errors::ValidationError;
use crate::registry::ProtocolRegistry;
use crate::types::{GasMetrics, LiquidityPool, MarketPrice};
use alloy::primitives::Address;

const MAX_FEE_BPS: u32 = 10_000;

pub fn validate_pool(
    pool: &LiquidityPool,
    registry: &ProtocolRegistry,
) -> Result<(), ValidationError> {
    if pool.id.trim().is_empty() {
        return Err(ValidationError::EmptyPoolId);
    }
    if pool.token_a == pool.token_b {
        return Err(ValidationError::IdenticalTokens(pool.id.clone()));
    }
    if pool.token_a == Address::ZERO || pool.token_b == Address::ZERO {
        return Err(ValidationError::ZeroTokenAddress(pool.id.clone()));
    }
    if !registry.contains(&pool.protocol_id) {
        return Err(ValidationError::UnknownProtocol(
            pool.id.clone(),
            pool.protocol_id.clone(),
        ));
    }
    if pool.fee_bps >= MAX_FEE_BPS {
        return Err(ValidationError::FeeOutOfRange(pool.id.clone(), pool.fee_bps));
    }
    if !pool.liquidity_usd.is_finite() || pool.liquidity_usd < 0.0 {
        return Err(ValidationError::NonFiniteMetric(pool.id.clone(), "liquidity_usd"));
    }
    if !pool.volume_24h_usd.is_finite() || pool.volume_24h_usd < 0.0 {
        return Err(ValidationError::NonFiniteMetric(pool.id.clone(), "volume_24h_usd"));
    }
    if !pool.baseline_impact_percent.is_finite() || pool.baseline_impact_percent < 0.0 {
        return Err(ValidationError::NonFiniteMetric(
            pool.id.clone(),
            "baseline_impact_percent",
        ));
    }
    // Zero reserves are accepted here: a drained pool is valid state and is
    // excluded at discovery time instead.
    Ok(())
}

pub fn validate_price(token: Address, price: &MarketPrice) -> Result<(), ValidationError> {
    if !price.usd.is_finite() || price.usd <= 0.0 {
        return Err(ValidationError::InvalidPrice(format!("{token:?}"), price.usd));
    }
    if !price.volatility_24h.is_finite() || price.volatility_24h < 0.0 {
        return Err(ValidationError::InvalidPriceMetric(
            format!("{token:?}"),
            "volatility_24h",
        ));
    }
    if !price.market_cap_usd.is_finite() || price.market_cap_usd < 0.0 {
        return Err(ValidationError::InvalidPriceMetric(
            format!("{token:?}"),
            "market_cap_usd",
        ));
    }
    Ok(())
}

pub fn validate_gas(chain: crate::types::Chain, metrics: &GasMetrics) -> Result<(), ValidationError> {
    if !metrics.native_token_usd.is_finite() || metrics.native_token_usd <= 0.0 {
        return Err(ValidationError::InvalidGasMetrics(
            chain.to_string(),
            metrics.native_token_usd,
        ));
    }
    Ok(())
}
