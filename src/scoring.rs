//! Scoring Engine
//!
//! Computes the three normalized [0,100] metrics for a candidate path:
//! profitability (net of gas, discounted by protocol reliability), risk
//! (impact, hop count, reliability, MEV exposure), and confidence (age decay
//! averaged with weakest-pool liquidity adequacy).
//!
//! Valuation uses the price book with a deterministic 1.0 USD fallback per
//! whole token, so scores are reproducible without a live feed.

use crate::market::calculator::u256_to_f64;
use crate::market::{GasBook, PriceBook};
use crate::registry::ProtocolRegistry;
use crate::types::{Chain, RouteStep};
use alloy::primitives::{Address, U256};
use std::sync::Arc;

/// Wei per whole token for valuation (baseline unit of the engine)
const WEI_PER_UNIT: f64 = 1e18;

/// Pool liquidity at which the confidence adequacy term reaches full marks
const LIQUIDITY_FULL_MARKS_USD: f64 = 50_000.0;

/// Reliability assumed for steps whose protocol is missing from the registry
const UNKNOWN_PROTOCOL_RELIABILITY: f64 = 50.0;

/// Everything the scorer needs about one candidate path
pub struct ScoreInputs<'a> {
    pub chain: Chain,
    pub token_in: Address,
    pub token_out: Address,
    pub amount_in: U256,
    pub expected_output: U256,
    pub cumulative_impact_percent: f64,
    pub cumulative_gas: u64,
    pub steps: &'a [RouteStep],
    /// USD liquidity of the thinnest pool on the path (0 for synthetic quotes)
    pub weakest_liquidity_usd: f64,
    /// Age of the underlying data; 0 at precompute time
    pub age_minutes: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteScores {
    pub profitability: f64,
    pub risk: f64,
    pub confidence: f64,
    /// Unclamped net-profit percent behind the profitability score
    pub net_profit_percent: f64,
}

#[derive(Debug, Clone)]
pub struct RouteScorer {
    prices: PriceBook,
    gas: GasBook,
    registry: Arc<ProtocolRegistry>,
}

impl RouteScorer {
    pub fn new(prices: PriceBook, gas: GasBook, registry: Arc<ProtocolRegistry>) -> Self {
        Self {
            prices,
            gas,
            registry,
        }
    }

    pub fn score(&self, inputs: &ScoreInputs) -> RouteScores {
        let (net_profit_percent, profitability) = self.profitability(inputs);
        RouteScores {
            profitability,
            risk: self.risk(inputs),
            confidence: self.confidence(inputs),
            net_profit_percent,
        }
    }

    /// Net profit percent and the clamped profitability score.
    ///
    /// gross = outputValue - inputValue; net = gross - gasCost;
    /// score = clamp(netPercent * Π(reliability/100) * 10, 0, 100).
    /// The reliability product penalizes unreliable protocols exponentially
    /// with hop count.
    fn profitability(&self, inputs: &ScoreInputs) -> (f64, f64) {
        let input_value = self.value_usd(inputs.chain, inputs.token_in, inputs.amount_in);
        let output_value = self.value_usd(inputs.chain, inputs.token_out, inputs.expected_output);
        if input_value <= 0.0 {
            return (0.0, 0.0);
        }

        let gas_cost = self.gas_cost_usd(inputs.chain, inputs.cumulative_gas);
        let net_profit = output_value - input_value - gas_cost;
        let net_percent = net_profit / input_value * 100.0;

        let reliability_product: f64 = inputs
            .steps
            .iter()
            .map(|s| self.reliability_of(&s.protocol_id) / 100.0)
            .product();

        let score = (net_percent * reliability_product * 10.0).clamp(0.0, 100.0);
        (net_percent, score)
    }

    /// priceImpact*2 + (hops-1)*5 + Σ[(100-reliability)/10 + 5 if no MEV
    /// protection], clamped to [0,100]. Monotone in hops, impact, and
    /// unreliability.
    fn risk(&self, inputs: &ScoreInputs) -> f64 {
        let hop_count = inputs.steps.len().max(1);
        let mut risk = inputs.cumulative_impact_percent * 2.0 + (hop_count as f64 - 1.0) * 5.0;

        for step in inputs.steps {
            let reliability = self.reliability_of(&step.protocol_id);
            risk += (100.0 - reliability) / 10.0;
            let mev_protected = self
                .registry
                .get(&step.protocol_id)
                .map(|p| p.mev_protected)
                .unwrap_or(false);
            if !mev_protected {
                risk += 5.0;
            }
        }

        risk.clamp(0.0, 100.0)
    }

    /// Average of the age-decay term (100 - ageMinutes, floored at 0) and a
    /// bounded liquidity-adequacy term for the weakest pool on the path.
    fn confidence(&self, inputs: &ScoreInputs) -> f64 {
        let age_term = (100.0 - inputs.age_minutes).max(0.0);
        let adequacy = (inputs.weakest_liquidity_usd / LIQUIDITY_FULL_MARKS_USD)
            .clamp(0.0, 1.0)
            * 100.0;
        ((age_term + adequacy) / 2.0).clamp(0.0, 100.0)
    }

    fn value_usd(&self, chain: Chain, token: Address, amount: U256) -> f64 {
        u256_to_f64(amount) / WEI_PER_UNIT * self.prices.usd_or_default(chain, token)
    }

    /// gasUnits * gasPriceWei / 1e18, valued at the native token price
    fn gas_cost_usd(&self, chain: Chain, gas_units: u64) -> f64 {
        let gas_price = u256_to_f64(self.gas.gas_price_or_zero(chain));
        gas_units as f64 * gas_price / WEI_PER_UNIT * self.gas.native_usd_or_default(chain)
    }

    fn reliability_of(&self, protocol_id: &str) -> f64 {
        self.registry
            .get(protocol_id)
            .map(|p| p.reliability)
            .unwrap_or(UNKNOWN_PROTOCOL_RELIABILITY)
    }
}
