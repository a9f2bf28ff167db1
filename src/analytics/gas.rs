//! Gas analytics view
//!
//! Current reading plus a simple average/trend over the gas book's bounded
//! history for one chain.

use crate::market::calculator::u256_to_f64;
use crate::market::GasBook;
use crate::types::Chain;
use serde::Serialize;

/// Band around the average treated as flat, fraction of the average
const TREND_BAND: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GasTrend {
    Rising,
    Falling,
    Flat,
}

#[derive(Debug, Clone, Serialize)]
pub struct GasAnalytics {
    pub chain: Chain,
    pub current_gas_price_wei: String,
    pub average_gas_price_wei: String,
    pub native_token_usd: f64,
    pub samples: usize,
    pub trend: GasTrend,
}

/// None when the chain has no gas readings yet
pub fn analyze_gas(chain: Chain, gas: &GasBook) -> Option<GasAnalytics> {
    let latest = gas.latest(chain)?;
    let history = gas.history(chain);
    if history.is_empty() {
        return None;
    }

    let current = u256_to_f64(latest.gas_price_wei);
    let average =
        history.iter().map(|m| u256_to_f64(m.gas_price_wei)).sum::<f64>() / history.len() as f64;

    let trend = if current > average * (1.0 + TREND_BAND) {
        GasTrend::Rising
    } else if current < average * (1.0 - TREND_BAND) {
        GasTrend::Falling
    } else {
        GasTrend::Flat
    };

    Some(GasAnalytics {
        chain,
        current_gas_price_wei: latest.gas_price_wei.to_string(),
        average_gas_price_wei: format!("{:.0}", average),
        native_token_usd: latest.native_token_usd,
        samples: history.len(),
        trend,
    })
}
