//! Gas book
//!
//! Latest gas conditions per chain plus a short bounded history for the
//! gas-analytics view. Consumed by scoring and live-enriched queries.

use crate::types::{Chain, GasMetrics};
use alloy::primitives::U256;
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::Arc;

/// Samples retained per chain for trend analysis
const HISTORY_DEPTH: usize = 32;

#[derive(Debug, Default)]
pub struct GasBook {
    latest: Arc<DashMap<Chain, GasMetrics>>,
    history: Arc<DashMap<Chain, VecDeque<GasMetrics>>>,
}

impl Clone for GasBook {
    fn clone(&self) -> Self {
        Self {
            latest: Arc::clone(&self.latest),
            history: Arc::clone(&self.history),
        }
    }
}

impl GasBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&self, chain: Chain, metrics: GasMetrics) {
        let mut entry = self.history.entry(chain).or_default();
        if entry.len() == HISTORY_DEPTH {
            entry.pop_front();
        }
        entry.push_back(metrics.clone());
        drop(entry);

        self.latest.insert(chain, metrics);
    }

    pub fn latest(&self, chain: Chain) -> Option<GasMetrics> {
        self.latest.get(&chain).map(|entry| entry.clone())
    }

    /// Gas price used by scoring: latest reading, or zero when the chain has
    /// no reading yet (gas cost then contributes nothing).
    pub fn gas_price_or_zero(&self, chain: Chain) -> U256 {
        self.latest(chain).map(|m| m.gas_price_wei).unwrap_or(U256::ZERO)
    }

    pub fn native_usd_or_default(&self, chain: Chain) -> f64 {
        self.latest(chain).map(|m| m.native_token_usd).unwrap_or(1.0)
    }

    /// Oldest-first history snapshot for the analytics view
    pub fn history(&self, chain: Chain) -> Vec<GasMetrics> {
        self.history
            .get(&chain)
            .map(|entry| entry.iter().cloned().collect())
            .unwrap_or_default()
    }
}
