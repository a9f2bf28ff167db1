//! Price book
//!
//! Latest price-feed reading per (chain, token). Consumed by fallback
//! quoting, token prioritization, and scoring valuation.

use crate::types::{Chain, MarketPrice};
use alloy::primitives::Address;
use dashmap::DashMap;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct PriceBook {
    prices: Arc<DashMap<(Chain, Address), MarketPrice>>,
}

impl Clone for PriceBook {
    fn clone(&self) -> Self {
        Self {
            prices: Arc::clone(&self.prices),
        }
    }
}

impl PriceBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&self, chain: Chain, token: Address, price: MarketPrice) {
        self.prices.insert((chain, token), price);
    }

    pub fn get(&self, chain: Chain, token: Address) -> Option<MarketPrice> {
        self.prices.get(&(chain, token)).map(|entry| entry.clone())
    }

    /// USD value used by scoring: known price, or 1.0 per whole token when
    /// the feed has no reading (keeps scoring deterministic).
    pub fn usd_or_default(&self, chain: Chain, token: Address) -> f64 {
        self.get(chain, token).map(|p| p.usd).unwrap_or(1.0)
    }

    pub fn has_price(&self, chain: Chain, token: Address) -> bool {
        self.prices.contains_key(&(chain, token))
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}
