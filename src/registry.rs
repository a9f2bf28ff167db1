//! Protocol Registry
//!
//! Static catalog of exchange protocols, loaded once at engine init.
//! Provides id lookup, fuzzy name lookup (upstream feeds name protocols
//! loosely), and a chain-overlap adjacency set used only to bound
//! exploration.

use crate::types::{Chain, ProtocolConfig, ProtocolKind};
use alloy::primitives::Address;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Built-in catalog of well-known protocols. Callers can pass their own list;
/// this keeps the engine usable without any wiring.
pub static DEFAULT_PROTOCOLS: Lazy<Vec<ProtocolConfig>> = Lazy::new(|| {
    let evm = vec![
        Chain::Ethereum,
        Chain::Polygon,
        Chain::Base,
        Chain::Arbitrum,
        Chain::Optimism,
    ];
    vec![
        ProtocolConfig {
            id: "uniswap_v2".into(),
            name: "Uniswap V2".into(),
            kind: ProtocolKind::Amm,
            chains: vec![Chain::Ethereum, Chain::Polygon, Chain::Base, Chain::Arbitrum],
            router: Address::ZERO,
            fee_bps: 30,
            base_gas: 120_000,
            per_hop_gas: 80_000,
            min_liquidity_usd: 10_000.0,
            reliability: 95.0,
            mev_protected: false,
        },
        ProtocolConfig {
            id: "uniswap_v3".into(),
            name: "Uniswap V3".into(),
            kind: ProtocolKind::Amm,
            chains: evm.clone(),
            router: Address::ZERO,
            fee_bps: 30,
            base_gas: 150_000,
            per_hop_gas: 100_000,
            min_liquidity_usd: 25_000.0,
            reliability: 97.0,
            mev_protected: false,
        },
        ProtocolConfig {
            id: "sushiswap".into(),
            name: "SushiSwap".into(),
            kind: ProtocolKind::Amm,
            chains: evm.clone(),
            router: Address::ZERO,
            fee_bps: 30,
            base_gas: 130_000,
            per_hop_gas: 85_000,
            min_liquidity_usd: 10_000.0,
            reliability: 92.0,
            mev_protected: false,
        },
        ProtocolConfig {
            id: "curve".into(),
            name: "Curve".into(),
            kind: ProtocolKind::Amm,
            chains: vec![Chain::Ethereum, Chain::Polygon, Chain::Arbitrum, Chain::Optimism],
            router: Address::ZERO,
            fee_bps: 4,
            base_gas: 250_000,
            per_hop_gas: 150_000,
            min_liquidity_usd: 50_000.0,
            reliability: 96.0,
            mev_protected: false,
        },
        ProtocolConfig {
            id: "balancer".into(),
            name: "Balancer".into(),
            kind: ProtocolKind::Amm,
            chains: vec![Chain::Ethereum, Chain::Polygon, Chain::Arbitrum],
            router: Address::ZERO,
            fee_bps: 25,
            base_gas: 180_000,
            per_hop_gas: 110_000,
            min_liquidity_usd: 25_000.0,
            reliability: 93.0,
            mev_protected: false,
        },
        ProtocolConfig {
            id: "pancakeswap".into(),
            name: "PancakeSwap".into(),
            kind: ProtocolKind::Amm,
            chains: vec![Chain::Bsc, Chain::Ethereum, Chain::Base],
            router: Address::ZERO,
            fee_bps: 25,
            base_gas: 120_000,
            per_hop_gas: 80_000,
            min_liquidity_usd: 10_000.0,
            reliability: 90.0,
            mev_protected: false,
        },
        ProtocolConfig {
            id: "oneinch".into(),
            name: "1inch".into(),
            kind: ProtocolKind::Aggregator,
            chains: evm,
            router: Address::ZERO,
            fee_bps: 0,
            base_gas: 300_000,
            per_hop_gas: 120_000,
            min_liquidity_usd: 0.0,
            reliability: 94.0,
            mev_protected: true,
        },
    ]
});

/// Immutable protocol catalog with derived adjacency
#[derive(Debug)]
pub struct ProtocolRegistry {
    /// Registration order preserved for fuzzy-match tie-breaking
    protocols: Vec<ProtocolConfig>,
    by_id: HashMap<String, usize>,
    /// protocol id -> ids sharing at least one chain
    adjacency: HashMap<String, HashSet<String>>,
}

impl ProtocolRegistry {
    pub fn new(protocols: Vec<ProtocolConfig>) -> Self {
        let mut by_id = HashMap::new();
        for (idx, p) in protocols.iter().enumerate() {
            // First registration wins on duplicate ids
            by_id.entry(p.id.clone()).or_insert(idx);
        }

        let mut adjacency: HashMap<String, HashSet<String>> = HashMap::new();
        for a in &protocols {
            for b in &protocols {
                if a.id == b.id {
                    continue;
                }
                if a.chains.iter().any(|c| b.chains.contains(c)) {
                    adjacency.entry(a.id.clone()).or_default().insert(b.id.clone());
                }
            }
        }

        debug!(count = protocols.len(), "protocol registry loaded");
        Self {
            protocols,
            by_id,
            adjacency,
        }
    }

    /// Registry over the built-in catalog
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_PROTOCOLS.clone())
    }

    pub fn get(&self, id: &str) -> Option<&ProtocolConfig> {
        self.by_id.get(id).map(|&idx| &self.protocols[idx])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Fuzzy lookup for loosely-named upstream data.
    /// Match quality: exact id > exact name > substring containment.
    /// Ties go to the first-registered protocol.
    pub fn find_fuzzy(&self, query: &str) -> Option<&ProtocolConfig> {
        let q = query.trim().to_ascii_lowercase();
        if q.is_empty() {
            return None;
        }

        let mut best: Option<(u8, &ProtocolConfig)> = None;
        for p in &self.protocols {
            let id = p.id.to_ascii_lowercase();
            let name = p.name.to_ascii_lowercase();
            let score = if id == q {
                3
            } else if name == q {
                2
            } else if name.contains(&q) || q.contains(&name) || id.contains(&q) {
                1
            } else {
                0
            };
            // Strictly-greater keeps the earliest registration on ties
            if score > 0 && best.map_or(true, |(s, _)| score > s) {
                best = Some((score, p));
            }
        }
        best.map(|(_, p)| p)
    }

    /// Protocols available on a chain, in registration order
    pub fn on_chain(&self, chain: Chain) -> Vec<&ProtocolConfig> {
        self.protocols
            .iter()
            .filter(|p| p.supports_chain(chain))
            .collect()
    }

    /// True if the two protocols share at least one chain. Bounding
    /// heuristic for exploration, not required to be precise.
    pub fn connected(&self, a: &str, b: &str) -> bool {
        self.adjacency.get(a).map_or(false, |set| set.contains(b))
    }

    pub fn len(&self) -> usize {
        self.protocols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.protocols.is_empty()
    }
}
