//! Token adjacency graph
//!
//! Per-chain map from token to directly-swappable neighbor tokens, kept in
//! sync by pool ingestion. Discovery walks this graph; it is never rebuilt
//! from scratch, only extended per pool update.

use crate::types::Chain;
use alloy::primitives::Address;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;

/// Concurrent adjacency index; cheap to clone (shared map)
#[derive(Debug, Default)]
pub struct TokenGraph {
    edges: Arc<DashMap<(Chain, Address), HashSet<Address>>>,
}

impl Clone for TokenGraph {
    fn clone(&self) -> Self {
        Self {
            edges: Arc::clone(&self.edges),
        }
    }
}

impl TokenGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `a` and `b` are directly swappable on `chain`
    /// (both directions).
    pub fn connect(&self, chain: Chain, a: Address, b: Address) {
        if a == b {
            return;
        }
        self.edges.entry((chain, a)).or_default().insert(b);
        self.edges.entry((chain, b)).or_default().insert(a);
    }

    /// Direct neighbors of `token` on `chain`
    pub fn neighbors(&self, chain: Chain, token: Address) -> Vec<Address> {
        self.edges
            .get(&(chain, token))
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Number of direct counterparties — the connectivity signal used by
    /// neighbor ranking
    pub fn connectivity(&self, chain: Chain, token: Address) -> usize {
        self.edges.get(&(chain, token)).map(|set| set.len()).unwrap_or(0)
    }

    /// Tokens known on a chain
    pub fn tokens_on_chain(&self, chain: Chain) -> Vec<Address> {
        self.edges
            .iter()
            .filter(|entry| entry.key().0 == chain)
            .map(|entry| entry.key().1)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_is_bidirectional() {
        let graph = TokenGraph::new();
        let a = Address::repeat_byte(1);
        let b = Address::repeat_byte(2);

        graph.connect(Chain::Polygon, a, b);

        assert_eq!(graph.neighbors(Chain::Polygon, a), vec![b]);
        assert_eq!(graph.neighbors(Chain::Polygon, b), vec![a]);
        // Edge is chain-scoped
        assert!(graph.neighbors(Chain::Ethereum, a).is_empty());
    }

    #[test]
    fn test_self_edge_ignored() {
        let graph = TokenGraph::new();
        let a = Address::repeat_byte(1);
        graph.connect(Chain::Polygon, a, a);
        assert_eq!(graph.connectivity(Chain::Polygon, a), 0);
    }

    #[test]
    fn test_connectivity_counts_distinct_neighbors() {
        let graph = TokenGraph::new();
        let hub = Address::repeat_byte(1);
        for i in 2u8..6 {
            graph.connect(Chain::Polygon, hub, Address::repeat_byte(i));
        }
        // Duplicate edge does not inflate the count
        graph.connect(Chain::Polygon, hub, Address::repeat_byte(2));

        assert_eq!(graph.connectivity(Chain::Polygon, hub), 4);
        assert_eq!(graph.tokens_on_chain(Chain::Polygon).len(), 5);
    }
}
