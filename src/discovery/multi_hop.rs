//! Multi-hop route discovery
//!
//! Breadth-first search over the token graph, 2-3 hops. A path never
//! revisits a token; branching is capped at the top neighbors by a composite
//! routing score. Completed paths are pruned when cumulative impact exceeds
//! the cap or the path is unprofitable net of gas at baseline prices.

use super::{CandidatePath, RouteDiscovery};
use crate::market::calculator::u256_to_f64;
use crate::types::{Chain, RouteStep};
use alloy::primitives::{Address, U256};
use std::collections::{HashMap, VecDeque};
use tracing::trace;

/// Routing-score bonus for tokens with a live price feed
const PRICE_FEED_BONUS: f64 = 10.0;

/// Per-token aggregates snapshotted once per search
struct TokenStats {
    liquidity_usd: HashMap<Address, f64>,
    volume_usd: HashMap<Address, f64>,
}

impl TokenStats {
    fn collect(discovery: &RouteDiscovery, chain: Chain) -> Self {
        let mut liquidity_usd: HashMap<Address, f64> = HashMap::new();
        let mut volume_usd: HashMap<Address, f64> = HashMap::new();
        for pool in discovery.pools.pools_on_chain(chain) {
            for token in [pool.token_a, pool.token_b] {
                *liquidity_usd.entry(token).or_default() += pool.liquidity_usd;
                *volume_usd.entry(token).or_default() += pool.volume_24h_usd;
            }
        }
        Self {
            liquidity_usd,
            volume_usd,
        }
    }
}

/// One frontier entry of the search
struct SearchNode {
    token: Address,
    steps: Vec<RouteStep>,
    amount: U256,
    impact_percent: f64,
    gas: u64,
    weakest_liquidity_usd: f64,
    visited: Vec<Address>,
}

impl RouteDiscovery {
    pub(crate) fn multi_hop_candidates(
        &self,
        chain: Chain,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Vec<CandidatePath> {
        let stats = TokenStats::collect(self, chain);
        let mut results = Vec::new();

        let mut queue = VecDeque::new();
        queue.push_back(SearchNode {
            token: token_in,
            steps: Vec::new(),
            amount: amount_in,
            impact_percent: 0.0,
            gas: 0,
            weakest_liquidity_usd: f64::MAX,
            visited: vec![token_in],
        });

        while let Some(node) = queue.pop_front() {
            if node.steps.len() >= self.config.max_hops {
                continue;
            }

            let mut neighbors: Vec<Address> = self
                .graph
                .neighbors(chain, node.token)
                .into_iter()
                .filter(|n| !node.visited.contains(n))
                .collect();
            neighbors.sort_by(|a, b| {
                self.routing_score(chain, *b, &stats)
                    .partial_cmp(&self.routing_score(chain, *a, &stats))
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            neighbors.truncate(self.config.branch_limit);

            for next in neighbors {
                let is_first_hop = node.steps.is_empty();

                if next == token_out {
                    // Direct hops are covered by direct discovery; a
                    // multi-hop path needs at least one intermediate
                    if is_first_hop {
                        continue;
                    }
                    if let Some(candidate) = self.complete_path(chain, &node, next) {
                        results.push(candidate);
                    }
                    continue;
                }

                // Extending through another intermediate must still leave
                // room for the final hop to token_out
                if node.steps.len() + 1 >= self.config.max_hops {
                    continue;
                }

                let Some((step, liquidity)) =
                    self.best_hop(chain, node.token, next, node.amount, is_first_hop)
                else {
                    continue;
                };

                let mut visited = node.visited.clone();
                visited.push(next);
                let mut steps = node.steps.clone();
                let impact = node.impact_percent + step.price_impact_percent;
                let gas = node.gas + step.gas_estimate;
                let amount = step.amount_out;
                let weakest = node.weakest_liquidity_usd.min(liquidity);
                steps.push(step);

                queue.push_back(SearchNode {
                    token: next,
                    steps,
                    amount,
                    impact_percent: impact,
                    gas,
                    weakest_liquidity_usd: weakest,
                    visited,
                });
            }
        }

        results
    }

    /// Attach the final hop and apply the completion prunes
    fn complete_path(
        &self,
        chain: Chain,
        node: &SearchNode,
        token_out: Address,
    ) -> Option<CandidatePath> {
        let (step, liquidity) = self.best_hop(chain, node.token, token_out, node.amount, false)?;

        let impact = node.impact_percent + step.price_impact_percent;
        if impact > self.config.max_cumulative_impact_percent {
            trace!(impact, "multi-hop path pruned: cumulative impact");
            return None;
        }

        let gas = node.gas + step.gas_estimate;
        let expected_output = step.amount_out;
        let token_in = node.visited[0];
        let amount_in = node
            .steps
            .first()
            .map(|s| s.amount_in)
            .unwrap_or(node.amount);

        if !self.profitable_net_of_gas(chain, token_in, amount_in, token_out, expected_output, gas)
        {
            trace!("multi-hop path pruned: unprofitable net of gas");
            return None;
        }

        let mut steps = node.steps.clone();
        let weakest = node.weakest_liquidity_usd.min(liquidity);
        steps.push(step);

        Some(CandidatePath {
            steps,
            expected_output,
            cumulative_impact_percent: impact,
            cumulative_gas: gas,
            weakest_liquidity_usd: weakest,
        })
    }

    /// Best pool for one hop: highest output among qualifying pools.
    /// Returns the step and the chosen pool's liquidity.
    fn best_hop(
        &self,
        chain: Chain,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
        is_first_hop: bool,
    ) -> Option<(RouteStep, f64)> {
        let mut best: Option<(RouteStep, f64)> = None;
        for pool in self.pools.pools_for_pair(chain, token_in, token_out) {
            if !self.meets_liquidity_floor(&pool) {
                continue;
            }
            let Some(step) = self.step_through_pool(&pool, token_in, amount_in, is_first_hop)
            else {
                continue;
            };
            if best
                .as_ref()
                .map_or(true, |(b, _)| step.amount_out > b.amount_out)
            {
                best = Some((step, pool.liquidity_usd));
            }
        }
        best
    }

    /// Composite neighbor-ranking score:
    /// log(liquidity) + log(volume) + connectivity + price-feed bonus
    fn routing_score(&self, chain: Chain, token: Address, stats: &TokenStats) -> f64 {
        let liquidity = stats.liquidity_usd.get(&token).copied().unwrap_or(0.0);
        let volume = stats.volume_usd.get(&token).copied().unwrap_or(0.0);
        let mut score = (1.0 + liquidity).ln() + (1.0 + volume).ln();
        score += self.graph.connectivity(chain, token) as f64;
        if self.prices.has_price(chain, token) {
            score += PRICE_FEED_BONUS;
        }
        score
    }

    /// Baseline-price profitability gate for completed multi-hop paths
    fn profitable_net_of_gas(
        &self,
        chain: Chain,
        token_in: Address,
        amount_in: U256,
        token_out: Address,
        amount_out: U256,
        gas_units: u64,
    ) -> bool {
        let input_value =
            u256_to_f64(amount_in) / 1e18 * self.prices.usd_or_default(chain, token_in);
        let output_value =
            u256_to_f64(amount_out) / 1e18 * self.prices.usd_or_default(chain, token_out);
        let gas_cost = gas_units as f64 * u256_to_f64(self.gas.gas_price_or_zero(chain)) / 1e18
            * self.gas.native_usd_or_default(chain);

        output_value - input_value - gas_cost > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::super::testutil::{discovery_over, pool};
    use super::*;

    fn t(i: u8) -> Address {
        Address::repeat_byte(i)
    }

    fn wei(n: u64) -> U256 {
        U256::from(n) * U256::from(1_000_000_000_000_000_000u64)
    }

    /// Two mispriced pools: A->B at ~2x, B->C at ~1x, so A->C via B roughly
    /// doubles the input and clears the profitability gate.
    fn profitable_two_hop() -> crate::discovery::RouteDiscovery {
        let big = 1_000_000_000_000_000_000_000_000u128; // 1e24 = 1M units
        discovery_over(vec![
            pool("ab", Chain::Polygon, "uniswap_v2", t(1), t(2), big, big * 2),
            pool("bc", Chain::Polygon, "sushiswap", t(2), t(3), big, big),
        ])
    }

    #[test]
    fn test_two_hop_path_found() {
        let discovery = profitable_two_hop();
        let candidates = discovery.multi_hop_candidates(Chain::Polygon, t(1), t(3), wei(1));

        assert_eq!(candidates.len(), 1);
        let c = &candidates[0];
        assert_eq!(c.steps.len(), 2);
        assert_eq!(c.steps[0].pool_id, "ab");
        assert_eq!(c.steps[1].pool_id, "bc");
        // ~2x output minus two 30 bps fees
        assert!(c.expected_output > wei(1) * U256::from(19u64) / U256::from(10u64));
        // Amounts chain through the path
        assert_eq!(c.steps[1].amount_in, c.steps[0].amount_out);
        assert_eq!(c.expected_output, c.steps[1].amount_out);
    }

    #[test]
    fn test_no_token_revisit() {
        // A-B, B-C, C-A triangle: no path A..->A and no revisiting B
        let big = 1_000_000_000_000_000_000_000_000u128;
        let discovery = discovery_over(vec![
            pool("ab", Chain::Polygon, "uniswap_v2", t(1), t(2), big, big * 2),
            pool("bc", Chain::Polygon, "sushiswap", t(2), t(3), big, big * 2),
            pool("ca", Chain::Polygon, "uniswap_v2", t(3), t(1), big, big * 2),
        ]);

        let candidates = discovery.multi_hop_candidates(Chain::Polygon, t(1), t(3), wei(1));
        for c in &candidates {
            let mut tokens = vec![c.steps[0].token_in];
            tokens.extend(c.steps.iter().map(|s| s.token_out));
            let mut deduped = tokens.clone();
            deduped.sort();
            deduped.dedup();
            assert_eq!(deduped.len(), tokens.len(), "path revisits a token");
        }
    }

    #[test]
    fn test_hop_cap_respected() {
        // Chain A-B-C-D-E requires 4 hops to reach E: none returned
        let big = 1_000_000_000_000_000_000_000_000u128;
        let discovery = discovery_over(vec![
            pool("ab", Chain::Polygon, "uniswap_v2", t(1), t(2), big, big * 2),
            pool("bc", Chain::Polygon, "uniswap_v2", t(2), t(3), big, big * 2),
            pool("cd", Chain::Polygon, "uniswap_v2", t(3), t(4), big, big * 2),
            pool("de", Chain::Polygon, "uniswap_v2", t(4), t(5), big, big * 2),
        ]);

        assert!(discovery
            .multi_hop_candidates(Chain::Polygon, t(1), t(5), wei(1))
            .is_empty());

        // D is reachable in exactly 3 hops
        let three = discovery.multi_hop_candidates(Chain::Polygon, t(1), t(4), wei(1));
        assert_eq!(three.len(), 1);
        assert_eq!(three[0].steps.len(), 3);
    }

    #[test]
    fn test_unprofitable_path_pruned() {
        // Balanced pools: fees guarantee a small loss at equal baseline prices
        let big = 1_000_000_000_000_000_000_000_000u128;
        let discovery = discovery_over(vec![
            pool("ab", Chain::Polygon, "uniswap_v2", t(1), t(2), big, big),
            pool("bc", Chain::Polygon, "sushiswap", t(2), t(3), big, big),
        ]);

        assert!(discovery
            .multi_hop_candidates(Chain::Polygon, t(1), t(3), wei(1))
            .is_empty());
    }

    #[test]
    fn test_high_impact_path_pruned() {
        // Tiny reserves relative to trade size: impact far above 5%
        let discovery = discovery_over(vec![
            pool("ab", Chain::Polygon, "uniswap_v2", t(1), t(2), 10_000, 40_000),
            pool("bc", Chain::Polygon, "sushiswap", t(2), t(3), 10_000, 40_000),
        ]);

        assert!(discovery
            .multi_hop_candidates(Chain::Polygon, t(1), t(3), U256::from(5_000u64))
            .is_empty());
    }

    #[test]
    fn test_best_pool_chosen_per_hop() {
        let big = 1_000_000_000_000_000_000_000_000u128;
        let discovery = discovery_over(vec![
            pool("ab_weak", Chain::Polygon, "uniswap_v2", t(1), t(2), big, big * 2),
            pool("ab_strong", Chain::Polygon, "sushiswap", t(1), t(2), big, big * 3),
            pool("bc", Chain::Polygon, "uniswap_v2", t(2), t(3), big, big),
        ]);

        let candidates = discovery.multi_hop_candidates(Chain::Polygon, t(1), t(3), wei(1));
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].steps[0].pool_id, "ab_strong");
    }
}
