//! Route engine facade
//!
//! Composes the registry, market stores, discovery, scoring, the opportunity
//! cache, and the precompute scheduler behind one handle. Ingestion and
//! queries are synchronous and callable concurrently; only the precompute
//! cycle runs on a background task.
//!
//! Query semantics: cache reads are O(1) per pair; stale or out-of-band
//! routes are cache misses (None/empty), never errors; after shutdown every
//! query returns None/empty rather than failing.

use crate::analytics::{
    analyze_gas, analyze_liquidity, ExecutionLog, GasAnalytics, LiquidityAnalysis,
    RoutePerformanceReport,
};
use crate::cache::scheduler::{build_route, CycleContext, Precomputer};
use crate::cache::OpportunityCache;
use crate::config::EngineConfig;
use crate::discovery::RouteDiscovery;
use crate::errors::ValidationError;
use crate::events::{EngineEvent, EventBus};
use crate::market::{validate, GasBook, PoolStore, PriceBook, TokenGraph};
use crate::registry::ProtocolRegistry;
use crate::scoring::RouteScorer;
use crate::types::{
    Chain, GasMetrics, LiquidityPool, MarketPrice, PrecomputedRoute, ProtocolConfig,
    RouteExecutionOutcome,
};
use alloy::primitives::{Address, U256};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Cap on results returned by the arbitrage scans
const ARBITRAGE_SCAN_CAP: usize = 20;

/// Filters for the advanced arbitrage scan
#[derive(Debug, Clone)]
pub struct ArbitrageQuery {
    pub min_profit_percent: f64,
    pub max_risk: Option<f64>,
    pub min_confidence: Option<f64>,
    pub max_hops: Option<usize>,
    /// Restrict results to paths touching only these protocols
    pub protocols: Option<Vec<String>>,
}

impl Default for ArbitrageQuery {
    fn default() -> Self {
        Self {
            min_profit_percent: 0.0,
            max_risk: None,
            min_confidence: None,
            max_hops: None,
            protocols: None,
        }
    }
}

/// The multi-hop route discovery and opportunity caching engine
pub struct RouteEngine {
    ctx: Arc<CycleContext>,
    graph: TokenGraph,
    registry: Arc<ProtocolRegistry>,
    config: Arc<EngineConfig>,
    execution_log: ExecutionLog,
    scheduler: Precomputer,
    shutdown: Arc<AtomicBool>,
}

impl RouteEngine {
    pub fn new(protocols: Vec<ProtocolConfig>, config: EngineConfig) -> Self {
        let registry = Arc::new(ProtocolRegistry::new(protocols));
        let config = Arc::new(config);

        let pools = PoolStore::new();
        let graph = TokenGraph::new();
        let prices = PriceBook::new();
        let gas = GasBook::new();

        let discovery = RouteDiscovery::new(
            pools.clone(),
            graph.clone(),
            prices.clone(),
            gas.clone(),
            Arc::clone(&registry),
            Arc::clone(&config),
        );
        let scorer = RouteScorer::new(prices.clone(), gas.clone(), Arc::clone(&registry));

        let ctx = Arc::new(CycleContext {
            pools: pools.clone(),
            prices,
            gas,
            discovery,
            scorer,
            cache: OpportunityCache::new(),
            events: EventBus::default(),
            config: Arc::clone(&config),
        });

        let shutdown = Arc::new(AtomicBool::new(false));
        let scheduler = Precomputer::new(Arc::clone(&ctx), Arc::clone(&shutdown));

        info!(protocols = registry.len(), "route engine initialized");
        Self {
            ctx,
            graph,
            registry,
            config,
            execution_log: ExecutionLog::new(),
            scheduler,
            shutdown,
        }
    }

    /// Engine over the built-in protocol catalog and default config
    pub fn with_defaults() -> Self {
        Self::new(crate::registry::DEFAULT_PROTOCOLS.clone(), EngineConfig::default())
    }

    /// Start the background precompute scheduler. Requires a tokio runtime.
    pub fn start(&self) {
        self.scheduler.start();
    }

    /// Run one precompute cycle synchronously. Deterministic alternative to
    /// waiting for the scheduler, e.g. right after seeding pools.
    pub fn precompute_now(&self) {
        self.scheduler.run_cycle_now();
    }

    /// Subscribe to engine events. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.ctx.events.subscribe()
    }

    pub fn registry(&self) -> &ProtocolRegistry {
        &self.registry
    }

    // --- ingestion -------------------------------------------------------

    /// Store a pool snapshot and extend the token graph. The emitted
    /// `PoolChanged` is advisory and never triggers an immediate recompute.
    pub fn ingest_pool(&self, pool: LiquidityPool) -> Result<(), ValidationError> {
        validate::validate_pool(&pool, &self.registry)?;
        if self.is_shutdown() {
            debug!(pool = %pool.id, "engine shut down, dropping pool update");
            return Ok(());
        }

        self.graph.connect(pool.chain, pool.token_a, pool.token_b);
        self.ctx.events.emit(EngineEvent::PoolChanged {
            chain: pool.chain,
            token_a: pool.token_a,
            token_b: pool.token_b,
            pool_id: pool.id.clone(),
        });
        self.ctx.pools.upsert(pool);
        Ok(())
    }

    pub fn ingest_price(
        &self,
        chain: Chain,
        token: Address,
        price: MarketPrice,
    ) -> Result<(), ValidationError> {
        validate::validate_price(token, &price)?;
        if self.is_shutdown() {
            return Ok(());
        }
        self.ctx.prices.upsert(chain, token, price);
        Ok(())
    }

    pub fn ingest_gas(&self, chain: Chain, metrics: GasMetrics) -> Result<(), ValidationError> {
        validate::validate_gas(chain, &metrics)?;
        if self.is_shutdown() {
            return Ok(());
        }
        self.ctx.gas.upsert(chain, metrics);
        Ok(())
    }

    // --- cached queries --------------------------------------------------

    /// Best cached route for the pair: highest profitability among
    /// candidates passing the slippage/confidence/risk/age/amount filters.
    /// None when nothing qualifies — never an error.
    pub fn best_route(
        &self,
        chain: Chain,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
        max_slippage_percent: f64,
    ) -> Option<Arc<PrecomputedRoute>> {
        self.route_options(chain, token_in, token_out, amount_in, max_slippage_percent, 1)
            .into_iter()
            .next()
    }

    /// Up to `limit` qualifying cached routes, best first
    pub fn route_options(
        &self,
        chain: Chain,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
        max_slippage_percent: f64,
        limit: usize,
    ) -> Vec<Arc<PrecomputedRoute>> {
        if self.is_shutdown() {
            return Vec::new();
        }
        // Cached lists are already sorted descending by profitability
        self.ctx
            .cache
            .routes_for(chain, token_in, token_out)
            .into_iter()
            .filter(|r| self.route_qualifies(r, amount_in, max_slippage_percent))
            .take(limit)
            .collect()
    }

    /// Cross-venue scan: cached routes with at least 2 hops touching at
    /// least 2 distinct protocols, at or above `min_profit_percent` net
    /// profit. A heuristic for "crosses multiple venues", not verified
    /// round-trip arbitrage. Capped at 20, best first.
    pub fn arbitrage_opportunities(
        &self,
        chain: Chain,
        min_profit_percent: f64,
    ) -> Vec<Arc<PrecomputedRoute>> {
        self.advanced_arbitrage_opportunities(
            chain,
            &ArbitrageQuery {
                min_profit_percent,
                ..ArbitrageQuery::default()
            },
        )
    }

    /// Cross-venue scan with additional filters
    pub fn advanced_arbitrage_opportunities(
        &self,
        chain: Chain,
        query: &ArbitrageQuery,
    ) -> Vec<Arc<PrecomputedRoute>> {
        if self.is_shutdown() {
            return Vec::new();
        }
        let Some(snapshot) = self.ctx.cache.snapshot(chain) else {
            return Vec::new();
        };

        let max_age = self.config.max_route_age.as_secs();
        let mut hits: Vec<Arc<PrecomputedRoute>> = snapshot
            .iter_routes()
            .filter(|r| {
                r.hop_count() >= 2
                    && r.distinct_protocols() >= 2
                    && r.net_profit_percent >= query.min_profit_percent
                    && r.age_secs() <= max_age
                    && query.max_risk.map_or(true, |max| r.risk <= max)
                    && query.min_confidence.map_or(true, |min| r.confidence >= min)
                    && query.max_hops.map_or(true, |max| r.hop_count() <= max)
                    && query.protocols.as_ref().map_or(true, |allowed| {
                        r.steps.iter().all(|s| allowed.contains(&s.protocol_id))
                    })
            })
            .cloned()
            .collect();

        hits.sort_by(|a, b| {
            b.profitability
                .partial_cmp(&a.profitability)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(ARBITRAGE_SCAN_CAP);
        hits
    }

    // --- live-enriched queries -------------------------------------------

    /// Re-price the best cached candidate against current pool and gas
    /// state; falls back to on-demand discovery when the cache has nothing
    /// usable. The cached entry itself is never mutated.
    pub fn real_time_route(
        &self,
        chain: Chain,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Option<PrecomputedRoute> {
        if self.is_shutdown() || amount_in.is_zero() {
            return None;
        }

        for cached in self.ctx.cache.routes_for(chain, token_in, token_out) {
            if let Some(live) = self.reprice(&cached, amount_in) {
                return Some(live);
            }
        }

        // Nothing cached survives current state: discover on demand
        let mut fresh: Vec<PrecomputedRoute> = self
            .ctx
            .discovery
            .find_candidates(chain, token_in, token_out, amount_in)
            .iter()
            .map(|c| build_route(&self.ctx.scorer, chain, token_in, token_out, c))
            .collect();
        fresh.sort_by(|a, b| {
            b.profitability
                .partial_cmp(&a.profitability)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        fresh.into_iter().next()
    }

    /// Walk a cached route's pools at current reserves. None when any pool
    /// is gone or drained (the route id is flagged invalidated), or when the
    /// route was a synthetic fallback quote.
    fn reprice(&self, route: &PrecomputedRoute, amount_in: U256) -> Option<PrecomputedRoute> {
        let mut steps = Vec::with_capacity(route.steps.len());
        let mut amount = amount_in;
        let mut impact = 0.0;
        let mut gas = 0u64;
        let mut weakest = f64::MAX;

        for (i, cached_step) in route.steps.iter().enumerate() {
            // Synthetic quotes have no pool to re-read; re-discover instead
            if cached_step.pool_id.starts_with("virtual:") {
                return None;
            }
            let Some(pool) = self.ctx.pools.get(&cached_step.pool_id) else {
                self.ctx.events.emit(EngineEvent::RouteInvalidated {
                    route_id: route.id.clone(),
                });
                return None;
            };
            let step =
                self.ctx
                    .discovery
                    .step_through_pool(&pool, cached_step.token_in, amount, i == 0)?;
            amount = step.amount_out;
            impact += step.price_impact_percent;
            gas += step.gas_estimate;
            weakest = weakest.min(pool.liquidity_usd);
            steps.push(step);
        }

        let candidate = crate::discovery::CandidatePath {
            steps,
            expected_output: amount,
            cumulative_impact_percent: impact,
            cumulative_gas: gas,
            weakest_liquidity_usd: weakest,
        };
        let mut live = build_route(
            &self.ctx.scorer,
            route.chain,
            route.token_in,
            route.token_out,
            &candidate,
        );
        // Keep the cached id so callers can correlate with the cache entry
        live.id = route.id.clone();
        Some(live)
    }

    // --- analytics -------------------------------------------------------

    /// Record an execution outcome for reporting. Never feeds back into
    /// profitability scoring.
    pub fn record_execution_outcome(&self, route_id: &str, outcome: RouteExecutionOutcome) {
        if self.is_shutdown() {
            return;
        }
        self.execution_log.record(route_id, outcome);
    }

    pub fn liquidity_analysis(&self, chain: Chain) -> LiquidityAnalysis {
        if self.is_shutdown() {
            return analyze_liquidity(chain, &PoolStore::new());
        }
        analyze_liquidity(chain, &self.ctx.pools)
    }

    pub fn gas_analytics(&self, chain: Chain) -> Option<GasAnalytics> {
        if self.is_shutdown() {
            return None;
        }
        analyze_gas(chain, &self.ctx.gas)
    }

    pub fn route_performance_analytics(&self) -> RoutePerformanceReport {
        if self.is_shutdown() {
            return RoutePerformanceReport::default();
        }
        self.execution_log.report()
    }

    // --- lifecycle -------------------------------------------------------

    /// Stop the scheduler and flip the engine into its terminal state.
    /// Idempotent: repeated calls are no-ops, and every query afterwards
    /// returns None/empty.
    pub fn shutdown(&self) {
        if self.shutdown.swap(true, Ordering::SeqCst) {
            debug!("route engine already shut down");
            return;
        }
        self.scheduler.stop();
        info!("route engine shut down");
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    fn route_qualifies(
        &self,
        route: &PrecomputedRoute,
        amount_in: U256,
        max_slippage_percent: f64,
    ) -> bool {
        route.age_secs() <= self.config.max_route_age.as_secs()
            && route.cumulative_impact_percent <= max_slippage_percent
            && route.confidence >= self.config.min_confidence
            && route.risk <= self.config.max_risk
            && self
                .config
                .amount_within_band(route.baseline_amount(), amount_in)
    }
}

impl Drop for RouteEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn t(i: u8) -> Address {
        Address::repeat_byte(i)
    }

    fn wei(n: u64) -> U256 {
        U256::from(n) * U256::from(1_000_000_000_000_000_000u64)
    }

    fn create_test_pool(
        id: &str,
        protocol: &str,
        token_a: Address,
        token_b: Address,
        reserve_a: u128,
        reserve_b: u128,
    ) -> LiquidityPool {
        LiquidityPool {
            id: id.into(),
            protocol_id: protocol.into(),
            chain: Chain::Polygon,
            token_a,
            token_b,
            reserve_a: U256::from(reserve_a),
            reserve_b: U256::from(reserve_b),
            fee_bps: 30,
            liquidity_usd: 1_000_000.0,
            volume_24h_usd: 250_000.0,
            baseline_impact_percent: 0.1,
            last_updated: Instant::now(),
        }
    }

    const BIG: u128 = 1_000_000_000_000_000_000_000_000; // 1e24 = 1M units

    /// Engine with a profitable 2-hop cross-venue path (1 -> 2 -> 3) and a
    /// balanced direct pool (1 -> 3), precomputed once.
    fn seeded_engine() -> RouteEngine {
        let engine = RouteEngine::with_defaults();
        engine
            .ingest_pool(create_test_pool("ab", "uniswap_v2", t(1), t(2), BIG, BIG * 2))
            .unwrap();
        engine
            .ingest_pool(create_test_pool("bc", "sushiswap", t(2), t(3), BIG, BIG))
            .unwrap();
        engine
            .ingest_pool(create_test_pool("ac", "uniswap_v2", t(1), t(3), BIG, BIG))
            .unwrap();
        engine.precompute_now();
        engine
    }

    #[test]
    fn test_cached_routes_satisfy_invariants() {
        let engine = seeded_engine();
        let snapshot = engine.ctx.cache.snapshot(Chain::Polygon).unwrap();
        assert!(snapshot.route_count() > 0);

        for route in snapshot.iter_routes() {
            assert!((1..=3).contains(&route.hop_count()));
            let mut tokens = route.path_tokens();
            tokens.sort();
            let len = tokens.len();
            tokens.dedup();
            assert_eq!(tokens.len(), len, "route {} revisits a token", route.id);
            for score in [route.profitability, route.risk, route.confidence] {
                assert!((0.0..=100.0).contains(&score));
            }
        }

        for pair in snapshot.pairs() {
            let routes = snapshot.get(pair).unwrap();
            assert!(routes.len() <= 5);
            for pair_routes in routes.windows(2) {
                assert!(pair_routes[0].profitability >= pair_routes[1].profitability);
            }
        }
    }

    #[test]
    fn test_best_route_picks_profitable_path() {
        let engine = seeded_engine();
        let best = engine
            .best_route(Chain::Polygon, t(1), t(3), wei(1), 5.0)
            .expect("qualifying route");

        // The mispriced 2-hop path beats the balanced direct pool
        assert_eq!(best.hop_count(), 2);
        assert!(best.net_profit_percent > 50.0);
        assert!(best.risk <= 30.0);
        assert!(best.confidence >= 70.0);
    }

    #[test]
    fn test_best_route_none_on_filters() {
        let engine = seeded_engine();

        // Unknown pair
        assert!(engine
            .best_route(Chain::Polygon, t(7), t(8), wei(1), 5.0)
            .is_none());
        // Wrong chain
        assert!(engine
            .best_route(Chain::Ethereum, t(1), t(3), wei(1), 5.0)
            .is_none());
        // Impossible slippage bound
        assert!(engine
            .best_route(Chain::Polygon, t(1), t(3), wei(1), 0.0)
            .is_none());
        // Amount outside the 10x reuse band of the 1-unit baseline
        assert!(engine
            .best_route(Chain::Polygon, t(1), t(3), wei(100), 5.0)
            .is_none());
    }

    #[test]
    fn test_route_options_sorted_and_limited() {
        let engine = seeded_engine();
        let options = engine.route_options(Chain::Polygon, t(1), t(3), wei(1), 5.0, 10);
        assert!(!options.is_empty());
        for pair in options.windows(2) {
            assert!(pair[0].profitability >= pair[1].profitability);
        }

        let one = engine.route_options(Chain::Polygon, t(1), t(3), wei(1), 5.0, 1);
        assert_eq!(one.len(), 1);
    }

    #[test]
    fn test_arbitrage_classification() {
        let engine = seeded_engine();
        let opportunities = engine.arbitrage_opportunities(Chain::Polygon, 0.0);

        assert!(!opportunities.is_empty());
        for op in &opportunities {
            assert!(op.hop_count() >= 2);
            assert!(op.distinct_protocols() >= 2);
        }
        assert!(opportunities.len() <= 20);

        // A profit floor above the best path filters everything out
        assert!(engine
            .arbitrage_opportunities(Chain::Polygon, 500.0)
            .is_empty());
    }

    #[test]
    fn test_advanced_arbitrage_filters() {
        let engine = seeded_engine();

        let strict = engine.advanced_arbitrage_opportunities(
            Chain::Polygon,
            &ArbitrageQuery {
                min_profit_percent: 0.0,
                max_hops: Some(1),
                ..ArbitrageQuery::default()
            },
        );
        assert!(strict.is_empty());

        let allowlisted = engine.advanced_arbitrage_opportunities(
            Chain::Polygon,
            &ArbitrageQuery {
                min_profit_percent: 0.0,
                protocols: Some(vec!["uniswap_v2".into()]),
                ..ArbitrageQuery::default()
            },
        );
        // The cross-venue path needs sushiswap too
        assert!(allowlisted.is_empty());
    }

    #[test]
    fn test_real_time_route_reflects_new_reserves() {
        let engine = seeded_engine();
        let before = engine
            .real_time_route(Chain::Polygon, t(1), t(3), wei(1))
            .unwrap();

        // The edge on pool ab collapses: 2x becomes 1x
        engine
            .ingest_pool(create_test_pool("ab", "uniswap_v2", t(1), t(2), BIG, BIG))
            .unwrap();
        let after = engine
            .real_time_route(Chain::Polygon, t(1), t(3), wei(1))
            .unwrap();
        assert!(after.expected_output < before.expected_output);

        // The cache itself is untouched until the next cycle
        let cached = engine.best_route(Chain::Polygon, t(1), t(3), wei(1), 5.0).unwrap();
        assert!(cached.net_profit_percent > 50.0);
    }

    #[test]
    fn test_real_time_route_discovers_when_cache_empty() {
        let engine = RouteEngine::with_defaults();
        engine
            .ingest_pool(create_test_pool("ac", "uniswap_v2", t(1), t(3), BIG, BIG * 2))
            .unwrap();
        // No precompute ran; the live query discovers on demand
        let live = engine.real_time_route(Chain::Polygon, t(1), t(3), wei(1));
        assert!(live.is_some());
        assert_eq!(live.unwrap().hop_count(), 1);
    }

    #[test]
    fn test_stale_routes_are_cache_misses() {
        let mut config = EngineConfig::default();
        config.max_route_age = Duration::from_secs(0);
        let engine = RouteEngine::new(crate::registry::DEFAULT_PROTOCOLS.clone(), config);
        engine
            .ingest_pool(create_test_pool("ab", "uniswap_v2", t(1), t(2), BIG, BIG * 2))
            .unwrap();
        engine
            .ingest_pool(create_test_pool("bc", "sushiswap", t(2), t(3), BIG, BIG))
            .unwrap();
        engine.precompute_now();

        std::thread::sleep(Duration::from_millis(1_100));
        assert!(engine
            .best_route(Chain::Polygon, t(1), t(3), wei(1), 5.0)
            .is_none());
        assert!(engine.arbitrage_opportunities(Chain::Polygon, 0.0).is_empty());
    }

    #[test]
    fn test_pool_changed_event_is_advisory() {
        let engine = RouteEngine::with_defaults();
        let mut rx = engine.subscribe();

        engine
            .ingest_pool(create_test_pool("ab", "uniswap_v2", t(1), t(2), BIG, BIG))
            .unwrap();

        match rx.try_recv().unwrap() {
            EngineEvent::PoolChanged {
                chain,
                pool_id,
                token_a,
                token_b,
            } => {
                assert_eq!(chain, Chain::Polygon);
                assert_eq!(pool_id, "ab");
                assert_eq!((token_a, token_b), (t(1), t(2)));
            }
            other => panic!("unexpected event: {:?}", other),
        }
        // No recompute was triggered by the update
        assert!(engine.ctx.cache.snapshot(Chain::Polygon).is_none());
    }

    #[test]
    fn test_cycle_completed_event() {
        let engine = seeded_engine();
        let mut rx = engine.subscribe();
        engine.precompute_now();

        let mut saw_cycle = false;
        while let Ok(event) = rx.try_recv() {
            if let EngineEvent::CycleCompleted {
                chain,
                pairs_evaluated,
                routes_cached,
                ..
            } = event
            {
                assert_eq!(chain, Chain::Polygon);
                assert!(pairs_evaluated > 0);
                assert!(routes_cached > 0);
                saw_cycle = true;
            }
        }
        assert!(saw_cycle);
    }

    #[test]
    fn test_malformed_ingest_rejected() {
        let engine = RouteEngine::with_defaults();

        let same_tokens = create_test_pool("p", "uniswap_v2", t(1), t(1), 1, 1);
        assert!(engine.ingest_pool(same_tokens).is_err());

        assert!(engine
            .ingest_price(Chain::Polygon, t(1), MarketPrice::new(f64::NAN))
            .is_err());

        let bad_gas = GasMetrics {
            gas_price_wei: U256::from(1u64),
            native_token_usd: -1.0,
            updated: Instant::now(),
        };
        assert!(engine.ingest_gas(Chain::Polygon, bad_gas).is_err());

        // Nothing leaked into the stores
        assert!(engine.ctx.pools.is_empty());
        assert!(engine.ctx.prices.is_empty());
    }

    #[test]
    fn test_concurrent_ingest_during_precompute() {
        let engine = Arc::new(seeded_engine());

        let writer = {
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || {
                for i in 0..200u128 {
                    engine
                        .ingest_pool(create_test_pool(
                            "ab",
                            "uniswap_v2",
                            t(1),
                            t(2),
                            BIG + i,
                            BIG * 2 + i,
                        ))
                        .unwrap();
                }
            })
        };
        let rebuilder = {
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || {
                for _ in 0..5 {
                    engine.precompute_now();
                }
            })
        };

        writer.join().unwrap();
        rebuilder.join().unwrap();

        // Readers only ever see a fully built table
        let snapshot = engine.ctx.cache.snapshot(Chain::Polygon).unwrap();
        for pair in snapshot.pairs() {
            assert!(snapshot.get(pair).unwrap().len() <= 5);
        }
        assert!(engine
            .best_route(Chain::Polygon, t(1), t(3), wei(1), 5.0)
            .is_some());
    }

    #[test]
    fn test_analytics_views() {
        let engine = seeded_engine();
        engine
            .ingest_gas(
                Chain::Polygon,
                GasMetrics {
                    gas_price_wei: U256::from(30_000_000_000u64),
                    native_token_usd: 0.5,
                    updated: Instant::now(),
                },
            )
            .unwrap();

        let liquidity = engine.liquidity_analysis(Chain::Polygon);
        assert_eq!(liquidity.pool_count, 3);
        assert_eq!(liquidity.total_liquidity_usd, 3_000_000.0);

        let gas = engine.gas_analytics(Chain::Polygon).unwrap();
        assert_eq!(gas.samples, 1);

        engine.record_execution_outcome(
            "route-x",
            RouteExecutionOutcome {
                success: true,
                actual_output: "990".into(),
                expected_output: "1000".into(),
                slippage_percent: 1.0,
                execution_time_ms: 80,
                gas_used: 210_000,
                mev_detected: false,
                recorded_at: chrono::Utc::now(),
            },
        );
        let report = engine.route_performance_analytics();
        assert_eq!(report.total_executions, 1);
        assert_eq!(report.success_rate, 100.0);
    }

    #[tokio::test]
    async fn test_shutdown_is_idempotent_and_queries_go_quiet() {
        let engine = seeded_engine();
        engine.start();

        assert!(engine
            .best_route(Chain::Polygon, t(1), t(3), wei(1), 5.0)
            .is_some());

        engine.shutdown();
        engine.shutdown(); // second call must not panic

        assert!(engine.is_shutdown());
        assert!(engine
            .best_route(Chain::Polygon, t(1), t(3), wei(1), 5.0)
            .is_none());
        assert!(engine.arbitrage_opportunities(Chain::Polygon, 0.0).is_empty());
        assert!(engine
            .real_time_route(Chain::Polygon, t(1), t(3), wei(1))
            .is_none());
        assert!(engine.gas_analytics(Chain::Polygon).is_none());
        assert_eq!(engine.route_performance_analytics().total_executions, 0);
        assert_eq!(engine.liquidity_analysis(Chain::Polygon).pool_count, 0);

        // Ingestion after shutdown is dropped silently, not an error
        assert!(engine
            .ingest_pool(create_test_pool("zz", "uniswap_v2", t(8), t(9), 1, 1))
            .is_ok());
    }

    #[tokio::test]
    async fn test_start_twice_is_harmless() {
        let engine = RouteEngine::with_defaults();
        engine.start();
        engine.start();
        engine.shutdown();
    }
}
