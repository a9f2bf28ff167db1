//! Precomputation scheduler
//!
//! One owned background task drives the fixed-interval rebuild of the
//! opportunity cache. A cycle that is still running when the next tick fires
//! is skipped (logged), never queued. Each chain's pass runs inside its own
//! failure boundary: one chain aborting cannot take the others down, and the
//! chain's cache entry is only swapped in once its pass fully completes.

use crate::config::EngineConfig;
use crate::discovery::{priority_pairs, CandidatePath, RouteDiscovery};
use crate::events::{EngineEvent, EventBus};
use crate::market::{GasBook, PoolStore, PriceBook};
use crate::scoring::{RouteScorer, ScoreInputs};
use crate::types::{Chain, PrecomputedRoute};
use alloy::primitives::Address;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Monotone id source for precomputed routes
static ROUTE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Everything a precompute pass needs; shared with the engine facade
pub struct CycleContext {
    pub pools: PoolStore,
    pub prices: PriceBook,
    pub gas: GasBook,
    pub discovery: RouteDiscovery,
    pub scorer: RouteScorer,
    pub cache: crate::cache::OpportunityCache,
    pub events: EventBus,
    pub config: Arc<EngineConfig>,
}

/// Turn a discovered candidate into an immutable scored route
pub(crate) fn build_route(
    scorer: &RouteScorer,
    chain: Chain,
    token_in: Address,
    token_out: Address,
    candidate: &CandidatePath,
) -> PrecomputedRoute {
    let amount_in = candidate
        .steps
        .first()
        .map(|s| s.amount_in)
        .unwrap_or_default();
    let scores = scorer.score(&ScoreInputs {
        chain,
        token_in,
        token_out,
        amount_in,
        expected_output: candidate.expected_output,
        cumulative_impact_percent: candidate.cumulative_impact_percent,
        cumulative_gas: candidate.cumulative_gas,
        steps: &candidate.steps,
        weakest_liquidity_usd: candidate.weakest_liquidity_usd,
        age_minutes: 0.0,
    });

    let seq = ROUTE_SEQ.fetch_add(1, Ordering::Relaxed);
    PrecomputedRoute {
        id: format!("route-{chain}-{seq}"),
        token_in,
        token_out,
        chain,
        steps: candidate.steps.clone(),
        expected_output: candidate.expected_output,
        cumulative_impact_percent: candidate.cumulative_impact_percent,
        cumulative_gas: candidate.cumulative_gas,
        net_profit_percent: scores.net_profit_percent,
        profitability: scores.profitability,
        risk: scores.risk,
        confidence: scores.confidence,
        computed_at: Instant::now(),
    }
}

/// One full pass over every tracked chain
pub(crate) fn run_cycle(ctx: &CycleContext) {
    for chain in ctx.pools.chains() {
        let result = std::panic::catch_unwind(AssertUnwindSafe(|| run_chain_pass(ctx, chain)));
        match result {
            Ok((pairs_evaluated, routes_cached, elapsed_ms)) => {
                ctx.events.emit(EngineEvent::CycleCompleted {
                    chain,
                    pairs_evaluated,
                    routes_cached,
                    elapsed_ms,
                });
                debug!(
                    chain = %chain,
                    pairs_evaluated,
                    routes_cached,
                    elapsed_ms,
                    "precompute pass complete"
                );
            }
            Err(_) => {
                // The chain's old cache entry stays in place; other chains
                // proceed untouched
                error!(chain = %chain, "precompute pass panicked, keeping previous cache entry");
            }
        }
    }
}

/// Build and atomically publish one chain's route table.
/// Returns (pairs evaluated, routes cached, elapsed ms).
fn run_chain_pass(ctx: &CycleContext, chain: Chain) -> (usize, usize, u64) {
    let started = Instant::now();
    let pairs = priority_pairs(chain, &ctx.pools, &ctx.prices, &ctx.config);

    let mut fresh = crate::cache::ChainRoutes::new();
    for &(token_in, token_out) in &pairs {
        let candidates =
            ctx.discovery
                .find_candidates(chain, token_in, token_out, ctx.config.baseline_amount);
        let routes: Vec<Arc<PrecomputedRoute>> = candidates
            .iter()
            .map(|c| Arc::new(build_route(&ctx.scorer, chain, token_in, token_out, c)))
            .collect();
        fresh.insert_ranked(
            (token_in, token_out),
            routes,
            ctx.config.max_routes_per_pair,
        );
    }

    let pairs_evaluated = pairs.len();
    let routes_cached = fresh.route_count();
    let fresh_pairs: std::collections::HashSet<_> = fresh.pairs().copied().collect();

    let superseded = ctx.cache.replace_chain(chain, fresh);

    // Pairs that fell out of the rebuilt table are gone for good
    if let Some(old) = superseded {
        for pair in old.pairs() {
            if !fresh_pairs.contains(pair) {
                for route in old.get(pair).into_iter().flatten() {
                    ctx.events.emit(EngineEvent::RouteInvalidated {
                        route_id: route.id.clone(),
                    });
                }
            }
        }
    }

    (pairs_evaluated, routes_cached, started.elapsed().as_millis() as u64)
}

/// Owned background scheduler with explicit start/stop
pub struct Precomputer {
    ctx: Arc<CycleContext>,
    handle: Mutex<Option<JoinHandle<()>>>,
    in_cycle: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
}

impl Precomputer {
    pub fn new(ctx: Arc<CycleContext>, shutdown: Arc<AtomicBool>) -> Self {
        Self {
            ctx,
            handle: Mutex::new(None),
            in_cycle: Arc::new(AtomicBool::new(false)),
            shutdown,
        }
    }

    /// Spawn the interval-driven rebuild task. Calling start twice is a
    /// no-op while the first task is alive.
    pub fn start(&self) {
        let mut guard = self.handle.lock().expect("scheduler handle lock poisoned");
        if guard.is_some() {
            warn!("precompute scheduler already running");
            return;
        }

        let ctx = Arc::clone(&self.ctx);
        let in_cycle = Arc::clone(&self.in_cycle);
        let shutdown = Arc::clone(&self.shutdown);
        let interval = self.ctx.config.recompute_interval;

        *guard = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // Consume the immediate first tick; the first rebuild happens one
            // full interval after start
            ticker.tick().await;

            info!(interval_secs = interval.as_secs(), "precompute scheduler started");
            loop {
                ticker.tick().await;
                if shutdown.load(Ordering::SeqCst) {
                    break;
                }
                if in_cycle.swap(true, Ordering::SeqCst) {
                    warn!("previous precompute cycle still running, skipping tick");
                    continue;
                }
                let ctx = Arc::clone(&ctx);
                let in_cycle = Arc::clone(&in_cycle);
                tokio::task::spawn_blocking(move || {
                    run_cycle(&ctx);
                    in_cycle.store(false, Ordering::SeqCst);
                });
            }
            info!("precompute scheduler stopped");
        }));
    }

    /// Run one cycle synchronously (honoring the overlap guard).
    /// Used by callers that need a deterministic rebuild, e.g. at startup.
    pub fn run_cycle_now(&self) {
        if self.shutdown.load(Ordering::SeqCst) {
            return;
        }
        if self.in_cycle.swap(true, Ordering::SeqCst) {
            warn!("precompute cycle already in progress, skipping on-demand run");
            return;
        }
        run_cycle(&self.ctx);
        self.in_cycle.store(false, Ordering::SeqCst);
    }

    /// Stop the scheduler. Idempotent; pending work is abandoned, the cache
    /// keeps its last published tables.
    pub fn stop(&self) {
        if let Some(handle) = self
            .handle
            .lock()
            .expect("scheduler handle lock poisoned")
            .take()
        {
            handle.abort();
            info!("precompute scheduler shut down");
        }
    }
}

impl Drop for Precomputer {
    fn drop(&mut self) {
        self.stop();
    }
}
