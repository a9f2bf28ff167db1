//! Multi-hop swap route discovery and opportunity caching.
//!
//! The engine ingests pool reserve snapshots, token prices, and gas
//! conditions, precomputes ranked swap routes (1 to 3 hops) for the most
//! liquid pairs on a fixed cycle, and answers route queries from a per-chain
//! cache in O(1) per pair. Stale data degrades answers, it never blocks them.
//!
//! ```no_run
//! use route_engine::RouteEngine;
//!
//! # async fn run() {
//! let engine = RouteEngine::with_defaults();
//! engine.start();
//! // feed pools/prices/gas, then query best_route / arbitrage_opportunities
//! # }
//! ```

pub mod analytics;
pub mod cache;
pub mod config;
pub mod discovery;
pub mod engine;
pub mod errors;
pub mod events;
pub mod market;
pub mod registry;
pub mod scoring;
pub mod types;

pub use config::EngineConfig;
pub use engine::{ArbitrageQuery, RouteEngine};
pub use errors::ValidationError;
pub use events::EngineEvent;
pub use registry::{ProtocolRegistry, DEFAULT_PROTOCOLS};
pub use types::{
    Chain, GasMetrics, LiquidityPool, MarketPrice, PrecomputedRoute, ProtocolConfig,
    ProtocolKind, RouteExecutionOutcome, RouteStep,
};

/// Install a global tracing subscriber honoring `RUST_LOG`. Call once from
/// the host process; fails if a subscriber is already set.
pub fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}
