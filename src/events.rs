//! Engine notification channel
//!
//! Typed broadcast of engine events with explicit subscriber lifecycle:
//! callers hold a `broadcast::Receiver` and drop it to unsubscribe. Events
//! are advisory — a `PoolChanged` never triggers an out-of-cycle recompute,
//! and losing events (lagged receiver, no subscribers) is harmless.

use crate::types::Chain;
use alloy::primitives::Address;
use tokio::sync::broadcast;

/// Events emitted by the engine
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A pool update touched this chain/pair. Advisory only.
    PoolChanged {
        chain: Chain,
        token_a: Address,
        token_b: Address,
        pool_id: String,
    },
    /// A per-chain precompute pass finished and its cache entry was swapped in
    CycleCompleted {
        chain: Chain,
        pairs_evaluated: usize,
        routes_cached: usize,
        elapsed_ms: u64,
    },
    /// A previously cached route no longer exists (pair dropped on rebuild,
    /// or its pool vanished during live re-pricing)
    RouteInvalidated { route_id: String },
}

/// Broadcast wrapper; cheap to clone, one channel per engine
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EngineEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.sender.subscribe()
    }

    /// Emit an event. Send errors (no live subscribers) are ignored.
    pub fn emit(&self, event: EngineEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(512)
    }
}
