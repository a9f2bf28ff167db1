//! Route execution performance tracking
//!
//! Records outcomes pushed back by the execution layer and aggregates them
//! into a report. Deliberately decoupled from scoring: a route's measured
//! performance never changes its cached scores.

use crate::types::RouteExecutionOutcome;
use dashmap::DashMap;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;

/// Outcomes retained per route id
const MAX_OUTCOMES_PER_ROUTE: usize = 50;

/// Concurrent outcome log; cheap to clone
#[derive(Debug, Default)]
pub struct ExecutionLog {
    outcomes: Arc<DashMap<String, VecDeque<RouteExecutionOutcome>>>,
}

impl Clone for ExecutionLog {
    fn clone(&self) -> Self {
        Self {
            outcomes: Arc::clone(&self.outcomes),
        }
    }
}

/// Per-route aggregate in the performance report
#[derive(Debug, Clone, Serialize)]
pub struct RouteOutcomeSummary {
    pub route_id: String,
    pub executions: usize,
    pub successes: usize,
    pub avg_slippage_percent: f64,
    pub avg_execution_time_ms: f64,
    pub mev_detections: usize,
}

/// Aggregate execution report across all recorded routes
#[derive(Debug, Clone, Serialize, Default)]
pub struct RoutePerformanceReport {
    pub total_executions: usize,
    pub successful_executions: usize,
    pub success_rate: f64,
    pub avg_slippage_percent: f64,
    pub avg_execution_time_ms: f64,
    pub mev_detections: usize,
    pub routes: Vec<RouteOutcomeSummary>,
}

impl ExecutionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one outcome, keeping the most recent
    /// `MAX_OUTCOMES_PER_ROUTE` per route
    pub fn record(&self, route_id: &str, outcome: RouteExecutionOutcome) {
        debug!(
            route_id,
            success = outcome.success,
            slippage = outcome.slippage_percent,
            "execution outcome recorded"
        );
        let mut entry = self.outcomes.entry(route_id.to_string()).or_default();
        if entry.len() == MAX_OUTCOMES_PER_ROUTE {
            entry.pop_front();
        }
        entry.push_back(outcome);
    }

    pub fn report(&self) -> RoutePerformanceReport {
        let mut report = RoutePerformanceReport::default();
        let mut slippage_sum = 0.0;
        let mut time_sum = 0.0;

        for entry in self.outcomes.iter() {
            let outcomes = entry.value();
            let successes = outcomes.iter().filter(|o| o.success).count();
            let mev = outcomes.iter().filter(|o| o.mev_detected).count();
            let route_slippage: f64 = outcomes.iter().map(|o| o.slippage_percent).sum();
            let route_time: f64 = outcomes.iter().map(|o| o.execution_time_ms as f64).sum();

            report.total_executions += outcomes.len();
            report.successful_executions += successes;
            report.mev_detections += mev;
            slippage_sum += route_slippage;
            time_sum += route_time;

            report.routes.push(RouteOutcomeSummary {
                route_id: entry.key().clone(),
                executions: outcomes.len(),
                successes,
                avg_slippage_percent: route_slippage / outcomes.len() as f64,
                avg_execution_time_ms: route_time / outcomes.len() as f64,
                mev_detections: mev,
            });
        }

        if report.total_executions > 0 {
            report.success_rate =
                report.successful_executions as f64 / report.total_executions as f64 * 100.0;
            report.avg_slippage_percent = slippage_sum / report.total_executions as f64;
            report.avg_execution_time_ms = time_sum / report.total_executions as f64;
        }

        // Stable ordering for consumers
        report.routes.sort_by(|a, b| a.route_id.cmp(&b.route_id));
        report
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}
