//! Analytics module
//!
//! Read-only views for dashboards/ops tooling plus the execution-outcome
//! log. None of this feeds back into routing or scoring.

pub mod gas;
pub mod liquidity;
pub mod performance;

pub use gas::{analyze_gas, GasAnalytics, GasTrend};
pub use liquidity::{analyze_liquidity, LiquidityAnalysis, ProtocolLiquidity, TokenLiquidity};
pub use performance::{ExecutionLog, RouteOutcomeSummary, RoutePerformanceReport};
