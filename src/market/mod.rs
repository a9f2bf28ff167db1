//! Market state module
//!
//! In-memory stores for pools, prices, and gas, the token-adjacency graph,
//! constant-product math, and ingest-boundary validation.

pub mod calculator;
pub mod gas;
pub mod graph;
pub mod pools;
pub mod prices;
pub mod validate;

pub use calculator::SwapCalculator;
pub use gas::GasBook;
pub use graph::TokenGraph;
pub use pools::PoolStore;
pub use prices::PriceBook;
