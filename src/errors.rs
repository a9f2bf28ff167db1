//! Typed errors for the ingestion boundary
//!
//! Malformed pool/price/gas data is rejected here and never reaches the
//! in-memory stores or the token graph.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("pool id is empty")]
    EmptyPoolId,

    #[error("pool {0}: token_a and token_b are the same address")]
    IdenticalTokens(String),

    #[error("pool {0}: zero token address")]
    ZeroTokenAddress(String),

    #[error("pool {0}: unknown protocol id '{1}'")]
    UnknownProtocol(String, String),

    #[error("pool {0}: fee {1} bps out of range (must be < 10000)")]
    FeeOutOfRange(String, u32),

    #[error("pool {0}: non-finite or negative {1}")]
    NonFiniteMetric(String, &'static str),

    #[error("price for {0}: must be finite and positive, got {1}")]
    InvalidPrice(String, f64),

    #[error("price for {0}: non-finite or negative {1}")]
    InvalidPriceMetric(String, &'static str),

    #[error("gas metrics for {0}: native token price must be finite and positive, got {1}")]
    InvalidGasMetrics(String, f64),
}
