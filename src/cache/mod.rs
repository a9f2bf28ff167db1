//! Opportunity cache module
//!
//! Bounded per-pair route cache with per-chain atomic replacement, plus the
//! background precomputation scheduler that rebuilds it.

pub mod scheduler;
pub mod store;

pub use scheduler::{CycleContext, Precomputer};
pub use store::{ChainRoutes, OpportunityCache};
