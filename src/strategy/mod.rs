//! Strategy: endo scoring and the inclusion filter.

pub mod filter;
pub mod scoring;

pub use filter::{FilterParams, FilterPolicy, Rejection};
pub use scoring::{Score, ScoringEngine};
