//! Aggregation of fetched cytotoxicity data.

pub mod aggregator;

pub use aggregator::*;
