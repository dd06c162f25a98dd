//! Aggregation of source records into the combined index.

pub mod aggregator;
pub mod writer;

pub use aggregator::*;
