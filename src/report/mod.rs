//! Run reporting.

pub mod generator;

pub use generator::*;
