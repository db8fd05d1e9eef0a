//! Order book module for market depth.
//!
//! This module handles:
//! - Bid-only book types for binary contracts
//! - Reduction of depth to a top-of-book quote

pub mod types;

pub use types::{Orderbook, PriceLevel};
