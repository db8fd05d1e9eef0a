//! Market module for Kalshi binary markets.
//!
//! This module handles:
//! - Market types and data structures
//! - Kalshi API client and the `MarketSource` abstraction
//! - Ticker resolution with event fallback
//! - Market summaries
//! - Mock client for testing

pub mod client;
pub mod discovery;
pub mod mock;
pub mod source;
pub mod summary;
pub mod types;

pub use client::KalshiClient;
pub use discovery::{event_ticker_candidates, normalize_ticker, resolve_ticker, Resolution};
pub use mock::{MockConfig, MockKalshiClient};
pub use source::MarketSource;
pub use summary::MarketSummary;
pub use types::{Event, Market, Outcome};
