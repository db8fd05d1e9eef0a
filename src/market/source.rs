//! Abstraction over where market data comes from.

use async_trait::async_trait;

use super::types::Market;
use crate::error::MarketError;
use crate::orderbook::Orderbook;

/// Read-only market data provider.
///
/// Implemented by the live [`KalshiClient`](super::KalshiClient) and by
/// [`MockKalshiClient`](super::MockKalshiClient) for tests.
#[async_trait]
pub trait MarketSource: Send + Sync {
    /// Fetch a single market by ticker.
    async fn get_market(&self, ticker: &str) -> Result<Market, MarketError>;

    /// Fetch the order book for a market.
    async fn get_orderbook(&self, ticker: &str) -> Result<Orderbook, MarketError>;

    /// List markets, optionally restricted to one event.
    async fn search_markets(
        &self,
        event_ticker: Option<&str>,
        limit: u32,
        status: &str,
    ) -> Result<Vec<Market>, MarketError>;
}
