//! Mock Kalshi client for unit testing.
//!
//! This module provides a mock client that can be used in tests
//! without making real network requests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::source::MarketSource;
use super::types::Market;
use crate::error::MarketError;
use crate::orderbook::{Orderbook, PriceLevel};

/// Configuration for mock client behavior.
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// Whether market lookups fail with a server error.
    pub fail_markets: bool,
    /// Whether order book requests fail with a server error.
    pub fail_orderbooks: bool,
    /// Event ticker whose search fails with a server error.
    pub fail_search_for: Option<String>,
}

/// Mock Kalshi client for testing.
#[derive(Debug, Clone, Default)]
pub struct MockKalshiClient {
    /// Mock configuration.
    config: MockConfig,
    /// Markets by ticker.
    markets: Arc<Mutex<HashMap<String, Market>>>,
    /// Order books by ticker.
    orderbooks: Arc<Mutex<HashMap<String, Orderbook>>>,
    /// Markets by event ticker, as the search endpoint lists them.
    events: Arc<Mutex<HashMap<String, Vec<Market>>>>,
}

impl MockKalshiClient {
    /// Create a new mock client with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock client with custom configuration.
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Add a market.
    pub fn add_market(&self, market: Market) {
        let mut markets = self.markets.lock().unwrap();
        markets.insert(market.ticker.clone(), market);
    }

    /// Set the order book for a market from `(price, quantity)` bids.
    pub fn set_orderbook(&self, ticker: &str, yes: &[(u32, u64)], no: &[(u32, u64)]) {
        let to_levels = |side: &[(u32, u64)]| -> Vec<PriceLevel> {
            side.iter().map(|&(p, q)| PriceLevel::new(p, q)).collect()
        };
        let book = Orderbook::new(ticker, to_levels(yes), to_levels(no));
        self.orderbooks.lock().unwrap().insert(ticker.to_string(), book);
    }

    /// Register the markets listed under an event.
    pub fn add_event_markets(&self, event_ticker: &str, markets: Vec<Market>) {
        let mut events = self.events.lock().unwrap();
        events.insert(event_ticker.to_string(), markets);
    }

    fn server_error(resource: String) -> MarketError {
        MarketError::FetchFailed {
            resource,
            reason: "HTTP 500 Internal Server Error".to_string(),
        }
    }
}

#[async_trait]
impl MarketSource for MockKalshiClient {
    async fn get_market(&self, ticker: &str) -> Result<Market, MarketError> {
        if self.config.fail_markets {
            return Err(Self::server_error(format!("/markets/{}", ticker)));
        }

        self.markets
            .lock()
            .unwrap()
            .get(ticker)
            .cloned()
            .ok_or_else(|| MarketError::NotFound {
                resource: format!("/markets/{}", ticker),
            })
    }

    async fn get_orderbook(&self, ticker: &str) -> Result<Orderbook, MarketError> {
        if self.config.fail_orderbooks {
            return Err(Self::server_error(format!("/markets/{}/orderbook", ticker)));
        }

        // Unconfigured markets have an empty book
        Ok(self
            .orderbooks
            .lock()
            .unwrap()
            .get(ticker)
            .cloned()
            .unwrap_or_else(|| Orderbook::new(ticker, Vec::new(), Vec::new())))
    }

    async fn search_markets(
        &self,
        event_ticker: Option<&str>,
        limit: u32,
        _status: &str,
    ) -> Result<Vec<Market>, MarketError> {
        if let (Some(event), Some(failing)) = (event_ticker, &self.config.fail_search_for) {
            if event == failing {
                return Err(Self::server_error("/markets".to_string()));
            }
        }

        let markets: Vec<Market> = match event_ticker {
            Some(event) => self
                .events
                .lock()
                .unwrap()
                .get(event)
                .cloned()
                .unwrap_or_default(),
            None => self.markets.lock().unwrap().values().cloned().collect(),
        };

        Ok(markets.into_iter().take(limit as usize).collect())
    }
}
