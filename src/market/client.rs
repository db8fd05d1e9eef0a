//! Kalshi trade API client (public market data endpoints).

use std::time::{Duration, Instant};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::source::MarketSource;
use super::types::{
    Event, EventEnvelope, Market, MarketEnvelope, MarketsResponse, OrderbookResponse,
};
use crate::config::Config;
use crate::error::MarketError;
use crate::metrics;
use crate::orderbook::{Orderbook, PriceLevel};

/// Characters allowed in a ticker placed in a URL path.
static TICKER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("valid regex"));

/// Kalshi trade API client.
#[derive(Debug, Clone)]
pub struct KalshiClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// Base URL, without trailing slash.
    base_url: String,
}

impl KalshiClient {
    /// Create a client from config.
    pub fn new(config: &Config) -> Result<Self, MarketError> {
        Self::with_base_url(
            config.api_base(),
            Duration::from_secs(config.http_timeout_secs),
        )
    }

    /// Create a client against an explicit base URL.
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, MarketError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get the API base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Reject tickers that would escape their path segment.
    fn validate_ticker(ticker: &str) -> Result<&str, MarketError> {
        if TICKER_PATTERN.is_match(ticker) {
            Ok(ticker)
        } else {
            Err(MarketError::InvalidTicker(ticker.to_string()))
        }
    }

    /// GET `path` and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, MarketError> {
        let url = format!("{}{}", self.base_url, path);
        let start = Instant::now();

        let response = self.http.get(&url).query(query).send().await?;
        metrics::record_http_latency(start, path);

        let status = response.status();
        debug!(path = %path, status = %status, "Kalshi API response");

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(MarketError::NotFound {
                resource: path.to_string(),
            });
        }

        if !status.is_success() {
            return Err(MarketError::FetchFailed {
                resource: path.to_string(),
                reason: format!("HTTP {}", status),
            });
        }

        response
            .json()
            .await
            .map_err(|e| MarketError::ParseError(format!("{}: {}", path, e)))
    }

    /// Get a single market.
    #[instrument(skip(self))]
    pub async fn get_market(&self, ticker: &str) -> Result<Market, MarketError> {
        let ticker = Self::validate_ticker(ticker)?;
        let envelope: MarketEnvelope = self.get_json(&format!("/markets/{}", ticker), &[]).await?;
        metrics::inc_markets_fetched(1);
        Ok(envelope.into_market())
    }

    /// Get an event and the markets nested in its response.
    #[instrument(skip(self))]
    pub async fn get_event(&self, event_ticker: &str) -> Result<(Event, Vec<Market>), MarketError> {
        let event_ticker = Self::validate_ticker(event_ticker)?;
        let envelope: EventEnvelope = self
            .get_json(&format!("/events/{}", event_ticker), &[])
            .await?;

        let (event, markets) = envelope.into_parts();
        metrics::inc_markets_fetched(markets.len() as u64);
        Ok((event, markets))
    }

    /// Get the markets belonging to an event.
    pub async fn get_event_markets(&self, event_ticker: &str) -> Result<Vec<Market>, MarketError> {
        self.get_event(event_ticker).await.map(|(_, markets)| markets)
    }

    /// Get the order book for a market.
    #[instrument(skip(self))]
    pub async fn get_orderbook(&self, ticker: &str) -> Result<Orderbook, MarketError> {
        let ticker = Self::validate_ticker(ticker)?;
        let response: OrderbookResponse = self
            .get_json(&format!("/markets/{}/orderbook", ticker), &[])
            .await?;

        let raw = response.orderbook.unwrap_or_default();
        let to_levels = |side: Option<Vec<(u32, u64)>>| -> Vec<PriceLevel> {
            side.unwrap_or_default()
                .into_iter()
                .map(|(price, quantity)| PriceLevel::new(price, quantity))
                .collect()
        };

        Ok(Orderbook::new(ticker, to_levels(raw.yes), to_levels(raw.no)))
    }

    /// List markets, optionally filtered by event ticker.
    #[instrument(skip(self))]
    pub async fn search_markets(
        &self,
        event_ticker: Option<&str>,
        limit: u32,
        status: &str,
    ) -> Result<Vec<Market>, MarketError> {
        let mut query = vec![("limit", limit.to_string()), ("status", status.to_string())];
        if let Some(event_ticker) = event_ticker {
            query.push(("event_ticker", event_ticker.to_string()));
        }

        let response: MarketsResponse = self.get_json("/markets", &query).await?;
        metrics::inc_markets_fetched(response.markets.len() as u64);
        Ok(response.markets)
    }
}

#[async_trait]
impl MarketSource for KalshiClient {
    async fn get_market(&self, ticker: &str) -> Result<Market, MarketError> {
        KalshiClient::get_market(self, ticker).await
    }

    async fn get_orderbook(&self, ticker: &str) -> Result<Orderbook, MarketError> {
        KalshiClient::get_orderbook(self, ticker).await
    }

    async fn search_markets(
        &self,
        event_ticker: Option<&str>,
        limit: u32,
        status: &str,
    ) -> Result<Vec<Market>, MarketError> {
        KalshiClient::search_markets(self, event_ticker, limit, status).await
    }
}
