//! Market-related types for Kalshi binary markets.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::pricing::Quote;

/// Outcome of a binary market, in probability-vector order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Event resolves YES.
    #[strum(to_string = "YES", serialize = "yes")]
    #[default]
    Yes,
    /// Event resolves NO.
    #[strum(to_string = "NO", serialize = "no")]
    No,
}

impl Outcome {
    /// Both outcomes, YES first.
    pub const ALL: [Outcome; 2] = [Outcome::Yes, Outcome::No];

    /// Category index in a binary probability vector.
    pub fn index(&self) -> usize {
        match self {
            Outcome::Yes => 0,
            Outcome::No => 1,
        }
    }
}

/// A Kalshi market as returned by the trade API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Market {
    /// Market ticker (e.g., "KXGREENTERRITORY-29").
    pub ticker: String,
    /// Event this market belongs to.
    #[serde(default)]
    pub event_ticker: Option<String>,
    /// Market title.
    #[serde(default)]
    pub title: Option<String>,
    /// Lifecycle status (e.g., "active", "closed").
    #[serde(default)]
    pub status: Option<String>,
    /// Close time (ISO 8601).
    #[serde(default)]
    pub close_time: Option<String>,
    /// YES bid in cents.
    #[serde(default)]
    pub yes_bid: Option<u32>,
    /// YES ask in cents.
    #[serde(default)]
    pub yes_ask: Option<u32>,
    /// NO bid in cents.
    #[serde(default)]
    pub no_bid: Option<u32>,
    /// NO ask in cents.
    #[serde(default)]
    pub no_ask: Option<u32>,
    /// Last trade in cents.
    #[serde(default)]
    pub last_price: Option<u32>,
    /// Contracts traded in the last 24h.
    #[serde(default)]
    pub volume_24h: Option<i64>,
    /// Outstanding contracts.
    #[serde(default)]
    pub open_interest: Option<i64>,
    /// Resting liquidity in dollars.
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub liquidity_dollars: Option<Decimal>,
}

impl Market {
    /// Top-of-book quote carried on the market record.
    pub fn quote(&self) -> Quote {
        Quote::new(self.yes_bid, self.yes_ask).with_no_side(self.no_bid, self.no_ask)
    }
}

/// A Kalshi event grouping related markets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event ticker.
    pub event_ticker: String,
    /// Event title.
    #[serde(default)]
    pub title: Option<String>,
    /// Series the event belongs to.
    #[serde(default)]
    pub series_ticker: Option<String>,
    /// Category (e.g., "Politics").
    #[serde(default)]
    pub category: Option<String>,
}

/// `GET /markets/{ticker}` body: wrapped or bare.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum MarketEnvelope {
    Wrapped { market: Market },
    Bare(Market),
}

impl MarketEnvelope {
    pub(crate) fn into_market(self) -> Market {
        match self {
            MarketEnvelope::Wrapped { market } => market,
            MarketEnvelope::Bare(market) => market,
        }
    }
}

/// `GET /events/{event_ticker}` body: wrapped or bare.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum EventEnvelope {
    Wrapped {
        event: Event,
        #[serde(default)]
        markets: Vec<Market>,
    },
    Bare(Event),
}

impl EventEnvelope {
    pub(crate) fn into_parts(self) -> (Event, Vec<Market>) {
        match self {
            EventEnvelope::Wrapped { event, markets } => (event, markets),
            EventEnvelope::Bare(event) => (event, Vec::new()),
        }
    }
}

/// `GET /markets` body.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct MarketsResponse {
    #[serde(default)]
    pub markets: Vec<Market>,
}

/// `GET /markets/{ticker}/orderbook` body.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct OrderbookResponse {
    #[serde(default)]
    pub orderbook: Option<RawOrderbook>,
}

/// Both sides as `[price, quantity]` pairs.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawOrderbook {
    #[serde(default)]
    pub yes: Option<Vec<(u32, u64)>>,
    #[serde(default)]
    pub no: Option<Vec<(u32, u64)>>,
}
