//! Readable one-market summary.

use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use super::types::Market;
use crate::pricing::{estimate, ImpliedProbability};

/// The fields of a market an operator looks at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketSummary {
    /// Market ticker.
    pub ticker: String,
    /// Market title.
    pub title: Option<String>,
    /// Lifecycle status.
    pub status: Option<String>,
    /// Close time.
    pub closes: Option<String>,
    /// YES bid in cents.
    pub yes_bid: Option<u32>,
    /// YES ask in cents.
    pub yes_ask: Option<u32>,
    /// NO bid in cents.
    pub no_bid: Option<u32>,
    /// NO ask in cents.
    pub no_ask: Option<u32>,
    /// Midpoint P(YES), absent without a two-sided YES quote.
    pub implied_p_yes: Option<ImpliedProbability>,
    /// 24h volume.
    pub volume_24h: Option<i64>,
    /// Open interest.
    pub open_interest: Option<i64>,
    /// Liquidity in dollars.
    pub liquidity: Option<Decimal>,
}

impl MarketSummary {
    /// Extract the summary fields from an API market.
    pub fn from_market(market: &Market) -> Self {
        Self {
            ticker: market.ticker.clone(),
            title: market.title.clone(),
            status: market.status.clone(),
            closes: market.close_time.clone(),
            yes_bid: market.yes_bid,
            yes_ask: market.yes_ask,
            no_bid: market.no_bid,
            no_ask: market.no_ask,
            implied_p_yes: estimate(&market.quote()),
            volume_24h: market.volume_24h,
            open_interest: market.open_interest,
            liquidity: market.liquidity_dollars,
        }
    }

    /// `(label, value)` rows in display order.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        fn show<T: fmt::Display>(value: &Option<T>) -> String {
            value
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_else(|| "None".to_string())
        }

        vec![
            ("Ticker", self.ticker.clone()),
            ("Title", show(&self.title)),
            ("Status", show(&self.status)),
            ("Closes", show(&self.closes)),
            ("YES bid", show(&self.yes_bid)),
            ("YES ask", show(&self.yes_ask)),
            ("NO bid", show(&self.no_bid)),
            ("NO ask", show(&self.no_ask)),
            ("Implied P(YES)", show(&self.implied_p_yes)),
            ("24h Volume", show(&self.volume_24h)),
            ("Open Interest", show(&self.open_interest)),
            ("Liquidity ($)", show(&self.liquidity)),
        ]
    }
}

impl fmt::Display for MarketSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, value) in self.rows() {
            writeln!(f, "{:20}: {}", label, value)?;
        }
        Ok(())
    }
}
