//! Two-sided quote for a binary contract.

use serde::{Deserialize, Serialize};

/// Price points per unit payout (prices are cents of $1).
pub const PRICE_SCALE: u32 = 100;

/// Best bid/ask for the YES side, with optional NO companion prices.
///
/// Prices are integer points on `0..=PRICE_SCALE`. A crossed book
/// (`best_bid > best_ask`) is representable; see [`Quote::is_crossed`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Best YES bid.
    pub best_bid: Option<u32>,
    /// Best YES ask.
    pub best_ask: Option<u32>,
    /// Best NO bid.
    pub no_bid: Option<u32>,
    /// Best NO ask.
    pub no_ask: Option<u32>,
}

impl Quote {
    /// Create a YES-side quote.
    pub fn new(best_bid: Option<u32>, best_ask: Option<u32>) -> Self {
        Self {
            best_bid,
            best_ask,
            no_bid: None,
            no_ask: None,
        }
    }

    /// Attach NO-side prices.
    #[must_use]
    pub fn with_no_side(mut self, no_bid: Option<u32>, no_ask: Option<u32>) -> Self {
        self.no_bid = no_bid;
        self.no_ask = no_ask;
        self
    }

    /// Both YES sides present.
    pub fn is_two_sided(&self) -> bool {
        self.best_bid.is_some() && self.best_ask.is_some()
    }

    /// Check if the book is crossed (best_bid > best_ask).
    pub fn is_crossed(&self) -> bool {
        match (self.best_bid, self.best_ask) {
            (Some(bid), Some(ask)) => bid > ask,
            _ => false,
        }
    }

    /// YES spread in price points. Negative when crossed.
    pub fn spread(&self) -> Option<i64> {
        match (self.best_bid, self.best_ask) {
            (Some(bid), Some(ask)) => Some(i64::from(ask) - i64::from(bid)),
            _ => None,
        }
    }

    /// Any present price above the scale.
    pub fn is_out_of_range(&self) -> bool {
        [self.best_bid, self.best_ask, self.no_bid, self.no_ask]
            .into_iter()
            .flatten()
            .any(|p| p > PRICE_SCALE)
    }
}
