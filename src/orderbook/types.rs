//! Order book types for binary contracts.
//!
//! Kalshi publishes only bids for each side. A YES ask is the complement of
//! the best NO bid, and vice versa.

use serde::{Deserialize, Serialize};

use crate::pricing::{Quote, PRICE_SCALE};

/// Single price level in an order book.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceLevel {
    /// Price in cents.
    pub price: u32,
    /// Contracts resting at this price.
    pub quantity: u64,
}

impl PriceLevel {
    /// Create a new price level.
    pub fn new(price: u32, quantity: u64) -> Self {
        Self { price, quantity }
    }
}

/// Depth of book for one market.
#[derive(Debug, Clone)]
pub struct Orderbook {
    /// Market ticker.
    pub ticker: String,
    /// YES bids sorted by price descending.
    pub yes_bids: Vec<PriceLevel>,
    /// NO bids sorted by price descending.
    pub no_bids: Vec<PriceLevel>,
}

impl Orderbook {
    /// Create a book, sorting both sides best-first and dropping empty levels.
    pub fn new(
        ticker: impl Into<String>,
        mut yes_bids: Vec<PriceLevel>,
        mut no_bids: Vec<PriceLevel>,
    ) -> Self {
        yes_bids.retain(|l| l.quantity > 0);
        no_bids.retain(|l| l.quantity > 0);
        yes_bids.sort_by(|a, b| b.price.cmp(&a.price));
        no_bids.sort_by(|a, b| b.price.cmp(&a.price));

        Self {
            ticker: ticker.into(),
            yes_bids,
            no_bids,
        }
    }

    /// Get the best YES bid.
    pub fn best_yes_bid(&self) -> Option<u32> {
        self.yes_bids.first().map(|l| l.price)
    }

    /// Get the best NO bid.
    pub fn best_no_bid(&self) -> Option<u32> {
        self.no_bids.first().map(|l| l.price)
    }

    /// Get the best YES ask (100 - best NO bid).
    pub fn best_yes_ask(&self) -> Option<u32> {
        self.best_no_bid().map(|p| PRICE_SCALE.saturating_sub(p))
    }

    /// Get the best NO ask (100 - best YES bid).
    pub fn best_no_ask(&self) -> Option<u32> {
        self.best_yes_bid().map(|p| PRICE_SCALE.saturating_sub(p))
    }

    /// Total contracts bid on the YES side.
    pub fn yes_depth(&self) -> u64 {
        self.yes_bids.iter().map(|l| l.quantity).sum()
    }

    /// Total contracts bid on the NO side.
    pub fn no_depth(&self) -> u64 {
        self.no_bids.iter().map(|l| l.quantity).sum()
    }

    /// Reduce the book to its top-of-book quote.
    pub fn quote(&self) -> Quote {
        Quote::new(self.best_yes_bid(), self.best_yes_ask())
            .with_no_side(self.best_no_bid(), self.best_no_ask())
    }
}
