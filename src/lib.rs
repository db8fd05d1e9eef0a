//! Kalshi implied probabilities and Monte Carlo outcome simulation.
//!
//! A binary market's YES price in cents is read as a probability. The
//! midpoint of the best bid and ask, rescaled to `[0, 1]`, is the implied
//! P(YES); trials drawn from `[p_yes, 1 - p_yes]` should reproduce it.
//!
//! ```text
//! YES bid:  45¢
//! YES ask:  55¢
//! ─────────────────────
//! P(YES) = (45 + 55) / 2 / 100 = 0.5000
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`pricing`]: Quotes and the midpoint estimator
//! - [`simulation`]: Probability vectors and the seeded trial sampler
//! - [`market`]: Kalshi client, ticker resolution and summaries
//! - [`orderbook`]: Order book depth and top-of-book quote
//! - [`analysis`]: Order book to simulated frequencies
//! - [`storage`]: CSV snapshot persistence
//! - [`metrics`]: Counters and latency histograms

pub mod analysis;
pub mod config;
pub mod error;
pub mod market;
pub mod metrics;
pub mod orderbook;
pub mod pricing;
pub mod simulation;
pub mod storage;

pub use config::Config;
pub use error::{AppError, Result};
