//! Implied probability estimation from two-sided quotes.
//!
//! This module handles:
//! - Quote types on the 0-100 price-point scale
//! - Midpoint estimation of P(YES)

pub mod estimator;
pub mod quote;

pub use estimator::{estimate, require_estimate, ImpliedProbability};
pub use quote::{Quote, PRICE_SCALE};
