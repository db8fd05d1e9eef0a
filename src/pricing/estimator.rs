//! Midpoint estimator for implied P(YES).

use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::quote::{Quote, PRICE_SCALE};
use crate::error::{PricingError, SimulationError};
use crate::simulation::ProbabilityVector;

/// Decimal places kept on an estimate.
pub const ESTIMATE_DP: u32 = 4;

/// Market-implied probability that the event resolves YES.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImpliedProbability(Decimal);

impl ImpliedProbability {
    /// Exact decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Floating-point view for sampling.
    pub fn as_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(f64::NAN)
    }

    /// Implied P(NO) = 1 - P(YES).
    pub fn complement(&self) -> Decimal {
        Decimal::ONE - self.0
    }

    /// Binary vector `[p_yes, p_no]`.
    ///
    /// Fails when the quote was outside the price scale and the midpoint
    /// left `[0, 1]`.
    pub fn to_vector(&self) -> Result<ProbabilityVector, SimulationError> {
        let p_no = self.complement().to_f64().unwrap_or(f64::NAN);
        ProbabilityVector::new(vec![self.as_f64(), p_no])
    }
}

impl fmt::Display for ImpliedProbability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.0)
    }
}

/// Estimate P(YES) as the quote midpoint rescaled to `[0, 1]`.
///
/// Returns `None` unless both `best_bid` and `best_ask` are present. A
/// crossed book still yields its midpoint.
pub fn estimate(quote: &Quote) -> Option<ImpliedProbability> {
    let (bid, ask) = (quote.best_bid?, quote.best_ask?);

    let sum = Decimal::from(u64::from(bid) + u64::from(ask));
    let midpoint = sum / Decimal::TWO / Decimal::from(PRICE_SCALE);

    Some(ImpliedProbability(midpoint.round_dp(ESTIMATE_DP)))
}

/// [`estimate`], mapping an absent quote side to `MissingQuoteData`.
pub fn require_estimate(ticker: &str, quote: &Quote) -> Result<ImpliedProbability, PricingError> {
    estimate(quote).ok_or_else(|| PricingError::MissingQuoteData {
        ticker: ticker.to_string(),
        best_bid: quote.best_bid,
        best_ask: quote.best_ask,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn midpoint_of_symmetric_quote() {
        let p = estimate(&Quote::new(Some(45), Some(55))).unwrap();
        assert_eq!(p.value(), dec!(0.5));
        assert_eq!(p.to_string(), "0.5000");
    }

    #[test]
    fn midpoint_of_odd_sum_keeps_half_cent() {
        let p = estimate(&Quote::new(Some(62), Some(65))).unwrap();
        assert_eq!(p.value(), dec!(0.635));
        assert_eq!(p.complement(), dec!(0.365));
    }

    #[test]
    fn absent_side_is_unavailable() {
        assert!(estimate(&Quote::new(None, Some(55))).is_none());
        assert!(estimate(&Quote::new(Some(45), None)).is_none());
        assert!(estimate(&Quote::default()).is_none());
    }

    #[test]
    fn no_side_prices_do_not_substitute() {
        let quote = Quote::new(None, None).with_no_side(Some(40), Some(42));
        assert!(estimate(&quote).is_none());
    }

    #[test]
    fn crossed_book_still_estimates() {
        let p = estimate(&Quote::new(Some(60), Some(50))).unwrap();
        assert_eq!(p.value(), dec!(0.55));
    }

    #[test]
    fn extremes_map_to_unit_interval() {
        assert_eq!(estimate(&Quote::new(Some(0), Some(0))).unwrap().value(), dec!(0));
        assert_eq!(
            estimate(&Quote::new(Some(100), Some(100))).unwrap().value(),
            dec!(1)
        );
    }

    #[test]
    fn require_estimate_reports_missing_side() {
        let err = require_estimate("KXFOO-26", &Quote::new(None, Some(55))).unwrap_err();
        assert_eq!(
            err,
            PricingError::MissingQuoteData {
                ticker: "KXFOO-26".to_string(),
                best_bid: None,
                best_ask: Some(55),
            }
        );
    }

    #[test]
    fn to_vector_builds_binary_vector() {
        let p = estimate(&Quote::new(Some(68), Some(72))).unwrap();
        let vector = p.to_vector().unwrap();
        assert_eq!(vector.len(), 2);
        assert!((vector.as_slice()[0] - 0.7).abs() < 1e-12);
        assert!((vector.as_slice()[1] - 0.3).abs() < 1e-12);
    }

    #[test]
    fn to_vector_rejects_out_of_range_quote() {
        let p = estimate(&Quote::new(Some(150), Some(160))).unwrap();
        assert!(matches!(
            p.to_vector(),
            Err(SimulationError::InvalidProbabilityVector(_))
        ));
    }
}
