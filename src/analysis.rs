//! Order book to simulated outcome frequencies.
//!
//! Ties the market data layer to the core: take the top-of-book quote,
//! estimate P(YES), and run trials over `[p_yes, 1 - p_yes]`.

use rand::Rng;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::market::{MarketSource, Outcome};
use crate::metrics;
use crate::orderbook::Orderbook;
use crate::pricing::{require_estimate, ImpliedProbability, Quote};
use crate::simulation::{ProbabilityVector, SimulationResult, TrialSampler};

/// Deviations beyond this many standard errors are flagged.
pub const SE_FLAG_THRESHOLD: f64 = 3.0;

/// Simulation of one binary market.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketSimulation {
    /// Market ticker.
    pub ticker: String,
    /// Quote the estimate was taken from.
    pub quote: Quote,
    /// Midpoint P(YES).
    pub p_yes: ImpliedProbability,
    /// Contracts bid on the YES side.
    pub yes_depth: u64,
    /// Contracts bid on the NO side.
    pub no_depth: u64,
    /// `[p_yes, p_no]` fed to the sampler.
    pub probabilities: ProbabilityVector,
    /// Tallied trials.
    pub result: SimulationResult,
}

impl MarketSimulation {
    /// Simulated frequency of `outcome`.
    pub fn frequency(&self, outcome: Outcome) -> f64 {
        self.result.frequencies()[outcome.index()]
    }

    /// Analytic vs simulated rows, labelled `YES` / `NO`.
    pub fn report(&self) -> Vec<ConvergenceRow> {
        let labels: Vec<String> = Outcome::ALL.iter().map(|o| o.to_string()).collect();
        convergence_report(&labels, &self.probabilities, &self.result)
    }
}

/// One category of a convergence report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvergenceRow {
    /// Category label.
    pub label: String,
    /// Input probability.
    pub probability: f64,
    /// Simulated frequency.
    pub frequency: f64,
    /// `frequency - probability`.
    pub deviation: f64,
    /// Standard error of the frequency; absent for zero trials.
    pub standard_error: Option<f64>,
    /// Whether the deviation exceeds [`SE_FLAG_THRESHOLD`] standard errors.
    pub flagged: bool,
}

/// Compare simulated frequencies with the analytic probabilities.
///
/// Missing labels fall back to the category index.
pub fn convergence_report(
    labels: &[String],
    probabilities: &ProbabilityVector,
    result: &SimulationResult,
) -> Vec<ConvergenceRow> {
    result
        .deviations(probabilities)
        .into_iter()
        .enumerate()
        .map(|(i, deviation)| {
            let standard_error = probabilities.standard_error(i, result.trials());
            // A zero-variance category must match exactly
            let flagged = match standard_error {
                Some(se) if se > 0.0 => deviation.abs() > SE_FLAG_THRESHOLD * se,
                Some(_) => deviation != 0.0,
                None => false,
            };

            ConvergenceRow {
                label: labels.get(i).cloned().unwrap_or_else(|| i.to_string()),
                probability: probabilities.get(i).unwrap_or_default(),
                frequency: result.frequencies()[i],
                deviation,
                standard_error,
                flagged,
            }
        })
        .collect()
}

/// Estimate P(YES) from `book` and simulate `trials` resolutions.
///
/// Fails with a pricing error when the book has no two-sided YES quote.
pub fn simulate_orderbook<R: Rng + ?Sized>(
    book: &Orderbook,
    trials: u64,
    rng: &mut R,
) -> crate::Result<MarketSimulation> {
    let quote = book.quote();
    if quote.is_crossed() {
        warn!(
            ticker = %book.ticker,
            best_bid = ?quote.best_bid,
            best_ask = ?quote.best_ask,
            "Crossed quote, using midpoint anyway"
        );
    }
    if quote.is_out_of_range() {
        warn!(
            ticker = %book.ticker,
            best_bid = ?quote.best_bid,
            best_ask = ?quote.best_ask,
            "Quote outside the 0-100 price scale"
        );
    }
    if !quote.is_two_sided() {
        metrics::inc_quotes_unavailable();
    }

    let p_yes = require_estimate(&book.ticker, &quote)?;
    let probabilities = p_yes.to_vector()?;

    let timer = metrics::timer_simulation();
    let result = TrialSampler::new(&probabilities).run(trials, rng);
    let elapsed_ms = timer.elapsed_ms();
    drop(timer);
    metrics::record_simulation(trials);

    info!(
        ticker = %book.ticker,
        p_yes = %p_yes,
        spread = ?quote.spread(),
        trials = trials,
        elapsed_ms = elapsed_ms,
        "Simulated market"
    );

    Ok(MarketSimulation {
        ticker: book.ticker.clone(),
        quote,
        p_yes,
        yes_depth: book.yes_depth(),
        no_depth: book.no_depth(),
        probabilities,
        result,
    })
}

/// Fetch the order book for `ticker` and simulate it.
#[instrument(skip(source, rng))]
pub async fn analyze_market<S, R>(
    source: &S,
    ticker: &str,
    trials: u64,
    rng: &mut R,
) -> crate::Result<MarketSimulation>
where
    S: MarketSource + ?Sized,
    R: Rng + ?Sized,
{
    let book = source.get_orderbook(ticker).await?;
    simulate_orderbook(&book, trials, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, PricingError, SimulationError};
    use crate::market::MockKalshiClient;
    use crate::simulation::seeded_rng;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn analyzes_two_sided_book() {
        let client = MockKalshiClient::new();
        // YES bid 45, NO bid 45 -> YES ask 55
        client.set_orderbook("KXA-26", &[(45, 10), (40, 5)], &[(45, 10)]);

        let mut rng = seeded_rng(Some(7));
        let sim = analyze_market(&client, "KXA-26", 10_000, &mut rng)
            .await
            .unwrap();

        assert_eq!(sim.p_yes.value(), dec!(0.5));
        assert!((sim.probabilities.as_slice()[0] - 0.5).abs() < 1e-12);
        assert_eq!(sim.result.counts().iter().sum::<u64>(), 10_000);
    }

    #[tokio::test]
    async fn one_sided_book_is_missing_quote() {
        let client = MockKalshiClient::new();
        client.set_orderbook("KXA-26", &[(45, 10)], &[]);

        let mut rng = seeded_rng(Some(7));
        let err = analyze_market(&client, "KXA-26", 100, &mut rng)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Pricing(PricingError::MissingQuoteData {
                best_bid: Some(45),
                best_ask: None,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn fetch_errors_propagate() {
        let client = MockKalshiClient::with_config(crate::market::MockConfig {
            fail_orderbooks: true,
            ..Default::default()
        });

        let mut rng = seeded_rng(Some(7));
        let err = analyze_market(&client, "KXA-26", 100, &mut rng)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Market(_)));
    }

    #[test]
    fn same_seed_same_simulation() {
        let book = Orderbook::new(
            "KXA-26",
            vec![crate::orderbook::PriceLevel::new(62, 1)],
            vec![crate::orderbook::PriceLevel::new(35, 1)],
        );

        let a = simulate_orderbook(&book, 5_000, &mut seeded_rng(Some(99))).unwrap();
        let b = simulate_orderbook(&book, 5_000, &mut seeded_rng(Some(99))).unwrap();
        assert_eq!(a.p_yes.value(), dec!(0.635));
        assert_eq!(a, b);
    }

    #[test]
    fn carries_depth_and_outcome_frequencies() {
        let book = Orderbook::new(
            "KXA-26",
            vec![
                crate::orderbook::PriceLevel::new(45, 10),
                crate::orderbook::PriceLevel::new(40, 5),
            ],
            vec![crate::orderbook::PriceLevel::new(45, 7)],
        );
        let sim = simulate_orderbook(&book, 1_000, &mut seeded_rng(Some(5))).unwrap();

        assert_eq!((sim.yes_depth, sim.no_depth), (15, 7));
        assert_eq!(sim.quote.spread(), Some(10));
        assert_eq!(sim.frequency(Outcome::Yes), sim.result.frequencies()[0]);
        assert!((sim.frequency(Outcome::Yes) + sim.frequency(Outcome::No) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn out_of_range_quote_is_not_simulated() {
        // YES bid 120 against YES ask 90 puts the midpoint above 1
        let book = Orderbook::new(
            "KXA-26",
            vec![crate::orderbook::PriceLevel::new(120, 1)],
            vec![crate::orderbook::PriceLevel::new(10, 1)],
        );
        assert!(book.quote().is_out_of_range());

        let err = simulate_orderbook(&book, 100, &mut seeded_rng(Some(5))).unwrap_err();
        assert!(matches!(
            err,
            AppError::Simulation(SimulationError::InvalidProbabilityVector(_))
        ));
    }

    #[test]
    fn report_labels_outcomes() {
        let book = Orderbook::new(
            "KXA-26",
            vec![crate::orderbook::PriceLevel::new(70, 1)],
            vec![crate::orderbook::PriceLevel::new(30, 1)],
        );
        let sim = simulate_orderbook(&book, 200_000, &mut seeded_rng(Some(3))).unwrap();
        let rows = sim.report();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].label, "YES");
        assert_eq!(rows[1].label, "NO");
        assert!((rows[0].probability - 0.7).abs() < 1e-12);
        assert!(rows[0].standard_error.is_some());
        assert!((rows[0].deviation + rows[1].deviation).abs() < 1e-9);
    }

    #[test]
    fn report_flags_large_deviation() {
        let probabilities = ProbabilityVector::new(vec![0.5, 0.5]).unwrap();
        let result = SimulationResult::from_counts(vec![600, 400]);
        let rows = convergence_report(&[], &probabilities, &result);

        // se = sqrt(0.25 / 1000) ~ 0.0158, deviation 0.1 > 3 se
        assert!(rows[0].flagged);
        assert!(rows[1].flagged);
        assert_eq!(rows[0].label, "0");
    }

    #[test]
    fn report_with_zero_trials_flags_nothing() {
        let probabilities = ProbabilityVector::new(vec![0.2, 0.8]).unwrap();
        let result = SimulationResult::from_counts(vec![0, 0]);
        let rows = convergence_report(&[], &probabilities, &result);

        assert!(rows.iter().all(|r| !r.flagged && r.standard_error.is_none()));
    }
}
