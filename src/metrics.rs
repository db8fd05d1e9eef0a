//! Metrics for API latency and simulation throughput.
//!
//! This module provides metrics for:
//! - Kalshi API request latency
//! - Markets fetched and quotes found unavailable
//! - Simulations run, trials drawn and simulation latency
//!
//! Nothing here is called from the sampling core; recording happens in the
//! client and analysis layers.

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use tracing::debug;

// === Metric Name Constants ===

/// HTTP request latency metric name.
pub const METRIC_HTTP_REQUEST_LATENCY: &str = "http_request_latency_ms";
/// Simulation latency metric name.
pub const METRIC_SIMULATION_LATENCY: &str = "simulation_latency_ms";
/// Markets fetched counter metric name.
pub const METRIC_MARKETS_FETCHED: &str = "markets_fetched_total";
/// Quotes without a two-sided market counter metric name.
pub const METRIC_QUOTES_UNAVAILABLE: &str = "quotes_unavailable_total";
/// Simulations run counter metric name.
pub const METRIC_SIMULATIONS_RUN: &str = "simulations_run_total";
/// Trials drawn counter metric name.
pub const METRIC_TRIALS_DRAWN: &str = "trials_drawn_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_HTTP_REQUEST_LATENCY,
        "Kalshi API request latency in milliseconds"
    );
    describe_histogram!(
        METRIC_SIMULATION_LATENCY,
        "Wall time of one simulation run in milliseconds"
    );

    describe_counter!(METRIC_MARKETS_FETCHED, "Total number of markets fetched");
    describe_counter!(
        METRIC_QUOTES_UNAVAILABLE,
        "Total number of quotes missing a bid or ask"
    );
    describe_counter!(METRIC_SIMULATIONS_RUN, "Total number of simulations run");
    describe_counter!(METRIC_TRIALS_DRAWN, "Total number of trials drawn");

    debug!("Metrics initialized");
}

/// Record HTTP request latency.
pub fn record_http_latency(start: Instant, endpoint: &str) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_HTTP_REQUEST_LATENCY, "endpoint" => endpoint.to_string()).record(latency_ms);
}

/// Increment markets fetched counter.
pub fn inc_markets_fetched(count: u64) {
    counter!(METRIC_MARKETS_FETCHED).increment(count);
}

/// Increment unavailable quotes counter.
pub fn inc_quotes_unavailable() {
    counter!(METRIC_QUOTES_UNAVAILABLE).increment(1);
}

/// Record a finished simulation of `trials` draws.
pub fn record_simulation(trials: u64) {
    counter!(METRIC_SIMULATIONS_RUN).increment(1);
    counter!(METRIC_TRIALS_DRAWN).increment(trials);
}

/// RAII guard for timing operations.
/// Automatically records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    metric_name: &'static str,
}

impl LatencyTimer {
    /// Create a new latency timer for the given metric.
    pub fn new(metric_name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            metric_name,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        let latency_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        histogram!(self.metric_name).record(latency_ms);
    }
}

/// Create a latency timer for a simulation run.
pub fn timer_simulation() -> LatencyTimer {
    LatencyTimer::new(METRIC_SIMULATION_LATENCY)
}
