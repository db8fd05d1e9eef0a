//! Unified error types for the simulator.

use thiserror::Error;

/// Unified error type for the simulator.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration loaded but failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Market data error.
    #[error("market error: {0}")]
    Market(#[from] MarketError),

    /// Probability estimation error.
    #[error("pricing error: {0}")]
    Pricing(#[from] PricingError),

    /// Trial sampling error.
    #[error("simulation error: {0}")]
    Simulation(#[from] SimulationError),

    /// Snapshot persistence error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// JSON parsing error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Market data retrieval errors.
#[derive(Error, Debug)]
pub enum MarketError {
    /// The API answered 404 for the requested resource.
    #[error("{resource} not found")]
    NotFound {
        /// The market, event or path that was not found.
        resource: String,
    },

    /// Request completed with a non-success status.
    #[error("failed to fetch {resource}: {reason}")]
    FetchFailed {
        /// The resource that failed.
        resource: String,
        /// Reason for failure.
        reason: String,
    },

    /// Failed to parse market data.
    #[error("failed to parse market data: {0}")]
    ParseError(String),

    /// Ticker contains characters that cannot go into a URL path.
    #[error("invalid ticker: {0:?}")]
    InvalidTicker(String),

    /// HTTP request failed.
    #[error("http request failed: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl MarketError {
    /// Whether this error means the resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, MarketError::NotFound { .. })
    }
}

/// Probability estimation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// One or both sides of the YES quote are absent.
    #[error("no two-sided quote for {ticker}: best_bid={best_bid:?}, best_ask={best_ask:?}")]
    MissingQuoteData {
        /// Market ticker.
        ticker: String,
        /// Best YES bid, if any.
        best_bid: Option<u32>,
        /// Best YES ask, if any.
        best_ask: Option<u32>,
    },
}

/// Trial sampling errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// Probabilities are empty, negative, non-finite or do not sum to one.
    #[error("invalid probability vector: {0}")]
    InvalidProbabilityVector(String),

    /// Trial count is negative.
    #[error("invalid trial count: {0}")]
    InvalidTrialCount(i64),

    /// Decoded result whose counts, trials and frequencies disagree.
    #[error("invalid simulation result: {0}")]
    InvalidResult(String),
}

/// Snapshot persistence errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// CSV encoding or decoding failed.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Filesystem error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Timestamp could not be formatted or parsed.
    #[error("timestamp error: {0}")]
    Timestamp(String),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, AppError>;
