//! Application configuration loaded from environment variables.

use serde::Deserialize;
use url::Url;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Kalshi API ===
    /// Trade API base URL.
    #[serde(default = "default_api_url")]
    pub kalshi_api_url: String,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    // === Simulation ===
    /// Default number of trials per simulation.
    #[serde(default = "default_n_simulations")]
    pub n_simulations: u64,

    /// Default generator seed. Unset means a fresh entropy seed per run.
    #[serde(default)]
    pub sim_seed: Option<u64>,

    // === Persistence ===
    /// CSV file market snapshots are appended to.
    #[serde(default = "default_csv_path")]
    pub market_csv_path: String,

    // === Ticker Resolution ===
    /// Market limit for the event fallback search.
    #[serde(default = "default_search_limit")]
    pub search_limit: u32,

    /// Market status filter for the event fallback search.
    #[serde(default = "default_search_status")]
    pub search_status: String,

    // === Logging ===
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,
}

fn default_api_url() -> String {
    "https://api.elections.kalshi.com/trade-api/v2".to_string()
}

fn default_http_timeout() -> u64 {
    20
}

fn default_n_simulations() -> u64 {
    100_000
}

fn default_csv_path() -> String {
    "data/markets.csv".to_string()
}

fn default_search_limit() -> u32 {
    100
}

fn default_search_status() -> String {
    "open".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            kalshi_api_url: default_api_url(),
            http_timeout_secs: default_http_timeout(),
            n_simulations: default_n_simulations(),
            sim_seed: None,
            market_csv_path: default_csv_path(),
            search_limit: default_search_limit(),
            search_status: default_search_status(),
            rust_log: default_log_level(),
            verbose: false,
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        let url = Url::parse(&self.kalshi_api_url)
            .map_err(|e| format!("KALSHI_API_URL is not a valid URL: {}", e))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err("KALSHI_API_URL must use http or https".to_string());
        }

        if self.http_timeout_secs == 0 {
            return Err("HTTP_TIMEOUT_SECS must be greater than 0".to_string());
        }

        if !(1..=1000).contains(&self.search_limit) {
            return Err("SEARCH_LIMIT must be between 1 and 1000".to_string());
        }

        Ok(())
    }

    /// API base URL without a trailing slash.
    pub fn api_base(&self) -> &str {
        self.kalshi_api_url.trim_end_matches('/')
    }

    /// Log filter directive, forced to debug by `--verbose` or `VERBOSE`.
    pub fn log_filter(&self, verbose_flag: bool) -> String {
        if verbose_flag || self.verbose {
            "kalshi_mc=debug,info".to_string()
        } else {
            self.rust_log.clone()
        }
    }
}
