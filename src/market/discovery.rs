//! Ticker resolution: a market first, then the event it may name.

use tracing::{debug, info, instrument};

use super::source::MarketSource;
use super::types::Market;
use crate::error::MarketError;

/// What a user-supplied ticker turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The ticker is a market.
    Market(Market),
    /// The ticker (or its prefix) is an event with these markets.
    Event {
        /// Event ticker that matched.
        event_ticker: String,
        /// Markets listed under the event.
        markets: Vec<Market>,
    },
}

/// Normalize user input to the API's ticker form.
pub fn normalize_ticker(input: &str) -> String {
    input.trim().to_uppercase()
}

/// Event tickers to try for a ticker that is not a market.
///
/// The full ticker first, then with its last `-suffix` removed
/// (`KXUCLFINALIST-26` → `KXUCLFINALIST`).
pub fn event_ticker_candidates(ticker: &str) -> Vec<String> {
    let mut candidates = vec![ticker.to_string()];
    if let Some((prefix, _)) = ticker.rsplit_once('-') {
        if !prefix.is_empty() {
            candidates.push(prefix.to_string());
        }
    }
    candidates
}

/// Resolve `input` to a market, falling back to an event search.
///
/// Only a not-found market triggers the fallback; other errors propagate.
#[instrument(skip(source))]
pub async fn resolve_ticker<S: MarketSource + ?Sized>(
    source: &S,
    input: &str,
    limit: u32,
    status: &str,
) -> Result<Resolution, MarketError> {
    let ticker = normalize_ticker(input);

    match source.get_market(&ticker).await {
        Ok(market) => return Ok(Resolution::Market(market)),
        Err(e) if e.is_not_found() => {
            info!(ticker = %ticker, "Not found as a market, trying as event");
        }
        Err(e) => return Err(e),
    }

    for event_ticker in event_ticker_candidates(&ticker) {
        match source
            .search_markets(Some(&event_ticker), limit, status)
            .await
        {
            Ok(markets) if !markets.is_empty() => {
                info!(
                    event_ticker = %event_ticker,
                    count = markets.len(),
                    "Found markets for event"
                );
                return Ok(Resolution::Event {
                    event_ticker,
                    markets,
                });
            }
            Ok(_) => debug!(event_ticker = %event_ticker, "No markets for event"),
            Err(e) => debug!(event_ticker = %event_ticker, error = %e, "Event search failed"),
        }
    }

    Err(MarketError::NotFound {
        resource: format!("market or event {}", ticker),
    })
}
