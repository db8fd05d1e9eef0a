//! Integration tests for the Kalshi Monte Carlo engine.
//!
//! The wiremock tests run offline against a local server. The live tests
//! hit the public Kalshi API and need network access.
//! Run with: cargo test --test integration -- --ignored
//!
//! Set KALSHI_TEST_TICKER to pick the market the live tests use.

use std::time::Duration;

use kalshi_mc::analysis::analyze_market;
use kalshi_mc::config::Config;
use kalshi_mc::error::{AppError, PricingError};
use kalshi_mc::market::{resolve_ticker, KalshiClient, MarketSummary, Resolution};
use kalshi_mc::simulation::{seeded_rng, simulate};
use kalshi_mc::storage::{SnapshotStore, WriteMode};
use rust_decimal_macros::dec;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> KalshiClient {
    KalshiClient::with_base_url(&server.uri(), Duration::from_secs(5)).unwrap()
}

/// Live ticker from environment, with a long-dated default.
fn live_ticker() -> String {
    dotenvy::dotenv().ok();
    std::env::var("KALSHI_TEST_TICKER").unwrap_or_else(|_| "KXGREENTERRITORY-29".to_string())
}

/// Market, order book, simulation and snapshot against a local server.
#[tokio::test]
async fn test_market_to_snapshot_pipeline() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/markets/KXGREENTERRITORY-29"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "market": {
                "ticker": "KXGREENTERRITORY-29",
                "event_ticker": "KXGREENTERRITORY",
                "title": "Will Greenland become a US territory?",
                "status": "active",
                "yes_bid": 12,
                "yes_ask": 14,
                "no_bid": 86,
                "no_ask": 88,
                "volume_24h": 1500,
                "open_interest": 9000,
                "liquidity_dollars": "1234.5600"
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/markets/KXGREENTERRITORY-29/orderbook"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "orderbook": { "yes": [[10, 50], [12, 20]], "no": [[86, 40]] }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let market = match resolve_ticker(&client, "kxgreenterritory-29", 100, "open")
        .await
        .unwrap()
    {
        Resolution::Market(market) => market,
        other => panic!("expected market, got {:?}", other),
    };
    let summary = MarketSummary::from_market(&market);
    assert_eq!(summary.implied_p_yes.map(|p| p.value()), Some(dec!(0.13)));

    let mut rng = seeded_rng(Some(42));
    let simulation = analyze_market(&client, &market.ticker, 100_000, &mut rng)
        .await
        .unwrap();
    assert_eq!(simulation.p_yes.value(), dec!(0.13));
    assert_eq!(simulation.result.counts().iter().sum::<u64>(), 100_000);
    assert!((simulation.result.frequencies()[0] - 0.13).abs() < 0.01);

    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(dir.path().join("data").join("markets.csv"));
    store.save(&summary, WriteMode::Append).unwrap();

    let latest = store.latest("KXGREENTERRITORY-29").unwrap().unwrap();
    assert_eq!(latest.yes_bid, Some(12));
    assert_eq!(latest.implied_p_yes, Some(dec!(0.13)));
    assert_eq!(latest.liquidity, Some(dec!(1234.56)));
}

/// A not-found market falls back to its event.
#[tokio::test]
async fn test_event_fallback_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/markets/KXUCLFINALIST-26"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/markets"))
        .and(query_param("event_ticker", "KXUCLFINALIST-26"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "markets": []
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/markets"))
        .and(query_param("event_ticker", "KXUCLFINALIST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "markets": [
                { "ticker": "KXUCLFINALIST-26-ARS", "yes_bid": 30, "yes_ask": 32 },
                { "ticker": "KXUCLFINALIST-26-RMA", "yes_bid": 40, "yes_ask": 44 }
            ]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let resolution = resolve_ticker(&client, "KXUCLFINALIST-26", 100, "open")
        .await
        .unwrap();

    match resolution {
        Resolution::Event {
            event_ticker,
            markets,
        } => {
            assert_eq!(event_ticker, "KXUCLFINALIST");
            assert_eq!(markets.len(), 2);
            assert_eq!(markets[1].quote().best_ask, Some(44));
        }
        other => panic!("expected event, got {:?}", other),
    }
}

/// An empty book is reported as missing quote data, not a panic.
#[tokio::test]
async fn test_empty_orderbook_skips_simulation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/markets/KXTHIN-26/orderbook"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "orderbook": { "yes": null, "no": null }
        })))
        .mount(&server)
        .await;

    let mut rng = seeded_rng(Some(1));
    let err = analyze_market(&client_for(&server), "KXTHIN-26", 1_000, &mut rng)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Pricing(PricingError::MissingQuoteData {
            best_bid: None,
            best_ask: None,
            ..
        })
    ));
}

/// Default configuration validates and points at the public API.
#[test]
fn test_default_config() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.n_simulations, 100_000);
    assert_eq!(config.market_csv_path, "data/markets.csv");
}

/// Same seed, same counts, through the public entry point.
#[test]
fn test_seeded_runs_reproduce() {
    let a = simulate(&[0.2, 0.3, 0.5], 50_000, &mut seeded_rng(Some(2026))).unwrap();
    let b = simulate(&[0.2, 0.3, 0.5], 50_000, &mut seeded_rng(Some(2026))).unwrap();
    assert_eq!(a.counts(), b.counts());
}

/// Fetch a live market summary.
#[tokio::test]
#[ignore = "requires network access to the Kalshi API"]
async fn test_live_market_summary() {
    let config = Config::load().unwrap_or_default();
    let client = KalshiClient::new(&config).unwrap();
    let ticker = live_ticker();

    let resolution = resolve_ticker(&client, &ticker, config.search_limit, &config.search_status)
        .await;
    assert!(resolution.is_ok(), "Failed to resolve: {:?}", resolution.err());

    if let Ok(Resolution::Market(market)) = resolution {
        println!("{}", MarketSummary::from_market(&market));
    }
}

/// Simulate a live market.
#[tokio::test]
#[ignore = "requires network access to the Kalshi API"]
async fn test_live_simulation() {
    let config = Config::load().unwrap_or_default();
    let client = KalshiClient::new(&config).unwrap();
    let ticker = live_ticker();

    let mut rng = seeded_rng(Some(42));
    match analyze_market(&client, &ticker, 100_000, &mut rng).await {
        Ok(simulation) => {
            assert_eq!(simulation.result.counts().iter().sum::<u64>(), 100_000);
            println!(
                "P(YES) {} simulated {:.5}",
                simulation.p_yes, simulation.result.frequencies()[0]
            );
        }
        Err(AppError::Pricing(e)) => println!("Skipping: {}", e),
        Err(e) => panic!("Live simulation failed: {}", e),
    }
}
