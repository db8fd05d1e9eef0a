//! Kalshi implied probability and Monte Carlo CLI entry point.

use std::fmt;

use clap::{Parser, Subcommand};
use dialoguer::{Confirm, Input};
use tracing::{debug, info};
use tracing_subscriber::{prelude::*, EnvFilter};

use kalshi_mc::analysis::{convergence_report, simulate_orderbook, ConvergenceRow};
use kalshi_mc::config::Config;
use kalshi_mc::error::{AppError, SimulationError};
use kalshi_mc::market::{
    normalize_ticker, resolve_ticker, KalshiClient, Market, MarketSummary, Outcome, Resolution,
};
use kalshi_mc::metrics;
use kalshi_mc::pricing::estimate;
use kalshi_mc::simulation::{seeded_rng, simulate, ProbabilityVector};
use kalshi_mc::storage::{SnapshotStore, WriteMode};

const RULE: &str = "======================================================================";
const THIN_RULE: &str = "----------------------------------------------------------------------";

/// Kalshi implied probabilities and Monte Carlo outcome simulation.
#[derive(Parser, Debug)]
#[command(name = "kalshi-mc")]
#[command(about = "Implied probabilities and Monte Carlo trials for Kalshi markets")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show a market summary, or the markets of an event.
    Inspect {
        /// Market or event ticker (prompted for when omitted).
        ticker: Option<String>,

        /// Save the summary to CSV without asking.
        #[arg(long, conflicts_with = "no_save")]
        save: bool,

        /// Do not save the summary.
        #[arg(long)]
        no_save: bool,
    },

    /// Estimate P(YES) from the order book and simulate outcomes.
    Simulate {
        /// Market ticker (prompted for when omitted).
        ticker: Option<String>,

        /// Number of trials.
        #[arg(short = 'n', long = "trials", allow_negative_numbers = true)]
        trials: Option<i64>,

        /// Generator seed for a reproducible run.
        #[arg(long)]
        seed: Option<u64>,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Simulate an arbitrary probability vector.
    Sample {
        /// Comma-separated probabilities summing to 1.
        #[arg(
            long,
            value_delimiter = ',',
            required = true,
            allow_negative_numbers = true
        )]
        probs: Vec<f64>,

        /// Number of trials.
        #[arg(short = 'n', long = "trials", allow_negative_numbers = true)]
        trials: Option<i64>,

        /// Generator seed for a reproducible run.
        #[arg(long)]
        seed: Option<u64>,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List an event's markets with their implied probabilities.
    Event {
        /// Event ticker.
        event_ticker: String,
    },

    /// Show the latest stored snapshot of a market.
    History {
        /// Market ticker.
        ticker: String,
    },

    /// Check configuration validity.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Commands report load errors themselves; logging falls back to defaults
    let config = Config::load().unwrap_or_default();

    // Initialize logging; stdout is reserved for command output
    let filter = EnvFilter::try_new(config.log_filter(args.verbose))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Initialize metrics
    metrics::init_metrics();

    match args.command {
        Command::Inspect {
            ticker,
            save,
            no_save,
        } => {
            let save = match (save, no_save) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            cmd_inspect(ticker, save).await
        }
        Command::Simulate {
            ticker,
            trials,
            seed,
            json,
        } => cmd_simulate(ticker, trials, seed, json).await,
        Command::Sample {
            probs,
            trials,
            seed,
            json,
        } => cmd_sample(probs, trials, seed, json).await,
        Command::Event { event_ticker } => cmd_event(&event_ticker).await,
        Command::History { ticker } => cmd_history(&ticker),
        Command::CheckConfig => cmd_check_config(),
    }
}

/// Load and validate configuration.
fn load_config() -> anyhow::Result<Config> {
    let config = Config::load().map_err(AppError::from)?;
    config.validate().map_err(AppError::InvalidConfig)?;
    debug!(api_url = %config.kalshi_api_url, "Configuration loaded");
    Ok(config)
}

/// Use the given ticker or ask for one.
fn ticker_or_prompt(ticker: Option<String>) -> anyhow::Result<String> {
    let raw = match ticker {
        Some(t) => t,
        None => Input::<String>::new()
            .with_prompt("Enter Kalshi market ticker (e.g. KXGREENTERRITORY-29)")
            .interact_text()?,
    };

    let ticker = normalize_ticker(&raw);
    if ticker.is_empty() {
        anyhow::bail!("No ticker provided");
    }
    Ok(ticker)
}

/// Trial count from the flag, or the configured default.
fn resolve_trials(trials: Option<i64>, config: &Config) -> Result<u64, SimulationError> {
    match trials {
        Some(n) => u64::try_from(n).map_err(|_| SimulationError::InvalidTrialCount(n)),
        None => Ok(config.n_simulations),
    }
}

/// Message printed when a simulation cannot run.
fn skip_notice(reason: &impl fmt::Display) -> String {
    format!("Cannot simulate: {}\nSkipping simulation.", reason)
}

fn implied_or_none(market: &Market) -> String {
    estimate(&market.quote())
        .map(|p| p.to_string())
        .unwrap_or_else(|| "None".to_string())
}

fn print_report(rows: &[ConvergenceRow]) {
    println!(
        "{:<10} {:>10} {:>11} {:>11} {:>10}",
        "Outcome", "Analytic", "Simulated", "Deviation", "Std Err"
    );
    println!("{}", THIN_RULE);
    for row in rows {
        let se = row
            .standard_error
            .map(|se| format!("{:.5}", se))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<10} {:>10.4} {:>11.5} {:>+11.5} {:>10}{}",
            row.label,
            row.probability,
            row.frequency,
            row.deviation,
            se,
            if row.flagged { "  *" } else { "" }
        );
    }
    if rows.iter().any(|r| r.flagged) {
        println!("* deviation exceeds 3 standard errors");
    }
}

/// Show a market summary, or the markets of an event.
async fn cmd_inspect(ticker: Option<String>, save: Option<bool>) -> anyhow::Result<()> {
    let config = load_config()?;
    let ticker = ticker_or_prompt(ticker)?;
    let client = KalshiClient::new(&config)?;

    info!(ticker = %ticker, "Fetching market");
    let resolution =
        match resolve_ticker(&client, &ticker, config.search_limit, &config.search_status).await {
            Ok(resolution) => resolution,
            Err(e) if e.is_not_found() => {
                println!("No market or event found for {}", ticker);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

    match resolution {
        Resolution::Market(market) => {
            let summary = MarketSummary::from_market(&market);

            println!("{}", RULE);
            println!("MARKET SUMMARY");
            println!("{}", RULE);
            print!("{}", summary);
            println!("{}", RULE);

            let save = match save {
                Some(save) => save,
                None => Confirm::new()
                    .with_prompt("Save to CSV?")
                    .default(false)
                    .interact()?,
            };

            if save {
                let store = SnapshotStore::new(&config.market_csv_path);
                store.save(&summary, WriteMode::Append)?;
                println!("Saved to {}", store.path().display());
            }
        }
        Resolution::Event {
            event_ticker,
            markets,
        } => {
            println!(
                "{} is not a market. Event {} has {} market(s):",
                ticker,
                event_ticker,
                markets.len()
            );
            println!("{}", THIN_RULE);
            for market in &markets {
                println!(
                    "  {:<40} P(YES)={}  {}",
                    market.ticker,
                    implied_or_none(market),
                    market.title.as_deref().unwrap_or("")
                );
            }
            println!("{}", THIN_RULE);
            println!("Run again with one of the tickers above.");
        }
    }

    Ok(())
}

/// Estimate P(YES) from the order book and simulate outcomes.
async fn cmd_simulate(
    ticker: Option<String>,
    trials: Option<i64>,
    seed: Option<u64>,
    json: bool,
) -> anyhow::Result<()> {
    let config = load_config()?;
    let trials = match resolve_trials(trials, &config) {
        Ok(trials) => trials,
        Err(e) => {
            println!("{}", skip_notice(&e));
            return Ok(());
        }
    };
    let ticker = ticker_or_prompt(ticker)?;
    let seed = seed.or(config.sim_seed);

    let client = KalshiClient::new(&config)?;
    let book = client.get_orderbook(&ticker).await?;

    let outcome = tokio::task::spawn_blocking(move || {
        let mut rng = seeded_rng(seed);
        simulate_orderbook(&book, trials, &mut rng)
    })
    .await?;

    let simulation = match outcome {
        Ok(simulation) => simulation,
        Err(AppError::Pricing(e)) => {
            println!("{}", skip_notice(&e));
            return Ok(());
        }
        Err(AppError::Simulation(e)) => {
            println!("{}", skip_notice(&e));
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&simulation)?);
        return Ok(());
    }

    println!("{}", RULE);
    println!("MONTE CARLO: {}", simulation.ticker);
    println!("{}", RULE);
    println!(
        "YES bid / ask: {:?} / {:?}",
        simulation.quote.best_bid, simulation.quote.best_ask
    );
    println!(
        "Spread:         {}",
        simulation
            .quote
            .spread()
            .map(|s| format!("{}¢", s))
            .unwrap_or_else(|| "None".to_string())
    );
    println!(
        "Depth YES / NO: {} / {}",
        simulation.yes_depth, simulation.no_depth
    );
    println!("Implied P(YES): {}", simulation.p_yes);
    println!("Implied P(NO):  {:.4}", simulation.p_yes.complement());
    println!(
        "Trials:         {}{}",
        simulation.result.trials(),
        seed.map(|s| format!(" (seed {})", s)).unwrap_or_default()
    );
    println!("{}", THIN_RULE);
    print_report(&simulation.report());
    println!(
        "Simulated P(YES): {:.5}",
        simulation.frequency(Outcome::Yes)
    );
    println!("{}", RULE);

    Ok(())
}

/// Simulate an arbitrary probability vector.
async fn cmd_sample(
    probs: Vec<f64>,
    trials: Option<i64>,
    seed: Option<u64>,
    json: bool,
) -> anyhow::Result<()> {
    let config = load_config()?;
    let trials = trials.unwrap_or_else(|| i64::try_from(config.n_simulations).unwrap_or(i64::MAX));
    let seed = seed.or(config.sim_seed);

    let outcome = tokio::task::spawn_blocking(move || {
        let mut rng = seeded_rng(seed);
        let _timer = metrics::timer_simulation();
        simulate(&probs, trials, &mut rng).map(|result| (probs, result))
    })
    .await?;

    let (probs, result) = match outcome {
        Ok(ok) => ok,
        Err(e) => {
            println!("{}", skip_notice(&e));
            return Ok(());
        }
    };
    metrics::record_simulation(result.trials());

    let probabilities = ProbabilityVector::new(probs)?;
    let labels: Vec<String> = (0..probabilities.len()).map(|i| i.to_string()).collect();
    let report = convergence_report(&labels, &probabilities, &result);

    if json {
        let body = serde_json::json!({
            "probabilities": probabilities,
            "result": result,
            "report": report,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    println!("{}", RULE);
    println!("MONTE CARLO: {} categories, {} trials", result.categories(), result.trials());
    println!("{}", RULE);
    print_report(&report);
    println!(
        "Max |deviation|: {:.5}",
        result.max_abs_deviation(&probabilities)
    );
    println!("{}", RULE);

    Ok(())
}

/// List an event's markets with their implied probabilities.
async fn cmd_event(event_ticker: &str) -> anyhow::Result<()> {
    let config = load_config()?;
    let client = KalshiClient::new(&config)?;
    let event_ticker = normalize_ticker(event_ticker);

    let (event, markets) = client.get_event(&event_ticker).await?;

    println!("{}", RULE);
    println!("EVENT: {}", event.event_ticker);
    println!("{}", RULE);
    println!("Title:    {}", event.title.as_deref().unwrap_or("None"));
    println!("Category: {}", event.category.as_deref().unwrap_or("None"));
    println!("Markets:  {}", markets.len());
    println!("{}", THIN_RULE);
    for market in &markets {
        println!(
            "  {:<40} P(YES)={}  {}",
            market.ticker,
            implied_or_none(market),
            market.title.as_deref().unwrap_or("")
        );
    }
    println!("{}", RULE);

    Ok(())
}

/// Show the latest stored snapshot of a market.
fn cmd_history(ticker: &str) -> anyhow::Result<()> {
    let config = load_config()?;
    let store = SnapshotStore::new(&config.market_csv_path);
    let ticker = normalize_ticker(ticker);

    match store.latest(&ticker)? {
        Some(snapshot) => {
            println!("{}", RULE);
            println!("LATEST SNAPSHOT: {}", snapshot.ticker);
            println!("{}", RULE);
            println!("{:20}: {}", "Saved at", snapshot.timestamp);
            println!("{:20}: {}", "Title", snapshot.title.as_deref().unwrap_or("None"));
            println!("{:20}: {:?} / {:?}", "YES bid / ask", snapshot.yes_bid, snapshot.yes_ask);
            println!("{:20}: {:?} / {:?}", "NO bid / ask", snapshot.no_bid, snapshot.no_ask);
            println!(
                "{:20}: {}",
                "Implied P(YES)",
                snapshot
                    .implied_p_yes
                    .map(|p| format!("{:.4}", p))
                    .unwrap_or_else(|| "None".to_string())
            );
            println!("{}", RULE);
        }
        None => println!(
            "No snapshots for {} in {}",
            ticker,
            store.path().display()
        ),
    }

    Ok(())
}

/// Check configuration validity.
fn cmd_check_config() -> anyhow::Result<()> {
    println!("{}", RULE);
    println!("KALSHI MC - CONFIGURATION CHECK");
    println!("{}", RULE);

    // Load configuration
    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    // Validate configuration
    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("{}", THIN_RULE);
    println!("Configuration Summary:");
    println!("  API URL: {}", config.api_base());
    println!("  HTTP Timeout: {}s", config.http_timeout_secs);
    println!("  Trials: {}", config.n_simulations);
    println!(
        "  Seed: {}",
        config
            .sim_seed
            .map(|s| s.to_string())
            .unwrap_or_else(|| "entropy".to_string())
    );
    println!("  Snapshot CSV: {}", config.market_csv_path);
    println!(
        "  Event Search: limit {} status {}",
        config.search_limit, config.search_status
    );
    println!("{}", RULE);
    println!("CONFIGURATION CHECK PASSED");
    println!("{}", RULE);

    Ok(())
}
