//! CLI Command Handlers
//!
//! `serve` runs the HTTP API; `value` values one wallet and prints the result.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use crate::adapters::helius::HeliusClient;
use crate::adapters::http::{router, AppState};
use crate::adapters::price_feed::HttpPriceProvider;
use crate::application::{ValuationService, WalletValuation};
use crate::config::{default_config, load_config, Config};

/// Meme Tracker - USD valuation of Solana wallet token holdings
#[derive(Parser, Debug)]
#[command(
    name = "meme-tracker",
    version = env!("CARGO_PKG_VERSION"),
    about = "USD valuation of Solana wallet token holdings",
    long_about = "Meme Tracker lists a wallet's fungible tokens, prices them in \
                  rate-limited batches and returns the holdings above a USD floor."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file (defaults and environment only when omitted)
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP API
    Serve(ServeCmd),

    /// Value a single wallet and print the result
    Value(ValueCmd),
}

/// Start the HTTP API
#[derive(Parser, Debug)]
pub struct ServeCmd {
    /// Override the configured port
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,
}

/// Value one wallet
#[derive(Parser, Debug)]
pub struct ValueCmd {
    /// Wallet address
    #[arg(value_name = "WALLET")]
    pub wallet: String,

    /// Print a table with prices and USD values instead of JSON
    #[arg(short, long)]
    pub detailed: bool,

    /// Override the USD floor
    #[arg(long, value_name = "USD")]
    pub min_usd: Option<f64>,

    /// Return at most this many holdings
    #[arg(short, long, value_name = "N")]
    pub limit: Option<usize>,
}

/// Execute the CLI command
pub async fn execute(app: CliApp) -> Result<()> {
    let config = match app.config {
        Some(ref path) => {
            let path = shellexpand::tilde(&path.to_string_lossy()).to_string();
            load_config(&path).with_context(|| format!("Failed to load configuration from {}", path))?
        }
        None => default_config().context("Invalid configuration")?,
    };

    init_logging(app.verbose, app.debug, &config.logging.level)?;

    match app.command {
        Command::Serve(cmd) => serve_command(cmd, config).await,
        Command::Value(cmd) => value_command(cmd, config).await,
    }
}

/// Initialize logging system
///
/// `RUST_LOG` wins when set; otherwise the flags, then the configured level.
fn init_logging(verbose: bool, debug: bool, configured: &str) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        configured
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Wire the Helius balance client and configured price feed into a service
pub fn build_service(config: &Config) -> Result<ValuationService> {
    if config.balances.api_key.is_empty() {
        tracing::warn!("No Helius API key configured (set HELIUS_API_KEY)");
    }

    let balances = HeliusClient::new(config.helius_config())
        .context("Failed to create Helius client")?;
    let prices = HttpPriceProvider::new(config.price_feed_config())
        .context("Failed to create price feed client")?;

    Ok(ValuationService::new(
        Arc::new(balances),
        Arc::new(prices),
        config.fetcher_config(),
        config.pipeline_settings(),
    ))
}

/// Handle serve command
async fn serve_command(cmd: ServeCmd, mut config: Config) -> Result<()> {
    if let Some(port) = cmd.port {
        config.server.port = port;
    }

    let service = build_service(&config)?;
    let app = router(Arc::new(AppState { service }));

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    tracing::info!(
        "Meme Tracker API listening on {} (prices from {})",
        address,
        config.prices.source
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Shutdown signal received");
        })
        .await
        .context("HTTP server failed")?;

    tracing::info!("Meme Tracker stopped");
    Ok(())
}

/// Handle value command
async fn value_command(cmd: ValueCmd, config: Config) -> Result<()> {
    let service = build_service(&config)?;

    let mut policy = config.policy();
    if let Some(min_usd) = cmd.min_usd {
        anyhow::ensure!(min_usd.is_finite() && min_usd >= 0.0, "--min-usd must be >= 0");
        policy = policy.with_min_usd_value(min_usd);
    }
    if let Some(limit) = cmd.limit {
        anyhow::ensure!(limit > 0, "--limit must be at least 1");
        policy = policy.with_max_results(Some(limit));
    }

    let valuation = service.value_wallet_detailed(&cmd.wallet, &policy).await?;

    if cmd.detailed {
        print!("{}", render_table(&valuation));
    } else {
        println!("{}", serde_json::to_string_pretty(&valuation.into_response())?);
    }

    Ok(())
}

/// Text table of a valuation, followed by fetch diagnostics
pub fn render_table(valuation: &WalletValuation) -> String {
    let mut out = String::new();
    out.push_str(&format!("Wallet: {}\n", valuation.wallet));
    out.push_str(&format!(
        "{:<46} {:<10} {:>18} {:>16} {:>14}\n",
        "TOKEN", "SYMBOL", "AMOUNT", "PRICE (USD)", "VALUE (USD)"
    ));

    for valued in &valuation.ranked {
        let price = valued.price.as_ref().map(|p| p.price).unwrap_or(0.0);
        out.push_str(&format!(
            "{:<46} {:<10} {:>18.6} {:>16.8} {:>14.2}\n",
            valued.holding.token_address,
            valued.symbol().unwrap_or("-"),
            valued.holding.ui_amount(),
            price,
            valued.usd_value
        ));
    }

    let report = &valuation.report;
    out.push_str(&format!(
        "\n{} of {} holdings shown, total ${:.2}\n",
        valuation.ranked.len(),
        valuation.holdings_found,
        valuation.total_usd_value()
    ));
    out.push_str(&format!(
        "Batches: {} planned, {} fetched, {} failed, {} skipped{}\n",
        report.batches_planned,
        report.batches_attempted,
        report.batches_failed,
        report.batches_skipped,
        if report.early_stopped { " (early stop)" } else { "" }
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::FetchReport;
    use crate::domain::{Holding, PriceInfo, ValuedHolding};

    #[test]
    fn test_parse_value_command() {
        let app = CliApp::try_parse_from([
            "meme-tracker", "--debug", "value", "Wallet111", "--detailed", "--min-usd", "5", "-l", "3",
        ])
        .unwrap();

        assert!(app.debug);
        match app.command {
            Command::Value(cmd) => {
                assert_eq!(cmd.wallet, "Wallet111");
                assert!(cmd.detailed);
                assert_eq!(cmd.min_usd, Some(5.0));
                assert_eq!(cmd.limit, Some(3));
            }
            other => panic!("expected value command, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_serve_with_global_config() {
        let app = CliApp::try_parse_from(["meme-tracker", "serve", "--config", "cfg.toml", "-p", "8080"])
            .unwrap();

        assert_eq!(app.config, Some(PathBuf::from("cfg.toml")));
        assert!(matches!(app.command, Command::Serve(ServeCmd { port: Some(8080) })));
    }

    #[test]
    fn test_value_requires_wallet() {
        assert!(CliApp::try_parse_from(["meme-tracker", "value"]).is_err());
    }

    #[test]
    fn test_render_table() {
        let holding = Holding::new("DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263", 1_000_000.0, 5).unwrap();
        let price = PriceInfo::new(0.00002).unwrap().with_metadata(None, Some("Bonk".into()), None);
        let valuation = WalletValuation {
            wallet: "Wallet111".to_string(),
            holdings_found: 3,
            ranked: vec![ValuedHolding {
                holding,
                price: Some(price),
                usd_value: 20.0,
            }],
            report: FetchReport {
                batches_planned: 2,
                batches_attempted: 1,
                batches_skipped: 1,
                early_stopped: true,
                ..Default::default()
            },
        };

        let table = render_table(&valuation);
        assert!(table.contains("Bonk"));
        assert!(table.contains("20.00"));
        assert!(table.contains("1 of 3 holdings shown, total $20.00"));
        assert!(table.contains("2 planned, 1 fetched, 0 failed, 1 skipped (early stop)"));
    }
}
