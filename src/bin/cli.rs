//! stockwatch CLI
//!
//! Local entry point: runs the monitor loop, optionally with the dashboard
//! API, or performs one-off checks.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use stockwatch::{
    error::{AppError, Result},
    models::Config,
    pipeline::{RunSummary, Scheduler, state_channel},
    server,
    services::{HttpFetcher, ListingExtractor, PageFetcher, ProductExtractor},
};
use tokio::sync::watch;

/// stockwatch - catalog stock monitor
#[derive(Parser, Debug)]
#[command(
    name = "stockwatch",
    version,
    about = "Watches a catalog listing for new and restocked products"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "storage/config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Override the monitored listing URL
    #[arg(short, long)]
    url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the monitor and serve the dashboard API
    Run {
        /// Override the dashboard bind address
        #[arg(long)]
        bind: Option<String>,
    },

    /// Run the monitor with console output only
    Watch,

    /// Fetch the listing once and print in-stock products as JSON
    Check,

    /// Validate the configuration file
    Validate,
}

/// Initialize logging. `RUST_LOG` wins over `level`.
fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = Config::load(&cli.config);
    let level = match (&loaded, cli.verbose) {
        (_, true) => "debug".to_string(),
        (Ok(config), false) => config.logging.level.clone(),
        (Err(_), false) => "info".to_string(),
    };
    init_logging(&level);

    if let Command::Validate = cli.command {
        log::info!("Validating {}...", cli.config.display());
        let config = loaded?;
        if let Err(e) = config.validate() {
            log::error!("Config validation failed: {}", e);
            return Err(e);
        }
        log::info!("✓ Config OK");
        return Ok(());
    }

    let mut config = loaded.unwrap_or_else(|e| {
        log::warn!(
            "Config load failed from {}: {}. Using defaults.",
            cli.config.display(),
            e
        );
        Config::default()
    });
    if let Some(url) = cli.url {
        config.monitor.target_url = url;
    }
    if let Command::Run { bind: Some(bind) } = &cli.command {
        config.server.bind = bind.clone();
    }
    config.validate()?;

    match cli.command {
        Command::Run { .. } => {
            let summary = monitor(&config, true).await?;
            log_summary(&summary);
        }

        Command::Watch => {
            let summary = monitor(&config, false).await?;
            log_summary(&summary);
        }

        Command::Check => check(&config).await?,

        Command::Validate => {}
    }

    Ok(())
}

/// Run the monitor loop until Ctrl-C or a fatal error.
async fn monitor(config: &Config, with_server: bool) -> Result<RunSummary> {
    let fetcher = HttpFetcher::new(&config.fetcher)?;
    let extractor = ListingExtractor::new(&config.extractor, &config.monitor.target_url)?;
    let (publisher, reader) = state_channel();
    let scheduler = Scheduler::new(&config.monitor, fetcher, extractor, publisher);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let shutdown_tx = Arc::new(shutdown_tx);

    let signal_tx = Arc::clone(&shutdown_tx);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Ctrl-C received, shutting down...");
            signal_tx.send_replace(true);
        }
    });

    let dashboard = with_server.then(|| {
        let bind = config.server.bind.clone();
        let server_tx = Arc::clone(&shutdown_tx);
        let signal = shutdown_signal(shutdown_rx.clone());
        tokio::spawn(async move {
            let result = server::serve(&bind, reader, signal).await;
            if let Err(e) = &result {
                log::error!("Dashboard failed: {}", e);
                server_tx.send_replace(true);
            }
            result
        })
    });

    let outcome = tokio::spawn(scheduler.run(shutdown_signal(shutdown_rx)))
        .await
        .map_err(|e| AppError::resource(format!("monitor task failed: {e}")))?;
    shutdown_tx.send_replace(true);

    if let Some(dashboard) = dashboard {
        dashboard
            .await
            .map_err(|e| AppError::resource(format!("dashboard task failed: {e}")))??;
    }
    outcome
}

/// Resolves once `true` is sent or every sender is gone.
async fn shutdown_signal(mut rx: watch::Receiver<bool>) {
    let _ = rx.wait_for(|stop| *stop).await;
}

/// One fetch and extract, printing the in-stock products.
async fn check(config: &Config) -> Result<()> {
    let mut fetcher = HttpFetcher::new(&config.fetcher)?;
    let extractor = ListingExtractor::new(&config.extractor, &config.monitor.target_url)?;
    let url = &config.monitor.target_url;

    log::info!("Fetching {}...", url);
    let fetched = match tokio::time::timeout(config.monitor.fetch_timeout(), fetcher.fetch(url)).await {
        Ok(result) => result,
        Err(_) => Err(AppError::timeout(url, config.monitor.fetch_timeout_secs)),
    };
    fetcher.close().await?;

    let snapshot = extractor.extract(&fetched?)?;
    log::info!(
        "Found {} products, {} in stock",
        snapshot.len(),
        snapshot.in_stock_count()
    );
    println!("{}", serde_json::to_string_pretty(&snapshot.in_stock())?);
    Ok(())
}

fn log_summary(summary: &RunSummary) {
    log::info!(
        "Monitor stopped after {} cycles ({} failed, {} alerts)",
        summary.cycles,
        summary.failed_cycles,
        summary.alerts
    );
}
