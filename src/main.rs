use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use genstore::catalog::{CatalogSource, HttpCatalogSource};
use genstore::config::{Config, LoggingConfig};
use genstore::notify::{LogNotifier, PriceNotifier, WebhookConfig, WebhookNotifier};
use genstore::pricing::sample_catalog;
use genstore::scheduler::Scheduler;

#[derive(Parser)]
#[command(
    name = "genstore",
    version,
    about = "Rotating general-store price service with tiered catalog sampling",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// Config file path (TOML); environment variables are used when absent
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the store service until interrupted
    Run,

    /// Fetch the catalog, sample a stocked set once, and print it as JSON
    Sample {
        /// Compact output instead of pretty-printed JSON
        #[arg(long, default_value = "false")]
        compact: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    config.validate()?;

    setup_tracing(&config.logging, cli.verbose, cli.log_format.as_deref())?;

    match cli.command {
        Commands::Run => {
            tracing::info!("genstore starting");
            run(config).await?;
        }

        Commands::Sample { compact } => {
            tracing::info!(compact = %compact, "Starting sample command");
            sample(config, compact).await?;
        }
    }

    Ok(())
}

fn setup_tracing(logging: &LoggingConfig, verbose: bool, format_override: Option<&str>) -> Result<()> {
    let directives = if verbose {
        String::from("genstore=debug,info")
    } else {
        format!("genstore={},warn", logging.level)
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(directives));

    match format_override.unwrap_or(&logging.format) {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

fn build_catalog(config: &Config) -> Result<Arc<HttpCatalogSource>> {
    Ok(Arc::new(HttpCatalogSource::with_config(
        config.store.items_url.clone(),
        config.tier_config()?,
        config.fetcher_config(),
    )?))
}

fn build_notifier(config: &Config) -> Result<Arc<dyn PriceNotifier>> {
    match &config.notify.webhook_url {
        Some(url) => {
            let mut webhook = WebhookConfig::new(url.clone());
            if let Some(token) = &config.notify.webhook_token {
                webhook = webhook.with_auth_token(token.clone());
            }
            tracing::info!(url = %url, "publishing updates via webhook");
            Ok(Arc::new(WebhookNotifier::new(webhook)?))
        }
        None => {
            tracing::info!("no webhook configured, publishing updates to the log");
            Ok(Arc::new(LogNotifier))
        }
    }
}

async fn run(config: Config) -> Result<()> {
    let catalog = build_catalog(&config)?;
    let notifier = build_notifier(&config)?;
    let scheduler = Scheduler::new(catalog, notifier, config.scheduler.clone())?;

    let jobs_path = config.scheduler.jobs_path.clone();
    let prices_path = config.scheduler.prices_path.clone();
    for path in [&jobs_path, &prices_path] {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
    }

    scheduler.load_all(&jobs_path, &prices_path).await?;

    let status = scheduler.status().await;
    tracing::info!(
        jobs = status.job_count,
        items = ?status.item_count,
        next_item_reroll = ?status.next_item_reroll,
        "genstore running, press Ctrl-C to stop"
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received");

    // Persist before the sweep; the sweep drops paused jobs from the
    // collection, so records must be on disk first.
    scheduler.save_all(&jobs_path, &prices_path).await?;
    scheduler.stop_all_jobs().await;

    tracing::info!("genstore stopped");
    Ok(())
}

async fn sample(config: Config, compact: bool) -> Result<()> {
    let catalog = build_catalog(&config)?;
    let entries = catalog.fetch().await?;

    let prices = {
        let mut rng = rand::thread_rng();
        sample_catalog(&entries, catalog.tiering(), &mut rng)
    };

    if !prices.has_unique_names() {
        tracing::warn!("sampled stock contains a name in more than one tier");
    }

    let output = if compact {
        serde_json::to_string(&prices)?
    } else {
        prices.to_json()?
    };
    println!("{output}");

    Ok(())
}
