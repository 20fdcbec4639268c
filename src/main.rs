//! # FGO News Relay
//!
//! Watches the Fate/Grand Order webview news listings and relays entries
//! that were not there on the previous run to Discord webhooks.
//!
//! ## Usage
//!
//! ```sh
//! fgo_news_relay
//! ```
//!
//! ## Architecture
//!
//! Each region runs the same pipeline, one region after another:
//! 1. **Fetching**: Download the region's webview listing page
//! 2. **Extraction**: Parse news entries, dropping gameplay tips
//! 3. **Diffing**: Compare against the region's saved snapshot
//! 4. **Notifying**: Post each new entry to every configured webhook
//! 5. **Persisting**: Replace the snapshot with the current listing

use clap::Parser;
use reqwest::Client;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod models;
mod notify;
mod outputs;
mod pipeline;
mod scrapers;
mod utils;

use cli::Cli;
use models::Region;
use notify::{DiscordWebhook, DryRun, SendWebhook};
use outputs::snapshot::JsonFileStore;
use pipeline::Pipeline;
use scrapers::HttpFetcher;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("fgo_news_relay starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    // Configuration is shared by every region; a bad file stops the run here.
    let config = config::load(&args.config).await?;

    if let Err(e) = ensure_writable_dir(&args.state_dir).await {
        error!(
            path = %args.state_dir.display(),
            error = %e,
            "State directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let client = Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let fetcher = HttpFetcher::new(client.clone());
    let store = JsonFileStore::new(&args.state_dir);
    let regions = args.selected_regions();

    let failed = if args.dry_run {
        info!("Dry run: webhook messages will be logged, not posted, and snapshots are not saved");
        run_regions(&regions, &fetcher, &store, &DryRun, &config, false).await
    } else {
        let sender = DiscordWebhook::new(client);
        run_regions(&regions, &fetcher, &store, &sender, &config, true).await
    };

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        regions = regions.len(),
        failed = failed.len(),
        "Execution complete"
    );

    if failed.is_empty() {
        Ok(())
    } else {
        let names: Vec<String> = failed.iter().map(Region::to_string).collect();
        Err(format!("region run failed: {}", names.join(", ")).into())
    }
}

/// Run each region in order, returning the ones that failed.
///
/// Snapshots are only written when `persist` is set.
///
/// A failing region is logged and does not stop the regions after it.
async fn run_regions<S: SendWebhook>(
    regions: &[Region],
    fetcher: &HttpFetcher,
    store: &JsonFileStore,
    sender: &S,
    config: &config::WebhookConfig,
    persist: bool,
) -> Vec<Region> {
    let pipeline = Pipeline {
        fetcher,
        store,
        sender,
        config,
        persist,
    };

    let mut failed = Vec::new();
    for &region in regions {
        match pipeline.run_region(region).await {
            Ok(report) => info!(
                region = %report.region,
                listed = report.listed,
                new = report.notify.new_entries,
                delivered = report.notify.delivered,
                delivery_failures = report.notify.failed,
                "Region done"
            ),
            Err(e) => {
                error!(%region, error = %e, "Region run failed");
                failed.push(region);
            }
        }
    }
    failed
}
