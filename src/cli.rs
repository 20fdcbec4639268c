//! Command-line interface definitions for the news relay.
//!
//! Every option has a default, so running with no arguments checks all
//! regions using `discord_webhook.json` and snapshots in the working
//! directory. Options can also be provided via environment variables.

use crate::models::Region;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the news relay.
///
/// # Examples
///
/// ```sh
/// # Check every region with the defaults
/// fgo_news_relay
///
/// # Only JP, with state kept elsewhere
/// fgo_news_relay --region jp --state-dir /var/lib/fgo_news_relay
///
/// # See what would be posted without posting it
/// fgo_news_relay --dry-run
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Webhook configuration file (JSON, or YAML by extension)
    #[arg(short, long, env = "FGO_NEWS_WEBHOOK_CONFIG", default_value = "discord_webhook.json")]
    pub config: PathBuf,

    /// Directory holding the per-region snapshot files
    #[arg(short, long, env = "FGO_NEWS_STATE_DIR", default_value = ".")]
    pub state_dir: PathBuf,

    /// Region to check; repeat for several. Defaults to every region
    #[arg(short, long = "region", value_enum, ignore_case = true)]
    pub regions: Vec<Region>,

    /// Log the messages that would be posted instead of posting them.
    /// Snapshots are left untouched, so a later real run still posts them
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    /// Regions to run, in processing order and without repeats.
    pub fn selected_regions(&self) -> Vec<Region> {
        if self.regions.is_empty() {
            return Region::ALL.to_vec();
        }
        Region::ALL
            .into_iter()
            .filter(|r| self.regions.contains(r))
            .collect()
    }
}
