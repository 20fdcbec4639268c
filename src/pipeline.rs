//! Per-region run: fetch, extract, diff, notify, persist.
//!
//! Each region is independent. A run reads its own snapshot at the start and
//! writes the full current listing back at the end, whether or not anything
//! new was found. If a step fails the snapshot is left untouched, so entries
//! already announced in the failed run will be announced again next time.

use crate::config::WebhookConfig;
use crate::error::Result;
use crate::models::Region;
use crate::notify::{NotifyReport, SendWebhook, notify_new};
use crate::outputs::snapshot::SnapshotStore;
use crate::scrapers::{FetchPage, webview};
use std::time::Instant;
use tracing::{info, instrument};
use url::Url;

/// Everything a region run needs besides the region itself.
#[derive(Debug)]
pub struct Pipeline<'a, F, St, S> {
    pub fetcher: &'a F,
    pub store: &'a St,
    pub sender: &'a S,
    pub config: &'a WebhookConfig,
    /// Save the snapshot at the end of the run. Off for dry runs, so a
    /// preview never marks entries as already announced.
    pub persist: bool,
}

/// Outcome of a completed region run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionReport {
    pub region: Region,
    /// Entries on the current listing, after the tips filter.
    pub listed: usize,
    pub notify: NotifyReport,
}

impl<F, St, S> Pipeline<'_, F, St, S>
where
    F: FetchPage,
    St: SnapshotStore,
    S: SendWebhook,
{
    /// Run the full pipeline for `region`.
    ///
    /// # Errors
    ///
    /// Fetch, decode, extraction, and snapshot failures end the run before
    /// the snapshot is saved. Delivery failures do not; see [`notify_new`].
    #[instrument(level = "info", skip_all, fields(%region))]
    pub async fn run_region(&self, region: Region) -> Result<RegionReport> {
        let t0 = Instant::now();
        let page_url = Url::parse(region.webview_url())?;

        let body = self.fetcher.fetch(&page_url).await?;
        let html = String::from_utf8(body)?;
        let entries = webview::extract(&page_url, &html)?;

        let known = self.store.load(region).await?;
        let notify = notify_new(
            region,
            &known,
            &entries,
            &self.config.webhook_urls,
            self.sender,
        )
        .await;

        if self.persist {
            self.store.save(region, &entries).await?;
        } else {
            info!("Dry run; snapshot left unchanged");
        }

        info!(
            listed = entries.len(),
            new = notify.new_entries,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Region run complete"
        );
        Ok(RegionReport {
            region,
            listed: entries.len(),
            notify,
        })
    }
}
