//! Webhook delivery of newly observed news entries.
//!
//! # Architecture
//!
//! - [`SendWebhook`]: Core trait for posting one payload to one endpoint
//! - [`DiscordWebhook`]: Posts payloads to Discord-compatible webhooks
//! - [`DryRun`]: Logs payloads instead of sending them
//! - [`notify_new`]: Picks the new entries and fans each one out to every endpoint
//!
//! # Failure Policy
//!
//! Delivery is best-effort. A failed post is logged and counted, and the
//! remaining endpoints and entries are still attempted. Nothing is retried.

use crate::error::{Error, Result};
use crate::models::{NewsEntry, Region};
use crate::utils::{redact_endpoint, truncate_for_log};
use reqwest::Client;
use serde::Serialize;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, error, info, instrument};

/// Avatar shown on every relayed message.
pub const AVATAR_URL: &str = "https://i.imgur.com/hiTlEqA.png";

/// Body of one webhook post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookPayload {
    pub content: String,
    pub username: String,
    pub avatar_url: String,
}

impl WebhookPayload {
    /// Announcement of `entry` on behalf of `region`.
    pub fn for_entry(region: Region, entry: &NewsEntry) -> Self {
        Self {
            content: entry.message(),
            username: region.display_name(),
            avatar_url: AVATAR_URL.to_string(),
        }
    }
}

/// Trait for delivering a payload to a single webhook endpoint.
pub trait SendWebhook {
    /// Post `payload` to `endpoint`.
    ///
    /// # Returns
    ///
    /// `Ok(())` once the endpoint accepted the message.
    async fn send(&self, endpoint: &str, payload: &WebhookPayload) -> Result<()>;
}

/// [`SendWebhook`] for Discord webhooks.
///
/// The payload is sent form-encoded, which Discord accepts alongside JSON.
#[derive(Debug, Clone)]
pub struct DiscordWebhook {
    client: Client,
}

impl DiscordWebhook {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl SendWebhook for DiscordWebhook {
    #[instrument(level = "debug", skip_all)]
    async fn send(&self, endpoint: &str, payload: &WebhookPayload) -> Result<()> {
        let t0 = Instant::now();
        let response = self
            .client
            .post(endpoint)
            .form(payload)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Delivery {
                endpoint: redact_endpoint(endpoint),
                status,
                body: truncate_for_log(&body, 300),
            });
        }
        debug!(%status, elapsed_ms = t0.elapsed().as_millis() as u64, "Webhook accepted message");
        Ok(())
    }
}

/// [`SendWebhook`] that only logs what would have been sent.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRun;

impl SendWebhook for DryRun {
    async fn send(&self, endpoint: &str, payload: &WebhookPayload) -> Result<()> {
        info!(
            endpoint = %redact_endpoint(endpoint),
            username = %payload.username,
            content = %payload.content,
            "Dry run; not posting"
        );
        Ok(())
    }
}

/// Outcome of one [`notify_new`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotifyReport {
    /// Entries absent from the known set.
    pub new_entries: usize,
    /// Successful posts.
    pub delivered: usize,
    /// Failed posts.
    pub failed: usize,
}

/// Send every entry not in `known` to every endpoint.
///
/// Entries are visited in order and endpoints in configured order, giving
/// one post per new entry per endpoint. `known` is the set loaded at the start
/// of the run and is not updated as entries are sent.
///
/// # Arguments
///
/// * `region` - Region the entries came from, used for the sender name
/// * `known` - `relative_url`s already announced on a previous run
/// * `entries` - The freshly extracted listing
/// * `endpoints` - Webhook URLs to post to
/// * `sender` - Delivery implementation
#[instrument(level = "info", skip_all, fields(%region, endpoints = endpoints.len()))]
pub async fn notify_new<S: SendWebhook>(
    region: Region,
    known: &HashSet<String>,
    entries: &[NewsEntry],
    endpoints: &[String],
    sender: &S,
) -> NotifyReport {
    let mut report = NotifyReport::default();

    for entry in entries.iter().filter(|e| !known.contains(&e.relative_url)) {
        report.new_entries += 1;
        info!(relative_url = %entry.relative_url, title = %entry.title, "New entry");

        let payload = WebhookPayload::for_entry(region, entry);
        for (endpoint_index, endpoint) in endpoints.iter().enumerate() {
            match sender.send(endpoint, &payload).await {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    report.failed += 1;
                    error!(
                        relative_url = %entry.relative_url,
                        endpoint_index,
                        error = %e,
                        "Webhook delivery failed; continuing"
                    );
                }
            }
        }
    }

    info!(
        new = report.new_entries,
        delivered = report.delivered,
        failed = report.failed,
        "Notification pass complete"
    );
    report
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every send; fails for endpoints listed in `failing`.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingSender {
        pub sent: Mutex<Vec<(String, WebhookPayload)>>,
        pub failing: Vec<String>,
    }

    impl RecordingSender {
        pub(crate) fn calls(&self) -> Vec<(String, WebhookPayload)> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl SendWebhook for RecordingSender {
        async fn send(&self, endpoint: &str, payload: &WebhookPayload) -> Result<()> {
            self.sent
                .lock()
                .unwrap()
                .push((endpoint.to_string(), payload.clone()));
            if self.failing.iter().any(|f| f == endpoint) {
                return Err(Error::Structure(format!("refused by {endpoint}")));
            }
            Ok(())
        }
    }

    fn entry(relative_url: &str, title: &str) -> NewsEntry {
        NewsEntry {
            title: title.to_string(),
            date: "2024-01-01".to_string(),
            relative_url: relative_url.to_string(),
            full_url: format!("https://webview.fate-go.us{relative_url}"),
        }
    }

    fn endpoints(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("https://hooks.example/{i}")).collect()
    }

    #[test]
    fn test_payload_for_entry() {
        let payload = WebhookPayload::for_entry(Region::JP, &entry("/news/1", "Campaign"));
        assert_eq!(payload.username, "FGO JP news");
        assert_eq!(payload.avatar_url, AVATAR_URL);
        assert_eq!(
            payload.content,
            "2024-01-01 Campaign\nhttps://webview.fate-go.us/news/1"
        );
    }

    #[tokio::test]
    async fn test_only_new_entries_sent_to_each_endpoint() {
        let sender = RecordingSender::default();
        let known = HashSet::from(["/news/100".to_string()]);
        let entries = [entry("/news/100", "Old"), entry("/news/200", "New")];
        let targets = endpoints(3);

        let report = notify_new(Region::NA, &known, &entries, &targets, &sender).await;

        assert_eq!(
            report,
            NotifyReport {
                new_entries: 1,
                delivered: 3,
                failed: 0
            }
        );
        let calls = sender.calls();
        assert_eq!(calls.len(), 3);
        let sent_to: Vec<_> = calls.iter().map(|(e, _)| e.clone()).collect();
        assert_eq!(sent_to, targets);
        assert!(calls.iter().all(|(_, p)| p.content.contains("/news/200")));
    }

    #[tokio::test]
    async fn test_order_is_entries_then_endpoints() {
        let sender = RecordingSender::default();
        let entries = [entry("/news/1", "A"), entry("/news/2", "B")];
        let targets = endpoints(2);

        notify_new(Region::NA, &HashSet::new(), &entries, &targets, &sender).await;

        let order: Vec<_> = sender
            .calls()
            .into_iter()
            .map(|(endpoint, p)| (endpoint, p.content.lines().next().unwrap().to_string()))
            .collect();
        assert_eq!(
            order,
            vec![
                (targets[0].clone(), "2024-01-01 A".to_string()),
                (targets[1].clone(), "2024-01-01 A".to_string()),
                (targets[0].clone(), "2024-01-01 B".to_string()),
                (targets[1].clone(), "2024-01-01 B".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_zero_endpoints_sends_nothing() {
        let sender = RecordingSender::default();
        let entries = [entry("/news/1", "A"), entry("/news/2", "B")];

        let report = notify_new(Region::JP, &HashSet::new(), &entries, &[], &sender).await;

        assert_eq!(report.new_entries, 2);
        assert_eq!(report.delivered, 0);
        assert!(sender.calls().is_empty());
    }

    #[tokio::test]
    async fn test_duplicates_within_listing_both_count_as_new() {
        let sender = RecordingSender::default();
        let entries = [entry("/news/1", "A"), entry("/news/1", "A")];

        let report = notify_new(Region::NA, &HashSet::new(), &entries, &endpoints(1), &sender).await;

        assert_eq!(report.new_entries, 2);
        assert_eq!(sender.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_endpoint_does_not_stop_others() {
        let targets = endpoints(2);
        let sender = RecordingSender {
            failing: vec![targets[0].clone()],
            ..Default::default()
        };
        let entries = [entry("/news/1", "A"), entry("/news/2", "B")];

        let report = notify_new(Region::NA, &HashSet::new(), &entries, &targets, &sender).await;

        assert_eq!(sender.calls().len(), 4);
        assert_eq!(report.delivered, 2);
        assert_eq!(report.failed, 2);
    }

    #[tokio::test]
    async fn test_dry_run_succeeds() {
        let payload = WebhookPayload::for_entry(Region::NA, &entry("/news/1", "A"));
        assert!(DryRun.send("https://hooks.example/0", &payload).await.is_ok());
    }
}
