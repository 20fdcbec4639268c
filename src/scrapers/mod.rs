//! Fetching and parsing of the game's webview news listings.
//!
//! Scraping happens in two steps:
//!
//! 1. **Fetching**: [`FetchPage::fetch`] downloads the raw listing page
//! 2. **Extraction**: [`webview::extract`] turns the HTML into ordered
//!    [`NewsEntry`](crate::models::NewsEntry) values
//!
//! Fetching sits behind a trait so the pipeline can be driven from canned
//! pages in tests. [`HttpFetcher`] is the real implementation.

pub mod webview;

use crate::error::Result;
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

/// Source of raw listing pages.
pub trait FetchPage {
    /// Download `url` and return its body bytes.
    ///
    /// A non-success HTTP status is an error.
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>>;
}

/// [`FetchPage`] over HTTP with a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl FetchPage for HttpFetcher {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>> {
        let response = self.client.get(url.clone()).send().await?.error_for_status()?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!(%status, bytes = body.len(), "Fetched listing page");
        Ok(body.to_vec())
    }
}
