//! Webhook target configuration.
//!
//! The configuration is a single object listing the webhook endpoints every
//! new entry is sent to:
//!
//! ```json
//! { "webhook_urls": ["https://discord.com/api/webhooks/..."] }
//! ```
//!
//! Files ending in `.yaml` or `.yml` are read as YAML with the same shape.
//! The file is loaded once per run and validated up front, so a bad endpoint
//! fails the run before any region is fetched.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, instrument};
use url::Url;

/// Destination endpoints for news notifications, in delivery order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WebhookConfig {
    pub webhook_urls: Vec<String>,
}

impl WebhookConfig {
    /// Parse configuration text, choosing the format from `path`'s extension.
    pub fn parse(path: &Path, text: &str) -> Result<Self> {
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml" | "yml")
        );
        let config: WebhookConfig = if is_yaml {
            serde_yaml::from_str(text).map_err(|e| config_error(path, e))?
        } else {
            serde_json::from_str(text).map_err(|e| config_error(path, e))?
        };
        config.validate(path)?;
        Ok(config)
    }

    /// Every endpoint must be an absolute `http` or `https` URL.
    fn validate(&self, path: &Path) -> Result<()> {
        for endpoint in &self.webhook_urls {
            let url = Url::parse(endpoint)
                .map_err(|e| config_error(path, format!("endpoint {endpoint:?}: {e}")))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(config_error(
                    path,
                    format!("endpoint {endpoint:?} is not an http(s) URL"),
                ));
            }
        }
        Ok(())
    }
}

/// Load and validate the webhook configuration at `path`.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load(path: &Path) -> Result<WebhookConfig> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| config_error(path, e))?;
    let config = WebhookConfig::parse(path, &text)?;
    info!(endpoints = config.webhook_urls.len(), "Loaded webhook configuration");
    Ok(config)
}

fn config_error(path: &Path, reason: impl std::fmt::Display) -> Error {
    Error::Config {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}
