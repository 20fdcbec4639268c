//! Data models for scraped news entries and the regions they come from.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Region`]: Which game server's webview a run targets
//! - [`NewsEntry`]: One item from a webview news listing
//!
//! A [`NewsEntry`] is serialized as-is into the per-region snapshot file, so
//! its field names are part of the on-disk format.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A game server region with its own webview listing and snapshot.
///
/// Regions share no state. [`Region::ALL`] fixes the order in which a
/// default run visits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
#[value(rename_all = "UPPER")]
pub enum Region {
    NA,
    JP,
}

impl Region {
    /// Every supported region, in processing order.
    pub const ALL: [Region; 2] = [Region::NA, Region::JP];

    /// The webview news listing for this region.
    pub fn webview_url(self) -> &'static str {
        match self {
            Region::NA => "https://webview.fate-go.us/",
            Region::JP => "https://webview.fate-go.jp/",
        }
    }

    /// File name of this region's snapshot inside the state directory.
    pub fn snapshot_file_name(self) -> String {
        format!("parsed_news_{self}.json")
    }

    /// Username shown on webhook messages for this region.
    pub fn display_name(self) -> String {
        format!("FGO {self} news")
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Region::NA => "NA",
            Region::JP => "JP",
        })
    }
}

/// A single news item from a webview listing.
///
/// `relative_url` is the identity of an entry: two entries with the same
/// `relative_url` are the same news item across runs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NewsEntry {
    /// Headline text as shown on the listing.
    pub title: String,
    /// Display date text, kept exactly as the page renders it.
    pub date: String,
    /// The `href` of the entry's link.
    pub relative_url: String,
    /// `relative_url` resolved against the listing page URL.
    pub full_url: String,
}

impl NewsEntry {
    /// Message text announcing this entry.
    pub fn message(&self) -> String {
        format!("{} {}\n{}", self.date, self.title, self.full_url)
    }
}
