//! News listing extractor for the FGO webview.
//!
//! The webview front page is a plain list of links:
//!
//! ```html
//! <ul class="list">
//!   <li>
//!     <a href="/news/123">
//!       <p class="date">2024-01-01</p>
//!       <p class="title">Campaign A</p>
//!     </a>
//!   </li>
//! </ul>
//! ```
//!
//! Gameplay tip articles share the listing but are not news, so any item
//! linking under `info/tips` is dropped. Missing markup is an error rather
//! than a silent skip: it means the page layout changed.
//!
//! Only `li` elements directly under the container are items; an `li` nested
//! inside an item belongs to that item and is not read as a separate entry.

use crate::error::{Error, Result};
use crate::models::NewsEntry;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument};
use url::Url;

/// Link targets containing this are tip articles, not news.
const TIPS_MARKER: &str = "info/tips";

static LIST_SELECTOR: Lazy<Selector> = Lazy::new(|| selector("ul.list"));
static LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| selector("a"));
static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| selector(".title"));
static DATE_SELECTOR: Lazy<Selector> = Lazy::new(|| selector(".date"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector must parse")
}

/// Extract news entries from a listing page, in document order.
///
/// # Arguments
///
/// * `page_url` - URL the page was fetched from, used to resolve links
/// * `html` - The page body
///
/// # Errors
///
/// [`Error::Structure`] if the `ul.list` container is missing or an item
/// lacks its link, `href`, title, or date. [`Error::Url`] if a link cannot
/// be resolved against `page_url`.
#[instrument(level = "info", skip_all, fields(%page_url))]
pub fn extract(page_url: &Url, html: &str) -> Result<Vec<NewsEntry>> {
    let document = Html::parse_document(html);
    let list = document
        .select(&LIST_SELECTOR)
        .next()
        .ok_or_else(|| Error::Structure("no `ul.list` news container".to_string()))?;

    let mut entries = Vec::new();
    let mut skipped = 0usize;
    for (index, item) in list
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "li")
        .enumerate()
    {
        let relative_url = item
            .select(&LINK_SELECTOR)
            .next()
            .ok_or_else(|| missing(index, "link"))?
            .value()
            .attr("href")
            .ok_or_else(|| missing(index, "link href"))?;

        if relative_url.contains(TIPS_MARKER) {
            debug!(index, relative_url, "Skipping tips article");
            skipped += 1;
            continue;
        }

        let title = text_of(item, &TITLE_SELECTOR).ok_or_else(|| missing(index, "title"))?;
        let date = text_of(item, &DATE_SELECTOR).ok_or_else(|| missing(index, "date"))?;
        let full_url = page_url.join(relative_url)?;

        entries.push(NewsEntry {
            title,
            date,
            relative_url: relative_url.to_string(),
            full_url: full_url.to_string(),
        });
    }

    info!(count = entries.len(), skipped, "Extracted news entries");
    Ok(entries)
}

/// All text under the first element matching `selector`, unmodified.
fn text_of(item: ElementRef<'_>, selector: &Selector) -> Option<String> {
    item.select(selector).next().map(|el| el.text().collect())
}

fn missing(index: usize, what: &str) -> Error {
    Error::Structure(format!("news item {index} has no {what}"))
}
