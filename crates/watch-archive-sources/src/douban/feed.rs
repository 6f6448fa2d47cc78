use super::{upgrade_cover_url, WATCHED_MARKER};
use crate::error::SourceError;
use crate::fetcher::ResilientFetcher;
use chrono::{DateTime, NaiveDate};
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use tracing::{debug, info, warn};
use watch_archive_models::WatchEntry;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<FeedItem>,
}

#[derive(Debug, Deserialize)]
struct FeedItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "pubDate", default)]
    pub_date: String,
}

fn foreign_title_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"title="([^"]+)""#).expect("title pattern is valid"))
}

fn cover_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"src="([^"]+)""#).expect("cover pattern is valid"))
}

/// The user's public RSS feed of recent activity.
pub struct DoubanFeed {
    fetcher: ResilientFetcher,
    url: String,
}

impl DoubanFeed {
    pub fn new(fetcher: ResilientFetcher, url: impl Into<String>) -> Self {
        Self {
            fetcher,
            url: url.into(),
        }
    }

    /// Fetch and parse the feed. A failure here aborts the run: without the
    /// feed there is nothing to process.
    pub async fn entries(&self) -> Result<Vec<WatchEntry>, SourceError> {
        let page = self.fetcher.fetch(&self.url).await?;
        let entries = parse_feed(page.text())?;
        info!("Read {} watched entries from feed", entries.len());
        Ok(entries)
    }
}

/// Parse RSS XML into watch entries, keeping only "watched" items.
pub fn parse_feed(xml: &str) -> Result<Vec<WatchEntry>, SourceError> {
    let rss: Rss = quick_xml::de::from_str(xml)?;
    let mut entries = Vec::new();

    for item in rss.channel.items {
        if !item.title.contains(WATCHED_MARKER) {
            debug!(title = %item.title, "Skipping feed item without watched marker");
            continue;
        }

        let local_title = item.title.replace(WATCHED_MARKER, "").trim().to_string();
        let Some(watched_date) = parse_pub_date(&item.pub_date) else {
            warn!(title = %local_title, pub_date = %item.pub_date, "Skipping feed item with unparsable date");
            continue;
        };

        let mut entry = WatchEntry::new(local_title, item.link.trim(), watched_date);
        if let Some(foreign) = foreign_title_pattern()
            .captures(&item.description)
            .and_then(|caps| caps.get(1))
        {
            entry = entry.with_foreign_title(foreign.as_str().trim());
        }
        if let Some(cover) = cover_pattern().captures(&item.description).and_then(|caps| caps.get(1)) {
            entry = entry.with_cover_url(upgrade_cover_url(cover.as_str().trim()));
        }
        entries.push(entry);
    }

    Ok(entries)
}

fn parse_pub_date(raw: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc2822(raw.trim()).ok().map(|dt| dt.date_naive())
}
