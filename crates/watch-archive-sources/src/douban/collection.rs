use super::{
    COLLECTION_DATE_CLASS, COLLECTION_ITEM_CLASS, COLLECTION_RATING_PREFIX, COLLECTION_TITLE_CLASS,
    COLLECTION_URL_BASE, NO_MORE_CONTENT_MARKER,
};
use crate::error::SourceError;
use crate::fetcher::ResilientFetcher;
use crate::markup::{text_of, AttrFilter, Query};
use chrono::NaiveDate;
use scraper::{ElementRef, Html};
use std::time::Duration;
use tracing::{debug, info, warn};
use watch_archive_models::WatchEntry;

/// One parsed page of the "watched" collection.
#[derive(Debug, Clone, Default)]
pub struct CollectionPage {
    pub entries: Vec<WatchEntry>,
    /// Items seen on the page, including ones dropped for missing data
    pub item_count: usize,
    /// Page carries the end-of-list marker
    pub exhausted: bool,
}

/// Paginated HTML listing of everything the user has marked as watched.
pub struct DoubanCollection {
    fetcher: ResilientFetcher,
    user_id: String,
    base_url: String,
    page_delay: Duration,
}

impl DoubanCollection {
    pub fn new(fetcher: ResilientFetcher, user_id: impl Into<String>, page_delay: Duration) -> Self {
        Self {
            fetcher,
            user_id: user_id.into(),
            base_url: COLLECTION_URL_BASE.to_string(),
            page_delay,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn page_url(&self, start: usize) -> String {
        format!(
            "{}/{}/collect?start={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&self.user_id),
            start
        )
    }

    /// Walk every page until the listing runs out.
    ///
    /// Only a failed first page is an error; a later failure ends pagination
    /// with what has been collected so far.
    pub async fn entries(&self) -> Result<Vec<WatchEntry>, SourceError> {
        let mut all = Vec::new();
        let mut start = 0;

        loop {
            let url = self.page_url(start);
            let page = match self.fetcher.fetch(&url).await {
                Ok(page) => parse_collection_page(page.text()),
                Err(err) if start == 0 => return Err(err.into()),
                Err(err) => {
                    warn!(start, error = %err, "Collection page unavailable, stopping pagination");
                    break;
                }
            };

            if page.item_count == 0 {
                debug!(start, "Collection page has no items");
                break;
            }

            info!("Fetched {} collection items (start={})", page.item_count, start);
            start += page.item_count;
            all.extend(page.entries);

            if page.exhausted {
                break;
            }

            if !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }
        }

        info!("Read {} watched entries from collection", all.len());
        Ok(all)
    }
}

/// Parse a collection page. Items without a link or a watch date are dropped.
pub fn parse_collection_page(html: &str) -> CollectionPage {
    let doc = Html::parse_document(html);
    let items = doc.find_all("div", &[AttrFilter::Class(COLLECTION_ITEM_CLASS)]);

    let entries = items.iter().filter_map(|item| parse_item(*item)).collect();

    CollectionPage {
        entries,
        item_count: items.len(),
        exhausted: html.contains(NO_MORE_CONTENT_MARKER),
    }
}

fn parse_item(item: ElementRef<'_>) -> Option<WatchEntry> {
    let link = item
        .find_first("li", &[AttrFilter::Class(COLLECTION_TITLE_CLASS)])
        .and_then(|li| li.find_first("a", &[]).map(|a| (text_of(a), a.value().attr("href").map(str::to_string))));

    let Some((raw_title, Some(href))) = link else {
        debug!("Skipping collection item without title link");
        return None;
    };
    let (local_title, foreign_title) = split_listing_title(&raw_title);

    let date_text = item
        .find_first("span", &[AttrFilter::Class(COLLECTION_DATE_CLASS)])
        .map(text_of)
        .unwrap_or_default();
    let Ok(watched_date) = NaiveDate::parse_from_str(date_text.trim(), "%Y-%m-%d") else {
        debug!(title = %local_title, date = %date_text.trim(), "Skipping collection item without watch date");
        return None;
    };

    let mut entry = WatchEntry::new(local_title, href.trim(), watched_date);
    if let Some(foreign) = foreign_title {
        entry = entry.with_foreign_title(foreign);
    }
    if let Some(rating) = local_rating(item) {
        entry = entry.with_local_rating(rating);
    }
    Some(entry)
}

/// `rating5-t` -> `5-t`
fn local_rating(item: ElementRef<'_>) -> Option<String> {
    let span = item.find_first("span", &[AttrFilter::ClassPrefix(COLLECTION_RATING_PREFIX)])?;
    span.value()
        .classes()
        .find_map(|class| class.strip_prefix(COLLECTION_RATING_PREFIX))
        .filter(|rating| !rating.is_empty())
        .map(str::to_string)
}

/// Split a listing title ("现代启示录 / Apocalypse Now\n / 当代启示录") into the
/// local title (first segment, all whitespace removed) and the foreign title
/// (second segment, if any).
pub fn split_listing_title(raw: &str) -> (String, Option<String>) {
    let mut parts = raw.split('/').map(str::trim);
    let local: String = parts
        .next()
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let foreign = parts
        .next()
        .map(|p| p.replace('\n', "").trim().to_string())
        .filter(|p| !p.is_empty());
    (local, foreign)
}
