use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One "watched" event reported by the tracking site.
///
/// Entries are produced by the feed or collection readers and never modified
/// afterwards; enrichment happens on a separate [`crate::ResolvedRecord`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WatchEntry {
    pub local_title: String,
    /// Foreign/original title when the listing exposes one next to the local title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreign_title: Option<String>,
    pub detail_url: String,
    pub watched_date: NaiveDate,
    /// Tracker-native rating token (e.g. "5-t"), kept verbatim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_rating: Option<String>,
    /// Poster shown in the listing itself, used when the detail page has none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
}

impl WatchEntry {
    pub fn new(local_title: impl Into<String>, detail_url: impl Into<String>, watched_date: NaiveDate) -> Self {
        Self {
            local_title: local_title.into(),
            foreign_title: None,
            detail_url: detail_url.into(),
            watched_date,
            local_rating: None,
            cover_url: None,
        }
    }

    pub fn with_foreign_title(mut self, title: impl Into<String>) -> Self {
        let title = title.into();
        self.foreign_title = if title.trim().is_empty() { None } else { Some(title) };
        self
    }

    pub fn with_local_rating(mut self, rating: impl Into<String>) -> Self {
        let rating = rating.into();
        self.local_rating = if rating.is_empty() { None } else { Some(rating) };
        self
    }

    pub fn with_cover_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.cover_url = if url.trim().is_empty() { None } else { Some(url) };
        self
    }
}
