use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fully enriched record, the unit of persistence.
///
/// Written once per [`RecordKey`] and never updated. Unresolved scalar fields
/// are empty strings so the rendered front matter always has every key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolvedRecord {
    pub title: String,
    pub year: String,
    pub watched_date: NaiveDate,
    pub theaters: Vec<String>,
    pub local_rating: String,
    /// Zero or one certification
    pub remark: Vec<String>,
    pub external_id: String,
    pub cover_url: String,
    pub detail_url: String,
}

impl ResolvedRecord {
    pub fn certification(&self) -> Option<&str> {
        self.remark.first().map(String::as_str)
    }
}

/// Storage identity of a record: sanitized local title plus watch date.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordKey {
    title: String,
    watched_date: NaiveDate,
}

impl RecordKey {
    /// `title` must already be path-safe; see the core crate's title policy.
    pub fn new(title: impl Into<String>, watched_date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            watched_date,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn watched_date(&self) -> NaiveDate {
        self.watched_date
    }

    pub fn file_name(&self) -> String {
        format!("{}.md", self)
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.title, self.watched_date.format("%Y-%m-%d"))
    }
}
