use serde::{Deserialize, Serialize};

/// Fields scraped from a title's detail page.
///
/// Every field is independent: a page with a broken info block still yields
/// its title and cover. Missing values stay empty/`None` rather than failing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DetailRecord {
    pub original_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    /// IMDb identifier (`tt` followed by 7-8 digits)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

impl DetailRecord {
    pub fn is_empty(&self) -> bool {
        self.original_title.is_empty()
            && self.year.is_none()
            && self.cover_url.is_none()
            && self.external_id.is_none()
    }

    pub fn external_id(&self) -> &str {
        self.external_id.as_deref().unwrap_or("")
    }
}
