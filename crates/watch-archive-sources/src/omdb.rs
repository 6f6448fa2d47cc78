use crate::error::SourceError;
use crate::fetcher::ResilientFetcher;
use serde::Deserialize;

pub const OMDB_API_BASE: &str = "http://www.omdbapi.com/";

/// OMDb's placeholder for missing values
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Deserialize)]
struct OmdbTitle {
    #[serde(rename = "Rated", default)]
    rated: Option<String>,
}

/// OMDb lookup by IMDb ID; returns a single (US-centric) rating.
#[derive(Clone)]
pub struct OmdbClient {
    fetcher: ResilientFetcher,
    api_key: String,
}

impl OmdbClient {
    pub fn new(fetcher: ResilientFetcher, api_key: impl Into<String>) -> Self {
        Self {
            fetcher,
            api_key: api_key.into(),
        }
    }

    /// `None` when OMDb has no rating (missing field, empty, or "N/A")
    pub async fn rated(&self, imdb_id: &str) -> Result<Option<String>, SourceError> {
        let url = format!(
            "{}?i={}&apikey={}",
            OMDB_API_BASE,
            urlencoding::encode(imdb_id),
            urlencoding::encode(&self.api_key)
        );
        let page = self.fetcher.fetch(&url).await?;
        let title: OmdbTitle = page.json().map_err(|e| SourceError::json("omdb", e))?;

        Ok(title
            .rated
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty() && r != NOT_AVAILABLE))
    }
}
