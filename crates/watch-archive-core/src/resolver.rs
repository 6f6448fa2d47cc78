use tracing::{debug, info, warn};
use watch_archive_sources::{OmdbClient, TmdbClient};

/// Picks a single certification for a title from TMDB, falling back to OMDb.
///
/// Either provider may be missing (no API key configured). Provider errors
/// degrade to "no certification" for that provider only.
#[derive(Clone)]
pub struct RatingResolver {
    tmdb: Option<TmdbClient>,
    omdb: Option<OmdbClient>,
    regions: Vec<String>,
}

impl RatingResolver {
    pub fn new(tmdb: Option<TmdbClient>, omdb: Option<OmdbClient>, regions: Vec<String>) -> Self {
        if tmdb.is_none() {
            info!("TMDB API key not configured, certifications will come from OMDb only");
        }
        if omdb.is_none() {
            debug!("OMDb API key not configured, no certification fallback");
        }
        Self { tmdb, omdb, regions }
    }

    /// Empty string means unresolved.
    pub async fn resolve_rating(&self, external_id: &str) -> String {
        let external_id = external_id.trim();
        if external_id.is_empty() {
            return String::new();
        }

        let primary = self.from_tmdb(external_id).await;
        if !primary.is_empty() {
            return primary;
        }
        self.from_omdb(external_id).await
    }

    async fn from_tmdb(&self, imdb_id: &str) -> String {
        let Some(tmdb) = &self.tmdb else {
            return String::new();
        };
        match tmdb.certifications(imdb_id).await {
            Ok(map) => {
                let picked = map.resolve(&self.regions).unwrap_or_default().to_string();
                let regions: Vec<&str> = map.regions().collect();
                debug!(imdb_id, ?regions, certification = %picked, "TMDB certifications");
                picked
            }
            Err(err) => {
                warn!(imdb_id, error = %err, "TMDB lookup failed");
                String::new()
            }
        }
    }

    async fn from_omdb(&self, imdb_id: &str) -> String {
        let Some(omdb) = &self.omdb else {
            return String::new();
        };
        match omdb.rated(imdb_id).await {
            Ok(rated) => rated.unwrap_or_default(),
            Err(err) => {
                warn!(imdb_id, error = %err, "OMDb lookup failed");
                String::new()
            }
        }
    }
}
