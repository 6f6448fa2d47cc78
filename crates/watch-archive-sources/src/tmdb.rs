use crate::error::SourceError;
use crate::fetcher::ResilientFetcher;
use serde::Deserialize;
use tracing::debug;
use watch_archive_models::CertificationMap;

pub const TMDB_API_BASE: &str = "https://api.themoviedb.org/3";

#[derive(Debug, Deserialize)]
struct FindResponse {
    #[serde(default)]
    movie_results: Vec<FindResult>,
    #[serde(default)]
    tv_results: Vec<FindResult>,
}

#[derive(Debug, Deserialize)]
struct FindResult {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct ReleaseDatesResponse {
    #[serde(default)]
    results: Vec<RegionReleaseDates>,
}

#[derive(Debug, Deserialize)]
struct RegionReleaseDates {
    iso_3166_1: String,
    #[serde(default)]
    release_dates: Vec<ReleaseDate>,
}

#[derive(Debug, Deserialize)]
struct ReleaseDate {
    #[serde(default)]
    certification: String,
}

#[derive(Debug, Deserialize)]
struct ContentRatingsResponse {
    #[serde(default)]
    results: Vec<ContentRating>,
}

#[derive(Debug, Deserialize)]
struct ContentRating {
    iso_3166_1: String,
    #[serde(default)]
    rating: String,
}

/// What TMDB's find endpoint classified an IMDb ID as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TmdbMatch {
    Movie(u64),
    Series(u64),
}

/// TMDB v3 client for region certifications, keyed by IMDb ID.
#[derive(Clone)]
pub struct TmdbClient {
    fetcher: ResilientFetcher,
    api_key: String,
}

impl TmdbClient {
    pub fn new(fetcher: ResilientFetcher, api_key: impl Into<String>) -> Self {
        Self {
            fetcher,
            api_key: api_key.into(),
        }
    }

    fn url(&self, path: &str, extra_params: &str) -> String {
        let key = urlencoding::encode(&self.api_key);
        if extra_params.is_empty() {
            format!("{}{}?api_key={}", TMDB_API_BASE, path, key)
        } else {
            format!("{}{}?{}&api_key={}", TMDB_API_BASE, path, extra_params, key)
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, SourceError> {
        let page = self.fetcher.fetch(url).await?;
        page.json().map_err(|e| SourceError::json("tmdb", e))
    }

    /// Classify an IMDb ID. Movies are checked before series and only the
    /// first candidate of the winning list is used.
    pub async fn find_by_imdb_id(&self, imdb_id: &str) -> Result<Option<TmdbMatch>, SourceError> {
        let path = format!("/find/{}", urlencoding::encode(imdb_id));
        let found: FindResponse = self.get_json(&self.url(&path, "external_source=imdb_id")).await?;

        let matched = if let Some(movie) = found.movie_results.first() {
            Some(TmdbMatch::Movie(movie.id))
        } else {
            found.tv_results.first().map(|tv| TmdbMatch::Series(tv.id))
        };
        debug!(imdb_id, matched = ?matched, "TMDB find");
        Ok(matched)
    }

    /// Region -> certification from a movie's release dates (first release per region)
    pub async fn movie_certifications(&self, movie_id: u64) -> Result<CertificationMap, SourceError> {
        let path = format!("/movie/{}/release_dates", movie_id);
        let response: ReleaseDatesResponse = self.get_json(&self.url(&path, "")).await?;

        Ok(response
            .results
            .into_iter()
            .filter_map(|region| {
                let certification = region.release_dates.into_iter().next()?.certification;
                Some((region.iso_3166_1, certification))
            })
            .collect())
    }

    /// Region -> rating from a series' content ratings
    pub async fn series_certifications(&self, series_id: u64) -> Result<CertificationMap, SourceError> {
        let path = format!("/tv/{}/content_ratings", series_id);
        let response: ContentRatingsResponse = self.get_json(&self.url(&path, "")).await?;

        Ok(response
            .results
            .into_iter()
            .map(|r| (r.iso_3166_1, r.rating))
            .collect())
    }

    /// Find the title and fetch whichever certification list matches its kind.
    /// An unknown ID gives an empty map.
    pub async fn certifications(&self, imdb_id: &str) -> Result<CertificationMap, SourceError> {
        match self.find_by_imdb_id(imdb_id).await? {
            Some(TmdbMatch::Movie(id)) => self.movie_certifications(id).await,
            Some(TmdbMatch::Series(id)) => self.series_certifications(id).await,
            None => Ok(CertificationMap::new()),
        }
    }
}
