//! Builds every configured client from one [`Config`].
//!
//! Missing credentials disable the matching client (`None`) instead of
//! failing; only the watch-history input the user asked for is required.

use crate::douban::{DetailExtractor, DoubanCollection, DoubanFeed};
use crate::error::SourceError;
use crate::fetcher::ResilientFetcher;
use crate::http::{ReqwestTransport, Transport};
use crate::omdb::OmdbClient;
use crate::tmdb::TmdbClient;
use std::sync::Arc;
use tracing::debug;
use watch_archive_config::Config;

pub struct SourceFactory {
    config: Config,
    /// Douban requests carry the session cookie
    douban: ResilientFetcher,
    /// Provider APIs never see the cookie
    api: ResilientFetcher,
}

impl SourceFactory {
    pub fn new(config: &Config) -> Result<Self, SourceError> {
        let douban: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(&config.fetch, config.cookie())?);
        let api: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(&config.fetch, None)?);
        debug!(cookie = config.cookie().is_some(), "HTTP transports ready");
        Ok(Self::with_transports(config, douban, api))
    }

    /// Same wiring over caller-supplied transports
    pub fn with_transports(config: &Config, douban: Arc<dyn Transport>, api: Arc<dyn Transport>) -> Self {
        Self {
            config: config.clone(),
            douban: ResilientFetcher::from_config(douban, &config.fetch),
            api: ResilientFetcher::from_config(api, &config.fetch),
        }
    }

    pub fn feed(&self) -> Result<DoubanFeed, SourceError> {
        let url = self.config.rss_url().ok_or(SourceError::NotConfigured("douban.rss_url"))?;
        Ok(DoubanFeed::new(self.douban.clone(), url))
    }

    pub fn collection(&self) -> Result<DoubanCollection, SourceError> {
        let user_id = self.config.user_id().ok_or(SourceError::NotConfigured("douban.user_id"))?;
        Ok(DoubanCollection::new(
            self.douban.clone(),
            user_id,
            self.config.pacing.page_delay(),
        ))
    }

    pub fn detail_extractor(&self) -> DetailExtractor {
        DetailExtractor::new(self.douban.clone())
    }

    pub fn tmdb(&self) -> Option<TmdbClient> {
        self.config
            .tmdb_api_key()
            .map(|key| TmdbClient::new(self.api.clone(), key))
    }

    pub fn omdb(&self) -> Option<OmdbClient> {
        self.config
            .omdb_api_key()
            .map(|key| OmdbClient::new(self.api.clone(), key))
    }
}
