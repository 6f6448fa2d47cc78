use crate::resolver::RatingResolver;
use crate::title::display_title;
use tracing::debug;
use watch_archive_models::{ResolvedRecord, WatchEntry};
use watch_archive_sources::DetailExtractor;

/// Turns a watch entry into a publishable record: detail page first, then
/// certification lookup, then the merge.
#[derive(Clone)]
pub struct RecordAssembler {
    extractor: DetailExtractor,
    resolver: RatingResolver,
    theater: String,
}

impl RecordAssembler {
    pub fn new(extractor: DetailExtractor, resolver: RatingResolver, theater: impl Into<String>) -> Self {
        Self {
            extractor,
            resolver,
            theater: theater.into(),
        }
    }

    pub async fn assemble(&self, entry: &WatchEntry) -> ResolvedRecord {
        let detail = self.extractor.extract_details(&entry.detail_url).await;
        let certification = self.resolver.resolve_rating(detail.external_id()).await;
        debug!(
            title = %entry.local_title,
            imdb_id = detail.external_id(),
            certification = %certification,
            "Assembled record"
        );

        ResolvedRecord {
            title: display_title(entry, &detail),
            year: detail.year.clone().unwrap_or_default(),
            watched_date: entry.watched_date,
            theaters: vec![self.theater.clone()],
            local_rating: entry.local_rating.clone().unwrap_or_default(),
            remark: if certification.is_empty() { Vec::new() } else { vec![certification] },
            external_id: detail.external_id().to_string(),
            cover_url: detail.cover_url.or_else(|| entry.cover_url.clone()).unwrap_or_default(),
            detail_url: entry.detail_url.clone(),
        }
    }
}
