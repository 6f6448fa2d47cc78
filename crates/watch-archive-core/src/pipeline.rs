use crate::assembler::RecordAssembler;
use crate::front_matter;
use crate::progress::{ProgressTracker, RecordOutcome, RunSummary};
use crate::resolver::RatingResolver;
use crate::sink::RecordSink;
use crate::title::record_key;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{info, warn};
use watch_archive_config::Config;
use watch_archive_models::{RecordKey, WatchEntry};
use watch_archive_sources::SourceFactory;

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Render records without touching the sink
    pub dry_run: bool,
    /// Pause after each entry
    pub record_delay: Duration,
    /// Log a progress line every N entries
    pub progress_interval: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            record_delay: Duration::from_secs(1),
            progress_interval: 25,
        }
    }
}

impl PipelineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            record_delay: config.pacing.record_delay(),
            ..Self::default()
        }
    }
}

/// Enriches watch entries one at a time and hands them to a sink.
///
/// Entries are processed strictly in order. The set of keys already seen
/// is the only state carried from one entry to the next.
pub struct ArchivePipeline<S: RecordSink> {
    assembler: RecordAssembler,
    sink: S,
    options: PipelineOptions,
    processed: HashSet<RecordKey>,
}

impl<S: RecordSink> ArchivePipeline<S> {
    pub fn new(assembler: RecordAssembler, sink: S, options: PipelineOptions) -> Self {
        Self {
            assembler,
            sink,
            options,
            processed: HashSet::new(),
        }
    }

    /// Wire extractor, resolver and assembler from configuration.
    pub fn from_factory(factory: &SourceFactory, config: &Config, sink: S, options: PipelineOptions) -> Self {
        let resolver = RatingResolver::new(factory.tmdb(), factory.omdb(), config.providers.regions.clone());
        let assembler = RecordAssembler::new(factory.detail_extractor(), resolver, config.output.theater.clone());
        Self::new(assembler, sink, options)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Process every entry. `on_outcome` sees `(position, total, outcome)`
    /// with a 1-based position, e.g. to drive a progress bar.
    pub async fn run<F>(&mut self, entries: &[WatchEntry], mut on_outcome: F) -> RunSummary
    where
        F: FnMut(usize, usize, &RecordOutcome),
    {
        let total = entries.len();
        let mut tracker = ProgressTracker::new(total, self.options.progress_interval);

        for (idx, entry) in entries.iter().enumerate() {
            let outcome = self.process(entry).await;
            tracker.record(&outcome);
            tracker.log_progress(idx + 1);
            on_outcome(idx + 1, total, &outcome);

            if !self.options.record_delay.is_zero() {
                tokio::time::sleep(self.options.record_delay).await;
            }
        }

        tracker.finish(if self.options.dry_run { "Dry run" } else { "Archive run" })
    }

    /// Enrich and persist one entry, unless its key was already handled.
    pub async fn process(&mut self, entry: &WatchEntry) -> RecordOutcome {
        let key = record_key(entry);

        if key.title().is_empty() {
            warn!(title = %entry.local_title, url = %entry.detail_url, "Entry has no usable title, not archiving");
            return RecordOutcome::Failed(key, "title is empty after sanitizing".to_string());
        }
        if !self.processed.insert(key.clone()) {
            info!(key = %key, "Skipped duplicate entry");
            return RecordOutcome::Skipped(key);
        }
        if self.sink.exists(&key) {
            info!(key = %key, "Skipped existing record");
            return RecordOutcome::Skipped(key);
        }

        let record = self.assembler.assemble(entry).await;

        if self.options.dry_run {
            return RecordOutcome::Rendered(key, front_matter::render(&record));
        }

        match self.sink.write(&key, &record) {
            Ok(()) => {
                info!(key = %key, certification = record.certification().unwrap_or("none"), "Generated record");
                RecordOutcome::Generated(key)
            }
            Err(err) => {
                warn!(key = %key, error = %err, "Failed to write record");
                RecordOutcome::Failed(key, err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{MarkdownSink, SinkError};
    use chrono::NaiveDate;
    use std::sync::Arc;
    use tempfile::TempDir;
    use watch_archive_models::ResolvedRecord;
    use watch_archive_sources::mock::ScriptedTransport;
    use watch_archive_sources::{DetailExtractor, ResilientFetcher};

    const DETAIL_PAGE: &str = r#"<html><body>
<h1><span property="v:itemreviewed">Apocalypse Now</span> <span class="year">(1979)</span></h1>
<div id="info"><span class="pl">IMDb:</span> tt0078788<br/></div>
</body></html>"#;

    fn options(dry_run: bool) -> PipelineOptions {
        PipelineOptions {
            dry_run,
            record_delay: Duration::ZERO,
            progress_interval: 10,
        }
    }

    fn assembler(transport: &Arc<ScriptedTransport>) -> RecordAssembler {
        let fetcher = ResilientFetcher::new(transport.clone(), 1, Duration::ZERO);
        let resolver = RatingResolver::new(None, None, vec!["US".to_string()]);
        RecordAssembler::new(DetailExtractor::new(fetcher), resolver, "Jellyfin")
    }

    fn entry(title: &str, day: u32) -> WatchEntry {
        WatchEntry::new(
            title,
            "https://movie.douban.com/subject/1292260/",
            NaiveDate::from_ymd_opt(2025, 7, day).unwrap(),
        )
    }

    fn transport() -> Arc<ScriptedTransport> {
        Arc::new(ScriptedTransport::new().route("movie.douban.com", 200, DETAIL_PAGE))
    }

    #[tokio::test]
    async fn test_run_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let transport = transport();
        let entries = vec![entry("现代启示录/Apocalypse Now", 19), entry("无名之辈", 18)];

        let mut first = ArchivePipeline::new(assembler(&transport), MarkdownSink::new(dir.path()), options(false));
        let summary = first.run(&entries, |_, _, _| {}).await;
        assert_eq!(summary.generated, 2);
        assert!(dir.path().join("现代启示录.ApocalypseNow.2025-07-19.md").exists());

        let fetches_before = transport.call_count();
        let mut second = ArchivePipeline::new(assembler(&transport), MarkdownSink::new(dir.path()), options(false));
        let summary = second.run(&entries, |_, _, _| {}).await;
        assert_eq!(summary.generated, 0);
        assert_eq!(summary.skipped, 2);
        // Existing records are skipped before any network access
        assert_eq!(transport.call_count(), fetches_before);
    }

    #[tokio::test]
    async fn test_duplicate_in_same_run_is_dropped() {
        let dir = TempDir::new().unwrap();
        let transport = transport();
        let entries = vec![entry("无名之辈", 18), entry("无名之辈", 18)];

        let mut pipeline = ArchivePipeline::new(assembler(&transport), MarkdownSink::new(dir.path()), options(true));
        let summary = pipeline.run(&entries, |_, _, _| {}).await;
        assert_eq!(summary.generated, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let transport = transport();
        let mut pipeline = ArchivePipeline::new(assembler(&transport), MarkdownSink::new(dir.path()), options(true));

        let mut rendered = Vec::new();
        let summary = pipeline
            .run(&[entry("现代启示录", 19)], |position, total, outcome| {
                assert_eq!((position, total), (1, 1));
                if let RecordOutcome::Rendered(_, text) = outcome {
                    rendered.push(text.clone());
                }
            })
            .await;

        assert_eq!(summary.generated, 1);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
        assert!(rendered[0].contains("imdb_id: \"tt0078788\""));
        assert!(rendered[0].contains("title: \"Apocalypse Now\""));
    }

    struct FailingSink;

    impl RecordSink for FailingSink {
        fn exists(&self, _key: &RecordKey) -> bool {
            false
        }

        fn write(&self, key: &RecordKey, _record: &ResolvedRecord) -> Result<(), SinkError> {
            Err(SinkError::Write {
                path: key.file_name().into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }
    }

    #[tokio::test]
    async fn test_sink_failure_does_not_abort_run() {
        let transport = transport();
        let mut pipeline = ArchivePipeline::new(assembler(&transport), FailingSink, options(false));
        let summary = pipeline.run(&[entry("a", 1), entry("b", 2)], |_, _, _| {}).await;
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.total, 2);
    }

    #[tokio::test]
    async fn test_title_of_only_tracker_noise_is_not_written() {
        let dir = TempDir::new().unwrap();
        let transport = transport();
        let mut pipeline = ArchivePipeline::new(assembler(&transport), MarkdownSink::new(dir.path()), options(false));

        let summary = pipeline.run(&[entry("看过", 19)], |_, _, _| {}).await;
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.generated, 0);
        assert!(!dir.path().join(".2025-07-19.md").exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
        assert_eq!(transport.call_count(), 0);
    }
}
