use super::progress_ui::ArchiveUI;
use crate::output::{Output, OutputFormat};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use std::path::PathBuf;
use tracing::info;
use watch_archive_config::Config;
use watch_archive_core::{ArchivePipeline, MarkdownSink, PipelineOptions};
use watch_archive_sources::{DoubanCollection, DoubanFeed, SourceFactory};

/// Which watch-history input to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryInput {
    Feed,
    Collection,
}

impl HistoryInput {
    fn label(self) -> &'static str {
        match self {
            Self::Feed => "RSS feed",
            Self::Collection => "collection pages",
        }
    }
}

enum Reader {
    Feed(DoubanFeed),
    Collection(DoubanCollection),
}

pub async fn run_archive(
    input: HistoryInput,
    mut config: Config,
    content_dir: Option<PathBuf>,
    dry_run: bool,
    output: &Output,
) -> Result<()> {
    if let Some(dir) = content_dir {
        config.output.content_dir = dir;
    }

    let factory = SourceFactory::new(&config).wrap_err("Failed to set up HTTP clients")?;
    // Fail on missing input settings before any progress output starts
    let reader = match input {
        HistoryInput::Feed => Reader::Feed(factory.feed()?),
        HistoryInput::Collection => Reader::Collection(factory.collection()?),
    };

    let ui = ArchiveUI::new(!output.is_quiet() && output.format() == OutputFormat::Human);
    ui.loading(format!("Reading watch history from {}...", input.label()));

    // A failure here means there is nothing to process; abort the run
    let entries = match &reader {
        Reader::Feed(feed) => feed.entries().await,
        Reader::Collection(collection) => collection.entries().await,
    };
    let entries = match entries {
        Ok(entries) => entries,
        Err(err) => {
            ui.finish();
            return Err(color_eyre::Report::new(err).wrap_err(format!("Failed to read watch history from {}", input.label())));
        }
    };
    info!(count = entries.len(), source = input.label(), "Watch history loaded");

    if entries.is_empty() {
        ui.finish();
        output.info("No watched entries found");
        return Ok(());
    }

    let sink = MarkdownSink::new(config.output.content_dir.clone());
    let options = PipelineOptions {
        dry_run,
        ..PipelineOptions::from_config(&config)
    };
    let mut pipeline = ArchivePipeline::from_factory(&factory, &config, sink, options);

    ui.start(entries.len());
    let summary = pipeline
        .run(&entries, |position, total, outcome| {
            ui.advance(position, total, outcome.key().title());
            ui.suspend(|| output.outcome(outcome));
        })
        .await;
    ui.finish();

    output.summary(&summary, dry_run);
    if !dry_run {
        output.info(format!("Content directory: {}", pipeline.sink().content_dir().display()));
    }
    Ok(())
}
