use serde::Serialize;
use std::time::Instant;
use tracing::{info, warn};
use watch_archive_models::RecordKey;

/// What happened to one watch entry.
#[derive(Debug, Clone)]
pub enum RecordOutcome {
    Generated(RecordKey),
    /// Dry run: the rendered front matter that would have been written
    Rendered(RecordKey, String),
    /// Already on disk, or seen earlier in the same run
    Skipped(RecordKey),
    Failed(RecordKey, String),
}

impl RecordOutcome {
    pub fn key(&self) -> &RecordKey {
        match self {
            Self::Generated(key) | Self::Rendered(key, _) | Self::Skipped(key) | Self::Failed(key, _) => key,
        }
    }
}

/// Counts for one pipeline run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub generated: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn processed(&self) -> usize {
        self.generated + self.skipped + self.failed
    }
}

/// Tallies outcomes and logs periodic progress plus a final summary
/// so long runs stay quiet in the logs.
pub struct ProgressTracker {
    summary: RunSummary,
    start_time: Instant,
    progress_interval: usize,
    last_progress_log: usize,
}

impl ProgressTracker {
    /// `progress_interval`: log a progress line every N entries
    pub fn new(total: usize, progress_interval: usize) -> Self {
        if total > 0 {
            info!("Starting archive run: {} entries to process", total);
        }
        Self {
            summary: RunSummary {
                total,
                ..RunSummary::default()
            },
            start_time: Instant::now(),
            progress_interval: progress_interval.max(1),
            last_progress_log: 0,
        }
    }

    pub fn record(&mut self, outcome: &RecordOutcome) {
        match outcome {
            RecordOutcome::Generated(_) | RecordOutcome::Rendered(..) => self.summary.generated += 1,
            RecordOutcome::Skipped(_) => self.summary.skipped += 1,
            RecordOutcome::Failed(..) => self.summary.failed += 1,
        }
    }

    /// `current` is 1-based
    pub fn log_progress(&mut self, current: usize) {
        if current - self.last_progress_log < self.progress_interval && current != self.summary.total {
            return;
        }
        info!(
            "Progress: {}/{} | Generated: {} | Skipped: {} | Failed: {}",
            current, self.summary.total, self.summary.generated, self.summary.skipped, self.summary.failed
        );
        self.last_progress_log = current;
    }

    pub fn finish(self, operation_name: &str) -> RunSummary {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        let s = self.summary;
        if s.failed > 0 {
            warn!(
                "{} completed: {} total in {:.1}s | Generated: {} | Skipped: {} | Failed: {}",
                operation_name, s.total, elapsed, s.generated, s.skipped, s.failed
            );
        } else {
            info!(
                "{} completed: {} total in {:.1}s | Generated: {} | Skipped: {}",
                operation_name, s.total, elapsed, s.generated, s.skipped
            );
        }
        s
    }
}
