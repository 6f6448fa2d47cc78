use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::time::Duration;

/// Spinner while the watch history loads, then one bar over the entries.
/// Falls back to structured log lines when not attached to a terminal.
pub struct ArchiveUI {
    bar: ProgressBar,
    interactive: bool,
}

impl ArchiveUI {
    pub fn new(enabled: bool) -> Self {
        let interactive = enabled && is_interactive();
        let bar = if interactive {
            let spinner = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
            {
                spinner.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
            }
            spinner.enable_steady_tick(Duration::from_millis(100));
            spinner
        } else {
            tracing::info!(
                operation = "ui_init",
                mode = "non_interactive",
                "Progress bar disabled, using structured logging"
            );
            ProgressBar::hidden()
        };
        Self { bar, interactive }
    }

    pub fn loading(&self, msg: impl Into<String>) {
        let msg = msg.into();
        if self.interactive {
            self.bar.set_message(msg);
        } else {
            tracing::info!(operation = "progress", message = %msg, "Progress update");
        }
    }

    /// Switch from the spinner to a bar of `total` entries
    pub fn start(&self, total: usize) {
        if !self.interactive {
            return;
        }
        self.bar.disable_steady_tick();
        self.bar.set_length(total as u64);
        self.bar.set_position(0);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        {
            self.bar.set_style(style.progress_chars("█▉▊▋▌▍▎▏  "));
        }
        self.bar.set_message("");
    }

    pub fn advance(&self, position: usize, total: usize, msg: &str) {
        if self.interactive {
            self.bar.set_position(position as u64);
            self.bar.set_message(msg.to_string());
        } else {
            tracing::info!(
                operation = "progress",
                current = position,
                total = total,
                percent = (position as f64 / total.max(1) as f64 * 100.0) as u8,
                message = msg,
                "Archive progress update"
            );
        }
    }

    /// Run `f` with the bar hidden so printed lines do not tear it
    pub fn suspend<R>(&self, f: impl FnOnce() -> R) -> R {
        self.bar.suspend(f)
    }

    pub fn finish(&self) {
        if self.interactive {
            self.bar.finish_and_clear();
        }
    }
}

pub fn is_interactive() -> bool {
    std::io::stdout().is_terminal() && std::io::stderr().is_terminal()
}
