use clap::ValueEnum;
use owo_colors::OwoColorize;
use serde_json::json;
use watch_archive_core::{RecordOutcome, RunSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    #[value(name = "json-pretty")]
    JsonPretty,
}

/// User-facing output on stdout. Diagnostics go through `tracing` instead.
pub struct Output {
    format: OutputFormat,
    quiet: bool,
}

impl Output {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    fn message(&self, kind: &str, marker: &dyn std::fmt::Display, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{} {}", marker, msg),
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({ "type": kind, "message": msg }));
            }
        }
    }

    pub fn success(&self, msg: impl AsRef<str>) {
        if !self.quiet {
            self.message("success", &"✓".green(), msg.as_ref());
        }
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        if !self.quiet {
            self.message("info", &"•".bright_black(), msg.as_ref());
        }
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        if !self.quiet {
            self.message("warning", &"⚠".yellow(), msg.as_ref());
        }
    }

    pub fn json(&self, data: &serde_json::Value) {
        if self.quiet && self.format != OutputFormat::Human {
            return;
        }
        self.print_json(data);
    }

    /// One line per handled entry. Dry runs print the rendered block in full.
    pub fn outcome(&self, outcome: &RecordOutcome) {
        if self.quiet {
            return;
        }
        let key = outcome.key().to_string();
        match self.format {
            OutputFormat::Human => match outcome {
                RecordOutcome::Generated(_) => println!("{} Generated {}", "✓".green(), key),
                RecordOutcome::Skipped(_) => println!("{} Skipped {}", "-".bright_black(), key.bright_black()),
                RecordOutcome::Failed(_, reason) => eprintln!("{} {}: {}", "✗".red(), key, reason),
                RecordOutcome::Rendered(_, text) => {
                    println!("{} {}", "»".cyan(), key.bold());
                    print!("{}", text);
                }
            },
            OutputFormat::Json | OutputFormat::JsonPretty => {
                let value = match outcome {
                    RecordOutcome::Generated(_) => json!({ "type": "generated", "key": key }),
                    RecordOutcome::Skipped(_) => json!({ "type": "skipped", "key": key }),
                    RecordOutcome::Failed(_, reason) => json!({ "type": "failed", "key": key, "error": reason }),
                    RecordOutcome::Rendered(_, text) => json!({ "type": "rendered", "key": key, "front_matter": text }),
                };
                self.print_json(&value);
            }
        }
    }

    pub fn summary(&self, summary: &RunSummary, dry_run: bool) {
        match self.format {
            OutputFormat::Human => {
                if self.quiet {
                    return;
                }
                let verb = if dry_run { "Rendered" } else { "Generated" };
                let line = format!(
                    "{} {} | Skipped {} | Failed {} (of {})",
                    verb, summary.generated, summary.skipped, summary.failed, summary.total
                );
                if summary.failed > 0 {
                    self.warn(line);
                } else {
                    self.success(line);
                }
            }
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.json(&json!({ "type": "summary", "dry_run": dry_run, "summary": summary }));
            }
        }
    }

    fn print_json(&self, data: &serde_json::Value) {
        match self.format {
            OutputFormat::JsonPretty => println!("{}", serde_json::to_string_pretty(data).unwrap_or_default()),
            _ => println!("{}", serde_json::to_string(data).unwrap_or_default()),
        }
    }
}
