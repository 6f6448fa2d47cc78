use anyhow::{anyhow, Result};
use std::io::{self, IsTerminal};
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{self, time::ChronoUtc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Filter directive for a verbosity level. `-v` is debug with HTTP client
/// noise kept at warn; `-vv` and above is everything.
fn directive(verbose_level: u8, quiet: bool) -> &'static str {
    match (quiet, verbose_level) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug,hyper=warn,reqwest=warn,html5ever=warn,selectors=warn",
        (false, _) => "trace",
    }
}

fn build_filter(verbose_level: u8, quiet: bool) -> EnvFilter {
    // Quiet always wins over RUST_LOG
    if quiet {
        return EnvFilter::new(directive(verbose_level, quiet));
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive(verbose_level, quiet)))
}

fn json_requested() -> bool {
    std::env::var("RUST_LOG_JSON")
        .map(|v| v == "true")
        .unwrap_or_else(|_| !io::stdout().is_terminal())
}

/// Install the global subscriber. Logs go to stderr, or to a daily rolling
/// file when `log_file` is set.
pub fn init_logging(verbose_level: u8, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let registry = Registry::default().with(build_filter(verbose_level, quiet));
    let json = json_requested();

    let Some(log_path) = log_file else {
        if json {
            registry
                .with(fmt::layer().json().with_timer(ChronoUtc::rfc_3339()).with_writer(io::stderr))
                .init();
        } else {
            registry
                .with(fmt::layer().with_timer(ChronoUtc::rfc_3339()).with_writer(io::stderr))
                .init();
        }
        return Ok(());
    };

    let log_dir = log_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(log_dir)?;

    // Rotated files are named "{prefix}.YYYY-MM-DD"
    let prefix = log_path
        .file_stem()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("Invalid log file name: {}", log_path.display()))?;
    let appender = RollingFileAppender::new(Rotation::DAILY, log_dir, prefix);

    if json {
        registry
            .with(fmt::layer().json().with_timer(ChronoUtc::rfc_3339()).with_writer(appender))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(false)
                    .with_writer(appender),
            )
            .init();
    }
    Ok(())
}
