use clap::{ArgAction, Parser, Subcommand};
use color_eyre::eyre::{eyre, WrapErr};
use commands::archive::{run_archive, HistoryInput};
use std::path::PathBuf;
use watch_archive_config::{Config, PathManager};

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "ticketbox")]
#[command(about = "Ticketbox - Turn your Douban watch history into front-matter ticket stubs")]
#[command(version)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write logs to a daily rotating file instead of stderr.
    /// Without a value, logs go to the default log directory.
    #[arg(long, global = true, value_name = "PATH", num_args = 0..=1)]
    log_file: Option<Option<PathBuf>>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Archive entries from the Douban RSS feed
    #[command(long_about = "Read the configured Douban RSS feed, enrich every watched title with detail-page data and a certification, and write one markdown file per title and watch date. Existing files are never overwritten.")]
    Feed {
        /// Directory for generated records (overrides config)
        #[arg(long, value_name = "DIR")]
        content_dir: Option<PathBuf>,

        /// Print the records that would be written without touching the content directory
        #[arg(long, action = ArgAction::SetTrue)]
        dry_run: bool,
    },
    /// Archive entries from the paginated collection pages
    #[command(long_about = "Walk the user's 'watched' collection pages (requires douban.user_id, and usually a session cookie) and archive every entry like the feed command does.")]
    Collection {
        /// Directory for generated records (overrides config)
        #[arg(long, value_name = "DIR")]
        content_dir: Option<PathBuf>,

        /// Print the records that would be written without touching the content directory
        #[arg(long, action = ArgAction::SetTrue)]
        dry_run: bool,
    },
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration (file plus environment, secrets masked)
    Show {
        /// Show secrets unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let paths = PathManager::default();

    let log_file = cli.log_file.map(|path| path.unwrap_or_else(|| paths.log_file()));
    logging::init_logging(cli.verbose, cli.quiet, log_file.as_deref()).map_err(|e| eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    let config_file = cli.config.unwrap_or_else(|| paths.config_file());
    let config = Config::load(Some(config_file.as_path()))
        .map_err(|e| eyre!("{:#}", e))
        .wrap_err_with(|| format!("Failed to load config from {}", config_file.display()))?;

    let result = match cli.command {
        Commands::Feed { content_dir, dry_run } => {
            run_archive(HistoryInput::Feed, config, content_dir, dry_run, &output).await
        }
        Commands::Collection { content_dir, dry_run } => {
            run_archive(HistoryInput::Collection, config, content_dir, dry_run, &output).await
        }
        Commands::Config { cmd } => match cmd {
            ConfigCommands::Show { full } => commands::config::show_config(&config, &config_file, full, &output),
        },
    };

    if let Err(err) = &result {
        tracing::error!(error = %err, "Command failed");
    }
    result
}
