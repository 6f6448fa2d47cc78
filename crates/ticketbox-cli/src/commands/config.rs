use crate::output::{Output, OutputFormat};
use color_eyre::Result;
use comfy_table::{Attribute, Cell, Color, Table};
use owo_colors::OwoColorize;
use serde_json::json;
use std::path::Path;
use watch_archive_config::Config;

pub fn show_config(config: &Config, config_file: &Path, full: bool, output: &Output) -> Result<()> {
    let secret = |value: Option<&str>| match value {
        Some(v) if full => v.to_string(),
        Some(v) => mask_string(v),
        None => "<not set>".to_string(),
    };
    let plain = |value: Option<&str>| value.unwrap_or("<not set>").to_string();

    let rows: Vec<(&str, Vec<(&str, String)>)> = vec![
        (
            "Douban",
            vec![
                ("RSS URL", plain(config.rss_url())),
                ("User ID", plain(config.user_id())),
                ("Cookie", secret(config.cookie())),
            ],
        ),
        (
            "Providers",
            vec![
                ("TMDB API key", secret(config.tmdb_api_key())),
                ("OMDb API key", secret(config.omdb_api_key())),
                ("Regions", config.providers.regions.join(", ")),
            ],
        ),
        (
            "Fetch",
            vec![
                ("Max attempts", config.fetch.max_attempts.to_string()),
                ("Retry delay", format!("{}s", config.fetch.retry_delay_secs)),
                ("Timeout", format!("{}s", config.fetch.timeout_secs)),
                ("Record delay", format!("{}s", config.pacing.record_delay_secs)),
                ("Page delay", format!("{}s", config.pacing.page_delay_secs)),
            ],
        ),
        (
            "Output",
            vec![
                ("Content dir", config.output.content_dir.display().to_string()),
                ("Theater", config.output.theater.clone()),
            ],
        ),
    ];

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }
            println!("\n{}", "Configuration".bright_cyan().bold());
            let file_state = if config_file.exists() { "" } else { " (not found, using defaults)" };
            println!("{} {}{}\n", "Config file:".bright_black(), config_file.display(), file_state);

            for (section, fields) in &rows {
                let mut table = Table::new();
                table.load_preset(comfy_table::presets::UTF8_FULL);
                table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
                table.set_header(vec![Cell::new(section).fg(Color::Cyan).add_attribute(Attribute::Bold)]);
                for (name, value) in fields {
                    table.add_row(vec![Cell::new(name), Cell::new(value)]);
                }
                println!("{}\n", table);
            }
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            let mut sections = serde_json::Map::new();
            for (section, fields) in &rows {
                let values: serde_json::Map<String, serde_json::Value> = fields
                    .iter()
                    .map(|(name, value)| (name.to_string(), json!(value)))
                    .collect();
                sections.insert(section.to_string(), serde_json::Value::Object(values));
            }
            output.json(&json!({
                "config_file": config_file.display().to_string(),
                "config_file_exists": config_file.exists(),
                "config": sections,
            }));
        }
    }
    Ok(())
}

fn mask_string(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}
