use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_RSS_URL: &str = "DOUBAN_RSS_URL";
pub const ENV_USER_ID: &str = "DOUBAN_USER_ID";
pub const ENV_COOKIE: &str = "DOUBAN_COOKIE";
pub const ENV_TMDB_API_KEY: &str = "TMDB_API_KEY";
pub const ENV_OMDB_API_KEY: &str = "OMDB_API_KEY";
pub const ENV_CONTENT_DIR: &str = "TICKETBOX_CONTENT_DIR";

/// Process-wide configuration, built once at start-up and passed down
/// explicitly. Nothing below the CLI reads the environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub douban: DoubanConfig,
    #[serde(default)]
    pub providers: ProviderConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Watch-history source settings. Every field is optional; a missing value
/// only disables the input that needs it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DoubanConfig {
    #[serde(default)]
    pub rss_url: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    /// Raw `Cookie` header value, sent as-is
    #[serde(default)]
    pub cookie: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub tmdb_api_key: Option<String>,
    #[serde(default)]
    pub omdb_api_key: Option<String>,
    /// Region preference used to pick a single certification
    #[serde(default = "default_regions")]
    pub regions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingConfig {
    #[serde(default = "default_record_delay_secs")]
    pub record_delay_secs: u64,
    #[serde(default = "default_page_delay_secs")]
    pub page_delay_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_content_dir")]
    pub content_dir: PathBuf,
    #[serde(default = "default_theater")]
    pub theater: String,
}

fn default_regions() -> Vec<String> {
    watch_archive_models::DEFAULT_REGION_PREFERENCE
        .iter()
        .map(|r| r.to_string())
        .collect()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay_secs() -> u64 {
    1
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string()
}

fn default_record_delay_secs() -> u64 {
    1
}

fn default_page_delay_secs() -> u64 {
    2
}

fn default_content_dir() -> PathBuf {
    PathBuf::from("content/tickets")
}

fn default_theater() -> String {
    "Jellyfin".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            tmdb_api_key: None,
            omdb_api_key: None,
            regions: default_regions(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay_secs: default_retry_delay_secs(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl FetchConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            record_delay_secs: default_record_delay_secs(),
            page_delay_secs: default_page_delay_secs(),
        }
    }
}

impl PacingConfig {
    pub fn record_delay(&self) -> Duration {
        Duration::from_secs(self.record_delay_secs)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_secs(self.page_delay_secs)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            content_dir: default_content_dir(),
            theater: default_theater(),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load the TOML file when present, then overlay the process environment.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) if path.exists() => {
                tracing::debug!(path = %path.display(), "Loading config file");
                Self::load_from_file(path)?
            }
            Some(path) => {
                tracing::debug!(path = %path.display(), "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Overlay values from an environment lookup. Empty values count as unset.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_RSS_URL) {
            self.douban.rss_url = Some(v);
        }
        if let Some(v) = get(ENV_USER_ID) {
            self.douban.user_id = Some(v);
        }
        if let Some(v) = get(ENV_COOKIE) {
            self.douban.cookie = Some(v);
        }
        if let Some(v) = get(ENV_TMDB_API_KEY) {
            self.providers.tmdb_api_key = Some(v);
        }
        if let Some(v) = get(ENV_OMDB_API_KEY) {
            self.providers.omdb_api_key = Some(v);
        }
        if let Some(v) = get(ENV_CONTENT_DIR) {
            self.output.content_dir = PathBuf::from(v);
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.fetch.max_attempts == 0 {
            return Err(anyhow::anyhow!("fetch.max_attempts must be at least 1"));
        }
        if self.providers.regions.iter().any(|r| r.trim().is_empty()) {
            return Err(anyhow::anyhow!("providers.regions must not contain empty entries"));
        }
        Ok(())
    }

    pub fn tmdb_api_key(&self) -> Option<&str> {
        non_empty(self.providers.tmdb_api_key.as_deref())
    }

    pub fn omdb_api_key(&self) -> Option<&str> {
        non_empty(self.providers.omdb_api_key.as_deref())
    }

    pub fn rss_url(&self) -> Option<&str> {
        non_empty(self.douban.rss_url.as_deref())
    }

    pub fn user_id(&self) -> Option<&str> {
        non_empty(self.douban.user_id.as_deref())
    }

    pub fn cookie(&self) -> Option<&str> {
        non_empty(self.douban.cookie.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let mut config = Config::default();
        config.douban.user_id = Some("12345".to_string());
        config.fetch.max_attempts = 5;

        config.save_to_file(file.path()).unwrap();

        let loaded = Config::load_from_file(file.path()).unwrap();
        assert_eq!(loaded.user_id(), Some("12345"));
        assert_eq!(loaded.fetch.max_attempts, 5);
        assert_eq!(loaded.output.theater, "Jellyfin");
    }

    #[test]
    fn test_defaults_from_empty_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.fetch.max_attempts, 3);
        assert_eq!(config.fetch.retry_delay(), Duration::from_secs(1));
        assert_eq!(config.pacing.record_delay(), Duration::from_secs(1));
        assert_eq!(config.pacing.page_delay(), Duration::from_secs(2));
        assert_eq!(config.providers.regions.first().map(String::as_str), Some("US"));
        assert_eq!(config.providers.regions.len(), 12);
        assert!(config.tmdb_api_key().is_none());
    }

    #[test]
    fn test_env_overlay() {
        let env: HashMap<&str, &str> = [
            (ENV_TMDB_API_KEY, "tmdb-key"),
            (ENV_OMDB_API_KEY, ""),
            (ENV_CONTENT_DIR, "out/tickets"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.providers.omdb_api_key = Some("from-file".to_string());
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.tmdb_api_key(), Some("tmdb-key"));
        // Empty environment values do not clobber file values
        assert_eq!(config.omdb_api_key(), Some("from-file"));
        assert_eq!(config.output.content_dir, PathBuf::from("out/tickets"));
    }

    #[test]
    fn test_blank_keys_are_treated_as_missing() {
        let mut config = Config::default();
        config.providers.tmdb_api_key = Some("   ".to_string());
        assert!(config.tmdb_api_key().is_none());
    }

    #[test]
    fn test_config_validate() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.fetch.max_attempts = 0;
        assert!(config.validate().is_err());
    }
}
