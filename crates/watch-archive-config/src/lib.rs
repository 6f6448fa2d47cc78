pub mod config;
pub mod paths;

pub use config::{Config, DoubanConfig, FetchConfig, OutputConfig, PacingConfig, ProviderConfig};
pub use paths::{container_base_path, PathManager};
