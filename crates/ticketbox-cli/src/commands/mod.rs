pub mod archive;
pub mod config;
pub mod progress_ui;
