//! Crawler configuration.

#[expect(clippy::module_inception, reason = "module holds the Config type")]
mod config;

pub use config::{CONFIG_FILE_NAME, Config, DEFAULT_CONFIG_TOML};
