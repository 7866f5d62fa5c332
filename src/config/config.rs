use crate::Result;
use camino::{Utf8Path, Utf8PathBuf};
use core::time::Duration;
use ohno::{IntoAppError, app_err};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;

/// The default configuration TOML content, embedded from `default_config.toml`
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../default_config.toml");

/// Name of the configuration file looked up in the data directory
pub const CONFIG_FILE_NAME: &str = "hubcrawl.toml";

const MAX_RECENT_COMMITS: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Discovery budget per run, on top of the repositories already known
    #[serde(default = "default_max_repository_visits")]
    pub max_repository_visits: u64,

    /// Repository visits between incremental saves
    #[serde(default = "default_export_interval")]
    pub export_interval: u64,

    /// Initial topic watch-list
    #[serde(default)]
    pub topics: Vec<String>,

    /// Cap on the watch-list length, auto-discovered tags included
    #[serde(default = "default_max_topics")]
    pub max_topics: usize,

    /// Trending page filters, the empty string meaning all languages
    #[serde(default)]
    pub trending_languages: Vec<String>,

    /// Total attempts for eventually-consistent page lookups
    #[serde(default = "default_render_retry_attempts")]
    pub render_retry_attempts: u32,

    /// Pause between those attempts, in milliseconds
    #[serde(default = "default_render_retry_delay_ms")]
    pub render_retry_delay_ms: u64,

    /// Newest commits sampled per repository
    #[serde(default = "default_recent_commits")]
    pub recent_commits: u32,

    #[serde(default = "default_web_base_url")]
    pub web_base_url: String,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

const fn default_max_repository_visits() -> u64 {
    6000
}

const fn default_export_interval() -> u64 {
    50
}

const fn default_max_topics() -> usize {
    100
}

const fn default_render_retry_attempts() -> u32 {
    3
}

const fn default_render_retry_delay_ms() -> u64 {
    1000
}

const fn default_recent_commits() -> u32 {
    50
}

fn default_web_base_url() -> String {
    "https://github.com".to_string()
}

fn default_api_base_url() -> String {
    "https://api.github.com".to_string()
}

impl Config {
    /// Load configuration from a file or use defaults
    ///
    /// Without an explicit path, `hubcrawl.toml` in the data directory is used when present.
    pub fn load(data_dir: &Utf8Path, config_path: Option<&Utf8PathBuf>) -> Result<Self> {
        let (final_path, text) = if let Some(path) = config_path {
            let text = fs::read_to_string(path).into_app_err_with(|| format!("reading hubcrawl configuration file '{path}'"))?;
            (path.clone(), text)
        } else {
            let path = data_dir.join(CONFIG_FILE_NAME);
            match fs::read_to_string(&path) {
                Ok(text) => (path, text),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    return Ok(Self::default());
                }
                Err(e) => return Err(e).into_app_err_with(|| format!("reading hubcrawl configuration file '{path}'")),
            }
        };

        let config: Self = toml::from_str(&text).into_app_err_with(|| format!("parsing configuration file '{final_path}'"))?;
        config.validate()?;

        Ok(config)
    }

    /// Save the default configuration to a TOML file
    pub fn save_default(output_path: &Utf8Path) -> Result<()> {
        fs::write(output_path, DEFAULT_CONFIG_TOML).into_app_err_with(|| format!("writing default configuration to {output_path}"))?;
        Ok(())
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error if a count or interval is out of range or a base URL is empty
    pub fn validate(&self) -> Result<()> {
        if self.export_interval == 0 {
            return Err(app_err!("export_interval must be greater than 0"));
        }

        if self.render_retry_attempts == 0 {
            return Err(app_err!("render_retry_attempts must be at least 1"));
        }

        if !(1..=MAX_RECENT_COMMITS).contains(&self.recent_commits) {
            return Err(app_err!(
                "recent_commits must be between 1 and {MAX_RECENT_COMMITS}, got {}",
                self.recent_commits
            ));
        }

        if self.web_base_url.trim().is_empty() || self.api_base_url.trim().is_empty() {
            return Err(app_err!("web_base_url and api_base_url must not be empty"));
        }

        Ok(())
    }

    #[must_use]
    pub const fn render_retry_delay(&self) -> Duration {
        Duration::from_millis(self.render_retry_delay_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG_TOML).expect("default_config.toml should be valid TOML that deserializes to Config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.max_repository_visits, 6000);
        assert_eq!(config.export_interval, 50);
        assert_eq!(config.topics.len(), 14);
        assert_eq!(config.trending_languages.first().map(String::as_str), Some(""));
        assert_eq!(config.render_retry_delay(), Duration::from_secs(1));
    }

    #[test]
    fn test_omitted_fields_take_defaults() {
        let config: Config = toml::from_str("export_interval = 5").unwrap();
        assert_eq!(config.export_interval, 5);
        assert_eq!(config.recent_commits, 50);
        assert_eq!(config.api_base_url, "https://api.github.com");
        assert!(config.topics.is_empty());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        assert!(toml::from_str::<Config>("max_visits = 5").is_err());
    }

    #[test]
    fn test_validate_zero_export_interval() {
        let config = Config { export_interval: 0, ..Config::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_attempts() {
        let config = Config { render_retry_attempts: 0, ..Config::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_recent_commits_range() {
        assert!(Config { recent_commits: 0, ..Config::default() }.validate().is_err());
        assert!(Config { recent_commits: 101, ..Config::default() }.validate().is_err());
        Config { recent_commits: 100, ..Config::default() }.validate().unwrap();
    }

    #[test]
    fn test_validate_empty_base_url() {
        let config = Config { web_base_url: " ".to_string(), ..Config::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_save_default_and_load() {
        let tmp = tempfile::tempdir().unwrap();
        let output_path = Utf8PathBuf::try_from(tmp.path().join(CONFIG_FILE_NAME)).unwrap();
        Config::save_default(&output_path).unwrap();
        let loaded = Config::load(&Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap(), None).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_load_missing_config_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let data_dir = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        let config = Config::load(&data_dir, None).unwrap();
        config.validate().unwrap();
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_load_invalid_config() {
        let tmp = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::try_from(tmp.path().join("bad.toml")).unwrap();
        fs::write(&path, "export_interval = 0").unwrap();
        let data_dir = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        assert!(Config::load(&data_dir, Some(&path)).is_err());
    }

    #[test]
    fn test_default_config_toml_is_not_empty() {
        assert!(!DEFAULT_CONFIG_TOML.is_empty());
    }
}
