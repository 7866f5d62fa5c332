//! Arguments and setup shared by the commands.

use crate::Result;
use camino::Utf8PathBuf;
use clap::{Args, ValueEnum};
use core::time::Duration;
use directories::BaseDirs;
use ohno::IntoAppError;

const DATA_DIR_NAME: &str = "hubcrawl";

/// Color mode configuration for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Always use colors
    Always,

    /// Never use colors
    Never,

    /// Use colors if the output is a terminal, otherwise don't use colors
    Auto,
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    None,

    /// Only error messages
    Error,

    /// Warning and error messages
    Warn,

    /// Info, warning, and error messages
    Info,

    /// Debug, info, warning, and error messages
    Debug,

    /// Trace, debug, info, warning, and error messages
    Trace,
}

/// Arguments shared by the crawl and export commands
#[derive(Args, Debug)]
pub struct CommonArgs {
    /// Directory holding the identity store and daily snapshots
    #[arg(long, value_name = "PATH")]
    pub data_dir: Option<Utf8PathBuf>,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "none", global = true)]
    pub log_level: LogLevel,
}

impl CommonArgs {
    pub fn data_dir(&self) -> Result<Utf8PathBuf> {
        resolve_data_dir(self.data_dir.as_ref())
    }
}

/// The given data directory, or `hubcrawl` under the platform data directory
pub fn resolve_data_dir(data_dir: Option<&Utf8PathBuf>) -> Result<Utf8PathBuf> {
    if let Some(path) = data_dir {
        return Ok(path.clone());
    }

    let path = BaseDirs::new()
        .into_app_err("could not determine data directory")?
        .data_dir()
        .join(DATA_DIR_NAME);

    Utf8PathBuf::try_from(path).into_app_err("data directory path is not valid UTF-8")
}

/// Initialize logger based on log level
pub fn init_logging(log_level: LogLevel) {
    let level = match log_level {
        LogLevel::None => return,
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    };

    let env = env_logger::Env::default().filter_or("RUST_LOG", level);

    // a logger may already be installed when commands run more than once in a process
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(matches!(log_level, LogLevel::Debug | LogLevel::Trace))
        .try_init();
}

/// How long the progress bar stays hidden; log output and a progress bar do not mix.
pub fn progress_delay(log_level: LogLevel) -> Duration {
    if log_level == LogLevel::None {
        Duration::from_millis(500)
    } else {
        Duration::from_secs(365 * 24 * 60 * 60)
    }
}

pub fn use_colors(color: ColorMode) -> bool {
    match color {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            use std::io::{IsTerminal, stderr};
            stderr().is_terminal()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_data_dir_wins() {
        let path = Utf8PathBuf::from("/tmp/crawl-data");
        assert_eq!(resolve_data_dir(Some(&path)).unwrap(), path);
    }

    #[test]
    fn test_progress_delay() {
        assert!(progress_delay(LogLevel::None) < Duration::from_secs(1));
        assert!(progress_delay(LogLevel::Info) > Duration::from_secs(3600));
    }

    #[test]
    fn test_fixed_color_modes() {
        assert!(use_colors(ColorMode::Always));
        assert!(!use_colors(ColorMode::Never));
    }
}
