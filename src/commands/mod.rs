//! Command-line interface for hubcrawl
//!
//! Three commands are offered:
//!
//! - **crawl**: load the configuration, take the data-directory lock, run one crawl session
//!   against the live site and print the run summary
//! - **export**: flatten the identity store and every visit snapshot into CSV tables
//! - **init**: write the documented default configuration file
//!
//! Output goes through the [`Host`] trait so the commands can be exercised in tests.

mod common;
mod crawl;
mod export;
mod host;
mod init;
mod progress_reporter;
mod run;

pub use common::{ColorMode, LogLevel};
pub use crawl::{CrawlArgs, crawl_data};
pub use export::{ExportArgs, export_data};
pub use host::Host;
pub use init::{InitArgs, init_config};
pub use progress_reporter::ProgressReporter;
pub use run::run;
