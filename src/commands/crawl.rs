use super::Host;
use super::common::{ColorMode, CommonArgs, init_logging, progress_delay, use_colors};
use super::progress_reporter::ProgressReporter;
use crate::Result;
use crate::config::Config;
use crate::crawl::Crawler;
use crate::store::DataDirLock;
use crate::transport::HttpTransport;
use camino::Utf8PathBuf;
use clap::Parser;
use std::io::Write;

const LOG_TARGET: &str = "     crawl";

#[derive(Parser, Debug)]
pub struct CrawlArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// GitHub API token for authentication
    #[arg(long, env = "GITHUB_TOKEN", value_name = "TOKEN")]
    pub github_token: Option<String>,

    /// Number of new repositories to visit before stopping (overrides the configuration)
    #[arg(long, value_name = "COUNT")]
    pub max_visits: Option<u64>,

    /// Path to configuration file (default is `hubcrawl.toml` in the data directory)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Control when to use colored output
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    pub color: ColorMode,
}

pub async fn crawl_data<H: Host>(host: &mut H, args: &CrawlArgs) -> Result<()> {
    init_logging(args.common.log_level);

    let data_dir = args.common.data_dir()?;
    let mut config = Config::load(&data_dir, args.config.as_ref())?;
    if let Some(max_visits) = args.max_visits {
        config.max_repository_visits = max_visits;
    }

    if args.github_token.is_none() {
        log::warn!(target: LOG_TARGET, "No GitHub token provided, API requests are subject to low rate limits");
    }

    let transport = HttpTransport::new(
        args.github_token.as_deref(),
        config.web_base_url.as_str(),
        config.api_base_url.as_str(),
    )?;

    let _lock = DataDirLock::acquire(data_dir.as_std_path()).await?;
    log::info!(target: LOG_TARGET, "Crawling into '{data_dir}'");

    let mut crawler = Crawler::new(&transport, &config, data_dir.as_std_path())?;
    let reporter = ProgressReporter::new(crawler.counters(), progress_delay(args.common.log_level), use_colors(args.color));
    let summary = crawler.run(&reporter).await?;

    let _ = writeln!(host.output(), "{summary}");
    Ok(())
}
