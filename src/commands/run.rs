//! Command dispatch logic for hubcrawl

use super::{CrawlArgs, ExportArgs, InitArgs, crawl_data, export_data, init_config};
use crate::{Host, Result};
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand};

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "hubcrawl", version, author, long_about = None)]
#[command(about = "Incrementally crawl a code-hosting site into a local data directory")]
#[command(styles = CLAP_STYLES)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Visit trending lists, topics, owners and repositories, then persist the results
    Crawl(Box<CrawlArgs>),
    /// Flatten the identity store and visit snapshots into CSV tables
    Export(ExportArgs),
    /// Generate a default configuration file
    Init(InitArgs),
}

/// Dispatch command-line arguments to the appropriate handler
///
/// # Errors
///
/// Returns an error if the executed command fails
pub async fn run<I, T, H>(host: &mut H, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    H: Host,
{
    match &Cli::parse_from(args).command {
        Command::Crawl(crawl_args) => crawl_data(host, crawl_args).await,
        Command::Export(export_args) => export_data(host, export_args),
        Command::Init(init_args) => init_config(host, init_args),
    }
}
