//! Incrementally crawl a code-hosting site into a local data directory.
//!
//! ```bash
//! hubcrawl init                       # write hubcrawl.toml into the data directory
//! hubcrawl crawl --max-visits 200     # visit up to 200 new repositories
//! hubcrawl export -o ./csv            # flatten everything into CSV tables
//! ```
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use hubcrawl::{Host, run};
use std::io::{Write, stdout};

/// Host printing command results to stdout.
#[derive(Debug, Clone, Default)]
pub struct RealHost;

#[cfg_attr(coverage_nightly, coverage(off))]
impl Host for RealHost {
    fn output(&mut self) -> impl Write {
        stdout()
    }
}

#[tokio::main]
#[cfg_attr(coverage_nightly, coverage(off))]
async fn main() -> Result<(), ohno::AppError> {
    run(&mut RealHost, std::env::args()).await
}
