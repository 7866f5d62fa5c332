//! Per-subject extraction from pages and API resources.
//!
//! Each procedure takes a natural key, fetches what it needs through a [`Transport`], and returns
//! the populated identity and visit records plus any newly discovered keys. Writing those records
//! into the stores is left to the crawl loop.
//!
//! Missing optional page sections produce documented defaults rather than failures. A handful of
//! lookups target content that is not always present in the initial server response; those go
//! through [`RetryPolicy`] and fall back to the `-1` sentinel once retries are exhausted.

mod owner;
mod repository;
mod retry;
mod topic;
mod trending;

pub use owner::OwnerExtraction;
pub use repository::RepositoryExtraction;
pub use retry::{RenderMismatch, RetryPolicy};
pub use topic::TopicExtraction;
pub use trending::trending_path;

use crate::transport::{FetchError, Transport};
use scraper::Selector;
use thiserror::Error;

const LOG_TARGET: &str = "   extract";

/// Why a subject could not be extracted.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The subject does not exist on the platform, or the platform refused to serve it.
    #[error("not found")]
    NotFound,

    /// The subject could not be fetched.
    #[error("{0}")]
    Failed(ohno::AppError),
}

impl From<FetchError> for ExtractError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::NotFound | FetchError::Status(_) => Self::NotFound,
            FetchError::Transport(e) => Self::Failed(e),
        }
    }
}

/// Runs the extraction procedures against one transport.
#[derive(Debug)]
pub struct Extractor<'a, T> {
    transport: &'a T,
    retry: RetryPolicy,
    recent_commits: u32,
}

impl<'a, T: Transport> Extractor<'a, T> {
    /// `recent_commits` bounds how many of the newest commits are sampled per repository.
    #[must_use]
    pub const fn new(transport: &'a T, retry: RetryPolicy, recent_commits: u32) -> Self {
        Self {
            transport,
            retry,
            recent_commits,
        }
    }
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}
