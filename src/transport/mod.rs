//! Access to the hosting platform's rendered pages and REST API.
//!
//! Extraction only talks to the platform through the [`Transport`] trait. Paths are relative to
//! the web or API root (for example `/rust-lang/rust` or `/repos/rust-lang/rust`) and may carry a
//! query string.

mod client;
mod page;
mod resilient_http;

#[cfg(test)]
pub(crate) mod stub;

pub use client::HttpTransport;
pub use page::{Page, element_text, parent_element};

use crate::Result;
use ohno::IntoAppError;
use serde::de::{DeserializeOwned, IgnoredAny};
use std::sync::LazyLock;
use thiserror::Error;

/// Pattern to extract the last page number from a pagination `Link` header
static LAST_PAGE_REGEX: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"[?&]page=(\d+)>; rel=.last.").expect("invalid regex"));

/// Why a fetch produced no usable response.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The resource does not exist (HTTP 404).
    #[error("resource not found")]
    NotFound,

    /// The server answered with an unexpected status.
    #[error("unexpected HTTP status {0}")]
    Status(u16),

    /// The request could not be completed.
    #[error("request failed: {0}")]
    Transport(ohno::AppError),
}

/// A successful API response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    link: Option<String>,
    body: Vec<u8>,
}

impl ApiResponse {
    #[must_use]
    pub const fn new(link: Option<String>, body: Vec<u8>) -> Self {
        Self { link, body }
    }

    /// Deserialize the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).into_app_err("malformed JSON in API response")
    }

    /// The page number of the `rel="last"` entry of the pagination header, if any.
    #[must_use]
    pub fn last_page(&self) -> Option<u64> {
        let link = self.link.as_deref()?;
        LAST_PAGE_REGEX.captures(link)?.get(1)?.as_str().parse().ok()
    }

    /// Count the elements of a JSON array body without materializing them.
    pub fn count_items(&self) -> Result<u64> {
        let array: Vec<IgnoredAny> = serde_json::from_slice(&self.body).into_app_err("malformed JSON while counting array elements")?;
        Ok(array.len() as u64)
    }
}

/// The fetch layer used by extraction.
///
/// Futures are `Send`; a parsed [`Page`] only exists after the last await.
pub trait Transport: Sync {
    /// Fetch and parse a server-rendered page.
    fn fetch_page(&self, path: &str) -> impl Future<Output = Result<Page, FetchError>> + Send;

    /// Fetch an API resource. Only success statuses produce `Ok`.
    fn fetch_api(&self, path: &str) -> impl Future<Output = Result<ApiResponse, FetchError>> + Send;
}
