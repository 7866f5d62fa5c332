//! In-memory transport for tests.

use super::{ApiResponse, FetchError, Page, Transport};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub enum StubResponse {
    Body { link: Option<String>, body: String },
    NotFound,
    Status(u16),
}

/// Serves canned responses keyed by path and records every request.
///
/// A path with several queued responses serves them in order and repeats the last one.
/// Unknown paths answer `NotFound`.
#[derive(Debug, Default)]
pub struct StubTransport {
    pages: Mutex<HashMap<String, VecDeque<StubResponse>>>,
    apis: Mutex<HashMap<String, VecDeque<StubResponse>>>,
    requests: Mutex<Vec<String>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, path: &str, html: &str) -> Self {
        self.page_response(
            path,
            StubResponse::Body {
                link: None,
                body: html.to_string(),
            },
        )
    }

    pub fn page_response(self, path: &str, response: StubResponse) -> Self {
        self.pages
            .lock()
            .expect("lock poisoned")
            .entry(path.to_string())
            .or_default()
            .push_back(response);
        self
    }

    pub fn api(self, path: &str, json: &str) -> Self {
        self.api_response(
            path,
            StubResponse::Body {
                link: None,
                body: json.to_string(),
            },
        )
    }

    pub fn api_with_link(self, path: &str, json: &str, link: &str) -> Self {
        self.api_response(
            path,
            StubResponse::Body {
                link: Some(link.to_string()),
                body: json.to_string(),
            },
        )
    }

    pub fn api_response(self, path: &str, response: StubResponse) -> Self {
        self.apis
            .lock()
            .expect("lock poisoned")
            .entry(path.to_string())
            .or_default()
            .push_back(response);
        self
    }

    /// Every requested path, pages and API alike, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("lock poisoned").clone()
    }

    /// How many times `path` was requested.
    pub fn count(&self, path: &str) -> usize {
        self.requests.lock().expect("lock poisoned").iter().filter(|p| *p == path).count()
    }

    fn next(&self, table: &Mutex<HashMap<String, VecDeque<StubResponse>>>, path: &str) -> StubResponse {
        self.requests.lock().expect("lock poisoned").push(path.to_string());

        let mut table = table.lock().expect("lock poisoned");
        let Some(queue) = table.get_mut(path) else {
            return StubResponse::NotFound;
        };

        if queue.len() > 1 {
            queue.pop_front().unwrap_or(StubResponse::NotFound)
        } else {
            queue.front().cloned().unwrap_or(StubResponse::NotFound)
        }
    }
}

impl Transport for StubTransport {
    async fn fetch_page(&self, path: &str) -> Result<Page, FetchError> {
        match self.next(&self.pages, path) {
            StubResponse::Body { body, .. } => Ok(Page::parse(&body)),
            StubResponse::NotFound => Err(FetchError::NotFound),
            StubResponse::Status(status) => Err(FetchError::Status(status)),
        }
    }

    async fn fetch_api(&self, path: &str) -> Result<ApiResponse, FetchError> {
        match self.next(&self.apis, path) {
            StubResponse::Body { link, body } => Ok(ApiResponse::new(link, body.into_bytes())),
            StubResponse::NotFound => Err(FetchError::NotFound),
            StubResponse::Status(status) => Err(FetchError::Status(status)),
        }
    }
}
