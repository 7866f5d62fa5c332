use super::resilient_http::resilient_get;
use super::{ApiResponse, FetchError, Page, Transport};
use crate::Result;
use core::time::Duration;
use ohno::EnrichableExt;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, LINK};

const LOG_TARGET: &str = " transport";

const USER_AGENT: &str = "hubcrawl";
const API_ACCEPT: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "x-github-api-version";
const API_VERSION: &str = "2022-11-28";

/// Delay between attempts of a transiently failing request.
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Sequential HTTP access to the hosting platform.
///
/// Pages are fetched anonymously; API requests carry the static credential when one is given.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    web: reqwest::Client,
    api: reqwest::Client,
    web_base_url: String,
    api_base_url: String,
    retry_delay: Duration,
}

impl HttpTransport {
    pub fn new(token: Option<&str>, web_base_url: impl Into<String>, api_base_url: impl Into<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let _ = headers.insert(ACCEPT, HeaderValue::from_static(API_ACCEPT));
        let _ = headers.insert(API_VERSION_HEADER, HeaderValue::from_static(API_VERSION));

        if let Some(t) = token {
            let mut auth_val = HeaderValue::from_str(&format!("Bearer {t}"))?;
            auth_val.set_sensitive(true);
            let _ = headers.insert(AUTHORIZATION, auth_val);
        }

        let web = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()?;

        let api = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            web,
            api,
            web_base_url: trim_base(web_base_url.into()),
            api_base_url: trim_base(api_base_url.into()),
            retry_delay: DEFAULT_RETRY_DELAY,
        })
    }

    /// Override the delay between attempts of transiently failing requests.
    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    async fn get(&self, client: &reqwest::Client, url: &str) -> Result<reqwest::Response, FetchError> {
        log::trace!(target: LOG_TARGET, "GET {url}");

        let resp = resilient_get(client, url, self.retry_delay).await.map_err(FetchError::Transport)?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        if status == StatusCode::NOT_FOUND {
            log::debug!(target: LOG_TARGET, "'{url}' not found");
            return Err(FetchError::NotFound);
        }

        log::debug!(target: LOG_TARGET, "'{url}' answered with status {status}");
        Err(FetchError::Status(status.as_u16()))
    }
}

impl Transport for HttpTransport {
    async fn fetch_page(&self, path: &str) -> Result<Page, FetchError> {
        let url = format!("{}{path}", self.web_base_url);
        let resp = self.get(&self.web, &url).await?;
        let body = resp
            .text()
            .await
            .map_err(|e| FetchError::Transport(ohno::AppError::new(e).enrich(format!("could not read page body from '{url}'"))))?;

        Ok(Page::parse(&body))
    }

    async fn fetch_api(&self, path: &str) -> Result<ApiResponse, FetchError> {
        let url = format!("{}{path}", self.api_base_url);
        let resp = self.get(&self.api, &url).await?;
        let link = resp.headers().get(LINK).and_then(|h| h.to_str().ok()).map(ToString::to_string);
        let body = resp
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(ohno::AppError::new(e).enrich(format!("could not read response body from '{url}'"))))?;

        Ok(ApiResponse::new(link, body.to_vec()))
    }
}

fn trim_base(mut base: String) -> String {
    while base.ends_with('/') {
        let _ = base.pop();
    }
    base
}
