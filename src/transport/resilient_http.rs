//! Retry of transient HTTP failures.
//!
//! Requests run through a [`seatbelt`] stack: a per-attempt timeout wrapped in a retry layer with
//! exponential backoff. Network errors, timeouts and 5xx responses are retried; 429 responses wait
//! for the server's `Retry-After` hint. Every other response is returned to the caller unchanged.

use crate::Result;
use core::time::Duration;
use layered::{Execute, Service, Stack};
use ohno::app_err;
use reqwest::StatusCode;
use reqwest::header::RETRY_AFTER;
use seatbelt::retry::{Backoff, Retry};
use seatbelt::timeout::Timeout;
use seatbelt::{RecoveryInfo, ResilienceContext};
use tick::Clock;

const LOG_TARGET: &str = "      http";

/// Maximum retry attempts (on top of the original request).
const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Timeout for a single attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Wait applied to a 429 response that carries no usable `Retry-After`.
const DEFAULT_RATE_LIMIT_WAIT: Duration = Duration::from_secs(5);

fn retry_after(resp: &reqwest::Response) -> Option<Duration> {
    let seconds = resp.headers().get(RETRY_AFTER)?.to_str().ok()?.parse().ok()?;
    Some(Duration::from_secs(seconds))
}

fn classify(result: &Result<reqwest::Response>) -> RecoveryInfo {
    let resp = match result {
        Ok(resp) => resp,
        Err(_) => return RecoveryInfo::retry(),
    };

    match resp.status() {
        status if status.is_server_error() => RecoveryInfo::retry(),
        StatusCode::TOO_MANY_REQUESTS => RecoveryInfo::retry().delay(retry_after(resp).unwrap_or(DEFAULT_RATE_LIMIT_WAIT)),
        _ => RecoveryInfo::never(),
    }
}

/// Send an HTTP GET request, retrying transient failures with backoff starting at `base_delay`.
pub async fn resilient_get(client: &reqwest::Client, url: &str, base_delay: Duration) -> Result<reqwest::Response> {
    let clock = Clock::new_tokio();
    let context = ResilienceContext::new(&clock).name("page_or_api_get");

    let client = client.clone();
    let service = (
        Retry::layer("retry", &context)
            .clone_input()
            .recovery_with(|result: &Result<reqwest::Response>, _| classify(result))
            .max_retry_attempts(MAX_RETRY_ATTEMPTS)
            .base_delay(base_delay)
            .backoff(Backoff::Exponential)
            .on_retry(|output: &Result<reqwest::Response>, args| match output {
                Ok(resp) => log::debug!(target: LOG_TARGET, "Retrying GET after status {} (attempt {})", resp.status(), args.attempt().index() + 1),
                Err(e) => log::debug!(target: LOG_TARGET, "Retrying GET after error: {e} (attempt {})", args.attempt().index() + 1),
            }),
        Timeout::layer("timeout", &context)
            .timeout_error(|_| app_err!("HTTP request timed out"))
            .timeout(REQUEST_TIMEOUT),
        Execute::new(move |url: String| {
            let client = client.clone();
            async move { client.get(&url).send().await.map_err(ohno::AppError::from) }
        }),
    )
        .into_service();

    service.execute(url.to_string()).await
}
