use super::LOG_TARGET;
use crate::transport::{FetchError, Page, Transport};
use core::time::Duration;
use layered::{Service, Stack};
use seatbelt::retry::{Backoff, Retry};
use seatbelt::{RecoveryInfo, ResilienceContext};
use thiserror::Error;
use tick::Clock;

/// An expected page fragment was absent, most likely because it is rendered client-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{what} was not rendered")]
pub struct RenderMismatch {
    what: &'static str,
}

impl RenderMismatch {
    #[must_use]
    pub const fn new(what: &'static str) -> Self {
        Self { what }
    }
}

type Observation<R> = Result<Result<R, RenderMismatch>, FetchError>;

/// One refetch of a page followed by the lookup.
struct Refetch<'a, T, F> {
    transport: &'a T,
    path: &'a str,
    lookup: &'a F,
}

impl<T, R, F> Service<()> for Refetch<'_, T, F>
where
    T: Transport,
    R: Send,
    F: Fn(&Page) -> Result<R, RenderMismatch> + Sync,
{
    type Out = Observation<R>;

    async fn execute(&self, (): ()) -> Self::Out {
        let page = self.transport.fetch_page(self.path).await?;
        Ok((self.lookup)(&page))
    }
}

/// Bounded refetching for lookups of eventually-consistent page content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// `max_attempts` counts every observation of the page, including the one already fetched.
    #[must_use]
    pub const fn new(max_attempts: u32, delay: Duration) -> Self {
        Self { max_attempts, delay }
    }

    /// Run `lookup` on `page`, refetching `path` at a constant pace while it reports a [`RenderMismatch`].
    ///
    /// Returns `None` when every attempt mismatched or a refetch failed.
    pub async fn recheck<T, R, F>(&self, transport: &T, path: &str, page: &Page, lookup: F) -> Option<R>
    where
        T: Transport,
        R: Send,
        F: Fn(&Page) -> Result<R, RenderMismatch> + Sync,
    {
        let mismatch = match lookup(page) {
            Ok(value) => return Some(value),
            Err(e) => e,
        };

        if self.max_attempts <= 1 {
            log::warn!(target: LOG_TARGET, "{mismatch} on '{path}'");
            return None;
        }

        log::debug!(target: LOG_TARGET, "{mismatch} on '{path}', refetching");

        let clock = Clock::new_tokio();
        let context = ResilienceContext::new(&clock).name("render_recheck");
        let retry_path = path.to_string();

        // the first observation came from the caller, so the service only sees the refetches
        let service = (
            Retry::layer("recheck", &context)
                .clone_input()
                .recovery_with(|out: &Observation<R>, _| {
                    if matches!(out, Ok(Err(_))) {
                        RecoveryInfo::retry()
                    } else {
                        RecoveryInfo::never()
                    }
                })
                .max_retry_attempts(self.max_attempts - 2)
                .base_delay(self.delay)
                .backoff(Backoff::Constant)
                .use_jitter(false)
                .on_retry(move |_, args| {
                    log::debug!(target: LOG_TARGET, "Refetching '{retry_path}' (attempt {})", args.attempt().index() + 2);
                }),
            Refetch {
                transport,
                path,
                lookup: &lookup,
            },
        )
            .into_service();

        clock.delay(self.delay).await;

        match service.execute(()).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(mismatch)) => {
                log::warn!(target: LOG_TARGET, "{mismatch} on '{path}' after {} attempts", self.max_attempts);
                None
            }
            Err(e) => {
                log::warn!(target: LOG_TARGET, "Could not refetch '{path}': {e}");
                None
            }
        }
    }
}
