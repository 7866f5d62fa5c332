use super::{ExtractError, Extractor, LOG_TARGET, selector};
use crate::misc::{RepoKey, find_suffixed_number};
use crate::model::TrendingVisit;
use crate::transport::{Transport, element_text};
use scraper::{ElementRef, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

static CONTAINER: LazyLock<Selector> = LazyLock::new(|| selector("div[data-hpc]"));
static ARTICLES: LazyLock<Selector> = LazyLock::new(|| selector("article"));
static LINKS: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));
static STARS_TODAY: LazyLock<Selector> = LazyLock::new(|| selector("span.d-inline-block.float-sm-right"));

/// Base for resolving site-relative links; only the path and query are used.
static LINK_BASE: LazyLock<Url> = LazyLock::new(|| Url::parse("https://localhost/").expect("valid url"));

const LOGIN_PATH: &str = "/login";
const RETURN_TO: &str = "return_to";

/// Path of the daily trending page for a language filter, empty for all languages.
#[must_use]
pub fn trending_path(language: &str) -> String {
    let mut url = LINK_BASE.join("trending").expect("valid url");
    if let Ok(mut segments) = url.path_segments_mut() {
        let _ = segments.push(&language.to_lowercase());
    }

    format!("{}?since=daily", url.path())
}

impl<T: Transport> Extractor<'_, T> {
    /// Extract one trending page, ranked by stars gained today.
    ///
    /// Entries are deduplicated within the page; the same repository may still appear on the
    /// pages of other languages.
    pub async fn trending(&self, language: &str) -> Result<Vec<TrendingVisit>, ExtractError> {
        log::info!(target: LOG_TARGET, "Extracting trending repositories for '{language}'");

        let page = self.transport.fetch_page(&trending_path(language)).await?;
        let Some(container) = page.first(&CONTAINER) else {
            log::warn!(target: LOG_TARGET, "No trending list for '{language}'");
            return Ok(Vec::new());
        };

        let mut seen = HashSet::new();
        let mut entries = Vec::new();

        for article in container.select(&ARTICLES) {
            let Some(key) = article.select(&LINKS).find_map(repository_link) else {
                log::debug!(target: LOG_TARGET, "Skipping trending entry without a repository link");
                continue;
            };

            if !seen.insert(key.clone()) {
                continue;
            }

            let mut entry = TrendingVisit::new(&key, language);
            entry.stars_today = stars_today(article);
            entries.push(entry);
        }

        entries.sort_by(|a, b| b.stars_today.cmp(&a.stars_today));
        log::debug!(target: LOG_TARGET, "{} trending repositories for '{language}'", entries.len());

        Ok(entries)
    }
}

/// The repository a link points at, following login redirects.
fn repository_link(link: ElementRef<'_>) -> Option<RepoKey> {
    let href = link.value().attr("href")?;
    if !href.starts_with('/') {
        return None;
    }

    let url = LINK_BASE.join(href).ok()?;
    let path = if url.path() == LOGIN_PATH {
        url.query_pairs().find(|(k, _)| k == RETURN_TO).map(|(_, v)| v.into_owned())?
    } else {
        url.path().to_string()
    };

    // exactly `/owner/repo`
    if path.matches('/').count() != 2 {
        return None;
    }

    RepoKey::parse_exact(&path).ok()
}

fn stars_today(article: ElementRef<'_>) -> i64 {
    let Some(counter) = article.select(&STARS_TODAY).next() else {
        return 0;
    };

    find_suffixed_number(&element_text(counter)).unwrap_or_else(|e| {
        log::warn!(target: LOG_TARGET, "Ignoring stars counter: {e}");
        0
    })
}
