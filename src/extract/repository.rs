use super::{ExtractError, Extractor, LOG_TARGET, RenderMismatch, selector};
use crate::misc::{RepoKey, find_suffixed_number, parse_suffixed_number};
use crate::model::{Commit, Repository, RepositoryVisit};
use crate::transport::{FetchError, Page, Transport, element_text, parent_element};
use scraper::Selector;
use serde::Deserialize;
use std::sync::LazyLock;

static PRIMARY_LINKS: LazyLock<Selector> = LazyLock::new(|| selector("a.Link--primary"));
static FIRST_SPAN: LazyLock<Selector> = LazyLock::new(|| selector("span"));
static LICENSE_ICON: LazyLock<Selector> = LazyLock::new(|| selector("svg.octicon-law"));
static TOPIC_TAGS: LazyLock<Selector> = LazyLock::new(|| selector("a.topic-tag.topic-tag-link"));
static SIDEBAR_HEADINGS: LazyLock<Selector> = LazyLock::new(|| selector("h2.h4.mb-3"));
static LANGUAGE_ITEMS: LazyLock<Selector> = LazyLock::new(|| selector("ul li"));
static LANGUAGE_NAME: LazyLock<Selector> = LazyLock::new(|| selector("span.color-fg-default.text-bold.mr-1"));
static ANCHORS: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));
static STATE_TOGGLES: LazyLock<Selector> = LazyLock::new(|| selector("div.table-list-header-toggle.states a"));

/// Contributors shown on repositories whose page has no contributors panel: only the owner.
const SOLE_CONTRIBUTOR: i64 = 1;

/// Recorded when the contributor count could not be determined.
const UNKNOWN_CONTRIBUTORS: i64 = -1;

/// HTTP status the commits API uses for repositories without any commits.
const EMPTY_REPOSITORY_STATUS: u16 = 409;

#[derive(Debug, Deserialize)]
struct RepoResource {
    forks_count: Option<i64>,
    stargazers_count: Option<i64>,
    subscribers_count: Option<i64>,
    description: Option<String>,
    language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommitResource {
    sha: String,
    commit: CommitDetail,
    author: Option<CommitAccount>,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct CommitAccount {
    login: Option<String>,
}

/// Everything learned from one repository visit.
#[derive(Debug)]
pub struct RepositoryExtraction {
    pub repository: Repository,
    pub visit: RepositoryVisit,
    pub commits: Vec<Commit>,
}

impl<T: Transport> Extractor<'_, T> {
    /// Extract a repository, keeping the main language of `existing` when one was recorded.
    pub async fn repository(&self, key: &RepoKey, existing: Option<&Repository>) -> Result<RepositoryExtraction, ExtractError> {
        log::info!(target: LOG_TARGET, "Extracting repository '{key}'");

        let api_path = format!("/repos/{key}");
        let resource: RepoResource = self.transport.fetch_api(&api_path).await?.json().map_err(ExtractError::Failed)?;

        let page_path = format!("/{key}");
        let page = self.transport.fetch_page(&page_path).await?;

        let mut repository = Repository::new(key);
        let mut visit = RepositoryVisit::new(key);

        repository.description = resource.description.unwrap_or_default();
        visit.stars_amount = resource.stargazers_count.unwrap_or(0);
        visit.watchers_amount = resource.subscribers_count.unwrap_or(0);
        visit.forks_amount = match resource.forks_count {
            Some(forks) => forks,
            None => page_forks(&page, key).unwrap_or(0),
        };

        let contributors_href = format!("/{key}/graphs/contributors");
        visit.contributors_amount = self
            .retry
            .recheck(self.transport, &page_path, &page, |p| contributors(p, &contributors_href))
            .await
            .unwrap_or(UNKNOWN_CONTRIBUTORS);

        repository.license = license(&page);
        repository.tags = page
            .select(&TOPIC_TAGS)
            .map(element_text)
            .filter(|tag| !tag.is_empty())
            .collect();

        repository.main_language = match existing.filter(|r| !r.main_language.is_empty()) {
            Some(previous) => previous.main_language.clone(),
            None => main_language(&page)
                .or(resource.language)
                .unwrap_or_default(),
        };

        let commits = self.recent_commits(key).await;
        visit.commits_amount = self.commit_count(key).await;

        if let Some((open, closed)) = self.state_counts(&format!("/{key}/issues")).await {
            visit.open_issues_amount = open;
            visit.closed_issues_amount = closed;
        }

        if let Some((open, closed)) = self.state_counts(&format!("/{key}/pulls")).await {
            visit.open_pull_requests_amount = open;
            visit.closed_pull_requests_amount = closed;
        }

        Ok(RepositoryExtraction {
            repository,
            visit,
            commits,
        })
    }

    async fn recent_commits(&self, key: &RepoKey) -> Vec<Commit> {
        let path = format!("/repos/{key}/commits?per_page={}", self.recent_commits);
        let resources: Vec<CommitResource> = match self.transport.fetch_api(&path).await.map_err(ExtractError::from) {
            Ok(resp) => match resp.json() {
                Ok(resources) => resources,
                Err(e) => {
                    log::warn!(target: LOG_TARGET, "Could not read recent commits of '{key}': {e:#}");
                    return Vec::new();
                }
            },
            Err(e) => {
                log::debug!(target: LOG_TARGET, "No recent commits for '{key}': {e}");
                return Vec::new();
            }
        };

        resources
            .into_iter()
            .map(|c| {
                let author = c.author.and_then(|a| a.login).unwrap_or_default();
                Commit::new(c.sha, author, key, &c.commit.message)
            })
            .collect()
    }

    /// Total commits, read from the last page number of a one-commit-per-page listing.
    async fn commit_count(&self, key: &RepoKey) -> i64 {
        let path = format!("/repos/{key}/commits?per_page=1");
        let resp = match self.transport.fetch_api(&path).await {
            Ok(resp) => resp,
            Err(FetchError::Status(EMPTY_REPOSITORY_STATUS)) => return 0,
            Err(e) => {
                log::warn!(target: LOG_TARGET, "Could not count commits of '{key}': {e}");
                return -1;
            }
        };

        if let Some(last) = resp.last_page() {
            return i64::try_from(last).unwrap_or(i64::MAX);
        }

        // a single page means at most one commit
        match resp.count_items() {
            Ok(count) => i64::try_from(count).unwrap_or(i64::MAX),
            Err(e) => {
                log::warn!(target: LOG_TARGET, "Could not count commits of '{key}': {e:#}");
                -1
            }
        }
    }

    /// Open and closed counts from the state toggle of an issue or pull-request listing.
    async fn state_counts(&self, path: &str) -> Option<(i64, i64)> {
        let page = match self.transport.fetch_page(path).await {
            Ok(page) => page,
            Err(e) => {
                log::debug!(target: LOG_TARGET, "No listing at '{path}': {e}");
                return None;
            }
        };

        let mut toggles = page.select(&STATE_TOGGLES);
        let open = toggles.next()?;
        let closed = toggles.next()?;

        match (find_suffixed_number(&element_text(open)), find_suffixed_number(&element_text(closed))) {
            (Ok(open), Ok(closed)) => Some((open, closed)),
            (Err(e), _) | (_, Err(e)) => {
                log::warn!(target: LOG_TARGET, "Skipping counts on '{path}': {e}");
                None
            }
        }
    }
}

/// Contributor count from the repository sidebar.
///
/// A page without the contributors link belongs to a single-person repository. A link whose
/// counter is missing has not finished rendering.
fn contributors(page: &Page, href: &str) -> Result<i64, RenderMismatch> {
    let Some(link) = page.select(&PRIMARY_LINKS).find(|a| a.value().attr("href") == Some(href)) else {
        return Ok(SOLE_CONTRIBUTOR);
    };

    let label = link
        .select(&FIRST_SPAN)
        .next()
        .map(element_text)
        .filter(|text| !text.is_empty())
        .ok_or(RenderMismatch::new("contributors counter"))?;

    match parse_suffixed_number(&label) {
        Ok(count) => Ok(count),
        Err(e) => {
            log::warn!(target: LOG_TARGET, "Ignoring contributors counter: {e}");
            Ok(UNKNOWN_CONTRIBUTORS)
        }
    }
}

fn license(page: &Page) -> String {
    page.first(&LICENSE_ICON)
        .and_then(parent_element)
        .map(element_text)
        .unwrap_or_default()
}

fn main_language(page: &Page) -> Option<String> {
    let heading = page.select(&SIDEBAR_HEADINGS).find(|h| element_text(*h) == "Languages")?;
    let panel = parent_element(heading)?;
    let item = panel.select(&LANGUAGE_ITEMS).next()?;
    let name = element_text(item.select(&LANGUAGE_NAME).next()?);

    (!name.is_empty()).then_some(name)
}

fn page_forks(page: &Page, key: &RepoKey) -> Option<i64> {
    let href = format!("/{key}/forks");
    let link = page.select(&ANCHORS).find(|a| a.value().attr("href") == Some(href.as_str()))?;

    match find_suffixed_number(&element_text(link)) {
        Ok(forks) => Some(forks),
        Err(e) => {
            log::warn!(target: LOG_TARGET, "Ignoring forks counter of '{key}': {e}");
            None
        }
    }
}
