use super::{ExtractError, Extractor, LOG_TARGET, RenderMismatch, selector};
use crate::misc::{RepoKey, find_suffixed_number};
use crate::model::{Topic, TopicVisit};
use crate::transport::{Page, Transport, element_text, parent_element};
use scraper::Selector;
use std::sync::LazyLock;

static FOLLOWERS_ICON: LazyLock<Selector> = LazyLock::new(|| selector("svg.octicon-people"));
static REPOSITORY_COUNT: LazyLock<Selector> = LazyLock::new(|| selector("h2.h3.color-fg-muted"));
static LANGUAGE_ITEMS: LazyLock<Selector> = LazyLock::new(|| selector("details-menu.select-menu-modal .select-menu-item"));
static SPAN: LazyLock<Selector> = LazyLock::new(|| selector("span"));
static LISTED_REPOSITORIES: LazyLock<Selector> = LazyLock::new(|| selector("article.border.rounded h3 a[href]"));

/// Everything learned from one topic visit.
#[derive(Debug)]
pub struct TopicExtraction {
    pub topic: Topic,
    pub visit: TopicVisit,

    /// Repositories listed on the first page of the topic.
    pub repositories: Vec<RepoKey>,
}

impl<T: Transport> Extractor<'_, T> {
    /// Extract a topic, keeping the main language of `existing` when one was recorded.
    pub async fn topic(&self, name: &str, existing: Option<&Topic>) -> Result<TopicExtraction, ExtractError> {
        log::info!(target: LOG_TARGET, "Extracting topic '{name}'");

        let path = format!("/topics/{name}");
        let page = self.transport.fetch_page(&path).await?;

        let mut topic = Topic::new(name);
        let mut visit = TopicVisit::new(name);

        visit.followers = followers(&page);
        visit.repositories = self.retry.recheck(self.transport, &path, &page, repository_count).await.unwrap_or(-1);

        topic.main_language = match existing.filter(|t| !t.main_language.is_empty()) {
            Some(previous) => previous.main_language.clone(),
            None => main_language(&page),
        };

        let mut repositories: Vec<RepoKey> = Vec::new();
        for link in page.select(&LISTED_REPOSITORIES) {
            let Some(href) = link.value().attr("href") else { continue };

            // the owner link precedes the repository link in each header
            let Ok(key) = RepoKey::parse_exact(href) else { continue };

            if !repositories.contains(&key) {
                repositories.push(key);
            }
        }

        Ok(TopicExtraction {
            topic,
            visit,
            repositories,
        })
    }
}

/// Follower count; small topics cannot be followed and show no counter.
fn followers(page: &Page) -> i64 {
    let Some(label) = page.first(&FOLLOWERS_ICON).and_then(parent_element) else {
        return 0;
    };

    find_suffixed_number(&element_text(label)).unwrap_or_else(|e| {
        log::warn!(target: LOG_TARGET, "Ignoring followers counter: {e}");
        0
    })
}

fn repository_count(page: &Page) -> Result<i64, RenderMismatch> {
    let header = page.first(&REPOSITORY_COUNT).ok_or(RenderMismatch::new("repository count"))?;

    Ok(find_suffixed_number(&element_text(header)).unwrap_or_else(|e| {
        log::warn!(target: LOG_TARGET, "Ignoring repository count: {e}");
        -1
    }))
}

/// The first entry of the language filter is "All languages"; the second is the most common one.
fn main_language(page: &Page) -> String {
    page.select(&LANGUAGE_ITEMS)
        .nth(1)
        .and_then(|item| item.select(&SPAN).next())
        .map(element_text)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::RetryPolicy;
    use core::time::Duration;
    use crate::transport::stub::StubTransport;

    const TOPIC_PAGE: &str = r#"
        <div><svg class="octicon octicon-people mr-1"></svg> 1.2k followers</div>
        <h2 class="h3 color-fg-muted">Here are 4,321 public repositories matching this topic...</h2>
        <details-menu class="select-menu-modal position-absolute">
          <a class="select-menu-item"><span>All</span></a>
          <a class="select-menu-item"><span> JavaScript </span></a>
          <a class="select-menu-item"><span>TypeScript</span></a>
        </details-menu>
        <article class="border rounded color-shadow-small color-bg-subtle my-4">
          <h3><a href="/facebook">facebook</a> / <a href="/facebook/react">react</a></h3>
        </article>
        <article class="border rounded color-shadow-small color-bg-subtle my-4">
          <h3><a href="/vercel">vercel</a> / <a href="/vercel/next.js">next.js</a></h3>
        </article>
    "#;

    fn extractor(transport: &StubTransport) -> Extractor<'_, StubTransport> {
        Extractor::new(transport, RetryPolicy::new(3, Duration::ZERO), 50)
    }

    #[tokio::test]
    async fn test_topic_page() {
        let transport = StubTransport::new().page("/topics/react", TOPIC_PAGE);

        let result = extractor(&transport).topic("react", None).await.unwrap();
        assert_eq!(result.visit.followers, 1200);
        assert_eq!(result.visit.repositories, 4321);
        assert_eq!(result.topic.main_language, "JavaScript");
        assert_eq!(
            result.repositories,
            vec![RepoKey::new("facebook", "react"), RepoKey::new("vercel", "next.js")]
        );
        assert_eq!(transport.count("/topics/react"), 1);
    }

    #[tokio::test]
    async fn test_unfollowable_topic_without_language() {
        let page = r#"<h2 class="h3 color-fg-muted">Here are 12 public repositories</h2>"#;
        let transport = StubTransport::new().page("/topics/mod", page);

        let result = extractor(&transport).topic("mod", None).await.unwrap();
        assert_eq!(result.visit.followers, 0);
        assert_eq!(result.visit.repositories, 12);
        assert_eq!(result.topic.main_language, "");
        assert!(result.repositories.is_empty());
    }

    #[tokio::test]
    async fn test_unrendered_count_exhausts_retries() {
        let transport = StubTransport::new().page("/topics/vue", "<html><body></body></html>");

        let result = extractor(&transport).topic("vue", None).await.unwrap();
        assert_eq!(result.visit.repositories, -1);
        assert_eq!(transport.count("/topics/vue"), 3);
    }

    #[tokio::test]
    async fn test_keeps_recorded_language() {
        let transport = StubTransport::new().page("/topics/react", TOPIC_PAGE);
        let mut existing = Topic::new("react");
        existing.main_language = "TypeScript".to_string();

        let result = extractor(&transport).topic("react", Some(&existing)).await.unwrap();
        assert_eq!(result.topic.main_language, "TypeScript");
    }

    #[tokio::test]
    async fn test_missing_topic_is_not_found() {
        let transport = StubTransport::new();
        assert!(matches!(extractor(&transport).topic("nothing", None).await, Err(ExtractError::NotFound)));
    }
}
