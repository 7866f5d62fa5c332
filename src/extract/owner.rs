use super::{ExtractError, Extractor, LOG_TARGET, selector};
use crate::misc::{RepoKey, find_suffixed_number};
use crate::model::{Owner, OwnerKind, OwnerVisit};
use crate::transport::{Page, Transport, element_text};
use scraper::Selector;
use serde::Deserialize;
use std::sync::LazyLock;

static PINNED_LINKS: LazyLock<Selector> = LazyLock::new(|| selector("div.js-pinned-items-reorder-container ol a[href]"));
static HEADING: LazyLock<Selector> = LazyLock::new(|| selector("h2"));

const NOT_FOUND_BODY: &str = "Not Found";

#[derive(Debug, Deserialize)]
struct UserResource {
    avatar_url: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// Everything learned from one owner visit.
#[derive(Debug)]
pub struct OwnerExtraction {
    pub owner: Owner,
    pub visit: OwnerVisit,

    /// Pinned or popular repositories listed on the profile, in page order.
    pub pinned: Vec<RepoKey>,
}

impl<T: Transport> Extractor<'_, T> {
    pub async fn owner(&self, username: &str) -> Result<OwnerExtraction, ExtractError> {
        log::info!(target: LOG_TARGET, "Extracting owner '{username}'");

        let page = self.transport.fetch_page(&format!("/{username}")).await?;

        let mut owner = Owner::new(username);
        let mut visit = OwnerVisit::new(username);

        match self.transport.fetch_api(&format!("/users/{username}")).await {
            Ok(resp) => match resp.json::<UserResource>() {
                Ok(user) => {
                    owner.avatar_url = user.avatar_url.unwrap_or_default();
                    owner.kind = user.kind.as_deref().map_or(OwnerKind::User, OwnerKind::from_api_type);
                }
                Err(e) => log::warn!(target: LOG_TARGET, "Could not read profile of '{username}': {e:#}"),
            },
            Err(e) => log::debug!(target: LOG_TARGET, "No profile resource for '{username}': {e}"),
        }

        let pinned = pinned_repositories(&page);
        visit.contributions_last_year = self.contributions(username).await;

        Ok(OwnerExtraction { owner, visit, pinned })
    }

    /// Contributions in the last year, `-1` when the contributions page is unavailable.
    async fn contributions(&self, username: &str) -> i64 {
        let path = format!("/users/{username}/contributions");
        let page = match self.transport.fetch_page(&path).await {
            Ok(page) => page,
            Err(e) => {
                log::debug!(target: LOG_TARGET, "No contributions for '{username}': {e}");
                return -1;
            }
        };

        if page.text() == NOT_FOUND_BODY {
            return -1;
        }

        let Some(heading) = page.first(&HEADING) else {
            return -1;
        };

        find_suffixed_number(&element_text(heading)).unwrap_or_else(|e| {
            log::warn!(target: LOG_TARGET, "Ignoring contributions of '{username}': {e}");
            -1
        })
    }
}

fn pinned_repositories(page: &Page) -> Vec<RepoKey> {
    let mut pinned: Vec<RepoKey> = Vec::new();
    for link in page.select(&PINNED_LINKS) {
        let Some(href) = link.value().attr("href") else { continue };

        // links such as `/owner/repo/stargazers` are not repositories
        let Ok(key) = RepoKey::parse_exact(href) else { continue };

        if !pinned.contains(&key) {
            pinned.push(key);
        }
    }

    pinned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::RetryPolicy;
    use crate::transport::stub::StubTransport;
    use core::time::Duration;

    const PROFILE: &str = r#"
        <div class="js-pinned-items-reorder-container">
          <ol>
            <li><a href="/octo/widget">widget</a><a href="/octo/widget/stargazers">12</a><a href="/octo/widget/forks">3</a></li>
            <li><a href="/other/gadget">gadget</a></li>
            <li><a href="/octo/widget">widget again</a></li>
          </ol>
        </div>
        <a href="/not/pinned">elsewhere</a>
    "#;

    const CONTRIBUTIONS: &str = r#"<div><h2 class="f4 text-normal mb-2">
        1,234 contributions
        in the last year
      </h2></div>"#;

    fn extractor(transport: &StubTransport) -> Extractor<'_, StubTransport> {
        Extractor::new(transport, RetryPolicy::new(3, Duration::ZERO), 50)
    }

    #[tokio::test]
    async fn test_owner_profile() {
        let transport = StubTransport::new()
            .page("/octo", PROFILE)
            .api("/users/octo", r#"{"avatar_url": "https://avatars/1", "type": "Organization"}"#)
            .page("/users/octo/contributions", CONTRIBUTIONS);

        let result = extractor(&transport).owner("octo").await.unwrap();
        assert_eq!(result.owner.avatar_url, "https://avatars/1");
        assert_eq!(result.owner.kind, OwnerKind::Organization);
        assert_eq!(result.visit.contributions_last_year, 1234);
        assert_eq!(result.pinned, vec![RepoKey::new("octo", "widget"), RepoKey::new("other", "gadget")]);
    }

    #[tokio::test]
    async fn test_missing_contributions_is_sentinel() {
        let transport = StubTransport::new().page("/octo", "<html></html>");

        let result = extractor(&transport).owner("octo").await.unwrap();
        assert_eq!(result.visit.contributions_last_year, -1);
        assert_eq!(result.owner.avatar_url, "");
        assert_eq!(result.owner.kind, OwnerKind::User);
        assert!(result.pinned.is_empty());
    }

    #[tokio::test]
    async fn test_not_found_contributions_body_is_sentinel() {
        let transport = StubTransport::new()
            .page("/octo", "<html></html>")
            .page("/users/octo/contributions", "Not Found");

        let result = extractor(&transport).owner("octo").await.unwrap();
        assert_eq!(result.visit.contributions_last_year, -1);
    }

    #[tokio::test]
    async fn test_missing_profile_is_not_found() {
        let transport = StubTransport::new();
        let result = extractor(&transport).owner("ghost").await;
        assert!(matches!(result, Err(ExtractError::NotFound)));
    }
}
