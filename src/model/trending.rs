use super::{Visit, now_timestamp};
use crate::misc::{RepoKey, identifier};
use serde::{Deserialize, Serialize};

/// A repository listed on a trending page, ranked by stars gained that day.
///
/// Trending entries have no identity record of their own beyond the repository key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendingVisit {
    pub owner: String,
    pub repo: String,

    /// Language filter of the page the entry was listed on, empty for all languages.
    #[serde(default)]
    pub language: String,

    visit_timestamp: i64,

    #[serde(default)]
    pub stars_today: i64,
}

impl TrendingVisit {
    #[must_use]
    pub fn new(key: &RepoKey, language: impl Into<String>) -> Self {
        Self::captured_at(key, language, now_timestamp())
    }

    #[must_use]
    pub fn captured_at(key: &RepoKey, language: impl Into<String>, visit_timestamp: i64) -> Self {
        Self {
            owner: key.owner().to_string(),
            repo: key.name().to_string(),
            language: language.into(),
            visit_timestamp,
            stars_today: 0,
        }
    }

    #[must_use]
    pub fn repo_key(&self) -> RepoKey {
        RepoKey::new(&self.owner, &self.repo)
    }
}

impl Visit for TrendingVisit {
    fn key(&self) -> String {
        identifier(&self.owner, &self.repo)
    }

    fn visit_timestamp(&self) -> i64 {
        self.visit_timestamp
    }
}
