use super::{Entity, Visit, now_timestamp, null_as_empty, unknown};
use crate::misc::{RepoKey, identifier};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Identity and slowly-changing attributes of a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub owner: String,
    pub repo: String,

    /// Recorded on first observation and never re-derived afterwards.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub main_language: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub license: String,

    /// Topic names the repository is tagged with.
    #[serde(default)]
    pub tags: BTreeSet<String>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
}

impl Repository {
    #[must_use]
    pub fn new(key: &RepoKey) -> Self {
        Self {
            owner: key.owner().to_string(),
            repo: key.name().to_string(),
            main_language: String::new(),
            license: String::new(),
            tags: BTreeSet::new(),
            description: String::new(),
        }
    }

    #[must_use]
    pub fn repo_key(&self) -> RepoKey {
        RepoKey::new(&self.owner, &self.repo)
    }
}

impl Entity for Repository {
    fn key(&self) -> String {
        identifier(&self.owner, &self.repo)
    }
}

/// Measurements taken during one visit of a repository.
///
/// Pull-request counts default to `-1` because the pull-request listing is not always rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryVisit {
    pub owner: String,
    pub repo: String,
    visit_timestamp: i64,

    #[serde(default)]
    pub forks_amount: i64,

    #[serde(default)]
    pub commits_amount: i64,

    #[serde(default)]
    pub stars_amount: i64,

    #[serde(default)]
    pub watchers_amount: i64,

    #[serde(default)]
    pub contributors_amount: i64,

    #[serde(default)]
    pub open_issues_amount: i64,

    #[serde(default)]
    pub closed_issues_amount: i64,

    #[serde(default = "unknown")]
    pub open_pull_requests_amount: i64,

    #[serde(default = "unknown")]
    pub closed_pull_requests_amount: i64,
}

impl RepositoryVisit {
    /// Start a visit captured now.
    #[must_use]
    pub fn new(key: &RepoKey) -> Self {
        Self::captured_at(key, now_timestamp())
    }

    #[must_use]
    pub fn captured_at(key: &RepoKey, visit_timestamp: i64) -> Self {
        Self {
            owner: key.owner().to_string(),
            repo: key.name().to_string(),
            visit_timestamp,
            forks_amount: 0,
            commits_amount: 0,
            stars_amount: 0,
            watchers_amount: 0,
            contributors_amount: 0,
            open_issues_amount: 0,
            closed_issues_amount: 0,
            open_pull_requests_amount: -1,
            closed_pull_requests_amount: -1,
        }
    }
}

impl Visit for RepositoryVisit {
    fn key(&self) -> String {
        identifier(&self.owner, &self.repo)
    }

    fn visit_timestamp(&self) -> i64 {
        self.visit_timestamp
    }
}

/// A commit sampled from a repository's recent history, deduplicated by SHA.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,

    /// Login of the author, empty when the commit is not linked to an account.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub commit_author: String,

    pub repo_owner: String,
    pub repo: String,

    /// First line of the commit message.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub message: String,
}

impl Commit {
    #[must_use]
    pub fn new(sha: impl Into<String>, author: impl Into<String>, key: &RepoKey, message: &str) -> Self {
        Self {
            sha: sha.into(),
            commit_author: author.into(),
            repo_owner: key.owner().to_string(),
            repo: key.name().to_string(),
            message: first_line(message).to_string(),
        }
    }
}

impl Entity for Commit {
    fn key(&self) -> String {
        self.sha.clone()
    }
}

pub(crate) fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("").trim_end()
}
