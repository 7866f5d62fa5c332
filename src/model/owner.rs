use super::{Entity, Visit, now_timestamp, null_as_empty, unknown};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The kind of account owning repositories.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OwnerKind {
    #[default]
    User,
    Organization,
}

impl OwnerKind {
    /// Interpret the `type` field of a users API resource.
    #[must_use]
    pub fn from_api_type(value: &str) -> Self {
        if value.eq_ignore_ascii_case("organization") {
            Self::Organization
        } else {
            Self::User
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Organization => "organization",
        }
    }
}

/// A user or organization that owns repositories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub username: String,

    #[serde(default)]
    pub kind: OwnerKind,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub avatar_url: String,

    /// Names of every repository ever attributed to this owner.
    #[serde(default)]
    pub repositories: BTreeSet<String>,
}

impl Owner {
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            kind: OwnerKind::User,
            avatar_url: String::new(),
            repositories: BTreeSet::new(),
        }
    }

    /// Fold in the repository names known from an earlier record of the same owner.
    pub fn absorb_repositories(&mut self, previous: &Self) {
        self.repositories.extend(previous.repositories.iter().cloned());
    }
}

impl Entity for Owner {
    fn key(&self) -> String {
        self.username.clone()
    }
}

/// Yearly contribution count observed on an owner's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerVisit {
    pub username: String,
    visit_timestamp: i64,

    /// `-1` when the contributions page was unavailable.
    #[serde(default = "unknown")]
    pub contributions_last_year: i64,
}

impl OwnerVisit {
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self::captured_at(username, now_timestamp())
    }

    #[must_use]
    pub fn captured_at(username: impl Into<String>, visit_timestamp: i64) -> Self {
        Self {
            username: username.into(),
            visit_timestamp,
            contributions_last_year: -1,
        }
    }
}

impl Visit for OwnerVisit {
    fn key(&self) -> String {
        self.username.clone()
    }

    fn visit_timestamp(&self) -> i64 {
        self.visit_timestamp
    }
}
