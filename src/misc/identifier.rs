use core::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A URL path that does not end in an `owner/name` pair.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{path}' does not identify a repository as owner/name")]
pub struct MalformedIdentifier {
    path: String,
}

impl MalformedIdentifier {
    fn new(path: &str) -> Self {
        Self { path: path.to_string() }
    }
}

/// Canonical `owner/name` key of a repository.
#[must_use]
pub fn identifier(owner: &str, name: &str) -> String {
    format!("{owner}/{name}")
}

/// Split the trailing `owner/name` pair out of a URL path such as `/owner/name` or `https://host/owner/name`.
pub fn split_identifier(path: &str) -> Result<(String, String), MalformedIdentifier> {
    let trimmed = path.trim();
    let mut segments = trimmed.rsplit('/');

    let name = segments.next().filter(|s| is_segment(s));
    let owner = segments.next().filter(|s| is_segment(s));

    match (owner, name) {
        (Some(owner), Some(name)) => Ok((owner.to_string(), name.to_string())),
        _ => Err(MalformedIdentifier::new(path)),
    }
}

fn is_segment(s: &str) -> bool {
    !s.is_empty() && !s.contains(char::is_whitespace)
}

/// Identity of a repository on the hosting platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RepoKey {
    owner: String,
    name: String,
}

impl RepoKey {
    #[must_use]
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parse the `owner/name` suffix of a URL path.
    pub fn parse(path: &str) -> Result<Self, MalformedIdentifier> {
        let (owner, name) = split_identifier(path)?;
        Ok(Self { owner, name })
    }

    /// Parse a site-relative link that consists of exactly `owner/name`, with an optional leading slash.
    ///
    /// Links with more segments, such as `/owner/name/stargazers`, are rejected.
    pub fn parse_exact(path: &str) -> Result<Self, MalformedIdentifier> {
        let trimmed = path.trim();
        let relative = trimmed.strip_prefix('/').unwrap_or(trimmed);
        if relative.split('/').count() != 2 {
            return Err(MalformedIdentifier::new(path));
        }

        Self::parse(relative)
    }

    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The canonical `owner/name` form, also used as the key in stores.
    #[must_use]
    pub fn identifier(&self) -> String {
        identifier(&self.owner, &self.name)
    }
}

impl Display for RepoKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
