//! Records produced by the crawler.
//!
//! Every trackable subject has an identity record implementing [`Entity`], a single current row
//! per key that is overwritten on re-extraction, and most also have a measurement record
//! implementing [`Visit`], appended once per crawl session and never mutated afterwards.

mod owner;
mod repository;
mod topic;
mod trending;

pub use owner::{Owner, OwnerKind, OwnerVisit};
pub use repository::{Commit, Repository, RepositoryVisit};
pub use topic::{Topic, TopicVisit};
pub use trending::TrendingVisit;

use chrono::Utc;
use serde::{Deserialize, Deserializer};

/// A durable identity record keyed by its natural key.
pub trait Entity {
    /// The natural key under which this record is stored.
    fn key(&self) -> String;
}

/// A point-in-time measurement of a subject.
pub trait Visit {
    /// The key of the measured subject.
    fn key(&self) -> String;

    /// Capture time in seconds since the Unix epoch (UTC).
    fn visit_timestamp(&self) -> i64;
}

/// Current time as seconds since the Unix epoch.
pub(crate) fn now_timestamp() -> i64 {
    Utc::now().timestamp()
}

/// Accept `null` wherever a string is expected and read it as empty.
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

pub(crate) const fn unknown() -> i64 {
    -1
}
