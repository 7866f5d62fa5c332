use super::doc;
use crate::Result;
use crate::misc::RepoKey;
use crate::model::{Commit, Entity, Owner, Repository, Topic, TrendingVisit};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::{Path, PathBuf};

/// Durable identity records, one current row per natural key.
///
/// Maps are ordered so that saving the same content always produces the same bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityStore {
    #[serde(default)]
    pub repositories: BTreeMap<String, Repository>,

    #[serde(default)]
    pub owners: BTreeMap<String, Owner>,

    #[serde(default)]
    pub topics: BTreeMap<String, Topic>,

    #[serde(default)]
    pub commits: BTreeMap<String, Commit>,

    /// Latest trending observation per language filter.
    #[serde(default)]
    pub trending_per_language: BTreeMap<String, Vec<TrendingVisit>>,
}

impl IdentityStore {
    pub const FILE_NAME: &'static str = "persistence.json";

    #[must_use]
    pub fn path(data_dir: &Path) -> PathBuf {
        data_dir.join(Self::FILE_NAME)
    }

    /// Load the store of a data directory; a directory without one starts empty.
    pub fn load(data_dir: &Path) -> Result<Self> {
        doc::load_or_default(Self::path(data_dir))
    }

    pub fn save(&self, data_dir: &Path) -> Result<()> {
        doc::save(self, Self::path(data_dir))
    }

    pub fn upsert_repository(&mut self, repository: Repository) {
        upsert(&mut self.repositories, repository);
    }

    /// Store an owner record, keeping every repository name attributed to earlier records.
    pub fn upsert_owner(&mut self, mut owner: Owner) {
        if let Some(previous) = self.owners.get(&owner.key()) {
            owner.absorb_repositories(previous);
        }
        upsert(&mut self.owners, owner);
    }

    pub fn upsert_topic(&mut self, topic: Topic) {
        upsert(&mut self.topics, topic);
    }

    /// Record a commit unless its SHA is already known. Returns whether it was new.
    pub fn insert_commit(&mut self, commit: Commit) -> bool {
        match self.commits.entry(commit.key()) {
            Entry::Vacant(e) => {
                let _ = e.insert(commit);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Add a repository to its owner's set. Returns `false` when the owner is unknown.
    pub fn attribute(&mut self, key: &RepoKey) -> bool {
        match self.owners.get_mut(key.owner()) {
            Some(owner) => {
                let _ = owner.repositories.insert(key.name().to_string());
                true
            }
            None => false,
        }
    }
}

fn upsert<E: Entity>(map: &mut BTreeMap<String, E>, entity: E) {
    let _ = map.insert(entity.key(), entity);
}
