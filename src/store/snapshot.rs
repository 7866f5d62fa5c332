use super::doc;
use crate::Result;
use crate::model::{OwnerVisit, RepositoryVisit, TopicVisit, TrendingVisit, Visit, now_timestamp};
use chrono::{NaiveDate, Utc};
use ohno::IntoAppError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const VISITS_DIR: &str = "visits";
const FILE_PREFIX: &str = "visit_";
const FILE_EXTENSION: &str = ".json";

/// The measurements taken during one crawl session, stored once per calendar date.
///
/// Every subject is recorded at most once; later records for the same key are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitSnapshot {
    #[serde(default)]
    date: NaiveDate,

    /// Session start in seconds since the Unix epoch.
    #[serde(default)]
    captured_at: i64,

    #[serde(default)]
    repositories: BTreeMap<String, RepositoryVisit>,

    #[serde(default)]
    owners: BTreeMap<String, OwnerVisit>,

    #[serde(default)]
    topics: BTreeMap<String, TopicVisit>,

    #[serde(default)]
    trending_per_language: BTreeMap<String, Vec<TrendingVisit>>,
}

impl VisitSnapshot {
    #[must_use]
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            captured_at: now_timestamp(),
            repositories: BTreeMap::new(),
            owners: BTreeMap::new(),
            topics: BTreeMap::new(),
            trending_per_language: BTreeMap::new(),
        }
    }

    /// A fresh snapshot for the current UTC date.
    #[must_use]
    pub fn today() -> Self {
        Self::new(Utc::now().date_naive())
    }

    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    #[must_use]
    pub const fn captured_at(&self) -> i64 {
        self.captured_at
    }

    #[must_use]
    pub fn file_name(date: NaiveDate) -> String {
        format!("{FILE_PREFIX}{}{FILE_EXTENSION}", date.format("%Y-%m-%d"))
    }

    #[must_use]
    pub fn path(data_dir: &Path, date: NaiveDate) -> PathBuf {
        data_dir.join(VISITS_DIR).join(Self::file_name(date))
    }

    /// Write the snapshot to its dated file, replacing an earlier one of the same date.
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        doc::save(self, Self::path(data_dir, self.date))
    }

    pub fn load(path: &Path) -> Result<Self> {
        doc::load(path)
    }

    /// All snapshot files of a data directory, ordered by file name and therefore by date.
    pub fn list(data_dir: &Path) -> Result<Vec<PathBuf>> {
        let dir = data_dir.join(VISITS_DIR);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e).into_app_err_with(|| format!("unable to read directory '{}'", dir.display())),
        };

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.into_app_err_with(|| format!("unable to read directory '{}'", dir.display()))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };

            if name.starts_with(FILE_PREFIX) && name.ends_with(FILE_EXTENSION) {
                paths.push(entry.path());
            }
        }

        paths.sort();
        Ok(paths)
    }

    /// Record a repository measurement. Returns `false` if the repository was already measured.
    pub fn record_repository(&mut self, visit: RepositoryVisit) -> bool {
        insert_once(&mut self.repositories, visit)
    }

    pub fn record_owner(&mut self, visit: OwnerVisit) -> bool {
        insert_once(&mut self.owners, visit)
    }

    pub fn record_topic(&mut self, visit: TopicVisit) -> bool {
        insert_once(&mut self.topics, visit)
    }

    /// Record the ranked entries of one trending page. Returns `false` if the language was already recorded.
    pub fn record_trending(&mut self, language: &str, entries: Vec<TrendingVisit>) -> bool {
        match self.trending_per_language.entry(language.to_string()) {
            Entry::Vacant(e) => {
                let _ = e.insert(entries);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    #[must_use]
    pub fn has_repository(&self, key: &str) -> bool {
        self.repositories.contains_key(key)
    }

    #[must_use]
    pub fn has_owner(&self, username: &str) -> bool {
        self.owners.contains_key(username)
    }

    #[must_use]
    pub fn has_topic(&self, name: &str) -> bool {
        self.topics.contains_key(name)
    }

    #[must_use]
    pub fn has_trending(&self, language: &str) -> bool {
        self.trending_per_language.contains_key(language)
    }

    #[must_use]
    pub const fn repositories(&self) -> &BTreeMap<String, RepositoryVisit> {
        &self.repositories
    }

    #[must_use]
    pub const fn owners(&self) -> &BTreeMap<String, OwnerVisit> {
        &self.owners
    }

    #[must_use]
    pub const fn topics(&self) -> &BTreeMap<String, TopicVisit> {
        &self.topics
    }

    #[must_use]
    pub const fn trending_per_language(&self) -> &BTreeMap<String, Vec<TrendingVisit>> {
        &self.trending_per_language
    }
}

fn insert_once<V: Visit>(map: &mut BTreeMap<String, V>, visit: V) -> bool {
    match map.entry(visit.key()) {
        Entry::Vacant(e) => {
            let _ = e.insert(visit);
            true
        }
        Entry::Occupied(_) => false,
    }
}
