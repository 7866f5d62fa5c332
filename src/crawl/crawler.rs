use super::frontier::{Frontier, TopicWatchList};
use super::progress::{CrawlObserver, Phase, PhaseCounters};
use super::summary::CrawlSummary;
use crate::Result;
use crate::config::Config;
use crate::extract::{ExtractError, Extractor, RetryPolicy};
use crate::misc::RepoKey;
use crate::model::Owner;
use crate::store::{IdentityStore, VisitSnapshot};
use crate::transport::Transport;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const LOG_TARGET: &str = "     crawl";

/// The crawl loop and all state it owns for one session.
///
/// Built from the persisted identity store of a data directory; every run ends by saving the
/// store and the session's snapshot back to it.
#[derive(Debug)]
pub struct Crawler<'a, T> {
    extractor: Extractor<'a, T>,
    data_dir: PathBuf,
    store: IdentityStore,
    snapshot: VisitSnapshot,
    frontier: Frontier,
    watch_list: TopicWatchList,
    trending_languages: Vec<String>,
    budget: u64,
    export_interval: u64,
    attempts: u64,
    counters: Arc<PhaseCounters>,
}

impl<'a, T: Transport> Crawler<'a, T> {
    /// Load the identity store of `data_dir` and seed a session from it.
    pub fn new(transport: &'a T, config: &Config, data_dir: &Path) -> Result<Self> {
        let store = IdentityStore::load(data_dir)?;
        Ok(Self::with_store(transport, config, data_dir, store, VisitSnapshot::today()))
    }

    /// Seed a session from an already loaded store.
    ///
    /// Every known repository and owner is queued for a fresh visit and the tags of known
    /// repositories join the topic watch-list while it has room.
    #[must_use]
    pub fn with_store(transport: &'a T, config: &Config, data_dir: &Path, store: IdentityStore, snapshot: VisitSnapshot) -> Self {
        let retry = RetryPolicy::new(config.render_retry_attempts, config.render_retry_delay());
        let mut frontier = Frontier::new();
        let mut watch_list = TopicWatchList::new(&config.topics, config.max_topics);

        for repository in store.repositories.values() {
            let _ = frontier.push_repository(repository.repo_key(), &snapshot);
            for tag in &repository.tags {
                let _ = watch_list.add(tag);
            }
        }

        for username in store.owners.keys() {
            let _ = frontier.push_owner(username, &snapshot);
        }

        // known repositories never consume the discovery budget
        let known = store.repositories.len() as u64;
        log::debug!(target: LOG_TARGET, "Seeded {known} repositories and {} owners", store.owners.len());

        Self {
            extractor: Extractor::new(transport, retry, config.recent_commits),
            data_dir: data_dir.to_path_buf(),
            store,
            snapshot,
            frontier,
            watch_list,
            trending_languages: config.trending_languages.clone(),
            budget: config.max_repository_visits.saturating_add(known),
            export_interval: config.export_interval.max(1),
            attempts: 0,
            counters: Arc::new(PhaseCounters::default()),
        }
    }

    #[must_use]
    pub const fn store(&self) -> &IdentityStore {
        &self.store
    }

    #[must_use]
    pub const fn snapshot(&self) -> &VisitSnapshot {
        &self.snapshot
    }

    #[must_use]
    pub fn watch_list(&self) -> &[String] {
        self.watch_list.topics()
    }

    /// Counts of the running phase, for observers that poll.
    #[must_use]
    pub fn counters(&self) -> Arc<PhaseCounters> {
        Arc::clone(&self.counters)
    }

    /// Crawl trending pages, then topics, then queued owners, then queued repositories.
    ///
    /// Failures of single subjects are logged and skipped. Failing to persist aborts the run.
    pub async fn run(&mut self, observer: &dyn CrawlObserver) -> Result<CrawlSummary> {
        let outcome = self.run_phases(observer).await;
        observer.finished();
        let budget_exhausted = outcome?;

        let summary = CrawlSummary {
            repositories_visited: self.snapshot.repositories().len(),
            repositories_dropped: self.frontier.dropped(),
            repositories_remaining: self.frontier.pending_repositories(),
            owners_visited: self.snapshot.owners().len(),
            topics_visited: self.snapshot.topics().len(),
            trending_entries: self.snapshot.trending_per_language().values().map(Vec::len).sum(),
            commits_known: self.store.commits.len(),
            budget_exhausted,
        };

        log::info!(target: LOG_TARGET, "Crawl finished: {} repositories visited", summary.repositories_visited);
        Ok(summary)
    }

    async fn run_phases(&mut self, observer: &dyn CrawlObserver) -> Result<bool> {
        self.visit_trending(observer).await;
        self.visit_topics(observer).await;
        self.visit_owners(observer).await;
        let budget_exhausted = self.visit_repositories(observer).await?;

        self.persist()?;
        observer.checkpoint(self.attempts);
        Ok(budget_exhausted)
    }

    /// Write the identity store and the session snapshot to the data directory.
    pub fn persist(&self) -> Result<()> {
        self.store.save(&self.data_dir)?;
        self.snapshot.save(&self.data_dir)?;
        log::debug!(target: LOG_TARGET, "Persisted state to '{}'", self.data_dir.display());
        Ok(())
    }

    fn start_phase(&self, phase: Phase, total: Option<u64>, observer: &dyn CrawlObserver) {
        log::debug!(target: LOG_TARGET, "Entering phase {phase}");
        self.counters.reset();
        self.update_queued();
        observer.phase_started(phase, total);
    }

    fn update_queued(&self) {
        self.counters.set_queued(self.frontier.pending_repositories());
    }

    async fn visit_trending(&mut self, observer: &dyn CrawlObserver) {
        let languages = self.trending_languages.clone();
        self.start_phase(Phase::Trending, Some(languages.len() as u64), observer);

        for language in &languages {
            if !self.snapshot.has_trending(language) {
                match self.extractor.trending(language).await {
                    Ok(entries) => {
                        for entry in &entries {
                            let _ = self.frontier.push_repository(entry.repo_key(), &self.snapshot);
                        }

                        let _ = self.store.trending_per_language.insert(language.clone(), entries.clone());
                        let _ = self.snapshot.record_trending(language, entries);
                    }
                    Err(e) => log::warn!(target: LOG_TARGET, "Skipping trending page for '{language}': {e}"),
                }
            }

            self.update_queued();
            self.counters.finish_one();
        }
    }

    async fn visit_topics(&mut self, observer: &dyn CrawlObserver) {
        let topics = self.watch_list.topics().to_vec();
        self.start_phase(Phase::Topics, Some(topics.len() as u64), observer);

        for name in &topics {
            if !self.snapshot.has_topic(name) {
                let existing = self.store.topics.get(name);
                match self.extractor.topic(name, existing).await {
                    Ok(extraction) => {
                        for key in extraction.repositories {
                            let _ = self.frontier.push_repository(key, &self.snapshot);
                        }

                        self.store.upsert_topic(extraction.topic);
                        let _ = self.snapshot.record_topic(extraction.visit);
                    }
                    Err(e) => log::warn!(target: LOG_TARGET, "Skipping topic '{name}': {e}"),
                }
            }

            self.update_queued();
            self.counters.finish_one();
        }
    }

    async fn visit_owners(&mut self, observer: &dyn CrawlObserver) {
        // owners pin repositories, never other owners, but the queue length is still unknown up front
        self.start_phase(Phase::Owners, None, observer);

        while let Some(username) = self.frontier.pop_owner(&self.snapshot) {
            let _ = self.visit_owner(&username).await;
            self.update_queued();
            self.counters.finish_one();
        }
    }

    /// Returns whether the repository queue was cut short by the visit budget.
    async fn visit_repositories(&mut self, observer: &dyn CrawlObserver) -> Result<bool> {
        self.start_phase(Phase::Repositories, Some(self.budget), observer);

        while self.attempts < self.budget {
            let Some(key) = self.frontier.pop_repository(&self.snapshot) else {
                log::info!(target: LOG_TARGET, "Repository queue empty");
                return Ok(false);
            };

            self.visit_repository(key).await;
            self.attempts += 1;

            self.update_queued();
            self.counters.finish_one();

            if self.attempts % self.export_interval == 0 {
                self.persist()?;
                observer.checkpoint(self.attempts);
            }
        }

        let remaining = self.frontier.pending_repositories();
        if remaining > 0 {
            log::info!(target: LOG_TARGET, "Visit budget of {} reached with {remaining} repositories queued", self.budget);
            observer.budget_reached(self.budget, remaining);
            return Ok(true);
        }

        Ok(false)
    }

    async fn visit_repository(&mut self, key: RepoKey) {
        let existing = self.store.repositories.get(&key.identifier());
        let extraction = match self.extractor.repository(&key, existing).await {
            Ok(extraction) => extraction,
            Err(ExtractError::NotFound) => {
                log::warn!(target: LOG_TARGET, "Dropping repository '{key}': not found");
                self.frontier.drop_repository(key);
                return;
            }
            Err(ExtractError::Failed(e)) => {
                log::error!(target: LOG_TARGET, "Dropping repository '{key}': {e:#}");
                self.frontier.drop_repository(key);
                return;
            }
        };

        for commit in extraction.commits {
            let _ = self.store.insert_commit(commit);
        }

        self.store.upsert_repository(extraction.repository);
        let _ = self.snapshot.record_repository(extraction.visit);
        self.attribute(&key).await;
    }

    /// Add a repository to its owner, visiting an owner not seen before.
    async fn attribute(&mut self, key: &RepoKey) {
        if self.store.attribute(key) {
            return;
        }

        let username = key.owner();
        if !self.snapshot.has_owner(username) && self.visit_owner(username).await && self.store.attribute(key) {
            return;
        }

        log::debug!(target: LOG_TARGET, "Recording bare owner '{username}'");
        self.store.upsert_owner(Owner::new(username));
        let _ = self.store.attribute(key);
    }

    async fn visit_owner(&mut self, username: &str) -> bool {
        match self.extractor.owner(username).await {
            Ok(extraction) => {
                for key in extraction.pinned {
                    let _ = self.frontier.push_repository(key, &self.snapshot);
                }

                self.store.upsert_owner(extraction.owner);
                let _ = self.snapshot.record_owner(extraction.visit);
                true
            }
            Err(ExtractError::NotFound) => {
                log::warn!(target: LOG_TARGET, "Skipping owner '{username}': not found");
                false
            }
            Err(ExtractError::Failed(e)) => {
                log::error!(target: LOG_TARGET, "Skipping owner '{username}': {e:#}");
                false
            }
        }
    }
}
