use crate::misc::RepoKey;
use crate::store::VisitSnapshot;
use std::collections::{HashSet, VecDeque};

/// Discovered but not yet visited subjects.
///
/// Membership in the current session's snapshot counts as visited, so a subject persisted by an
/// earlier session is still eligible today while nothing is visited twice within one session.
/// Repositories that failed are remembered as dropped and never queued again this session.
#[derive(Debug, Default)]
pub struct Frontier {
    repositories: VecDeque<RepoKey>,
    pending_repositories: HashSet<RepoKey>,
    dropped: HashSet<RepoKey>,
    owners: VecDeque<String>,
    pending_owners: HashSet<String>,
}

impl Frontier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a repository unless it is pending, dropped or already measured.
    pub fn push_repository(&mut self, key: RepoKey, snapshot: &VisitSnapshot) -> bool {
        if self.dropped.contains(&key) || snapshot.has_repository(&key.identifier()) || self.pending_repositories.contains(&key) {
            return false;
        }

        let _ = self.pending_repositories.insert(key.clone());
        self.repositories.push_back(key);
        true
    }

    /// Next repository in discovery order, skipping any measured since it was queued.
    pub fn pop_repository(&mut self, snapshot: &VisitSnapshot) -> Option<RepoKey> {
        while let Some(key) = self.repositories.pop_front() {
            let _ = self.pending_repositories.remove(&key);
            if !snapshot.has_repository(&key.identifier()) && !self.dropped.contains(&key) {
                return Some(key);
            }
        }

        None
    }

    /// Exclude a repository from the rest of the session.
    pub fn drop_repository(&mut self, key: RepoKey) {
        let _ = self.dropped.insert(key);
    }

    pub fn push_owner(&mut self, username: &str, snapshot: &VisitSnapshot) -> bool {
        if snapshot.has_owner(username) || self.pending_owners.contains(username) {
            return false;
        }

        let _ = self.pending_owners.insert(username.to_string());
        self.owners.push_back(username.to_string());
        true
    }

    pub fn pop_owner(&mut self, snapshot: &VisitSnapshot) -> Option<String> {
        while let Some(username) = self.owners.pop_front() {
            let _ = self.pending_owners.remove(&username);
            if !snapshot.has_owner(&username) {
                return Some(username);
            }
        }

        None
    }

    #[must_use]
    pub fn pending_repositories(&self) -> usize {
        self.repositories.len()
    }

    #[must_use]
    pub fn dropped(&self) -> usize {
        self.dropped.len()
    }
}

/// Topics to visit this session: the configured list followed by tags of known repositories.
#[derive(Debug, Clone)]
pub struct TopicWatchList {
    topics: Vec<String>,
    max_topics: usize,
}

impl TopicWatchList {
    /// The configured topics are always kept; `max_topics` only limits later additions.
    #[must_use]
    pub fn new(configured: &[String], max_topics: usize) -> Self {
        let mut list = Self {
            topics: Vec::new(),
            max_topics: usize::MAX,
        };

        for topic in configured {
            let _ = list.add(topic);
        }

        list.max_topics = max_topics;
        list
    }

    /// Add a discovered tag while the list has room. Returns whether it was added.
    pub fn add(&mut self, topic: &str) -> bool {
        let topic = topic.trim();
        if topic.is_empty() || self.topics.len() >= self.max_topics || self.topics.iter().any(|t| t == topic) {
            return false;
        }

        self.topics.push(topic.to_string());
        true
    }

    #[must_use]
    pub fn topics(&self) -> &[String] {
        &self.topics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OwnerVisit, RepositoryVisit};

    fn snapshot() -> VisitSnapshot {
        VisitSnapshot::today()
    }

    #[test]
    fn test_duplicate_repository_is_queued_once() {
        let snapshot = snapshot();
        let mut frontier = Frontier::new();

        assert!(frontier.push_repository(RepoKey::new("o", "r"), &snapshot));
        assert!(!frontier.push_repository(RepoKey::new("o", "r"), &snapshot));
        assert!(frontier.push_repository(RepoKey::new("o", "s"), &snapshot));
        assert_eq!(frontier.pending_repositories(), 2);

        assert_eq!(frontier.pop_repository(&snapshot), Some(RepoKey::new("o", "r")));
        assert_eq!(frontier.pop_repository(&snapshot), Some(RepoKey::new("o", "s")));
        assert_eq!(frontier.pop_repository(&snapshot), None);
    }

    #[test]
    fn test_measured_repository_is_not_queued() {
        let mut snapshot = snapshot();
        let key = RepoKey::new("o", "r");
        let _ = snapshot.record_repository(RepositoryVisit::new(&key));

        let mut frontier = Frontier::new();
        assert!(!frontier.push_repository(key, &snapshot));
    }

    #[test]
    fn test_repository_measured_after_queueing_is_skipped() {
        let mut snapshot = snapshot();
        let key = RepoKey::new("o", "r");

        let mut frontier = Frontier::new();
        assert!(frontier.push_repository(key.clone(), &snapshot));
        let _ = snapshot.record_repository(RepositoryVisit::new(&key));

        assert_eq!(frontier.pop_repository(&snapshot), None);
    }

    #[test]
    fn test_dropped_repository_stays_dropped() {
        let snapshot = snapshot();
        let key = RepoKey::new("gone", "repo");

        let mut frontier = Frontier::new();
        assert!(frontier.push_repository(key.clone(), &snapshot));
        frontier.drop_repository(key.clone());

        assert_eq!(frontier.pop_repository(&snapshot), None);
        assert!(!frontier.push_repository(key, &snapshot));
        assert_eq!(frontier.dropped(), 1);
    }

    #[test]
    fn test_popped_repository_can_be_requeued_until_measured() {
        let snapshot = snapshot();
        let key = RepoKey::new("o", "r");

        let mut frontier = Frontier::new();
        assert!(frontier.push_repository(key.clone(), &snapshot));
        assert_eq!(frontier.pop_repository(&snapshot), Some(key.clone()));
        assert!(frontier.push_repository(key, &snapshot));
    }

    #[test]
    fn test_owners() {
        let mut snapshot = snapshot();
        let mut frontier = Frontier::new();

        assert!(frontier.push_owner("a", &snapshot));
        assert!(!frontier.push_owner("a", &snapshot));
        assert!(frontier.push_owner("b", &snapshot));

        let _ = snapshot.record_owner(OwnerVisit::new("a"));
        assert_eq!(frontier.pop_owner(&snapshot), Some("b".to_string()));
        assert_eq!(frontier.pop_owner(&snapshot), None);
        assert!(!frontier.push_owner("a", &snapshot));
    }

    #[test]
    fn test_watch_list_cap_applies_to_discovered_tags() {
        let configured = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let mut list = TopicWatchList::new(&configured, 2);
        assert_eq!(list.topics().len(), 3);
        assert!(!list.add("d"));

        let mut list = TopicWatchList::new(&configured, 5);
        assert!(list.add(" d "));
        assert!(!list.add("a"));
        assert!(!list.add("  "));
        assert!(list.add("e"));
        assert!(!list.add("f"));
        assert_eq!(list.topics(), ["a", "b", "c", "d", "e"]);
    }
}
