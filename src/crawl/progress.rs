use core::fmt::{Display, Formatter};
use core::sync::atomic::{AtomicU64, Ordering};

/// The stages of a crawl session, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Trending,
    Topics,
    Owners,
    Repositories,
}

impl Phase {
    /// What the crawler counts while in this phase.
    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Trending => "trending pages",
            Self::Topics => "topics",
            Self::Owners => "owners",
            Self::Repositories => "repositories",
        }
    }
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        let label = match self {
            Self::Trending => "Trending",
            Self::Topics => "Topics",
            Self::Owners => "Owners",
            Self::Repositories => "Repos",
        };
        f.write_str(label)
    }
}

/// Live counts of the running phase, written by the crawler and read by observers.
#[derive(Debug, Default)]
pub struct PhaseCounters {
    done: AtomicU64,
    queued: AtomicU64,
}

impl PhaseCounters {
    /// Subjects finished in the current phase.
    #[must_use]
    pub fn done(&self) -> u64 {
        self.done.load(Ordering::Relaxed)
    }

    /// Repositories waiting in the frontier.
    #[must_use]
    pub fn queued(&self) -> u64 {
        self.queued.load(Ordering::Relaxed)
    }

    pub(crate) fn reset(&self) {
        self.done.store(0, Ordering::Relaxed);
    }

    pub(crate) fn finish_one(&self) {
        let _ = self.done.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn set_queued(&self, queued: usize) {
        self.queued.store(queued as u64, Ordering::Relaxed);
    }
}

/// Receives the milestones of a crawl session.
pub trait CrawlObserver: Send + Sync {
    /// A phase began. `total` is `None` when the amount of work is open-ended.
    fn phase_started(&self, phase: Phase, total: Option<u64>);

    /// The identity store and snapshot were written after `visits` repository visits.
    fn checkpoint(&self, visits: u64);

    /// The visit budget ran out while `remaining` repositories were still queued.
    fn budget_reached(&self, budget: u64, remaining: usize);

    /// The session is over, whether or not it succeeded.
    fn finished(&self);
}
