use core::fmt::{Display, Formatter};

/// What one crawl run accomplished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub repositories_visited: usize,

    /// Repositories that were not found or could not be fetched.
    pub repositories_dropped: usize,

    /// Repositories still queued when the run ended.
    pub repositories_remaining: usize,

    pub owners_visited: usize,
    pub topics_visited: usize,
    pub trending_entries: usize,
    pub commits_known: usize,

    /// Whether the run stopped on the visit budget rather than an empty queue.
    pub budget_exhausted: bool,
}

impl Display for CrawlSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        writeln!(
            f,
            "Visited {} repositories ({} dropped, {} still queued)",
            self.repositories_visited, self.repositories_dropped, self.repositories_remaining
        )?;
        writeln!(f, "Visited {} owners and {} topics", self.owners_visited, self.topics_visited)?;
        write!(f, "Recorded {} trending entries; {} commits known", self.trending_entries, self.commits_known)?;

        if self.budget_exhausted {
            write!(f, "\nStopped at the visit budget")?;
        }

        Ok(())
    }
}
