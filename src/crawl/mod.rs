//! The crawl session: what to visit, in which order, and when to persist.

mod crawler;
mod frontier;
mod progress;
mod summary;

pub use crawler::Crawler;
pub use frontier::{Frontier, TopicWatchList};
pub use progress::{CrawlObserver, Phase, PhaseCounters};
pub use summary::CrawlSummary;
