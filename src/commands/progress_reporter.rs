//! Terminal rendering of crawl milestones.

use crate::crawl::{CrawlObserver, Phase, PhaseCounters};
use core::sync::atomic::{AtomicU64, Ordering};
use core::time::Duration;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

const REFRESH_HZ: u8 = 8;
const REFRESH_INTERVAL: Duration = Duration::from_millis(125);

const ACCENT: &str = ".bold.cyan";

/// State read by the redraw task.
#[derive(Debug)]
struct Board {
    counters: Arc<PhaseCounters>,
    phase: Mutex<Option<Phase>>,
    last_checkpoint: AtomicU64,
}

impl Board {
    fn message(&self) -> String {
        let phase = self.phase.lock().ok().and_then(|phase| *phase);
        let queued = self.counters.queued();

        match phase {
            Some(Phase::Repositories) => match self.last_checkpoint.load(Ordering::Relaxed) {
                0 => format!("{queued} queued"),
                saved => format!("{queued} queued, saved after {saved}"),
            },
            Some(Phase::Owners) => format!("{} owners visited, {queued} repositories queued", self.counters.done()),
            Some(phase) => format!("{}, {queued} repositories queued", phase.unit()),
            None => String::new(),
        }
    }
}

/// Renders crawl phases on stderr.
///
/// Nothing is drawn until the configured delay has passed, which keeps short crawls and crawls
/// with logging enabled free of bar output. Must be created inside a Tokio runtime.
#[derive(Debug)]
pub struct ProgressReporter {
    bar: ProgressBar,
    board: Arc<Board>,
    colored: bool,
    redraw: JoinHandle<()>,
}

impl ProgressReporter {
    #[must_use]
    pub fn new(counters: Arc<PhaseCounters>, delay: Duration, colored: bool) -> Self {
        let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden());
        let board = Arc::new(Board {
            counters,
            phase: Mutex::new(None),
            last_checkpoint: AtomicU64::new(0),
        });

        let redraw = tokio::spawn(redraw(bar.clone(), Arc::clone(&board), Instant::now() + delay));
        Self {
            bar,
            board,
            colored,
            redraw,
        }
    }

    fn style(&self, counted: bool) -> ProgressStyle {
        let accent = if self.colored { ACCENT } else { "" };
        if counted {
            ProgressStyle::with_template(&format!("{{prefix:>10{accent}}} [{{bar:30}}] {{pos}}/{{len}} {{msg}}"))
                .map_or_else(|_| ProgressStyle::default_bar(), |style| style.progress_chars("#>-"))
        } else {
            ProgressStyle::with_template(&format!("{{prefix:>10{accent}}} {{spinner}} {{elapsed}} {{msg}}"))
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
        }
    }
}

impl CrawlObserver for ProgressReporter {
    fn phase_started(&self, phase: Phase, total: Option<u64>) {
        if let Ok(mut current) = self.board.phase.lock() {
            *current = Some(phase);
        }

        self.bar.reset();
        self.bar.set_prefix(phase.to_string());
        self.bar.set_style(self.style(total.is_some()));

        match total {
            Some(total) => {
                self.bar.disable_steady_tick();
                self.bar.set_length(total);
            }
            None => {
                self.bar.unset_length();
                self.bar.enable_steady_tick(REFRESH_INTERVAL);
            }
        }
    }

    fn checkpoint(&self, visits: u64) {
        self.board.last_checkpoint.store(visits, Ordering::Relaxed);
    }

    fn budget_reached(&self, budget: u64, remaining: usize) {
        self.bar
            .suspend(|| eprintln!("Visit budget of {budget} reached, {remaining} repositories left for the next crawl"));
    }

    fn finished(&self) {
        self.redraw.abort();
        self.bar.finish_and_clear();
    }
}

/// Copy the crawler's counters into the bar until aborted, showing it from `show_from` on.
async fn redraw(bar: ProgressBar, board: Arc<Board>, show_from: Instant) {
    let mut interval = tokio::time::interval(REFRESH_INTERVAL);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut shown = false;

    #[expect(clippy::infinite_loop, reason = "task runs until aborted")]
    loop {
        let _ = interval.tick().await;

        if !shown {
            if Instant::now() < show_from {
                continue;
            }
            bar.set_draw_target(ProgressDrawTarget::stderr_with_hz(REFRESH_HZ));
            shown = true;
        }

        bar.set_position(board.counters.done());
        bar.set_message(board.message());
    }
}
