use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use colored::*;
use tokio::task::JoinHandle;

const SPINNER: [&str; 4] = ["◐", "◓", "◑", "◒"];
pub(crate) const CLEAR_LINE: &str = "\x1b[2K";

/// Shared state of one run: the attempt counter bumped by every worker and
/// the fixed total the reporter measures it against.
#[derive(Debug)]
pub struct RunContext {
    attempted: AtomicU64,
    successes: AtomicU64,
    total: u64,
}

impl RunContext {
    pub fn new(total: u64) -> Self {
        Self {
            attempted: AtomicU64::new(0),
            successes: AtomicU64::new(0),
            total,
        }
    }

    pub fn record_attempt(&self, success: bool) {
        if success {
            self.successes.fetch_add(1, Ordering::Relaxed);
        }
        self.attempted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn attempted(&self) -> u64 {
        self.attempted.load(Ordering::Relaxed)
    }

    pub fn successes(&self) -> u64 {
        self.successes.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> u64 {
        self.total
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressFrame {
    pub percent: u64,
    pub spinner: &'static str,
    pub per_second: u64,
}

impl ProgressFrame {
    pub fn render(&self) -> String {
        format!(
            "\r{} {} {}% {} {}/s",
            CLEAR_LINE,
            "Progress:".cyan(),
            self.percent.to_string().bold(),
            self.spinner,
            self.per_second
        )
    }
}

/// Turns successive counter samples into display frames.
#[derive(Debug)]
pub struct ProgressTracker {
    total: u64,
    interval: Duration,
    last_sample: u64,
    spin: usize,
}

impl ProgressTracker {
    pub fn new(total: u64, interval: Duration) -> Self {
        Self {
            total,
            interval,
            last_sample: 0,
            spin: 0,
        }
    }

    pub fn tick(&mut self, current: u64) -> ProgressFrame {
        let percent = if self.total == 0 {
            100
        } else {
            (current.saturating_mul(100) / self.total).min(100)
        };
        let delta = current.saturating_sub(self.last_sample);
        let millis = self.interval.as_millis().max(1) as u64;
        let frame = ProgressFrame {
            percent,
            spinner: SPINNER[self.spin],
            per_second: delta.saturating_mul(1000) / millis,
        };
        self.last_sample = current;
        self.spin = (self.spin + 1) % SPINNER.len();
        frame
    }
}

/// Redraw the status line every `interval` until the task is aborted.
pub fn spawn_reporter(ctx: Arc<RunContext>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut tracker = ProgressTracker::new(ctx.total(), interval);
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            print!("{}", tracker.tick(ctx.attempted()).render());
            let _ = std::io::stdout().flush();
        }
    })
}

/// Stop the reporter and leave the line at its final value.
pub async fn finish_reporter(handle: JoinHandle<()>, ctx: &RunContext, interval: Duration) {
    handle.abort();
    let _ = handle.await;
    let current = ctx.attempted();
    let mut tracker = ProgressTracker::new(ctx.total(), interval);
    tracker.last_sample = current;
    println!("{}", tracker.tick(current).render());
}
