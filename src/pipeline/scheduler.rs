// src/pipeline/scheduler.rs

//! The monitor loop.
//!
//! One [`Scheduler`] drives fetch -> extract -> diff -> apply cycles for the
//! lifetime of the process and is the only writer of [`MonitorState`].
//!
//! - A failed cycle (fetch error, timeout, empty page) is logged and leaves
//!   every collection untouched.
//! - A fatal resource error stops the loop.
//! - Between cycles the loop sleeps `max(floor, target - elapsed)`.
//! - The fetcher is closed exactly once, whichever way the loop exits.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{AppError, Result};
use crate::models::{Alert, MonitorConfig};
use crate::services::{PageFetcher, ProductExtractor};

use super::clock::{Clock, SystemClock};
use super::diff::{SeenSet, calculate_diff};
use super::state::{MonitorState, Phase, StatePublisher, StateReader};

/// Adaptive pacing between cycle starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Nominal time from one cycle start to the next
    pub target: Duration,
    /// Minimum sleep, however long the cycle took
    pub floor: Duration,
}

impl Pacing {
    pub fn new(target: Duration, floor: Duration) -> Self {
        Self { target, floor }
    }

    /// Sleep to take after a cycle that ran for `elapsed`.
    pub fn delay_after(&self, elapsed: Duration) -> Duration {
        self.target.saturating_sub(elapsed).max(self.floor)
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::new(Duration::from_secs(10), Duration::from_secs(1))
    }
}

/// What one successful cycle did.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// Whether this was the first successful cycle (alerts suppressed)
    pub first_run: bool,
    /// Products on the page
    pub product_count: usize,
    pub in_stock_count: usize,
    /// Products ever seen
    pub tracked_count: usize,
    /// Alerts raised this cycle, in emission order
    pub alerts: Vec<Alert>,
    /// Monitored entries dropped by the stock filter
    pub evicted_count: usize,
}

/// Totals for a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub failed_cycles: u64,
    pub alerts: u64,
}

/// Drives monitor cycles and publishes their results.
pub struct Scheduler<F, E> {
    target_url: String,
    pacing: Pacing,
    fetch_timeout: Duration,
    fetcher: F,
    extractor: E,
    clock: Arc<dyn Clock>,
    publisher: StatePublisher,
    seen: SeenSet,
    first_run: bool,
}

impl<F, E> Scheduler<F, E>
where
    F: PageFetcher,
    E: ProductExtractor,
{
    /// Create a scheduler that owns `fetcher` until the loop ends.
    pub fn new(config: &MonitorConfig, fetcher: F, extractor: E, publisher: StatePublisher) -> Self {
        Self {
            target_url: config.target_url.clone(),
            pacing: Pacing::new(config.interval(), config.min_sleep()),
            fetch_timeout: config.fetch_timeout(),
            fetcher,
            extractor,
            clock: Arc::new(SystemClock),
            publisher,
            seen: SeenSet::new(),
            first_run: true,
        }
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// A read handle onto the published state.
    pub fn reader(&self) -> StateReader {
        self.publisher.subscribe()
    }

    /// Run cycles until `shutdown` resolves or a fatal error occurs.
    ///
    /// Shutdown is observed between cycles; an in-flight cycle always
    /// completes. Returns the fatal error, if that is what stopped the loop.
    pub async fn run<S>(mut self, shutdown: S) -> Result<RunSummary>
    where
        S: Future<Output = ()> + Send,
    {
        tokio::pin!(shutdown);
        log::info!("Starting monitor for: {}", self.target_url);

        let mut summary = RunSummary::default();
        let outcome = loop {
            let started = self.clock.now();
            log::info!("Checking... {}", self.clock.wall_time().format("%H:%M:%S"));

            summary.cycles += 1;
            match self.run_cycle().await {
                Ok(report) => {
                    summary.alerts += report.alerts.len() as u64;
                    log_report(&report);
                }
                Err(e) if e.is_fatal() => {
                    log::error!("Fatal monitor error: {}", e);
                    break Err(e);
                }
                Err(e) => {
                    summary.failed_cycles += 1;
                    log::warn!("Cycle failed, keeping previous state: {}", e);
                }
            }

            let elapsed = self.clock.now().saturating_duration_since(started);
            let pause = self.pacing.delay_after(elapsed);
            log::info!(
                "Cycle finished in {:.1}s. Sleeping for {:.1}s (target interval: {}s)",
                elapsed.as_secs_f64(),
                pause.as_secs_f64(),
                self.pacing.target.as_secs()
            );
            self.publisher.update(|s| s.phase = Phase::Sleeping);

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    log::info!("Shutdown requested, stopping monitor");
                    break Ok(summary);
                }
                _ = self.clock.sleep(pause) => {}
            }
        };

        if let Err(e) = self.fetcher.close().await {
            log::warn!("Failed to close fetcher: {}", e);
        }
        self.publisher.update(|s| {
            s.busy = false;
            s.phase = Phase::Stopped;
        });
        outcome
    }

    /// Run a single cycle.
    ///
    /// `busy` is set for the duration of the call and cleared on every path.
    /// On error nothing but `busy` and the phase is published.
    pub async fn run_cycle(&mut self) -> Result<CycleReport> {
        self.publisher.update(|s| {
            s.busy = true;
            s.phase = Phase::Fetching;
        });

        let result = self.try_cycle().await;

        self.publisher.update(|s| {
            s.busy = false;
            s.phase = Phase::Idle;
        });
        result
    }

    async fn try_cycle(&mut self) -> Result<CycleReport> {
        let html = self.fetch_page().await?;

        self.set_phase(Phase::Extracting);
        let snapshot = self.extractor.extract(&html)?;

        self.set_phase(Phase::Diffing);
        let now = self.clock.wall_time();
        let current = self.publisher.current();
        let diff = calculate_diff(&self.seen, &snapshot, self.first_run, &current.monitored, now);

        self.set_phase(Phase::Applying);
        let mut alerts = current.alerts.clone();
        let mut monitored = current.monitored.clone();
        for alert in &diff.alerts {
            alerts.prepend(alert.clone());
        }
        for entry in diff.monitored {
            monitored.prepend(entry);
        }
        let evicted_count = monitored.retain_in_stock(&snapshot);

        let report = CycleReport {
            first_run: self.first_run,
            product_count: snapshot.len(),
            in_stock_count: snapshot.in_stock_count(),
            tracked_count: diff.seen.len(),
            alerts: diff.alerts,
            evicted_count,
        };

        self.publisher.publish(MonitorState {
            snapshot: Arc::new(snapshot),
            alerts,
            monitored,
            last_updated: Some(now),
            busy: true,
            phase: Phase::Applying,
        });
        self.seen = diff.seen;
        self.first_run = false;

        Ok(report)
    }

    async fn fetch_page(&mut self) -> Result<String> {
        match tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch(&self.target_url)).await {
            Ok(result) => result,
            Err(_) => Err(AppError::timeout(
                &self.target_url,
                self.fetch_timeout.as_secs(),
            )),
        }
    }

    fn set_phase(&self, phase: Phase) {
        self.publisher.update(|s| s.phase = phase);
    }
}

fn log_report(report: &CycleReport) {
    for alert in &report.alerts {
        log::info!("[{}] {} - {}", alert.kind.label(), alert.message, alert.link);
    }
    if report.evicted_count > 0 {
        log::debug!(
            "Dropped {} monitored products no longer in stock",
            report.evicted_count
        );
    }

    if report.first_run {
        log::info!(
            "Initial check complete. Tracking {} products.",
            report.tracked_count
        );
    } else if report.alerts.is_empty() {
        log::info!("No changes. Tracking {} products.", report.tracked_count);
    } else {
        log::info!(
            "{} alert(s) raised. Tracking {} products ({} in stock).",
            report.alerts.len(),
            report.tracked_count,
            report.in_stock_count
        );
    }
}
