//! Hourly solution link synchronization.
//!
//! `start` runs one cycle right away and then one at every top of the hour (UTC) until
//! `stop` is called or the scheduler is dropped. The next top of the hour is recomputed
//! from the wall clock before every wait. Cycles are not mutually exclusive with
//! synchronizations triggered elsewhere.

use crate::sync::solution_links::{SolutionLinkSyncReport, SolutionLinkSynchronizer};
use chrono::{DateTime, DurationRound, Utc};
use std::sync::Arc;
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, Duration},
};

const HOUR: Duration = Duration::from_secs(3600);

/// Wall clock source.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub struct Scheduler {
    synchronizer: Arc<SolutionLinkSynchronizer>,
    clock: Clock,
    shutdown: Option<watch::Sender<bool>>,
    handle: Option<JoinHandle<()>>,
}

impl Scheduler {
    pub fn new(synchronizer: Arc<SolutionLinkSynchronizer>) -> Self {
        Self {
            synchronizer,
            clock: Arc::new(Utc::now),
            shutdown: None,
            handle: None,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Run a single cycle in the current task.
    pub async fn run_once(&self) -> SolutionLinkSyncReport {
        self.synchronizer.sync_solution_links().await
    }

    pub fn start(&mut self) {
        if self.is_running() {
            tracing::warn!("Solution link scheduler is already running.");
            return;
        }

        let (tx, mut rx) = watch::channel(false);
        let synchronizer = self.synchronizer.clone();
        let clock = self.clock.clone();

        let handle = tokio::spawn(async move {
            synchronizer.sync_solution_links().await;
            let mut next_run = next_hour(clock());

            loop {
                let wait = (next_run - clock()).to_std().unwrap_or(Duration::ZERO);
                tracing::debug!("Next solution link sync at {} (in {:?})", next_run, wait);

                tokio::select! {
                    _ = time::sleep(wait) => {
                        tracing::info!("Running scheduled sync of solution links.");
                        synchronizer.sync_solution_links().await;
                        // a forward clock jump skips the hours already past
                        next_run = std::cmp::max(
                            next_run + chrono::Duration::hours(1),
                            next_hour(clock()),
                        );
                    }
                    _ = rx.changed() => break,
                }
            }

            tracing::info!("Solution link scheduler stopped.");
        });

        self.shutdown = Some(tx);
        self.handle = Some(handle);
        tracing::info!("Solution link scheduler started.");
    }

    /// Signal the loop and wait for it to finish. A cycle in progress runs to completion.
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(true);
        }
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::error!("solution link scheduler terminated abnormally: {:?}", e);
            }
        }
    }
}

/// The first top of the hour strictly after `now`.
pub fn next_hour(now: DateTime<Utc>) -> DateTime<Utc> {
    let hour = chrono::Duration::hours(1);
    now.duration_trunc(hour)
        .map(|truncated| truncated + hour)
        .unwrap_or(now + hour)
}

/// Time left until the next top of the hour. Exactly on the hour means a full hour.
pub fn until_next_hour(now: DateTime<Utc>) -> Duration {
    (next_hour(now) - now).to_std().unwrap_or(HOUR)
}
