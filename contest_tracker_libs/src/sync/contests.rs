use crate::{
    models::ContestRecord,
    retry::{self, RetryPolicy},
    sources::{ClistContest, ContestQuery, ContestSource},
    store::ContestStore,
    sync::{
        solution_links::{SolutionLinkSyncReport, SolutionLinkSynchronizer},
        SyncError,
    },
};
use chrono::{Duration, Utc};
use std::sync::Arc;

/// CLIST resource ids: codeforces.com, codechef.com, leetcode.com.
pub const DEFAULT_RESOURCE_IDS: [u32; 3] = [1, 2, 102];
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContestSyncReport {
    pub fetched: usize,
    pub upserted: u64,
    pub pruned: u64,
    pub failed_resources: Vec<u32>,
    pub solution_links: SolutionLinkSyncReport,
}

pub struct ContestSynchronizer {
    source: Arc<dyn ContestSource>,
    store: Arc<dyn ContestStore>,
    solution_links: Arc<SolutionLinkSynchronizer>,
    resource_ids: Vec<u32>,
    window: Duration,
    retry: RetryPolicy,
}

impl ContestSynchronizer {
    pub fn new(
        source: Arc<dyn ContestSource>,
        store: Arc<dyn ContestStore>,
        solution_links: Arc<SolutionLinkSynchronizer>,
    ) -> Self {
        Self {
            source,
            store,
            solution_links,
            resource_ids: DEFAULT_RESOURCE_IDS.to_vec(),
            window: Duration::days(DEFAULT_WINDOW_DAYS),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_resource_ids(mut self, resource_ids: Vec<u32>) -> Self {
        self.resource_ids = resource_ids;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Fetch contests, upsert them, prune the stale ones, then sync solution links.
    ///
    /// Fails with `SyncError::NoContestData` before touching the store when no resource
    /// returned any contest.
    pub async fn sync(&self) -> Result<ContestSyncReport, SyncError> {
        tracing::info!("Start to sync contests from CLIST.");
        let mut report = ContestSyncReport::default();

        let contests = self.fetch_all(&mut report.failed_resources).await;
        if contests.is_empty() {
            tracing::error!("No contest data received from CLIST for any resource.");
            return Err(SyncError::NoContestData);
        }
        report.fetched = contests.len();

        let records: Vec<ContestRecord> = contests.iter().map(to_record).collect();
        report.upserted = self.store.upsert_contests(&records).await?;

        let external_ids: Vec<i64> = records.iter().map(|record| record.external_id).collect();
        report.pruned = self.store.delete_contests_except(&external_ids).await?;
        tracing::info!(
            "{} contests saved, {} stale contests removed.",
            report.upserted,
            report.pruned
        );

        report.solution_links = self.solution_links.sync_solution_links().await;

        Ok(report)
    }

    /// Query every resource in turn. A resource that keeps failing is skipped.
    async fn fetch_all(&self, failed: &mut Vec<u32>) -> Vec<ClistContest> {
        let now = Utc::now();
        let mut contests: Vec<ClistContest> = Vec::new();

        for resource_id in self.resource_ids.iter() {
            let query = ContestQuery {
                resource_id: *resource_id,
                start_gte: now - self.window,
                start_lte: now + self.window,
            };
            tracing::info!("Fetching contests for resource_id: {}", resource_id);

            let operation_name = format!("fetch contests for resource_id {}", resource_id);
            let result = retry::with_linear_backoff(&operation_name, &self.retry, || {
                self.source.fetch_contests(&query)
            })
            .await;

            match result {
                Ok(mut fetched) => {
                    tracing::info!(
                        "{} contests retrieved for resource_id {}",
                        fetched.len(),
                        resource_id
                    );
                    contests.append(&mut fetched);
                }
                Err(e) => {
                    tracing::error!("Skipping resource_id {}: {:?}", resource_id, e);
                    failed.push(*resource_id);
                }
            }
        }

        contests
    }
}

pub fn to_record(contest: &ClistContest) -> ContestRecord {
    ContestRecord {
        external_id: contest.id,
        name: contest
            .event
            .clone()
            .unwrap_or(String::from("Unnamed Contest")),
        platform: contest.platform(),
        start_time: contest.start,
        end_time: contest.end,
        url: contest.href.clone().unwrap_or_default(),
    }
}
