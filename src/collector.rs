// One collection cycle: enumerate containers, fetch stats concurrently, render.

use crate::docker_repo::{ContainerRuntime, RuntimeError, stats};
use crate::exposition;
use crate::models::{ContainerIdentity, MetricRecord};
use futures_util::future::join_all;
use std::sync::Arc;
use tokio::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};

/// Default time after which a pending stats fetch is reported as slow.
pub const DEFAULT_SLOW_FETCH_THRESHOLD: Duration = Duration::from_millis(2000);

#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("listing containers failed: {0}")]
    Enumeration(#[source] RuntimeError),
}

/// Per-container result of a cycle.
#[derive(Debug)]
pub struct CollectionOutcome {
    pub identity: ContainerIdentity,
    pub result: Result<MetricRecord, RuntimeError>,
}

/// A finished cycle: the rendered document plus bookkeeping for logs.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub document: String,
    pub duration: Duration,
    pub containers_seen: usize,
    pub containers_collected: usize,
}

impl CycleReport {
    pub fn containers_failed(&self) -> usize {
        self.containers_seen - self.containers_collected
    }
}

pub struct Collector<R> {
    runtime: Arc<R>,
    slow_fetch_threshold: Duration,
}

impl<R: ContainerRuntime> Collector<R> {
    pub fn new(runtime: Arc<R>, slow_fetch_threshold: Duration) -> Self {
        Self {
            runtime,
            slow_fetch_threshold,
        }
    }

    /// Run one cycle. Only a failure to list containers fails the cycle; a
    /// container whose stats cannot be fetched is logged and left out.
    #[instrument(skip(self), fields(operation = "collect"))]
    pub async fn collect(&self) -> Result<CycleReport, CollectError> {
        let started = Instant::now();

        let containers = self
            .runtime
            .list_active_containers()
            .await
            .map_err(CollectError::Enumeration)?;
        let identities: Vec<ContainerIdentity> =
            containers.iter().map(ContainerIdentity::from_summary).collect();

        let outcomes = self.fetch_all(identities).await;
        let containers_seen = outcomes.len();

        let records: Vec<(ContainerIdentity, MetricRecord)> = outcomes
            .into_iter()
            .filter_map(|o| match o.result {
                Ok(record) => Some((o.identity, record)),
                Err(e) => {
                    error!(
                        error = %e,
                        container = %o.identity.name,
                        container_id = %o.identity.id,
                        operation = "container_stats",
                        "Failed to fetch stats for container"
                    );
                    None
                }
            })
            .collect();

        let document = exposition::render(&records);
        let report = CycleReport {
            document,
            duration: started.elapsed(),
            containers_seen,
            containers_collected: records.len(),
        };
        info!(
            containers = report.containers_collected,
            failed = report.containers_failed(),
            duration_ms = report.duration.as_millis() as u64,
            "collection cycle complete"
        );
        Ok(report)
    }

    /// Fetch every container's stats at once and wait for all of them. Output
    /// order matches input order.
    pub async fn fetch_all(&self, identities: Vec<ContainerIdentity>) -> Vec<CollectionOutcome> {
        let mut fetches = Vec::with_capacity(identities.len());
        for identity in identities {
            fetches.push(self.fetch_outcome(identity));
        }
        join_all(fetches).await
    }

    async fn fetch_outcome(&self, identity: ContainerIdentity) -> CollectionOutcome {
        let result = self.fetch_one(&identity).await;
        CollectionOutcome { identity, result }
    }

    async fn fetch_one(&self, identity: &ContainerIdentity) -> Result<MetricRecord, RuntimeError> {
        let started = Instant::now();
        let fetch = self.runtime.container_stats(&identity.id);
        tokio::pin!(fetch);

        let result = tokio::select! {
            result = &mut fetch => result,
            _ = tokio::time::sleep(self.slow_fetch_threshold) => {
                warn!(
                    container = %identity.name,
                    container_id = %identity.id,
                    threshold_ms = self.slow_fetch_threshold.as_millis() as u64,
                    "slow stats fetch"
                );
                fetch.await
            }
        };

        debug!(
            container = %identity.name,
            elapsed_ms = started.elapsed().as_millis() as u64,
            ok = result.is_ok(),
            "stats fetch finished"
        );
        result.map(|s| stats::process_statistics(&s))
    }
}
