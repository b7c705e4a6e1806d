// Background scheduler: runs a collection cycle every interval, never two at once,
// and publishes each successful result to the snapshot cache.

use crate::cache::SnapshotCache;
use crate::collector::Collector;
use crate::docker_repo::ContainerRuntime;
use crate::models::Snapshot;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use tokio::time::{Duration, interval};
use tracing::Instrument;

/// Scheduler timing and logging config.
pub struct WorkerConfig {
    pub interval_ms: u64,
    /// How often to log app stats (real seconds).
    pub stats_log_interval_secs: u64,
}

/// Cycle counters, reported in the periodic "app stats" log line.
#[derive(Debug, Default)]
pub struct CycleStats {
    pub completed: AtomicU64,
    pub failed: AtomicU64,
    pub skipped: AtomicU64,
    pub last_containers: AtomicUsize,
}

/// Clears the in-flight flag on drop, so a panicking cycle still releases it.
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owns the collector, the cache it publishes to, and the Idle/Collecting state.
pub struct Scheduler<R> {
    collector: Arc<Collector<R>>,
    cache: Arc<SnapshotCache>,
    in_flight: Arc<AtomicBool>,
    stats: Arc<CycleStats>,
}

impl<R> Clone for Scheduler<R> {
    fn clone(&self) -> Self {
        Self {
            collector: self.collector.clone(),
            cache: self.cache.clone(),
            in_flight: self.in_flight.clone(),
            stats: self.stats.clone(),
        }
    }
}

impl<R: ContainerRuntime> Scheduler<R> {
    pub fn new(collector: Collector<R>, cache: Arc<SnapshotCache>) -> Self {
        Self {
            collector: Arc::new(collector),
            cache,
            in_flight: Arc::new(AtomicBool::new(false)),
            stats: Arc::new(CycleStats::default()),
        }
    }

    pub fn cache(&self) -> &Arc<SnapshotCache> {
        &self.cache
    }

    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    pub fn is_collecting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Start a cycle in the background unless one is already running, in
    /// which case this is a no-op returning `None`.
    pub fn trigger(&self) -> Option<tokio::task::JoinHandle<()>> {
        let guard = self.try_begin()?;
        let this = self.clone();
        Some(tokio::spawn(async move {
            this.collect_and_publish().await;
            drop(guard);
        }))
    }

    /// Run one cycle on the current task. Returns `false` without collecting
    /// when another cycle is in flight.
    pub async fn run_cycle(&self) -> bool {
        let Some(_guard) = self.try_begin() else {
            return false;
        };
        self.collect_and_publish().await;
        true
    }

    fn try_begin(&self) -> Option<InFlightGuard> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            self.stats.skipped.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("collection still in progress; skipping this tick");
            return None;
        }
        Some(InFlightGuard(self.in_flight.clone()))
    }

    async fn collect_and_publish(&self) {
        match self.collector.collect().await {
            Ok(report) => {
                self.stats.completed.fetch_add(1, Ordering::Relaxed);
                self.stats
                    .last_containers
                    .store(report.containers_collected, Ordering::Relaxed);
                self.cache
                    .publish(Snapshot::new(report.document, report.containers_collected));
            }
            Err(e) => {
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
                tracing::error!(
                    error = %e,
                    operation = "collect",
                    "Error while collecting metrics; keeping previous snapshot"
                );
            }
        }
    }
}

/// Spawns the scheduler loop. The first tick fires immediately, so one cycle
/// starts at startup; afterwards one per `interval_ms` until shutdown.
pub fn spawn<R: ContainerRuntime>(
    scheduler: Scheduler<R>,
    config: WorkerConfig,
    mut shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    let WorkerConfig {
        interval_ms,
        stats_log_interval_secs,
    } = config;

    let worker_span = tracing::span!(tracing::Level::DEBUG, "worker", interval_ms);
    let run = async move {
        let mut tick = interval(Duration::from_millis(interval_ms));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut stats_log_tick = interval(Duration::from_secs(stats_log_interval_secs));
        stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // Consume the immediate first tick; the stats line is only useful later.
        stats_log_tick.tick().await;

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    scheduler.trigger();
                }
                _ = &mut shutdown_rx => {
                    tracing::debug!("Worker shutting down");
                    break;
                }
                _ = stats_log_tick.tick() => {
                    let stats = scheduler.stats();
                    tracing::info!(
                        cycles_completed = stats.completed.load(Ordering::Relaxed),
                        cycles_failed = stats.failed.load(Ordering::Relaxed),
                        cycles_skipped = stats.skipped.load(Ordering::Relaxed),
                        containers = stats.last_containers.load(Ordering::Relaxed),
                        "app stats"
                    );
                }
            }
        }
    };
    tokio::spawn(run.instrument(worker_span))
}
