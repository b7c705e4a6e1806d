// Shared test helpers: an in-memory ContainerRuntime

#![allow(dead_code)]

use bollard::models::{
    ContainerCpuStats, ContainerCpuUsage, ContainerMemoryStats, ContainerStatsResponse,
    ContainerSummary,
};
use docker_exporter::docker_repo::{ContainerRuntime, RuntimeError};
use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Notify;
use tokio::time::Duration;

#[derive(Clone)]
pub enum FakeStats {
    Ok(ContainerStatsResponse),
    Delayed(Duration, ContainerStatsResponse),
    /// The daemon answers 404, as for a container that exited after listing.
    Gone,
}

#[derive(Default)]
pub struct FakeRuntime {
    containers: Mutex<Vec<ContainerSummary>>,
    stats: Mutex<HashMap<String, FakeStats>>,
    fail_listing: AtomicBool,
    list_gate: Mutex<Option<Arc<Notify>>>,
    pub list_calls: AtomicUsize,
    pub stats_calls: AtomicUsize,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, summary: ContainerSummary, stats: FakeStats) {
        let id = summary.id.clone().unwrap_or_default();
        self.containers.lock().unwrap().push(summary);
        self.stats.lock().unwrap().insert(id, stats);
    }

    pub fn set_fail_listing(&self, fail: bool) {
        self.fail_listing.store(fail, Ordering::SeqCst);
    }

    /// Make listing wait until the returned handle is notified.
    pub fn gate_listing(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.list_gate.lock().unwrap() = Some(gate.clone());
        gate
    }
}

impl ContainerRuntime for FakeRuntime {
    async fn list_active_containers(&self) -> Result<Vec<ContainerSummary>, RuntimeError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.list_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(not_found("docker daemon unavailable"));
        }
        Ok(self.containers.lock().unwrap().clone())
    }

    async fn container_stats(&self, id: &str) -> Result<ContainerStatsResponse, RuntimeError> {
        self.stats_calls.fetch_add(1, Ordering::SeqCst);
        let stats = self.stats.lock().unwrap().get(id).cloned();
        match stats {
            Some(FakeStats::Ok(s)) => Ok(s),
            Some(FakeStats::Delayed(delay, s)) => {
                tokio::time::sleep(delay).await;
                Ok(s)
            }
            Some(FakeStats::Gone) | None => Err(not_found(&format!("No such container: {id}"))),
        }
    }
}

fn not_found(message: &str) -> RuntimeError {
    RuntimeError::Docker(bollard::errors::Error::DockerResponseServerError {
        status_code: 404,
        message: message.to_string(),
    })
}

pub fn summary(id: &str, name: &str, image: &str) -> ContainerSummary {
    ContainerSummary {
        id: Some(id.to_string()),
        names: Some(vec![format!("/{name}")]),
        image: Some(image.to_string()),
        ..Default::default()
    }
}

pub fn cpu_stats(total_usage_ns: u64) -> ContainerStatsResponse {
    ContainerStatsResponse {
        cpu_stats: Some(ContainerCpuStats {
            cpu_usage: Some(ContainerCpuUsage {
                total_usage: Some(total_usage_ns),
                ..Default::default()
            }),
            ..Default::default()
        }),
        memory_stats: Some(ContainerMemoryStats {
            usage: Some(1024),
            limit: Some(4096),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Data lines (non-comment) of a document that belong to `container_id`.
pub fn sample_lines<'a>(document: &'a str, container_id: &str) -> Vec<&'a str> {
    let needle = format!("container_id=\"{container_id}\"");
    document
        .lines()
        .filter(|l| !l.starts_with('#') && l.contains(&needle))
        .collect()
}

/// Log lines written by a fmt subscriber, shared with the test.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn lines_containing(&self, needle: &str) -> Vec<String> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8_lossy(&bytes)
            .lines()
            .filter(|l| l.contains(needle))
            .map(String::from)
            .collect()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Route WARN and above on this thread into a buffer until the guard drops.
pub fn capture_warnings() -> (tracing::subscriber::DefaultGuard, LogBuffer) {
    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    (tracing::subscriber::set_default(subscriber), logs)
}
