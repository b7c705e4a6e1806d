// Docker container models

use bollard::models::ContainerSummary;

/// Who a set of metrics belongs to; rendered as the label set of every sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerIdentity {
    pub id: String,
    pub name: String,
    pub image: String,
}

impl ContainerIdentity {
    /// Build from a Docker list entry. Docker reports names as "/web"; the leading
    /// slash is stripped and the id stands in when no name is reported.
    pub fn from_summary(summary: &ContainerSummary) -> Self {
        let id = summary.id.clone().unwrap_or_default();
        let name = summary
            .names
            .as_ref()
            .and_then(|n| n.first())
            .map(|n| n.strip_prefix('/').unwrap_or(n.as_str()).to_string())
            .unwrap_or_else(|| id.clone());
        let image = summary.image.clone().unwrap_or_default();
        Self { id, name, image }
    }
}

/// Values derived from one stats sample. Memory and pids are gauges, the rest
/// are cumulative counters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MetricRecord {
    pub cpu_seconds: f64,
    pub mem_usage_bytes: u64,
    pub mem_limit_bytes: u64,
    pub rx_bytes_total: u64,
    pub tx_bytes_total: u64,
    pub blk_read_bytes_total: u64,
    pub blk_write_bytes_total: u64,
    pub pids: u64,
}
