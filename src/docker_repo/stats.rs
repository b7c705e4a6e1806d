// Derive a MetricRecord from a raw Docker stats API response.

use crate::models::MetricRecord;
use bollard::models::{ContainerBlkioStatEntry, ContainerStatsResponse};

const NANOS_PER_SEC: f64 = 1e9;

/// Map a stats sample onto exported values. Any field the daemon leaves out
/// counts as zero, so this never fails.
pub fn process_statistics(s: &ContainerStatsResponse) -> MetricRecord {
    let total_usage_ns = s
        .cpu_stats
        .as_ref()
        .and_then(|c| c.cpu_usage.as_ref())
        .and_then(|u| u.total_usage)
        .unwrap_or(0);

    let mem_usage = s.memory_stats.as_ref().and_then(|m| m.usage).unwrap_or(0);
    let mem_limit = s.memory_stats.as_ref().and_then(|m| m.limit).unwrap_or(0);

    let (rx_bytes, tx_bytes) = s.networks.as_ref().map_or((0u64, 0u64), |n| {
        n.values().fold((0u64, 0u64), |(rx, tx), v| {
            (
                rx.saturating_add(v.rx_bytes.unwrap_or(0)),
                tx.saturating_add(v.tx_bytes.unwrap_or(0)),
            )
        })
    });

    let (blk_read, blk_write) = s
        .blkio_stats
        .as_ref()
        .and_then(|b| b.io_service_bytes_recursive.as_deref())
        .map_or((0u64, 0u64), sum_read_write);

    let pids = s.pids_stats.as_ref().and_then(|p| p.current).unwrap_or(0);

    MetricRecord {
        cpu_seconds: total_usage_ns as f64 / NANOS_PER_SEC,
        mem_usage_bytes: mem_usage,
        mem_limit_bytes: mem_limit,
        rx_bytes_total: rx_bytes,
        tx_bytes_total: tx_bytes,
        blk_read_bytes_total: blk_read,
        blk_write_bytes_total: blk_write,
        pids,
    }
}

/// Sum "read"/"write" entries (case-insensitive); other ops such as "sync" or
/// "total" are ignored, as are entries missing an op or a value.
fn sum_read_write(entries: &[ContainerBlkioStatEntry]) -> (u64, u64) {
    let mut read = 0u64;
    let mut write = 0u64;
    for e in entries {
        let (Some(op), Some(value)) = (e.op.as_deref(), e.value) else {
            continue;
        };
        if op.eq_ignore_ascii_case("read") {
            read = read.saturating_add(value);
        } else if op.eq_ignore_ascii_case("write") {
            write = write.saturating_add(value);
        }
    }
    (read, write)
}
