// Prometheus text exposition rendering for per-container metrics.

use crate::models::{ContainerIdentity, MetricRecord};
use std::fmt::Write;

/// Content type of the rendered document (text format 0.0.4).
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
}

impl MetricKind {
    fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
        }
    }
}

/// One exported metric family: name, help text, type and how to read its value.
pub struct MetricFamily {
    pub name: &'static str,
    pub help: &'static str,
    pub kind: MetricKind,
    value: fn(&MetricRecord, &mut String),
}

/// All families, in output order.
pub const FAMILIES: [MetricFamily; 8] = [
    MetricFamily {
        name: "docker_container_cpu_usage_seconds_total",
        help: "Total CPU time consumed by the container in seconds.",
        kind: MetricKind::Counter,
        value: |r, out| push_value(out, r.cpu_seconds),
    },
    MetricFamily {
        name: "docker_container_memory_usage_bytes",
        help: "Current memory usage of the container in bytes.",
        kind: MetricKind::Gauge,
        value: |r, out| push_value(out, r.mem_usage_bytes),
    },
    MetricFamily {
        name: "docker_container_memory_limit_bytes",
        help: "Memory limit of the container in bytes.",
        kind: MetricKind::Gauge,
        value: |r, out| push_value(out, r.mem_limit_bytes),
    },
    MetricFamily {
        name: "docker_container_network_receive_bytes_total",
        help: "Total bytes received by the container.",
        kind: MetricKind::Counter,
        value: |r, out| push_value(out, r.rx_bytes_total),
    },
    MetricFamily {
        name: "docker_container_network_transmit_bytes_total",
        help: "Total bytes transmitted by the container.",
        kind: MetricKind::Counter,
        value: |r, out| push_value(out, r.tx_bytes_total),
    },
    MetricFamily {
        name: "docker_container_block_read_bytes_total",
        help: "Total block IO read bytes by the container.",
        kind: MetricKind::Counter,
        value: |r, out| push_value(out, r.blk_read_bytes_total),
    },
    MetricFamily {
        name: "docker_container_block_write_bytes_total",
        help: "Total block IO written bytes by the container.",
        kind: MetricKind::Counter,
        value: |r, out| push_value(out, r.blk_write_bytes_total),
    },
    MetricFamily {
        name: "docker_container_pids",
        help: "Number of PIDs inside the container.",
        kind: MetricKind::Gauge,
        value: |r, out| push_value(out, r.pids),
    },
];

fn push_value(out: &mut String, value: impl std::fmt::Display) {
    // Writing into a String cannot fail.
    let _ = write!(out, "{value}");
}

/// Render the full document: HELP/TYPE preamble once, then every family's
/// sample for each container, in the order given.
pub fn render(containers: &[(ContainerIdentity, MetricRecord)]) -> String {
    let mut out = String::with_capacity(1024 + containers.len() * 1024);

    for family in &FAMILIES {
        let _ = writeln!(out, "# HELP {} {}", family.name, family.help);
        let _ = writeln!(out, "# TYPE {} {}", family.name, family.kind.as_str());
    }

    for (identity, record) in containers {
        let labels = format_labels(identity);
        for family in &FAMILIES {
            out.push_str(family.name);
            out.push_str(&labels);
            out.push(' ');
            (family.value)(record, &mut out);
            out.push('\n');
        }
    }

    out
}

fn format_labels(identity: &ContainerIdentity) -> String {
    format!(
        "{{container_id=\"{}\",container_name=\"{}\",image=\"{}\"}}",
        escape_label_value(&identity.id),
        escape_label_value(&identity.name),
        escape_label_value(&identity.image),
    )
}

/// Escape a label value: backslash, double quote and newline only.
pub fn escape_label_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out
}
