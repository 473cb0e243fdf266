// Copyright 2025 Perfdelta Contributors
// SPDX-License-Identifier: Apache-2.0

//! Tracked-metric vocabulary per benchmark kind.
//!
//! The comparison policy (relative percent vs absolute difference) is
//! fixed per metric here so it cannot drift between the CSV export, the
//! textual report, and the charts.

use crate::delta::{apply, DeltaPolicy, DeltaRecord, MetricDelta};
use crate::record::{Kind, UniformRecord};
use std::collections::BTreeMap;

/// One tracked metric of a benchmark kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricSpec {
    /// Key within the kind's [`UniformRecord`] vocabulary.
    pub key: &'static str,
    /// Display name used in the CSV `Metric` column.
    pub label: &'static str,
    /// How pre/post values of this metric are compared.
    pub policy: DeltaPolicy,
}

const PING_METRICS: &[MetricSpec] = &[
    MetricSpec {
        key: "avg_rtt",
        label: "Average RTT (ms)",
        policy: DeltaPolicy::Relative,
    },
    MetricSpec {
        key: "packet_loss",
        label: "Packet Loss (%)",
        policy: DeltaPolicy::Absolute,
    },
];

const IPERF_METRICS: &[MetricSpec] = &[MetricSpec {
    key: "avg_mbps",
    label: "Throughput (Mbps)",
    policy: DeltaPolicy::Relative,
}];

const DNS_METRICS: &[MetricSpec] = &[MetricSpec {
    key: "avg_response_time",
    label: "Avg Response Time (ms)",
    policy: DeltaPolicy::Relative,
}];

const TRANSFER_METRICS: &[MetricSpec] = &[MetricSpec {
    key: "speed_mbps",
    label: "Transfer Speed (MB/s)",
    policy: DeltaPolicy::Relative,
}];

/// Tracked metrics for `kind`.
///
/// YABS has no fixed vocabulary (its disk rows depend on the report) and
/// returns an empty slice; its metrics are derived dynamically from the
/// union of numeric keys seen on either side.
pub fn tracked(kind: Kind) -> &'static [MetricSpec] {
    match kind {
        Kind::Ping => PING_METRICS,
        Kind::Iperf => IPERF_METRICS,
        Kind::Dns => DNS_METRICS,
        Kind::Transfer(_) => TRANSFER_METRICS,
        Kind::Yabs => &[],
    }
}

/// Display label for a dynamic YABS metric key, e.g.
/// `geekbench_single` → `Geekbench Single`.
pub fn dynamic_label(key: &str) -> String {
    key.split('_')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Compute the [`DeltaRecord`] for a kind present in both phases.
///
/// Fixed-vocabulary kinds compare every tracked metric, defaulting a
/// missing side to 0. YABS compares the numeric keys present in both
/// records, always relatively.
pub fn delta_record(kind: Kind, pre: &UniformRecord, post: &UniformRecord) -> DeltaRecord {
    let mut changes = BTreeMap::new();

    let specs = tracked(kind);
    if specs.is_empty() {
        for key in pre.numeric_keys() {
            if let (Some(old), Some(new)) = (pre.num(key), post.num(key)) {
                changes.insert(
                    key.to_string(),
                    MetricDelta {
                        metric: key.to_string(),
                        policy: DeltaPolicy::Relative,
                        value: apply(DeltaPolicy::Relative, old, new),
                    },
                );
            }
        }
    } else {
        for spec in specs {
            let old = pre.num(spec.key).unwrap_or(0.0);
            let new = post.num(spec.key).unwrap_or(0.0);
            changes.insert(
                spec.key.to_string(),
                MetricDelta {
                    metric: spec.key.to_string(),
                    policy: spec.policy,
                    value: apply(spec.policy, old, new),
                },
            );
        }
    }

    DeltaRecord { kind, changes }
}
