// Copyright 2025 Perfdelta Contributors
// SPDX-License-Identifier: Apache-2.0

//! Normalized record types.
//!
//! A [`UniformRecord`] is the per-kind output of the result normalizer:
//! a mapping from a fixed metric vocabulary to numeric or string values.
//! One record exists per (phase, kind) pair; a [`ComparisonSession`]
//! owns the two per-phase maps and is passed explicitly between the
//! pipeline stages.

use crate::delta::DeltaRecord;
use crate::metrics;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Which side of the change under test a result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Captured before the change under test.
    Pre,
    /// Captured after the change under test.
    Post,
}

impl Phase {
    /// Filename tag identifying this phase (`pre_` / `post_`).
    pub fn tag(&self) -> &'static str {
        match self {
            Phase::Pre => "pre_",
            Phase::Post => "post_",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Pre => write!(f, "pre"),
            Phase::Post => write!(f, "post"),
        }
    }
}

/// File-transfer tool used for a transfer benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferTool {
    /// `scp` upload/download.
    Scp,
    /// `rsync` over ssh.
    Rsync,
    /// `wget` HTTP download.
    Wget,
    /// `curl` HTTP download.
    Curl,
}

impl TransferTool {
    /// All tools, in the row order used by the CSV export.
    pub const ALL: [TransferTool; 4] = [
        TransferTool::Wget,
        TransferTool::Curl,
        TransferTool::Scp,
        TransferTool::Rsync,
    ];

    /// Lowercase tag as it appears in filenames and `test_type` fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferTool::Scp => "scp",
            TransferTool::Rsync => "rsync",
            TransferTool::Wget => "wget",
            TransferTool::Curl => "curl",
        }
    }

    /// Parse a `test_type` tag into a tool.
    pub fn from_tag(tag: &str) -> Option<TransferTool> {
        match tag {
            "scp" => Some(TransferTool::Scp),
            "rsync" => Some(TransferTool::Rsync),
            "wget" => Some(TransferTool::Wget),
            "curl" => Some(TransferTool::Curl),
            _ => None,
        }
    }
}

impl fmt::Display for TransferTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Benchmark category a result file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    /// ICMP round-trip latency (`ping`).
    Ping,
    /// iperf3 throughput.
    Iperf,
    /// DNS resolver timing.
    Dns,
    /// File transfer over one of the known tools.
    Transfer(TransferTool),
    /// Multi-section YABS system benchmark (text report).
    Yabs,
}

impl Kind {
    /// Stable key for this kind (`ping`, `iperf`, `dns`,
    /// `transfer_<tool>`, `yabs`).
    pub fn key(&self) -> String {
        match self {
            Kind::Ping => "ping".to_string(),
            Kind::Iperf => "iperf".to_string(),
            Kind::Dns => "dns".to_string(),
            Kind::Transfer(tool) => format!("transfer_{tool}"),
            Kind::Yabs => "yabs".to_string(),
        }
    }

    /// Human-readable name used in the CSV `Test Type` column.
    pub fn display_name(&self) -> String {
        match self {
            Kind::Ping => "Ping".to_string(),
            Kind::Iperf => "iPerf3".to_string(),
            Kind::Dns => "DNS".to_string(),
            Kind::Transfer(tool) => tool.as_str().to_uppercase(),
            Kind::Yabs => "YABS".to_string(),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// A single normalized metric value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    /// Numeric metric (milliseconds, Mbps, counts, scores).
    Num(f64),
    /// Label metric (destination, server, status tags).
    Text(String),
}

impl MetricValue {
    /// Numeric value, if this is a [`MetricValue::Num`].
    pub fn as_num(&self) -> Option<f64> {
        match self {
            MetricValue::Num(v) => Some(*v),
            MetricValue::Text(_) => None,
        }
    }

    /// Text value, if this is a [`MetricValue::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MetricValue::Num(_) => None,
            MetricValue::Text(s) => Some(s),
        }
    }
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        MetricValue::Num(v)
    }
}

impl From<&str> for MetricValue {
    fn from(v: &str) -> Self {
        MetricValue::Text(v.to_string())
    }
}

impl From<String> for MetricValue {
    fn from(v: String) -> Self {
        MetricValue::Text(v)
    }
}

/// Normalized result for one (phase, kind) pair.
///
/// Only recognized fields survive normalization; absent source fields
/// resolve to documented defaults (0 for numbers, "unknown" for labels)
/// or are omitted entirely for the dynamic YABS vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniformRecord {
    /// Benchmark kind this record was normalized from.
    pub kind: Kind,
    /// Metric name to value. `BTreeMap` keeps iteration deterministic.
    pub metrics: BTreeMap<String, MetricValue>,
}

impl UniformRecord {
    /// Create an empty record for `kind`.
    pub fn new(kind: Kind) -> Self {
        Self {
            kind,
            metrics: BTreeMap::new(),
        }
    }

    /// Set a numeric metric.
    pub fn set_num(&mut self, key: impl Into<String>, value: f64) {
        self.metrics.insert(key.into(), MetricValue::Num(value));
    }

    /// Set a label metric.
    pub fn set_text(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metrics
            .insert(key.into(), MetricValue::Text(value.into()));
    }

    /// Numeric metric by name.
    pub fn num(&self, key: &str) -> Option<f64> {
        self.metrics.get(key).and_then(MetricValue::as_num)
    }

    /// Label metric by name.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.metrics.get(key).and_then(MetricValue::as_text)
    }

    /// Names of all numeric metrics, in key order.
    pub fn numeric_keys(&self) -> impl Iterator<Item = &str> {
        self.metrics
            .iter()
            .filter(|(_, v)| matches!(v, MetricValue::Num(_)))
            .map(|(k, _)| k.as_str())
    }
}

/// Accumulated normalized results for one comparison run.
///
/// Owns the two per-phase maps that the original tooling kept as
/// process-wide accumulators; here the session is a value threaded
/// through the pipeline stages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComparisonSession {
    /// Pre-phase records, keyed by kind.
    pub pre: BTreeMap<Kind, UniformRecord>,
    /// Post-phase records, keyed by kind.
    pub post: BTreeMap<Kind, UniformRecord>,
}

impl ComparisonSession {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record for `phase`. A later record of the same kind
    /// replaces the earlier one (last file wins, in lexicographic
    /// filename order — see DESIGN.md).
    pub fn insert(&mut self, phase: Phase, record: UniformRecord) {
        let map = match phase {
            Phase::Pre => &mut self.pre,
            Phase::Post => &mut self.post,
        };
        map.insert(record.kind, record);
    }

    /// Record for (phase, kind), if one was loaded.
    pub fn get(&self, phase: Phase, kind: Kind) -> Option<&UniformRecord> {
        match phase {
            Phase::Pre => self.pre.get(&kind),
            Phase::Post => self.post.get(&kind),
        }
    }

    /// True if either phase has a record for `kind`.
    pub fn has_any(&self, kind: Kind) -> bool {
        self.pre.contains_key(&kind) || self.post.contains_key(&kind)
    }

    /// Kinds present in both phases, in key order.
    pub fn kinds_with_both(&self) -> Vec<Kind> {
        self.pre
            .keys()
            .filter(|k| self.post.contains_key(k))
            .copied()
            .collect()
    }

    /// Kinds present in at least one phase, in key order.
    pub fn kinds_with_any(&self) -> Vec<Kind> {
        let mut kinds: Vec<Kind> = self.pre.keys().copied().collect();
        for kind in self.post.keys() {
            if !kinds.contains(kind) {
                kinds.push(*kind);
            }
        }
        kinds.sort();
        kinds
    }

    /// Compute one [`DeltaRecord`] per kind present in both phases.
    ///
    /// Kinds missing on either side are suppressed entirely rather than
    /// producing zero-filled deltas.
    pub fn compute_deltas(&self) -> BTreeMap<Kind, DeltaRecord> {
        self.kinds_with_both()
            .into_iter()
            .map(|kind| {
                let pre = &self.pre[&kind];
                let post = &self.post[&kind];
                (kind, metrics::delta_record(kind, pre, post))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_keys_are_stable() {
        assert_eq!(Kind::Ping.key(), "ping");
        assert_eq!(Kind::Transfer(TransferTool::Scp).key(), "transfer_scp");
        assert_eq!(Kind::Yabs.key(), "yabs");
        assert_eq!(Kind::Iperf.display_name(), "iPerf3");
        assert_eq!(Kind::Transfer(TransferTool::Wget).display_name(), "WGET");
    }

    #[test]
    fn record_defaults_and_accessors() {
        let mut rec = UniformRecord::new(Kind::Ping);
        rec.set_num("avg_rtt", 20.0);
        rec.set_text("destination", "unknown");

        assert_eq!(rec.num("avg_rtt"), Some(20.0));
        assert_eq!(rec.text("destination"), Some("unknown"));
        assert_eq!(rec.num("destination"), None);
        assert_eq!(rec.num("missing"), None);
        assert_eq!(rec.numeric_keys().collect::<Vec<_>>(), vec!["avg_rtt"]);
    }

    #[test]
    fn session_last_insert_wins() {
        let mut session = ComparisonSession::new();

        let mut first = UniformRecord::new(Kind::Ping);
        first.set_num("avg_rtt", 10.0);
        let mut second = UniformRecord::new(Kind::Ping);
        second.set_num("avg_rtt", 30.0);

        session.insert(Phase::Pre, first);
        session.insert(Phase::Pre, second);

        assert_eq!(session.pre.len(), 1);
        assert_eq!(session.get(Phase::Pre, Kind::Ping).unwrap().num("avg_rtt"), Some(30.0));
    }

    #[test]
    fn presence_rule_for_deltas() {
        let mut session = ComparisonSession::new();
        let mut pre = UniformRecord::new(Kind::Ping);
        pre.set_num("avg_rtt", 20.0);
        pre.set_num("packet_loss", 0.0);
        session.insert(Phase::Pre, pre);

        // Only one side present: no delta for ping.
        assert!(session.compute_deltas().is_empty());
        assert!(session.has_any(Kind::Ping));
        assert_eq!(session.kinds_with_any(), vec![Kind::Ping]);

        let mut post = UniformRecord::new(Kind::Ping);
        post.set_num("avg_rtt", 15.0);
        post.set_num("packet_loss", 1.0);
        session.insert(Phase::Post, post);

        let deltas = session.compute_deltas();
        assert_eq!(deltas.len(), 1);
        assert!(deltas.contains_key(&Kind::Ping));
    }
}
