// Copyright 2025 Perfdelta Contributors
// SPDX-License-Identifier: Apache-2.0

//! Percentage-change arithmetic and change classification.

use crate::record::Kind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Threshold (in percentage points) beyond which a change counts as
/// significant in the summary.
pub const SIGNIFICANCE_THRESHOLD: f64 = 5.0;

/// How to compare an (old, new) metric pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaPolicy {
    /// Relative percent change of a magnitude (latency, throughput).
    Relative,
    /// Absolute difference of a value already expressed in percent
    /// (packet loss). Not a percentage-of-a-percentage.
    Absolute,
}

/// Percentage change from `old` to `new`.
///
/// Zero-handling policy, preserved exactly for compatibility with the
/// original tooling: when `old == 0` the result is 0 if `new` is also 0,
/// otherwise a flat +100 sentinel regardless of the magnitude of `new`.
pub fn percent_change(old: f64, new: f64) -> f64 {
    if old == 0.0 {
        if new == 0.0 {
            0.0
        } else {
            100.0
        }
    } else {
        (new - old) / old * 100.0
    }
}

/// Apply `policy` to an (old, new) pair.
pub fn apply(policy: DeltaPolicy, old: f64, new: f64) -> f64 {
    match policy {
        DeltaPolicy::Relative => percent_change(old, new),
        DeltaPolicy::Absolute => new - old,
    }
}

/// Classification of a delta against the ±5 significance threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeClass {
    /// Change above +5.
    Improvement,
    /// Change below −5.
    Degradation,
    /// Within ±5.
    Neutral,
}

impl ChangeClass {
    /// Classify a delta value. The threshold is purely numeric; the
    /// summary does not distinguish lower-is-better metrics.
    pub fn of(value: f64) -> ChangeClass {
        if value > SIGNIFICANCE_THRESHOLD {
            ChangeClass::Improvement
        } else if value < -SIGNIFICANCE_THRESHOLD {
            ChangeClass::Degradation
        } else {
            ChangeClass::Neutral
        }
    }
}

/// One computed change for a single metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDelta {
    /// Metric key within the kind's vocabulary.
    pub metric: String,
    /// Policy the value was computed under.
    pub policy: DeltaPolicy,
    /// Signed change: percent for [`DeltaPolicy::Relative`], raw
    /// difference for [`DeltaPolicy::Absolute`].
    pub value: f64,
}

impl MetricDelta {
    /// Format with an explicit leading sign; relative deltas carry a
    /// trailing `%`, absolute deltas do not.
    pub fn format(&self) -> String {
        format_delta(self.value, self.policy)
    }

    /// Classification against the significance threshold.
    pub fn class(&self) -> ChangeClass {
        ChangeClass::of(self.value)
    }
}

/// All computed changes for one benchmark kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaRecord {
    /// Kind both input records belonged to.
    pub kind: Kind,
    /// Change per metric, in key order.
    pub changes: BTreeMap<String, MetricDelta>,
}

impl DeltaRecord {
    /// Change for one metric, if tracked and present.
    pub fn get(&self, metric: &str) -> Option<&MetricDelta> {
        self.changes.get(metric)
    }
}

/// Format a delta value with an explicit leading sign on positive
/// values. Zero and negative values render without a `+`.
pub fn format_delta(value: f64, policy: DeltaPolicy) -> String {
    let body = if value > 0.0 {
        format!("+{value:.1}")
    } else {
        format!("{value:.1}")
    };
    match policy {
        DeltaPolicy::Relative => format!("{body}%"),
        DeltaPolicy::Absolute => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_old_policy() {
        assert_eq!(percent_change(0.0, 0.0), 0.0);
        // Sentinel: exactly +100 regardless of magnitude.
        assert_eq!(percent_change(0.0, 0.001), 100.0);
        assert_eq!(percent_change(0.0, 50.0), 100.0);
        assert_eq!(percent_change(0.0, 1_000_000.0), 100.0);
    }

    #[test]
    fn nonzero_old_is_exact() {
        assert_eq!(percent_change(20.0, 15.0), -25.0);
        assert_eq!(percent_change(100.0, 150.0), 50.0);
        let change = percent_change(810.0, 950.0);
        assert!((change - 17.283_950_617_283_95).abs() < 1e-9);
    }

    #[test]
    fn absolute_policy_is_plain_difference() {
        assert_eq!(apply(DeltaPolicy::Absolute, 0.0, 1.0), 1.0);
        assert_eq!(apply(DeltaPolicy::Absolute, 2.5, 0.5), -2.0);
        // Relative would have used the sentinel here.
        assert_eq!(apply(DeltaPolicy::Relative, 0.0, 1.0), 100.0);
    }

    #[test]
    fn classification_boundaries() {
        assert_eq!(ChangeClass::of(5.0), ChangeClass::Neutral);
        assert_eq!(ChangeClass::of(5.01), ChangeClass::Improvement);
        assert_eq!(ChangeClass::of(-5.0), ChangeClass::Neutral);
        assert_eq!(ChangeClass::of(-5.01), ChangeClass::Degradation);
        assert_eq!(ChangeClass::of(0.0), ChangeClass::Neutral);
    }

    #[test]
    fn delta_formatting() {
        assert_eq!(format_delta(17.283, DeltaPolicy::Relative), "+17.3%");
        assert_eq!(format_delta(-25.0, DeltaPolicy::Relative), "-25.0%");
        assert_eq!(format_delta(1.0, DeltaPolicy::Absolute), "+1.0");
        assert_eq!(format_delta(0.0, DeltaPolicy::Relative), "0.0%");
    }
}
