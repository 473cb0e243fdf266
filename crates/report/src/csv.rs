//! CSV export of the comparison table.
//!
//! Produces the fixed five-column table, one row per tracked metric
//! present on at least one side. The document is built by hand with a
//! quoting helper; none of the values we emit need quoting in practice,
//! but labels pass through the escape anyway.

use perfdelta_core::{
    delta::{apply, format_delta, DeltaPolicy},
    metrics, ComparisonSession, Kind, Phase, TransferTool, UniformRecord,
};
use std::collections::BTreeSet;

/// Column header row, kept byte-identical to the original export.
pub const HEADER: &str = "Test Type,Metric,Pre-Test Value,Post-Test Value,Change %";

/// Kinds in fixed CSV row order.
fn row_order() -> Vec<Kind> {
    let mut kinds = vec![Kind::Ping, Kind::Iperf, Kind::Dns];
    kinds.extend(TransferTool::ALL.iter().map(|t| Kind::Transfer(*t)));
    kinds.push(Kind::Yabs);
    kinds
}

/// Format a cell value: whole numbers without decimals, fractional
/// values with two.
fn fmt_cell(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

fn escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn push_row(out: &mut String, cells: &[String; 5]) {
    let escaped: Vec<String> = cells.iter().map(|c| escape(c)).collect();
    out.push_str(&escaped.join(","));
    out.push('\n');
}

fn metric_row(
    kind: Kind,
    label: &str,
    key: &str,
    policy: DeltaPolicy,
    pre: Option<&UniformRecord>,
    post: Option<&UniformRecord>,
) -> [String; 5] {
    let pre_val = pre.and_then(|r| r.num(key));
    let post_val = post.and_then(|r| r.num(key));

    let pre_cell = pre_val.map(fmt_cell).unwrap_or_else(|| "N/A".to_string());
    let post_cell = post_val.map(fmt_cell).unwrap_or_else(|| "N/A".to_string());
    let change_cell = match (pre_val, post_val) {
        (Some(old), Some(new)) => format_delta(apply(policy, old, new), policy),
        _ => "N/A".to_string(),
    };

    [
        kind.display_name(),
        label.to_string(),
        pre_cell,
        post_cell,
        change_cell,
    ]
}

/// Render the full comparison table.
pub fn export_csv(session: &ComparisonSession) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');

    for kind in row_order() {
        if !session.has_any(kind) {
            continue;
        }
        let pre = session.get(Phase::Pre, kind);
        let post = session.get(Phase::Post, kind);

        let specs = metrics::tracked(kind);
        if specs.is_empty() {
            // Dynamic vocabulary: union of numeric keys on either side.
            let mut keys = BTreeSet::new();
            for record in [pre, post].into_iter().flatten() {
                keys.extend(record.numeric_keys().map(str::to_string));
            }
            for key in keys {
                let label = metrics::dynamic_label(&key);
                let row = metric_row(kind, &label, &key, DeltaPolicy::Relative, pre, post);
                push_row(&mut out, &row);
            }
        } else {
            for spec in specs {
                let row = metric_row(kind, spec.label, spec.key, spec.policy, pre, post);
                push_row(&mut out, &row);
            }
        }
    }

    out
}
