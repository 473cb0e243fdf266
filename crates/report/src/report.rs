//! Sectioned textual comparison report.
//!
//! Mirrors the CSV contents in a human-readable form: per-area change
//! lines followed by a summary that classifies every computed delta
//! against the ±5 significance threshold.

use colored::Colorize;
use perfdelta_core::{metrics, ChangeClass, DeltaRecord, Kind, TransferTool};
use std::collections::BTreeMap;
use std::fmt::Write;

fn section(out: &mut String, title: &str) {
    writeln!(out).unwrap();
    writeln!(out, "### {title} ###").unwrap();
}

fn change_line(out: &mut String, label: &str, deltas: &BTreeMap<Kind, DeltaRecord>, kind: Kind, metric: &str) {
    if let Some(delta) = deltas.get(&kind).and_then(|d| d.get(metric)) {
        writeln!(out, "{label}: {}", delta.format()).unwrap();
    }
}

/// Render the full comparison report.
///
/// Colored glyphs are used for the summary lines; everything else is
/// plain text suitable for piping.
pub fn render(deltas: &BTreeMap<Kind, DeltaRecord>) -> String {
    let mut out = String::new();

    writeln!(out).unwrap();
    writeln!(out, "{}", "=".repeat(60)).unwrap();
    writeln!(out, "Performance Test Results Comparison").unwrap();
    writeln!(out, "Generated: {}", chrono::Utc::now().to_rfc3339()).unwrap();
    writeln!(out, "{}", "=".repeat(60)).unwrap();

    section(&mut out, "Network Performance");
    change_line(&mut out, "Ping RTT Change", deltas, Kind::Ping, "avg_rtt");
    if let Some(loss) = deltas.get(&Kind::Ping).and_then(|d| d.get("packet_loss")) {
        // Packet loss is an absolute difference in percentage points.
        writeln!(out, "Packet Loss Change: {}", loss.format()).unwrap();
    }
    change_line(&mut out, "Throughput Change", deltas, Kind::Iperf, "avg_mbps");

    section(&mut out, "DNS Performance");
    change_line(
        &mut out,
        "Response Time Change",
        deltas,
        Kind::Dns,
        "avg_response_time",
    );

    section(&mut out, "Data Transfer Performance");
    for tool in TransferTool::ALL {
        let label = format!("{} Speed Change", tool.as_str().to_uppercase());
        change_line(&mut out, &label, deltas, Kind::Transfer(tool), "speed_mbps");
    }

    if let Some(yabs) = deltas.get(&Kind::Yabs) {
        section(&mut out, "System Benchmark");
        for (key, delta) in &yabs.changes {
            writeln!(out, "{} Change: {}", metrics::dynamic_label(key), delta.format()).unwrap();
        }
    }

    render_summary(&mut out, deltas);
    out
}

fn render_summary(out: &mut String, deltas: &BTreeMap<Kind, DeltaRecord>) {
    section(out, "Summary");

    let mut improvements = Vec::new();
    let mut degradations = Vec::new();
    for (kind, record) in deltas {
        for delta in record.changes.values() {
            let entry = format!("{}: {}", kind.key(), delta.format());
            match delta.class() {
                ChangeClass::Improvement => improvements.push(entry),
                ChangeClass::Degradation => degradations.push(entry),
                ChangeClass::Neutral => {}
            }
        }
    }

    if !improvements.is_empty() {
        writeln!(out).unwrap();
        writeln!(out, "Improvements: {}", improvements.len()).unwrap();
        for entry in &improvements {
            writeln!(out, "  {} {entry}", "✓".green()).unwrap();
        }
    }

    if !degradations.is_empty() {
        writeln!(out).unwrap();
        writeln!(out, "Degradations: {}", degradations.len()).unwrap();
        for entry in &degradations {
            writeln!(out, "  {} {entry}", "✗".red()).unwrap();
        }
    }

    if improvements.is_empty() && degradations.is_empty() {
        writeln!(out).unwrap();
        writeln!(out, "No significant changes detected (±5% threshold)").unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perfdelta_core::{ComparisonSession, Phase, UniformRecord};

    fn session_with(kind: Kind, metric: &str, pre: f64, post: f64) -> ComparisonSession {
        let mut session = ComparisonSession::new();
        let mut a = UniformRecord::new(kind);
        a.set_num(metric, pre);
        let mut b = UniformRecord::new(kind);
        b.set_num(metric, post);
        session.insert(Phase::Pre, a);
        session.insert(Phase::Post, b);
        session
    }

    #[test]
    fn report_contains_ping_section_and_summary() {
        colored::control::set_override(false);

        let session = session_with(Kind::Ping, "avg_rtt", 20.0, 15.0);
        let deltas = session.compute_deltas();
        let text = render(&deltas);

        assert!(text.contains("Performance Test Results Comparison"));
        assert!(text.contains("### Network Performance ###"));
        assert!(text.contains("Ping RTT Change: -25.0%"));
        // avg_rtt change is -25 and packet_loss change is 0: one degradation.
        assert!(text.contains("Degradations: 1"));
        assert!(text.contains("✗ ping: -25.0%"));
    }

    #[test]
    fn packet_loss_line_matches_csv_formatting() {
        colored::control::set_override(false);

        let session = session_with(Kind::Ping, "packet_loss", 0.0, 1.0);
        let deltas = session.compute_deltas();
        let text = render(&deltas);

        // Absolute diffs carry no percent suffix, same as the CSV column.
        assert!(text.contains("Packet Loss Change: +1.0\n"));
        assert!(!text.contains("Packet Loss Change: +1.0%"));
    }

    #[test]
    fn neutral_changes_report_no_significant_line() {
        colored::control::set_override(false);

        let session = session_with(Kind::Iperf, "avg_mbps", 100.0, 102.0);
        let deltas = session.compute_deltas();
        let text = render(&deltas);

        assert!(text.contains("Throughput Change: +2.0%"));
        assert!(text.contains("No significant changes detected (±5% threshold)"));
    }

    #[test]
    fn missing_kinds_emit_no_lines() {
        let session = ComparisonSession::new();
        let deltas = session.compute_deltas();
        let text = render(&deltas);

        assert!(!text.contains("Ping RTT Change"));
        assert!(!text.contains("### System Benchmark ###"));
        assert!(text.contains("No significant changes detected"));
    }
}
