//! Pre/post comparison charts rendered as standalone SVG documents.
//!
//! Each chart follows the per-kind presence rule: the builders return
//! `None` when the records they need are missing, and [`render_all`]
//! collects only the charts that apply. The visual encoding (grouped
//! bars, semicircular gauges, a change table) and the palette follow
//! the original visualizer.

use perfdelta_core::{
    metrics, percent_change, ChangeClass, ComparisonSession, Kind, Phase, TransferTool,
};
use std::collections::BTreeMap;
use std::fmt::Write;

const PRE_BLUE: &str = "#3498db";
const POST_RED: &str = "#e74c3c";
const POST_GREEN: &str = "#2ecc71";
const PRE_PURPLE: &str = "#9b59b6";
const POST_ORANGE: &str = "#f39c12";
const IMPROVE_FILL: &str = "#90EE90";
const DEGRADE_FILL: &str = "#FFB6C1";
const NEUTRAL_YELLOW: &str = "#f0c419";

/// One cluster of pre/post bars.
struct BarGroup {
    label: String,
    pre: f64,
    post: f64,
}

fn svg_open(out: &mut String, width: u32, height: u32) {
    writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\" font-family=\"sans-serif\">"
    )
    .unwrap();
    writeln!(
        out,
        "  <rect width=\"{width}\" height=\"{height}\" fill=\"white\"/>"
    )
    .unwrap();
}

fn svg_close(out: &mut String) {
    writeln!(out, "</svg>").unwrap();
}

fn text(out: &mut String, x: f64, y: f64, size: u32, anchor: &str, extra: &str, content: &str) {
    writeln!(
        out,
        "  <text x=\"{x:.1}\" y=\"{y:.1}\" font-size=\"{size}\" text-anchor=\"{anchor}\"{extra}>{}</text>",
        escape_text(content)
    )
    .unwrap();
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Draw one grouped-bar panel with its own axes, value labels and an
/// optional percent-change annotation per group.
fn bar_panel(
    out: &mut String,
    origin_x: f64,
    origin_y: f64,
    title: &str,
    y_label: &str,
    groups: &[BarGroup],
    pre_color: &str,
    post_color: &str,
    annotate: bool,
) {
    let plot_h = 220.0;
    let group_w = 110.0;
    let bar_w = 36.0;
    let left = origin_x + 60.0;
    let top = origin_y + 50.0;
    let bottom = top + plot_h;
    let plot_w = groups.len() as f64 * group_w;

    let max = groups
        .iter()
        .map(|g| g.pre.max(g.post))
        .fold(0.0_f64, f64::max)
        .max(1e-9);
    let scale = plot_h / (max * 1.25);

    text(out, left + plot_w / 2.0, origin_y + 22.0, 15, "middle", " font-weight=\"bold\"", title);
    text(
        out,
        origin_x + 16.0,
        top + plot_h / 2.0,
        11,
        "middle",
        &format!(" transform=\"rotate(-90 {:.1} {:.1})\"", origin_x + 16.0, top + plot_h / 2.0),
        y_label,
    );

    // Axes.
    writeln!(
        out,
        "  <line x1=\"{left:.1}\" y1=\"{top:.1}\" x2=\"{left:.1}\" y2=\"{bottom:.1}\" stroke=\"#888\"/>"
    )
    .unwrap();
    writeln!(
        out,
        "  <line x1=\"{left:.1}\" y1=\"{bottom:.1}\" x2=\"{:.1}\" y2=\"{bottom:.1}\" stroke=\"#888\"/>",
        left + plot_w
    )
    .unwrap();

    for (i, group) in groups.iter().enumerate() {
        let gx = left + i as f64 * group_w + (group_w - 2.0 * bar_w - 8.0) / 2.0;
        for (value, color, offset) in [
            (group.pre, pre_color, 0.0),
            (group.post, post_color, bar_w + 8.0),
        ] {
            let h = value * scale;
            let x = gx + offset;
            let y = bottom - h;
            writeln!(
                out,
                "  <rect x=\"{x:.1}\" y=\"{y:.1}\" width=\"{bar_w:.1}\" height=\"{h:.1}\" fill=\"{color}\"/>"
            )
            .unwrap();
            if value > 0.0 {
                text(out, x + bar_w / 2.0, y - 4.0, 9, "middle", "", &format!("{value:.1}"));
            }
        }

        text(
            out,
            left + i as f64 * group_w + group_w / 2.0,
            bottom + 16.0,
            11,
            "middle",
            "",
            &group.label,
        );

        if annotate && group.pre > 0.0 {
            let change = percent_change(group.pre, group.post);
            let color = if change > 0.0 { "green" } else { "red" };
            let peak = bottom - group.pre.max(group.post) * scale - 18.0;
            text(
                out,
                left + i as f64 * group_w + group_w / 2.0,
                peak,
                11,
                "middle",
                &format!(" fill=\"{color}\" font-weight=\"bold\""),
                &format!("{change:+.1}%"),
            );
        }
    }

    // Legend.
    let lx = left + plot_w - 90.0;
    let ly = origin_y + 34.0;
    for (i, (label, color)) in [("Pre", pre_color), ("Post", post_color)].into_iter().enumerate() {
        let y = ly + i as f64 * 16.0;
        writeln!(
            out,
            "  <rect x=\"{lx:.1}\" y=\"{:.1}\" width=\"12\" height=\"12\" fill=\"{color}\"/>",
            y - 10.0
        )
        .unwrap();
        text(out, lx + 18.0, y, 11, "start", "", label);
    }
}

/// Ping latency comparison: RTT triple plus packet-loss pair.
/// Requires a ping record on both sides.
pub fn ping_comparison(session: &ComparisonSession) -> Option<String> {
    let pre = session.get(Phase::Pre, Kind::Ping)?;
    let post = session.get(Phase::Post, Kind::Ping)?;

    let rtt_groups = vec![
        BarGroup {
            label: "Min RTT".to_string(),
            pre: pre.num("min_rtt").unwrap_or(0.0),
            post: post.num("min_rtt").unwrap_or(0.0),
        },
        BarGroup {
            label: "Avg RTT".to_string(),
            pre: pre.num("avg_rtt").unwrap_or(0.0),
            post: post.num("avg_rtt").unwrap_or(0.0),
        },
        BarGroup {
            label: "Max RTT".to_string(),
            pre: pre.num("max_rtt").unwrap_or(0.0),
            post: post.num("max_rtt").unwrap_or(0.0),
        },
    ];
    let loss_group = vec![BarGroup {
        label: "Packet Loss".to_string(),
        pre: pre.num("packet_loss").unwrap_or(0.0),
        post: post.num("packet_loss").unwrap_or(0.0),
    }];

    let destination = pre.text("destination").unwrap_or("unknown");
    let mut out = String::new();
    svg_open(&mut out, 1000, 400);
    text(
        &mut out,
        500.0,
        26.0,
        17,
        "middle",
        " font-weight=\"bold\"",
        &format!("Network Latency Analysis - {destination}"),
    );
    bar_panel(
        &mut out,
        20.0,
        40.0,
        "Ping Latency Comparison",
        "Latency (ms)",
        &rtt_groups,
        PRE_BLUE,
        POST_RED,
        false,
    );
    bar_panel(
        &mut out,
        560.0,
        40.0,
        "Packet Loss Comparison",
        "Packet Loss (%)",
        &loss_group,
        PRE_BLUE,
        POST_RED,
        false,
    );
    svg_close(&mut out);
    Some(out)
}

/// Throughput comparison across iperf and the transfer tools.
/// Emitted when at least one throughput record exists on either side;
/// the missing side of a pair renders a zero-height bar.
pub fn throughput_comparison(session: &ComparisonSession) -> Option<String> {
    let mut kinds: Vec<Kind> = vec![Kind::Iperf];
    kinds.extend(TransferTool::ALL.iter().map(|t| Kind::Transfer(*t)));

    let mut groups = Vec::new();
    for kind in kinds {
        if !session.has_any(kind) {
            continue;
        }
        let key = match kind {
            Kind::Iperf => "avg_mbps",
            _ => "speed_mbps",
        };
        groups.push(BarGroup {
            label: kind.display_name(),
            pre: session
                .get(Phase::Pre, kind)
                .and_then(|r| r.num(key))
                .unwrap_or(0.0),
            post: session
                .get(Phase::Post, kind)
                .and_then(|r| r.num(key))
                .unwrap_or(0.0),
        });
    }
    if groups.is_empty() {
        return None;
    }

    let width = (160 + groups.len() * 110).max(420) as u32;
    let mut out = String::new();
    svg_open(&mut out, width, 360);
    bar_panel(
        &mut out,
        20.0,
        10.0,
        "Network Throughput Comparison",
        "Throughput (Mbps)",
        &groups,
        PRE_BLUE,
        POST_GREEN,
        true,
    );
    svg_close(&mut out);
    Some(out)
}

/// DNS response-time comparison. Requires a dns record on both sides.
pub fn dns_performance(session: &ComparisonSession) -> Option<String> {
    let pre = session.get(Phase::Pre, Kind::Dns)?;
    let post = session.get(Phase::Post, Kind::Dns)?;

    let groups: Vec<BarGroup> = [
        ("Min Response", "min_response_time"),
        ("Avg Response", "avg_response_time"),
        ("Max Response", "max_response_time"),
    ]
    .into_iter()
    .map(|(label, key)| BarGroup {
        label: label.to_string(),
        pre: pre.num(key).unwrap_or(0.0),
        post: post.num(key).unwrap_or(0.0),
    })
    .collect();

    let server = pre.text("dns_server").unwrap_or("unknown");
    let mut out = String::new();
    svg_open(&mut out, 520, 360);
    bar_panel(
        &mut out,
        20.0,
        10.0,
        &format!("DNS Performance - Server: {server}"),
        "Response Time (ms)",
        &groups,
        PRE_PURPLE,
        POST_ORANGE,
        false,
    );
    svg_close(&mut out);
    Some(out)
}

/// Headline metrics the dashboard aggregates, keyed by a stable name.
fn dashboard_metrics(session: &ComparisonSession) -> BTreeMap<String, f64> {
    let mut out = BTreeMap::new();

    if let (Some(pre), Some(post)) = (
        session.get(Phase::Pre, Kind::Ping),
        session.get(Phase::Post, Kind::Ping),
    ) {
        out.insert(
            "ping_latency_change".to_string(),
            percent_change(
                pre.num("avg_rtt").unwrap_or(0.0),
                post.num("avg_rtt").unwrap_or(0.0),
            ),
        );
        out.insert(
            "packet_loss_diff".to_string(),
            post.num("packet_loss").unwrap_or(0.0) - pre.num("packet_loss").unwrap_or(0.0),
        );
    }

    let mut throughput_changes = Vec::new();
    let mut kinds: Vec<Kind> = vec![Kind::Iperf];
    kinds.extend(TransferTool::ALL.iter().map(|t| Kind::Transfer(*t)));
    for kind in kinds {
        let key = match kind {
            Kind::Iperf => "avg_mbps",
            _ => "speed_mbps",
        };
        if let (Some(pre), Some(post)) =
            (session.get(Phase::Pre, kind), session.get(Phase::Post, kind))
        {
            let old = pre.num(key).unwrap_or(0.0);
            let new = post.num(key).unwrap_or(0.0);
            if old > 0.0 {
                let change = percent_change(old, new);
                throughput_changes.push(change);
                out.insert(format!("{}_change", kind.key()), change);
            }
        }
    }
    if !throughput_changes.is_empty() {
        out.insert(
            "avg_throughput_change".to_string(),
            throughput_changes.iter().sum::<f64>() / throughput_changes.len() as f64,
        );
    }

    if let (Some(pre), Some(post)) = (
        session.get(Phase::Pre, Kind::Dns),
        session.get(Phase::Post, Kind::Dns),
    ) {
        out.insert(
            "dns_response_change".to_string(),
            percent_change(
                pre.num("avg_response_time").unwrap_or(0.0),
                post.num("avg_response_time").unwrap_or(0.0),
            ),
        );
    }

    out
}

/// Semicircular gauge showing a clamped [-100, +100] change value.
/// `inverse` flips the good/bad coloring for lower-is-better metrics.
fn gauge(out: &mut String, cx: f64, cy: f64, value: f64, title: &str, inverse: bool) {
    let signed = if inverse { -value } else { value };
    let color = match ChangeClass::of(signed) {
        ChangeClass::Improvement => "green",
        ChangeClass::Degradation => "red",
        ChangeClass::Neutral => NEUTRAL_YELLOW,
    };

    let r = 64.0;
    // Background semicircle.
    writeln!(
        out,
        "  <path d=\"M {:.1} {cy:.1} A {r:.1} {r:.1} 0 0 1 {:.1} {cy:.1}\" fill=\"none\" stroke=\"#ddd\" stroke-width=\"20\"/>",
        cx - r,
        cx + r
    )
    .unwrap();

    // Value arc, swept clockwise from the left endpoint.
    let clamped = value.clamp(-100.0, 100.0);
    let fraction = ((clamped + 100.0) / 200.0).min(0.999);
    let angle = std::f64::consts::PI * (1.0 - fraction);
    let ex = cx + r * angle.cos();
    let ey = cy - r * angle.sin();
    writeln!(
        out,
        "  <path d=\"M {:.1} {cy:.1} A {r:.1} {r:.1} 0 0 1 {ex:.1} {ey:.1}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"20\" stroke-opacity=\"0.8\"/>",
        cx - r
    )
    .unwrap();

    text(
        out,
        cx,
        cy - 8.0,
        18,
        "middle",
        " font-weight=\"bold\"",
        &format!("{value:+.1}%"),
    );
    text(out, cx, cy + 22.0, 11, "middle", "", title);
}

/// Summary dashboard: improvement/degradation tallies, three headline
/// gauges and a change table. Emitted only when at least one headline
/// metric exists.
pub fn summary_dashboard(session: &ComparisonSession) -> Option<String> {
    let metrics_map = dashboard_metrics(session);
    if metrics_map.is_empty() {
        return None;
    }

    let changes: Vec<f64> = metrics_map
        .iter()
        .filter(|(k, _)| k.ends_with("_change"))
        .map(|(_, v)| *v)
        .collect();
    let improvements = changes
        .iter()
        .filter(|v| ChangeClass::of(**v) == ChangeClass::Improvement)
        .count();
    let degradations = changes
        .iter()
        .filter(|v| ChangeClass::of(**v) == ChangeClass::Degradation)
        .count();
    let neutral = changes.len() - improvements - degradations;

    let table_rows = metrics_map.len() as f64;
    let height = (330.0 + table_rows * 24.0 + 30.0) as u32;

    let mut out = String::new();
    svg_open(&mut out, 900, height);
    text(
        &mut out,
        450.0,
        30.0,
        18,
        "middle",
        " font-weight=\"bold\"",
        "Performance Test Summary Dashboard",
    );
    text(
        &mut out,
        450.0,
        58.0,
        13,
        "middle",
        "",
        &format!(
            "Improvements: {improvements}    Degradations: {degradations}    No Change: {neutral}"
        ),
    );

    // Headline gauges.
    let gauges: [(&str, &str, bool, f64); 3] = [
        ("ping_latency_change", "Latency Change", true, 190.0),
        ("avg_throughput_change", "Throughput Change", false, 450.0),
        ("dns_response_change", "DNS Response Change", true, 710.0),
    ];
    for (key, title, inverse, cx) in gauges {
        match metrics_map.get(key) {
            Some(value) => gauge(&mut out, cx, 170.0, *value, title, inverse),
            None => text(
                &mut out,
                cx,
                160.0,
                12,
                "middle",
                " fill=\"#888\"",
                &format!("No {title} Data"),
            ),
        }
    }

    // Change table.
    let table_top = 260.0;
    text(&mut out, 300.0, table_top, 13, "start", " font-weight=\"bold\"", "Metric");
    text(&mut out, 560.0, table_top, 13, "end", " font-weight=\"bold\"", "Change");
    for (i, (key, value)) in metrics_map.iter().enumerate() {
        let y = table_top + 24.0 * (i as f64 + 1.0);
        let is_diff = key.ends_with("_diff");
        let label = metrics::dynamic_label(
            key.trim_end_matches("_change").trim_end_matches("_diff"),
        );
        let formatted = if is_diff {
            format!("{value:+.2}")
        } else {
            format!("{value:+.1}%")
        };
        let fill = if !is_diff && *value > 5.0 {
            IMPROVE_FILL
        } else if !is_diff && *value < -5.0 {
            DEGRADE_FILL
        } else {
            "none"
        };
        if fill != "none" {
            writeln!(
                out,
                "  <rect x=\"480\" y=\"{:.1}\" width=\"90\" height=\"20\" fill=\"{fill}\"/>",
                y - 14.0
            )
            .unwrap();
        }
        text(&mut out, 300.0, y, 12, "start", "", &label);
        text(&mut out, 560.0, y, 12, "end", "", &formatted);
    }

    svg_close(&mut out);
    Some(out)
}

/// All applicable charts for a session, as (basename, document) pairs.
pub fn render_all(session: &ComparisonSession) -> Vec<(String, String)> {
    let mut charts = Vec::new();
    if let Some(svg) = ping_comparison(session) {
        charts.push(("ping_comparison".to_string(), svg));
    }
    if let Some(svg) = throughput_comparison(session) {
        charts.push(("throughput_comparison".to_string(), svg));
    }
    if let Some(svg) = dns_performance(session) {
        charts.push(("dns_performance".to_string(), svg));
    }
    if let Some(svg) = summary_dashboard(session) {
        charts.push(("summary_dashboard".to_string(), svg));
    }
    charts
}

#[cfg(test)]
mod tests {
    use super::*;
    use perfdelta_core::UniformRecord;

    fn ping_record(avg: f64) -> UniformRecord {
        let mut rec = UniformRecord::new(Kind::Ping);
        rec.set_num("min_rtt", avg - 2.0);
        rec.set_num("avg_rtt", avg);
        rec.set_num("max_rtt", avg + 5.0);
        rec.set_num("packet_loss", 0.0);
        rec.set_text("destination", "example.net");
        rec
    }

    #[test]
    fn ping_chart_requires_both_sides() {
        let mut session = ComparisonSession::new();
        session.insert(Phase::Pre, ping_record(20.0));
        assert!(ping_comparison(&session).is_none());

        session.insert(Phase::Post, ping_record(15.0));
        let svg = ping_comparison(&session).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Network Latency Analysis - example.net"));
        assert!(svg.contains("Packet Loss Comparison"));
    }

    #[test]
    fn throughput_chart_accepts_one_sided_data() {
        let mut session = ComparisonSession::new();
        let mut rec = UniformRecord::new(Kind::Iperf);
        rec.set_num("avg_mbps", 810.0);
        session.insert(Phase::Pre, rec);

        let svg = throughput_comparison(&session).unwrap();
        assert!(svg.contains("iPerf3"));
        assert!(svg.contains("810.0"));
    }

    #[test]
    fn dashboard_aggregates_headline_metrics() {
        let mut session = ComparisonSession::new();
        session.insert(Phase::Pre, ping_record(20.0));
        session.insert(Phase::Post, ping_record(15.0));

        let mut pre = UniformRecord::new(Kind::Iperf);
        pre.set_num("avg_mbps", 810.0);
        let mut post = UniformRecord::new(Kind::Iperf);
        post.set_num("avg_mbps", 950.0);
        session.insert(Phase::Pre, pre);
        session.insert(Phase::Post, post);

        let metrics_map = dashboard_metrics(&session);
        assert_eq!(metrics_map["ping_latency_change"], -25.0);
        assert!((metrics_map["avg_throughput_change"] - 17.28).abs() < 0.01);
        assert!(metrics_map.contains_key("iperf_change"));

        let svg = summary_dashboard(&session).unwrap();
        assert!(svg.contains("Performance Test Summary Dashboard"));
        assert!(svg.contains("Latency Change"));
        assert!(svg.contains("No DNS Response Change Data"));
    }

    #[test]
    fn zero_pre_throughput_excluded_from_average() {
        let mut session = ComparisonSession::new();
        let kind = Kind::Transfer(TransferTool::Wget);
        let mut pre = UniformRecord::new(kind);
        pre.set_num("speed_mbps", 0.0);
        let mut post = UniformRecord::new(kind);
        post.set_num("speed_mbps", 50.0);
        session.insert(Phase::Pre, pre);
        session.insert(Phase::Post, post);

        let metrics_map = dashboard_metrics(&session);
        assert!(!metrics_map.contains_key("avg_throughput_change"));
        assert!(metrics_map.is_empty());
    }

    #[test]
    fn render_all_respects_presence_rules() {
        let session = ComparisonSession::new();
        assert!(render_all(&session).is_empty());

        let mut session = ComparisonSession::new();
        session.insert(Phase::Pre, ping_record(20.0));
        session.insert(Phase::Post, ping_record(18.0));
        let charts = render_all(&session);
        let names: Vec<&str> = charts.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["ping_comparison", "summary_dashboard"]);
    }
}
