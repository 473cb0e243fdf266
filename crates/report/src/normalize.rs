//! Per-kind result normalizers.
//!
//! Each normalizer is pure, total and idempotent: it maps one decoded
//! raw record onto the kind's fixed metric vocabulary, resolving absent
//! optional fields to documented defaults (0 for numbers, "unknown" for
//! labels) instead of failing. Only unreadable or undecodable input is
//! an error, and that is handled before these functions are called.

use once_cell::sync::Lazy;
use perfdelta_core::{Kind, TransferTool, UniformRecord};
use regex::Regex;
use serde_json::Value;

/// Bits per second in a megabit.
const BITS_PER_MBIT: f64 = 1_000_000.0;

/// Bytes in a megabyte (binary).
const BYTES_PER_MB: f64 = 1_048_576.0;

fn num(data: &Value, key: &str) -> f64 {
    data.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

fn text(data: &Value, key: &str) -> String {
    data.get(key)
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string()
}

/// Normalize a ping result.
///
/// Reads `rtt_{avg,min,max}_ms` and `packet_loss_percent` (default 0)
/// plus the `destination` label (default "unknown").
pub fn normalize_ping(data: &Value) -> UniformRecord {
    let mut rec = UniformRecord::new(Kind::Ping);
    rec.set_num("avg_rtt", num(data, "rtt_avg_ms"));
    rec.set_num("min_rtt", num(data, "rtt_min_ms"));
    rec.set_num("max_rtt", num(data, "rtt_max_ms"));
    rec.set_num("packet_loss", num(data, "packet_loss_percent"));
    rec.set_text("destination", text(data, "destination"));
    rec
}

/// Normalize an iperf3 result.
///
/// Standard iperf3 JSON carries an `end` summary section; sender and
/// receiver bitrates are converted to Mbps and averaged. The simplified
/// custom format carries a precomputed `speed_mbps` instead.
pub fn normalize_iperf(data: &Value) -> UniformRecord {
    let mut rec = UniformRecord::new(Kind::Iperf);
    if data.get("end").is_some() {
        let sender = data
            .pointer("/end/sum_sent/bits_per_second")
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
            / BITS_PER_MBIT;
        let receiver = data
            .pointer("/end/sum_received/bits_per_second")
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
            / BITS_PER_MBIT;
        rec.set_num("sender_mbps", sender);
        rec.set_num("receiver_mbps", receiver);
        rec.set_num("avg_mbps", (sender + receiver) / 2.0);
    } else {
        rec.set_num("avg_mbps", num(data, "speed_mbps"));
    }
    rec
}

/// Normalize a DNS timing result.
///
/// Prefers the `summary` section when present; otherwise falls back to
/// the flat dnsperf-style latency fields and a completed-query count.
pub fn normalize_dns(data: &Value) -> UniformRecord {
    let mut rec = UniformRecord::new(Kind::Dns);
    if let Some(summary) = data.get("summary") {
        rec.set_num("avg_response_time", num(summary, "avg_response_time_ms"));
        rec.set_num("min_response_time", num(summary, "min_response_time_ms"));
        rec.set_num("max_response_time", num(summary, "max_response_time_ms"));
        rec.set_num("success_rate", num(summary, "success_rate"));
    } else {
        rec.set_num("avg_response_time", num(data, "avg_latency_ms"));
        rec.set_num("min_response_time", num(data, "min_latency_ms"));
        rec.set_num("max_response_time", num(data, "max_latency_ms"));
        rec.set_num("queries_completed", num(data, "queries_completed"));
    }
    rec.set_text("dns_server", text(data, "dns_server"));
    rec
}

/// Normalize a file-transfer result.
///
/// The record is keyed by the JSON `test_type` tag when it names a known
/// tool; otherwise the kind tag from the filename stands. File size is
/// converted from bytes to megabytes.
pub fn normalize_transfer(data: &Value, fallback: TransferTool) -> UniformRecord {
    let test_type = text(data, "test_type");
    let tool = TransferTool::from_tag(&test_type).unwrap_or(fallback);

    let mut rec = UniformRecord::new(Kind::Transfer(tool));
    rec.set_text("test_type", test_type);
    rec.set_num("speed_mbps", num(data, "speed_mbps"));
    rec.set_num("file_size_mb", num(data, "file_size_bytes") / BYTES_PER_MB);
    rec.set_num("duration_seconds", num(data, "duration_seconds"));
    rec.set_text("status", text(data, "status"));
    rec
}

static CPU_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"CPU cores\s+:\s+(\d+)\s+@\s+([\d.]+\s+\w+)").unwrap());
static GB_SINGLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Single-Core Score\s+:\s+(\d+)").unwrap());
static GB_MULTI_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Multi-Core Score\s+:\s+(\d+)").unwrap());
static FIO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+k?)\s+:\s+([\d.]+)\s+MB/s\s+\(([\d.]+)\s+IOPS\)").unwrap());

/// Normalize a YABS text report.
///
/// Extracts CPU core count and frequency, Geekbench composite scores
/// and the fio disk rows (`disk_<size>_mbps` / `disk_<size>_iops` per
/// block size). A label that fails to match is simply omitted.
pub fn normalize_yabs(content: &str) -> UniformRecord {
    let mut rec = UniformRecord::new(Kind::Yabs);

    if let Some(caps) = CPU_RE.captures(content) {
        if let Ok(cores) = caps[1].parse::<f64>() {
            rec.set_num("cpu_cores", cores);
        }
        rec.set_text("cpu_freq", &caps[2]);
    }
    if let Some(caps) = GB_SINGLE_RE.captures(content) {
        if let Ok(score) = caps[1].parse::<f64>() {
            rec.set_num("geekbench_single", score);
        }
    }
    if let Some(caps) = GB_MULTI_RE.captures(content) {
        if let Ok(score) = caps[1].parse::<f64>() {
            rec.set_num("geekbench_multi", score);
        }
    }
    for caps in FIO_RE.captures_iter(content) {
        let block_size = &caps[1];
        if let Ok(speed) = caps[2].parse::<f64>() {
            rec.set_num(format!("disk_{block_size}_mbps"), speed);
        }
        if let Ok(iops) = caps[3].parse::<f64>() {
            rec.set_num(format!("disk_{block_size}_iops"), iops);
        }
    }

    rec
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ping_fields_and_defaults() {
        let data = json!({
            "rtt_avg_ms": 20.0,
            "rtt_min_ms": 18.2,
            "rtt_max_ms": 25.9,
            "packet_loss_percent": 0.5,
            "destination": "8.8.8.8"
        });
        let rec = normalize_ping(&data);
        assert_eq!(rec.num("avg_rtt"), Some(20.0));
        assert_eq!(rec.num("min_rtt"), Some(18.2));
        assert_eq!(rec.num("packet_loss"), Some(0.5));
        assert_eq!(rec.text("destination"), Some("8.8.8.8"));

        let empty = normalize_ping(&json!({}));
        assert_eq!(empty.num("avg_rtt"), Some(0.0));
        assert_eq!(empty.num("packet_loss"), Some(0.0));
        assert_eq!(empty.text("destination"), Some("unknown"));
    }

    #[test]
    fn iperf_standard_format_averages_mbps() {
        let data = json!({
            "end": {
                "sum_sent": { "bits_per_second": 800_000_000.0 },
                "sum_received": { "bits_per_second": 820_000_000.0 }
            }
        });
        let rec = normalize_iperf(&data);
        assert_eq!(rec.num("sender_mbps"), Some(800.0));
        assert_eq!(rec.num("receiver_mbps"), Some(820.0));
        assert_eq!(rec.num("avg_mbps"), Some(810.0));
    }

    #[test]
    fn iperf_custom_format_reads_speed_directly() {
        let rec = normalize_iperf(&json!({ "speed_mbps": 123.4 }));
        assert_eq!(rec.num("avg_mbps"), Some(123.4));
        assert_eq!(rec.num("sender_mbps"), None);

        let rec = normalize_iperf(&json!({}));
        assert_eq!(rec.num("avg_mbps"), Some(0.0));
    }

    #[test]
    fn dns_prefers_summary_section() {
        let data = json!({
            "dns_server": "1.1.1.1",
            "summary": {
                "avg_response_time_ms": 12.5,
                "min_response_time_ms": 9.0,
                "max_response_time_ms": 30.1,
                "success_rate": 0.99
            },
            "avg_latency_ms": 99.0
        });
        let rec = normalize_dns(&data);
        assert_eq!(rec.num("avg_response_time"), Some(12.5));
        assert_eq!(rec.num("success_rate"), Some(0.99));
        assert_eq!(rec.num("queries_completed"), None);
        assert_eq!(rec.text("dns_server"), Some("1.1.1.1"));
    }

    #[test]
    fn dns_flat_fallback() {
        let data = json!({
            "avg_latency_ms": 14.0,
            "min_latency_ms": 10.0,
            "max_latency_ms": 40.0,
            "queries_completed": 100.0
        });
        let rec = normalize_dns(&data);
        assert_eq!(rec.num("avg_response_time"), Some(14.0));
        assert_eq!(rec.num("queries_completed"), Some(100.0));
        assert_eq!(rec.text("dns_server"), Some("unknown"));
    }

    #[test]
    fn transfer_converts_bytes_and_rekeys_by_test_type() {
        let data = json!({
            "test_type": "rsync",
            "speed_mbps": 42.0,
            "file_size_bytes": 10_485_760.0,
            "duration_seconds": 2.0,
            "status": "success"
        });
        // Filename said scp; the test_type tag wins.
        let rec = normalize_transfer(&data, TransferTool::Scp);
        assert_eq!(rec.kind, Kind::Transfer(TransferTool::Rsync));
        assert_eq!(rec.num("file_size_mb"), Some(10.0));
        assert_eq!(rec.num("speed_mbps"), Some(42.0));
        assert_eq!(rec.text("status"), Some("success"));

        let empty = normalize_transfer(&json!({}), TransferTool::Wget);
        assert_eq!(empty.kind, Kind::Transfer(TransferTool::Wget));
        assert_eq!(empty.text("test_type"), Some("unknown"));
        assert_eq!(empty.num("speed_mbps"), Some(0.0));
    }

    #[test]
    fn yabs_extracts_documented_labels() {
        let content = "\
CPU cores  : 4 @ 2.5 GHz
Single-Core Score  : 1042
Multi-Core Score   : 3977
4k  : 120.5 MB/s (30000 IOPS)
512k  : 950.0 MB/s (1800 IOPS)
";
        let rec = normalize_yabs(content);
        assert_eq!(rec.num("cpu_cores"), Some(4.0));
        assert_eq!(rec.text("cpu_freq"), Some("2.5 GHz"));
        assert_eq!(rec.num("geekbench_single"), Some(1042.0));
        assert_eq!(rec.num("geekbench_multi"), Some(3977.0));
        assert_eq!(rec.num("disk_4k_mbps"), Some(120.5));
        assert_eq!(rec.num("disk_4k_iops"), Some(30000.0));
        assert_eq!(rec.num("disk_512k_mbps"), Some(950.0));
    }

    #[test]
    fn yabs_unmatched_labels_are_omitted() {
        let rec = normalize_yabs("nothing of interest here");
        assert!(rec.metrics.is_empty());
    }

    #[test]
    fn normalizers_are_idempotent() {
        let data = json!({ "rtt_avg_ms": 20.0, "packet_loss_percent": 1.0 });
        assert_eq!(normalize_ping(&data), normalize_ping(&data));

        let content = "CPU cores  : 8 @ 3.2 GHz";
        assert_eq!(normalize_yabs(content), normalize_yabs(content));
    }
}
