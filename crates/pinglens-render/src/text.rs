use crate::log::LogLine;
use crate::surface::Style;
use crossterm::style::Color;
use pinglens_model::{format_qos, RttSummary, Sample, Stat};

pub fn format_stats_line(sent: u32, received: u32, loss_pct: f64, latency_total_ms: f64) -> String {
    format!(
        "{sent} packets transmitted, {received} received, {loss_pct:.2}% packet loss, time {latency_total_ms:.1}ms"
    )
}

pub fn format_rtt_line(rtt: &RttSummary) -> String {
    format!(
        "rtt min/avg/{:.0}%/max/sdev = {:.3}/{:.3}/{:.0}/{:.3}/{:.3} ms",
        rtt.percentile, rtt.min_ms, rtt.avg_ms, rtt.percentile_ms, rtt.max_ms, rtt.stddev_ms
    )
}

/// 0 within one standard deviation of the average, 1 within two, 2 beyond.
pub fn deviation_tier(latency_ms: f64, average: Stat, stddev: Stat) -> usize {
    let (Some(avg), Some(dev)) = (average.value(), stddev.value()) else {
        return 0;
    };
    if latency_ms < avg - 2.0 * dev || latency_ms > avg + 2.0 * dev {
        2
    } else if latency_ms < avg - dev || latency_ms > avg + dev {
        1
    } else {
        0
    }
}

/// `64 bytes from host (addr): icmp_seq=1 ttl=57 time=12.30 ms`
pub fn reply_line(
    host: &str,
    address: &str,
    sample: &Sample,
    show_qos: bool,
    time_color: Option<Color>,
) -> LogLine {
    let ttl = sample
        .ttl
        .map(|ttl| ttl.to_string())
        .unwrap_or_else(|| "-1".to_string());
    let mut head = format!(
        "{} bytes from {} ({}): icmp_seq={} ttl={} ",
        sample.payload_len, host, address, sample.sequence, ttl
    );
    if show_qos {
        head.push_str(&format!("qos={} ", format_qos(sample.qos)));
    }
    head.push_str("time=");

    let latency_ms = sample.latency_ms.unwrap_or(f64::NAN);
    let time_style = time_color.map(Style::fg).unwrap_or(Style::PLAIN);
    LogLine::new()
        .push(head, Style::PLAIN)
        .push(format!("{latency_ms:.2}"), time_style)
        .push(" ms", Style::PLAIN)
}

pub fn timeout_line(host: &str, address: &str, sample: &Sample, color: bool) -> LogLine {
    let style = if color {
        Style::fg(Color::Red).with_bold()
    } else {
        Style::PLAIN
    };
    LogLine::new()
        .push(
            format!("echo reply from {host} ({address}): icmp_seq={} ", sample.sequence),
            Style::PLAIN,
        )
        .push("timeout", style)
}
