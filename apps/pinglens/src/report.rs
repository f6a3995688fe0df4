use crate::live::TargetContext;
use anyhow::{anyhow, Result};
use pinglens_model::TargetSummary;
use pinglens_render::{format_rtt_line, format_stats_line};
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

pub const SUMMARY_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub version: u32,
    pub started_at_utc: String,
    pub finished_at_utc: String,
    pub rounds: u64,
    pub interval_secs: f64,
    pub percentile: f64,
    pub exit_threshold: f64,
    pub targets: Vec<TargetSummary>,
}

/// Per-target statistics block, in registration order.
pub fn print_report<W: Write>(out: &mut W, contexts: &[TargetContext], percentile: f64) -> io::Result<()> {
    for ctx in contexts {
        let stats = &ctx.stats;
        writeln!(out)?;
        writeln!(out, "--- {} ping statistics ---", ctx.host)?;
        writeln!(
            out,
            "{}",
            format_stats_line(
                stats.sent(),
                stats.received(),
                stats.packet_loss_pct(),
                stats.latency_total()
            )
        )?;
        if stats.received() > 0 {
            if let Some(rtt) = stats.rtt_summary(percentile) {
                writeln!(out, "{}", format_rtt_line(&rtt))?;
            }
        }
    }
    out.flush()
}

pub fn failure_count(contexts: &[TargetContext], threshold: f64) -> usize {
    contexts
        .iter()
        .filter(|ctx| ctx.exceeds_failure_threshold(threshold))
        .count()
}

pub fn exit_status(failures: usize) -> i32 {
    failures.min(255) as i32
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_vec_pretty(value)?;
    atomic_write(path, &json)
}

fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent)
            .map_err(|err| anyhow!("failed to create output directory {:?}: {}", parent, err))?;
    }

    let tmp_path = temp_path(path);
    let mut file = fs::File::create(&tmp_path)
        .map_err(|err| anyhow!("failed to create temp file {:?}: {}", tmp_path, err))?;
    file.write_all(data)
        .map_err(|err| anyhow!("failed to write temp file {:?}: {}", tmp_path, err))?;
    file.sync_all()
        .map_err(|err| anyhow!("failed to sync temp file {:?}: {}", tmp_path, err))?;

    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(anyhow!("failed to replace summary {:?}: {}", path, err));
    }

    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("summary");
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    parent.join(format!(".{}.part-{}-{}", file_name, std::process::id(), stamp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinglens_probe::TargetInfo;

    fn context(index: usize, host: &str, latencies: &[Option<f64>]) -> TargetContext {
        let mut ctx = TargetContext::new(
            index,
            TargetInfo {
                name: host.to_string(),
                address: format!("192.0.2.{}", index + 1),
            },
            1.0,
        );
        for latency in latencies {
            ctx.stats.observe(*latency);
        }
        ctx
    }

    #[test]
    fn report_lists_targets_in_order() {
        let contexts = vec![
            context(0, "a.example", &[Some(10.0), Some(20.0)]),
            context(1, "b.example", &[None, None]),
        ];
        let mut out = Vec::new();
        print_report(&mut out, &contexts, 50.0).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "",
                "--- a.example ping statistics ---",
                "2 packets transmitted, 2 received, 0.00% packet loss, time 30.0ms",
                "rtt min/avg/50%/max/sdev = 10.000/15.000/11/20.000/7.071 ms",
                "",
                "--- b.example ping statistics ---",
                "2 packets transmitted, 0 received, 100.00% packet loss, time 0.0ms",
            ]
        );
    }

    #[test]
    fn exit_status_counts_failing_targets() {
        let contexts = vec![
            context(0, "a.example", &[Some(1.0), None]),
            context(1, "b.example", &[None, None]),
            context(2, "c.example", &[Some(1.0), Some(1.0)]),
        ];
        assert_eq!(failure_count(&contexts, 0.0), 2);
        assert_eq!(failure_count(&contexts, 0.5), 1);
        assert_eq!(failure_count(&contexts, 1.0), 0);
        assert_eq!(exit_status(3), 3);
        assert_eq!(exit_status(1000), 255);
    }

    #[test]
    fn summary_is_written_atomically() {
        let dir = std::env::temp_dir().join(format!("pinglens-report-{}", std::process::id()));
        let path = dir.join("nested").join("summary.json");
        let summary = RunSummary {
            version: SUMMARY_VERSION,
            started_at_utc: "2026-01-01T00:00:00Z".to_string(),
            finished_at_utc: "2026-01-01T00:00:05Z".to_string(),
            rounds: 5,
            interval_secs: 1.0,
            percentile: 95.0,
            exit_threshold: 1.0,
            targets: vec![context(0, "a.example", &[Some(4.0)]).summary(95.0)],
        };

        write_json(&path, &summary).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(value["rounds"], 5);
        assert_eq!(value["targets"][0]["host"], "a.example");
        assert_eq!(value["targets"][0]["rtt"]["percentile_ms"], 5.0);
        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().contains(".part-"))
            .collect();
        assert!(leftovers.is_empty());
        let _ = fs::remove_dir_all(&dir);
    }
}
