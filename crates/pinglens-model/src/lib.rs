//! Shared data structures for pinglens.

pub mod qos;

pub use qos::{format_qos, parse_qos, QosError};

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One probe outcome for one target in one round.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub target_index: usize,
    pub latency_ms: Option<f64>,
    pub sequence: u32,
    pub ttl: Option<u8>,
    pub qos: u8,
    pub payload_len: usize,
}

impl Sample {
    pub fn is_timeout(&self) -> bool {
        self.latency_ms.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundLimit {
    Count(u64),
    Unbounded,
}

impl RoundLimit {
    pub fn is_last(&self) -> bool {
        matches!(self, RoundLimit::Count(1))
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, RoundLimit::Count(0))
    }

    pub fn decrement(&mut self) {
        if let RoundLimit::Count(n) = self {
            *n = n.saturating_sub(1);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GraphMode {
    #[default]
    Sparkline,
    Boxplot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressFamily {
    #[default]
    Any,
    V4,
    V6,
}

/// What the terminal can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermCaps {
    pub color: bool,
    pub unicode: bool,
}

/// Immutable settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub interval_secs: f64,
    pub timeout_secs: f64,
    pub rounds: RoundLimit,
    pub percentile: f64,
    pub exit_threshold: f64,
    pub family: AddressFamily,
    pub source: Option<String>,
    pub device: Option<String>,
    pub ttl: u8,
    pub qos: u8,
    pub graph: GraphMode,
    pub caps: TermCaps,
}

impl RunConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(self.interval_secs)
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            interval_secs: 1.0,
            timeout_secs: 1.0,
            rounds: RoundLimit::Unbounded,
            percentile: 95.0,
            exit_threshold: 1.0,
            family: AddressFamily::Any,
            source: None,
            device: None,
            ttl: 64,
            qos: 0,
            graph: GraphMode::Sparkline,
            caps: TermCaps {
                color: false,
                unicode: false,
            },
        }
    }
}

/// A derived statistic that may not exist yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stat {
    NotYetMeasured,
    Value(f64),
    Invalid,
}

impl Stat {
    pub fn value(&self) -> Option<f64> {
        match self {
            Stat::Value(v) => Some(*v),
            _ => None,
        }
    }

    /// Legacy numeric encoding: `-0.0` for no data, `-1.0` for invalid.
    pub fn to_sentinel(&self) -> f64 {
        match self {
            Stat::NotYetMeasured => -0.0,
            Stat::Value(v) => *v,
            Stat::Invalid => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RttSummary {
    pub min_ms: f64,
    pub avg_ms: f64,
    pub percentile: f64,
    pub percentile_ms: f64,
    pub max_ms: f64,
    pub stddev_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSummary {
    pub host: String,
    pub address: String,
    pub sent: u32,
    pub received: u32,
    pub loss_pct: f64,
    pub latency_total_ms: f64,
    pub rtt: Option<RttSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_limit_counts_down_to_exhaustion() {
        let mut limit = RoundLimit::Count(2);
        assert!(!limit.is_last());
        limit.decrement();
        assert!(limit.is_last());
        limit.decrement();
        assert!(limit.is_exhausted());
        limit.decrement();
        assert_eq!(limit, RoundLimit::Count(0));

        let mut forever = RoundLimit::Unbounded;
        forever.decrement();
        assert!(!forever.is_last() && !forever.is_exhausted());
    }

    #[test]
    fn sentinels_keep_negative_zero() {
        let none = Stat::NotYetMeasured.to_sentinel();
        assert_eq!(none, 0.0);
        assert!(none.is_sign_negative());
        assert_eq!(Stat::Invalid.to_sentinel(), -1.0);
        assert_eq!(Stat::Value(2.5).to_sentinel(), 2.5);
    }

    #[test]
    fn target_summary_serializes_missing_rtt_as_null() {
        let summary = TargetSummary {
            host: "example.net".to_string(),
            address: "192.0.2.7".to_string(),
            sent: 5,
            received: 0,
            loss_pct: 100.0,
            latency_total_ms: 0.0,
            rtt: None,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["rtt"], serde_json::Value::Null);
        assert_eq!(json["sent"], 5);
    }
}
