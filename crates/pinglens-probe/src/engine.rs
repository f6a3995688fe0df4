use pinglens_model::Sample;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid probe setting: {0}")]
    Setup(String),
    #[error("failed to resolve {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: io::Error,
    },
    #[error("no usable address for {host}")]
    NoAddress { host: String },
    #[error("{host} is already registered")]
    Duplicate { host: String },
}

#[derive(Debug, Error)]
pub enum RoundError {
    /// The round was cut short and may simply be issued again.
    #[error("probe round interrupted: {0}")]
    Retryable(String),
    #[error("probe round failed: {0}")]
    Fatal(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetInfo {
    pub name: String,
    pub address: String,
}

/// Latest outcome for one registered target.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeReply {
    pub hostname: String,
    pub address: String,
    pub latency_ms: Option<f64>,
    pub sequence: u32,
    pub ttl: Option<u8>,
    pub qos: u8,
    pub payload_len: usize,
}

impl ProbeReply {
    pub fn to_sample(&self, target_index: usize) -> Sample {
        Sample {
            target_index,
            latency_ms: self.latency_ms,
            sequence: self.sequence,
            ttl: self.ttl,
            qos: self.qos,
            payload_len: self.payload_len,
        }
    }
}

/// Sends one echo probe per registered target per round.
///
/// `replies` lists targets in registration order and reflects the most
/// recent round.
pub trait ProbeEngine {
    fn add_target(&mut self, name: &str) -> Result<TargetInfo, ProbeError>;
    fn issue_round(&mut self) -> Result<(), RoundError>;
    fn replies(&self) -> &[ProbeReply];
    fn payload_len(&self) -> usize;
}
