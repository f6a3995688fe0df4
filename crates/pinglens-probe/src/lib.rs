//! Echo probe collection: the engine interface and a `ping`-backed implementation.

pub mod engine;
pub mod parser;
pub mod system;

pub use engine::{ProbeEngine, ProbeError, ProbeReply, RoundError, TargetInfo};
pub use parser::{parse_ping_output, parse_reply_line, ParsedPing, ReplyLine};
pub use system::{PingSettings, SystemPingEngine, DEFAULT_PAYLOAD_LEN};
