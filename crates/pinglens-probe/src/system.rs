use crate::engine::{ProbeEngine, ProbeError, ProbeReply, RoundError, TargetInfo};
use crate::parser::parse_ping_output;
use pinglens_model::AddressFamily;
use std::io;
use std::net::{IpAddr, ToSocketAddrs};
use std::process::Command;
use std::thread;
use tracing::{debug, warn};

pub const DEFAULT_PAYLOAD_LEN: usize = 56;

#[derive(Debug, Clone)]
pub struct PingSettings {
    pub ttl: u8,
    pub qos: u8,
    pub timeout_secs: f64,
    pub family: AddressFamily,
    pub source: Option<String>,
    pub device: Option<String>,
}

impl Default for PingSettings {
    fn default() -> Self {
        Self {
            ttl: 64,
            qos: 0,
            timeout_secs: 1.0,
            family: AddressFamily::Any,
            source: None,
            device: None,
        }
    }
}

#[derive(Debug, Clone)]
struct PingTarget {
    name: String,
    address: IpAddr,
    sequence: u32,
}

/// Probe engine that runs the platform `ping` once per target per round.
pub struct SystemPingEngine {
    program: String,
    settings: PingSettings,
    targets: Vec<PingTarget>,
    replies: Vec<ProbeReply>,
}

impl SystemPingEngine {
    pub fn new(settings: PingSettings) -> Result<Self, ProbeError> {
        Self::with_program("ping", settings)
    }

    pub fn with_program(program: &str, settings: PingSettings) -> Result<Self, ProbeError> {
        if !(settings.timeout_secs.is_finite() && settings.timeout_secs > 0.0) {
            return Err(ProbeError::Setup(format!(
                "timeout must be positive, got {}",
                settings.timeout_secs
            )));
        }
        if settings.ttl == 0 {
            return Err(ProbeError::Setup("ttl must be between 1 and 255".to_string()));
        }
        if settings.source.is_some() && settings.device.is_some() {
            warn!("both source address and device given; the device takes precedence");
        }

        Ok(Self {
            program: program.to_string(),
            settings,
            targets: Vec::new(),
            replies: Vec::new(),
        })
    }

    fn ping_args(&self, address: IpAddr) -> Vec<String> {
        let timeout_ms = (self.settings.timeout_secs * 1000.0).ceil() as u64;
        let timeout_secs = ((timeout_ms + 999) / 1000).max(1);

        let mut args = vec![
            "-n".to_string(),
            "-c".to_string(),
            "1".to_string(),
            "-W".to_string(),
            timeout_secs.to_string(),
            "-t".to_string(),
            self.settings.ttl.to_string(),
        ];
        if self.settings.qos != 0 {
            args.push("-Q".to_string());
            args.push(self.settings.qos.to_string());
        }
        if address.is_ipv6() {
            args.push("-6".to_string());
        }
        if let Some(iface) = self.settings.device.as_ref().or(self.settings.source.as_ref()) {
            args.push("-I".to_string());
            args.push(iface.clone());
        }
        args.push(address.to_string());
        args
    }
}

impl ProbeEngine for SystemPingEngine {
    fn add_target(&mut self, name: &str) -> Result<TargetInfo, ProbeError> {
        if self.targets.iter().any(|target| target.name == name) {
            return Err(ProbeError::Duplicate {
                host: name.to_string(),
            });
        }

        let address = resolve(name, self.settings.family)?;
        debug!(host = name, %address, "registered target");

        self.targets.push(PingTarget {
            name: name.to_string(),
            address,
            sequence: 0,
        });
        self.replies.push(ProbeReply {
            hostname: name.to_string(),
            address: address.to_string(),
            latency_ms: None,
            sequence: 0,
            ttl: None,
            qos: self.settings.qos,
            payload_len: DEFAULT_PAYLOAD_LEN,
        });

        Ok(TargetInfo {
            name: name.to_string(),
            address: address.to_string(),
        })
    }

    fn issue_round(&mut self) -> Result<(), RoundError> {
        let jobs: Vec<Vec<String>> = self
            .targets
            .iter()
            .map(|target| self.ping_args(target.address))
            .collect();
        let program = self.program.as_str();

        let outputs: Vec<io::Result<String>> = thread::scope(|scope| {
            let handles: Vec<_> = jobs
                .iter()
                .map(|args| scope.spawn(move || run_ping(program, args)))
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|_| Err(io::Error::other("probe thread panicked")))
                })
                .collect()
        });

        for output in &outputs {
            if let Err(err) = output {
                match err.kind() {
                    io::ErrorKind::Interrupted => {
                        return Err(RoundError::Retryable(err.to_string()));
                    }
                    io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
                        return Err(RoundError::Fatal(format!(
                            "cannot run {}: {err}",
                            self.program
                        )));
                    }
                    _ => {}
                }
            }
        }

        for (index, output) in outputs.into_iter().enumerate() {
            let target = &mut self.targets[index];
            target.sequence = target.sequence.wrapping_add(1);

            let reply_line = match output {
                Ok(text) => parse_ping_output(&text).replies.into_iter().next(),
                Err(err) => {
                    warn!(host = %target.name, "probe failed: {err}");
                    None
                }
            };

            let reply = &mut self.replies[index];
            reply.sequence = target.sequence;
            // `ping` does not report the received TOS byte.
            reply.qos = self.settings.qos;
            match reply_line {
                Some(line) => {
                    reply.latency_ms = Some(line.latency_ms);
                    reply.ttl = line.ttl;
                    reply.payload_len = line.payload_len;
                }
                None => {
                    reply.latency_ms = None;
                    reply.ttl = None;
                }
            }
        }

        Ok(())
    }

    fn replies(&self) -> &[ProbeReply] {
        &self.replies
    }

    fn payload_len(&self) -> usize {
        DEFAULT_PAYLOAD_LEN
    }
}

fn run_ping(program: &str, args: &[String]) -> io::Result<String> {
    let output = Command::new(program).args(args).output()?;
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

fn resolve(name: &str, family: AddressFamily) -> Result<IpAddr, ProbeError> {
    let candidates: Vec<IpAddr> = match name.parse::<IpAddr>() {
        Ok(address) => vec![address],
        Err(_) => (name, 0)
            .to_socket_addrs()
            .map_err(|source| ProbeError::Resolve {
                host: name.to_string(),
                source,
            })?
            .map(|addr| addr.ip())
            .collect(),
    };

    candidates
        .into_iter()
        .find(|address| match family {
            AddressFamily::Any => true,
            AddressFamily::V4 => address.is_ipv4(),
            AddressFamily::V6 => address.is_ipv6(),
        })
        .ok_or_else(|| ProbeError::NoAddress {
            host: name.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_addresses_respect_family() {
        assert_eq!(
            resolve("127.0.0.1", AddressFamily::Any).unwrap(),
            "127.0.0.1".parse::<IpAddr>().unwrap()
        );
        assert!(matches!(
            resolve("127.0.0.1", AddressFamily::V6),
            Err(ProbeError::NoAddress { .. })
        ));
        assert!(resolve("::1", AddressFamily::V6).unwrap().is_ipv6());
    }

    #[test]
    fn args_carry_ttl_qos_and_interface() {
        let engine = SystemPingEngine::new(PingSettings {
            ttl: 12,
            qos: 0xb8,
            timeout_secs: 0.2,
            device: Some("eth0".to_string()),
            ..PingSettings::default()
        })
        .unwrap();
        let args = engine.ping_args("192.0.2.9".parse().unwrap());
        assert_eq!(
            args,
            vec!["-n", "-c", "1", "-W", "1", "-t", "12", "-Q", "184", "-I", "eth0", "192.0.2.9"]
        );

        let v6 = engine.ping_args("2001:db8::1".parse().unwrap());
        assert!(v6.contains(&"-6".to_string()));
    }
}
