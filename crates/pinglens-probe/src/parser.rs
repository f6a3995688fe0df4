use anyhow::{anyhow, Result};

const ICMP_HEADER_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct ReplyLine {
    pub from: String,
    pub payload_len: usize,
    pub sequence: Option<u32>,
    pub ttl: Option<u8>,
    pub latency_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedPing {
    pub host: Option<String>,
    pub address: Option<String>,
    pub payload_len: Option<usize>,
    pub replies: Vec<ReplyLine>,
}

pub fn parse_ping_output(text: &str) -> ParsedPing {
    let mut parsed = ParsedPing::default();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with("PING ") {
            parse_header(line, &mut parsed);
            continue;
        }

        if line.contains(" bytes from ") {
            if let Ok(reply) = parse_reply_line(line) {
                parsed.replies.push(reply);
            }
        }
    }

    parsed
}

fn parse_header(line: &str, parsed: &mut ParsedPing) {
    let rest = &line["PING ".len()..];
    let host_end = rest
        .find(|c: char| c.is_whitespace() || c == '(')
        .unwrap_or(rest.len());
    let host = rest[..host_end].trim();
    if !host.is_empty() {
        parsed.host = Some(host.to_string());
    }

    let mut after_addr = rest;
    if let Some(start) = rest.find('(') {
        if let Some(len) = rest[start + 1..].find(')') {
            let inside = rest[start + 1..start + 1 + len].trim();
            if !inside.is_empty() {
                parsed.address = Some(inside.to_string());
            }
            after_addr = &rest[start + 1 + len + 1..];
        }
    }

    parsed.payload_len = after_addr
        .split(|c: char| c.is_whitespace() || c == ':')
        .find(|token| token.starts_with(|c: char| c.is_ascii_digit()))
        .and_then(leading_number);
}

/// Parses `64 bytes from 192.0.2.1: icmp_seq=1 ttl=57 time=12.3 ms` and the
/// common variants (`seq=`, `time=12.3ms`, `from name (addr):`).
pub fn parse_reply_line(line: &str) -> Result<ReplyLine> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 4 || tokens[1] != "bytes" || tokens[2] != "from" {
        return Err(anyhow!("not a reply line: {line}"));
    }

    let bytes: usize = tokens[0]
        .parse()
        .map_err(|_| anyhow!("invalid byte count: {}", tokens[0]))?;

    let mut from = tokens[3].trim_end_matches(':').to_string();
    let mut i = 4;
    if let Some(next) = tokens.get(4) {
        if next.starts_with('(') {
            from = next
                .trim_start_matches('(')
                .trim_end_matches(':')
                .trim_end_matches(')')
                .to_string();
            i = 5;
        }
    }

    let mut sequence = None;
    let mut ttl = None;
    let mut latency_ms = None;

    while i < tokens.len() {
        let token = tokens[i];
        if let Some((key, value)) = token.split_once('=') {
            match key {
                "icmp_seq" | "seq" => sequence = value.parse().ok(),
                "ttl" | "hlim" => ttl = value.parse().ok(),
                "time" => {
                    let value = value.trim_end_matches("ms");
                    latency_ms = value.parse::<f64>().ok();
                }
                _ => {}
            }
        }
        i += 1;
    }

    let latency_ms = latency_ms.ok_or_else(|| anyhow!("missing time in reply: {line}"))?;

    Ok(ReplyLine {
        from,
        payload_len: bytes.saturating_sub(ICMP_HEADER_LEN),
        sequence,
        ttl,
        latency_ms,
    })
}

fn leading_number(token: &str) -> Option<usize> {
    let digits: String = token.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}
