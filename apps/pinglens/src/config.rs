use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use pinglens_model::qos::QOS_HELP;
use pinglens_model::{parse_qos, AddressFamily, GraphMode, RoundLimit, RunConfig, TermCaps};
use std::env;
use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

const DEFAULT_PERCENTILE: f64 = 95.0;
const MIN_INTERVAL_SECS: f64 = 0.001;

#[derive(Parser, Debug)]
#[command(
    name = "pinglens",
    version,
    about = "Live ICMP latency monitor with per-target graphs. Only probe hosts you are allowed to test."
)]
pub struct Cli {
    #[arg(value_name = "HOST")]
    pub hosts: Vec<String>,

    /// Resolve and probe IPv4 addresses only
    #[arg(short = '4', conflicts_with = "ipv6")]
    pub ipv4: bool,

    /// Resolve and probe IPv6 addresses only
    #[arg(short = '6')]
    pub ipv6: bool,

    /// Number of rounds to send
    #[arg(short = 'c', value_name = "COUNT", allow_hyphen_values = true)]
    pub count: Option<String>,

    /// Seconds between rounds
    #[arg(short = 'i', value_name = "SECONDS", allow_hyphen_values = true)]
    pub interval: Option<String>,

    /// Seconds to wait for each reply (defaults to the interval)
    #[arg(short = 'w', value_name = "SECONDS", allow_hyphen_values = true)]
    pub timeout: Option<String>,

    /// Outgoing time to live
    #[arg(short = 't', value_name = "TTL", allow_hyphen_values = true)]
    pub ttl: Option<String>,

    /// Outgoing QoS byte; `-Q help` lists the accepted names
    #[arg(short = 'Q', value_name = "QOS")]
    pub qos: Option<String>,

    /// Source address
    #[arg(short = 'I', value_name = "ADDR")]
    pub source: Option<String>,

    /// Outgoing network device
    #[arg(short = 'D', value_name = "DEVICE")]
    pub device: Option<String>,

    /// Read hosts from FILE, `-` for stdin
    #[arg(short = 'f', value_name = "FILE")]
    pub file: Option<String>,

    /// Force unicode graphs
    #[arg(short = 'u', conflicts_with = "no_utf8")]
    pub utf8: bool,

    /// Force ASCII graphs
    #[arg(short = 'U')]
    pub no_utf8: bool,

    /// Latency percentile to report
    #[arg(short = 'P', value_name = "PERCENT", allow_hyphen_values = true)]
    pub percentile: Option<String>,

    /// Exit with failure when more than PERCENT of probes to a host failed
    #[arg(short = 'Z', value_name = "PERCENT", allow_hyphen_values = true)]
    pub exit_threshold: Option<String>,

    /// Graph drawn in each panel
    #[arg(short = 'g', long = "graph", value_enum, default_value_t = GraphArg::Sparkline)]
    pub graph: GraphArg,

    /// Print reply lines instead of the full-screen view
    #[arg(long)]
    pub plain: bool,

    /// Disable colors (NO_COLOR is honored too)
    #[arg(long)]
    pub no_color: bool,

    /// Write a JSON run summary to PATH when done
    #[arg(long, value_name = "PATH")]
    pub summary_json: Option<PathBuf>,

    #[arg(long, default_value = "warn")]
    pub log_level: String,

    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GraphArg {
    Sparkline,
    Boxplot,
}

impl From<GraphArg> for GraphMode {
    fn from(arg: GraphArg) -> Self {
        match arg {
            GraphArg::Sparkline => GraphMode::Sparkline,
            GraphArg::Boxplot => GraphMode::Boxplot,
        }
    }
}

/// Terminal capabilities observed in the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Environment {
    pub utf8_locale: bool,
    pub color: bool,
}

impl Environment {
    pub fn detect() -> Self {
        Self {
            utf8_locale: locale_is_utf8(),
            color: env::var_os("NO_COLOR").is_none()
                && crossterm::style::available_color_count() >= 8,
        }
    }
}

fn locale_is_utf8() -> bool {
    for name in ["LC_ALL", "LC_CTYPE", "LANG"] {
        if let Ok(value) = env::var(name) {
            if !value.is_empty() {
                let value = value.to_ascii_lowercase();
                return value.contains("utf-8") || value.contains("utf8");
            }
        }
    }
    false
}

pub fn wants_qos_help(cli: &Cli) -> bool {
    cli.qos
        .as_deref()
        .is_some_and(|qos| qos.trim().eq_ignore_ascii_case("help"))
}

/// Builds the run configuration. Out-of-range values are dropped and
/// reported in the returned warnings; an unknown QoS name is an error.
pub fn build_config(cli: &Cli, environment: Environment) -> Result<(RunConfig, Vec<String>)> {
    let mut config = RunConfig::default();
    let mut warnings = Vec::new();
    let mut percentile: Option<f64> = None;
    let mut count: Option<u64> = None;

    if let Some(raw) = &cli.count {
        match raw.trim().parse::<i64>() {
            Ok(n) if n > 0 => count = Some(n as u64),
            _ => warnings.push(format!("ignoring invalid count: {raw}")),
        }
    }

    if let Some(raw) = &cli.interval {
        match raw.trim().parse::<f64>() {
            Ok(secs) if secs.is_finite() && secs >= MIN_INTERVAL_SECS => config.interval_secs = secs,
            _ => warnings.push(format!("ignoring invalid interval: {raw}")),
        }
    }

    config.timeout_secs = config.interval_secs;
    if let Some(raw) = &cli.timeout {
        match raw.trim().parse::<f64>() {
            Ok(secs) if secs.is_finite() && secs > 0.0 => config.timeout_secs = secs,
            _ => warnings.push(format!("ignoring invalid timeout: {raw}")),
        }
    }

    if let Some(raw) = &cli.ttl {
        match raw.trim().parse::<i64>() {
            Ok(ttl) if (1..=255).contains(&ttl) => config.ttl = ttl as u8,
            _ => warnings.push(format!("ignoring invalid TTL argument: {raw}")),
        }
    }

    if let Some(raw) = &cli.qos {
        config.qos = parse_qos(raw).map_err(|err| anyhow!("{err}\n\n{QOS_HELP}"))?;
    }

    if let Some(raw) = &cli.percentile {
        match raw.trim().parse::<f64>() {
            Ok(p) if (0.1..=100.0).contains(&p) => percentile = Some(p),
            _ => warnings.push(format!("ignoring invalid percentile: {raw}")),
        }
    }

    if let Some(raw) = &cli.exit_threshold {
        match raw.trim().parse::<f64>() {
            Ok(pct) if (0.0..=100.0).contains(&pct) => config.exit_threshold = pct / 100.0,
            _ => warnings.push(format!(
                "ignoring invalid -Z argument: {raw} (expected a number between 0 and 100)"
            )),
        }
    }

    if let Some(n) = count {
        config.rounds = RoundLimit::Count(n);
        if percentile.is_none() && n < 20 {
            percentile = Some(100.0 * (n - 1) as f64 / n as f64);
        }
    }
    config.percentile = percentile
        .filter(|p| *p > 0.0)
        .unwrap_or(DEFAULT_PERCENTILE);

    config.family = if cli.ipv4 {
        AddressFamily::V4
    } else if cli.ipv6 {
        AddressFamily::V6
    } else {
        AddressFamily::Any
    };
    config.source = cli.source.clone();
    config.device = cli.device.clone();
    config.graph = cli.graph.into();
    config.caps = TermCaps {
        unicode: if cli.utf8 {
            true
        } else if cli.no_utf8 {
            false
        } else {
            environment.utf8_locale
        },
        color: environment.color && !cli.no_color,
    };

    Ok((config, warnings))
}

/// One host per line: the first whitespace-separated token, skipping blank
/// lines and `#` comments.
pub fn read_hosts<R: BufRead>(reader: R) -> Result<Vec<String>> {
    let mut hosts = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let Some(token) = line.split_whitespace().next() else {
            continue;
        };
        if token.starts_with('#') {
            continue;
        }
        hosts.push(token.to_string());
    }
    Ok(hosts)
}

pub fn read_hosts_from(source: &str) -> Result<Vec<String>> {
    if source == "-" {
        return read_hosts(io::stdin().lock());
    }
    let file = fs::File::open(source).with_context(|| format!("failed to open host file {:?}", source))?;
    read_hosts(BufReader::new(file))
}

/// Host arguments with the host file's entries first.
pub fn collect_hosts(cli: &Cli) -> Result<Vec<String>> {
    let mut hosts = match &cli.file {
        Some(source) => read_hosts_from(source)?,
        None => Vec::new(),
    };
    hosts.extend(cli.hosts.iter().cloned());
    Ok(hosts)
}
