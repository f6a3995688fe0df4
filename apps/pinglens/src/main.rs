mod config;
mod live;
mod logging;
mod report;

use anyhow::{anyhow, Context, Result};
use chrono::{SecondsFormat, Utc};
use clap::Parser;
use config::{build_config, collect_hosts, wants_qos_help, Cli, Environment};
use live::{
    install_interrupt_handler, CrosstermEvents, Frontend, PlainFrontend, Scheduler, StopFlag,
    SystemPacer, TargetContext, TerminalFrontend,
};
use pinglens_model::qos::QOS_HELP;
use pinglens_model::RunConfig;
use pinglens_probe::{PingSettings, ProbeEngine, SystemPingEngine};
use report::{RunSummary, SUMMARY_VERSION};
use std::io::{self, IsTerminal};
use tracing::{info, warn};

fn main() {
    match run() {
        Ok(status) => std::process::exit(status),
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    if wants_qos_help(&cli) {
        print!("{QOS_HELP}");
        return Ok(0);
    }

    let (config, warnings) = build_config(&cli, Environment::detect())?;
    for warning in &warnings {
        eprintln!("warning: {warning}");
    }

    let tui = !cli.plain && io::stdout().is_terminal();
    logging::init_logging(&cli.log_level, cli.log_file.as_deref(), tui)?;

    let hosts = collect_hosts(&cli)?;
    if hosts.is_empty() {
        return Err(anyhow!("no hosts given; pass HOST arguments or -f FILE"));
    }

    let mut engine = SystemPingEngine::new(PingSettings {
        ttl: config.ttl,
        qos: config.qos,
        timeout_secs: config.timeout_secs,
        family: config.family,
        source: config.source.clone(),
        device: config.device.clone(),
    })
    .context("failed to set up the probe engine")?;

    let mut contexts = Vec::new();
    for host in &hosts {
        match engine.add_target(host) {
            Ok(target) => {
                info!(host = %target.name, address = %target.address, "target added");
                contexts.push(TargetContext::new(contexts.len(), target, config.interval_secs));
            }
            Err(err) => {
                eprintln!("warning: skipping {host}: {err}");
                warn!(%host, error = %err, "target rejected");
            }
        }
    }
    if contexts.is_empty() {
        return Err(anyhow!("no usable hosts"));
    }

    let stop = StopFlag::default();
    install_interrupt_handler(&stop)?;

    let started_at_utc = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let rounds = if tui {
        let size = crossterm::terminal::size().context("failed to read terminal size")?;
        let frontend = TerminalFrontend::new(
            io::stdout(),
            CrosstermEvents::spawn(stop.clone()).context("failed to set up terminal input")?,
            &config,
            contexts.len(),
            size,
            stop.clone(),
        );
        drive(&config, engine, frontend, stop, &mut contexts)?
    } else {
        let frontend = PlainFrontend::new(io::stdout(), config.qos, engine.payload_len());
        drive(&config, engine, frontend, stop, &mut contexts)?
    };
    let finished_at_utc = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

    report::print_report(&mut io::stdout().lock(), &contexts, config.percentile)?;

    if let Some(path) = &cli.summary_json {
        let summary = RunSummary {
            version: SUMMARY_VERSION,
            started_at_utc,
            finished_at_utc,
            rounds,
            interval_secs: config.interval_secs,
            percentile: config.percentile,
            exit_threshold: config.exit_threshold,
            targets: contexts
                .iter()
                .map(|ctx| ctx.summary(config.percentile))
                .collect(),
        };
        report::write_json(path, &summary)?;
        info!(path = ?path, "run summary written");
    }

    let failures = report::failure_count(&contexts, config.exit_threshold);
    Ok(report::exit_status(failures))
}

fn drive<E: ProbeEngine, F: Frontend>(
    config: &RunConfig,
    engine: E,
    frontend: F,
    stop: StopFlag,
    contexts: &mut [TargetContext],
) -> Result<u64> {
    let mut scheduler = Scheduler::new(config, engine, frontend, SystemPacer, stop);
    scheduler.run(contexts)?;
    Ok(scheduler.state().rounds_completed)
}
