use anyhow::{anyhow, Context, Result};
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Sets up diagnostics. With the full-screen UI active and no log file,
/// nothing is installed: stderr shares the screen.
pub fn init_logging(level: &str, log_file: Option<&Path>, tui: bool) -> Result<()> {
    // Base level from the command line, still overridable via RUST_LOG.
    let default = format!("{level},pinglens={level}");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let installed = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {:?}", path))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_target(true)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None if tui => return Ok(()),
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(io::stderr)
            .try_init(),
    };

    installed.map_err(|err| anyhow!("failed to initialise logging: {err}"))
}
