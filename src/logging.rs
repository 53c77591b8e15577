//! File logging for the `weave` binary.
//!
//! The editor owns the terminal, so diagnostics never go to stdout or
//! stderr. The library only emits `tracing` events; installing a
//! subscriber is left to the binary.

use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

use crate::config::ShellConfig;

/// Install a global subscriber writing to `config.log_file`.
///
/// Returns `Ok(false)` without doing anything when no filter is configured.
pub fn init(config: &ShellConfig) -> Result<bool> {
    let Some(directives) = config.log_filter.as_deref() else {
        return Ok(false);
    };
    let filter = EnvFilter::try_new(directives)
        .with_context(|| format!("invalid log filter `{directives}`"))?;

    let path = &config.log_file;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("failed to install log subscriber: {e}"))?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "logging started");
    Ok(true)
}
