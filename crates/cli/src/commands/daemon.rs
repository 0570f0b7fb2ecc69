// SPDX-License-Identifier: MIT

//! `clankers daemon` — runs `clankersd` in the foreground. This subcommand
//! does not itself daemonize or fork; it is the process a service manager
//! supervises.

use std::path::PathBuf;
use std::process::Command;

use anyhow::{anyhow, Result};
use clap::Args;

#[derive(Args)]
pub struct DaemonArgs {
    #[arg(long)]
    pub socket: Option<PathBuf>,
    #[arg(long)]
    pub data_root: Option<PathBuf>,
    #[arg(long)]
    pub db_path: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn daemon(args: DaemonArgs) -> Result<()> {
    let clankersd_path = find_clankersd_binary()?;
    let mut command = Command::new(&clankersd_path);
    if let Some(socket) = &args.socket {
        command.arg("--socket").arg(socket);
    }
    if let Some(data_root) = &args.data_root {
        command.arg("--data-root").arg(data_root);
    }
    if let Some(db_path) = &args.db_path {
        command.arg("--db-path").arg(db_path);
    }
    if let Some(log_level) = &args.log_level {
        command.arg("--log-level").arg(log_level);
    }

    let status = command.status()?;
    if !status.success() {
        return Err(anyhow!("daemon exited with status: {status}"));
    }
    Ok(())
}

/// Looks for `clankersd` next to the running `clankers` binary first, then
/// falls back to a `PATH` lookup, mirroring how a packaged install ships
/// both binaries side by side.
fn find_clankersd_binary() -> Result<PathBuf> {
    let binary_name = if cfg!(windows) { "clankersd.exe" } else { "clankersd" };
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let sibling = dir.join(binary_name);
            if sibling.exists() {
                return Ok(sibling);
            }
        }
    }
    Ok(PathBuf::from(binary_name))
}

#[cfg(test)]
#[path = "daemon_tests.rs"]
mod tests;
