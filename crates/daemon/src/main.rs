// SPDX-License-Identifier: MIT

//! `clankersd`: the Clankers daemon binary. Parses a handful of flags,
//! starts the daemon, and runs until SIGINT/SIGTERM (or Ctrl-C on Windows).

use clankers_core::LogLevel;
use clankers_daemon::{Config, ConfigOverrides, Daemon};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let overrides = parse_args(std::env::args().skip(1))?;
    let config = Config::resolve(overrides)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(config))
}

async fn run(config: Config) -> anyhow::Result<()> {
    let daemon = Daemon::start(config).await?;
    let cancel = daemon.cancellation_token();

    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = wait_for_shutdown_signal().await {
            tracing::warn!("failed to install signal handler: {e}");
            return;
        }
        signal_cancel.cancel();
    });

    tracing::info!("clankersd listening");
    daemon.run().await?;
    daemon.shutdown();
    Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    tokio::select! {
        _ = sigterm.recv() => {}
        _ = sigint.recv() => {}
    }
    Ok(())
}

#[cfg(windows)]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

fn parse_args(args: impl Iterator<Item = String>) -> anyhow::Result<ConfigOverrides> {
    let mut overrides = ConfigOverrides::default();
    let mut args = args.peekable();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--socket" => overrides.socket = Some(next_value(&mut args, "--socket")?.into()),
            "--data-root" => overrides.data_root = Some(next_value(&mut args, "--data-root")?.into()),
            "--db-path" => overrides.db_path = Some(next_value(&mut args, "--db-path")?.into()),
            "--log-level" => {
                let value = next_value(&mut args, "--log-level")?;
                overrides.log_level =
                    Some(value.parse::<LogLevel>().map_err(|e| anyhow::anyhow!(e))?);
            }
            other => anyhow::bail!("unrecognized argument: {other}"),
        }
    }
    Ok(overrides)
}

fn next_value(
    args: &mut std::iter::Peekable<impl Iterator<Item = String>>,
    flag: &str,
) -> anyhow::Result<String> {
    args.next().ok_or_else(|| anyhow::anyhow!("{flag} requires a value"))
}
