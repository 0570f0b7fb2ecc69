// SPDX-License-Identifier: MIT

//! `clankers`: the operator-facing CLI. Runs the daemon in the foreground,
//! runs ad hoc read-only queries against the database, and edits the
//! profile config file. Talking to a *running* daemon over RPC is the job
//! of `clankers-client`; this binary never opens the transport socket
//! itself.

mod color;
mod commands;
mod output;

use clap::{Parser, Subcommand};

use commands::config::ConfigArgs;
use commands::daemon::DaemonArgs;
use commands::query::QueryArgs;

#[derive(Parser)]
#[command(name = "clankers", version, about = "Clankers local persistence daemon CLI", styles = color::styles())]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the daemon in the foreground.
    Daemon(DaemonArgs),
    /// Run a read-only SQL query against the database.
    Query(QueryArgs),
    /// Get/set/list profile configuration.
    Config(ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Daemon(args) => commands::daemon::daemon(args),
        Command::Query(args) => commands::query::query(args),
        Command::Config(args) => commands::config::config(args),
    }
}
