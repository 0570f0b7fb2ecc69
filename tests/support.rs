// SPDX-License-Identifier: MIT

//! Shared scaffolding for the specs under `tests/specs/`: spawns a real
//! `clankersd` against a fresh temp directory and speaks JSON-RPC to it,
//! matching how a harness adapter or the CLI talks to a running daemon.

use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use std::time::{Duration, Instant};

use clankers_client::RpcClient;

/// A `clankersd` child process bound to one temp directory. Killed on drop.
pub struct DaemonHandle {
    child: Child,
    #[allow(dead_code)] // kept so the temp dir's contents stay inspectable mid-test
    pub data_root: PathBuf,
    pub socket_path: PathBuf,
    pub db_path: PathBuf,
}

impl DaemonHandle {
    pub fn rpc_client(&self) -> RpcClient {
        RpcClient::new(self.socket_path.clone(), "clankers-specs", env!("CARGO_PKG_VERSION"))
    }
}

impl Drop for DaemonHandle {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Spawns `clankersd` rooted under `root` and blocks until its socket file
/// appears (or panics after a generous timeout — a hung daemon means the
/// test itself is broken, not a condition to assert about).
pub fn spawn_daemon(root: &Path) -> DaemonHandle {
    let data_root = root.join("data");
    let socket_path = root.join("clankers.sock");
    let db_path = root.join("clankers.db");
    std::fs::create_dir_all(&data_root).expect("create data root");

    let child = Command::new(clankersd_binary())
        .arg("--data-root")
        .arg(&data_root)
        .arg("--socket")
        .arg(&socket_path)
        .arg("--db-path")
        .arg(&db_path)
        .env("RUST_LOG", "error")
        .spawn()
        .expect("spawn clankersd");

    let handle = DaemonHandle { child, data_root, socket_path: socket_path.clone(), db_path };
    let ready = wait_for(Duration::from_secs(5), || socket_path.exists());
    assert!(ready, "clankersd did not create its socket in time");
    handle
}

pub fn clankersd_binary() -> PathBuf {
    assert_cmd::cargo::cargo_bin("clankersd")
}

pub fn clankers_cli() -> assert_cmd::Command {
    assert_cmd::Command::cargo_bin("clankers").expect("locate clankers binary")
}

/// Polls `condition` every 20ms until it returns `true` or `timeout` elapses.
pub fn wait_for(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    loop {
        if condition() {
            return true;
        }
        if start.elapsed() >= timeout {
            return false;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
}
