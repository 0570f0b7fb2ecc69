// SPDX-License-Identifier: MIT

use tempfile::tempdir;

use super::*;

fn test_config(dir: &std::path::Path) -> Config {
    Config {
        data_dir: dir.to_path_buf(),
        db_path: dir.join("clankers.db"),
        socket_path: dir.join("clankers.sock"),
        lock_path: dir.join("clankers.lock"),
        log_dir: dir.join("logs"),
        log_level: LogLevel::Debug,
    }
}

#[tokio::test]
async fn start_creates_the_data_dir_and_database() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    let daemon = Daemon::start(config.clone()).await.unwrap();
    assert!(config.db_path.exists());
    assert!(config.lock_path.exists());
    daemon.shutdown();
}

#[tokio::test]
async fn a_second_start_against_the_same_lock_path_fails() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    let daemon = Daemon::start(config.clone()).await.unwrap();
    let second = Daemon::start(config).await;
    assert!(matches!(second, Err(LifecycleError::LockFailed(_))));
    daemon.shutdown();
}

#[tokio::test]
async fn shutdown_removes_the_lock_file() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    let daemon = Daemon::start(config.clone()).await.unwrap();
    daemon.shutdown();
    assert!(!config.lock_path.exists());
}

#[test]
fn resolve_honors_explicit_overrides_over_env_defaults() {
    let dir = tempdir().unwrap();
    let overrides = ConfigOverrides {
        socket: Some(dir.path().join("custom.sock")),
        data_root: Some(dir.path().to_path_buf()),
        db_path: Some(dir.path().join("custom.db")),
        log_level: Some(LogLevel::Warn),
    };
    let config = Config::resolve(overrides).unwrap();
    assert_eq!(config.socket_path, dir.path().join("custom.sock"));
    assert_eq!(config.db_path, dir.path().join("custom.db"));
    assert_eq!(config.log_level, LogLevel::Warn);
}
