// SPDX-License-Identifier: MIT

use super::*;
use serial_test::serial;
use std::env;

fn clear_env() {
    for var in [
        "CLANKERS_DATA_PATH",
        "CLANKERS_DB_PATH",
        "CLANKERS_SOCKET_PATH",
        "CLANKERS_LOG_PATH",
    ] {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn data_root_honors_env_override() {
    clear_env();
    env::set_var("CLANKERS_DATA_PATH", "/tmp/clankers-test-root");
    let resolver = PathResolver::new();
    assert_eq!(resolver.data_root().unwrap(), PathBuf::from("/tmp/clankers-test-root"));
    clear_env();
}

#[test]
#[serial]
fn data_dir_appends_clankers() {
    clear_env();
    env::set_var("CLANKERS_DATA_PATH", "/tmp/clankers-test-root");
    let resolver = PathResolver::new();
    assert_eq!(
        resolver.data_dir().unwrap(),
        PathBuf::from("/tmp/clankers-test-root/clankers")
    );
    clear_env();
}

#[test]
#[serial]
fn db_path_defaults_under_data_dir() {
    clear_env();
    env::set_var("CLANKERS_DATA_PATH", "/tmp/clankers-test-root");
    let resolver = PathResolver::new();
    assert_eq!(
        resolver.db_path().unwrap(),
        PathBuf::from("/tmp/clankers-test-root/clankers/clankers.db")
    );
    clear_env();
}

#[test]
#[serial]
fn db_path_honors_explicit_override_even_with_data_path_set() {
    clear_env();
    env::set_var("CLANKERS_DATA_PATH", "/tmp/clankers-test-root");
    env::set_var("CLANKERS_DB_PATH", "/tmp/custom.db");
    let resolver = PathResolver::new();
    assert_eq!(resolver.db_path().unwrap(), PathBuf::from("/tmp/custom.db"));
    clear_env();
}

#[test]
#[serial]
fn socket_path_honors_env_override() {
    clear_env();
    env::set_var("CLANKERS_SOCKET_PATH", "/tmp/custom.sock");
    let resolver = PathResolver::new();
    assert_eq!(resolver.socket_path().unwrap(), PathBuf::from("/tmp/custom.sock"));
    clear_env();
}

#[test]
#[serial]
fn log_dir_defaults_to_data_dir() {
    clear_env();
    env::set_var("CLANKERS_DATA_PATH", "/tmp/clankers-test-root");
    let resolver = PathResolver::new();
    assert_eq!(resolver.log_dir().unwrap(), resolver.data_dir().unwrap());
    clear_env();
}

#[test]
#[serial]
fn log_dir_honors_own_override() {
    clear_env();
    env::set_var("CLANKERS_DATA_PATH", "/tmp/clankers-test-root");
    env::set_var("CLANKERS_LOG_PATH", "/tmp/custom-logs");
    let resolver = PathResolver::new();
    assert_eq!(resolver.log_dir().unwrap(), PathBuf::from("/tmp/custom-logs"));
    clear_env();
}

#[test]
#[serial]
fn config_path_sits_beside_the_database() {
    clear_env();
    env::set_var("CLANKERS_DATA_PATH", "/tmp/clankers-test-root");
    let resolver = PathResolver::new();
    assert_eq!(
        resolver.config_path().unwrap(),
        PathBuf::from("/tmp/clankers-test-root/clankers/clankers.json")
    );
    clear_env();
}
