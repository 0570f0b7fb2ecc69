// SPDX-License-Identifier: MIT

use super::*;
use serial_test::serial;
use tempfile::tempdir;

#[test]
fn default_config_has_a_single_default_profile() {
    let config = Config::default();
    assert_eq!(config.active_profile, "default");
    assert_eq!(config.profile_names(), vec!["default"]);
    let profile = config.active_profile().unwrap();
    assert!(!profile.sync_enabled);
    assert_eq!(profile.sync_interval, 30);
    assert_eq!(profile.auth, "none");
    assert_eq!(profile.endpoint, None);
}

#[test]
fn load_falls_back_to_default_when_file_is_missing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("clankers.json");
    let config = Config::load(&path).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("clankers.json");
    let mut config = Config::default();
    config.set("default", "endpoint", "https://example.test").unwrap();
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.active_profile().unwrap().endpoint.as_deref(), Some("https://example.test"));
}

#[test]
fn set_creates_a_new_profile_implicitly() {
    let mut config = Config::default();
    config.set("work", "sync_interval", "60").unwrap();
    assert!(config.profiles.contains_key("work"));
    assert_eq!(config.profiles["work"].sync_interval, 60);
}

#[test]
fn use_profile_rejects_unknown_names() {
    let mut config = Config::default();
    let err = config.use_profile("ghost").unwrap_err();
    assert!(matches!(err, ConfigError::ProfileNotFound(name) if name == "ghost"));
}

#[test]
fn use_profile_switches_active_profile() {
    let mut config = Config::default();
    config.set("work", "endpoint", "https://work.test").unwrap();
    config.use_profile("work").unwrap();
    assert_eq!(config.active_profile().unwrap().endpoint.as_deref(), Some("https://work.test"));
}

#[test]
#[serial]
fn env_overlay_applies_to_the_active_profile_only_and_is_not_persisted() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("clankers.json");
    let mut config = Config::default();
    config.set("work", "sync_interval", "10").unwrap();
    config.use_profile("work").unwrap();
    config.save(&path).unwrap();

    std::env::set_var("CLANKERS_ENDPOINT", "https://overlay.test");
    std::env::set_var("CLANKERS_SYNC_ENABLED", "true");
    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.active_profile().unwrap().endpoint.as_deref(), Some("https://overlay.test"));
    assert!(loaded.active_profile().unwrap().sync_enabled);
    assert!(loaded.profiles.get("default").unwrap().endpoint.is_none());
    std::env::remove_var("CLANKERS_ENDPOINT");
    std::env::remove_var("CLANKERS_SYNC_ENABLED");

    let on_disk = std::fs::read_to_string(&path).unwrap();
    assert!(!on_disk.contains("overlay.test"), "env overlay must not be persisted");
}

#[test]
fn set_rejects_unknown_keys() {
    let mut config = Config::default();
    let err = config.set("default", "bogus_key", "x").unwrap_err();
    assert!(matches!(err, ConfigError::ProfileNotFound(_)));
}
