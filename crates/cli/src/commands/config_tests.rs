// SPDX-License-Identifier: MIT

use serial_test::serial;
use tempfile::tempdir;

use super::*;

fn with_data_root<T>(f: impl FnOnce() -> T) -> T {
    let dir = tempdir().unwrap();
    std::env::set_var("CLANKERS_DATA_PATH", dir.path());
    let result = f();
    std::env::remove_var("CLANKERS_DATA_PATH");
    result
}

#[test]
#[serial]
fn set_then_get_round_trips_a_value() {
    with_data_root(|| {
        config(ConfigArgs {
            command: ConfigCommand::Set { key: "endpoint".to_string(), value: "https://x".to_string(), profile: None },
            format: OutputFormat::Table,
        })
        .unwrap();

        let path = PathResolver::new().config_path().unwrap();
        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.active_profile().unwrap().endpoint.as_deref(), Some("https://x"));
    });
}

#[test]
#[serial]
fn get_rejects_an_unknown_key() {
    with_data_root(|| {
        let result = config(ConfigArgs { command: ConfigCommand::Get { key: "bogus".to_string() }, format: OutputFormat::Table });
        assert!(result.is_err());
    });
}

#[test]
#[serial]
fn using_an_unknown_profile_is_an_error() {
    with_data_root(|| {
        let result = config(ConfigArgs {
            command: ConfigCommand::Profiles(ProfilesCommand::Use { name: "ghost".to_string() }),
            format: OutputFormat::Table,
        });
        assert!(result.is_err());
    });
}

#[test]
#[serial]
fn setting_a_new_profile_then_switching_to_it_succeeds() {
    with_data_root(|| {
        config(ConfigArgs {
            command: ConfigCommand::Set {
                key: "auth".to_string(),
                value: "token".to_string(),
                profile: Some("work".to_string()),
            },
            format: OutputFormat::Table,
        })
        .unwrap();

        config(ConfigArgs {
            command: ConfigCommand::Profiles(ProfilesCommand::Use { name: "work".to_string() }),
            format: OutputFormat::Table,
        })
        .unwrap();

        let path = PathResolver::new().config_path().unwrap();
        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.active_profile, "work");
    });
}
