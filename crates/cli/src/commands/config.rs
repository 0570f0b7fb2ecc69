// SPDX-License-Identifier: MIT

//! `clankers config` — profile CRUD against `clankers.json` (§6.3/§6.5).

use anyhow::{anyhow, Result};
use clankers_core::{Config, PathResolver};
use clap::{Args, Subcommand};

use crate::output::{format_or_json, OutputFormat};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print one field of the active profile.
    Get { key: String },
    /// Set one field of a profile (creating it if it does not yet exist).
    Set {
        key: String,
        value: String,
        #[arg(long)]
        profile: Option<String>,
    },
    /// List every profile, marking the active one.
    List,
    #[command(subcommand)]
    Profiles(ProfilesCommand),
}

#[derive(Subcommand)]
pub enum ProfilesCommand {
    /// List every profile name, marking the active one.
    List,
    /// Switch the active profile. Errors if the profile does not exist.
    Use { name: String },
}

pub fn config(args: ConfigArgs) -> Result<()> {
    let format = args.format;
    let path = PathResolver::new().config_path()?;
    let mut cfg = Config::load(&path)?;

    match args.command {
        ConfigCommand::Get { key } => get(&cfg, &key, format),
        ConfigCommand::Set { key, value, profile } => {
            let profile_name = profile.unwrap_or_else(|| cfg.active_profile.clone());
            cfg.set(&profile_name, &key, &value)?;
            cfg.save(&path)?;
            format_or_json(format, &serde_json::json!({"profile": profile_name, "key": key, "value": value}), || {
                println!("set {key} = {value} (profile {profile_name})");
            })
        }
        ConfigCommand::List => list(&cfg, format),
        ConfigCommand::Profiles(ProfilesCommand::List) => list_profiles(&cfg, format),
        ConfigCommand::Profiles(ProfilesCommand::Use { name }) => {
            cfg.use_profile(&name)?;
            cfg.save(&path)?;
            format_or_json(format, &serde_json::json!({"active_profile": name}), || {
                println!("active profile: {name}");
            })
        }
    }
}

fn get(cfg: &Config, key: &str, format: OutputFormat) -> Result<()> {
    let profile = cfg.active_profile().ok_or_else(|| anyhow!("no active profile"))?;
    let value = match key {
        "endpoint" => profile.endpoint.clone().unwrap_or_default(),
        "sync_enabled" => profile.sync_enabled.to_string(),
        "sync_interval" => profile.sync_interval.to_string(),
        "auth" => profile.auth.clone(),
        other => return Err(anyhow!("unknown config key {other:?}")),
    };
    format_or_json(format, &serde_json::json!({"key": key, "value": value}), || println!("{value}"))
}

fn list(cfg: &Config, format: OutputFormat) -> Result<()> {
    let profile = cfg.active_profile().ok_or_else(|| anyhow!("no active profile"))?;
    format_or_json(format, profile, || {
        println!("endpoint = {}", profile.endpoint.as_deref().unwrap_or(""));
        println!("sync_enabled = {}", profile.sync_enabled);
        println!("sync_interval = {}", profile.sync_interval);
        println!("auth = {}", profile.auth);
    })
}

fn list_profiles(cfg: &Config, format: OutputFormat) -> Result<()> {
    let names = cfg.profile_names();
    format_or_json(format, &serde_json::json!({"profiles": names, "active": cfg.active_profile}), || {
        for name in &names {
            if *name == cfg.active_profile {
                println!("* {name}");
            } else {
                println!("  {name}");
            }
        }
    })
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
