//! Inspecting and editing `config.toml`.
//!
//! Keys are dot paths into the file, e.g. `bells.starts`,
//! `schedule.versions` or `lucky.change_hour`.

use clap::Subcommand;
use serde_json::json;
use sis_core::Config;

use super::print_json;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the whole configuration, or one section of it
    Show {
        /// Section name: schedule, bells, rooms or lucky
        section: Option<String>,
    },
    /// Print a single value
    Get { key: String },
    /// Change a single value; lists are given as JSON, e.g. "[100, 101]"
    Set { key: String, value: String },
    /// Print where the configuration file lives
    Path,
    /// Restore the defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show { section } => {
            let config = serde_json::to_value(Config::load()?)?;
            match section {
                None => print_json(&config)?,
                Some(name) => {
                    let section = config
                        .get(&name)
                        .ok_or_else(|| format!("unknown section: {name}"))?;
                    print_json(section)?;
                }
            }
        }
        ConfigAction::Get { key } => {
            let value = Config::load()?
                .get(&key)
                .ok_or_else(|| format!("unknown key: {key}"))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            // a bell list that does not parse would break `now`
            config.bell_schedule()?;
            config.save()?;
            tracing::info!(%key, "configuration updated");
            let stored = config.get(&key).unwrap_or_default();
            print_json(&json!({ "key": key, "value": stored }))?;
        }
        ConfigAction::Path => println!("{}", Config::path()?.display()),
        ConfigAction::Reset => {
            let config = Config::default();
            config.save()?;
            print_json(&config)?;
        }
    }
    Ok(())
}
