//! Config command - view and change settings.json

use anyhow::Result;
use clap::Subcommand;

use super::{get_app_dir, get_logger, load_config, log_event, print_json};
use crate::output::{create_table, success};
use costscope_core::config::Config;
use costscope_core::LogEvent;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective settings (environment overrides included)
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change a setting, e.g. `spike-pct 25` or `default-dataset ~/costs.csv`
    Set {
        key: String,
        value: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Restore a setting to its default
    Unset {
        key: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl ConfigCommands {
    pub fn json(&self) -> bool {
        match self {
            ConfigCommands::Show { json }
            | ConfigCommands::Set { json, .. }
            | ConfigCommands::Unset { json, .. } => *json,
        }
    }
}

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show { json } => show(&load_config()?, json),
        ConfigCommands::Set { key, value, json } => {
            update(&key, json, |config| config.set(&key, &value))
        }
        ConfigCommands::Unset { key, json } => update(&key, json, |config| config.unset(&key)),
    }
}

fn show(config: &Config, json: bool) -> Result<()> {
    let entries = config.entries();

    if json {
        let map: serde_json::Map<String, serde_json::Value> = entries
            .into_iter()
            .map(|(key, value)| (key.to_string(), value.into()))
            .collect();
        return print_json(&map);
    }

    let mut table = create_table();
    table.set_header(vec!["Setting", "Value"]);
    for (key, value) in entries {
        table.add_row(vec![key.to_string(), value]);
    }
    println!("{}", table);
    Ok(())
}

/// Apply one change to the saved settings, never to environment overrides
fn update(key: &str, json: bool, change: impl FnOnce(&mut Config) -> Result<()>) -> Result<()> {
    let app_dir = get_app_dir()?;
    std::fs::create_dir_all(&app_dir)?;

    let mut config = Config::load_settings(&app_dir)?;
    change(&mut config)?;
    config.save(&app_dir)?;

    log_event(
        &get_logger(),
        LogEvent::new("config_updated").with_command(format!("config {}", key)),
    );

    if json {
        return show(&config, true);
    }
    success(&format!("Updated {}", key));
    Ok(())
}
