//! `settings`: a plain view over the persisted document.

use config::{ConfigStore, KNOWN_KEYS};
use serde_json::Value;

use crate::{
    cli::SettingsCommand,
    error::{Error, Result},
};

/// Execute one settings operation.
pub fn run(command: &SettingsCommand, store: &ConfigStore) -> Result<()> {
    match command {
        SettingsCommand::Show => {
            println!("{}", serde_json::to_string_pretty(&store.config())?);
        }
        SettingsCommand::Get { key } => {
            let value = store
                .get(key)
                .ok_or_else(|| Error::UnknownSetting(key.clone()))?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        SettingsCommand::Set { key, value } => {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                return Err(Error::UnknownSetting(key.clone()));
            }
            store.set(key, parse_value(value))?;
            println!("{key} updated");
        }
        SettingsCommand::Reset => {
            store.reset()?;
            println!("settings reset to defaults");
        }
    }
    Ok(())
}

/// Interpret a command-line value: JSON when it parses, a string otherwise.
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
