//! Command-line interface definitions for bilihelper.

use std::{path::PathBuf, time::Duration};

use clap::{Args, Parser, Subcommand};
use logging::LogArgs;

/// Command-line interface for the `bilihelper` binary.
#[derive(Parser, Debug)]
#[command(
    name = "bilihelper",
    about = "Apply bilibili player preferences to a page fixture",
    version
)]
pub struct Cli {
    /// Logging controls shared across bilihelper binaries.
    #[command(flatten)]
    pub log: LogArgs,

    /// Directory holding the persisted settings (default `~/.bilihelper`).
    #[arg(long, global = true, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// What to do.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load a page fixture, run the startup sequence, and replay keystrokes.
    Run(RunArgs),
    /// Inspect or change the persisted settings.
    Settings {
        /// Settings operation.
        #[command(subcommand)]
        command: SettingsCommand,
    },
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Page fixture (JSON element tree).
    #[arg(long, value_name = "PATH")]
    pub page: PathBuf,

    /// Override the fixture's URL.
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Keystrokes to deliver after startup begins, comma separated.
    #[arg(long, value_delimiter = ',', value_name = "KEY")]
    pub keys: Vec<String>,

    /// Pause between the danmaku switch appearing and reading its state.
    #[arg(
        long,
        value_parser = humantime::parse_duration,
        default_value = "1s",
        value_name = "DURATION"
    )]
    pub settle: Duration,

    /// Upper bound on waiting for startup steps and each keystroke.
    #[arg(
        long,
        value_parser = humantime::parse_duration,
        default_value = "5s",
        value_name = "DURATION"
    )]
    pub wait: Duration,
}

/// Settings operations.
#[derive(Subcommand, Debug, Clone)]
pub enum SettingsCommand {
    /// Print the merged settings document.
    Show,
    /// Print one setting.
    Get {
        /// Setting name, e.g. `defaultScreenStatus`.
        key: String,
    },
    /// Change one setting and persist it.
    Set {
        /// Setting name, e.g. `defaultScreenStatus`.
        key: String,
        /// JSON value; anything that is not valid JSON is taken as a string.
        value: String,
    },
    /// Restore the defaults.
    Reset,
}
