//! Entry point for the `bilihelper` binary.

mod cli;
mod error;
mod run;
mod settings;

#[cfg(test)]
mod test_cli;

use std::{process, sync::Arc};

use clap::Parser;
use config::{ConfigStore, FileStorage};
use tracing::{debug, error};
use tracing_subscriber::{fmt, prelude::*, registry};

use crate::{
    cli::{Cli, Commands},
    error::Result,
};

fn main() {
    if let Err(err) = run() {
        error!("{err}");
        eprintln!("error: {err}");
        process::exit(1);
    }
}

/// Parse CLI arguments, install logging, and dispatch to the chosen subcommand.
fn run() -> Result<()> {
    let Cli {
        log,
        config_dir,
        command,
    } = Cli::parse();
    let env_filter = logging::env_filter_from_spec(&log.spec());
    registry()
        .with(env_filter)
        .with(fmt::layer().without_time())
        .try_init()
        .ok();

    let storage = FileStorage::new(config_dir.unwrap_or_else(config::default_config_dir));
    debug!(dir = %storage.dir().display(), "settings directory");
    let store = Arc::new(ConfigStore::load(Arc::new(storage)));

    match command {
        Commands::Run(args) => run::run(&args, store),
        Commands::Settings { command } => settings::run(&command, &store),
    }
}
